/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! Input-file resolver: the core's only window onto the filesystem. Kept
//! behind a trait (as the teacher does with `FileReader`) so tests can
//! supply an in-memory search path instead of touching disk.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub trait FileReader {
    /// Read a file already resolved to a concrete path.
    fn read_to_string(&self, path: &Path) -> std::io::Result<String>;

    /// Resolve a bare or relative filename against a search path: the
    /// directory of the including file first, then each entry of
    /// `search_path` in order. Returns the first path that exists.
    fn resolve(&self, name: &str, relative_to: &Path, search_path: &[PathBuf]) -> Option<PathBuf> {
        let candidate = relative_to.join(name);
        if self.exists(&candidate) {
            return Some(candidate);
        }
        let direct = PathBuf::from(name);
        if direct.is_absolute() && self.exists(&direct) {
            return Some(direct);
        }
        for dir in search_path {
            let candidate = dir.join(name);
            if self.exists(&candidate) {
                return Some(candidate);
            }
        }
        None
    }

    fn exists(&self, path: &Path) -> bool;
}

/// Production reader backed by real filesystem I/O.
pub struct FsFileReader;

impl FileReader for FsFileReader {
    fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// In-memory reader for tests: maps relative paths (as given to
/// `add_file`) straight to their contents, with no real filesystem
/// lookups.
#[derive(Default)]
pub struct MockFileReader {
    files: HashMap<PathBuf, String>,
}

impl MockFileReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, path: &str, content: &str) -> &mut Self {
        self.files.insert(PathBuf::from(path), content.to_string());
        self
    }
}

impl FileReader for MockFileReader {
    fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, format!("mock file not found: {}", path.display())))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }
}
