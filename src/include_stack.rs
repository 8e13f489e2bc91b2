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

//! Include stack (spec.md §3 "Include stack"): an ordered sequence of open
//! source contexts. A macro invocation pushes a level exactly like
//! `INCLUDE` does (Design Note: "a macro *is* an include"), so this module
//! is shared by both.

use crate::errors::AssemblyError;

/// `project.h`'s `FILES_LEVEL_MAX`.
pub const FILES_LEVEL_MAX: usize = 16;

struct Level {
    name: String,
    lines: Vec<String>,
    line_no: usize,
}

#[derive(Default)]
pub struct IncludeStack {
    levels: Vec<Level>,
}

impl IncludeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Pushes a new level holding `content`'s lines. Fails with
    /// `IncludeStackOverflow` past `FILES_LEVEL_MAX` open levels.
    pub fn push(&mut self, name: impl Into<String>, content: &str) -> Result<(), AssemblyError> {
        if self.levels.len() >= FILES_LEVEL_MAX {
            return Err(AssemblyError::IncludeStackOverflow { max: FILES_LEVEL_MAX });
        }
        let lines = content.lines().map(str::to_string).collect();
        self.levels.push(Level {
            name: name.into(),
            lines,
            line_no: 0,
        });
        Ok(())
    }

    /// Pops the innermost level, if any.
    pub fn pop(&mut self) {
        self.levels.pop();
    }

    /// Pops every level above the root (level 0), as END does when
    /// processed inside an include at pass 2.
    pub fn pop_to_root(&mut self) {
        self.levels.truncate(usize::min(self.levels.len(), 1));
    }

    pub fn current_file(&self) -> &str {
        self.levels.last().map(|l| l.name.as_str()).unwrap_or("<none>")
    }

    pub fn current_line_number(&self) -> usize {
        self.levels.last().map(|l| l.line_no).unwrap_or(0)
    }

    pub fn is_root(&self) -> bool {
        self.levels.len() <= 1
    }

    /// Reads the next line at the innermost level, advancing its counter.
    /// `None` means that level has hit EOF; the caller pops it and, unless
    /// this was level 0, keeps reading.
    pub fn next_line(&mut self) -> Option<String> {
        let level = self.levels.last_mut()?;
        if level.line_no >= level.lines.len() {
            return None;
        }
        let line = level.lines[level.line_no].clone();
        level.line_no += 1;
        Some(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_lines_in_order() {
        let mut s = IncludeStack::new();
        s.push("root.asm", "A\nB\nC").unwrap();
        assert_eq!(s.next_line().as_deref(), Some("A"));
        assert_eq!(s.next_line().as_deref(), Some("B"));
        assert_eq!(s.next_line().as_deref(), Some("C"));
        assert_eq!(s.next_line(), None);
    }

    #[test]
    fn nested_include_then_pop_resumes_outer() {
        let mut s = IncludeStack::new();
        s.push("root.asm", "A\nB").unwrap();
        assert_eq!(s.next_line().as_deref(), Some("A"));
        s.push("inner.asm", "X").unwrap();
        assert_eq!(s.next_line().as_deref(), Some("X"));
        assert_eq!(s.next_line(), None);
        s.pop();
        assert_eq!(s.next_line().as_deref(), Some("B"));
    }

    #[test]
    fn overflow_past_max_depth() {
        let mut s = IncludeStack::new();
        for i in 0..FILES_LEVEL_MAX {
            s.push(format!("f{i}.asm"), "").unwrap();
        }
        assert!(matches!(s.push("one_too_many.asm", ""), Err(AssemblyError::IncludeStackOverflow { .. })));
    }

    #[test]
    fn pop_to_root_drops_every_nested_level() {
        let mut s = IncludeStack::new();
        s.push("root.asm", "").unwrap();
        s.push("a.asm", "").unwrap();
        s.push("b.asm", "").unwrap();
        assert_eq!(s.depth(), 3);
        s.pop_to_root();
        assert_eq!(s.depth(), 1);
        assert!(s.is_root());
    }
}
