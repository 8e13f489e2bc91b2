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

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use asm8080::file_reader::FsFileReader;
use asm8080::{assemble, AssembleOptions};
use clap::Parser;
use log::{error, warn};

#[derive(Parser)]
#[clap(version, author = "Connor Nolan", about = "Two-pass Intel 8080 cross-assembler")]
struct Opts {
    /// Source file to assemble.
    input: PathBuf,

    /// Directories searched for INCLUDE files, in order, after the
    /// including file's own directory.
    #[clap(short = 'I', long = "include", value_name = "DIR")]
    include: Vec<PathBuf>,

    /// Base name for the .bin/.hex/.lst outputs (defaults to the input
    /// file's stem).
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Also write a .lst listing file.
    #[clap(short = 'l', long)]
    listing: bool,

    /// Disable the C-style extended operators (`==`, `<=`, `&&`, ...).
    #[clap(long)]
    no_extended_operators: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let opts = Opts::parse();
    match run(opts) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(opts: Opts) -> Result<bool> {
    let reader = FsFileReader;
    let stem = match opts.output.clone() {
        Some(path) if path.extension().is_some() => {
            warn!("-o stem {} has an extension; stripping it (.bin/.hex/.lst are appended automatically)", path.display());
            path.with_extension("")
        }
        Some(path) => path,
        None => opts.input.with_extension(""),
    };

    let options = AssembleOptions {
        input_path: opts.input.to_string_lossy().to_string(),
        search_path: opts.include,
        build_listing: opts.listing,
        extended_operators: !opts.no_extended_operators,
    };

    let out = assemble(&reader, options).with_context(|| format!("assembling {}", opts.input.display()))?;

    for d in &out.diagnostics {
        if d.severity() == asm8080::errors::Severity::Error {
            error!("{d}");
        } else {
            warn!("{d}");
        }
    }

    std::fs::write(stem.with_extension("bin"), &out.binary).with_context(|| "writing .bin output")?;
    std::fs::write(stem.with_extension("hex"), &out.hex).with_context(|| "writing .hex output")?;
    if let Some(listing) = &out.listing {
        std::fs::write(stem.with_extension("lst"), listing).with_context(|| "writing .lst output")?;
    }

    Ok(!out.had_errors)
}
