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

use asm8080::errors::DiagCode;
use asm8080::file_reader::FsFileReader;
use asm8080::{assemble, AssembleOptions};
use std::fs;

fn assemble_fixture(dir: &std::path::Path, entry: &str, search_path: Vec<std::path::PathBuf>) -> asm8080::AssembleOutput {
    let reader = FsFileReader;
    assemble(
        &reader,
        AssembleOptions {
            input_path: dir.join(entry).to_string_lossy().to_string(),
            search_path,
            build_listing: true,
            extended_operators: true,
        },
    )
    .unwrap()
}

#[test]
fn e1_trivial_nop_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("main.asm"), "\tORG 0\n\tNOP\n\tEND\n").unwrap();

    let out = assemble_fixture(dir.path(), "main.asm", Vec::new());

    assert_eq!(out.binary, vec![0x00]);
    assert!(!out.had_errors);
    assert!(out.hex.trim_end().ends_with(":00000001FF"));
}

#[test]
fn e2_equ_then_lxi_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("main.asm"), "BASE\tEQU 1000H\n\tORG 0\n\tLXI H,BASE\n\tEND\n").unwrap();

    let out = assemble_fixture(dir.path(), "main.asm", Vec::new());

    assert_eq!(out.binary, vec![0x21, 0x00, 0x10]);
    assert!(!out.had_errors);
}

#[test]
fn e3_db_string_and_byte_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("main.asm"), "\tORG 0\n\tDB 'AB',0FFH\n\tEND\n").unwrap();

    let out = assemble_fixture(dir.path(), "main.asm", Vec::new());

    assert_eq!(out.binary, vec![b'A', b'B', 0xFF]);
}

#[test]
fn e4_ds_advances_pc_not_watermark_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("main.asm"), "\tORG 0\n\tDB 1\n\tDS 16\n\tDB 2\n\tEND\n").unwrap();

    let out = assemble_fixture(dir.path(), "main.asm", Vec::new());

    assert_eq!(out.binary.len(), 0x12);
    assert_eq!(out.binary[0], 1);
    assert_eq!(out.binary[0x11], 2);
}

#[test]
fn e5_if_else_endif_selects_branch_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("main.asm"), "\tORG 0\n\tIF 0\n\tDB 1\n\tELSE\n\tDB 2\n\tENDIF\n\tEND\n").unwrap();

    let out = assemble_fixture(dir.path(), "main.asm", Vec::new());

    assert_eq!(out.binary, vec![2]);
}

#[test]
fn e6_phasing_error_reported_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let src = "\tORG 0\n\tIF BASE\n\tDB 1,2,3\n\tELSE\n\tDB 9\n\tENDIF\nHERE\tNOP\nBASE\tEQU 1\n\tEND\n";
    fs::write(dir.path().join("main.asm"), src).unwrap();

    let out = assemble_fixture(dir.path(), "main.asm", Vec::new());

    assert!(out.diagnostics.iter().any(|d| d.code == DiagCode::PhasingError));
    assert!(out.had_errors);
}

#[test]
fn include_resolves_relative_to_including_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("main.asm"), "\tORG 0\n\tINCLUDE \"sub.asm\"\n\tEND\n").unwrap();
    fs::write(dir.path().join("sub.asm"), "\tDB 42\n").unwrap();

    let out = assemble_fixture(dir.path(), "main.asm", Vec::new());

    assert_eq!(out.binary, vec![42]);
    assert!(!out.had_errors);
}

#[test]
fn include_resolves_via_search_path() {
    let dir = tempfile::tempdir().unwrap();
    let inc_dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("main.asm"), "\tORG 0\n\tINCLUDE \"lib.asm\"\n\tEND\n").unwrap();
    fs::write(inc_dir.path().join("lib.asm"), "\tDB 7\n").unwrap();

    let out = assemble_fixture(dir.path(), "main.asm", vec![inc_dir.path().to_path_buf()]);

    assert_eq!(out.binary, vec![7]);
    assert!(!out.had_errors);
}

#[test]
fn nested_include_three_levels_deep() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("main.asm"), "\tORG 0\n\tDB 1\n\tINCLUDE \"a.asm\"\n\tEND\n").unwrap();
    fs::write(dir.path().join("a.asm"), "\tDB 2\n\tINCLUDE \"b.asm\"\n").unwrap();
    fs::write(dir.path().join("b.asm"), "\tDB 3\n").unwrap();

    let out = assemble_fixture(dir.path(), "main.asm", Vec::new());

    assert_eq!(out.binary, vec![1, 2, 3]);
    assert!(!out.had_errors);
}

#[test]
fn macro_capture_and_replay_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("main.asm"), "GREET\tMACRO\n\tDB 1,2\n\tENDM\n\tORG 0\n\tGREET\n\tGREET\n\tEND\n").unwrap();

    let out = assemble_fixture(dir.path(), "main.asm", Vec::new());

    assert_eq!(out.binary, vec![1, 2, 1, 2]);
    assert!(!out.had_errors);
}

#[test]
fn listing_is_only_produced_when_requested() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("main.asm"), "\tORG 0\n\tNOP\n\tEND\n").unwrap();

    let reader = FsFileReader;
    let out = assemble(
        &reader,
        AssembleOptions {
            input_path: dir.path().join("main.asm").to_string_lossy().to_string(),
            search_path: Vec::new(),
            build_listing: false,
            extended_operators: true,
        },
    )
    .unwrap();

    assert!(out.listing.is_none());
}

#[test]
fn missing_root_file_is_a_fatal_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let reader = FsFileReader;
    let result = assemble(
        &reader,
        AssembleOptions {
            input_path: dir.path().join("nonexistent.asm").to_string_lossy().to_string(),
            search_path: Vec::new(),
            build_listing: false,
            extended_operators: true,
        },
    );

    assert!(result.is_err());
}
