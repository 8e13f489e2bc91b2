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

//! Two-pass driver (spec.md §4.7): owns the single mutable context shared
//! by every other module (Design Note 9) and runs the documented
//! four-step per-pass algorithm over the include stack.

use std::path::PathBuf;

use crate::directive::{self, DirectiveEffect};
use crate::encoder;
use crate::errors::{AssemblyError, DiagCode, Diagnostic, Severity};
use crate::expr::EvalContext;
use crate::file_reader::FileReader;
use crate::hex;
use crate::image::Image;
use crate::include_stack::IncludeStack;
use crate::line::{self, TokenizedLine};
use crate::listing::{self, ListingRow};
use crate::symbol_table::{self, SymbolTable};

pub struct MacroCapture {
    pub name: String,
    pub lines: Vec<String>,
}

/// The state threaded through every line of every pass. The symbol table
/// and macro table persist across both passes; everything else is reset
/// by [`Context::reset_for_pass`] (spec.md §4.7 step 1).
pub struct Context<'a> {
    pub symtab: SymbolTable,
    pub macros: std::collections::HashMap<String, Vec<String>>,
    pub image: Image,
    pub if_stack: Vec<bool>,
    pub include_stack: IncludeStack,
    pub macro_capture: Option<MacroCapture>,
    pub in_macro_definition: bool,
    pub diagnostics: Vec<Diagnostic>,
    pub is_pass2: bool,
    pub extended_operators: bool,
    pub ended: bool,
    pub file_reader: &'a dyn FileReader,
    pub search_path: Vec<PathBuf>,
    pub hex_lines: Vec<String>,
    pub listing: Vec<ListingRow>,
}

impl<'a> Context<'a> {
    pub fn new(file_reader: &'a dyn FileReader, search_path: Vec<PathBuf>, extended_operators: bool) -> Self {
        Context {
            symtab: SymbolTable::new(),
            macros: std::collections::HashMap::new(),
            image: Image::new(),
            if_stack: vec![true],
            include_stack: IncludeStack::new(),
            macro_capture: None,
            in_macro_definition: false,
            diagnostics: Vec::new(),
            is_pass2: false,
            extended_operators,
            ended: false,
            file_reader,
            search_path,
            hex_lines: Vec::new(),
            listing: Vec::new(),
        }
    }

    pub fn reset_for_pass(&mut self, is_pass2: bool) {
        self.image.reset();
        self.if_stack = vec![true];
        self.include_stack = IncludeStack::new();
        self.macro_capture = None;
        self.in_macro_definition = false;
        self.diagnostics.clear();
        self.hex_lines.clear();
        self.listing.clear();
        self.ended = false;
        self.is_pass2 = is_pass2;
    }

    pub fn code_enabled(&self) -> bool {
        self.if_stack.iter().all(|&b| b)
    }

    pub fn diagnose(&mut self, file: &str, line: usize, code: DiagCode, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::new(file, line, code, message));
    }

    pub fn eval_ctx(&self) -> EvalContext<'_> {
        EvalContext {
            symtab: &self.symtab,
            pc: self.image.pc,
            is_pass2: self.is_pass2,
            extended_operators: self.extended_operators,
        }
    }
}

pub struct AssembleOptions {
    pub input_path: String,
    pub search_path: Vec<PathBuf>,
    pub build_listing: bool,
    pub extended_operators: bool,
}

pub struct AssembleOutput {
    pub origin: u16,
    pub binary: Vec<u8>,
    pub hex: String,
    pub listing: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
    pub had_errors: bool,
}

/// Assembles `options.input_path`, running pass 1 then pass 2 over the
/// same source tree (spec.md §4.7). Only fatal conditions (missing root
/// file, include-stack overflow) abort with `Err`; everything else is
/// surfaced as buffered diagnostics in the returned output.
pub fn assemble(file_reader: &dyn FileReader, options: AssembleOptions) -> Result<AssembleOutput, AssemblyError> {
    let root_content = file_reader
        .read_to_string(std::path::Path::new(&options.input_path))
        .map_err(|source| AssemblyError::Io { path: options.input_path.clone(), source })?;

    let mut ctx = Context::new(file_reader, options.search_path, options.extended_operators);

    ctx.reset_for_pass(false);
    ctx.include_stack.push(options.input_path.clone(), &root_content)?;
    run_pass(&mut ctx)?;

    ctx.reset_for_pass(true);
    ctx.include_stack.push(options.input_path.clone(), &root_content)?;
    run_pass(&mut ctx)?;

    let origin = ctx.image.pc_lowest;
    let binary = ctx.image.written_region().to_vec();
    let mut hex_text = ctx.hex_lines.join("\n");
    if !hex_text.is_empty() {
        hex_text.push('\n');
    }
    hex_text.push_str(&hex::end_of_file_record());
    hex_text.push('\n');

    let had_errors = ctx.diagnostics.iter().any(|d| d.severity() == Severity::Error);
    let listing_text = if options.build_listing { Some(listing::render(&ctx.listing, &ctx.symtab)) } else { None };

    Ok(AssembleOutput {
        origin,
        binary,
        hex: hex_text,
        listing: listing_text,
        diagnostics: ctx.diagnostics,
        had_errors,
    })
}

/// Runs one pass to completion: reads lines off the include stack
/// (including nested INCLUDEs and macro replays) until `END` or the
/// source tree is exhausted (spec.md §4.7 steps 2-4).
fn run_pass(ctx: &mut Context) -> Result<(), AssemblyError> {
    while !ctx.ended {
        let file = ctx.include_stack.current_file().to_string();
        let line_no = ctx.include_stack.current_line_number() + 1;
        let Some(raw) = ctx.include_stack.next_line() else {
            if ctx.include_stack.is_root() {
                break;
            }
            ctx.include_stack.pop();
            continue;
        };

        if ctx.in_macro_definition {
            let is_endm = raw.split_whitespace().next().map(|w| w.eq_ignore_ascii_case("ENDM")).unwrap_or(false);
            if !is_endm {
                if !ctx.is_pass2
                    && let Some(capture) = ctx.macro_capture.as_mut() {
                        capture.lines.push(raw.clone());
                    }
                continue;
            }
        }

        let result = line::tokenize(&raw, ctx.macro_capture.is_some());
        for w in result.warnings {
            ctx.diagnose(&file, line_no, w, "");
        }
        process_line(ctx, &result.line, &file, line_no, &raw)?;
    }
    Ok(())
}

fn process_line(ctx: &mut Context, tokenized: &TokenizedLine, file: &str, line_no: usize, raw: &str) -> Result<(), AssemblyError> {
    if tokenized.cpm_eof {
        ctx.include_stack.pop();
        return Ok(());
    }
    if tokenized.is_empty {
        return Ok(());
    }

    let label = tokenized.label.as_deref().map(|raw_label| {
        let normalized = symbol_table::normalize_name(raw_label);
        if let Some(bad) = normalized.bad_first_char {
            ctx.diagnose(file, line_no, DiagCode::BadLabelFirstChar, format!("label starts with '{bad}'"));
        }
        if normalized.too_long {
            ctx.diagnose(file, line_no, DiagCode::LabelTooLong, "label truncated");
        }
        normalized.name
    });

    let Some(keyword) = tokenized.keyword.as_deref() else {
        if let Some(l) = &label {
            define_label_only(ctx, l, file, line_no);
        }
        push_listing_row(ctx, file, line_no, raw, label, None);
        return Ok(());
    };
    let keyword_upper = keyword.to_ascii_uppercase();

    if !ctx.code_enabled() && !matches!(keyword_upper.as_str(), "IF" | "ELSE" | "ENDIF") {
        return Ok(());
    }

    if let Some(effect) = directive::dispatch(ctx, label.as_deref(), &keyword_upper, &tokenized.operand, file, line_no) {
        match effect {
            DirectiveEffect::Bytes(bytes) => push_listing_row(ctx, file, line_no, raw, label, Some(bytes)),
            DirectiveEffect::Reserved(_) | DirectiveEffect::None => push_listing_row(ctx, file, line_no, raw, label, None),
            DirectiveEffect::End => push_listing_row(ctx, file, line_no, raw, label, None),
        }
        return Ok(());
    }

    let eval_ctx = ctx.eval_ctx();
    if let Some(outcome) = encoder::encode(&keyword_upper, &tokenized.operand, &eval_ctx) {
        if let Some(l) = label {
            define_label_only(ctx, &l, file, line_no);
        }
        for code in &outcome.diagnostics {
            ctx.diagnose(file, line_no, *code, format!("in `{keyword_upper} {}`", tokenized.operand));
        }
        if let Err(e) = ctx.image.write_bytes(&outcome.bytes) {
            ctx.diagnose(file, line_no, e, "instruction write out of range");
        }
        push_listing_row(ctx, file, line_no, raw, None, Some(outcome.bytes));
        return Ok(());
    }

    directive::try_macro_invocation(ctx, label.as_deref(), &keyword_upper, file, line_no);
    push_listing_row(ctx, file, line_no, raw, None, None);
    Ok(())
}

fn define_label_only(ctx: &mut Context, name: &str, file: &str, line_no: usize) {
    use crate::symbol_table::LabelOutcome;
    let pc = ctx.image.pc;
    let is_pass2 = ctx.is_pass2;
    match ctx.symtab.process_label(name, pc, is_pass2, file, line_no) {
        LabelOutcome::Duplicate => ctx.diagnose(file, line_no, DiagCode::DuplicateLabel, format!("label {name} already defined")),
        LabelOutcome::Phased => ctx.diagnose(file, line_no, DiagCode::PhasingError, format!("label {name} phasing mismatch")),
        LabelOutcome::Defined => {}
    }
}

fn push_listing_row(ctx: &mut Context, file: &str, line_no: usize, raw: &str, label: Option<String>, bytes: Option<Vec<u8>>) {
    if !ctx.is_pass2 {
        return;
    }
    let addr = bytes.as_ref().map(|_| ctx.image.pc_org);
    ctx.listing.push(ListingRow {
        file: file.to_string(),
        line: line_no,
        address: addr,
        bytes: bytes.unwrap_or_default(),
        label,
        source: raw.to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_reader::MockFileReader;

    fn assemble_src(src: &str) -> AssembleOutput {
        let mut reader = MockFileReader::new();
        reader.add_file("main.asm", src);
        assemble(
            &reader,
            AssembleOptions {
                input_path: "main.asm".to_string(),
                search_path: Vec::new(),
                build_listing: true,
                extended_operators: true,
            },
        )
        .unwrap()
    }

    #[test]
    fn e1_trivial_nop() {
        let out = assemble_src("\tORG 0\n\tNOP\n\tEND\n");
        assert_eq!(out.binary, vec![0x00]);
        assert!(!out.had_errors);
    }

    #[test]
    fn e2_equ_then_lxi() {
        let out = assemble_src("BASE\tEQU 1000H\n\tORG 0\n\tLXI H,BASE\n\tEND\n");
        assert_eq!(out.binary, vec![0x21, 0x00, 0x10]);
    }

    #[test]
    fn e3_db_string_and_byte() {
        let out = assemble_src("\tORG 0\n\tDB 'AB',0FFH\n\tEND\n");
        assert_eq!(out.binary, vec![b'A', b'B', 0xFF]);
    }

    #[test]
    fn e4_ds_advances_pc_not_watermark() {
        let out = assemble_src("\tORG 0\n\tDB 1\n\tDS 16\n\tDB 2\n\tEND\n");
        assert_eq!(out.binary.len(), 0x12);
        assert_eq!(out.binary[0], 1);
        assert_eq!(out.binary[0x11], 2);
    }

    #[test]
    fn e5_if_else_endif_selects_branch() {
        let out = assemble_src("\tORG 0\n\tIF 0\n\tDB 1\n\tELSE\n\tDB 2\n\tENDIF\n\tEND\n");
        assert_eq!(out.binary, vec![2]);
    }

    #[test]
    fn e6_phasing_error_reported() {
        // BASE is undefined when pass 1 reaches IF BASE (silently 0, ELSE
        // branch taken, 1 byte emitted); by pass 2 BASE is already in the
        // symbol table from the EQU line below, so IF BASE takes the
        // 3-byte branch instead. HERE lands on a different address in
        // each pass, a textbook phasing mismatch.
        let src = "\tORG 0\n\tIF BASE\n\tDB 1,2,3\n\tELSE\n\tDB 9\n\tENDIF\nHERE\tNOP\nBASE\tEQU 1\n\tEND\n";
        let out = assemble_src(src);
        assert!(out.diagnostics.iter().any(|d| d.code == DiagCode::PhasingError));
        assert!(out.had_errors);
    }

    #[test]
    fn label_only_line_defines_symbol_at_current_pc() {
        let out = assemble_src("\tORG 10H\nHERE\n\tNOP\n\tEND\n");
        assert_eq!(out.binary, vec![0x00]);
    }

    #[test]
    fn macro_capture_and_replay() {
        let out = assemble_src("GREET\tMACRO\n\tDB 1\n\tENDM\n\tORG 0\n\tGREET\n\tEND\n");
        assert_eq!(out.binary, vec![1]);
    }

    #[test]
    fn undefined_keyword_reports_cant_find_keyword() {
        let out = assemble_src("\tORG 0\n\tFROBNICATE\n\tEND\n");
        assert!(out.diagnostics.iter().any(|d| d.code == DiagCode::CantFindKeyword));
    }

    #[test]
    fn hex_output_has_terminal_eof_record() {
        let out = assemble_src("\tORG 0\n\tNOP\n\tEND\n");
        assert!(out.hex.trim_end().ends_with(":00000001FF"));
    }
}
