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

//! Directive engine (spec.md §4.5): dispatches a tokenised line's keyword
//! to EQU/SET/ORG/DB/DW/DS/IF/ELSE/ENDIF/INCLUDE/MACRO/ENDM/END, or falls
//! through to macro invocation when the keyword matches none of them.

use crate::driver::Context;
use crate::errors::DiagCode;
use crate::expr;
use crate::hex;

/// `main.c`'s `if_true[10]`: the base always-true level plus 9 usable
/// nested `IF`s before `IfNestingOverflow` (spec.md §9 / SPEC_FULL.md §5).
const IF_NESTING_MAX: usize = 10;

/// What a processed directive did to the image, for the listing emitter.
pub enum DirectiveEffect {
    /// No bytes produced (EQU, SET, IF, ELSE, ENDIF, INCLUDE, MACRO, ORG).
    None,
    /// DB/DW produced these bytes.
    Bytes(Vec<u8>),
    /// DS reserved this many bytes without writing them.
    Reserved(u32),
    /// END was processed.
    End,
}

fn evaluate(ctx: &mut Context, text: &str, file: &str, line: usize) -> i32 {
    let out = expr::evaluate(text, &ctx.eval_ctx());
    for code in out.diagnostics {
        ctx.diagnose(file, line, code, format!("in expression `{text}`"));
    }
    out.value
}

/// Flushes the HEX fragment accumulated since the last flush (`pc_org` to
/// `addr`), called before ORG/DS move `pc_org`, and at end of pass.
pub fn flush_hex(ctx: &mut Context) {
    if !ctx.is_pass2 {
        return;
    }
    let start = ctx.image.pc_org;
    let frag = ctx.image.current_fragment().to_vec();
    if !frag.is_empty() {
        ctx.hex_lines.extend(hex::emit_fragment(start, &frag));
    }
    ctx.image.pc_org = ctx.image.pc;
}

/// Dispatches one directive keyword. Returns `None` if `keyword` isn't a
/// directive at all (the driver then tries the opcode encoder, then
/// macro invocation).
pub fn dispatch(ctx: &mut Context, label: Option<&str>, keyword: &str, operand: &str, file: &str, line: usize) -> Option<DirectiveEffect> {
    match keyword {
        "EQU" => {
            do_equ(ctx, label, operand, file, line);
            Some(DirectiveEffect::None)
        }
        "SET" => {
            do_set(ctx, label, operand, file, line);
            Some(DirectiveEffect::None)
        }
        "ORG" => {
            flush_hex(ctx);
            let value = evaluate(ctx, operand, file, line);
            if let Err(e) = ctx.image.set_org(value) {
                ctx.diagnose(file, line, e, "ORG operand out of range");
            }
            if let Some(l) = label {
                define_label(ctx, l, file, line);
            }
            Some(DirectiveEffect::None)
        }
        "DB" => {
            if let Some(l) = label {
                define_label(ctx, l, file, line);
            }
            let bytes = db(ctx, operand, file, line);
            Some(DirectiveEffect::Bytes(bytes))
        }
        "DW" => {
            if let Some(l) = label {
                define_label(ctx, l, file, line);
            }
            let bytes = dw(ctx, operand, file, line);
            Some(DirectiveEffect::Bytes(bytes))
        }
        "DS" => {
            if let Some(l) = label {
                define_label(ctx, l, file, line);
            }
            let n = evaluate(ctx, operand, file, line);
            flush_hex(ctx);
            match ctx.image.reserve(n) {
                Ok(()) => Some(DirectiveEffect::Reserved(n.max(0) as u32)),
                Err(e) => {
                    ctx.diagnose(file, line, e, format!("DS operand {n}"));
                    Some(DirectiveEffect::Reserved(0))
                }
            }
        }
        "IF" => {
            let value = evaluate(ctx, operand, file, line);
            if ctx.if_stack.len() >= IF_NESTING_MAX {
                ctx.diagnose(file, line, DiagCode::IfNestingOverflow, "IF nesting too deep");
            } else {
                ctx.if_stack.push(value != 0);
            }
            Some(DirectiveEffect::None)
        }
        "ELSE" => {
            if ctx.if_stack.len() <= 1 {
                ctx.diagnose(file, line, DiagCode::IfNestingUnderflow, "ELSE with no matching IF");
            } else if let Some(top) = ctx.if_stack.last_mut() {
                *top = !*top;
            }
            Some(DirectiveEffect::None)
        }
        "ENDIF" => {
            if ctx.if_stack.len() <= 1 {
                ctx.diagnose(file, line, DiagCode::IfNestingUnderflow, "ENDIF with no matching IF");
                ctx.if_stack = vec![true];
            } else {
                ctx.if_stack.pop();
            }
            Some(DirectiveEffect::None)
        }
        "INCLUDE" => {
            do_include(ctx, operand, file, line);
            Some(DirectiveEffect::None)
        }
        "MACRO" => {
            do_macro(ctx, label, operand, file, line);
            Some(DirectiveEffect::None)
        }
        "ENDM" => {
            do_endm(ctx);
            Some(DirectiveEffect::None)
        }
        "END" => {
            if !ctx.include_stack.is_root() {
                ctx.diagnose(file, line, DiagCode::EndInsideIncludeFile, "END inside include file");
                ctx.include_stack.pop_to_root();
            }
            flush_hex(ctx);
            ctx.ended = true;
            Some(DirectiveEffect::End)
        }
        _ => None,
    }
}

fn define_label(ctx: &mut Context, name: &str, file: &str, line: usize) {
    use crate::symbol_table::LabelOutcome;
    let pc = ctx.image.pc;
    let is_pass2 = ctx.is_pass2;
    match ctx.symtab.process_label(name, pc, is_pass2, file, line) {
        LabelOutcome::Duplicate => ctx.diagnose(file, line, DiagCode::DuplicateLabel, format!("label {name} already defined")),
        LabelOutcome::Phased => ctx.diagnose(file, line, DiagCode::PhasingError, format!("label {name} phasing mismatch")),
        LabelOutcome::Defined => {}
    }
}

fn do_equ(ctx: &mut Context, label: Option<&str>, operand: &str, file: &str, line: usize) {
    use crate::symbol_table::{Symbol, SymbolKind};
    let Some(name) = label else {
        ctx.diagnose(file, line, DiagCode::MissingField, "EQU requires a label");
        return;
    };
    let value = evaluate(ctx, operand, file, line) as u16;
    if !ctx.is_pass2 {
        match ctx.symtab.find(name).map(|s| s.kind) {
            None => {
                let _ = ctx.symtab.add(Symbol { name: name.to_string(), value, kind: SymbolKind::EquName, file: file.to_string(), line });
            }
            Some(SymbolKind::SetName) => {
                if let Some(sym) = ctx.symtab.find_mut(name) {
                    sym.kind = SymbolKind::EquName;
                    sym.value = value;
                    sym.file = file.to_string();
                    sym.line = line;
                }
            }
            Some(SymbolKind::EquName) => {}
            Some(_) => {}
        }
        return;
    }
    match ctx.symtab.find(name).map(|s| (s.kind, s.value, s.file.clone(), s.line)) {
        Some((SymbolKind::EquName, old_value, old_file, old_line)) => {
            if old_file == file && old_line == line {
                if old_value != value {
                    ctx.diagnose(file, line, DiagCode::PhasingError, format!("EQU {name} value changed"));
                    if let Some(sym) = ctx.symtab.find_mut(name) {
                        sym.value = value;
                    }
                }
            } else {
                ctx.diagnose(file, line, DiagCode::EquAlreadyExists, format!("EQU {name} already defined"));
            }
        }
        Some((SymbolKind::Name, ..)) => {
            ctx.diagnose(file, line, DiagCode::AlreadyDefinedAsName, format!("{name} already a reserved name"));
        }
        Some((SymbolKind::Label, ..)) => {
            ctx.diagnose(file, line, DiagCode::SymbolAlreadyUsedAsLabel, format!("{name} already used as a label"));
        }
        Some((SymbolKind::SetName, ..)) => {
            if let Some(sym) = ctx.symtab.find_mut(name) {
                sym.kind = SymbolKind::EquName;
                sym.value = value;
                sym.file = file.to_string();
                sym.line = line;
            }
        }
        None => {
            let _ = ctx.symtab.add(Symbol { name: name.to_string(), value, kind: SymbolKind::EquName, file: file.to_string(), line });
        }
    }
}

fn do_set(ctx: &mut Context, label: Option<&str>, operand: &str, file: &str, line: usize) {
    use crate::symbol_table::{Symbol, SymbolKind};
    let Some(name) = label else {
        ctx.diagnose(file, line, DiagCode::MissingField, "SET requires a label");
        return;
    };
    let value = evaluate(ctx, operand, file, line) as u16;
    if !ctx.is_pass2 {
        match ctx.symtab.find(name).map(|s| s.kind) {
            Some(SymbolKind::SetName) => {
                if let Some(sym) = ctx.symtab.find_mut(name) {
                    sym.value = value;
                    sym.file = file.to_string();
                    sym.line = line;
                }
            }
            Some(SymbolKind::EquName | SymbolKind::Name | SymbolKind::Label) => {}
            None => {
                let _ = ctx.symtab.add(Symbol { name: name.to_string(), value, kind: SymbolKind::SetName, file: file.to_string(), line });
            }
        }
        return;
    }
    match ctx.symtab.find(name).map(|s| s.kind) {
        Some(SymbolKind::EquName) => {
            ctx.diagnose(file, line, DiagCode::AlreadyDefinedAsEqu, format!("{name} already defined via EQU"));
        }
        Some(SymbolKind::SetName) => {
            if let Some(sym) = ctx.symtab.find_mut(name) {
                sym.value = value;
                sym.file = file.to_string();
                sym.line = line;
            }
        }
        Some(SymbolKind::Name) => {
            ctx.diagnose(file, line, DiagCode::AlreadyDefinedAsName, format!("{name} already a reserved name"));
        }
        Some(SymbolKind::Label) => {
            ctx.diagnose(file, line, DiagCode::SymbolAlreadyUsedAsLabel, format!("{name} already used as a label"));
        }
        None => {
            let _ = ctx.symtab.add(Symbol { name: name.to_string(), value, kind: SymbolKind::SetName, file: file.to_string(), line });
        }
    }
}

fn db(ctx: &mut Context, operand: &str, file: &str, line: usize) -> Vec<u8> {
    let mut bytes = Vec::new();
    for item in split_data_items(operand) {
        let item = item.trim();
        if let Some(s) = unquote(item) {
            bytes.extend(s.as_bytes());
            if !is_quoted_and_closed(item) {
                ctx.diagnose(file, line, DiagCode::MissingQuote, "DB string missing closing quote");
            }
        } else if item.is_empty() {
            ctx.diagnose(file, line, DiagCode::MissingField, "DB expects a value");
        } else {
            let value = evaluate(ctx, item, file, line);
            bytes.push(value as u8);
        }
    }
    if let Err(e) = ctx.image.write_bytes(&bytes) {
        ctx.diagnose(file, line, e, "DB write out of range");
    }
    bytes
}

fn dw(ctx: &mut Context, operand: &str, file: &str, line: usize) -> Vec<u8> {
    let mut bytes = Vec::new();
    for item in split_data_items(operand) {
        let item = item.trim();
        if let Some(s) = unquote(item) {
            let chars: Vec<u8> = s.into_bytes();
            for pair in chars.chunks(2) {
                if pair.len() == 2 {
                    // Big-endian inside the word (spec.md §4.5 DW).
                    bytes.push(pair[1]);
                    bytes.push(pair[0]);
                } else {
                    bytes.push(pair[0]);
                    bytes.push(0);
                }
            }
            if !is_quoted_and_closed(item) {
                ctx.diagnose(file, line, DiagCode::MissingQuote, "DW string missing closing quote");
            }
        } else if item.is_empty() {
            ctx.diagnose(file, line, DiagCode::MissingField, "DW expects a value");
        } else {
            let value = evaluate(ctx, item, file, line);
            let [lo, hi] = (value as u16).to_le_bytes();
            bytes.push(lo);
            bytes.push(hi);
        }
    }
    if let Err(e) = ctx.image.write_bytes(&bytes) {
        ctx.diagnose(file, line, e, "DW write out of range");
    }
    bytes
}

/// Splits DB/DW's comma-separated item list, respecting quoted strings so
/// a comma inside `"a,b"` doesn't split the string.
fn split_data_items(operand: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut in_quote: Option<char> = None;
    for c in operand.chars() {
        match in_quote {
            Some(q) if c == q => {
                in_quote = None;
                current.push(c);
            }
            Some(_) => current.push(c),
            None if c == '\'' || c == '"' => {
                in_quote = Some(c);
                current.push(c);
            }
            None if c == ',' => {
                items.push(std::mem::take(&mut current));
            }
            None => current.push(c),
        }
    }
    items.push(current);
    items
}

fn unquote(item: &str) -> Option<String> {
    let bytes = item.as_bytes();
    let quote = *bytes.first()?;
    if quote != b'\'' && quote != b'"' {
        return None;
    }
    let inner = &item[1..];
    Some(inner.trim_end_matches(quote as char).to_string())
}

fn is_quoted_and_closed(item: &str) -> bool {
    let bytes = item.as_bytes();
    bytes.len() >= 2 && bytes[0] == *bytes.last().unwrap()
}

fn do_include(ctx: &mut Context, operand: &str, file: &str, line: usize) {
    let name = unquote(operand.trim()).unwrap_or_else(|| operand.trim().to_string());
    if name.is_empty() {
        ctx.diagnose(file, line, DiagCode::MissingField, "INCLUDE requires a filename");
        return;
    }
    let relative_to = std::path::Path::new(file).parent().unwrap_or_else(|| std::path::Path::new(""));
    match ctx.file_reader.resolve(&name, relative_to, &ctx.search_path) {
        Some(path) => match ctx.file_reader.read_to_string(&path) {
            Ok(content) => {
                let display = path.to_string_lossy().to_string();
                if let Err(_e) = ctx.include_stack.push(display, &content) {
                    ctx.diagnose(file, line, DiagCode::IncludeOverflow, format!("include depth exceeded opening {name}"));
                }
            }
            Err(_) => ctx.diagnose(file, line, DiagCode::CantOpenIncludeFile, format!("cannot read {name}")),
        },
        None => ctx.diagnose(file, line, DiagCode::CantOpenIncludeFile, format!("cannot find {name}")),
    }
}

fn do_macro(ctx: &mut Context, label: Option<&str>, operand: &str, file: &str, line: usize) {
    ctx.in_macro_definition = true;
    if ctx.is_pass2 {
        return;
    }
    let Some(name) = label else {
        ctx.diagnose(file, line, DiagCode::MacroHasNoName, "MACRO requires a label naming it");
        return;
    };
    if !operand.trim().is_empty() {
        ctx.diagnose(file, line, DiagCode::MacroParametersNotSupported, "macro parameters are not supported");
    }
    ctx.macro_capture = Some(crate::driver::MacroCapture { name: name.to_string(), lines: Vec::new() });
}

fn do_endm(ctx: &mut Context) {
    ctx.in_macro_definition = false;
    if ctx.is_pass2 {
        return;
    }
    if let Some(capture) = ctx.macro_capture.take() {
        ctx.macros.insert(capture.name.to_ascii_uppercase(), capture.lines);
    }
}

/// Attempts a macro invocation for a keyword that matched no directive
/// and no opcode (spec.md §4.5: "the engine attempts a macro invocation
/// by treating the keyword as a filename stem"). The current line's
/// label, if any, is defined first against the current `pc`.
pub fn try_macro_invocation(ctx: &mut Context, label: Option<&str>, keyword: &str, file: &str, line: usize) -> bool {
    if let Some(l) = label {
        define_label(ctx, l, file, line);
    }
    let name = keyword.to_ascii_uppercase();
    match ctx.macros.get(&name).cloned() {
        Some(lines) => {
            let content = lines.join("\n");
            if ctx.include_stack.push(format!("{name}.m"), &content).is_err() {
                ctx.diagnose(file, line, DiagCode::IncludeOverflow, format!("macro {name} nesting too deep"));
            }
            true
        }
        None => {
            ctx.diagnose(file, line, DiagCode::CantFindKeyword, format!("unknown keyword/macro {keyword}"));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::Context;
    use crate::file_reader::MockFileReader;

    fn new_ctx(reader: &MockFileReader) -> Context<'_> {
        Context::new(reader, Vec::new(), true)
    }

    #[test]
    fn equ_defines_on_pass1_then_reads_back_on_pass2() {
        let reader = MockFileReader::new();
        let mut ctx = new_ctx(&reader);
        ctx.is_pass2 = false;
        do_equ(&mut ctx, Some("BASE"), "1234H", "a.asm", 1);
        assert_eq!(ctx.symtab.find("BASE").unwrap().value, 0x1234);

        ctx.is_pass2 = true;
        do_equ(&mut ctx, Some("BASE"), "1234H", "a.asm", 1);
        assert!(ctx.diagnostics.is_empty());
    }

    #[test]
    fn equ_phasing_mismatch_is_reported() {
        let reader = MockFileReader::new();
        let mut ctx = new_ctx(&reader);
        ctx.is_pass2 = false;
        do_equ(&mut ctx, Some("BASE"), "1", "a.asm", 1);
        ctx.is_pass2 = true;
        do_equ(&mut ctx, Some("BASE"), "2", "a.asm", 1);
        assert_eq!(ctx.symtab.find("BASE").unwrap().value, 2);
        assert!(ctx.diagnostics.iter().any(|d| d.code == DiagCode::PhasingError));
    }

    #[test]
    fn db_string_and_byte() {
        let reader = MockFileReader::new();
        let mut ctx = new_ctx(&reader);
        let bytes = db(&mut ctx, "'AB',0FFh", "a.asm", 1);
        assert_eq!(bytes, vec![b'A', b'B', 0xFF]);
    }

    #[test]
    fn ds_reserves_without_watermark() {
        let reader = MockFileReader::new();
        let mut ctx = new_ctx(&reader);
        ctx.image.write_bytes(&[1]).unwrap();
        dispatch(&mut ctx, None, "DS", "16", "a.asm", 1);
        ctx.image.write_bytes(&[2]).unwrap();
        assert_eq!(ctx.image.pc_lowest, 0);
        assert_eq!(ctx.image.pc_highest, 0x12);
    }

    #[test]
    fn if_else_endif_toggle() {
        let reader = MockFileReader::new();
        let mut ctx = new_ctx(&reader);
        dispatch(&mut ctx, None, "IF", "0", "a.asm", 1);
        assert!(!ctx.code_enabled());
        dispatch(&mut ctx, None, "ELSE", "", "a.asm", 2);
        assert!(ctx.code_enabled());
        dispatch(&mut ctx, None, "ENDIF", "", "a.asm", 3);
        assert!(ctx.code_enabled());
    }

    #[test]
    fn endif_underflow_is_reported() {
        let reader = MockFileReader::new();
        let mut ctx = new_ctx(&reader);
        dispatch(&mut ctx, None, "ENDIF", "", "a.asm", 1);
        assert!(ctx.diagnostics.iter().any(|d| d.code == DiagCode::IfNestingUnderflow));
    }

    #[test]
    fn unknown_keyword_falls_through_to_cant_find_keyword() {
        let reader = MockFileReader::new();
        let mut ctx = new_ctx(&reader);
        assert!(!try_macro_invocation(&mut ctx, None, "FROBNICATE", "a.asm", 1));
        assert!(ctx.diagnostics.iter().any(|d| d.code == DiagCode::CantFindKeyword));
    }

    #[test]
    fn macro_capture_then_invocation_pushes_include_level() {
        let reader = MockFileReader::new();
        let mut ctx = new_ctx(&reader);
        ctx.is_pass2 = false;
        dispatch(&mut ctx, Some("GREET"), "MACRO", "", "a.asm", 1);
        ctx.macro_capture.as_mut().unwrap().lines.push("DB 1".to_string());
        dispatch(&mut ctx, None, "ENDM", "", "a.asm", 2);
        assert!(try_macro_invocation(&mut ctx, None, "GREET", "a.asm", 3));
        assert_eq!(ctx.include_stack.current_file(), "GREET.m");
    }
}
