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

//! Opcode encoder (spec.md §4.6): dispatches an uppercased mnemonic and
//! its operand text to the instruction class that handles it. Returns
//! `None` for a keyword that isn't a recognised mnemonic at all, so the
//! driver can fall through to directive dispatch and finally macro
//! invocation (spec.md §4.5).

mod components;
mod constants;
mod instruction_encoders;

use crate::errors::DiagCode;
use crate::expr::{self, EvalContext};

pub use components::{condition_code, dest_reg, pair16, src_reg, PairMask, PAIR_BC, PAIR_DE, PAIR_HL, PAIR_PSW, PAIR_SP};

/// The bytes an instruction encodes to, plus any diagnostics raised while
/// decoding its operands (range checks, bad registers, bad pairs).
pub struct EncodeOutcome {
    pub bytes: Vec<u8>,
    pub diagnostics: Vec<DiagCode>,
}

impl EncodeOutcome {
    fn ok(bytes: Vec<u8>) -> Self {
        EncodeOutcome { bytes, diagnostics: Vec::new() }
    }

    fn err(code: DiagCode) -> Self {
        EncodeOutcome { bytes: Vec::new(), diagnostics: vec![code] }
    }
}

/// Splits a comma-separated operand list, trimming whitespace around each
/// field. `MOV A,B` -> `["A", "B"]`.
fn split_operands(operand: &str) -> Vec<&str> {
    if operand.trim().is_empty() {
        Vec::new()
    } else {
        operand.split(',').map(str::trim).collect()
    }
}

/// Evaluates `text` and range-checks it against an 8-bit field, emitting
/// `OperandOverRange` (but still returning the truncated low byte) if it
/// doesn't fit.
fn eval_u8(text: &str, ctx: &EvalContext) -> (u8, Vec<DiagCode>) {
    let out = expr::evaluate(text, ctx);
    let mut diags = out.diagnostics;
    if !(-128..=255).contains(&out.value) {
        diags.push(DiagCode::OperandOverRange);
    }
    (out.value as u8, diags)
}

/// As `eval_u8`, but for a 16-bit field.
fn eval_u16(text: &str, ctx: &EvalContext) -> (u16, Vec<DiagCode>) {
    let out = expr::evaluate(text, ctx);
    let mut diags = out.diagnostics;
    if !(-32768..=65535).contains(&out.value) {
        diags.push(DiagCode::ExpressionValueOverRange);
    }
    (out.value as u16, diags)
}

/// As `eval_u8`, but for a 3-bit field (RST).
fn eval_u3(text: &str, ctx: &EvalContext) -> (u8, Vec<DiagCode>) {
    let out = expr::evaluate(text, ctx);
    let mut diags = out.diagnostics;
    if !(0..=7).contains(&out.value) {
        diags.push(DiagCode::OperandOverRange);
    }
    (out.value as u8 & 0x7, diags)
}

/// Dispatches `keyword` (already uppercased by the tokeniser) to its
/// instruction-class encoder. Returns `None` when the keyword isn't an
/// 8080 mnemonic at all.
pub fn encode(keyword: &str, operand: &str, ctx: &EvalContext) -> Option<EncodeOutcome> {
    use instruction_encoders::{arithmetic, branch, data_transfer, misc, stack_io};

    let ops = split_operands(operand);
    data_transfer::encode(keyword, &ops, ctx)
        .or_else(|| arithmetic::encode(keyword, &ops, ctx))
        .or_else(|| branch::encode(keyword, &ops, ctx))
        .or_else(|| stack_io::encode(keyword, &ops, ctx))
        .or_else(|| misc::encode(keyword, &ops, ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol_table::SymbolTable;

    fn ctx(symtab: &SymbolTable) -> EvalContext<'_> {
        EvalContext { symtab, pc: 0, is_pass2: true, extended_operators: true }
    }

    #[test]
    fn unknown_mnemonic_is_none() {
        let t = SymbolTable::new();
        assert!(encode("FROB", "", &ctx(&t)).is_none());
    }

    #[test]
    fn nop_encodes_single_byte() {
        let t = SymbolTable::new();
        let out = encode("NOP", "", &ctx(&t)).unwrap();
        assert_eq!(out.bytes, vec![0x00]);
    }
}
