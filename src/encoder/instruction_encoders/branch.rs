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

//! Control-flow instructions (spec.md §4.6 "Jumps/calls", "Conditional
//! ret", "RST" classes).

use crate::encoder::components::condition_code;
use crate::encoder::constants::*;
use crate::encoder::{eval_u16, eval_u3, EncodeOutcome};
use crate::errors::DiagCode;
use crate::expr::EvalContext;

pub fn encode(keyword: &str, ops: &[&str], ctx: &EvalContext) -> Option<EncodeOutcome> {
    match keyword {
        "JMP" => Some(addr16(ops, ctx, JMP_OPCODE)),
        "CALL" => Some(addr16(ops, ctx, CALL_OPCODE)),
        "RET" => Some(EncodeOutcome::ok(vec![RET_OPCODE])),
        "PCHL" => Some(EncodeOutcome::ok(vec![PCHL_OPCODE])),
        "RST" => Some(rst(ops, ctx)),
        _ => conditional_mnemonic(keyword).map(|(cc_text, base)| conditional(ops, ctx, cc_text, base)),
    }
}

/// `Jcc`/`Ccc`/`Rcc` are written with the condition baked into the
/// mnemonic (`JNZ`, `CZ`, `RM`, ...) rather than as an operand; this maps
/// the mnemonic suffix back to a condition-code token and the class's
/// base opcode.
fn conditional_mnemonic(keyword: &str) -> Option<(&'static str, u8)> {
    let (suffix, base) = if let Some(s) = keyword.strip_prefix('J') {
        (s, JCC_BASE_OPCODE)
    } else if let Some(s) = keyword.strip_prefix('C') {
        (s, CALLCC_BASE_OPCODE)
    } else if let Some(s) = keyword.strip_prefix('R') {
        (s, RCC_BASE_OPCODE)
    } else {
        return None;
    };
    let cc = match suffix {
        "NZ" => "NZ",
        "Z" => "Z",
        "NC" => "NC",
        "C" => "C",
        "PO" => "PO",
        "PE" => "PE",
        "P" => "P",
        "M" => "M",
        _ => return None,
    };
    Some((cc, base))
}

fn conditional(ops: &[&str], ctx: &EvalContext, cc_text: &str, base_opcode: u8) -> EncodeOutcome {
    let cc = condition_code(cc_text).expect("validated by conditional_mnemonic");
    let opcode = base_opcode | (cc << 3);
    if base_opcode == RCC_BASE_OPCODE {
        // Conditional returns take no operand.
        return EncodeOutcome::ok(vec![opcode]);
    }
    let [addr] = ops else {
        return EncodeOutcome::err(DiagCode::MissingField);
    };
    let (value, diags) = eval_u16(addr, ctx);
    let [lo, hi] = value.to_le_bytes();
    EncodeOutcome { bytes: vec![opcode, lo, hi], diagnostics: diags }
}

fn addr16(ops: &[&str], ctx: &EvalContext, opcode: u8) -> EncodeOutcome {
    let [addr] = ops else {
        return EncodeOutcome::err(DiagCode::MissingField);
    };
    let (value, diags) = eval_u16(addr, ctx);
    let [lo, hi] = value.to_le_bytes();
    EncodeOutcome { bytes: vec![opcode, lo, hi], diagnostics: diags }
}

fn rst(ops: &[&str], ctx: &EvalContext) -> EncodeOutcome {
    let [n] = ops else {
        return EncodeOutcome::err(DiagCode::MissingField);
    };
    let (n, diags) = eval_u3(n, ctx);
    EncodeOutcome { bytes: vec![RST_BASE_OPCODE | (n << 3)], diagnostics: diags }
}
