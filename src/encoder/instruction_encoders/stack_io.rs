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

//! Stack manipulation and port I/O (spec.md §4.6 "Pair-only", "IN/OUT"
//! classes as they apply to the stack and to device ports).

use crate::encoder::components::{pair16, PAIR_BC, PAIR_DE, PAIR_HL, PAIR_PSW};
use crate::encoder::constants::*;
use crate::encoder::{eval_u8, EncodeOutcome};
use crate::errors::DiagCode;
use crate::expr::EvalContext;

pub fn encode(keyword: &str, ops: &[&str], ctx: &EvalContext) -> Option<EncodeOutcome> {
    match keyword {
        "PUSH" => Some(pair_only(ops, PUSH_BASE_OPCODE)),
        "POP" => Some(pair_only(ops, POP_BASE_OPCODE)),
        "XTHL" => Some(EncodeOutcome::ok(vec![XTHL_OPCODE])),
        "SPHL" => Some(EncodeOutcome::ok(vec![SPHL_OPCODE])),
        "IN" => Some(port(ops, ctx, IN_OPCODE)),
        "OUT" => Some(port(ops, ctx, OUT_OPCODE)),
        _ => None,
    }
}

fn pair_only(ops: &[&str], base_opcode: u8) -> EncodeOutcome {
    let [rp] = ops else {
        return EncodeOutcome::err(DiagCode::MissingField);
    };
    match pair16(rp, PAIR_BC | PAIR_DE | PAIR_HL | PAIR_PSW) {
        Ok(v) => EncodeOutcome::ok(vec![base_opcode | v]),
        Err(e) => EncodeOutcome::err(e),
    }
}

fn port(ops: &[&str], ctx: &EvalContext, opcode: u8) -> EncodeOutcome {
    let [n] = ops else {
        return EncodeOutcome::err(DiagCode::MissingField);
    };
    let (value, diags) = eval_u8(n, ctx);
    EncodeOutcome { bytes: vec![opcode, value], diagnostics: diags }
}
