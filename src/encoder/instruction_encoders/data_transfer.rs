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

//! MOV/MVI/LXI and the absolute/indirect load-store family (spec.md §4.6
//! "Reg-reg", "Reg-imm8", "Imm16-pair", "Addr16", "Pair-only" classes as
//! they apply to data movement).

use crate::encoder::components::{dest_reg, pair16, src_reg, PAIR_BC, PAIR_DE, PAIR_HL, PAIR_SP};
use crate::encoder::constants::*;
use crate::encoder::{eval_u16, eval_u8, EncodeOutcome};
use crate::errors::DiagCode;
use crate::expr::EvalContext;

pub fn encode(keyword: &str, ops: &[&str], ctx: &EvalContext) -> Option<EncodeOutcome> {
    match keyword {
        "MOV" => Some(mov(ops)),
        "MVI" => Some(mvi(ops, ctx)),
        "LXI" => Some(lxi(ops, ctx)),
        "STA" => Some(addr16(ops, ctx, STA_OPCODE)),
        "LDA" => Some(addr16(ops, ctx, LDA_OPCODE)),
        "SHLD" => Some(addr16(ops, ctx, SHLD_OPCODE)),
        "LHLD" => Some(addr16(ops, ctx, LHLD_OPCODE)),
        "STAX" => Some(stax_ldax(ops, STAX_BASE_OPCODE)),
        "LDAX" => Some(stax_ldax(ops, LDAX_BASE_OPCODE)),
        "XCHG" => Some(EncodeOutcome::ok(vec![XCHG_OPCODE])),
        _ => None,
    }
}

fn mov(ops: &[&str]) -> EncodeOutcome {
    let [d, s] = ops else {
        return EncodeOutcome::err(DiagCode::MissingField);
    };
    let mut diags = Vec::new();
    let d = match dest_reg(d) {
        Ok(v) => v,
        Err(e) => {
            diags.push(e);
            0
        }
    };
    let s = match src_reg(s) {
        Ok(v) => v,
        Err(e) => {
            diags.push(e);
            0
        }
    };
    // MOV M,M would double-decode to HLT's opcode; the reference silently
    // accepts this rather than raising the reserved "both dst and src"
    // code (spec.md Open Questions).
    EncodeOutcome { bytes: vec![MOV_BASE_OPCODE | d | s], diagnostics: diags }
}

fn mvi(ops: &[&str], ctx: &EvalContext) -> EncodeOutcome {
    let [r, imm] = ops else {
        return EncodeOutcome::err(DiagCode::MissingField);
    };
    let mut diags = Vec::new();
    let r = match dest_reg(r) {
        Ok(v) => v,
        Err(e) => {
            diags.push(e);
            0
        }
    };
    let (value, mut d) = eval_u8(imm, ctx);
    diags.append(&mut d);
    EncodeOutcome { bytes: vec![MVI_BASE_OPCODE | r, value], diagnostics: diags }
}

fn lxi(ops: &[&str], ctx: &EvalContext) -> EncodeOutcome {
    let [rp, imm] = ops else {
        return EncodeOutcome::err(DiagCode::MissingField);
    };
    let mut diags = Vec::new();
    let rp = match pair16(rp, PAIR_BC | PAIR_DE | PAIR_HL | PAIR_SP) {
        Ok(v) => v,
        Err(e) => {
            diags.push(e);
            0
        }
    };
    let (value, mut d) = eval_u16(imm, ctx);
    diags.append(&mut d);
    let [lo, hi] = value.to_le_bytes();
    EncodeOutcome { bytes: vec![LXI_BASE_OPCODE | rp, lo, hi], diagnostics: diags }
}

fn addr16(ops: &[&str], ctx: &EvalContext, opcode: u8) -> EncodeOutcome {
    let [addr] = ops else {
        return EncodeOutcome::err(DiagCode::MissingField);
    };
    let (value, diags) = eval_u16(addr, ctx);
    let [lo, hi] = value.to_le_bytes();
    EncodeOutcome { bytes: vec![opcode, lo, hi], diagnostics: diags }
}

fn stax_ldax(ops: &[&str], base_opcode: u8) -> EncodeOutcome {
    let [rp] = ops else {
        return EncodeOutcome::err(DiagCode::MissingField);
    };
    match pair16(rp, PAIR_BC | PAIR_DE) {
        Ok(v) => EncodeOutcome::ok(vec![base_opcode | v]),
        Err(e) => EncodeOutcome::err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol_table::SymbolTable;

    fn ctx(symtab: &SymbolTable) -> EvalContext<'_> {
        EvalContext { symtab, pc: 0, is_pass2: true, extended_operators: true }
    }

    #[test]
    fn mov_a_b() {
        let out = mov(&["A", "B"]);
        assert_eq!(out.bytes, vec![0x78]);
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn mov_m_m_is_hlt() {
        let out = mov(&["M", "M"]);
        assert_eq!(out.bytes, vec![0x76]);
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn mvi_a_imm() {
        let t = SymbolTable::new();
        let out = mvi(&["A", "5"], &ctx(&t));
        assert_eq!(out.bytes, vec![0x3E, 5]);
    }

    #[test]
    fn lxi_h_label() {
        let t = SymbolTable::new();
        let out = lxi(&["H", "1234H"], &ctx(&t));
        assert_eq!(out.bytes, vec![0x21, 0x34, 0x12]);
    }

    #[test]
    fn stax_only_accepts_bc_de() {
        let out = stax_ldax(&["H"], STAX_BASE_OPCODE);
        assert_eq!(out.diagnostics, vec![DiagCode::RegisterNotAllowed]);
    }
}
