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

//! ALU instructions (spec.md §4.6 "Arith reg"/"Arith imm" classes) plus
//! the register-pair increment/decrement/add-to-HL and 8-bit inc/dec
//! families that share their operand shape.

use crate::encoder::components::{dest_reg, pair16, src_reg, PAIR_BC, PAIR_DE, PAIR_HL, PAIR_SP};
use crate::encoder::constants::*;
use crate::encoder::{eval_u8, EncodeOutcome};
use crate::errors::DiagCode;
use crate::expr::EvalContext;

pub fn encode(keyword: &str, ops: &[&str], ctx: &EvalContext) -> Option<EncodeOutcome> {
    match keyword {
        "ADD" => Some(arith_reg(ops, ADD_BASE_OPCODE)),
        "ADC" => Some(arith_reg(ops, ADC_BASE_OPCODE)),
        "SUB" => Some(arith_reg(ops, SUB_BASE_OPCODE)),
        "SBB" => Some(arith_reg(ops, SBB_BASE_OPCODE)),
        "ANA" => Some(arith_reg(ops, ANA_BASE_OPCODE)),
        "XRA" => Some(arith_reg(ops, XRA_BASE_OPCODE)),
        "ORA" => Some(arith_reg(ops, ORA_BASE_OPCODE)),
        "CMP" => Some(arith_reg(ops, CMP_BASE_OPCODE)),
        "ADI" => Some(arith_imm(ops, ctx, ADI_OPCODE)),
        "ACI" => Some(arith_imm(ops, ctx, ACI_OPCODE)),
        "SUI" => Some(arith_imm(ops, ctx, SUI_OPCODE)),
        "SBI" => Some(arith_imm(ops, ctx, SBI_OPCODE)),
        "ANI" => Some(arith_imm(ops, ctx, ANI_OPCODE)),
        "XRI" => Some(arith_imm(ops, ctx, XRI_OPCODE)),
        "ORI" => Some(arith_imm(ops, ctx, ORI_OPCODE)),
        "CPI" => Some(arith_imm(ops, ctx, CPI_OPCODE)),
        "INX" => Some(pair_only(ops, INX_BASE_OPCODE)),
        "DCX" => Some(pair_only(ops, DCX_BASE_OPCODE)),
        "DAD" => Some(pair_only(ops, DAD_BASE_OPCODE)),
        "INR" => Some(reg_only(ops, INR_BASE_OPCODE)),
        "DCR" => Some(reg_only(ops, DCR_BASE_OPCODE)),
        "DAA" => Some(EncodeOutcome::ok(vec![DAA_OPCODE])),
        _ => None,
    }
}

fn arith_reg(ops: &[&str], base_opcode: u8) -> EncodeOutcome {
    let [r] = ops else {
        return EncodeOutcome::err(DiagCode::MissingField);
    };
    match src_reg(r) {
        Ok(v) => EncodeOutcome::ok(vec![base_opcode | v]),
        Err(e) => EncodeOutcome::err(e),
    }
}

fn arith_imm(ops: &[&str], ctx: &EvalContext, opcode: u8) -> EncodeOutcome {
    let [imm] = ops else {
        return EncodeOutcome::err(DiagCode::MissingField);
    };
    let (value, diags) = eval_u8(imm, ctx);
    EncodeOutcome { bytes: vec![opcode, value], diagnostics: diags }
}

fn pair_only(ops: &[&str], base_opcode: u8) -> EncodeOutcome {
    let [rp] = ops else {
        return EncodeOutcome::err(DiagCode::MissingField);
    };
    match pair16(rp, PAIR_BC | PAIR_DE | PAIR_HL | PAIR_SP) {
        Ok(v) => EncodeOutcome::ok(vec![base_opcode | v]),
        Err(e) => EncodeOutcome::err(e),
    }
}

fn reg_only(ops: &[&str], base_opcode: u8) -> EncodeOutcome {
    let [r] = ops else {
        return EncodeOutcome::err(DiagCode::MissingField);
    };
    match dest_reg(r) {
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
    fn add_b() {
        assert_eq!(arith_reg(&["B"], ADD_BASE_OPCODE).bytes, vec![0x80]);
    }

    #[test]
    fn adi_imm() {
        let t = SymbolTable::new();
        assert_eq!(arith_imm(&["10"], &ctx(&t), ADI_OPCODE).bytes, vec![0xC6, 10]);
    }

    #[test]
    fn inx_h() {
        assert_eq!(pair_only(&["H"], INX_BASE_OPCODE).bytes, vec![0x23]);
    }

    #[test]
    fn dcr_m() {
        assert_eq!(reg_only(&["M"], DCR_BASE_OPCODE).bytes, vec![0x35]);
    }
}
