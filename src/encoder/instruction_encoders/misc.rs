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

//! Implicit, no-operand instructions (spec.md §4.6 "Implicit" class).

use crate::encoder::constants::*;
use crate::encoder::EncodeOutcome;
use crate::expr::EvalContext;

pub fn encode(keyword: &str, _ops: &[&str], _ctx: &EvalContext) -> Option<EncodeOutcome> {
    let opcode = match keyword {
        "HLT" => HLT_OPCODE,
        "RLC" => RLC_OPCODE,
        "RRC" => RRC_OPCODE,
        "RAL" => RAL_OPCODE,
        "RAR" => RAR_OPCODE,
        "CMA" => CMA_OPCODE,
        "CMC" => CMC_OPCODE,
        "STC" => STC_OPCODE,
        "EI" => EI_OPCODE,
        "DI" => DI_OPCODE,
        "NOP" => NOP_OPCODE,
        _ => return None,
    };
    Some(EncodeOutcome::ok(vec![opcode]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol_table::SymbolTable;

    #[test]
    fn hlt_opcode() {
        let t = SymbolTable::new();
        let ctx = EvalContext { symtab: &t, pc: 0, is_pass2: true, extended_operators: true };
        assert_eq!(encode("HLT", &[], &ctx).unwrap().bytes, vec![0x76]);
    }
}
