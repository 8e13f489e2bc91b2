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

//! Shared operand-decoding building blocks (spec.md §4.6): register, pair,
//! and condition-code lookups that every instruction class's encoder
//! calls into.

use crate::errors::DiagCode;

/// `dest_reg`/`src_reg` share this table (spec.md §4.6): A,B,C,D,E,H,L,M
/// map to 7,0,1,2,3,4,5,6.
fn reg_code(c: char) -> Option<u8> {
    Some(match c.to_ascii_uppercase() {
        'B' => 0,
        'C' => 1,
        'D' => 2,
        'E' => 3,
        'H' => 4,
        'L' => 5,
        'M' => 6,
        'A' => 7,
        _ => return None,
    })
}

/// Parses a single-character register operand, placed in bits 5:3.
pub fn dest_reg(text: &str) -> Result<u8, DiagCode> {
    reg_code_of(text).map(|r| r << 3).ok_or(DiagCode::BadDestinationRegister)
}

/// Parses a single-character register operand, placed in bits 2:0.
pub fn src_reg(text: &str) -> Result<u8, DiagCode> {
    reg_code_of(text).ok_or(DiagCode::BadSourceRegister)
}

/// Same as `src_reg`/`dest_reg` but returns the bare 0..=7 code, for
/// callers that place it somewhere other than bits 2:0/5:3 (RST, bit
/// tests, etc).
pub fn reg_code_of(text: &str) -> Option<u8> {
    let text = text.trim();
    if text.chars().count() != 1 {
        return None;
    }
    reg_code(text.chars().next()?)
}

/// Which register pairs a given mnemonic accepts (spec.md §4.6: "rejects
/// pairs not in the allowed mask"). A plain bitmask rather than an enum
/// type since `SP` and `PSW` share one encoding slot but are distinct
/// membership bits.
pub type PairMask = u8;
pub const PAIR_BC: PairMask = 0b0001;
pub const PAIR_DE: PairMask = 0b0010;
pub const PAIR_HL: PairMask = 0b0100;
pub const PAIR_SP: PairMask = 0b1000;
pub const PAIR_PSW: PairMask = 0b1_0000;

/// Maps a register-pair token (`BC`/`B`, `DE`/`D`, `HL`/`H`, `SP`, `PSW`)
/// to its 0x00/0x10/0x20/0x30 opcode offset, rejecting pairs outside
/// `allowed`.
pub fn pair16(text: &str, allowed: PairMask) -> Result<u8, DiagCode> {
    let upper = text.trim().to_ascii_uppercase();
    let (offset, mask) = match upper.as_str() {
        "B" | "BC" => (0x00, PAIR_BC),
        "D" | "DE" => (0x10, PAIR_DE),
        "H" | "HL" => (0x20, PAIR_HL),
        "SP" => (0x30, PAIR_SP),
        "PSW" => (0x30, PAIR_PSW),
        _ => return Err(DiagCode::BadRegisterPair),
    };
    if allowed & mask == 0 {
        return Err(DiagCode::RegisterNotAllowed);
    }
    Ok(offset)
}

/// Condition codes in encoding order (spec.md §4.6): NZ, Z, NC, C, PO, PE,
/// P, M -> 0..7, to be shifted into bits 5:3 and added to the class's base
/// opcode.
pub fn condition_code(text: &str) -> Result<u8, DiagCode> {
    match text.trim().to_ascii_uppercase().as_str() {
        "NZ" => Ok(0),
        "Z" => Ok(1),
        "NC" => Ok(2),
        "C" => Ok(3),
        "PO" => Ok(4),
        "PE" => Ok(5),
        "P" => Ok(6),
        "M" => Ok(7),
        _ => Err(DiagCode::BadData),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_codes_match_table() {
        assert_eq!(reg_code_of("A"), Some(7));
        assert_eq!(reg_code_of("B"), Some(0));
        assert_eq!(reg_code_of("M"), Some(6));
        assert_eq!(reg_code_of("a"), Some(7));
        assert_eq!(reg_code_of("X"), None);
    }

    #[test]
    fn dest_reg_shifts_into_bits_5_3() {
        assert_eq!(dest_reg("A").unwrap(), 7 << 3);
    }

    #[test]
    fn pair16_rejects_disallowed_pair() {
        assert_eq!(pair16("SP", PAIR_BC | PAIR_DE), Err(DiagCode::RegisterNotAllowed));
    }

    #[test]
    fn pair16_accepts_psw() {
        assert_eq!(pair16("PSW", PAIR_PSW).unwrap(), 0x30);
    }

    #[test]
    fn condition_code_order() {
        assert_eq!(condition_code("NZ").unwrap(), 0);
        assert_eq!(condition_code("M").unwrap(), 7);
    }
}
