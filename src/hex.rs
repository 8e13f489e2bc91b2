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

//! Intel HEX emitter (spec.md §4.8 and §6): encodes a byte fragment
//! starting at a given address into `:LLAAAATT<data>CC` data records of up
//! to 16 bytes, plus the final end-of-file record.

const MAX_RECORD_LEN: usize = 16;
const RECORD_TYPE_DATA: u8 = 0x00;
const RECORD_TYPE_EOF: u8 = 0x01;

fn checksum(len: u8, addr: u16, rec_type: u8, data: &[u8]) -> u8 {
    let mut sum = len as u32 + (addr >> 8) as u32 + (addr & 0xFF) as u32 + rec_type as u32;
    for &b in data {
        sum += b as u32;
    }
    (0u8).wrapping_sub(sum as u8)
}

fn encode_record(addr: u16, rec_type: u8, data: &[u8]) -> String {
    let cc = checksum(data.len() as u8, addr, rec_type, data);
    let mut line = format!(":{:02X}{:04X}{:02X}", data.len(), addr, rec_type);
    for &b in data {
        line.push_str(&format!("{b:02X}"));
    }
    line.push_str(&format!("{cc:02X}"));
    line
}

/// Splits `data` (starting at `start_addr`) into successive 16-byte data
/// records. Called on ORG and at pass-2 end to flush the fragment that
/// accumulated since the previous flush (spec.md §4.5 ORG/DS, §4.8).
pub fn emit_fragment(start_addr: u16, data: &[u8]) -> Vec<String> {
    data.chunks(MAX_RECORD_LEN)
        .enumerate()
        .map(|(i, chunk)| encode_record(start_addr.wrapping_add((i * MAX_RECORD_LEN) as u16), RECORD_TYPE_DATA, chunk))
        .collect()
}

/// The terminal `:00000001FF` record.
pub fn end_of_file_record() -> String {
    encode_record(0, RECORD_TYPE_EOF, &[])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_byte_nop_record() {
        let recs = emit_fragment(0x0000, &[0x00]);
        assert_eq!(recs, vec![":0100000000FF".to_string()]);
    }

    #[test]
    fn lxi_record() {
        let recs = emit_fragment(0x0100, &[0x21, 0x34, 0x12]);
        assert_eq!(recs, vec![":0301000021341295".to_string()]);
    }

    #[test]
    fn eof_record() {
        assert_eq!(end_of_file_record(), ":00000001FF");
    }

    #[test]
    fn splits_over_sixteen_bytes() {
        let data = vec![0xAAu8; 20];
        let recs = emit_fragment(0, &data);
        assert_eq!(recs.len(), 2);
        assert!(recs[0].starts_with(":10000000"));
        assert!(recs[1].starts_with(":0400100"));
    }

    #[test]
    fn checksum_is_self_consistent() {
        for rec in emit_fragment(0x4000, &[1, 2, 3, 4, 5]) {
            let bytes: Vec<u8> = (1..rec.len())
                .step_by(2)
                .map_while(|i| u8::from_str_radix(&rec[i..i + 2], 16).ok())
                .collect();
            let sum: u32 = bytes.iter().map(|&b| b as u32).sum();
            assert_eq!(sum % 256, 0);
        }
    }
}
