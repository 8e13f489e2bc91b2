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

//! Target image (spec.md §3 "Target image" and §4.8): the 64 KiB output
//! buffer plus the four cursors that track where bytes land and which
//! region has actually been written.

use crate::errors::DiagCode;

pub const IMAGE_SIZE: usize = 0x1_0000;

pub struct Image {
    bytes: Box<[u8; IMAGE_SIZE]>,
    /// Signed so an out-of-range `ORG`/advance can be detected before
    /// masking back into `pc`.
    pub addr: i32,
    pub pc: u16,
    pub pc_org: u16,
    pub pc_lowest: u16,
    pub pc_highest: u16,
}

impl Default for Image {
    fn default() -> Self {
        Image {
            bytes: Box::new([0u8; IMAGE_SIZE]),
            addr: 0,
            pc: 0,
            pc_org: 0,
            pc_lowest: 0xFFFF,
            pc_highest: 0,
        }
    }
}

impl Image {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets cursors and zeroes the buffer at the start of a pass
    /// (spec.md §4.7 step 1).
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Sets `pc`/`pc_org` together, as ORG does. Returns
    /// `ProgramCounterOverRange` if `value` doesn't fit in 16 bits.
    pub fn set_org(&mut self, value: i32) -> Result<(), DiagCode> {
        if !(0..=0xFFFF).contains(&value) {
            return Err(DiagCode::ProgramCounterOverRange);
        }
        self.addr = value;
        self.pc = value as u16;
        self.pc_org = value as u16;
        Ok(())
    }

    /// Writes bytes at the current `pc`, advancing `pc`/`addr` and the
    /// watermarks. Used by TEXT (opcode) and DB/DW rows.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<(), DiagCode> {
        for &b in data {
            if !(0..IMAGE_SIZE as i32).contains(&self.addr) {
                return Err(DiagCode::ProgramCounterOverRange);
            }
            self.bytes[self.addr as usize] = b;
            self.pc_lowest = self.pc_lowest.min(self.addr as u16);
            self.pc_highest = self.pc_highest.max(self.addr as u16 + 1);
            self.addr += 1;
            self.pc = self.addr as u16;
        }
        Ok(())
    }

    /// Advances `pc` by `n` bytes without touching the watermarks or the
    /// buffer contents, as DS does, then starts a fresh HEX fragment at
    /// the new `pc` (spec.md §4.5 DS).
    pub fn reserve(&mut self, n: i32) -> Result<(), DiagCode> {
        if n < 0 {
            return Err(DiagCode::NegativeValueOnDs);
        }
        let new_addr = self.addr + n;
        if new_addr > IMAGE_SIZE as i32 {
            return Err(DiagCode::ProgramCounterOverRange);
        }
        self.addr = new_addr;
        self.pc = self.addr as u16;
        self.pc_org = self.pc;
        Ok(())
    }

    /// `Image[pc_lowest..pc_highest]`, the final binary output.
    pub fn written_region(&self) -> &[u8] {
        if self.pc_lowest >= self.pc_highest {
            &[]
        } else {
            &self.bytes[self.pc_lowest as usize..self.pc_highest as usize]
        }
    }

    /// Bytes from `pc_org` to the current `addr`, the span covered by the
    /// next HEX fragment.
    pub fn current_fragment(&self) -> &[u8] {
        let start = self.pc_org as usize;
        let end = self.addr as usize;
        if start >= end {
            &[]
        } else {
            &self.bytes[start..end]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_bytes_advances_cursors_and_watermarks() {
        let mut img = Image::new();
        img.set_org(0x100).unwrap();
        img.write_bytes(&[0x21, 0x34, 0x12]).unwrap();
        assert_eq!(img.pc, 0x103);
        assert_eq!(img.pc_lowest, 0x100);
        assert_eq!(img.pc_highest, 0x103);
        assert_eq!(img.written_region(), &[0x21, 0x34, 0x12]);
    }

    #[test]
    fn reserve_advances_pc_but_not_watermark() {
        let mut img = Image::new();
        img.set_org(0).unwrap();
        img.write_bytes(&[1]).unwrap();
        img.reserve(16).unwrap();
        img.write_bytes(&[2]).unwrap();
        assert_eq!(img.pc_lowest, 0);
        assert_eq!(img.pc_highest, 0x12);
    }

    #[test]
    fn reserve_rejects_negative() {
        let mut img = Image::new();
        assert_eq!(img.reserve(-1), Err(DiagCode::NegativeValueOnDs));
    }

    #[test]
    fn org_out_of_range_is_rejected() {
        let mut img = Image::new();
        assert_eq!(img.set_org(0x1_0000), Err(DiagCode::ProgramCounterOverRange));
    }

    #[test]
    fn zero_length_reserve_advances_nothing() {
        let mut img = Image::new();
        img.set_org(5).unwrap();
        img.reserve(0).unwrap();
        assert_eq!(img.pc, 5);
    }
}
