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

//! Opcode byte constants for the 8080 instruction set (spec.md §4.6).

pub const HLT_OPCODE: u8 = 0x76;
pub const MOV_BASE_OPCODE: u8 = 0x40;
pub const MVI_BASE_OPCODE: u8 = 0x06;
pub const LXI_BASE_OPCODE: u8 = 0x01;
pub const INX_BASE_OPCODE: u8 = 0x03;
pub const DCX_BASE_OPCODE: u8 = 0x0B;
pub const DAD_BASE_OPCODE: u8 = 0x09;
pub const PUSH_BASE_OPCODE: u8 = 0xC5;
pub const POP_BASE_OPCODE: u8 = 0xC1;
pub const STAX_BASE_OPCODE: u8 = 0x02;
pub const LDAX_BASE_OPCODE: u8 = 0x0A;
pub const INR_BASE_OPCODE: u8 = 0x04;
pub const DCR_BASE_OPCODE: u8 = 0x05;

pub const ADD_BASE_OPCODE: u8 = 0x80;
pub const ADC_BASE_OPCODE: u8 = 0x88;
pub const SUB_BASE_OPCODE: u8 = 0x90;
pub const SBB_BASE_OPCODE: u8 = 0x98;
pub const ANA_BASE_OPCODE: u8 = 0xA0;
pub const XRA_BASE_OPCODE: u8 = 0xA8;
pub const ORA_BASE_OPCODE: u8 = 0xB0;
pub const CMP_BASE_OPCODE: u8 = 0xB8;

pub const ADI_OPCODE: u8 = 0xC6;
pub const ACI_OPCODE: u8 = 0xCE;
pub const SUI_OPCODE: u8 = 0xD6;
pub const SBI_OPCODE: u8 = 0xDE;
pub const ANI_OPCODE: u8 = 0xE6;
pub const XRI_OPCODE: u8 = 0xEE;
pub const ORI_OPCODE: u8 = 0xF6;
pub const CPI_OPCODE: u8 = 0xFE;

pub const STA_OPCODE: u8 = 0x32;
pub const LDA_OPCODE: u8 = 0x3A;
pub const SHLD_OPCODE: u8 = 0x22;
pub const LHLD_OPCODE: u8 = 0x2A;

pub const JMP_OPCODE: u8 = 0xC3;
pub const JCC_BASE_OPCODE: u8 = 0xC2;
pub const CALL_OPCODE: u8 = 0xCD;
pub const CALLCC_BASE_OPCODE: u8 = 0xC4;
pub const RET_OPCODE: u8 = 0xC9;
pub const RCC_BASE_OPCODE: u8 = 0xC0;
pub const RST_BASE_OPCODE: u8 = 0xC7;

pub const IN_OPCODE: u8 = 0xDB;
pub const OUT_OPCODE: u8 = 0xD3;

pub const NOP_OPCODE: u8 = 0x00;
pub const RLC_OPCODE: u8 = 0x07;
pub const RRC_OPCODE: u8 = 0x0F;
pub const RAL_OPCODE: u8 = 0x17;
pub const RAR_OPCODE: u8 = 0x1F;
pub const DAA_OPCODE: u8 = 0x27;
pub const CMA_OPCODE: u8 = 0x2F;
pub const STC_OPCODE: u8 = 0x37;
pub const CMC_OPCODE: u8 = 0x3F;
pub const XCHG_OPCODE: u8 = 0xEB;
pub const XTHL_OPCODE: u8 = 0xE3;
pub const SPHL_OPCODE: u8 = 0xF9;
pub const PCHL_OPCODE: u8 = 0xE9;
pub const DI_OPCODE: u8 = 0xF3;
pub const EI_OPCODE: u8 = 0xFB;
