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

//! A two-pass cross-assembler for the Intel 8080 instruction set,
//! producing a raw binary image, an Intel HEX file, and an optional
//! listing.

pub mod directive;
pub mod driver;
pub mod encoder;
pub mod errors;
pub mod expr;
pub mod file_reader;
pub mod hex;
pub mod image;
pub mod include_stack;
pub mod line;
pub mod listing;
pub mod numeric;
pub mod symbol_table;

pub use driver::{assemble, AssembleOptions, AssembleOutput};
pub use errors::AssemblyError;
