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

//! Listing emitter (spec.md §6): one row per source line carrying its
//! address and emitted bytes, followed by a symbol-table trailer grouped
//! by kind in insertion order.

use crate::symbol_table::{SymbolKind, SymbolTable};

pub struct ListingRow {
    pub file: String,
    pub line: usize,
    pub address: Option<u16>,
    pub bytes: Vec<u8>,
    pub label: Option<String>,
    pub source: String,
}

/// `%6d %04X %02X %02X %02X %02X\t<source>` (spec.md §6), one `%02X`
/// field per byte (1-4); wider DB/DW rows wrap 4 bytes per continuation
/// line, 3 columns each, matching the reference tool's `PrintList`.
fn render_row(row: &ListingRow) -> String {
    let Some(addr) = row.address else {
        return format!("\t\t\t{}", row.source);
    };
    if row.bytes.len() <= 4 && !row.bytes.is_empty() {
        let mut line = format!("{:>6} {addr:04X}", row.line);
        for b in &row.bytes {
            line.push_str(&format!(" {b:02X}"));
        }
        line.push('\t');
        line.push_str(&row.source);
        return line;
    }

    let mut line = format!("{:>6} {addr:04X}\t\t{}\n", row.line, row.source);
    let mut col = 0;
    for (i, b) in row.bytes.iter().enumerate() {
        if col == 0 {
            line.push_str("            ");
        }
        line.push_str(&format!("{b:02X} "));
        col += 3;
        if col >= 12 {
            if i + 1 < row.bytes.len() {
                line.push('\n');
            }
            col = 0;
        }
    }
    line
}

/// One symbol-table group: `<name>\t<kind>\t%05Xh` per symbol (spec.md
/// §6), `kind_label` being the short tag printed on each line (`"Name"`,
/// `"EQU"`, `"SET"`, `"Label"`).
fn render_symbol_group(title: &str, symtab: &SymbolTable, kind: SymbolKind, kind_label: &str) -> (String, usize) {
    let mut out = format!("\n{title}\n");
    let mut count = 0;
    for sym in symtab.iter_in_order().filter(|s| s.kind == kind) {
        out.push_str(&format!("{}\t{kind_label}\t{:05X}h\n", sym.name, sym.value));
        count += 1;
    }
    (out, count)
}

/// Renders the complete listing text: per-line rows in program order,
/// then a symbol table trailer grouped Names / EQUs / SETs / Labels (in
/// that order, spec.md §6), followed by count statistics.
pub fn render(rows: &[ListingRow], symtab: &SymbolTable) -> String {
    let mut out = String::new();
    for row in rows {
        out.push_str(&render_row(row));
        out.push('\n');
    }

    let (names, name_count) = render_symbol_group("Names", symtab, SymbolKind::Name, "Name");
    let (equs, equ_count) = render_symbol_group("EQUs", symtab, SymbolKind::EquName, "EQU");
    let (sets, set_count) = render_symbol_group("SETs", symtab, SymbolKind::SetName, "SET");
    let (labels, label_count) = render_symbol_group("Labels", symtab, SymbolKind::Label, "Label");
    out.push_str(&names);
    out.push_str(&equs);
    out.push_str(&sets);
    out.push_str(&labels);

    out.push_str("\nStatistics\n");
    out.push_str(&format!("\"Name\"\t= {name_count}\n"));
    out.push_str(&format!("\"EQU\"\t= {equ_count}\n"));
    out.push_str(&format!("\"SET\"\t= {set_count}\n"));
    out.push_str(&format!("Labels\t= {label_count}\n"));
    out
}
