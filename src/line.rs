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

//! Line tokeniser (spec.md §4.4): splits one source line into label,
//! keyword, operand text, and comment fields.

use crate::errors::DiagCode;

/// Source line maximum width including terminator (`project.h`'s
/// `SRC_LINE_WIDTH_MAX`).
pub const SRC_LINE_WIDTH_MAX: usize = 256;
/// Equation (operand text) maximum size (`project.h`'s `EQUATION_SIZE_MAX`).
pub const EQUATION_SIZE_MAX: usize = 160;
/// Keyword maximum size, a fraction of `SYMBOL_SIZE_MAX` reserved for
/// mnemonics/directives.
pub const KEYWORD_SIZE_MAX: usize = 32;

#[derive(Debug, Default, Clone)]
pub struct TokenizedLine {
    pub label: Option<String>,
    pub keyword: Option<String>,
    pub operand: String,
    pub comment: Option<String>,
    /// The line's sole content was the CP/M EOF marker (0x1A); callers
    /// treat this exactly like physical end-of-file at the current
    /// include level.
    pub cpm_eof: bool,
    /// `true` if nothing at all was on the line (blank or comment-only),
    /// so the driver can skip directive/opcode dispatch entirely.
    pub is_empty: bool,
}

pub struct TokenizeResult {
    pub line: TokenizedLine,
    pub warnings: Vec<DiagCode>,
}

/// Tokenises one physical source line. `macro_capture_active` suppresses
/// the `$`-prefix special-command check, since during macro capture the
/// line is stored verbatim rather than dispatched.
pub fn tokenize(raw: &str, macro_capture_active: bool) -> TokenizeResult {
    let mut warnings = Vec::new();
    let stripped = raw.trim_end_matches(['\r', '\n']);

    if stripped.chars().all(|c| c == '\u{1A}') && !stripped.is_empty() {
        return TokenizeResult {
            line: TokenizedLine {
                cpm_eof: true,
                is_empty: true,
                ..Default::default()
            },
            warnings,
        };
    }

    if stripped.is_empty() {
        return TokenizeResult {
            line: TokenizedLine {
                is_empty: true,
                ..Default::default()
            },
            warnings,
        };
    }

    let first = stripped.chars().next().unwrap();

    if first == ';' {
        return TokenizeResult {
            line: TokenizedLine {
                comment: Some(stripped[1..].to_string()),
                is_empty: true,
                ..Default::default()
            },
            warnings,
        };
    }

    if first == '$' && !macro_capture_active {
        warnings.push(DiagCode::SpecialCommandNotSupported);
        return TokenizeResult {
            line: TokenizedLine {
                comment: Some(stripped.to_string()),
                is_empty: true,
                ..Default::default()
            },
            warnings,
        };
    }

    let chars: Vec<char> = stripped.chars().collect();
    let mut i = 0;
    let mut label = None;

    if !first.is_whitespace() {
        let start = i;
        while i < chars.len() && !chars[i].is_whitespace() && chars[i] != ':' {
            i += 1;
        }
        let raw_label = &chars[start..i];
        let normalized = crate::symbol_table::normalize_name(&raw_label.iter().collect::<String>());
        if let Some(bad) = normalized.bad_first_char {
            warnings.push(DiagCode::BadLabelFirstChar);
            let _ = bad;
        }
        if normalized.too_long {
            warnings.push(DiagCode::LabelTooLong);
        }
        label = Some(normalized.name);
        if i < chars.len() && chars[i] == ':' {
            i += 1;
        }
    }

    while i < chars.len() && chars[i].is_whitespace() {
        i += 1;
    }

    let kw_start = i;
    while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '.') {
        i += 1;
    }
    let mut keyword = None;
    if i > kw_start {
        let mut kw: String = chars[kw_start..i].iter().collect();
        if kw.len() > KEYWORD_SIZE_MAX {
            warnings.push(DiagCode::KeywordTooLong);
            kw.truncate(KEYWORD_SIZE_MAX);
        }
        keyword = Some(kw.to_uppercase());
    }

    while i < chars.len() && chars[i].is_whitespace() {
        i += 1;
    }

    let rest: String = chars[i..].iter().collect();
    let (operand_part, comment_part) = split_comment(&rest);
    let mut operand: String = operand_part.trim_end().to_string();
    if operand.len() > EQUATION_SIZE_MAX {
        warnings.push(DiagCode::EquationTooLong);
        operand.truncate(EQUATION_SIZE_MAX);
    }

    let is_empty = label.is_none() && keyword.is_none() && operand.is_empty();

    TokenizeResult {
        line: TokenizedLine {
            label,
            keyword,
            operand,
            comment: comment_part,
            cpm_eof: false,
            is_empty,
        },
        warnings,
    }
}

/// Splits `rest` on the first un-quoted `;`, so `DB "a;b"` keeps its
/// semicolon inside the string literal.
fn split_comment(rest: &str) -> (&str, Option<String>) {
    let bytes = rest.as_bytes();
    let mut in_quote: Option<u8> = None;
    for (idx, &b) in bytes.iter().enumerate() {
        match in_quote {
            Some(q) if b == q => in_quote = None,
            Some(_) => {}
            None if b == b'\'' || b == b'"' => in_quote = Some(b),
            None if b == b';' => return (&rest[..idx], Some(rest[idx + 1..].to_string())),
            None => {}
        }
    }
    (rest, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_keyword_operand_comment() {
        let r = tokenize("LOOP: MVI A, 5 ; load five", false);
        assert_eq!(r.line.label.as_deref(), Some("LOOP"));
        assert_eq!(r.line.keyword.as_deref(), Some("MVI"));
        assert_eq!(r.line.operand, "A, 5");
        assert_eq!(r.line.comment.as_deref(), Some(" load five"));
    }

    #[test]
    fn whole_line_comment() {
        let r = tokenize("; a comment", false);
        assert!(r.line.is_empty);
        assert_eq!(r.line.label, None);
    }

    #[test]
    fn no_label_when_indented() {
        let r = tokenize("\tNOP", false);
        assert_eq!(r.line.label, None);
        assert_eq!(r.line.keyword.as_deref(), Some("NOP"));
    }

    #[test]
    fn cpm_eof_marker() {
        let r = tokenize("\u{1A}", false);
        assert!(r.line.cpm_eof);
    }

    #[test]
    fn dollar_outside_macro_reported() {
        let r = tokenize("$weird", false);
        assert!(r.warnings.contains(&DiagCode::SpecialCommandNotSupported));
        assert!(r.line.is_empty);
    }

    #[test]
    fn semicolon_inside_string_preserved() {
        let r = tokenize("DB 'a;b'", false);
        assert_eq!(r.line.operand, "'a;b'");
    }
}
