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

use thiserror::Error;

/// Fatal failures that abort the assembly pipeline outright, as opposed to
/// the per-line [`Diagnostic`]s that are buffered and reported at end of
/// pass (see `Design Notes` in spec.md §9 and §7's propagation policy).
#[derive(Error, Debug)]
pub enum AssemblyError {
    #[error("cannot open input file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("include stack overflow: more than {max} levels deep")]
    IncludeStackOverflow { max: usize },

    #[error("internal error: {0}")]
    Internal(String),
}

/// One diagnostic code per entry in the reference tool's `err_code.h` /
/// `war_code.h`. Kept as a single enum (rather than split error/warning
/// enums) because dispatch sites decide severity independently of code
/// (e.g. a missing quote is always a warning, a duplicate label is always
/// an error) via [`DiagCode::severity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagCode {
    LabelNotFound,
    DuplicateLabel,
    CantFindKeyword,
    BadDestinationRegister,
    BadSourceRegister,
    IfNestingOverflow,
    IfNestingUnderflow,
    NotQuotedCharacter,
    MissingField,
    DwDoesNotSupportString,
    BadDataEncoding,
    BadBinaryDigit,
    BadOctalDigit,
    BadDecimalDigit,
    BadHexDigit,
    OperandOverRange,
    AlreadyDefinedAsName,
    ProgramCounterOverRange,
    KeywordTooLong,
    EquationTooLong,
    EquAlreadyExists,
    AlreadyDefinedAsEqu,
    StringNotSupported,
    SourceLineTooLong,
    CantAllocateMemory,
    IncludeOverflow,
    NoStartingQuote,
    NoEndingQuote,
    BufferOverflow,
    CantOpenIncludeFile,
    ExtraEndingParenthesis,
    NoMatchingEndingParenthesis,
    BadRegisterPair,
    MemoryAllocationError,
    StackPushOverflow,
    BadData,
    ExtraInputFileSpecified,
    InputFileNameTooLong,
    ExpressionValueOverRange,
    BufferTooSmall,
    CantOpenInputFile,
    CantOpenListingFile,
    CantOpenBinaryFile,
    StackRemoveUnderflow,
    StackPopUnderflow,
    FindLabelBufferOverflow,
    RegisterNotAllowed,
    NoInputFileNoOutputOption,
    CantOpenHexFile,
    NegativeValueOnDs,
    PhasingError,
    MacroHasNoName,
    InternalError,
    MissingQuote,
    StringCannotBeEvaluated,
    MrCantBeUsedBothAsDstAndSrc,

    // Warning-only codes from war_code.h not already covered above.
    EndInsideIncludeFile,
    SpecialCommandNotSupported,
    LabelTooLong,
    InvalidLabelCharacter,
    BadLabelFirstChar,
    SymbolAlreadyUsedAsLabel,
    MacroParametersNotSupported,
    IfResultNotBoolean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl DiagCode {
    /// Numeric code matching the reference tool's `err_code.h`/`war_code.h`,
    /// kept only for documentation/test parity — never parsed back out of
    /// diagnostics by this crate.
    pub fn numeric(self) -> u32 {
        use DiagCode::*;
        match self {
            LabelNotFound => 0,
            DuplicateLabel => 1,
            CantFindKeyword => 2,
            BadDestinationRegister => 3,
            BadSourceRegister => 4,
            IfNestingOverflow => 5,
            IfNestingUnderflow => 6,
            NotQuotedCharacter => 7,
            MissingField => 8,
            DwDoesNotSupportString => 9,
            BadDataEncoding => 10,
            BadBinaryDigit => 11,
            BadOctalDigit => 12,
            BadDecimalDigit => 13,
            BadHexDigit => 14,
            OperandOverRange => 15,
            AlreadyDefinedAsName => 16,
            ProgramCounterOverRange => 17,
            KeywordTooLong => 18,
            EquationTooLong => 19,
            EquAlreadyExists => 20,
            AlreadyDefinedAsEqu => 21,
            StringNotSupported => 22,
            SourceLineTooLong => 23,
            CantAllocateMemory => 24,
            IncludeOverflow => 25,
            NoStartingQuote => 26,
            NoEndingQuote => 27,
            BufferOverflow => 28,
            CantOpenIncludeFile => 29,
            ExtraEndingParenthesis => 30,
            NoMatchingEndingParenthesis => 31,
            BadRegisterPair => 32,
            MemoryAllocationError => 33,
            StackPushOverflow => 34,
            BadData => 35,
            ExtraInputFileSpecified => 36,
            InputFileNameTooLong => 37,
            ExpressionValueOverRange => 38,
            BufferTooSmall => 39,
            CantOpenInputFile => 40,
            CantOpenListingFile => 41,
            CantOpenBinaryFile => 42,
            StackRemoveUnderflow => 43,
            StackPopUnderflow => 44,
            FindLabelBufferOverflow => 45,
            RegisterNotAllowed => 46,
            NoInputFileNoOutputOption => 47,
            CantOpenHexFile => 48,
            NegativeValueOnDs => 49,
            PhasingError => 50,
            MacroHasNoName => 51,
            InternalError => 52,
            MissingQuote => 53,
            StringCannotBeEvaluated => 54,
            MrCantBeUsedBothAsDstAndSrc => 55,
            // Warning codes, numbered independently per war_code.h.
            EndInsideIncludeFile => 1,
            SpecialCommandNotSupported => 8,
            LabelTooLong => 9,
            InvalidLabelCharacter => 10,
            BadLabelFirstChar => 7,
            SymbolAlreadyUsedAsLabel => 12,
            MacroParametersNotSupported => 13,
            IfResultNotBoolean => 14,
        }
    }

    pub fn severity(self) -> Severity {
        use DiagCode::*;
        match self {
            MissingQuote | EndInsideIncludeFile | SpecialCommandNotSupported | LabelTooLong
            | InvalidLabelCharacter | BadLabelFirstChar | SymbolAlreadyUsedAsLabel
            | MacroParametersNotSupported | IfResultNotBoolean => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

/// A single buffered diagnostic, tagged with defining site and optional
/// context (the offending character/string/integer), per spec.md §7.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub file: String,
    pub line: usize,
    pub code: DiagCode,
    pub message: String,
    pub context: Option<String>,
}

impl Diagnostic {
    pub fn new(file: impl Into<String>, line: usize, code: DiagCode, message: impl Into<String>) -> Self {
        Diagnostic {
            file: file.into(),
            line,
            code,
            message: message.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.severity() {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{}:{}: {} [{:?}]: {}", self.file, self.line, kind, self.code, self.message)?;
        if let Some(ctx) = &self.context {
            write!(f, " ({ctx})")?;
        }
        Ok(())
    }
}
