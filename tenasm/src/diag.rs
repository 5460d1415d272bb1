//! Accumulating diagnostics. Every fault found in a pass is recorded with
//! its line number and the pass keeps going; whether any *error* (as opposed
//! to a warning) was seen decides if the downstream stages run.

use std::fmt;

use tencpu::AddressingMode;
use thiserror::Error;

/// Which part of the pipeline a diagnostic belongs to, for reporting and for
/// tests that only care about the family of a fault.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    Lex,
    Syntax,
    Mode,
    Symbol,
    Macro,
    Limit,
}

/// The comma faults a numeric list can exhibit, diagnosed in the order the
/// original validator checks them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommaFault {
    Leading,
    Trailing,
    Double,
    Missing,
}

impl fmt::Display for CommaFault {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = match self {
            CommaFault::Leading => "leading comma",
            CommaFault::Trailing => "trailing comma",
            CommaFault::Double => "double comma",
            CommaFault::Missing => "missing comma between values",
        };
        write!(f, "{}", text)
    }
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum ErrorKind {
    // Lex
    #[error("`{0}` is not a valid number")]
    MalformedNumber(String),
    #[error("{0} in value list")]
    CommaMisuse(CommaFault),

    // Syntax
    #[error("unknown instruction `{0}`")]
    UnknownMnemonic(String),
    #[error("unknown directive `{0}`")]
    UnknownDirective(String),
    #[error("`{mnemonic}` expects {expected} operand(s), found {found}")]
    OperandCount {
        mnemonic: String,
        expected: usize,
        found: usize,
    },
    #[error("invalid matrix dimensions")]
    BadMatrixDimensions,
    #[error("matrix holds {cells} cell(s) but {given} value(s) were given")]
    MatrixInitializerOverflow { cells: usize, given: usize },
    #[error("string literal is not terminated")]
    UnterminatedString,
    #[error("syntax error: {0}")]
    Syntax(String),

    // Mode
    #[error("`{mnemonic}` does not accept a {mode} source operand")]
    IllegalSrcMode { mnemonic: String, mode: AddressingMode },
    #[error("`{mnemonic}` does not accept a {mode} target operand")]
    IllegalDstMode { mnemonic: String, mode: AddressingMode },

    // Symbol
    #[error("symbol `{0}` is already defined")]
    DuplicateSymbol(String),
    #[error("undefined symbol `{0}`")]
    UndefinedSymbol(String),
    #[error(".entry names unknown symbol `{0}`")]
    EntryUndefined(String),
    #[error(".entry names external symbol `{0}`")]
    EntryExternal(String),
    #[error("label before `{0}` is ignored")]
    LabelIgnored(&'static str),

    // Macro
    #[error("`{0}` is not a legal macro name")]
    BadMacroName(String),
    #[error("macro definition inside a macro definition")]
    NestedMacro,
    #[error("`mcroend` without an open macro definition")]
    UnmatchedMacroEnd,
    #[error("macro definition is never closed")]
    UnterminatedMacro,
    #[error("unexpected text after `{0}`")]
    MacroTrailingText(&'static str),

    // Limit
    #[error("line is {0} characters long (80 allowed)")]
    LineTooLong(usize),
    #[error("symbol `{0}` is longer than 30 characters")]
    SymbolTooLong(String),
    #[error("number `{0}` has more than 4 digits")]
    NumberTooLong(String),
    #[error("value {value} is outside {min}..={max}")]
    NumberOutOfRange { value: i32, min: i32, max: i32 },
}

impl ErrorKind {
    pub fn class(&self) -> ErrorClass {
        use ErrorKind::*;
        match self {
            MalformedNumber(_) | CommaMisuse(_) => ErrorClass::Lex,
            UnknownMnemonic(_)
            | UnknownDirective(_)
            | OperandCount { .. }
            | BadMatrixDimensions
            | MatrixInitializerOverflow { .. }
            | UnterminatedString
            | Syntax(_) => ErrorClass::Syntax,
            IllegalSrcMode { .. } | IllegalDstMode { .. } => ErrorClass::Mode,
            DuplicateSymbol(_)
            | UndefinedSymbol(_)
            | EntryUndefined(_)
            | EntryExternal(_)
            | LabelIgnored(_) => ErrorClass::Symbol,
            BadMacroName(_)
            | NestedMacro
            | UnmatchedMacroEnd
            | UnterminatedMacro
            | MacroTrailingText(_) => ErrorClass::Macro,
            LineTooLong(_)
            | SymbolTooLong(_)
            | NumberTooLong(_)
            | NumberOutOfRange { .. } => ErrorClass::Limit,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    pub line: u32,
    pub severity: Severity,
    pub kind: ErrorKind,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "line {}: {}: {}", self.line, severity, self.kind)
    }
}

/// The per-pass diagnostic sink.
#[derive(Debug, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Diagnostics {
        Diagnostics::default()
    }

    pub fn error(&mut self, line: u32, kind: ErrorKind) {
        self.items.push(Diagnostic {
            line,
            severity: Severity::Error,
            kind,
        });
    }

    pub fn warning(&mut self, line: u32, kind: ErrorKind) {
        self.items.push(Diagnostic {
            line,
            severity: Severity::Warning,
            kind,
        });
    }

    pub fn has_errors(&self) -> bool {
        self.items
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn classes() {
        assert_eq!(
            ErrorKind::CommaMisuse(CommaFault::Double).class(),
            ErrorClass::Lex
        );
        assert_eq!(
            ErrorKind::UnknownMnemonic("foo".to_owned()).class(),
            ErrorClass::Syntax
        );
        assert_eq!(ErrorKind::NestedMacro.class(), ErrorClass::Macro);
        assert_eq!(ErrorKind::LineTooLong(81).class(), ErrorClass::Limit);
    }

    #[test]
    fn severity_split() {
        let mut diags = Diagnostics::new();
        diags.warning(3, ErrorKind::LabelIgnored(".extern"));
        assert!(!diags.has_errors());
        assert!(!diags.is_empty());

        diags.error(4, ErrorKind::UndefinedSymbol("X".to_owned()));
        assert!(diags.has_errors());
    }
}
