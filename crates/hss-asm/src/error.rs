//! Assembly errors. Each one names the 1-based source line.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AsmError {
    #[error("line {line}: unterminated string literal")]
    UnterminatedString { line: usize },
    #[error("line {line}: character {ch:?} cannot be encoded in one byte")]
    BadCharacter { line: usize, ch: char },
    #[error("line {line}: unknown directive '{directive}'")]
    UnknownDirective { line: usize, directive: String },
    #[error("line {line}: unknown mnemonic '{token}'")]
    UnknownMnemonic { line: usize, token: String },
    #[error("line {line}: bad register operand '{token}' (expected XX.0 to XX.31)")]
    BadRegister { line: usize, token: String },
    #[error("line {line}: bad number '{token}'")]
    BadNumber { line: usize, token: String },
    #[error("line {line}: {value} does not fit in 16 bits")]
    NumberOutOfRange { line: usize, value: i64 },
    #[error("line {line}: expected {what}")]
    MissingOperand { line: usize, what: &'static str },
    #[error("line {line}: label '{name}' already defined on line {first}")]
    DuplicateLabel {
        line: usize,
        name: String,
        first: usize,
    },
    #[error("line {line}: undefined label '{name}'")]
    UndefinedLabel { line: usize, name: String },
    #[error("line {line}: code segment full")]
    CodeOverflow { line: usize },
    #[error("line {line}: data segment full")]
    DataOverflow { line: usize },
    #[error("{}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
