//! # hss-asm
//!
//! Assembler for HSS images.
//!
//! Source is a sequence of tokens separated by whitespace or commas, with
//! `;` line comments. `.data` (the initial section) holds
//! `name count item...` entries; `.code` holds labels (`:name`), two-letter
//! mnemonics, register forms (`PR.3`) and `PI <number|:label>`.

pub mod assembler;
pub mod error;
pub mod lexer;

pub use assembler::{assemble, assemble_file, output_path, parse_int};
pub use error::AsmError;
