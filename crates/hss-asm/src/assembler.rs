//! Two-pass assembler: emit code and data, then patch label references.
//!
//! ```text
//! .data
//! greeting 1 'hello'      ; name, minimum word count, items
//! table 3 1 0x10 -1
//! .code
//! :start
//!     PI :greeting
//!     PI 5
//!     IN
//!     HL
//! ```
//!
//! Data labels resolve to word addresses in the data segment, code labels
//! to byte addresses in the code segment.

use std::path::{Path, PathBuf};

use hashbrown::HashMap;
use hss_common_core::layout::{CODE_SIZE, DATA_WORDS};
use hss_common_core::{Image, Instruction, Opcode, RegOp, UWord, Word};

use crate::error::AsmError;
use crate::lexer::{Lexer, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Data,
    Code,
}

#[derive(Debug, Clone, Copy)]
struct Label {
    addr: UWord,
    line: usize,
}

/// Push-immediate operand waiting for a label address.
#[derive(Debug)]
struct Fixup {
    at: usize,
    name: String,
    line: usize,
}

/// Assemble `source` into an image.
pub fn assemble(source: &str) -> Result<Image, AsmError> {
    Assembler::new(source).run()
}

/// Output file for `source`: the extension replaced by `.hss`, or `.out`
/// appended when the source already has that extension.
pub fn output_path(source: &Path) -> PathBuf {
    if source.extension().is_some_and(|ext| ext == "hss") {
        let mut name = source.as_os_str().to_os_string();
        name.push(".out");
        PathBuf::from(name)
    } else {
        source.with_extension("hss")
    }
}

/// Assemble the file at `source` and write the image next to it.
pub fn assemble_file(source: &Path) -> Result<PathBuf, AsmError> {
    let text = std::fs::read_to_string(source).map_err(|e| AsmError::Io {
        path: source.to_path_buf(),
        source: e,
    })?;
    let image = assemble(&text)?;
    let out = output_path(source);
    std::fs::write(&out, image.to_bytes()).map_err(|e| AsmError::Io {
        path: out.clone(),
        source: e,
    })?;
    Ok(out)
}

struct Assembler<'a> {
    tokens: Lexer<'a>,
    mode: Mode,
    code: Vec<u8>,
    data: Vec<Word>,
    labels: HashMap<String, Label>,
    fixups: Vec<Fixup>,
    line: usize,
}

impl<'a> Assembler<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            tokens: Lexer::new(source),
            mode: Mode::Data,
            code: Vec::new(),
            data: Vec::new(),
            labels: HashMap::new(),
            fixups: Vec::new(),
            line: 1,
        }
    }

    fn run(mut self) -> Result<Image, AsmError> {
        while let Some(tok) = self.next_token()? {
            if tok.text.starts_with('.') {
                self.directive(tok)?;
                continue;
            }
            match self.mode {
                Mode::Data => self.data_entry(tok)?,
                Mode::Code => self.instruction(tok)?,
            }
        }
        self.resolve()?;

        let mut image = Image::new();
        image.code[..self.code.len()].copy_from_slice(&self.code);
        image.data[..self.data.len()].copy_from_slice(&self.data);
        Ok(image)
    }

    fn next_token(&mut self) -> Result<Option<Token<'a>>, AsmError> {
        let tok = self.tokens.next().transpose()?;
        if let Some(tok) = &tok {
            self.line = tok.line;
        }
        Ok(tok)
    }

    fn expect(&mut self, what: &'static str) -> Result<Token<'a>, AsmError> {
        self.next_token()?.ok_or(AsmError::MissingOperand {
            line: self.line,
            what,
        })
    }

    fn directive(&mut self, tok: Token<'_>) -> Result<(), AsmError> {
        self.mode = match tok.text {
            ".data" => Mode::Data,
            ".code" => Mode::Code,
            other => {
                return Err(AsmError::UnknownDirective {
                    line: tok.line,
                    directive: other.to_string(),
                })
            }
        };
        Ok(())
    }

    fn define_label(&mut self, name: &str, addr: usize, line: usize) -> Result<(), AsmError> {
        if let Some(first) = self.labels.get(name) {
            return Err(AsmError::DuplicateLabel {
                line,
                name: name.to_string(),
                first: first.line,
            });
        }
        self.labels.insert(
            name.to_string(),
            Label {
                addr: addr as UWord,
                line,
            },
        );
        Ok(())
    }

    // === Data section ===

    /// `name count item...`: items are consumed until at least `count`
    /// words have been emitted.
    fn data_entry(&mut self, name: Token<'a>) -> Result<(), AsmError> {
        let label = name.text.strip_prefix(':').unwrap_or(name.text);
        if label.is_empty() || name.is_quoted() {
            return Err(AsmError::UnknownMnemonic {
                line: name.line,
                token: name.text.to_string(),
            });
        }
        self.define_label(label, self.data.len(), name.line)?;

        let count_tok = self.expect("word count")?;
        let count = parse_int(count_tok.text)
            .filter(|&n| n >= 0)
            .ok_or_else(|| bad_number(&count_tok))?;

        let mut remaining = count;
        while remaining > 0 {
            let item = self.expect("data item")?;
            if item.is_quoted() {
                for word in pack_string(&item)? {
                    self.push_data(word, item.line)?;
                    remaining -= 1;
                }
            } else {
                let word = parse_word(&item)?;
                self.push_data(word, item.line)?;
                remaining -= 1;
            }
        }
        Ok(())
    }

    fn push_data(&mut self, word: Word, line: usize) -> Result<(), AsmError> {
        if self.data.len() == DATA_WORDS {
            return Err(AsmError::DataOverflow { line });
        }
        self.data.push(word);
        Ok(())
    }

    // === Code section ===

    fn instruction(&mut self, tok: Token<'a>) -> Result<(), AsmError> {
        if let Some(name) = tok.text.strip_prefix(':') {
            return self.define_label(name, self.code.len(), tok.line);
        }

        if tok.text == Opcode::PushImm.mnemonic() {
            self.emit(Opcode::PushImm.into(), tok.line)?;
            let operand = self.expect("push-immediate operand")?;
            let value = match operand.text.strip_prefix(':') {
                Some(name) => {
                    self.fixups.push(Fixup {
                        at: self.code.len(),
                        name: name.to_string(),
                        line: operand.line,
                    });
                    0
                }
                None => parse_word(&operand)?,
            };
            let [hi, lo] = value.to_be_bytes();
            self.emit(hi, operand.line)?;
            return self.emit(lo, operand.line);
        }

        let inst = match tok.text.split_once('.') {
            Some((mnemonic, reg)) => {
                let op = RegOp::from_mnemonic(mnemonic).ok_or_else(|| unknown(&tok))?;
                Instruction::Register {
                    op,
                    reg: parse_register(reg).ok_or_else(|| AsmError::BadRegister {
                        line: tok.line,
                        token: tok.text.to_string(),
                    })?,
                }
            }
            None => Instruction::Extended(Opcode::from_mnemonic(tok.text).ok_or_else(|| unknown(&tok))?),
        };
        self.emit(inst.encode(), tok.line)
    }

    fn emit(&mut self, byte: u8, line: usize) -> Result<(), AsmError> {
        if self.code.len() == CODE_SIZE {
            return Err(AsmError::CodeOverflow { line });
        }
        self.code.push(byte);
        Ok(())
    }

    fn resolve(&mut self) -> Result<(), AsmError> {
        for fixup in &self.fixups {
            let label = self
                .labels
                .get(&fixup.name)
                .ok_or_else(|| AsmError::UndefinedLabel {
                    line: fixup.line,
                    name: fixup.name.clone(),
                })?;
            let [hi, lo] = label.addr.to_be_bytes();
            self.code[fixup.at] = hi;
            self.code[fixup.at + 1] = lo;
        }
        Ok(())
    }
}

fn unknown(tok: &Token<'_>) -> AsmError {
    AsmError::UnknownMnemonic {
        line: tok.line,
        token: tok.text.to_string(),
    }
}

fn bad_number(tok: &Token<'_>) -> AsmError {
    AsmError::BadNumber {
        line: tok.line,
        token: tok.text.to_string(),
    }
}

/// Integer literal: optional sign, then `0x` hex, `0b` binary, a leading
/// `0` for octal, or decimal.
pub fn parse_int(text: &str) -> Option<i64> {
    let (negative, body) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    let (radix, digits) = if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        (16, hex)
    } else if let Some(bin) = body.strip_prefix("0b").or_else(|| body.strip_prefix("0B")) {
        (2, bin)
    } else if body.len() > 1 && body.starts_with('0') {
        (8, &body[1..])
    } else {
        (10, body)
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    let value = i64::from_str_radix(digits, radix).ok()?;
    Some(if negative { -value } else { value })
}

/// A literal that fits in a word, signed or unsigned.
fn parse_word(tok: &Token<'_>) -> Result<Word, AsmError> {
    let value = parse_int(tok.text).ok_or_else(|| bad_number(tok))?;
    if !(i16::MIN as i64..=u16::MAX as i64).contains(&value) {
        return Err(AsmError::NumberOutOfRange {
            line: tok.line,
            value,
        });
    }
    Ok(value as u16 as Word)
}

/// Decimal register index 0-31.
fn parse_register(text: &str) -> Option<u8> {
    if text.is_empty() || text.len() > 2 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse::<u8>().ok().filter(|&r| r < 32)
}

/// Pack a quoted literal two Latin-1 bytes per word, high byte first, with
/// a terminating NUL.
fn pack_string(tok: &Token<'_>) -> Result<Vec<Word>, AsmError> {
    let inner = &tok.text[1..tok.text.len() - 1];
    let mut bytes = Vec::with_capacity(inner.len() + 2);
    for ch in inner.chars() {
        let byte = u8::try_from(ch as u32).map_err(|_| AsmError::BadCharacter {
            line: tok.line,
            ch,
        })?;
        bytes.push(byte);
    }
    bytes.push(0);
    if bytes.len() % 2 == 1 {
        bytes.push(0);
    }
    Ok(bytes
        .chunks_exact(2)
        .map(|pair| Word::from_be_bytes([pair[0], pair[1]]))
        .collect())
}
