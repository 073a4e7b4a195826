//! Tokenizer for assembly source.
//!
//! Tokens are separated by whitespace or commas. `;` starts a comment that
//! runs to the end of the line. A quoted literal (`'...'`) is one token and
//! may contain separators and `;`.

use crate::error::AsmError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub line: usize,
}

impl Token<'_> {
    pub fn is_quoted(&self) -> bool {
        self.text.starts_with('\'')
    }
}

pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn read_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn skip_separators(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() || c == ',' {
                self.read_char();
            } else if c == ';' {
                while self.peek_char().is_some_and(|c| c != '\n') {
                    self.read_char();
                }
            } else {
                break;
            }
        }
    }

    fn quoted(&mut self, start: usize, line: usize) -> Result<Token<'a>, AsmError> {
        self.read_char();
        loop {
            match self.read_char() {
                Some('\'') => break,
                Some('\n') | None => return Err(AsmError::UnterminatedString { line }),
                Some(_) => {}
            }
        }
        Ok(Token {
            text: &self.input[start..self.pos],
            line,
        })
    }

    fn word(&mut self, start: usize, line: usize) -> Token<'a> {
        while self
            .peek_char()
            .is_some_and(|c| !c.is_whitespace() && c != ',' && c != ';')
        {
            self.read_char();
        }
        Token {
            text: &self.input[start..self.pos],
            line,
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token<'a>, AsmError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_separators();
        let start = self.pos;
        let line = self.line;
        match self.peek_char()? {
            '\'' => Some(self.quoted(start, line)),
            _ => Some(Ok(self.word(start, line))),
        }
    }
}
