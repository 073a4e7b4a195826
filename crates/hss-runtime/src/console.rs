//! Program output for the logging interrupts.
//!
//! Output alternates between two columns: the first field on a line is
//! followed by a tab, the second by a newline.

use std::io::{self, Write};

use hss_common_core::layout::{UWord, Word};

pub struct Console {
    out: Box<dyn Write>,
    second_column: bool,
}

impl Console {
    pub fn new(out: Box<dyn Write>) -> Self {
        Self {
            out,
            second_column: false,
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    /// Print `value` as four upper-case hex digits.
    pub fn log_word(&mut self, value: Word) -> io::Result<()> {
        write!(self.out, "0x{:04X}", value as UWord)?;
        self.end_field()
    }

    pub fn log_str(&mut self, s: &str) -> io::Result<()> {
        self.out.write_all(s.as_bytes())?;
        self.end_field()
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    fn end_field(&mut self) -> io::Result<()> {
        let sep: &[u8] = if self.second_column { b"\n" } else { b"\t" };
        self.second_column = !self.second_column;
        self.out.write_all(sep)
    }
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console")
            .field("second_column", &self.second_column)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct Capture(Rc<RefCell<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_columns_alternate() {
        let capture = Capture::default();
        let mut console = Console::new(Box::new(capture.clone()));
        console.log_str("sum").unwrap();
        console.log_word(7).unwrap();
        console.log_word(-1).unwrap();
        console.flush().unwrap();
        let text = String::from_utf8(capture.0.borrow().clone()).unwrap();
        assert_eq!(text, "sum\t0x0007\n0xFFFF\t");
    }
}
