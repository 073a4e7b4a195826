//! Shared helpers for the VM integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::path::Path;
use std::rc::Rc;

use hss_common_core::{Image, Instruction, Opcode, RegOp, Selector, UWord, Word};
use hss_runtime::{Console, ExtensionLoader, SaveStore};
use hss_vm::{Os, Vm};

/// Console sink that can be inspected after the run.
#[derive(Clone, Default)]
pub struct Capture(Rc<RefCell<Vec<u8>>>);

impl Capture {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn os(save: &Path, extensions: ExtensionLoader) -> (Os, Capture) {
    let capture = Capture::default();
    let os = Os::new(
        Console::new(Box::new(capture.clone())),
        SaveStore::new(save),
        Box::new(extensions),
    );
    (os, capture)
}

/// In-memory VM whose save file lives in `dir`.
pub fn vm(image: Image, dir: &Path) -> (Vm, Capture) {
    let (os, capture) = os(&dir.join("test.sav"), ExtensionLoader::new());
    (Vm::new(image, os), capture)
}

/// Hand assembler for test programs.
#[derive(Default)]
pub struct Program {
    pub code: Vec<u8>,
    pub data: Vec<(UWord, Word)>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn op(mut self, op: Opcode) -> Self {
        self.code.push(Instruction::Extended(op).encode());
        self
    }

    pub fn reg(mut self, op: RegOp, reg: u8) -> Self {
        self.code.push(Instruction::Register { op, reg }.encode());
        self
    }

    pub fn push(mut self, value: Word) -> Self {
        self.code.push(Opcode::PushImm.into());
        self.code.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn interrupt(self, selector: Selector) -> Self {
        self.push(UWord::from(selector) as Word).op(Opcode::Interrupt)
    }

    /// Pad with no-ops up to `addr`.
    pub fn at(mut self, addr: usize) -> Self {
        assert!(self.code.len() <= addr, "code already past {:#x}", addr);
        self.code.resize(addr, 0);
        self
    }

    pub fn word(mut self, addr: UWord, value: Word) -> Self {
        self.data.push((addr, value));
        self
    }

    /// Packed string (two bytes per word, high first, NUL terminated).
    pub fn string(mut self, addr: UWord, s: &str) -> Self {
        let mut bytes = s.as_bytes().to_vec();
        bytes.push(0);
        if bytes.len() % 2 == 1 {
            bytes.push(0);
        }
        for (i, pair) in bytes.chunks(2).enumerate() {
            self.data
                .push((addr + i as UWord, Word::from_be_bytes([pair[0], pair[1]])));
        }
        self
    }

    pub fn image(&self) -> Image {
        let mut image = Image::new();
        image.code[..self.code.len()].copy_from_slice(&self.code);
        for &(addr, value) in &self.data {
            image.data[addr as usize] = value;
        }
        image
    }
}
