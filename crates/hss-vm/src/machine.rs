//! Addressable memory and register file.
//!
//! Register 31 is the stack pointer. It is not stored: reads return the
//! operand stack depth truncated to 16 bits, and writes move the depth.

use hss_common_core::layout::{
    RegisterFile, UWord, Word, CODE_SIZE, DATA_WORDS, IP, REGISTER_COUNT, SP,
};
use hss_common_core::Image;
use hss_runtime::{VmError, VmResult};

use crate::stack::OperandStack;

pub struct Machine {
    regs: RegisterFile,
    code: Box<[u8; CODE_SIZE]>,
    data: Box<[Word; DATA_WORDS]>,
    stack: OperandStack,
}

impl Machine {
    pub fn new(image: Image) -> Self {
        Self {
            regs: [0; REGISTER_COUNT],
            code: image.code,
            data: image.data,
            stack: OperandStack::new(),
        }
    }

    /// Replace both segments and zero the registers and the stack.
    pub fn load(&mut self, image: Image) {
        self.code = image.code;
        self.data = image.data;
        self.regs = [0; REGISTER_COUNT];
        self.stack.clear();
    }

    // === Registers ===

    #[inline]
    pub fn reg(&self, index: usize) -> Word {
        if index == SP {
            self.stack.depth() as Word
        } else {
            self.regs[index]
        }
    }

    #[inline]
    pub fn set_reg(&mut self, index: usize, value: Word) {
        if index == SP {
            self.stack.set_depth(value as UWord as usize);
        } else {
            self.regs[index] = value;
        }
    }

    #[inline]
    pub fn ip(&self) -> UWord {
        self.regs[IP] as UWord
    }

    #[inline]
    pub fn set_ip(&mut self, ip: UWord) {
        self.regs[IP] = ip as Word;
    }

    /// Snapshot with the stack pointer filled in.
    pub fn registers(&self) -> RegisterFile {
        let mut regs = self.regs;
        regs[SP] = self.reg(SP);
        regs
    }

    /// Write back a register file taken with [`Machine::registers`]. The
    /// stack only moves if the stack pointer differs from its current
    /// value, so a full stack (which reads back as 0) survives the round
    /// trip.
    pub fn set_registers(&mut self, regs: &RegisterFile) {
        for (index, &value) in regs.iter().enumerate() {
            if index == SP && value == self.reg(SP) {
                continue;
            }
            self.set_reg(index, value);
        }
    }

    // === Memory ===

    #[inline]
    pub fn read_code(&self, addr: UWord) -> u8 {
        self.code[addr as usize]
    }

    #[inline]
    pub fn read_data(&self, addr: UWord) -> Word {
        self.data[addr as usize]
    }

    #[inline]
    pub fn write_data(&mut self, addr: UWord, value: Word) {
        self.data[addr as usize] = value;
    }

    pub fn data_mut(&mut self, addr: UWord) -> &mut Word {
        &mut self.data[addr as usize]
    }

    /// `len` words starting at `addr`, which must not run past the segment.
    pub fn data_range(&self, addr: UWord, len: UWord) -> VmResult<&[Word]> {
        let range = data_bounds(addr, len)?;
        Ok(&self.data[range])
    }

    pub fn data_range_mut(&mut self, addr: UWord, len: UWord) -> VmResult<&mut [Word]> {
        let range = data_bounds(addr, len)?;
        Ok(&mut self.data[range])
    }

    /// Decode the packed string at `addr`: two Latin-1 bytes per word, high
    /// byte first, ending at the first zero byte. Reads wrap around the
    /// data segment.
    pub fn string_at(&self, addr: UWord) -> String {
        let mut s = String::new();
        let mut at = addr;
        for _ in 0..DATA_WORDS {
            let [hi, lo] = (self.read_data(at) as UWord).to_be_bytes();
            if hi == 0 {
                break;
            }
            s.push(hi as char);
            if lo == 0 {
                break;
            }
            s.push(lo as char);
            at = at.wrapping_add(1);
        }
        s
    }

    // === Operand stack ===

    #[inline]
    pub fn push(&mut self, value: Word) -> VmResult<()> {
        self.stack.push(value)
    }

    #[inline]
    pub fn pop(&mut self) -> VmResult<Word> {
        self.stack.pop()
    }

    pub fn stack(&self) -> &OperandStack {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut OperandStack {
        &mut self.stack
    }
}

fn data_bounds(addr: UWord, len: UWord) -> VmResult<std::ops::Range<usize>> {
    let start = addr as usize;
    let end = start + len as usize;
    if end > DATA_WORDS {
        return Err(VmError::MemoryRangeOutOfBounds { addr, len });
    }
    Ok(start..end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hss_common_core::layout::STACK_WORDS;

    fn machine() -> Machine {
        Machine::new(Image::new())
    }

    fn pack(s: &str) -> Vec<Word> {
        let mut bytes = s.as_bytes().to_vec();
        bytes.push(0);
        if bytes.len() % 2 == 1 {
            bytes.push(0);
        }
        bytes
            .chunks(2)
            .map(|p| Word::from_be_bytes([p[0], p[1]]))
            .collect()
    }

    #[test]
    fn test_sp_mirrors_depth() {
        let mut m = machine();
        m.push(1).unwrap();
        m.push(2).unwrap();
        assert_eq!(m.reg(SP), 2);
        m.set_reg(SP, 1);
        assert_eq!(m.pop().unwrap(), 1);
        assert_eq!(m.registers()[SP], 0);
    }

    #[test]
    fn test_register_roundtrip_keeps_full_stack() {
        let mut m = machine();
        for i in 0..STACK_WORDS {
            m.push(i as Word).unwrap();
        }
        let mut regs = m.registers();
        assert_eq!(regs[SP], 0);
        regs[2] = 7;
        m.set_registers(&regs);
        assert_eq!(m.stack().depth(), STACK_WORDS);
        assert_eq!(m.reg(2), 7);

        regs[SP] = 3;
        m.set_registers(&regs);
        assert_eq!(m.stack().depth(), 3);
    }

    #[test]
    fn test_negative_sp_write_reads_unsigned() {
        let mut m = machine();
        m.set_reg(SP, -1);
        assert_eq!(m.stack().depth(), 0xFFFF);
        assert_eq!(m.reg(SP), -1);
    }

    #[test]
    fn test_string_at() {
        let mut m = machine();
        for (i, w) in pack("hello").into_iter().enumerate() {
            m.write_data(100 + i as UWord, w);
        }
        assert_eq!(m.string_at(100), "hello");
        for (i, w) in pack("even").into_iter().enumerate() {
            m.write_data(200 + i as UWord, w);
        }
        assert_eq!(m.string_at(200), "even");
        assert_eq!(m.string_at(300), "");
    }

    #[test]
    fn test_string_wraps() {
        let mut m = machine();
        m.write_data(0xFFFF, Word::from_be_bytes([b'a', b'b']));
        m.write_data(0, Word::from_be_bytes([b'c', 0]));
        assert_eq!(m.string_at(0xFFFF), "abc");
    }

    #[test]
    fn test_latin1() {
        let mut m = machine();
        m.write_data(0, Word::from_be_bytes([0xE9, 0]));
        assert_eq!(m.string_at(0), "\u{e9}");
    }

    #[test]
    fn test_data_range_bounds() {
        let m = machine();
        assert_eq!(m.data_range(0xFFFE, 2).unwrap().len(), 2);
        assert!(m.data_range(0xFFFF, 0).unwrap().is_empty());
        assert!(matches!(
            m.data_range(0xFFFF, 2),
            Err(VmError::MemoryRangeOutOfBounds { addr: 0xFFFF, len: 2 })
        ));
    }

    #[test]
    fn test_load_zeroes_state() {
        let mut m = machine();
        m.set_reg(5, 9);
        m.set_ip(40);
        m.push(3).unwrap();
        let mut image = Image::new();
        image.data[1] = 77;
        m.load(image);
        assert_eq!(m.registers(), [0; REGISTER_COUNT]);
        assert_eq!(m.read_data(1), 77);
        assert_eq!(m.stack().depth(), 0);
    }
}
