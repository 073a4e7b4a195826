//! Operand stack.

use hss_common_core::layout::{self, Word, STACK_WORDS};
use hss_runtime::{VmError, VmResult};

/// Fixed-capacity stack of words. The depth ranges over `0..=STACK_WORDS`.
///
/// Moving the depth down does not clear slots; moving it back up exposes
/// the old values again, the same as writing the stack pointer register.
pub struct OperandStack {
    slots: Box<[Word; STACK_WORDS]>,
    depth: usize,
}

impl OperandStack {
    pub fn new() -> Self {
        Self {
            slots: layout::zeroed(),
            depth: 0,
        }
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    pub fn set_depth(&mut self, depth: usize) {
        debug_assert!(depth <= STACK_WORDS);
        self.depth = depth;
    }

    #[inline]
    pub fn push(&mut self, value: Word) -> VmResult<()> {
        if self.depth == STACK_WORDS {
            return Err(VmError::StackOverflow);
        }
        self.slots[self.depth] = value;
        self.depth += 1;
        Ok(())
    }

    #[inline]
    pub fn pop(&mut self) -> VmResult<Word> {
        if self.depth == 0 {
            return Err(VmError::StackUnderflow);
        }
        self.depth -= 1;
        Ok(self.slots[self.depth])
    }

    pub fn top(&self) -> VmResult<Word> {
        match self.depth {
            0 => Err(VmError::StackUnderflow),
            d => Ok(self.slots[d - 1]),
        }
    }

    /// Exchange the top slot with the slot `n` below it.
    pub fn swap(&mut self, n: u16) -> VmResult<()> {
        let offset = n as usize;
        if offset >= self.depth {
            return Err(VmError::StackIndexOutOfRange {
                offset: n,
                depth: self.depth,
            });
        }
        let top = self.depth - 1;
        self.slots.swap(top, top - offset);
        Ok(())
    }

    /// Live slots, bottom first.
    pub fn as_slice(&self) -> &[Word] {
        &self.slots[..self.depth]
    }

    pub fn clear(&mut self) {
        self.slots.fill(0);
        self.depth = 0;
    }
}

impl Default for OperandStack {
    fn default() -> Self {
        Self::new()
    }
}
