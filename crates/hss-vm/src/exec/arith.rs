//! Arithmetic: Add, Sub, Mul, Mod, Div
//!
//! Operands are popped right-hand side first. All results wrap to 16 bits.

use hss_common_core::Word;
use hss_runtime::{VmError, VmResult};

use crate::machine::Machine;

/// Result of dividing by zero.
pub const DIV_BY_ZERO: Word = Word::MIN;

#[inline]
fn binary(m: &mut Machine, f: impl FnOnce(Word, Word) -> VmResult<Word>) -> VmResult<()> {
    let b = m.pop()?;
    let a = m.pop()?;
    m.push(f(a, b)?)
}

pub fn exec_add(m: &mut Machine) -> VmResult<()> {
    binary(m, |a, b| Ok(a.wrapping_add(b)))
}

pub fn exec_sub(m: &mut Machine) -> VmResult<()> {
    binary(m, |a, b| Ok(a.wrapping_sub(b)))
}

pub fn exec_mul(m: &mut Machine) -> VmResult<()> {
    binary(m, |a, b| Ok(a.wrapping_mul(b)))
}

pub fn exec_mod(m: &mut Machine) -> VmResult<()> {
    binary(m, |a, b| match b {
        0 => Err(VmError::ModuloByZero),
        _ => Ok(a.wrapping_rem(b)),
    })
}

pub fn exec_div(m: &mut Machine) -> VmResult<()> {
    binary(m, |a, b| match b {
        0 => Ok(DIV_BY_ZERO),
        _ => Ok(a.wrapping_div(b)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hss_common_core::Image;

    fn run(f: fn(&mut Machine) -> VmResult<()>, a: Word, b: Word) -> VmResult<Word> {
        let mut m = Machine::new(Image::new());
        m.push(a)?;
        m.push(b)?;
        f(&mut m)?;
        assert_eq!(m.stack().depth(), 1);
        m.pop()
    }

    #[test]
    fn test_operand_order() {
        assert_eq!(run(exec_sub, 10, 3).unwrap(), 7);
        assert_eq!(run(exec_div, 10, 3).unwrap(), 3);
        assert_eq!(run(exec_mod, 10, 3).unwrap(), 1);
        assert_eq!(run(exec_mod, -7, 2).unwrap(), -1);
    }

    #[test]
    fn test_wrapping() {
        assert_eq!(run(exec_add, Word::MAX, 1).unwrap(), Word::MIN);
        assert_eq!(run(exec_sub, Word::MIN, 1).unwrap(), Word::MAX);
        assert_eq!(run(exec_mul, 300, 300).unwrap(), 90000i32 as i16);
        assert_eq!(run(exec_div, Word::MIN, -1).unwrap(), Word::MIN);
        assert_eq!(run(exec_mod, Word::MIN, -1).unwrap(), 0);
    }

    #[test]
    fn test_add_sub_round_trip() {
        for (a, b) in [(0, 0), (1234, -4321), (Word::MAX, Word::MAX), (Word::MIN, 1)] {
            let sum = run(exec_add, a, b).unwrap();
            assert_eq!(run(exec_sub, sum, b).unwrap(), a);
        }
    }

    #[test]
    fn test_div_by_zero_sentinel() {
        assert_eq!(run(exec_div, 5, 0).unwrap(), -32768);
        assert_eq!(run(exec_div, 0, 0).unwrap(), -32768);
    }

    #[test]
    fn test_mod_by_zero_is_fatal() {
        assert!(matches!(run(exec_mod, 5, 0), Err(VmError::ModuloByZero)));
    }

    #[test]
    fn test_underflow() {
        let mut m = Machine::new(Image::new());
        m.push(1).unwrap();
        assert!(matches!(exec_add(&mut m), Err(VmError::StackUnderflow)));
    }
}
