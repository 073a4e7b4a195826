//! Bitwise and comparison operations.

use hss_common_core::{UWord, Word};
use hss_runtime::VmResult;

use crate::machine::Machine;

#[inline]
fn bitwise(m: &mut Machine, f: impl FnOnce(UWord, UWord) -> UWord) -> VmResult<()> {
    let b = m.pop()? as UWord;
    let a = m.pop()? as UWord;
    m.push(f(a, b) as Word)
}

pub fn exec_and(m: &mut Machine) -> VmResult<()> {
    bitwise(m, |a, b| a & b)
}

pub fn exec_or(m: &mut Machine) -> VmResult<()> {
    bitwise(m, |a, b| a | b)
}

pub fn exec_xor(m: &mut Machine) -> VmResult<()> {
    bitwise(m, |a, b| a ^ b)
}

/// Logical not: 1 if the top is zero, else 0.
pub fn exec_not(m: &mut Machine) -> VmResult<()> {
    let v = m.pop()?;
    m.push((v == 0) as Word)
}

/// Bitwise complement.
pub fn exec_neg(m: &mut Machine) -> VmResult<()> {
    let v = m.pop()?;
    m.push(!v)
}

/// Pops `b` then `a`; pushes 1 if `b > a`.
pub fn exec_cmp_signed(m: &mut Machine) -> VmResult<()> {
    let b = m.pop()?;
    let a = m.pop()?;
    m.push((b > a) as Word)
}

pub fn exec_cmp_unsigned(m: &mut Machine) -> VmResult<()> {
    let b = m.pop()? as UWord;
    let a = m.pop()? as UWord;
    m.push((b > a) as Word)
}
