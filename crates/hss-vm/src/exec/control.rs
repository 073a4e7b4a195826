//! Control flow: Call, Return, Jump, JumpIfZero
//!
//! The dispatch loop increments IP after every instruction, so a transfer
//! to `target` stores `target - 1`.

use hss_common_core::layout::RA;
use hss_common_core::{UWord, Word};
use hss_runtime::VmResult;

use crate::machine::Machine;

/// IP value that makes the next fetch land on `target`.
#[inline]
pub fn jump_target(target: UWord) -> UWord {
    target.wrapping_sub(1)
}

/// Pop target; RA = IP; transfer to target.
pub fn exec_call(m: &mut Machine) -> VmResult<()> {
    let target = m.pop()? as UWord;
    m.set_reg(RA, m.ip() as Word);
    m.set_ip(jump_target(target));
    Ok(())
}

/// IP = RA; the post-increment resumes after the call.
pub fn exec_return(m: &mut Machine) -> VmResult<()> {
    m.set_ip(m.reg(RA) as UWord);
    Ok(())
}

pub fn exec_jump(m: &mut Machine) -> VmResult<()> {
    let target = m.pop()? as UWord;
    m.set_ip(jump_target(target));
    Ok(())
}

/// Pop target, then condition; transfer if the condition is zero.
pub fn exec_jump_if_zero(m: &mut Machine) -> VmResult<()> {
    let target = m.pop()? as UWord;
    let cond = m.pop()?;
    if cond == 0 {
        m.set_ip(jump_target(target));
    }
    Ok(())
}
