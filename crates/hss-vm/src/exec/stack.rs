//! Stack and memory transfer: Dup, PushImm, Load, Store, Swap, RegSwap

use hss_common_core::layout::SP;
use hss_common_core::{UWord, Word};
use hss_runtime::VmResult;

use crate::machine::Machine;

pub fn exec_dup(m: &mut Machine) -> VmResult<()> {
    let top = m.stack().top()?;
    m.push(top)
}

/// Push the big-endian word in the two code bytes after IP and step over
/// them.
pub fn exec_push_imm(m: &mut Machine) -> VmResult<()> {
    let ip = m.ip();
    let hi = m.read_code(ip.wrapping_add(1));
    let lo = m.read_code(ip.wrapping_add(2));
    m.push(Word::from_be_bytes([hi, lo]))?;
    m.set_ip(ip.wrapping_add(2));
    Ok(())
}

/// Pop address; push the data word there.
pub fn exec_load(m: &mut Machine) -> VmResult<()> {
    let addr = m.pop()? as UWord;
    m.push(m.read_data(addr))
}

/// Pop value, then address; store.
pub fn exec_store(m: &mut Machine) -> VmResult<()> {
    let value = m.pop()?;
    let addr = m.pop()? as UWord;
    m.write_data(addr, value);
    Ok(())
}

/// Pop `n`; exchange the top with the slot `n` below it.
pub fn exec_swap(m: &mut Machine) -> VmResult<()> {
    let n = m.pop()? as UWord;
    m.stack_mut().swap(n)
}

/// Exchange register 0 and the stack pointer.
pub fn exec_reg_swap(m: &mut Machine) -> VmResult<()> {
    let r0 = m.reg(0);
    let sp = m.reg(SP);
    m.set_reg(0, sp);
    m.set_reg(SP, r0);
    Ok(())
}
