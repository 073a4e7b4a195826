//! Register micro-operations (instruction classes 1-7).
//!
//! Shift and rotate pop a control word: positive means left, anything else
//! right, and the low 5 bits give the amount. Shifts of 16 or more clear
//! the register (or fill it with the sign bit when shifting right); rotates
//! of 16 or more clear it in either direction.

use hss_common_core::{RegOp, UWord, Word};
use hss_runtime::VmResult;

use crate::machine::Machine;

pub fn exec_register(m: &mut Machine, op: RegOp, reg: u8) -> VmResult<()> {
    let reg = reg as usize;
    match op {
        RegOp::Mask => {
            let mask = m.pop()? as UWord;
            m.push((mask & m.reg(reg) as UWord) as Word)
        }
        RegOp::Shift => {
            let (left, amount) = shift_control(m.pop()?);
            let v = m.reg(reg) as i32;
            let shifted = if left { v << amount } else { v >> amount };
            m.set_reg(reg, shifted as Word);
            Ok(())
        }
        RegOp::Rotate => {
            let (left, amount) = shift_control(m.pop()?);
            let v = m.reg(reg) as UWord;
            let rotated = if amount >= 16 {
                0
            } else if left {
                v.rotate_left(amount)
            } else {
                v.rotate_right(amount)
            };
            m.set_reg(reg, rotated as Word);
            Ok(())
        }
        RegOp::Push => m.push(m.reg(reg)),
        RegOp::Pop => {
            let v = m.pop()?;
            m.set_reg(reg, v);
            Ok(())
        }
        RegOp::Inc => {
            m.set_reg(reg, m.reg(reg).wrapping_add(1));
            Ok(())
        }
        RegOp::Dec => {
            m.set_reg(reg, m.reg(reg).wrapping_sub(1));
            Ok(())
        }
    }
}

#[inline]
fn shift_control(x: Word) -> (bool, u32) {
    (x > 0, (x & 0x1F) as u32)
}
