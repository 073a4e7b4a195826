//! Operation handlers.
//!
//! Each handler works on the [`Machine`](crate::machine::Machine) alone.
//! Handlers that need the interrupt bridge or the program image (interrupt,
//! reset, halt) are dispatched by [`Vm`](crate::vm::Vm) itself.

mod arith;
mod control;
mod logic;
mod register;
mod stack;

pub use arith::{exec_add, exec_div, exec_mod, exec_mul, exec_sub, DIV_BY_ZERO};
pub use control::{exec_call, exec_jump, exec_jump_if_zero, exec_return, jump_target};
pub use logic::{exec_and, exec_cmp_signed, exec_cmp_unsigned, exec_neg, exec_not, exec_or, exec_xor};
pub use register::exec_register;
pub use stack::{exec_dup, exec_load, exec_push_imm, exec_reg_swap, exec_store, exec_swap};
