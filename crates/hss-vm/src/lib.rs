//! # hss-vm
//!
//! Stack-based 16-bit virtual machine.
//!
//! - `machine` - register file, code/data segments and operand stack
//! - `exec` - operation handlers
//! - `os` - interrupt bridge to console, save store and extensions
//! - `vm` - fetch-decode-execute loop, reset
//! - `config` - run configuration

pub mod config;
pub mod exec;
pub mod machine;
pub mod os;
pub mod stack;
pub mod utilities;
pub mod vm;

pub use config::VmConfig;
pub use machine::Machine;
pub use os::Os;
pub use stack::OperandStack;
pub use utilities::MachineUtilities;
pub use vm::{ExecResult, Vm};
