//! # hss-common-core
//!
//! Core types shared by the HSS virtual machine, its runtime services and
//! the assembler:
//! - `layout` - fixed sizes of the code/data segments, operand stack and register file
//! - `instruction` - opcode byte format, decoding and encoding
//! - `image` - executable image format

pub mod layout;
pub mod instruction;
pub mod image;

pub use layout::{Word, UWord};
pub use instruction::{Instruction, Opcode, RegOp, Selector};
pub use image::{Image, ImageError};
