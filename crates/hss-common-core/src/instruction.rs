//! Instruction format and opcodes.
//!
//! Every instruction is one byte: a 3-bit operation class in the high bits
//! and a 5-bit operand field in the low bits.
//!
//! - Class 0: the whole byte selects an extended operation ([`Opcode`]).
//!   Class-0 bytes with no operation decode to [`Instruction::Unassigned`]
//!   and execute as a no-op.
//! - Classes 1-7: a register micro-operation ([`RegOp`]) applied to the
//!   register named by the operand field.
//!
//! `PushImm` is the only instruction followed by operand bytes (a
//! big-endian 16-bit immediate).

use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Bit position of the operation class.
pub const CLASS_SHIFT: u8 = 5;
/// Mask of the operand field.
pub const OPERAND_MASK: u8 = 0x1F;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
pub enum Opcode {
    Nop = 0x00,
    Interrupt = 0x01,
    Reset = 0x02,
    Dup = 0x03,
    Halt = 0x04,
    PushImm = 0x05,
    Call = 0x06,
    Return = 0x07,
    Load = 0x08,
    Store = 0x09,

    // === ARITH ===
    Add = 0x0A,
    Sub = 0x0B,
    Mul = 0x0C,
    Mod = 0x0D,
    Div = 0x0E,

    /// Swap general register 0 and SP.
    RegSwap = 0x0F,

    // === BIT ===
    And = 0x10,
    Or = 0x11,
    Xor = 0x12,
    Not = 0x13,

    /// Swap the top of stack with the slot `n` below it.
    Swap = 0x14,
    Neg = 0x17,

    // === CMP ===
    CmpSigned = 0x18,
    CmpUnsigned = 0x19,

    // === JUMP ===
    Jump = 0x1E,
    JumpIfZero = 0x1F,
}

impl Opcode {
    pub const ALL: [Opcode; 26] = [
        Opcode::Nop,
        Opcode::Interrupt,
        Opcode::Reset,
        Opcode::Dup,
        Opcode::Halt,
        Opcode::PushImm,
        Opcode::Call,
        Opcode::Return,
        Opcode::Load,
        Opcode::Store,
        Opcode::Add,
        Opcode::Sub,
        Opcode::Mul,
        Opcode::Mod,
        Opcode::Div,
        Opcode::RegSwap,
        Opcode::And,
        Opcode::Or,
        Opcode::Xor,
        Opcode::Not,
        Opcode::Swap,
        Opcode::Neg,
        Opcode::CmpSigned,
        Opcode::CmpUnsigned,
        Opcode::Jump,
        Opcode::JumpIfZero,
    ];

    /// Two-letter assembler mnemonic.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Nop => "NO",
            Opcode::Interrupt => "IN",
            Opcode::Reset => "RS",
            Opcode::Dup => "DP",
            Opcode::Halt => "HL",
            Opcode::PushImm => "PI",
            Opcode::Call => "SV",
            Opcode::Return => "RT",
            Opcode::Load => "LD",
            Opcode::Store => "ST",
            Opcode::Add => "AD",
            Opcode::Sub => "SU",
            Opcode::Mul => "MU",
            Opcode::Mod => "MO",
            Opcode::Div => "DV",
            Opcode::RegSwap => "RX",
            Opcode::And => "AN",
            Opcode::Or => "OR",
            Opcode::Xor => "XR",
            Opcode::Not => "NT",
            Opcode::Swap => "SW",
            Opcode::Neg => "NE",
            Opcode::CmpSigned => "CS",
            Opcode::CmpUnsigned => "CU",
            Opcode::Jump => "JP",
            Opcode::JumpIfZero => "JZ",
        }
    }

    pub fn from_mnemonic(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.mnemonic() == s)
    }

    /// Number of operand bytes following the opcode.
    #[inline]
    pub fn immediate_len(self) -> u16 {
        match self {
            Opcode::PushImm => 2,
            _ => 0,
        }
    }
}

/// Register micro-operations (operation classes 1-7).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
pub enum RegOp {
    /// Pop a mask, push `mask & reg`.
    Mask = 1,
    /// Pop a signed amount, shift the register.
    Shift = 2,
    /// Pop a signed amount, rotate the register.
    Rotate = 3,
    Push = 4,
    Pop = 5,
    Inc = 6,
    Dec = 7,
}

impl RegOp {
    pub const ALL: [RegOp; 7] = [
        RegOp::Mask,
        RegOp::Shift,
        RegOp::Rotate,
        RegOp::Push,
        RegOp::Pop,
        RegOp::Inc,
        RegOp::Dec,
    ];

    pub fn mnemonic(self) -> &'static str {
        match self {
            RegOp::Mask => "RM",
            RegOp::Shift => "RL",
            RegOp::Rotate => "RR",
            RegOp::Push => "RP",
            RegOp::Pop => "PR",
            RegOp::Inc => "RI",
            RegOp::Dec => "RD",
        }
    }

    pub fn from_mnemonic(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.mnemonic() == s)
    }
}

/// A decoded instruction byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    Extended(Opcode),
    Register { op: RegOp, reg: u8 },
    /// Class-0 byte without an operation; executes as a no-op.
    Unassigned(u8),
}

impl Instruction {
    pub fn decode(byte: u8) -> Self {
        let class = (byte >> CLASS_SHIFT) & 0x7;
        let operand = byte & OPERAND_MASK;
        match RegOp::try_from(class) {
            Ok(op) => Instruction::Register { op, reg: operand },
            Err(_) => match Opcode::try_from(byte) {
                Ok(op) => Instruction::Extended(op),
                Err(_) => Instruction::Unassigned(byte),
            },
        }
    }

    pub fn encode(self) -> u8 {
        match self {
            Instruction::Extended(op) => op.into(),
            Instruction::Register { op, reg } => (u8::from(op) << CLASS_SHIFT) | (reg & OPERAND_MASK),
            Instruction::Unassigned(byte) => byte,
        }
    }

    #[inline]
    pub fn immediate_len(self) -> u16 {
        match self {
            Instruction::Extended(op) => op.immediate_len(),
            _ => 0,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Extended(op) => write!(f, "{}", op.mnemonic()),
            Instruction::Register { op, reg } => write!(f, "{}.{}", op.mnemonic(), reg),
            Instruction::Unassigned(byte) => write!(f, "NO(0x{:02X})", byte),
        }
    }
}

/// Interrupt sub-functions, popped by [`Opcode::Interrupt`].
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
pub enum Selector {
    Reserved = 0,
    LogWord = 3,
    LogString = 5,
    SaveRead = 10,
    SaveWrite = 11,
    SaveToMemory = 12,
    MemoryToSave = 13,
    Extension = 20,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_extended() {
        assert_eq!(Instruction::decode(0x0A), Instruction::Extended(Opcode::Add));
        assert_eq!(Instruction::decode(0x1F), Instruction::Extended(Opcode::JumpIfZero));
        assert_eq!(Instruction::decode(0x05).immediate_len(), 2);
    }

    #[test]
    fn test_decode_unassigned() {
        for byte in [0x15u8, 0x16, 0x1A, 0x1B, 0x1C, 0x1D] {
            assert_eq!(Instruction::decode(byte), Instruction::Unassigned(byte));
        }
    }

    #[test]
    fn test_decode_register_class() {
        // 101_00011: pop into register 3
        assert_eq!(
            Instruction::decode(0b1010_0011),
            Instruction::Register { op: RegOp::Pop, reg: 3 }
        );
        assert_eq!(
            Instruction::decode(0xFF),
            Instruction::Register { op: RegOp::Dec, reg: 31 }
        );
    }

    #[test]
    fn test_opcode_roundtrip() {
        for byte in 0..=255u8 {
            assert_eq!(Instruction::decode(byte).encode(), byte, "byte 0x{:02X}", byte);
        }
    }

    #[test]
    fn test_mnemonics_unique() {
        for op in Opcode::ALL {
            assert_eq!(Opcode::from_mnemonic(op.mnemonic()), Some(op));
        }
        for op in RegOp::ALL {
            assert_eq!(RegOp::from_mnemonic(op.mnemonic()), Some(op));
            assert_eq!(Opcode::from_mnemonic(op.mnemonic()), None);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Instruction::decode(0x05).to_string(), "PI");
        assert_eq!(Instruction::Register { op: RegOp::Inc, reg: 12 }.to_string(), "RI.12");
        assert_eq!(Instruction::decode(0x1C).to_string(), "NO(0x1C)");
    }

    #[test]
    fn test_selector() {
        assert_eq!(Selector::try_from(20u16).ok(), Some(Selector::Extension));
        assert!(Selector::try_from(4u16).is_err());
    }
}
