//! Memory layout of the machine.
//!
//! All segments have a fixed size so every 16-bit address is in range.

/// Machine word (registers, data memory, operand stack).
pub type Word = i16;
/// Unsigned view of a machine word, used for addresses.
pub type UWord = u16;

/// Bytes in the code segment.
pub const CODE_SIZE: usize = 0x10000;
/// Words in the data segment.
pub const DATA_WORDS: usize = 0x10000;
/// Words in the operand stack.
pub const STACK_WORDS: usize = 0x10000;

/// Registers: 30 general purpose + RA + SP + IP.
pub const REGISTER_COUNT: usize = 33;
/// General purpose registers occupy indices `0..GENERAL_REGISTERS`.
pub const GENERAL_REGISTERS: usize = 30;
/// Return address register.
pub const RA: usize = 30;
/// Stack pointer register (mirrors the operand stack depth).
pub const SP: usize = 31;
/// Instruction pointer register.
pub const IP: usize = 32;

/// The register file as seen by extension modules.
pub type RegisterFile = [Word; REGISTER_COUNT];

/// Number of words in the persistence store.
pub const SAVE_SLOTS: usize = 256;
/// Size in bytes of a save file.
pub const SAVE_FILE_BYTES: usize = SAVE_SLOTS * 2;

/// Allocate a zeroed fixed-size array on the heap.
pub fn zeroed<T: Copy + Default, const N: usize>() -> Box<[T; N]> {
    match vec![T::default(); N].into_boxed_slice().try_into() {
        Ok(array) => array,
        Err(_) => unreachable!("boxed slice has length {}", N),
    }
}
