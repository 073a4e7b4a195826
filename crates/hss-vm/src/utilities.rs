//! Capability adapter handed to extension utilities.

use hss_common_core::layout::RegisterFile;
use hss_common_core::{UWord, Word};
use hss_runtime::{VmError, VmResult, VmUtilities};

use crate::machine::Machine;

/// Exposes stack, data memory and registers of a [`Machine`]. The code
/// segment and IP are only reachable through `exec_vm_code`.
pub struct MachineUtilities<'a> {
    machine: &'a mut Machine,
}

impl<'a> MachineUtilities<'a> {
    pub fn new(machine: &'a mut Machine) -> Self {
        Self { machine }
    }
}

impl VmUtilities for MachineUtilities<'_> {
    fn pop(&mut self) -> VmResult<Word> {
        self.machine.pop()
    }

    fn push(&mut self, value: Word) -> VmResult<()> {
        self.machine.push(value)
    }

    fn deref(&mut self, address: UWord) -> &mut Word {
        self.machine.data_mut(address)
    }

    fn deref_string(&self, address: UWord) -> String {
        self.machine.string_at(address)
    }

    fn exec_vm_code(&mut self, address: UWord) -> VmResult<()> {
        Err(VmError::ReentryUnsupported(address))
    }

    fn registers(&self) -> RegisterFile {
        self.machine.registers()
    }

    fn set_registers(&mut self, registers: &RegisterFile) {
        self.machine.set_registers(registers);
    }
}
