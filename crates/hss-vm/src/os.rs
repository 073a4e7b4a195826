//! OS / interrupt bridge.
//!
//! The interrupt instruction pops a selector and lands here. Selectors:
//!
//! | selector | stack (popped in order) | effect |
//! |---|---|---|
//! | 3  | value | print the word as a hex field |
//! | 5  | address | print the packed string at address |
//! | 10 | slot | push save slot |
//! | 11 | slot, value | write save slot |
//! | 12 | address, length, slot | save slots to data memory |
//! | 13 | address, length, slot | data memory to save slots |
//! | 20 | name address, index | call extension utility |
//!
//! Selector 0 is reserved; anything else is undefined. Both are fatal.

use hss_common_core::{Selector, UWord};
use hss_runtime::{Console, ExtensionHost, SaveStore, ShortNames, VmError, VmResult};

use crate::machine::Machine;
use crate::utilities::MachineUtilities;

pub struct Os {
    console: Console,
    save: SaveStore,
    names: ShortNames,
    extensions: Box<dyn ExtensionHost>,
}

impl Os {
    pub fn new(console: Console, save: SaveStore, extensions: Box<dyn ExtensionHost>) -> Self {
        Self {
            console,
            save,
            names: ShortNames::new(),
            extensions,
        }
    }

    pub fn interrupt(&mut self, m: &mut Machine) -> VmResult<()> {
        let raw = m.pop()?;
        let selector =
            Selector::try_from(raw as UWord).map_err(|_| VmError::UndefinedUtility(raw))?;

        match selector {
            Selector::Reserved => Err(VmError::ReservedSelector),
            Selector::LogWord => {
                let value = m.pop()?;
                self.console.log_word(value).map_err(VmError::Output)
            }
            Selector::LogString => {
                let addr = m.pop()? as UWord;
                let handle = self.names.assign(&m.string_at(addr));
                let text = self.names.get(handle).unwrap_or_default();
                let result = self.console.log_str(text).map_err(VmError::Output);
                self.names.dispose(handle);
                result
            }
            Selector::SaveRead => {
                let slot = m.pop()? as UWord;
                let value = self.save.read(slot)?;
                m.push(value)
            }
            Selector::SaveWrite => {
                let slot = m.pop()? as UWord;
                let value = m.pop()?;
                self.save.write(slot, value)
            }
            Selector::SaveToMemory => {
                let (addr, len, start) = bulk_args(m)?;
                let dest = m.data_range_mut(addr, len)?;
                self.save.read_range(start, dest)
            }
            Selector::MemoryToSave => {
                let (addr, len, start) = bulk_args(m)?;
                let src = m.data_range(addr, len)?;
                self.save.write_range(start, src)
            }
            Selector::Extension => {
                let name_addr = m.pop()? as UWord;
                let index = m.pop()? as UWord;
                let handle = self.names.assign(&m.string_at(name_addr));
                let name = self.names.get(handle).unwrap_or_default();
                let result = self
                    .extensions
                    .call(name, index, &mut MachineUtilities::new(m));
                self.names.dispose(handle);
                result
            }
        }
    }

    /// Release the save file and forget all names. Console state is kept.
    pub fn reset(&mut self) -> VmResult<()> {
        self.names.reset();
        self.save.close()
    }

    pub fn flush(&mut self) -> VmResult<()> {
        self.console.flush().map_err(VmError::Output)
    }

    pub fn save(&self) -> &SaveStore {
        &self.save
    }

    pub fn names(&self) -> &ShortNames {
        &self.names
    }
}

/// Address, length and save-slot start of a bulk copy.
fn bulk_args(m: &mut Machine) -> VmResult<(UWord, UWord, UWord)> {
    let addr = m.pop()? as UWord;
    let len = m.pop()? as UWord;
    let start = m.pop()? as UWord;
    Ok((addr, len, start))
}
