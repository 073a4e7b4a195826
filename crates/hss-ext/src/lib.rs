//! SDK for writing HSS native extension modules.
//!
//! An extension module is a `cdylib` named `lib<name>` that exports an
//! `initialize` function returning its utility table. Programs call utility
//! `i` of module `name` through interrupt 20.
//!
//! # Example
//!
//! ```ignore
//! use hss_ext::prelude::*;
//!
//! fn twice(utils: &mut Utilities) {
//!     let v = utils.pop();
//!     utils.push(v.wrapping_mul(2));
//! }
//!
//! // Utility 0 is `twice`.
//! hss_ext::export_utilities!(twice);
//! ```

use std::ffi::CStr;
use std::panic::{catch_unwind, AssertUnwindSafe};

pub use hss_common_core::layout::{RegisterFile, IP, RA, SP};
pub use hss_common_core::{UWord, Word};
pub use hss_runtime::ffi::{UtilityFn, UtilityLib, VmUtilitiesTable};

/// Safe view of the callbacks and registers passed to a utility.
///
/// Register writes take effect when the utility returns. Writing [`SP`]
/// moves the VM stack; pushes and pops update it immediately.
pub struct Utilities {
    table: VmUtilitiesTable,
    regs: *mut RegisterFile,
}

impl Utilities {
    /// Pop a word. Popping an empty stack terminates the VM once the
    /// utility returns; the value returned here is 0.
    pub fn pop(&mut self) -> Word {
        (self.table.pop)(self.table.ctx)
    }

    pub fn push(&mut self, value: Word) {
        (self.table.push)(self.table.ctx, value)
    }

    /// Read a data-segment word.
    pub fn read(&mut self, address: UWord) -> Word {
        // SAFETY: `deref` returns a pointer into data memory that stays
        // valid for the duration of the call.
        unsafe { *(self.table.deref)(self.table.ctx, address) as Word }
    }

    pub fn write(&mut self, address: UWord, value: Word) {
        // SAFETY: see `read`.
        unsafe { *(self.table.deref)(self.table.ctx, address) = value as UWord }
    }

    /// Decode the packed string at `address`.
    pub fn string(&mut self, address: UWord) -> Option<String> {
        let raw = (self.table.deref_string)(self.table.ctx, address);
        if raw.is_null() {
            return None;
        }
        // SAFETY: non-null results are NUL-terminated and owned by us until
        // handed back to `free_string`.
        let s = unsafe { CStr::from_ptr(raw) }
            .to_bytes()
            .iter()
            .map(|&b| b as char)
            .collect();
        (self.table.free_string)(raw);
        Some(s)
    }

    /// Call VM code at `address`. The host does not support re-entry, so
    /// this terminates the VM once the utility returns.
    pub fn exec_vm_code(&mut self, address: UWord) {
        (self.table.exec_vm_code)(self.table.ctx, address)
    }

    pub fn reg(&self, index: usize) -> Word {
        // SAFETY: `regs` points at the register file for this call.
        unsafe { (*self.regs)[index] }
    }

    pub fn set_reg(&mut self, index: usize, value: Word) {
        // SAFETY: see `reg`.
        unsafe { (*self.regs)[index] = value }
    }
}

/// Run `f` for a C-ABI utility shim. Panics must not unwind into the host,
/// so they abort the process.
#[doc(hidden)]
pub fn dispatch(table: VmUtilitiesTable, regs: *mut RegisterFile, f: fn(&mut Utilities)) {
    let mut utils = Utilities { table, regs };
    if catch_unwind(AssertUnwindSafe(|| f(&mut utils))).is_err() {
        eprintln!("hss extension utility panicked; aborting");
        std::process::abort();
    }
}

/// Export the `initialize` entry point. Utility indices follow argument
/// order.
///
/// ```ignore
/// hss_ext::export_utilities!(printnum, pow);
/// ```
#[macro_export]
macro_rules! export_utilities {
    ($($func:path),+ $(,)?) => {
        #[no_mangle]
        pub extern "C" fn initialize() -> $crate::UtilityLib {
            static UTILITIES: &[$crate::UtilityFn] = &[$({
                extern "C" fn shim(
                    table: $crate::VmUtilitiesTable,
                    regs: *mut $crate::RegisterFile,
                ) {
                    $crate::dispatch(table, regs, $func)
                }
                shim as $crate::UtilityFn
            }),+];
            $crate::UtilityLib::from_static(UTILITIES)
        }
    };
}

pub mod prelude {
    pub use crate::export_utilities;
    pub use crate::Utilities;
    pub use crate::{RegisterFile, UWord, Word, IP, RA, SP};
}
