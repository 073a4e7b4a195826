//! C ABI shared with native extension modules.
//!
//! An extension module exports one symbol, `initialize`, returning a
//! [`UtilityLib`]: a count plus a pointer to an array of [`UtilityFn`].
//! Each utility receives a [`VmUtilitiesTable`] of callbacks into the live
//! machine and a raw pointer to the register file.
//!
//! Inside the VM the same capabilities are expressed by the safe
//! [`VmUtilities`] trait; [`call_utility`] bridges the two.

use std::ffi::{c_char, c_void, CString};

use hss_common_core::layout::{RegisterFile, UWord, Word};

use crate::error::{VmError, VmResult};

/// Entry point symbol every extension module must export.
pub const INITIALIZE_SYMBOL: &[u8] = b"initialize";

/// A utility routine exported by an extension module.
pub type UtilityFn = extern "C" fn(VmUtilitiesTable, *mut RegisterFile);

/// Entry point signature.
pub type InitializeFn = extern "C" fn() -> UtilityLib;

/// Callbacks handed to every utility invocation. `ctx` is opaque and must
/// be passed back as the first argument of each callback.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct VmUtilitiesTable {
    pub ctx: *mut c_void,
    pub pop: extern "C" fn(ctx: *mut c_void) -> Word,
    pub push: extern "C" fn(ctx: *mut c_void, value: Word),
    pub exec_vm_code: extern "C" fn(ctx: *mut c_void, address: UWord),
    /// Pointer to a data-segment word, valid until the utility returns.
    pub deref: extern "C" fn(ctx: *mut c_void, address: UWord) -> *mut UWord,
    /// NUL-terminated Latin-1 copy of a packed string; release it with
    /// `free_string`. Null if the string cannot be represented.
    pub deref_string: extern "C" fn(ctx: *mut c_void, address: UWord) -> *mut c_char,
    pub free_string: extern "C" fn(s: *mut c_char),
}

/// Table returned by `initialize`.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct UtilityLib {
    pub count: usize,
    pub utilities: *const UtilityFn,
}

impl UtilityLib {
    pub fn from_static(utilities: &'static [UtilityFn]) -> Self {
        Self {
            count: utilities.len(),
            utilities: utilities.as_ptr(),
        }
    }
}

unsafe impl Send for UtilityLib {}
unsafe impl Sync for UtilityLib {}

/// What an extension may do to a running machine.
pub trait VmUtilities {
    fn pop(&mut self) -> VmResult<Word>;

    fn push(&mut self, value: Word) -> VmResult<()>;

    /// Mutable access to one data-segment word.
    fn deref(&mut self, address: UWord) -> &mut Word;

    /// Decode the packed string stored at `address`.
    fn deref_string(&self, address: UWord) -> String;

    /// Run VM code at `address` and return when it returns.
    fn exec_vm_code(&mut self, address: UWord) -> VmResult<()>;

    fn registers(&self) -> RegisterFile;

    /// Replace the register file. A stack pointer that differs from the
    /// current one moves the stack; an unchanged one leaves it alone.
    fn set_registers(&mut self, registers: &RegisterFile);
}

struct Bridge<'a> {
    vm: &'a mut dyn VmUtilities,
    regs: *mut RegisterFile,
    fault: Option<VmError>,
}

impl Bridge<'_> {
    fn record(&mut self, err: VmError) {
        if self.fault.is_none() {
            self.fault = Some(err);
        }
    }

    /// Mirror the stack pointer into the extension's view of the registers.
    fn sync_sp(&mut self) {
        let sp = self.vm.registers()[hss_common_core::layout::SP];
        // SAFETY: `regs` points at the register copy owned by `call_utility`,
        // which outlives the utility call.
        unsafe { (*self.regs)[hss_common_core::layout::SP] = sp };
    }
}

/// SAFETY: `ctx` is always the `Bridge` installed by `call_utility`.
unsafe fn bridge<'a>(ctx: *mut c_void) -> &'a mut Bridge<'a> {
    &mut *(ctx as *mut Bridge<'a>)
}

extern "C" fn bridge_pop(ctx: *mut c_void) -> Word {
    let bridge = unsafe { bridge(ctx) };
    match bridge.vm.pop() {
        Ok(value) => {
            bridge.sync_sp();
            value
        }
        Err(e) => {
            bridge.record(e);
            0
        }
    }
}

extern "C" fn bridge_push(ctx: *mut c_void, value: Word) {
    let bridge = unsafe { bridge(ctx) };
    match bridge.vm.push(value) {
        Ok(()) => bridge.sync_sp(),
        Err(e) => bridge.record(e),
    }
}

extern "C" fn bridge_exec_vm_code(ctx: *mut c_void, address: UWord) {
    let bridge = unsafe { bridge(ctx) };
    if let Err(e) = bridge.vm.exec_vm_code(address) {
        bridge.record(e);
    }
}

extern "C" fn bridge_deref(ctx: *mut c_void, address: UWord) -> *mut UWord {
    let bridge = unsafe { bridge(ctx) };
    bridge.vm.deref(address) as *mut Word as *mut UWord
}

extern "C" fn bridge_deref_string(ctx: *mut c_void, address: UWord) -> *mut c_char {
    let bridge = unsafe { bridge(ctx) };
    let bytes: Vec<u8> = bridge.vm.deref_string(address).chars().map(|c| c as u32 as u8).collect();
    match CString::new(bytes) {
        Ok(s) => s.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

extern "C" fn bridge_free_string(s: *mut c_char) {
    if !s.is_null() {
        // SAFETY: non-null strings only come from `bridge_deref_string`.
        drop(unsafe { CString::from_raw(s) });
    }
}

/// Invoke a native utility against `vm`.
///
/// Callback failures cannot unwind through the C ABI; the first one is
/// recorded and returned once the utility has finished. Register edits the
/// utility made through the raw pointer are applied afterwards.
pub fn call_utility(utility: UtilityFn, vm: &mut dyn VmUtilities) -> VmResult<()> {
    let mut regs = vm.registers();
    let mut bridge = Bridge {
        vm,
        regs: &mut regs,
        fault: None,
    };
    let table = VmUtilitiesTable {
        ctx: &mut bridge as *mut Bridge<'_> as *mut c_void,
        pop: bridge_pop,
        push: bridge_push,
        exec_vm_code: bridge_exec_vm_code,
        deref: bridge_deref,
        deref_string: bridge_deref_string,
        free_string: bridge_free_string,
    };

    utility(table, bridge.regs);

    let Bridge { vm, fault, .. } = bridge;
    if let Some(e) = fault {
        return Err(e);
    }
    vm.set_registers(&regs);
    Ok(())
}
