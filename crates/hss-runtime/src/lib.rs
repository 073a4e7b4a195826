//! Runtime services for the HSS virtual machine.
//!
//! Everything the interpreter core calls out to lives here: the fatal error
//! taxonomy, diagnostics, the short-name table, the save store, program
//! output, and native extension support.

pub mod log;

pub mod console;
pub mod error;
pub mod ext_loader;
pub mod ffi;
pub mod save;
pub mod short_names;

pub use console::Console;
pub use error::{VmError, VmResult};
pub use ext_loader::{library_file_name, BuiltinUtility, ExtensionHost, ExtensionLoader};
pub use ffi::{call_utility, UtilityFn, UtilityLib, VmUtilities, VmUtilitiesTable};
pub use save::{save_path_for, SaveStore};
pub use short_names::{Handle, ShortNames};
