//! Fatal VM errors.
//!
//! Every variant terminates the machine: the dispatch loop propagates them
//! and never recovers. Division by zero is not here; it yields a sentinel.

use std::path::PathBuf;

use hss_common_core::layout::SAVE_SLOTS;
use hss_common_core::ImageError;
use thiserror::Error;

pub type VmResult<T> = Result<T, VmError>;

#[derive(Debug, Error)]
pub enum VmError {
    // === Resource bounds ===
    #[error("stack overflow")]
    StackOverflow,
    #[error("stack underflow")]
    StackUnderflow,
    #[error("stack slot {offset} below the top is out of range (depth {depth})")]
    StackIndexOutOfRange { offset: u16, depth: usize },
    #[error("save slot {0} out of range")]
    SaveSlotOutOfRange(u16),
    #[error("save range {start}+{len} exceeds {} slots", SAVE_SLOTS)]
    SaveRangeOutOfBounds { start: u16, len: u16 },
    #[error("memory range 0x{addr:04X}+{len} exceeds the data segment")]
    MemoryRangeOutOfBounds { addr: u16, len: u16 },
    #[error("modulo by zero")]
    ModuloByZero,

    // === Protocol ===
    #[error("interrupt selector 0 is reserved")]
    ReservedSelector,
    #[error("undefined utility {0}")]
    UndefinedUtility(i16),

    // === External resources ===
    #[error(transparent)]
    Image(#[from] ImageError),
    #[error("cannot write program output: {0}")]
    Output(#[source] std::io::Error),
    #[error("save file {}: {}", .path.display(), .source)]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("extension library '{name}' not found: {reason}")]
    ExtensionNotFound {
        name: String,
        tried: Vec<PathBuf>,
        reason: String,
    },
    #[error("extension library '{name}' has no `initialize` entry point")]
    MissingInitializer { name: String },
    #[error("utility {index} out of range for extension '{name}' ({count} utilities)")]
    UtilityIndexOutOfRange {
        name: String,
        index: u16,
        count: usize,
    },
    #[error("exec_vm_code(0x{0:04X}): re-entering the VM from an extension is not supported")]
    ReentryUnsupported(u16),
}

impl VmError {
    pub(crate) fn save(path: &std::path::Path, source: std::io::Error) -> Self {
        VmError::Save {
            path: path.to_path_buf(),
            source,
        }
    }
}
