//! Extension loader for the dynamic-extension interrupt.
//!
//! Libraries are located by naming convention (`lib<name>.so` and the
//! platform equivalents), opened with libloading, and cached by name for the
//! life of the loader. In-process builtin utilities can be registered under
//! a library name and are dispatched the same way.

use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::path::{Path, PathBuf};

use hashbrown::HashMap;
use libloading::{Library, Symbol};

use crate::error::{VmError, VmResult};
use crate::ffi::{call_utility, InitializeFn, UtilityFn, VmUtilities, INITIALIZE_SYMBOL};
use crate::info;

/// Utility implemented in Rust inside the host process.
pub type BuiltinUtility = fn(&mut dyn VmUtilities) -> VmResult<()>;

/// Resolves and invokes extension utilities.
pub trait ExtensionHost {
    fn call(&mut self, library: &str, index: u16, vm: &mut dyn VmUtilities) -> VmResult<()>;
}

enum LoadedExtension {
    Native {
        /// Keep library alive.
        _lib: Library,
        utilities: &'static [UtilityFn],
    },
    Builtin(Vec<BuiltinUtility>),
}

impl LoadedExtension {
    fn len(&self) -> usize {
        match self {
            LoadedExtension::Native { utilities, .. } => utilities.len(),
            LoadedExtension::Builtin(utilities) => utilities.len(),
        }
    }
}

/// File name of extension `name` on this platform, e.g. `libfoo.so`.
pub fn library_file_name(name: &str) -> String {
    format!("{}{}{}", DLL_PREFIX, name, DLL_SUFFIX)
}

pub struct ExtensionLoader {
    search_dirs: Vec<PathBuf>,
    loaded: HashMap<String, LoadedExtension>,
}

impl ExtensionLoader {
    pub fn new() -> Self {
        Self::with_search_dirs(Vec::new())
    }

    /// Directories searched after the system search path and the current
    /// directory.
    pub fn with_search_dirs(search_dirs: Vec<PathBuf>) -> Self {
        Self {
            search_dirs,
            loaded: HashMap::new(),
        }
    }

    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    /// Serve `name` from Rust functions instead of a shared library.
    pub fn register_builtin(&mut self, name: &str, utilities: Vec<BuiltinUtility>) {
        self.loaded
            .insert(name.to_string(), LoadedExtension::Builtin(utilities));
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.loaded.contains_key(name)
    }

    /// Candidate locations for `name`, in search order.
    pub fn candidates(&self, name: &str) -> Vec<PathBuf> {
        let file = library_file_name(name);
        let mut paths = vec![PathBuf::from(&file), Path::new(".").join(&file)];
        paths.extend(self.search_dirs.iter().map(|dir| dir.join(&file)));
        paths
    }

    fn load(&mut self, name: &str) -> VmResult<&LoadedExtension> {
        if !self.loaded.contains_key(name) {
            let ext = self.open(name)?;
            return Ok(self.loaded.entry(name.to_string()).or_insert(ext));
        }
        Ok(&self.loaded[name])
    }

    fn open(&self, name: &str) -> VmResult<LoadedExtension> {
        let tried = self.candidates(name);
        let mut reason = String::new();
        for path in &tried {
            // SAFETY: loading a library runs its initializers; extension
            // modules are trusted code.
            let lib = match unsafe { Library::new(path) } {
                Ok(lib) => lib,
                Err(e) => {
                    reason = e.to_string();
                    continue;
                }
            };

            let table = {
                let initialize: Symbol<InitializeFn> = unsafe { lib.get(INITIALIZE_SYMBOL) }
                    .map_err(|_| VmError::MissingInitializer {
                        name: name.to_string(),
                    })?;
                initialize()
            };
            let utilities: &'static [UtilityFn] = if table.count == 0 || table.utilities.is_null() {
                &[]
            } else {
                // SAFETY: the table points at static data inside `lib`, which
                // is kept alive alongside the slice.
                unsafe { std::slice::from_raw_parts(table.utilities, table.count) }
            };

            info!(
                "loaded extension {} from {} ({} utilities)",
                name,
                path.display(),
                utilities.len()
            );
            return Ok(LoadedExtension::Native {
                _lib: lib,
                utilities,
            });
        }

        Err(VmError::ExtensionNotFound {
            name: name.to_string(),
            tried,
            reason,
        })
    }
}

impl ExtensionHost for ExtensionLoader {
    fn call(&mut self, library: &str, index: u16, vm: &mut dyn VmUtilities) -> VmResult<()> {
        let ext = self.load(library)?;
        let out_of_range = || VmError::UtilityIndexOutOfRange {
            name: library.to_string(),
            index,
            count: ext.len(),
        };
        match ext {
            LoadedExtension::Native { utilities, .. } => {
                let utility = *utilities.get(index as usize).ok_or_else(out_of_range)?;
                call_utility(utility, vm)
            }
            LoadedExtension::Builtin(utilities) => {
                let utility = *utilities.get(index as usize).ok_or_else(out_of_range)?;
                utility(vm)
            }
        }
    }
}

impl Default for ExtensionLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hss_common_core::layout::{RegisterFile, UWord, Word, REGISTER_COUNT};

    struct Stack(Vec<Word>);

    impl VmUtilities for Stack {
        fn pop(&mut self) -> VmResult<Word> {
            self.0.pop().ok_or(VmError::StackUnderflow)
        }

        fn push(&mut self, value: Word) -> VmResult<()> {
            self.0.push(value);
            Ok(())
        }

        fn deref(&mut self, _address: UWord) -> &mut Word {
            unimplemented!()
        }

        fn deref_string(&self, _address: UWord) -> String {
            String::new()
        }

        fn exec_vm_code(&mut self, address: UWord) -> VmResult<()> {
            Err(VmError::ReentryUnsupported(address))
        }

        fn registers(&self) -> RegisterFile {
            [0; REGISTER_COUNT]
        }

        fn set_registers(&mut self, _registers: &RegisterFile) {}
    }

    fn negate(vm: &mut dyn VmUtilities) -> VmResult<()> {
        let v = vm.pop()?;
        vm.push(v.wrapping_neg())
    }

    #[test]
    fn test_library_file_name() {
        let name = library_file_name("testutils");
        assert!(name.contains("testutils"));
        assert!(name.starts_with(DLL_PREFIX));
        assert!(name.ends_with(DLL_SUFFIX));
    }

    #[test]
    fn test_candidates_order() {
        let loader = ExtensionLoader::with_search_dirs(vec![PathBuf::from("/opt/hss")]);
        let file = library_file_name("m");
        assert_eq!(
            loader.candidates("m"),
            vec![
                PathBuf::from(&file),
                Path::new(".").join(&file),
                Path::new("/opt/hss").join(&file),
            ]
        );
    }

    #[test]
    fn test_builtin_dispatch() {
        let mut loader = ExtensionLoader::new();
        loader.register_builtin("math", vec![negate]);
        let mut vm = Stack(vec![5]);
        loader.call("math", 0, &mut vm).unwrap();
        assert_eq!(vm.0, vec![-5]);
    }

    #[test]
    fn test_index_out_of_range() {
        let mut loader = ExtensionLoader::new();
        loader.register_builtin("math", vec![negate]);
        let err = loader.call("math", 1, &mut Stack(vec![])).unwrap_err();
        assert!(matches!(
            err,
            VmError::UtilityIndexOutOfRange { index: 1, count: 1, .. }
        ));
    }

    #[test]
    fn test_missing_library() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = ExtensionLoader::with_search_dirs(vec![dir.path().to_path_buf()]);
        let err = loader
            .call("hss_no_such_extension", 0, &mut Stack(vec![]))
            .unwrap_err();
        match err {
            VmError::ExtensionNotFound { name, tried, .. } => {
                assert_eq!(name, "hss_no_such_extension");
                assert_eq!(tried.len(), 3);
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(!loader.is_loaded("hss_no_such_extension"));
    }
}
