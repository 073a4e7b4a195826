//! Run configuration.

use std::path::PathBuf;

use hss_runtime::save_path_for;

/// Environment variable with extra extension directories (platform
/// path-list syntax).
pub const LIB_PATH_ENV: &str = "HSS_LIB_PATH";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmConfig {
    /// Image file to load (and reload on reset).
    pub image: PathBuf,
    /// Persistence store file.
    pub save: PathBuf,
    /// Searched for extension libraries after the system search path and
    /// the current directory.
    pub lib_dirs: Vec<PathBuf>,
    /// Log every executed instruction.
    pub trace: bool,
}

impl VmConfig {
    /// Defaults for `image`: save file next to it, no extra directories.
    pub fn new(image: impl Into<PathBuf>) -> Self {
        let image = image.into();
        Self {
            save: save_path_for(&image),
            image,
            lib_dirs: Vec::new(),
            trace: false,
        }
    }

    /// Like [`VmConfig::new`], then append directories from `HSS_LIB_PATH`.
    pub fn from_env(image: impl Into<PathBuf>) -> Self {
        Self::new(image).with_env_lib_dirs()
    }

    /// Append the directories listed in `HSS_LIB_PATH`, if set.
    pub fn with_env_lib_dirs(mut self) -> Self {
        if let Some(paths) = std::env::var_os(LIB_PATH_ENV) {
            self.lib_dirs.extend(
                std::env::split_paths(&paths).filter(|p| !p.as_os_str().is_empty()),
            );
        }
        self
    }

    pub fn with_save(mut self, save: impl Into<PathBuf>) -> Self {
        self.save = save.into();
        self
    }

    pub fn with_lib_dirs(mut self, dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        self.lib_dirs.extend(dirs);
        self
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = VmConfig::new("games/pong.hss");
        assert_eq!(config.save, PathBuf::from("games/pong.sav"));
        assert!(config.lib_dirs.is_empty());
        assert!(!config.trace);
    }

    #[test]
    fn test_builders() {
        let config = VmConfig::new("a.hss")
            .with_save("b.sav")
            .with_lib_dirs(vec![PathBuf::from("x"), PathBuf::from("y")])
            .with_trace(true);
        assert_eq!(config.save, PathBuf::from("b.sav"));
        assert_eq!(config.lib_dirs, vec![PathBuf::from("x"), PathBuf::from("y")]);
        assert!(config.trace);
    }
}
