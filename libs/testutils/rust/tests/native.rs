//! Loads the cdylib built from this package through the dynamic loader.

use std::path::PathBuf;

use hss_common_core::Image;
use hss_runtime::{ExtensionHost, ExtensionLoader, VmError};
use hss_vm::{Machine, MachineUtilities};

/// `target/<profile>/deps` and `target/<profile>`, where cargo leaves the
/// cdylib next to the test binaries.
fn build_dirs() -> Vec<PathBuf> {
    let exe = std::env::current_exe().unwrap();
    exe.ancestors().skip(1).take(2).map(PathBuf::from).collect()
}

#[test]
fn test_load_and_call_pow() {
    let mut loader = ExtensionLoader::with_search_dirs(build_dirs());
    let mut m = Machine::new(Image::new());
    m.push(3).unwrap();
    m.push(4).unwrap();

    loader
        .call("testutils", 1, &mut MachineUtilities::new(&mut m))
        .unwrap();
    assert!(loader.is_loaded("testutils"));
    assert_eq!(m.stack().as_slice(), &[81]);

    m.push(-2).unwrap();
    loader
        .call("testutils", 1, &mut MachineUtilities::new(&mut m))
        .unwrap();
    assert_eq!(m.stack().as_slice(), &[0]);
}

#[test]
fn test_native_index_out_of_range() {
    let mut loader = ExtensionLoader::with_search_dirs(build_dirs());
    let mut m = Machine::new(Image::new());
    let err = loader
        .call("testutils", 2, &mut MachineUtilities::new(&mut m))
        .unwrap_err();
    assert!(matches!(
        err,
        VmError::UtilityIndexOutOfRange { index: 2, count: 2, .. }
    ));
}
