use std::path::{Path, PathBuf};
use std::process::Command;

use hss_common_core::{Image, Instruction, Opcode};

fn hss() -> Command {
    Command::new(env!("CARGO_BIN_EXE_hss"))
}

/// Write an image whose code starts with `ops`.
fn image(dir: &Path, name: &str, ops: &[Opcode]) -> PathBuf {
    let mut image = Image::new();
    for (i, &op) in ops.iter().enumerate() {
        image.code[i] = Instruction::Extended(op).encode();
    }
    let path = dir.join(name);
    image.write(&path).unwrap();
    path
}

#[test]
fn test_halt_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let path = image(dir.path(), "halt.hss", &[Opcode::Nop, Opcode::Halt]);
    let status = hss().arg("-q").arg(&path).status().unwrap();
    assert_eq!(status.code(), Some(0));
}

#[test]
fn test_fatal_error_exits_42() {
    let dir = tempfile::tempdir().unwrap();
    let path = image(dir.path(), "underflow.hss", &[Opcode::Add, Opcode::Halt]);
    let output = hss().arg(&path).output().unwrap();
    assert_eq!(output.status.code(), Some(42));
    assert!(!output.stderr.is_empty());
}

#[test]
fn test_missing_image_file_exits_42() {
    let dir = tempfile::tempdir().unwrap();
    let status = hss()
        .arg(dir.path().join("absent.hss"))
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(42));
}

#[test]
fn test_no_arguments_exits_255() {
    let status = hss().status().unwrap();
    assert_eq!(status.code(), Some(255));
}

#[test]
fn test_help_exits_255() {
    let dir = tempfile::tempdir().unwrap();
    let path = image(dir.path(), "halt.hss", &[Opcode::Halt]);
    let output = hss().arg("-h").arg(&path).output().unwrap();
    assert_eq!(output.status.code(), Some(255));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Usage"));
}

#[test]
fn test_unknown_flag_exits_255() {
    let status = hss().arg("--bogus").status().unwrap();
    assert_eq!(status.code(), Some(255));
}
