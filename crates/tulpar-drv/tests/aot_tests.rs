//! End-to-end tests for the `--aot` path (§4.5): lowering to
//! `tulpar-ir` and, past that, to an LLVM-backed object file.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

fn tulpar() -> Command {
    Command::new(env!("CARGO_BIN_EXE_tulpar"))
}

#[test]
fn emit_ir_shows_the_lowered_module_without_invoking_llvm() {
    tulpar()
        .arg(fixture("arithmetic.tlp"))
        .arg("--aot")
        .arg("--emit-ir")
        .assert()
        .success()
        .stdout(predicate::str::contains("runtime_decls"))
        .stdout(predicate::str::contains("main"));
}

#[test]
fn aot_compiles_arithmetic_to_an_object_file() {
    let dir = TempDir::new().expect("temp dir");
    let output = dir.path().join("arithmetic.o");

    tulpar()
        .arg(fixture("arithmetic.tlp"))
        .arg("--aot")
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    assert!(output.exists(), "AOT run should produce an object file at the requested path");
    let bytes = std::fs::read(&output).expect("read object file");
    assert!(!bytes.is_empty());
}

#[test]
fn aot_compiles_a_recursive_function_to_an_object_file() {
    let dir = TempDir::new().expect("temp dir");
    let output = dir.path().join("fib.o");

    tulpar()
        .arg(fixture("fib.tlp"))
        .arg("--aot")
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    assert!(output.exists());
}
