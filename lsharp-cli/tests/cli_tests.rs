//! Integration tests for the L# CLI.
//!
//! These tests invoke the `lsharp` binary as a subprocess and check
//! exit codes, stdout, and stderr.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[allow(deprecated)]
fn lsharp() -> Command {
    Command::cargo_bin("lsharp").unwrap()
}

/// Helper: write source to a temp .ls file and return its path.
fn write_source(dir: &TempDir, source: &str) -> PathBuf {
    let input = dir.path().join("test.ls");
    fs::write(&input, source).unwrap();
    input
}

/// Helper: compile source, returning the path to the .lsb output.
fn compile_to_temp(dir: &TempDir, source: &str) -> PathBuf {
    let input = write_source(dir, source);
    let output = dir.path().join("test.lsb");
    lsharp()
        .args([
            "compile",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();
    output
}

// ---- No-args / help ----

#[test]
fn no_args_prints_usage_and_exits_1() {
    lsharp()
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Usage: lsharp"));
}

#[test]
fn help_flag_exits_0() {
    lsharp()
        .arg("--help")
        .assert()
        .success()
        .stderr(predicate::str::contains("Commands:"));
}

#[test]
fn unknown_command_exits_1() {
    lsharp()
        .arg("assemble")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown command 'assemble'"));
}

// ---- compile ----

#[test]
fn compile_requires_input() {
    lsharp()
        .arg("compile")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("requires an input file"));
}

#[test]
fn compile_missing_file_exits_1() {
    lsharp()
        .args(["compile", "/nonexistent/prog.ls"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot read"));
}

#[test]
fn compile_defaults_output_name() {
    let dir = TempDir::new().unwrap();
    let input = write_source(&dir, "print('hi')");
    lsharp()
        .args(["compile", input.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("test.lsb"));
    assert!(dir.path().join("test.lsb").exists());
}

#[test]
fn compile_rejects_unknown_flags() {
    let dir = TempDir::new().unwrap();
    let input = write_source(&dir, "1");
    lsharp()
        .args(["compile", input.to_str().unwrap(), "-x", "y"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unexpected argument '-x'"));
    assert!(!dir.path().join("test.lsb").exists());
}

#[test]
fn compile_rejects_trailing_arguments_after_output() {
    let dir = TempDir::new().unwrap();
    let input = write_source(&dir, "1");
    let output = dir.path().join("out.lsb");
    lsharp()
        .args([
            "compile",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "extra",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unexpected argument 'extra'"));
    assert!(!output.exists());
}

#[test]
fn compile_output_flag_needs_a_value() {
    let dir = TempDir::new().unwrap();
    let input = write_source(&dir, "1");
    lsharp()
        .args(["compile", input.to_str().unwrap(), "-o"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("-o requires a value"));
}

#[test]
fn compile_reports_diagnostics_and_exits_2() {
    let dir = TempDir::new().unwrap();
    let input = write_source(&dir, ") 7");
    let output = dir.path().join("out.lsb");
    lsharp()
        .args([
            "compile",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to parse statement (E010)"));
    assert!(!output.exists());
}

#[test]
fn compile_error_exits_2() {
    let dir = TempDir::new().unwrap();
    let input = write_source(&dir, "y + 1");
    lsharp()
        .args(["compile", input.to_str().unwrap()])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("undefined variable 'y'"));
}

// ---- run ----

#[test]
fn run_prints_program_output() {
    let dir = TempDir::new().unwrap();
    let bin = compile_to_temp(&dir, "print('hi') print(3 + 4 * 2)");
    lsharp()
        .args(["run", bin.to_str().unwrap()])
        .assert()
        .success()
        .stdout("hi\n11.000000\n");
}

#[test]
fn run_with_periodic_collection() {
    let dir = TempDir::new().unwrap();
    let bin = compile_to_temp(&dir, "text a = 'x' 'tmp' text b = 'y' print(a) print(b)");
    lsharp()
        .args(["run", bin.to_str().unwrap(), "--gc-every", "1"])
        .assert()
        .success()
        .stdout("x\ny\n");
}

#[test]
fn run_rejects_bad_gc_interval() {
    let dir = TempDir::new().unwrap();
    let bin = compile_to_temp(&dir, "1");
    lsharp()
        .args(["run", bin.to_str().unwrap(), "--gc-every", "0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("positive integer"));
}

#[test]
fn run_forwards_builtin_logging() {
    let dir = TempDir::new().unwrap();
    let bin = compile_to_temp(&dir, "info('hello from L#')");
    lsharp()
        .args(["run", bin.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("hello from L#"));
}

#[test]
fn builtin_logging_uses_matching_levels() {
    let dir = TempDir::new().unwrap();
    let bin = compile_to_temp(
        &dir,
        "error('boom') warning('careful') info('ready') debug('trace')",
    );
    lsharp()
        .env_remove("RUST_LOG")
        .args(["run", bin.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::is_match(r"ERROR\s+lsharp::builtin\] boom").unwrap())
        .stderr(predicate::str::is_match(r"WARN\s+lsharp::builtin\] careful").unwrap())
        .stderr(predicate::str::is_match(r"INFO\s+lsharp::builtin\] ready").unwrap())
        .stderr(
            predicate::str::is_match(r"lsharp::builtin\] trace")
                .unwrap()
                .not(),
        );
}

#[test]
fn builtin_debug_shows_under_debug_filter() {
    let dir = TempDir::new().unwrap();
    let bin = compile_to_temp(&dir, "debug('trace')");
    lsharp()
        .env("RUST_LOG", "debug")
        .args(["run", bin.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::is_match(r"DEBUG\s+lsharp::builtin\] trace").unwrap());
}

#[test]
fn runtime_fault_exits_3() {
    let dir = TempDir::new().unwrap();
    let bin = compile_to_temp(&dir, "1 / 0");
    lsharp()
        .args(["run", bin.to_str().unwrap()])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("division by zero at instruction 2"));
}

#[test]
fn unknown_function_exits_3() {
    let dir = TempDir::new().unwrap();
    let bin = compile_to_temp(&dir, "f(1)");
    lsharp()
        .args(["run", bin.to_str().unwrap()])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("unknown function"));
}

#[test]
fn run_truncated_file_exits_1() {
    let dir = TempDir::new().unwrap();
    let bin = compile_to_temp(&dir, "print('hi')");
    let bytes = fs::read(&bin).unwrap();
    fs::write(&bin, &bytes[..bytes.len() - 5]).unwrap();
    lsharp()
        .args(["run", bin.to_str().unwrap()])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("truncated bytecode"));
}

#[test]
fn run_missing_file_exits_1() {
    lsharp()
        .args(["run", "/nonexistent/prog.lsb"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot read"));
}

// ---- disassemble ----

#[test]
fn disassemble_lists_pool_and_instructions() {
    let dir = TempDir::new().unwrap();
    let bin = compile_to_temp(&dir, "number x = 5 print(x)");
    lsharp()
        .args(["disassemble", bin.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("0000 LOAD_CONST 5.0"))
        .stdout(predicate::str::contains("0001 STORE_VAR $0 (number)"))
        .stdout(predicate::str::contains("0004 HALT"));
}

#[test]
fn disassemble_shows_string_objects() {
    let dir = TempDir::new().unwrap();
    let bin = compile_to_temp(&dir, "'hi' 'hi'");
    lsharp()
        .args(["disassemble", bin.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains(".object 0 'hi'"))
        .stdout(predicate::str::contains(".object 1 'hi'"))
        .stdout(predicate::str::contains("LOAD_CONST #1 'hi'"));
}
