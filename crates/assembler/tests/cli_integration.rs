//! Integration tests for the ember-asm CLI.

use arch_core as _;
use assembler as _;
use std::fs;
use std::path::PathBuf;
use std::process::Command;

fn binary_path() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop();
    path.pop();
    path.join("ember-asm")
}

fn create_temp_file(dir: &std::path::Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn assembles_a_simple_program_to_a_hex_dump() {
    let temp_dir = tempfile::tempdir().unwrap();
    let source = create_temp_file(temp_dir.path(), "simple.asm", "lda 0x10\nnop\n");

    let output = Command::new(binary_path())
        .arg(source.to_str().unwrap())
        .output()
        .expect("failed to run ember-asm");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim_end(), "01 10 00");
}

#[test]
fn dump_wraps_at_sixteen_bytes_per_line() {
    let temp_dir = tempfile::tempdir().unwrap();
    let source = create_temp_file(
        temp_dir.path(),
        "wide.asm",
        "\"abcdefghijklmnopqr\"\n",
    );

    let output = Command::new(binary_path())
        .arg(source.to_str().unwrap())
        .output()
        .expect("failed to run ember-asm");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.trim_end().lines().collect();
    // 18 characters plus the NUL terminator
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        "61 62 63 64 65 66 67 68 69 6a 6b 6c 6d 6e 6f 70"
    );
    assert_eq!(lines[1], "71 72 00");
}

#[test]
fn labels_resolve_across_the_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let source = create_temp_file(
        temp_dir.path(),
        "loop.asm",
        "loop: nop\njmp loop\n",
    );

    let output = Command::new(binary_path())
        .arg(source.to_str().unwrap())
        .output()
        .expect("failed to run ember-asm");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim_end(), "00 1d 00 00");
}

#[test]
fn missing_file_fails_with_a_message() {
    let temp_dir = tempfile::tempdir().unwrap();
    let missing = temp_dir.path().join("nope.asm");

    let output = Command::new(binary_path())
        .arg(missing.to_str().unwrap())
        .output()
        .expect("failed to run ember-asm");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read"));
}

#[test]
fn lexical_errors_abort_with_a_line_number() {
    let temp_dir = tempfile::tempdir().unwrap();
    let source = create_temp_file(temp_dir.path(), "bad.asm", "nop\n@\n");

    let output = Command::new(binary_path())
        .arg(source.to_str().unwrap())
        .output()
        .expect("failed to run ember-asm");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("line 2: error: unexpected character"));
    assert!(output.stdout.is_empty());
}

#[test]
fn diagnostics_refuse_output_and_report_every_problem() {
    let temp_dir = tempfile::tempdir().unwrap();
    let source = create_temp_file(
        temp_dir.path(),
        "diag.asm",
        "lda 256\njmp missing\n",
    );

    let output = Command::new(binary_path())
        .arg(source.to_str().unwrap())
        .output()
        .expect("failed to run ember-asm");

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("line 1: error: argument larger than 8 bits"));
    assert!(stderr.contains("line 2: error: label not defined: missing"));
}

#[test]
fn empty_source_produces_no_output() {
    let temp_dir = tempfile::tempdir().unwrap();
    let source = create_temp_file(temp_dir.path(), "empty.asm", "");

    let output = Command::new(binary_path())
        .arg(source.to_str().unwrap())
        .output()
        .expect("failed to run ember-asm");

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn help_flag_prints_usage() {
    let output = Command::new(binary_path())
        .arg("--help")
        .output()
        .expect("failed to run ember-asm");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage: ember-asm"));
}
