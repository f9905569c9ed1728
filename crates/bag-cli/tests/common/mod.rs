//! Shared test harness for bag-cli integration tests.
//!
//! Runs the compiled `bagr` binary with a pinned environment so output does
//! not depend on the caller's shell.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

// ──────────────────────────── Types ────────────────────────────

/// Captured output from running a command.
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

// ──────────────────────────── Binary Discovery ────────────────────────────

/// Discover the path to the compiled `bagr` binary.
pub fn bagr_bin() -> PathBuf {
    let mut path = std::env::current_exe()
        .unwrap()
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .to_path_buf();
    path.push(format!("bagr{}", std::env::consts::EXE_SUFFIX));
    path
}

// ──────────────────────────── Process Runners ────────────────────────────

/// Run `bagr` in `dir` with the given arguments.
pub fn bagr(dir: &Path, args: &[&str]) -> CommandResult {
    bagr_with_env(dir, args, &[])
}

/// Run `bagr` with extra environment variables.
pub fn bagr_with_env(dir: &Path, args: &[&str], env: &[(&str, &str)]) -> CommandResult {
    let mut cmd = Command::new(bagr_bin());
    cmd.args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("BAGR_PROCESSES")
        .env_remove("BAGR_ALGORITHM")
        .env("NO_COLOR", "1");
    for (key, value) in env {
        cmd.env(key, value);
    }
    let output = cmd.output().expect("failed to run bagr");
    CommandResult {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code().unwrap_or(128),
    }
}

// ──────────────────────────── Setup ────────────────────────────

/// A directory `payload/` inside `dir` with a few files, ready to be bagged.
pub fn setup_payload(dir: &Path) -> PathBuf {
    let payload = dir.join("payload");
    fs::create_dir_all(payload.join("docs")).unwrap();
    fs::write(payload.join("readme.txt"), "hello bag\n").unwrap();
    fs::write(payload.join("docs/report.csv"), "a,b\n1,2\n").unwrap();
    payload
}

/// Same as [`setup_payload`], already turned into a bag by `bagr create`.
pub fn setup_bag(dir: &Path) -> PathBuf {
    let payload = setup_payload(dir);
    let result = bagr(dir, &["create", "payload"]);
    assert_eq!(result.exit_code, 0, "create failed: {}", result.stderr);
    payload
}

// ──────────────────────────── Assertions ────────────────────────────

pub fn assert_exit(result: &CommandResult, code: i32) {
    assert_eq!(
        result.exit_code, code,
        "unexpected exit code\nstdout: {}\nstderr: {}",
        result.stdout, result.stderr
    );
}
