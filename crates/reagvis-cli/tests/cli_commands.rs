// crates/reagvis-cli/tests/cli_commands.rs
// ============================================================================
// Module: CLI Command Tests
// Description: Integration tests for the reagvis binary.
// Purpose: Verify offline analysis output and config commands end to end.
// Dependencies: reagvis-cli binary, serde_json, tempfile
// ============================================================================
//! ## Overview
//! Runs the compiled `reagvis` binary and inspects its exit status and
//! output streams.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

use serde_json::Value;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Path to the compiled binary.
fn reagvis_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_reagvis"))
}

/// Runs the binary with `args` and no config override.
fn run(args: &[&str]) -> Output {
    Command::new(reagvis_bin())
        .args(args)
        .env_remove("REAGVIS_CONFIG")
        .output()
        .expect("run reagvis")
}

/// Parses stdout as JSON.
fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is json")
}

// ============================================================================
// SECTION: Analyze Tests
// ============================================================================

/// Verifies the curated fact-check sample prints a verified low-risk result.
#[test]
fn analyze_prints_fact_check_result() {
    let output =
        run(&["analyze", "--tool", "fact-check", "--filename", "Sensex_BudgetDay.txt", "--seed", "7"]);
    assert!(output.status.success());
    let result = stdout_json(&output);
    assert_eq!(result["id"], 1);
    assert_eq!(result["toolType"], "fact-check");
    assert_eq!(result["decision"], "APPROVE");
    assert_eq!(result["factCheck"]["verdict"], "verified");
    let score = result["riskScore"].as_u64().unwrap();
    assert!((8..=14).contains(&score));
}

/// Verifies seeded runs are reproducible.
#[test]
fn analyze_with_seed_is_deterministic() {
    let args = ["analyze", "--tool", "document", "--filename", "lease.pdf", "--seed", "42"];
    let first = stdout_json(&run(&args));
    let second = stdout_json(&run(&args));
    assert_eq!(first["riskScore"], second["riskScore"]);
    assert_eq!(first["evidence"], second["evidence"]);
}

/// Verifies attached files are summarized and image previews are linked.
#[test]
fn analyze_summarizes_attached_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scan_real.png");
    fs::write(&path, [0x89, 0x50, 0x4e, 0x47]).unwrap();
    let output = run(&["analyze", "--tool", "document", "--file", path.to_str().unwrap()]);
    assert!(output.status.success());
    let result = stdout_json(&output);
    assert_eq!(result["filename"], "scan_real.png");
    assert_eq!(result["attachment"]["contentType"], "image/png");
    assert_eq!(result["attachment"]["sizeBytes"], 4);
    assert_eq!(result["previewUrl"], "/api/results/1/preview");
}

/// Verifies verification claims flow through to the detail block.
#[test]
fn analyze_verification_uses_claims() {
    let output = run(&[
        "analyze",
        "--tool",
        "verification",
        "--filename",
        "eiffel_night.jpg",
        "--claimed-location",
        "Paris",
        "--seed",
        "1",
    ]);
    assert!(output.status.success());
    let result = stdout_json(&output);
    assert_eq!(result["decision"], "APPROVE");
    assert_eq!(result["verification"]["claimedLocation"], "Paris");
}

/// Verifies unknown tools are rejected by argument parsing.
#[test]
fn analyze_rejects_unknown_tool() {
    let output = run(&["analyze", "--tool", "deepfake"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown tool"));
}

// ============================================================================
// SECTION: Config Tests
// ============================================================================

/// Verifies the example config validates through the CLI.
#[test]
fn config_example_round_trips_through_validate() {
    let example = run(&["config", "example"]);
    assert!(example.status.success());
    let text = String::from_utf8(example.stdout).unwrap();
    assert!(text.contains("[server]"));
    assert!(text.contains("[ledger.baseline]"));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reagvis.toml");
    fs::write(&path, &text).unwrap();
    let validated = run(&["config", "validate", "--config", path.to_str().unwrap()]);
    assert!(validated.status.success());
    assert_eq!(String::from_utf8_lossy(&validated.stdout).trim(), "config valid");
}

/// Verifies non-loopback binds fail validation without the opt-in.
#[test]
fn config_validate_rejects_non_loopback_bind() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reagvis.toml");
    fs::write(&path, "[server]\nbind = \"0.0.0.0:8080\"\n").unwrap();
    let output = run(&["config", "validate", "--config", path.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("allow_non_loopback"));
}

/// Verifies serve fails closed on an invalid config before binding.
#[test]
fn serve_rejects_invalid_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reagvis.toml");
    fs::write(&path, "[pacing]\nunknown_key = 1\n").unwrap();
    let output = run(&["serve", "--config", path.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load config"));
}
