//! Config loading and validation tests for reagvis-config.
// crates/reagvis-config/tests/config_validation.rs
// =============================================================================
// Module: Config Loading and Validation Tests
// Description: Validate defaults, file loading, and fail-closed checks.
// Purpose: Ensure minimal config is valid and invariants are enforced.
// =============================================================================

use std::io::Write;

use reagvis_config::ConfigError;
use reagvis_config::ReagvisConfig;
use reagvis_config::config_toml_example;
use reagvis_core::KpiStats;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<ReagvisConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}

fn write_config(content: &str) -> Result<tempfile::NamedTempFile, String> {
    let mut file = tempfile::NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(content.as_bytes()).map_err(|err| err.to_string())?;
    Ok(file)
}

#[test]
fn empty_config_uses_defaults() -> TestResult {
    let config = ReagvisConfig::from_toml_str("").map_err(|err| err.to_string())?;
    if config != ReagvisConfig::default() {
        return Err("empty config should equal defaults".to_string());
    }
    if config.backend.enabled {
        return Err("backend should default to disabled".to_string());
    }
    if config.pacing.simulated_latency_ms != 1_500 || config.pacing.min_delay_ms != 800 {
        return Err("unexpected pacing defaults".to_string());
    }
    if config.ledger_config().baseline != KpiStats::baseline() {
        return Err("ledger baseline should default to the desk baseline".to_string());
    }
    Ok(())
}

#[test]
fn example_config_validates() -> TestResult {
    let config =
        ReagvisConfig::from_toml_str(&config_toml_example()).map_err(|err| err.to_string())?;
    if !config.backend.enabled || config.ledger.max_results != Some(500) {
        return Err("example should enable the backend and cap results".to_string());
    }
    Ok(())
}

#[test]
fn load_reads_explicit_path() -> TestResult {
    let file = write_config("[pacing]\nsimulated_latency_ms = 0\nmin_delay_ms = 0\n")?;
    let config = ReagvisConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    if config.pacing.simulated_latency_ms != 0 {
        return Err("pacing override not applied".to_string());
    }
    Ok(())
}

#[test]
fn load_missing_file_is_io_error() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let missing = dir.path().join("absent.toml");
    match ReagvisConfig::load(Some(&missing)) {
        Err(ConfigError::Io(_)) => Ok(()),
        Err(err) => Err(format!("expected io error, got {err}")),
        Ok(_) => Err("expected io error".to_string()),
    }
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let padding = format!("# {}\n", "x".repeat(1024 * 1024));
    let file = write_config(&padding)?;
    assert_invalid(ReagvisConfig::load(Some(file.path())), "size limit")
}

#[test]
fn unknown_keys_are_rejected() -> TestResult {
    match ReagvisConfig::from_toml_str("[server]\nport = 80\n") {
        Err(ConfigError::Parse(_)) => Ok(()),
        Err(err) => Err(format!("expected parse error, got {err}")),
        Ok(_) => Err("expected parse error".to_string()),
    }
}

#[test]
fn non_loopback_bind_requires_opt_in() -> TestResult {
    assert_invalid(
        ReagvisConfig::from_toml_str("[server]\nbind = \"0.0.0.0:8080\"\n"),
        "allow_non_loopback",
    )?;
    ReagvisConfig::from_toml_str("[server]\nbind = \"0.0.0.0:8080\"\nallow_non_loopback = true\n")
        .map_err(|err| err.to_string())?;
    Ok(())
}

#[test]
fn invalid_bind_is_rejected() -> TestResult {
    assert_invalid(ReagvisConfig::from_toml_str("[server]\nbind = \"localhost\"\n"), "server.bind")
}

#[test]
fn enabled_backend_requires_https_url() -> TestResult {
    assert_invalid(
        ReagvisConfig::from_toml_str("[backend]\nenabled = true\n"),
        "backend.api_base_url must be set",
    )?;
    assert_invalid(
        ReagvisConfig::from_toml_str(
            "[backend]\nenabled = true\napi_base_url = \"http://127.0.0.1:9\"\n",
        ),
        "must use https",
    )?;
    ReagvisConfig::from_toml_str(
        "[backend]\nenabled = true\napi_base_url = \"http://127.0.0.1:9\"\nallow_http = true\n",
    )
    .map_err(|err| err.to_string())?;
    Ok(())
}

#[test]
fn disabled_backend_is_not_checked() -> TestResult {
    ReagvisConfig::from_toml_str("[backend]\nenabled = false\napi_base_url = \"ftp://x\"\n")
        .map_err(|err| err.to_string())?;
    Ok(())
}

#[test]
fn backend_timeout_is_bounded() -> TestResult {
    assert_invalid(
        ReagvisConfig::from_toml_str(
            "[backend]\nenabled = true\napi_base_url = \"https://x.test\"\ntimeout_ms = 5\n",
        ),
        "backend.timeout_ms",
    )
}

#[test]
fn unbalanced_baseline_is_rejected() -> TestResult {
    assert_invalid(
        ReagvisConfig::from_toml_str(
            "[ledger.baseline]\ntotal = 10\nrejected = 1\nmanual = 1\napproved = 1\n",
        ),
        "must equal total",
    )
}

#[test]
fn zero_retention_is_rejected() -> TestResult {
    assert_invalid(ReagvisConfig::from_toml_str("[ledger]\nmax_results = 0\n"), "max_results")
}

#[test]
fn pacing_is_bounded() -> TestResult {
    assert_invalid(
        ReagvisConfig::from_toml_str("[pacing]\nmin_delay_ms = 600000\n"),
        "pacing delays",
    )
}

#[test]
fn empty_audit_path_is_rejected() -> TestResult {
    assert_invalid(ReagvisConfig::from_toml_str("[audit]\npath = \"  \"\n"), "audit.path")
}
