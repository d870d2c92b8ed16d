// crates/reagvis-config/src/config.rs
// ============================================================================
// Module: Reagvis Configuration
// Description: Configuration loading and validation for the review desk.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: reagvis-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Every section has defaults, so an empty file is a valid configuration that
//! serves simulated analysis on loopback. Unknown keys are rejected.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use reagvis_core::KpiStats;
use reagvis_core::LedgerConfig;
use reagvis_core::runtime::ledger::DEFAULT_APP_NAME;
use reagvis_core::runtime::ledger::DEFAULT_PREVIEW_BASE_PATH;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "reagvis.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "REAGVIS_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum request body accepted by the server (bytes).
pub(crate) const MAX_BODY_BYTES_LIMIT: usize = 64 * 1024 * 1024;
/// Minimum backend timeout in milliseconds.
pub(crate) const MIN_BACKEND_TIMEOUT_MS: u64 = 100;
/// Maximum backend timeout in milliseconds.
pub(crate) const MAX_BACKEND_TIMEOUT_MS: u64 = 120_000;
/// Maximum backend response size in bytes.
pub(crate) const MAX_BACKEND_RESPONSE_BYTES: usize = 10 * 1024 * 1024;
/// Maximum pacing delay in milliseconds.
pub(crate) const MAX_PACING_MS: u64 = 60_000;
/// Maximum length of the application name.
pub(crate) const MAX_APP_NAME_LENGTH: usize = 128;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Reagvis service configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReagvisConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Remote integrity backend configuration.
    #[serde(default)]
    pub backend: BackendConfig,
    /// Perceived-latency pacing.
    #[serde(default)]
    pub pacing: PacingConfig,
    /// Review ledger configuration.
    #[serde(default)]
    pub ledger: LedgerSettings,
    /// Simulated scoring configuration.
    #[serde(default)]
    pub scoring: ScoringConfig,
    /// Audit logging configuration.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl ReagvisConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// Resolution order: explicit path, then [`CONFIG_ENV_VAR`], then
    /// [`DEFAULT_CONFIG_NAME`] in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        if content.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.backend.validate()?;
        self.pacing.validate()?;
        self.ledger.validate()?;
        self.audit.validate()?;
        Ok(())
    }

    /// Returns the ledger settings in runtime form.
    #[must_use]
    pub fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig {
            baseline: self.ledger.baseline.into(),
            max_results: self.ledger.max_results,
            app_name: self.ledger.app_name.clone(),
            preview_base_path: DEFAULT_PREVIEW_BASE_PATH.to_string(),
        }
    }
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address to bind.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Allow binding a non-loopback address.
    #[serde(default)]
    pub allow_non_loopback: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_bytes: default_max_body_bytes(),
            allow_non_loopback: false,
        }
    }
}

impl ServerConfig {
    /// Returns the parsed bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the address does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid("server.bind is not a valid socket address".to_string()))
    }

    /// Validates server configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "server.max_body_bytes must be greater than zero".to_string(),
            ));
        }
        if self.max_body_bytes > MAX_BODY_BYTES_LIMIT {
            return Err(ConfigError::Invalid("server.max_body_bytes too large".to_string()));
        }
        let addr = self.bind_addr()?;
        if !addr.ip().is_loopback() && !self.allow_non_loopback {
            return Err(ConfigError::Invalid(
                "non-loopback bind requires server.allow_non_loopback = true".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Backend
// ============================================================================

/// Remote integrity backend configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// Route image documents to the backend.
    #[serde(default)]
    pub enabled: bool,
    /// API base URL (`/get-upload-url` and `/analyze` are appended).
    #[serde(default)]
    pub api_base_url: String,
    /// Storage bucket sent with analyze requests.
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_backend_timeout_ms")]
    pub timeout_ms: u64,
    /// Maximum accepted response size in bytes.
    #[serde(default = "default_backend_response_bytes")]
    pub max_response_bytes: usize,
    /// Allow cleartext `http://` URLs.
    #[serde(default)]
    pub allow_http: bool,
    /// User agent for backend requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_base_url: String::new(),
            bucket: default_bucket(),
            timeout_ms: default_backend_timeout_ms(),
            max_response_bytes: default_backend_response_bytes(),
            allow_http: false,
            user_agent: default_user_agent(),
        }
    }
}

impl BackendConfig {
    /// Validates backend configuration. Disabled backends are not checked.
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }
        let base = self.api_base_url.trim();
        if base.is_empty() {
            return Err(ConfigError::Invalid(
                "backend.api_base_url must be set when backend.enabled = true".to_string(),
            ));
        }
        let scheme_ok =
            base.starts_with("https://") || (self.allow_http && base.starts_with("http://"));
        if !scheme_ok {
            return Err(ConfigError::Invalid(
                "backend.api_base_url must use https (or http with backend.allow_http)"
                    .to_string(),
            ));
        }
        if self.bucket.trim().is_empty() {
            return Err(ConfigError::Invalid("backend.bucket must be non-empty".to_string()));
        }
        if !(MIN_BACKEND_TIMEOUT_MS..=MAX_BACKEND_TIMEOUT_MS).contains(&self.timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "backend.timeout_ms must be between {MIN_BACKEND_TIMEOUT_MS} and \
                 {MAX_BACKEND_TIMEOUT_MS}"
            )));
        }
        if self.max_response_bytes == 0 || self.max_response_bytes > MAX_BACKEND_RESPONSE_BYTES {
            return Err(ConfigError::Invalid(
                "backend.max_response_bytes out of range".to_string(),
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::Invalid("backend.user_agent must be non-empty".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Pacing
// ============================================================================

/// Perceived-latency pacing for analysis responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PacingConfig {
    /// Delay applied to simulated analyses in milliseconds.
    #[serde(default = "default_simulated_latency_ms")]
    pub simulated_latency_ms: u64,
    /// Minimum total duration of any analysis in milliseconds.
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            simulated_latency_ms: default_simulated_latency_ms(),
            min_delay_ms: default_min_delay_ms(),
        }
    }
}

impl PacingConfig {
    /// Pacing with no delays.
    #[must_use]
    pub const fn immediate() -> Self {
        Self {
            simulated_latency_ms: 0,
            min_delay_ms: 0,
        }
    }

    /// Validates pacing bounds.
    fn validate(self) -> Result<(), ConfigError> {
        if self.simulated_latency_ms > MAX_PACING_MS || self.min_delay_ms > MAX_PACING_MS {
            return Err(ConfigError::Invalid(format!(
                "pacing delays must not exceed {MAX_PACING_MS} ms"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Ledger
// ============================================================================

/// Baseline KPI counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BaselineConfig {
    /// Total scanned.
    pub total: u64,
    /// Rejected.
    pub rejected: u64,
    /// Manual review.
    pub manual: u64,
    /// Approved.
    pub approved: u64,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        let stats = KpiStats::baseline();
        Self {
            total: stats.total,
            rejected: stats.rejected,
            manual: stats.manual,
            approved: stats.approved,
        }
    }
}

impl From<BaselineConfig> for KpiStats {
    fn from(config: BaselineConfig) -> Self {
        Self {
            total: config.total,
            rejected: config.rejected,
            manual: config.manual,
            approved: config.approved,
        }
    }
}

/// Review ledger settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerSettings {
    /// Counters the session starts from.
    #[serde(default)]
    pub baseline: BaselineConfig,
    /// Maximum retained results.
    #[serde(default)]
    pub max_results: Option<usize>,
    /// Application name stamped on exports.
    #[serde(default = "default_app_name")]
    pub app_name: String,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            baseline: BaselineConfig::default(),
            max_results: None,
            app_name: default_app_name(),
        }
    }
}

impl LedgerSettings {
    /// Validates ledger settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if !KpiStats::from(self.baseline).is_balanced() {
            return Err(ConfigError::Invalid(
                "ledger.baseline rejected + manual + approved must equal total".to_string(),
            ));
        }
        if self.max_results == Some(0) {
            return Err(ConfigError::Invalid(
                "ledger.max_results must be greater than zero".to_string(),
            ));
        }
        let name = self.app_name.trim();
        if name.is_empty() || name.len() > MAX_APP_NAME_LENGTH {
            return Err(ConfigError::Invalid("ledger.app_name length out of range".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Scoring
// ============================================================================

/// Simulated scoring configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    /// Seed for reproducible scores; entropy when unset.
    #[serde(default)]
    pub seed: Option<u64>,
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Enable structured audit logging.
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,
    /// Optional audit log path (JSON lines); stderr when unset.
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            path: None,
        }
    }
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("audit.path", path)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from an explicit argument, env var, or default.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Default bind address.
fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

/// Default maximum request body (base64 payloads inflate uploads by a third).
const fn default_max_body_bytes() -> usize {
    16 * 1024 * 1024
}

/// Default storage bucket.
fn default_bucket() -> String {
    "doc-risk-demo-reagvis".to_string()
}

/// Default backend timeout.
const fn default_backend_timeout_ms() -> u64 {
    10_000
}

/// Default backend response cap.
const fn default_backend_response_bytes() -> usize {
    1024 * 1024
}

/// Default backend user agent.
fn default_user_agent() -> String {
    format!("reagvis/{}", env!("CARGO_PKG_VERSION"))
}

/// Default simulated latency.
const fn default_simulated_latency_ms() -> u64 {
    1_500
}

/// Default minimum analysis duration.
const fn default_min_delay_ms() -> u64 {
    800
}

/// Default export application name.
fn default_app_name() -> String {
    DEFAULT_APP_NAME.to_string()
}

/// Audit logging defaults to enabled.
const fn default_audit_enabled() -> bool {
    true
}
