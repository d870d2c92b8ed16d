// crates/reagvis-backend/src/http.rs
// ============================================================================
// Module: HTTP Integrity Backend
// Description: Blocking client for the upload-then-analyze integrity API.
// Purpose: Drive the three remote stages with strict limits and stage errors.
// Dependencies: reagvis-core, reqwest, serde, serde_json
// ============================================================================

//! ## Overview
//! Each stage maps to one request:
//! - `POST {base}/get-upload-url` returns `{ "upload_url", "key" }`.
//! - `PUT {upload_url}` stores the file bytes with its content type.
//! - `POST {base}/analyze` with `{ "bucket", "key" }` returns
//!   `{ "risk_score": number }`.
//!
//! Non-2xx statuses, oversized or malformed bodies, redirects, and transport
//! failures all surface as [`BackendError`] tagged with the failing stage.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::time::Duration;

use reagvis_core::Attachment;
use reagvis_core::BackendError;
use reagvis_core::BackendStage;
use reagvis_core::IntegrityBackend;
use reagvis_core::UploadTicket;
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::blocking::Response;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the HTTP integrity backend.
///
/// # Invariants
/// - `allow_http = false` blocks cleartext `http://` URLs, including the
///   pre-signed upload URL returned by the service.
/// - `max_response_bytes` is a hard upper bound on every response body.
/// - `timeout_ms` applies to the full request lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpBackendConfig {
    /// API base URL; stage paths are appended.
    pub api_base_url: String,
    /// Storage bucket sent with analyze requests.
    pub bucket: String,
    /// Allow cleartext HTTP (disabled by default).
    pub allow_http: bool,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum response size allowed, in bytes.
    pub max_response_bytes: usize,
    /// User agent string for outbound requests.
    pub user_agent: String,
}

impl Default for HttpBackendConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            bucket: "doc-risk-demo-reagvis".to_string(),
            allow_http: false,
            timeout_ms: 10_000,
            max_response_bytes: 1024 * 1024,
            user_agent: "reagvis/0.1".to_string(),
        }
    }
}

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// Upload-url response body.
#[derive(Debug, Deserialize)]
struct UploadUrlResponse {
    /// Pre-signed upload URL.
    #[serde(default)]
    upload_url: Option<String>,
    /// Storage object key.
    #[serde(default)]
    key: Option<String>,
}

/// Analyze request body.
#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    /// Storage bucket.
    bucket: &'a str,
    /// Storage object key.
    key: &'a str,
}

/// Analyze response body.
#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    /// Risk score in 0..=100; any JSON number is accepted here.
    #[serde(default)]
    risk_score: Option<serde_json::Value>,
}

// ============================================================================
// SECTION: Backend Implementation
// ============================================================================

/// Integrity backend over blocking HTTP.
///
/// # Invariants
/// - Redirects are not followed.
/// - URLs with embedded credentials are rejected.
pub struct HttpIntegrityBackend {
    /// Backend configuration, including limits and policy.
    config: HttpBackendConfig,
    /// Parsed API base URL (always ends with `/`).
    base: Url,
    /// HTTP client used for outbound requests.
    client: Client,
}

impl HttpIntegrityBackend {
    /// Creates a backend with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] tagged [`BackendStage::UploadUrl`] when the
    /// base URL is unusable or the HTTP client cannot be created.
    pub fn new(config: HttpBackendConfig) -> Result<Self, BackendError> {
        let base = parse_base_url(&config.api_base_url)
            .ok_or_else(|| BackendError::new(BackendStage::UploadUrl, "invalid api base url"))?;
        validate_url(&base, config.allow_http)
            .map_err(|message| BackendError::new(BackendStage::UploadUrl, message))?;
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .redirect(Policy::none())
            .build()
            .map_err(|_| BackendError::new(BackendStage::UploadUrl, "http client build failed"))?;
        Ok(Self {
            config,
            base,
            client,
        })
    }

    /// Resolves a stage path against the base URL.
    fn endpoint(&self, stage: BackendStage, path: &str) -> Result<Url, BackendError> {
        self.base
            .join(path)
            .map_err(|_| BackendError::new(stage, format!("invalid endpoint path: {path}")))
    }
}

impl IntegrityBackend for HttpIntegrityBackend {
    fn request_upload_url(&self) -> Result<UploadTicket, BackendError> {
        let stage = BackendStage::UploadUrl;
        let url = self.endpoint(stage, "get-upload-url")?;
        let response = self
            .client
            .post(url)
            .send()
            .map_err(|_| BackendError::new(stage, "upload url request failed"))?;
        let body = read_success_body(stage, response, self.config.max_response_bytes)?;
        let parsed: UploadUrlResponse = serde_json::from_slice(&body)
            .map_err(|_| BackendError::new(stage, "invalid upload url response"))?;
        match (parsed.upload_url, parsed.key) {
            (Some(upload_url), Some(key)) if !upload_url.is_empty() && !key.is_empty() => {
                Ok(UploadTicket {
                    upload_url,
                    key,
                })
            }
            _ => Err(BackendError::new(stage, "invalid upload url response")),
        }
    }

    fn upload(&self, upload_url: &str, attachment: &Attachment) -> Result<(), BackendError> {
        let stage = BackendStage::StorageUpload;
        let url = Url::parse(upload_url)
            .map_err(|_| BackendError::new(stage, "invalid upload url"))?;
        validate_url(&url, self.config.allow_http)
            .map_err(|message| BackendError::new(stage, message))?;
        let response = self
            .client
            .put(url)
            .header(CONTENT_TYPE, attachment.effective_content_type())
            .body(attachment.bytes.clone())
            .send()
            .map_err(|_| BackendError::new(stage, "storage upload request failed"))?;
        read_success_body(stage, response, self.config.max_response_bytes)?;
        Ok(())
    }

    fn analyze(&self, key: &str) -> Result<f64, BackendError> {
        let stage = BackendStage::Analyze;
        let url = self.endpoint(stage, "analyze")?;
        let payload = serde_json::to_vec(&AnalyzeRequest {
            bucket: &self.config.bucket,
            key,
        })
        .map_err(|_| BackendError::new(stage, "analyze request serialization failed"))?;
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .map_err(|_| BackendError::new(stage, "analyze request failed"))?;
        let body = read_success_body(stage, response, self.config.max_response_bytes)?;
        let parsed: AnalyzeResponse = serde_json::from_slice(&body)
            .map_err(|_| BackendError::new(stage, "invalid analysis response"))?;
        parsed
            .risk_score
            .as_ref()
            .and_then(serde_json::Value::as_f64)
            .ok_or_else(|| BackendError::new(stage, "invalid analysis response"))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses the base URL so relative joins append to its path.
fn parse_base_url(raw: &str) -> Option<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let with_slash =
        if trimmed.ends_with('/') { trimmed.to_string() } else { format!("{trimmed}/") };
    Url::parse(&with_slash).ok()
}

/// Validates URL scheme and credential policy.
fn validate_url(url: &Url, allow_http: bool) -> Result<(), &'static str> {
    match url.scheme() {
        "https" => {}
        "http" if allow_http => {}
        _ => return Err("unsupported url scheme"),
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err("url credentials are not allowed");
    }
    if url.host_str().is_none() {
        return Err("url host required");
    }
    Ok(())
}

/// Rejects non-2xx responses and reads the body under the size limit.
fn read_success_body(
    stage: BackendStage,
    response: Response,
    max_bytes: usize,
) -> Result<Vec<u8>, BackendError> {
    let status = response.status();
    if status.is_redirection() {
        return Err(BackendError::new(stage, "http redirect not allowed"));
    }
    if !status.is_success() {
        return Err(BackendError::new(stage, format!("unexpected status {}", status.as_u16())));
    }
    read_response_limited(stage, response, max_bytes)
}

/// Reads the response body while enforcing a byte limit.
fn read_response_limited(
    stage: BackendStage,
    response: Response,
    max_bytes: usize,
) -> Result<Vec<u8>, BackendError> {
    let expected_len = response.content_length();
    let max_bytes_u64 = u64::try_from(max_bytes)
        .map_err(|_| BackendError::new(stage, "response size limit exceeds u64"))?;
    if let Some(expected) = expected_len
        && expected > max_bytes_u64
    {
        return Err(BackendError::new(stage, "http response exceeds size limit"));
    }
    let mut buf = Vec::new();
    let mut handle = response.take(max_bytes_u64.saturating_add(1));
    handle
        .read_to_end(&mut buf)
        .map_err(|_| BackendError::new(stage, "failed to read response"))?;
    if buf.len() > max_bytes {
        return Err(BackendError::new(stage, "http response exceeds size limit"));
    }
    Ok(buf)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let base = parse_base_url("https://api.test/prod").map(|url| url.to_string());
        assert_eq!(base.as_deref(), Some("https://api.test/prod/"));
        let joined = parse_base_url("https://api.test/prod")
            .and_then(|url| url.join("analyze").ok())
            .map(|url| url.to_string());
        assert_eq!(joined.as_deref(), Some("https://api.test/prod/analyze"));
    }

    #[test]
    fn validate_url_enforces_scheme_and_credentials() {
        let http = Url::parse("http://api.test/").ok();
        let creds = Url::parse("https://user:pw@api.test/").ok();
        assert_eq!(http.as_ref().map(|url| validate_url(url, false)), Some(Err("unsupported url scheme")));
        assert_eq!(http.as_ref().map(|url| validate_url(url, true)), Some(Ok(())));
        assert_eq!(
            creds.as_ref().map(|url| validate_url(url, false)),
            Some(Err("url credentials are not allowed"))
        );
    }
}
