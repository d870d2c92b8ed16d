// crates/reagvis-server/src/audit.rs
// ============================================================================
// Module: Reagvis Audit Logging
// Description: Structured audit events for review desk activity.
// Purpose: Emit JSON-line audit records without logging submitted content.
// Dependencies: reagvis-core, reagvis-config, serde, serde_json
// ============================================================================

//! ## Overview
//! Audit events are serialized as one JSON object per line. Events carry
//! identifiers, decisions, scores, and attachment digests; submitted text
//! and file bytes are never written.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use reagvis_config::AuditConfig;
use reagvis_core::Decision;
use reagvis_core::ToolType;
use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Analysis audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Selected tool.
    pub tool: ToolType,
    /// Analysis path label when the run completed.
    pub path: Option<&'static str>,
    /// Recorded result identifier.
    pub result_id: Option<u64>,
    /// Decision of the recorded result.
    pub decision: Option<Decision>,
    /// Risk score of the recorded result.
    pub risk_score: Option<u8>,
    /// Failed stage label.
    pub stage: Option<&'static str>,
    /// SHA-256 of the uploaded file.
    pub attachment_sha256: Option<String>,
    /// Size of the uploaded file in bytes.
    pub attachment_bytes: Option<usize>,
    /// Wall-clock duration including pacing, in milliseconds.
    pub duration_ms: u128,
}

/// Inputs required to construct an analysis audit event.
pub struct AnalysisAuditParams {
    /// Selected tool.
    pub tool: ToolType,
    /// Analysis path label when the run completed.
    pub path: Option<&'static str>,
    /// Recorded result identifier.
    pub result_id: Option<u64>,
    /// Decision of the recorded result.
    pub decision: Option<Decision>,
    /// Risk score of the recorded result.
    pub risk_score: Option<u8>,
    /// Failed stage label.
    pub stage: Option<&'static str>,
    /// SHA-256 of the uploaded file.
    pub attachment_sha256: Option<String>,
    /// Size of the uploaded file in bytes.
    pub attachment_bytes: Option<usize>,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u128,
}

/// Decision override audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Result identifier.
    pub result_id: u64,
    /// Decision before the override.
    pub previous: Decision,
    /// Decision after the override.
    pub decision: Decision,
    /// Whether counters moved.
    pub changed: bool,
}

/// Export audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct ExportAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Tool named in the report.
    pub active_tool: ToolType,
    /// Number of results exported.
    pub results: usize,
    /// Download file name.
    pub file_name: String,
}

/// Service lifecycle audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct LifecycleAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Bound socket address.
    pub bind: String,
    /// Whether the remote backend is attached.
    pub backend_enabled: bool,
    /// Whether simulated scores are seeded.
    pub seeded: bool,
}

impl AnalysisAuditEvent {
    /// Creates a completed-analysis event.
    #[must_use]
    pub fn completed(params: AnalysisAuditParams) -> Self {
        Self::from_params("analysis_completed", params)
    }

    /// Creates a failed-analysis event.
    #[must_use]
    pub fn failed(params: AnalysisAuditParams) -> Self {
        Self::from_params("analysis_failed", params)
    }

    /// Builds the event with the given identifier.
    fn from_params(event: &'static str, params: AnalysisAuditParams) -> Self {
        Self {
            event,
            timestamp_ms: now_ms(),
            tool: params.tool,
            path: params.path,
            result_id: params.result_id,
            decision: params.decision,
            risk_score: params.risk_score,
            stage: params.stage,
            attachment_sha256: params.attachment_sha256,
            attachment_bytes: params.attachment_bytes,
            duration_ms: params.duration_ms,
        }
    }
}

impl DecisionAuditEvent {
    /// Creates a decision override event.
    #[must_use]
    pub fn new(result_id: u64, previous: Decision, decision: Decision) -> Self {
        Self {
            event: "decision_override",
            timestamp_ms: now_ms(),
            result_id,
            previous,
            decision,
            changed: previous != decision,
        }
    }
}

impl ExportAuditEvent {
    /// Creates an export event.
    #[must_use]
    pub fn new(active_tool: ToolType, results: usize, file_name: String) -> Self {
        Self {
            event: "session_export",
            timestamp_ms: now_ms(),
            active_tool,
            results,
            file_name,
        }
    }
}

impl LifecycleAuditEvent {
    /// Creates a server-start event.
    #[must_use]
    pub fn started(bind: String, backend_enabled: bool, seeded: bool) -> Self {
        Self {
            event: "server_started",
            timestamp_ms: now_ms(),
            bind,
            backend_enabled,
            seeded,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for review desk events.
pub trait AuditSink: Send + Sync {
    /// Records an analysis event.
    fn record_analysis(&self, event: &AnalysisAuditEvent);

    /// Records a decision override event.
    fn record_decision(&self, _event: &DecisionAuditEvent) {}

    /// Records an export event.
    fn record_export(&self, _event: &ExportAuditEvent) {}

    /// Records a lifecycle event.
    fn record_lifecycle(&self, _event: &LifecycleAuditEvent) {}
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record_analysis(&self, event: &AnalysisAuditEvent) {
        write_stderr(event);
    }

    fn record_decision(&self, event: &DecisionAuditEvent) {
        write_stderr(event);
    }

    fn record_export(&self, event: &ExportAuditEvent) {
        write_stderr(event);
    }

    fn record_lifecycle(&self, event: &LifecycleAuditEvent) {
        write_stderr(event);
    }
}

/// Audit sink that appends JSON lines to a file.
pub struct FileAuditSink {
    /// Open audit file handle guarded for concurrent writes.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens a file-backed audit sink at the provided path.
    ///
    /// # Errors
    ///
    /// Returns [`io::Error`] when the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one serialized event.
    fn append<T: Serialize>(&self, event: &T) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl AuditSink for FileAuditSink {
    fn record_analysis(&self, event: &AnalysisAuditEvent) {
        self.append(event);
    }

    fn record_decision(&self, event: &DecisionAuditEvent) {
        self.append(event);
    }

    fn record_export(&self, event: &ExportAuditEvent) {
        self.append(event);
    }

    fn record_lifecycle(&self, event: &LifecycleAuditEvent) {
        self.append(event);
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record_analysis(&self, _event: &AnalysisAuditEvent) {}
}

/// Builds the audit sink selected by configuration.
///
/// # Errors
///
/// Returns [`io::Error`] when the audit file cannot be opened.
pub fn audit_sink_from_config(config: &AuditConfig) -> io::Result<Arc<dyn AuditSink>> {
    if !config.enabled {
        return Ok(Arc::new(NoopAuditSink));
    }
    match &config.path {
        Some(path) => Ok(Arc::new(FileAuditSink::new(Path::new(path.trim()))?)),
        None => Ok(Arc::new(StderrAuditSink)),
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Milliseconds since the Unix epoch.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

/// Writes one serialized event to stderr.
fn write_stderr<T: Serialize>(event: &T) {
    if let Ok(payload) = serde_json::to_string(event) {
        let _ = writeln!(io::stderr(), "{payload}");
    }
}
