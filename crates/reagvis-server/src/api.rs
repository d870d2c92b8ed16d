// crates/reagvis-server/src/api.rs
// ============================================================================
// Module: Reagvis HTTP API Types
// Description: Request and response bodies for the review desk routes.
// Purpose: Decode submissions and shape JSON replies.
// Dependencies: reagvis-core, base64, serde
// ============================================================================

//! ## Overview
//! Submissions arrive as JSON with the file inlined as base64. Decoding is
//! strict: unknown fields, invalid base64, and oversized files are rejected
//! before any analysis runs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reagvis_core::AnalysisRequest;
use reagvis_core::AnalysisResult;
use reagvis_core::Attachment;
use reagvis_core::Decision;
use reagvis_core::KpiStats;
use reagvis_core::ToolType;
use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Requests
// ============================================================================

/// Inline file upload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FilePayload {
    /// Declared MIME type.
    #[serde(default)]
    pub content_type: Option<String>,
    /// File bytes, standard base64.
    pub data_base64: String,
}

/// Analysis submission body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AnalysisSubmission {
    /// Selected tool.
    pub tool_type: ToolType,
    /// Submitted filename.
    #[serde(default)]
    pub filename: Option<String>,
    /// Submitted text.
    #[serde(default)]
    pub content: Option<String>,
    /// Claimed location (verification).
    #[serde(default)]
    pub claimed_location: Option<String>,
    /// Claimed event (verification).
    #[serde(default)]
    pub claimed_event: Option<String>,
    /// Inline file.
    #[serde(default)]
    pub file: Option<FilePayload>,
}

impl AnalysisSubmission {
    /// Converts the submission into a core request.
    ///
    /// # Errors
    ///
    /// Returns a client-facing message when the file is not valid base64 or
    /// decodes to more than `max_file_bytes`.
    pub fn into_request(self, max_file_bytes: usize) -> Result<AnalysisRequest, String> {
        let mut request = AnalysisRequest::new(self.tool_type);
        request.filename = self.filename;
        request.content = self.content;
        request.claimed_location = self.claimed_location;
        request.claimed_event = self.claimed_event;
        if let Some(file) = self.file {
            let bytes = STANDARD
                .decode(file.data_base64.trim())
                .map_err(|_| "file.dataBase64 is not valid base64".to_string())?;
            if bytes.len() > max_file_bytes {
                return Err("file exceeds size limit".to_string());
            }
            request.attachment =
                Some(Attachment::new(file.content_type.unwrap_or_default(), bytes));
        }
        Ok(request)
    }
}

/// Decision override body.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DecisionSubmission {
    /// New decision.
    pub decision: Decision,
}

/// Export query string.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportQuery {
    /// Tool selected in the client; document when omitted.
    #[serde(default)]
    pub active_tool: Option<ToolType>,
}

// ============================================================================
// SECTION: Responses
// ============================================================================

/// Successful analysis reply.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse {
    /// Recorded result.
    pub result: AnalysisResult,
    /// Counters after recording.
    pub stats: KpiStats,
    /// Progress messages in order.
    pub progress: Vec<String>,
}

/// Failed analysis reply.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisFailureResponse {
    /// Stage failure.
    pub error: StageErrorBody,
    /// Progress messages in order.
    pub progress: Vec<String>,
}

/// Stage failure detail.
#[derive(Debug, Clone, Serialize)]
pub struct StageErrorBody {
    /// Failing stage label.
    pub stage: &'static str,
    /// User-facing message.
    pub message: &'static str,
}

/// Decision override reply.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionResponse {
    /// Updated result.
    pub result: AnalysisResult,
    /// Counters after the override.
    pub stats: KpiStats,
}

/// Result listing reply.
#[derive(Debug, Clone, Serialize)]
pub struct ResultsResponse {
    /// Retained results, newest first.
    pub results: Vec<AnalysisResult>,
    /// Current counters.
    pub stats: KpiStats,
}

/// Generic error reply.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error detail.
    pub error: ErrorBody,
}

/// Generic error detail.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    /// Stable error code.
    pub code: &'static str,
    /// Human-readable message.
    pub message: String,
}

impl ErrorResponse {
    /// Creates an error reply.
    #[must_use]
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                code,
                message: message.into(),
            },
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
