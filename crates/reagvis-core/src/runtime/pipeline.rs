// crates/reagvis-core/src/runtime/pipeline.rs
// ============================================================================
// Module: Reagvis Analysis Pipeline
// Description: Chooses between simulated derivation and the remote backend.
// Purpose: Produce one assessment per submission with a progress trail.
// Dependencies: crate::core, crate::interfaces, crate::rules, thiserror, time
// ============================================================================

//! ## Overview
//! The pipeline routes image documents to the remote integrity backend when
//! one is configured and derives everything else locally. A demo override
//! always wins and, on the remote path, skips the network entirely. Each run
//! records the user-facing progress messages it passed through so callers
//! can replay them.
//!
//! Backend calls are blocking; async callers must run [`AnalysisPipeline::run`]
//! off the reactor.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;

use crate::core::request::AnalysisRequest;
use crate::core::request::Attachment;
use crate::core::result::Assessment;
use crate::core::verdict::RiskScore;
use crate::core::verdict::ToolType;
use crate::interfaces::BackendError;
use crate::interfaces::BackendStage;
use crate::interfaces::IntegrityBackend;
use crate::interfaces::ScoreSource;
use crate::rules::catalog;
use crate::rules::derive::apply_demo_override;
use crate::rules::derive::derive_assessment;
use crate::rules::derive::filename_or_generated;
use crate::rules::triggers::DemoOverride;
use crate::rules::triggers::demo_override;

// ============================================================================
// SECTION: Progress Messages
// ============================================================================

/// Shown when a submission is accepted.
pub const PROGRESS_STARTED: &str = "Uploading and processing...";
/// Shown before requesting an upload target.
pub const PROGRESS_REQUEST_UPLOAD: &str = "Requesting secure upload...";
/// Shown before uploading file bytes.
pub const PROGRESS_UPLOADING: &str = "Uploading to secure storage...";
/// Shown before the remote analysis call.
pub const PROGRESS_ANALYZING: &str = "Analyzing document integrity...";
/// Shown when the assessment is ready.
pub const PROGRESS_COMPLETE: &str = "Analysis complete";

// ============================================================================
// SECTION: Types
// ============================================================================

/// How an assessment was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisPath {
    /// Local rule-based derivation.
    Simulated,
    /// Remote backend score.
    Remote,
    /// Remote-eligible submission resolved by a demo override.
    OverrideShortCircuit,
}

impl AnalysisPath {
    /// Returns a stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Simulated => "simulated",
            Self::Remote => "remote",
            Self::OverrideShortCircuit => "override_short_circuit",
        }
    }

    /// Returns true when callers should apply simulated latency.
    #[must_use]
    pub const fn is_simulated(self) -> bool {
        matches!(self, Self::Simulated)
    }
}

/// Successful pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutcome {
    /// Derived assessment.
    pub assessment: Assessment,
    /// Path that produced it.
    pub path: AnalysisPath,
    /// Progress messages in order.
    pub progress: Vec<String>,
}

/// Failed pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{error}")]
pub struct PipelineFailure {
    /// Underlying backend failure.
    pub error: BackendError,
    /// Progress messages in order, ending with the user-facing failure.
    pub progress: Vec<String>,
}

impl PipelineFailure {
    /// Returns the failed stage.
    #[must_use]
    pub const fn stage(&self) -> BackendStage {
        self.error.stage
    }

    /// Returns the user-facing message for the failed stage.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        self.error.stage.user_message()
    }
}

// ============================================================================
// SECTION: Pipeline
// ============================================================================

/// Analysis pipeline over a score source and an optional backend.
#[derive(Clone)]
pub struct AnalysisPipeline {
    /// Randomness for simulated derivation.
    scores: Arc<dyn ScoreSource>,
    /// Remote backend for image documents.
    backend: Option<Arc<dyn IntegrityBackend>>,
}

impl AnalysisPipeline {
    /// Creates a simulation-only pipeline.
    #[must_use]
    pub fn new(scores: Arc<dyn ScoreSource>) -> Self {
        Self {
            scores,
            backend: None,
        }
    }

    /// Attaches a remote backend.
    #[must_use]
    pub fn with_backend(mut self, backend: Arc<dyn IntegrityBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Returns true when a backend is attached.
    #[must_use]
    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    /// Runs one submission.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineFailure`] when a remote stage fails.
    pub fn run(
        &self,
        request: &AnalysisRequest,
        now: OffsetDateTime,
    ) -> Result<PipelineOutcome, PipelineFailure> {
        let mut progress = vec![PROGRESS_STARTED.to_string()];
        let demo = demo_override(request);

        let remote = match (&self.backend, &request.attachment) {
            (Some(backend), Some(attachment))
                if request.tool_type == ToolType::Document && attachment.is_image() =>
            {
                Some((backend, attachment))
            }
            _ => None,
        };

        let (assessment, path) = match (remote, demo) {
            (Some(_), Some(demo)) => {
                (override_only(request, &demo, now), AnalysisPath::OverrideShortCircuit)
            }
            (Some((backend, attachment)), None) => {
                match remote_assessment(backend.as_ref(), request, attachment, now, &mut progress) {
                    Ok(assessment) => (assessment, AnalysisPath::Remote),
                    Err(error) => {
                        progress.push(error.stage.user_message().to_string());
                        return Err(PipelineFailure {
                            error,
                            progress,
                        });
                    }
                }
            }
            (None, demo) => {
                let derived = derive_assessment(request, self.scores.as_ref(), now);
                let assessment = match demo {
                    Some(demo) => apply_demo_override(derived, &demo),
                    None => derived,
                };
                (assessment, AnalysisPath::Simulated)
            }
        };

        progress.push(PROGRESS_COMPLETE.to_string());
        Ok(PipelineOutcome {
            assessment,
            path,
            progress,
        })
    }
}

// ============================================================================
// SECTION: Remote Path
// ============================================================================

/// Builds an assessment from a demo override alone.
fn override_only(request: &AnalysisRequest, demo: &DemoOverride, now: OffsetDateTime) -> Assessment {
    Assessment::scored(
        ToolType::Document,
        filename_or_generated(request, "document", "png", now),
        demo.risk_score,
        demo.evidence.clone(),
    )
}

/// Runs upload-url, upload (retried once), and analyze.
fn remote_assessment(
    backend: &dyn IntegrityBackend,
    request: &AnalysisRequest,
    attachment: &Attachment,
    now: OffsetDateTime,
    progress: &mut Vec<String>,
) -> Result<Assessment, BackendError> {
    progress.push(PROGRESS_REQUEST_UPLOAD.to_string());
    let ticket = backend.request_upload_url()?;

    progress.push(PROGRESS_UPLOADING.to_string());
    if backend.upload(&ticket.upload_url, attachment).is_err() {
        backend.upload(&ticket.upload_url, attachment)?;
    }

    progress.push(PROGRESS_ANALYZING.to_string());
    let raw = backend.analyze(&ticket.key)?;
    let score = RiskScore::from_f64(raw).ok_or_else(|| {
        BackendError::new(BackendStage::Analyze, format!("invalid risk score: {raw}"))
    })?;

    Ok(Assessment::scored(
        ToolType::Document,
        filename_or_generated(request, "document", "png", now),
        score,
        catalog::remote_model_evidence(&ticket.key),
    ))
}
