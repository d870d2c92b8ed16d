// crates/reagvis-core/src/interfaces/mod.rs
// ============================================================================
// Module: Reagvis Interfaces
// Description: Seams for randomness and the remote integrity backend.
// Purpose: Keep derivation deterministic under test and transport-agnostic.
// Dependencies: crate::core, rand, thiserror
// ============================================================================

//! ## Overview
//! The derivation rules draw random scores through [`ScoreSource`] and the
//! pipeline reaches the remote analysis service through
//! [`IntegrityBackend`]. Production implementations live in this crate
//! ([`SeededScores`]) and in `reagvis-backend`; tests substitute fixed ones.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Mutex;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::request::Attachment;

// ============================================================================
// SECTION: Score Source
// ============================================================================

/// Source of fabricated risk scores.
pub trait ScoreSource: Send + Sync {
    /// Draws a score uniformly from the inclusive range.
    fn draw(&self, range: RangeInclusive<u8>) -> u8;
}

/// Seedable pseudo-random score source.
pub struct SeededScores {
    /// Generator state.
    rng: Mutex<StdRng>,
}

impl SeededScores {
    /// Creates a source with a fixed seed for reproducible runs.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Creates a source seeded from operating-system entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }
}

impl ScoreSource for SeededScores {
    fn draw(&self, range: RangeInclusive<u8>) -> u8 {
        let low = *range.start();
        match self.rng.lock() {
            Ok(mut rng) => rng.gen_range(range),
            // A poisoned generator still yields a valid in-range score.
            Err(_) => low,
        }
    }
}

/// Score source that always returns the lower bound of the range.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowerBoundScores;

impl ScoreSource for LowerBoundScores {
    fn draw(&self, range: RangeInclusive<u8>) -> u8 {
        *range.start()
    }
}

// ============================================================================
// SECTION: Integrity Backend
// ============================================================================

/// Stage of the remote analysis flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendStage {
    /// Requesting a pre-signed upload URL.
    UploadUrl,
    /// Uploading the file to object storage.
    StorageUpload,
    /// Requesting the integrity analysis.
    Analyze,
}

impl BackendStage {
    /// Returns the stable stage label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UploadUrl => "upload-url",
            Self::StorageUpload => "storage-upload",
            Self::Analyze => "analyze",
        }
    }

    /// Message shown to the submitter when this stage fails.
    #[must_use]
    pub const fn user_message(self) -> &'static str {
        match self {
            Self::UploadUrl => "Upload service temporarily unavailable",
            Self::StorageUpload => "Upload failed. Please retry.",
            Self::Analyze => "Analysis failed. Please retry.",
        }
    }
}

impl fmt::Display for BackendStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remote backend failure tagged with the stage it occurred in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{stage} failed: {message}")]
pub struct BackendError {
    /// Failing stage.
    pub stage: BackendStage,
    /// Diagnostic message (not shown to submitters).
    pub message: String,
}

impl BackendError {
    /// Creates a stage error.
    #[must_use]
    pub fn new(stage: BackendStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

/// Pre-signed upload target issued by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadTicket {
    /// URL accepting a single `PUT` of the file bytes.
    pub upload_url: String,
    /// Object key the analysis is requested for.
    pub key: String,
}

/// Remote document integrity service.
pub trait IntegrityBackend: Send + Sync {
    /// Requests a pre-signed upload target.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] tagged [`BackendStage::UploadUrl`].
    fn request_upload_url(&self) -> Result<UploadTicket, BackendError>;

    /// Uploads the attachment to the pre-signed URL.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] tagged [`BackendStage::StorageUpload`].
    fn upload(&self, upload_url: &str, attachment: &Attachment) -> Result<(), BackendError>;

    /// Requests the integrity analysis for an uploaded object.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] tagged [`BackendStage::Analyze`].
    fn analyze(&self, key: &str) -> Result<f64, BackendError>;
}

// ============================================================================
// SECTION: Tests
// ============================================================================
