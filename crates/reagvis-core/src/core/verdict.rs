// crates/reagvis-core/src/core/verdict.rs
// ============================================================================
// Module: Reagvis Verdict Vocabulary
// Description: Tool types, priority tiers, decisions, and risk score mapping.
// Purpose: Provide the closed vocabulary shared by rules, ledger, and server.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Every analysis result carries a risk score, a priority tier, and a
//! decision. The tier and decision are a pure function of the score; analysts
//! may later override the decision, but never the tier.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Lowest score classified as CRITICAL.
pub const CRITICAL_THRESHOLD: u8 = 61;
/// Lowest score classified as MEDIUM.
pub const MEDIUM_THRESHOLD: u8 = 31;
/// Maximum risk score.
pub const MAX_RISK_SCORE: u8 = 100;
/// Action label attached to results awaiting analyst review.
pub const ANALYST_ACTION: &str = "Analyst verification needed";

// ============================================================================
// SECTION: Tool Types
// ============================================================================

/// Analysis tool selected by the submitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolType {
    /// Document integrity analysis.
    Document,
    /// Claim fact checking.
    FactCheck,
    /// Propaganda and framing analysis.
    Propaganda,
    /// Location and event verification.
    Verification,
}

impl ToolType {
    /// Returns the stable wire label for the tool.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::FactCheck => "fact-check",
            Self::Propaganda => "propaganda",
            Self::Verification => "verification",
        }
    }

    /// Parses a wire label.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "document" => Some(Self::Document),
            "fact-check" => Some(Self::FactCheck),
            "propaganda" => Some(Self::Propaganda),
            "verification" => Some(Self::Verification),
            _ => None,
        }
    }
}

impl fmt::Display for ToolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Priority and Decision
// ============================================================================

/// Priority tier derived from the risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    /// Scores below [`MEDIUM_THRESHOLD`].
    Low,
    /// Scores from [`MEDIUM_THRESHOLD`] up to [`CRITICAL_THRESHOLD`] exclusive.
    Medium,
    /// Scores at or above [`CRITICAL_THRESHOLD`].
    Critical,
}

impl Priority {
    /// Returns the stable wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::Critical => "CRITICAL",
        }
    }
}

/// Routing decision for a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    /// Content accepted.
    Approve,
    /// Content rejected.
    Reject,
    /// Content routed to an analyst.
    ManualReview,
}

impl Decision {
    /// Returns the stable wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "APPROVE",
            Self::Reject => "REJECT",
            Self::ManualReview => "MANUAL_REVIEW",
        }
    }

    /// Parses a wire label.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "APPROVE" => Some(Self::Approve),
            "REJECT" => Some(Self::Reject),
            "MANUAL_REVIEW" => Some(Self::ManualReview),
            _ => None,
        }
    }

    /// Returns the analyst action label required by this decision, if any.
    #[must_use]
    pub fn action_required(self) -> Option<String> {
        match self {
            Self::ManualReview => Some(ANALYST_ACTION.to_string()),
            Self::Approve | Self::Reject => None,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of comparing a claimed location against the predicted one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    /// Claim agrees with the prediction.
    Match,
    /// Claim contradicts the prediction.
    Mismatch,
    /// Not enough information to compare.
    Insufficient,
}

impl MatchStatus {
    /// Section decision implied by the match status.
    #[must_use]
    pub const fn decision(self) -> Decision {
        match self {
            Self::Match => Decision::Approve,
            Self::Mismatch => Decision::Reject,
            Self::Insufficient => Decision::ManualReview,
        }
    }
}

// ============================================================================
// SECTION: Risk Score
// ============================================================================

/// Risk score clamped to `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RiskScore(u8);

impl RiskScore {
    /// Creates a score, clamping values above [`MAX_RISK_SCORE`].
    #[must_use]
    pub const fn new(value: u8) -> Self {
        if value > MAX_RISK_SCORE { Self(MAX_RISK_SCORE) } else { Self(value) }
    }

    /// Converts a remote floating-point score, rounding and clamping.
    ///
    /// Returns `None` for NaN or infinite values.
    #[must_use]
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let rounded = value.round().clamp(0.0, f64::from(MAX_RISK_SCORE));
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "value is clamped to 0..=100 before the cast"
        )]
        let score = rounded as u8;
        Some(Self(score))
    }

    /// Returns the raw score.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Returns the priority and decision implied by this score.
    #[must_use]
    pub const fn tier(self) -> (Priority, Decision) {
        map_risk_score(self.0)
    }
}

impl fmt::Display for RiskScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Maps a raw risk score onto its priority tier and default decision.
#[must_use]
pub const fn map_risk_score(score: u8) -> (Priority, Decision) {
    if score >= CRITICAL_THRESHOLD {
        (Priority::Critical, Decision::Reject)
    } else if score >= MEDIUM_THRESHOLD {
        (Priority::Medium, Decision::ManualReview)
    } else {
        (Priority::Low, Decision::Approve)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
