// crates/reagvis-core/src/core/result.rs
// ============================================================================
// Module: Reagvis Analysis Results
// Description: Assessments, recorded results, and structured evidence bundles.
// Purpose: Define the exported result schema and its sub-objects.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Derivation produces an [`Assessment`]: score, tier, decision, and evidence.
//! The ledger stamps it with an id and timestamp to form an
//! [`AnalysisResult`]. Field names serialize in camelCase so exported reports
//! keep the established schema.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

use crate::core::identifiers::ResultId;
use crate::core::request::AttachmentSummary;
use crate::core::verdict::Decision;
use crate::core::verdict::MatchStatus;
use crate::core::verdict::Priority;
use crate::core::verdict::RiskScore;
use crate::core::verdict::ToolType;

// ============================================================================
// SECTION: Evidence Sub-Objects
// ============================================================================

/// Decision and evidence for one section of a combined verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionVerdict {
    /// Section decision.
    pub decision: Decision,
    /// Section evidence lines.
    pub evidence: Vec<String>,
}

/// Fact-check verdict label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactCheckVerdict {
    /// Claim corroborated by the reference.
    Verified,
    /// Claim requires analyst verification.
    NeedsReview,
}

/// Structured fact-check evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactCheckDetail {
    /// Verdict label.
    pub verdict: FactCheckVerdict,
    /// Confidence in `0.0..=1.0`.
    pub confidence: f64,
    /// Reference article identifier.
    pub reference_id: String,
    /// Trigger that selected this case.
    pub trigger: String,
    /// Reference title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Reference publisher.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    /// Case identifier for detailed reviews.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_id: Option<String>,
    /// Display title for detailed reviews.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_title: Option<String>,
    /// Named entities extracted from the submission.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_entities: Option<Vec<String>>,
    /// Key factual claims found in the submission.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_claims: Option<Vec<String>>,
    /// Evidence cards backing the verdict.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence_cards: Option<Vec<String>>,
    /// Reasons the case was routed to manual review.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub why_manual_review: Option<Vec<String>>,
    /// Human-readable verdict status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verdict_status: Option<String>,
    /// Recommended analyst action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_action: Option<String>,
}

/// Structured propaganda evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropagandaDetail {
    /// Trigger that selected this case.
    pub trigger: String,
    /// Propaganda score.
    pub score: RiskScore,
    /// Risk level label.
    pub risk_level: Priority,
    /// Rhetorical indicators found.
    pub indicators_found: Vec<String>,
    /// Quoted excerpts supporting the indicators.
    pub evidence_excerpts: Vec<String>,
    /// Matched reference facts.
    pub matched_facts: Vec<String>,
}

/// Structured location/event verification evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationDetail {
    /// Location claimed by the submitter (raw).
    pub claimed_location: String,
    /// Event claimed by the submitter (raw).
    pub claimed_event: String,
    /// Predicted location label.
    pub predicted_location: String,
    /// Predicted event label.
    pub predicted_event: String,
    /// Prediction confidence in `0.0..=1.0`.
    pub confidence: f64,
    /// Claim comparison outcome.
    pub match_status: MatchStatus,
    /// Prediction reasons followed by the comparison message.
    pub reasons: Vec<String>,
}

// ============================================================================
// SECTION: Assessment
// ============================================================================

/// Derived verdict before it is recorded in the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    /// Result filename (submitted or generated).
    pub filename: String,
    /// Tool that produced the assessment.
    pub tool_type: ToolType,
    /// Risk score.
    pub risk_score: RiskScore,
    /// Priority tier.
    pub priority: Priority,
    /// Routing decision.
    pub decision: Decision,
    /// Top-level evidence lines.
    pub evidence: Vec<String>,
    /// Analyst action label, when review is required.
    pub action_required: Option<String>,
    /// Metadata analysis section (verification only).
    pub metadata: Option<SectionVerdict>,
    /// Geolocation section (verification only).
    pub geolocation: Option<SectionVerdict>,
    /// Fact-check detail (curated fact-check cases only).
    pub fact_check: Option<FactCheckDetail>,
    /// Propaganda detail (curated propaganda cases only).
    pub propaganda: Option<PropagandaDetail>,
    /// Verification detail (verification only).
    pub verification: Option<VerificationDetail>,
}

impl Assessment {
    /// Creates a bare assessment whose tier and action follow the score.
    #[must_use]
    pub fn scored(
        tool_type: ToolType,
        filename: String,
        risk_score: RiskScore,
        evidence: Vec<String>,
    ) -> Self {
        let (priority, decision) = risk_score.tier();
        Self {
            filename,
            tool_type,
            risk_score,
            priority,
            decision,
            evidence,
            action_required: decision.action_required(),
            metadata: None,
            geolocation: None,
            fact_check: None,
            propaganda: None,
            verification: None,
        }
    }

    /// Replaces the score and recomputes tier, decision, and action.
    pub fn rescore(&mut self, risk_score: RiskScore) {
        let (priority, decision) = risk_score.tier();
        self.risk_score = risk_score;
        self.priority = priority;
        self.decision = decision;
        self.action_required = decision.action_required();
    }
}

// ============================================================================
// SECTION: Recorded Result
// ============================================================================

/// Analysis result recorded in the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Ledger-issued identifier.
    pub id: ResultId,
    /// Recording time.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Derived verdict and evidence.
    #[serde(flatten)]
    pub assessment: Assessment,
    /// Uploaded file summary, if a file was submitted.
    pub attachment: Option<AttachmentSummary>,
    /// Preview location for image uploads.
    pub preview_url: Option<String>,
}

impl AnalysisResult {
    /// Returns the current decision.
    #[must_use]
    pub const fn decision(&self) -> Decision {
        self.assessment.decision
    }
}
