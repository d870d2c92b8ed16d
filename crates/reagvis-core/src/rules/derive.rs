// crates/reagvis-core/src/rules/derive.rs
// ============================================================================
// Module: Reagvis Assessment Derivation
// Description: Deterministic derivation of score, tier, decision, and evidence.
// Purpose: Turn a submission descriptor into a complete assessment.
// Dependencies: crate::core, crate::interfaces, crate::rules, time
// ============================================================================

//! ## Overview
//! Derivation evaluates, in order: curated fact-check and propaganda cases,
//! the verification tool's location rules, and finally the generic per-tool
//! path keyed off `_fake`/`_real` markers. The only nondeterminism is the
//! [`ScoreSource`], which callers seed for reproducible output.
//!
//! Invariant: every assessment leaving this module has its priority and
//! decision equal to [`crate::core::map_risk_score`] of its score.

// ============================================================================
// SECTION: Imports
// ============================================================================

use time::OffsetDateTime;

use crate::core::request::AnalysisRequest;
use crate::core::result::Assessment;
use crate::core::result::SectionVerdict;
use crate::core::result::VerificationDetail;
use crate::core::verdict::Decision;
use crate::core::verdict::RiskScore;
use crate::core::verdict::ToolType;
use crate::interfaces::ScoreSource;
use crate::rules::catalog;
use crate::rules::location::match_claim;
use crate::rules::location::predict_location;
use crate::rules::triggers::Authenticity;
use crate::rules::triggers::CuratedCase;
use crate::rules::triggers::DemoOverride;
use crate::rules::triggers::authenticity;
use crate::rules::triggers::curated_case;

// ============================================================================
// SECTION: Score Tables
// ============================================================================

/// Random range for unmarked submissions.
const UNMARKED_RANGE: (u8, u8) = (40, 59);
/// Random range for `_fake` submissions.
const FAKE_RANGE: (u8, u8) = (88, 97);
/// Random range for `_real` submissions.
const REAL_RANGE: (u8, u8) = (2, 11);
/// Random range for the Sensex fact check.
const SENSEX_RANGE: (u8, u8) = (8, 14);
/// Fixed score for the Doom 64 review.
const DOOM64_SCORE: u8 = 58;
/// Fixed score for the quiet-hour propaganda sample.
const QUIET_HOUR_SCORE: u8 = 78;
/// Fixed score for `_fake` propaganda.
const PROPAGANDA_FAKE_SCORE: u8 = 85;
/// Fixed score for `_real` propaganda.
const PROPAGANDA_REAL_SCORE: u8 = 15;
/// Fixed score for unmarked propaganda.
const PROPAGANDA_UNMARKED_SCORE: u8 = 55;
/// Fixed score for unmarked fact checks (top of the MEDIUM tier).
const FACT_CHECK_UNMARKED_SCORE: u8 = 60;

// ============================================================================
// SECTION: Derivation
// ============================================================================

/// Derives the simulated assessment for a request.
#[must_use]
pub fn derive_assessment(
    request: &AnalysisRequest,
    scores: &dyn ScoreSource,
    now: OffsetDateTime,
) -> Assessment {
    if let Some(case) = curated_case(request) {
        return curated_assessment(request, case, scores, now);
    }
    if request.tool_type == ToolType::Verification {
        return verification_assessment(request, now);
    }
    generic_assessment(request, scores, now)
}

/// Applies a demo override: forced score, recomputed tier, prepended evidence.
#[must_use]
pub fn apply_demo_override(mut assessment: Assessment, demo: &DemoOverride) -> Assessment {
    assessment.rescore(demo.risk_score);
    let mut evidence = demo.evidence.clone();
    evidence.append(&mut assessment.evidence);
    assessment.evidence = evidence;
    assessment
}

/// Returns the submitted filename or a generated `<prefix>_<millis>.<ext>`.
#[must_use]
pub fn filename_or_generated(
    request: &AnalysisRequest,
    prefix: &str,
    extension: &str,
    now: OffsetDateTime,
) -> String {
    match request.filename.as_deref() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("{prefix}_{}.{extension}", unix_millis(now)),
    }
}

/// Milliseconds since the Unix epoch.
#[must_use]
pub fn unix_millis(now: OffsetDateTime) -> i128 {
    now.unix_timestamp_nanos() / 1_000_000
}

// ============================================================================
// SECTION: Curated Cases
// ============================================================================

/// Builds the assessment for a curated demo case.
fn curated_assessment(
    request: &AnalysisRequest,
    case: CuratedCase,
    scores: &dyn ScoreSource,
    now: OffsetDateTime,
) -> Assessment {
    match case {
        CuratedCase::SensexBudgetDay => {
            let score = RiskScore::new(scores.draw(SENSEX_RANGE.0..=SENSEX_RANGE.1));
            let mut assessment = Assessment::scored(
                request.tool_type,
                filename_or_generated(request, "fact_check", "txt", now),
                score,
                vec![catalog::SENSEX_SUMMARY.to_string()],
            );
            assessment.fact_check = Some(catalog::sensex_fact_check());
            assessment
        }
        CuratedCase::Doom64Article => {
            let mut evidence = catalog::owned(&catalog::DOOM64_KEY_CLAIMS[..2]);
            evidence.push(catalog::DOOM64_SOURCE_NOTE.to_string());
            let mut assessment = Assessment::scored(
                request.tool_type,
                filename_or_generated(request, "fact_check", "txt", now),
                RiskScore::new(DOOM64_SCORE),
                evidence,
            );
            assessment.fact_check = Some(catalog::doom64_fact_check());
            assessment
        }
        CuratedCase::QuietHourOrdinance => {
            let score = RiskScore::new(QUIET_HOUR_SCORE);
            let detail = catalog::quiet_hour_propaganda(score);
            let mut assessment = Assessment::scored(
                request.tool_type,
                filename_or_generated(request, "propaganda", "txt", now),
                score,
                detail.evidence_excerpts.clone(),
            );
            assessment.propaganda = Some(detail);
            assessment
        }
    }
}

// ============================================================================
// SECTION: Verification
// ============================================================================

/// Builds the combined metadata + geolocation verification assessment.
fn verification_assessment(request: &AnalysisRequest, now: OffsetDateTime) -> Assessment {
    let prediction = predict_location(&request.filename_lower());
    let claimed_location = request.claimed_location.clone().unwrap_or_default();
    let outcome = match_claim(&prediction, &claimed_location);

    let marker = authenticity(request);
    let metadata_decision = match marker {
        Authenticity::Fake => Decision::Reject,
        Authenticity::Real => Decision::Approve,
        Authenticity::Unmarked => Decision::ManualReview,
    };

    let mut geo_evidence = vec![outcome.message.to_string()];
    geo_evidence.extend(prediction.reasons.iter().cloned());
    let mut reasons = prediction.reasons.clone();
    reasons.push(outcome.message.to_string());

    let mut assessment = Assessment::scored(
        ToolType::Verification,
        filename_or_generated(request, "verification", "txt", now),
        outcome.risk_score,
        vec![catalog::VERIFICATION_SUMMARY.to_string()],
    );
    assessment.metadata = Some(SectionVerdict {
        decision: metadata_decision,
        evidence: catalog::owned(catalog::metadata_evidence(marker)),
    });
    assessment.geolocation = Some(SectionVerdict {
        decision: outcome.status.decision(),
        evidence: geo_evidence,
    });
    assessment.verification = Some(VerificationDetail {
        claimed_location,
        claimed_event: request.claimed_event.clone().unwrap_or_default(),
        predicted_location: prediction.location,
        predicted_event: prediction.event,
        confidence: prediction.confidence,
        match_status: outcome.status,
        reasons,
    });
    assessment
}

// ============================================================================
// SECTION: Generic Path
// ============================================================================

/// Builds the generic per-tool assessment keyed off authenticity markers.
fn generic_assessment(
    request: &AnalysisRequest,
    scores: &dyn ScoreSource,
    now: OffsetDateTime,
) -> Assessment {
    let tool = request.tool_type;
    let marker = authenticity(request);
    let score = match (marker, tool) {
        (Authenticity::Fake, ToolType::Propaganda) => PROPAGANDA_FAKE_SCORE,
        (Authenticity::Fake, _) => scores.draw(FAKE_RANGE.0..=FAKE_RANGE.1),
        (Authenticity::Real, ToolType::Propaganda) => PROPAGANDA_REAL_SCORE,
        (Authenticity::Real, _) => scores.draw(REAL_RANGE.0..=REAL_RANGE.1),
        (Authenticity::Unmarked, ToolType::Propaganda) => PROPAGANDA_UNMARKED_SCORE,
        (Authenticity::Unmarked, ToolType::FactCheck) => FACT_CHECK_UNMARKED_SCORE,
        (Authenticity::Unmarked, _) => scores.draw(UNMARKED_RANGE.0..=UNMARKED_RANGE.1),
    };
    Assessment::scored(
        tool,
        filename_or_generated(request, "text_analysis", "txt", now),
        RiskScore::new(score),
        catalog::owned(catalog::generic_evidence(tool, marker)),
    )
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;
    use crate::core::verdict::Priority;
    use crate::interfaces::LowerBoundScores;

    const NOW: OffsetDateTime = datetime!(2026-01-02 03:04:05.678 UTC);

    #[test]
    fn generated_filenames_use_millis() {
        let request = AnalysisRequest::new(ToolType::Document);
        let assessment = derive_assessment(&request, &LowerBoundScores, NOW);
        assert_eq!(assessment.filename, format!("text_analysis_{}.txt", unix_millis(NOW)));
        assert!(assessment.filename.ends_with("678.txt"));
    }

    #[test]
    fn unmarked_document_lands_in_manual_review() {
        let request = AnalysisRequest::new(ToolType::Document).with_filename("scan.png");
        let assessment = derive_assessment(&request, &LowerBoundScores, NOW);
        assert_eq!(assessment.risk_score.value(), 40);
        assert_eq!(assessment.priority, Priority::Medium);
        assert_eq!(assessment.decision, Decision::ManualReview);
        assert_eq!(assessment.evidence, catalog::owned(catalog::INCONCLUSIVE_EVIDENCE));
        assert!(assessment.action_required.is_some());
    }

    #[test]
    fn override_prepends_evidence_and_retiers() {
        let request = AnalysisRequest::new(ToolType::Document).with_filename("scan.png");
        let assessment = derive_assessment(&request, &LowerBoundScores, NOW);
        let demo = DemoOverride {
            risk_score: RiskScore::new(92),
            evidence: vec!["forced".to_string()],
        };
        let overridden = apply_demo_override(assessment, &demo);
        assert_eq!(overridden.decision, Decision::Reject);
        assert_eq!(overridden.action_required, None);
        assert_eq!(overridden.evidence.first().map(String::as_str), Some("forced"));
        assert_eq!(overridden.evidence.len(), 3);
    }
}
