// crates/reagvis-core/src/rules/triggers.rs
// ============================================================================
// Module: Reagvis Keyword Triggers
// Description: Whole-word and substring triggers over filenames and content.
// Purpose: Select canned evidence and demo overrides from submission text.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Two matching styles are used. Demo overrides look for whole words
//! ("fake"/"real") bounded by non-alphanumeric characters anywhere in the
//! filename or content. Curated cases and the generic fake/real markers are
//! plain substring checks on lowercased text.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::request::AnalysisRequest;
use crate::core::verdict::RiskScore;
use crate::core::verdict::ToolType;

// ============================================================================
// SECTION: Trigger Tables
// ============================================================================

/// Filename markers for the Sensex budget-day fact check.
pub const SENSEX_TRIGGERS: &[&str] = &["14001", "sensex_budgetday", "fact_sensex"];
/// Filename markers for the Doom 64 article review.
pub const DOOM64_TRIGGERS: &[&str] = &["doom64", "aubrey", "hodges", "ongaku", "fact_42001"];
/// Filename markers for the quiet-hour propaganda sample.
pub const QUIET_HOUR_TRIGGERS: &[&str] = &["25001", "quiet_hour", "gossamer_ledger"];
/// Substring marking a sample as fabricated.
pub const FAKE_MARKER: &str = "_fake";
/// Substring marking a sample as authentic.
pub const REAL_MARKER: &str = "_real";

/// Score forced by the whole word "fake".
const OVERRIDE_FAKE_SCORE: u8 = 92;
/// Score forced by the whole word "real".
const OVERRIDE_REAL_SCORE: u8 = 8;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Curated demo case selected by filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CuratedCase {
    /// Sensex budget-day fact check.
    SensexBudgetDay,
    /// Doom 64 / Aubrey Hodges article review.
    Doom64Article,
    /// Quiet-hour ordinance propaganda sample.
    QuietHourOrdinance,
}

/// Authenticity marker found in the filename or content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authenticity {
    /// `_fake` marker present.
    Fake,
    /// `_real` marker present (and no `_fake`).
    Real,
    /// Neither marker present.
    Unmarked,
}

/// Demo override forced by a whole-word trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoOverride {
    /// Forced risk score.
    pub risk_score: RiskScore,
    /// Evidence lines prepended to the result.
    pub evidence: Vec<String>,
}

// ============================================================================
// SECTION: Matching
// ============================================================================

/// Returns true when `word` occurs in `text` bounded by non-alphanumerics.
///
/// Matching is ASCII case-insensitive; `word` must be lowercase ASCII.
#[must_use]
pub fn contains_word(text: &str, word: &str) -> bool {
    if word.is_empty() {
        return false;
    }
    let haystack = text.to_ascii_lowercase();
    let bytes = haystack.as_bytes();
    let mut start = 0;
    while let Some(offset) = haystack[start..].find(word) {
        let begin = start + offset;
        let end = begin + word.len();
        let left_ok = begin == 0 || !bytes[begin - 1].is_ascii_alphanumeric();
        let right_ok = end == bytes.len() || !bytes[end].is_ascii_alphanumeric();
        if left_ok && right_ok {
            return true;
        }
        start = begin + 1;
        while !haystack.is_char_boundary(start) {
            start += 1;
        }
    }
    false
}

/// Returns true when any marker is a substring of `lower`.
#[must_use]
pub fn contains_any(lower: &str, markers: &[&str]) -> bool {
    markers.iter().any(|marker| lower.contains(marker))
}

/// Detects the demo override for a request, if any.
#[must_use]
pub fn demo_override(request: &AnalysisRequest) -> Option<DemoOverride> {
    let source = format!("{} {}", request.filename_str(), request.content_str());
    let source = source.trim();
    if source.is_empty() {
        return None;
    }
    let (score, word) = if contains_word(source, "fake") {
        (OVERRIDE_FAKE_SCORE, "fake")
    } else if contains_word(source, "real") {
        (OVERRIDE_REAL_SCORE, "real")
    } else {
        return None;
    };
    Some(DemoOverride {
        risk_score: RiskScore::new(score),
        evidence: vec![format!("Demo override: filename/content contains the word \"{word}\".")],
    })
}

/// Classifies the generic authenticity marker of a request.
#[must_use]
pub fn authenticity(request: &AnalysisRequest) -> Authenticity {
    let lower = request.primary_text().to_lowercase();
    if lower.contains(FAKE_MARKER) {
        Authenticity::Fake
    } else if lower.contains(REAL_MARKER) {
        Authenticity::Real
    } else {
        Authenticity::Unmarked
    }
}

/// Selects the curated case for a request, honoring the tool gate of each case.
#[must_use]
pub fn curated_case(request: &AnalysisRequest) -> Option<CuratedCase> {
    let lower = request.filename_lower();
    match request.tool_type {
        ToolType::FactCheck if contains_any(&lower, SENSEX_TRIGGERS) => {
            Some(CuratedCase::SensexBudgetDay)
        }
        ToolType::FactCheck if contains_any(&lower, DOOM64_TRIGGERS) => {
            Some(CuratedCase::Doom64Article)
        }
        ToolType::Propaganda if contains_any(&lower, QUIET_HOUR_TRIGGERS) => {
            Some(CuratedCase::QuietHourOrdinance)
        }
        _ => None,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
