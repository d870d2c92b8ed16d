// crates/reagvis-core/src/runtime/export.rs
// ============================================================================
// Module: Reagvis Report Export
// Description: JSON report of the review session.
// Purpose: Produce the downloadable session report and its file name.
// Dependencies: crate::core, serde, time
// ============================================================================

//! ## Overview
//! Reports snapshot the counters and every retained result. File names are
//! derived from the UTC generation time so repeated exports sort naturally.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;
use time::UtcOffset;
use time::macros::format_description;

use crate::core::result::AnalysisResult;
use crate::core::stats::KpiStats;
use crate::core::verdict::ToolType;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Counter summary in export form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    /// Total results scanned.
    pub total: u64,
    /// Results rejected.
    pub rejected: u64,
    /// Results awaiting manual review.
    pub manual_review: u64,
    /// Results approved.
    pub approved: u64,
}

impl From<KpiStats> for ExportSummary {
    fn from(stats: KpiStats) -> Self {
        Self {
            total: stats.total,
            rejected: stats.rejected,
            manual_review: stats.manual,
            approved: stats.approved,
        }
    }
}

/// Downloadable session report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportReport {
    /// Generation time.
    #[serde(with = "time::serde::rfc3339")]
    pub generated_at: OffsetDateTime,
    /// Application name.
    pub app_name: String,
    /// Tool selected when the report was generated.
    pub active_tool: ToolType,
    /// Counter summary.
    pub summary: ExportSummary,
    /// Retained results, newest first.
    pub results: Vec<AnalysisResult>,
}

impl ExportReport {
    /// Creates a report.
    #[must_use]
    pub fn new(
        app_name: &str,
        active_tool: ToolType,
        stats: KpiStats,
        results: Vec<AnalysisResult>,
        generated_at: OffsetDateTime,
    ) -> Self {
        Self {
            generated_at,
            app_name: app_name.to_string(),
            active_tool,
            summary: ExportSummary::from(stats),
            results,
        }
    }

    /// File name for this report.
    #[must_use]
    pub fn file_name(&self) -> String {
        export_file_name(self.generated_at)
    }
}

/// Returns `reagvis-labs-report-<YYYY-MM-DD-HHMMSSmmm>.json` for a UTC time.
#[must_use]
pub fn export_file_name(generated_at: OffsetDateTime) -> String {
    let format = format_description!(
        "[year]-[month]-[day]-[hour][minute][second][subsecond digits:3]"
    );
    let stamp = generated_at
        .to_offset(UtcOffset::UTC)
        .format(&format)
        .unwrap_or_else(|_| generated_at.unix_timestamp().to_string());
    format!("reagvis-labs-report-{stamp}.json")
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn file_name_strips_separators() {
        let name = export_file_name(datetime!(2026-10-17 12:34:56.789 UTC));
        assert_eq!(name, "reagvis-labs-report-2026-10-17-123456789.json");
    }

    #[test]
    fn file_name_uses_utc() {
        let name = export_file_name(datetime!(2026-10-17 14:00:00.5 +02:00));
        assert_eq!(name, "reagvis-labs-report-2026-10-17-120000500.json");
    }
}
