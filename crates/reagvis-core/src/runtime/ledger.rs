// crates/reagvis-core/src/runtime/ledger.rs
// ============================================================================
// Module: Reagvis Review Ledger
// Description: In-memory session of recorded results and KPI counters.
// Purpose: Reconcile analyst decision overrides against running counters.
// Dependencies: crate::core, thiserror, time
// ============================================================================

//! ## Overview
//! The ledger owns every recorded result (newest first), the KPI counters,
//! and the bytes of uploaded images so previews can be served. Recording a
//! result counts it once; overriding a decision moves it between buckets and
//! clears the pending analyst action. Counters are never recomputed from the
//! result list, so a retention cap can drop old results without disturbing
//! them.
//!
//! Invariant: when the baseline is balanced, `approved + rejected + manual ==
//! total` after every operation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::VecDeque;

use thiserror::Error;
use time::OffsetDateTime;

use crate::core::identifiers::ResultId;
use crate::core::request::Attachment;
use crate::core::result::AnalysisResult;
use crate::core::result::Assessment;
use crate::core::stats::KpiStats;
use crate::core::stats::StatsError;
use crate::core::verdict::Decision;
use crate::core::verdict::ToolType;
use crate::runtime::export::ExportReport;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Default application name stamped on exports.
pub const DEFAULT_APP_NAME: &str = "Reagvis Labs Pvt. Ltd.";
/// Default route prefix for preview links.
pub const DEFAULT_PREVIEW_BASE_PATH: &str = "/api/results";

/// Ledger construction settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Counters the session starts from.
    pub baseline: KpiStats,
    /// Maximum retained results; older results are evicted first.
    pub max_results: Option<usize>,
    /// Application name stamped on exports.
    pub app_name: String,
    /// Route prefix used to build preview links.
    pub preview_base_path: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            baseline: KpiStats::baseline(),
            max_results: None,
            app_name: DEFAULT_APP_NAME.to_string(),
            preview_base_path: DEFAULT_PREVIEW_BASE_PATH.to_string(),
        }
    }
}

// ============================================================================
// SECTION: Types
// ============================================================================

/// A recorded result with its retained preview bytes.
#[derive(Debug, Clone)]
struct LedgerEntry {
    /// Recorded result.
    result: AnalysisResult,
    /// Image bytes retained for previews.
    preview: Option<Attachment>,
}

/// Effect of a decision override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionChange {
    /// Decision before the override.
    pub previous: Decision,
    /// Decision after the override.
    pub current: Decision,
}

impl DecisionChange {
    /// Returns true when the decision actually changed.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

/// In-memory review session.
#[derive(Debug, Clone)]
pub struct Ledger {
    /// Recorded entries, newest first.
    entries: VecDeque<LedgerEntry>,
    /// Running counters.
    stats: KpiStats,
    /// Identifier issued to the most recent result.
    last_id: ResultId,
    /// Construction settings.
    config: LedgerConfig,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            entries: VecDeque::new(),
            stats: KpiStats::baseline(),
            last_id: ResultId::new(0),
            config: LedgerConfig::default(),
        }
    }
}

impl Ledger {
    /// Creates a ledger from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnbalancedBaseline`] when the baseline buckets
    /// do not add up to the baseline total.
    pub fn new(config: LedgerConfig) -> Result<Self, LedgerError> {
        if !config.baseline.is_balanced() {
            return Err(LedgerError::UnbalancedBaseline);
        }
        Ok(Self {
            entries: VecDeque::new(),
            stats: config.baseline,
            last_id: ResultId::new(0),
            config,
        })
    }

    /// Returns the running counters.
    #[must_use]
    pub const fn stats(&self) -> KpiStats {
        self.stats
    }

    /// Returns the number of retained results.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no results are retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns retained results, newest first.
    pub fn results(&self) -> impl Iterator<Item = &AnalysisResult> {
        self.entries.iter().map(|entry| &entry.result)
    }

    /// Looks up a retained result.
    #[must_use]
    pub fn get(&self, id: ResultId) -> Option<&AnalysisResult> {
        self.entries.iter().find(|entry| entry.result.id == id).map(|entry| &entry.result)
    }

    /// Returns retained preview bytes for an image result.
    #[must_use]
    pub fn preview(&self, id: ResultId) -> Option<&Attachment> {
        self.entries
            .iter()
            .find(|entry| entry.result.id == id)
            .and_then(|entry| entry.preview.as_ref())
    }

    /// Records an assessment and counts its decision.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Stats`] when a counter would overflow.
    pub fn record(
        &mut self,
        assessment: Assessment,
        attachment: Option<&Attachment>,
        now: OffsetDateTime,
    ) -> Result<AnalysisResult, LedgerError> {
        self.stats.record(assessment.decision)?;
        let id = self.last_id.next();
        self.last_id = id;

        let preview = attachment.filter(|file| file.is_image()).cloned();
        let preview_url = preview
            .as_ref()
            .map(|_| format!("{}/{id}/preview", self.config.preview_base_path.trim_end_matches('/')));
        let result = AnalysisResult {
            id,
            timestamp: now,
            assessment,
            attachment: attachment.map(Attachment::summary),
            preview_url,
        };
        self.entries.push_front(LedgerEntry {
            result: result.clone(),
            preview,
        });
        if let Some(max) = self.config.max_results {
            while self.entries.len() > max {
                self.entries.pop_back();
            }
        }
        Ok(result)
    }

    /// Overrides the decision of a retained result.
    ///
    /// Setting the current decision again is a no-op. Otherwise the counters
    /// move between buckets, the decision is replaced, and the pending
    /// analyst action is cleared. Score and priority are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnknownResult`] for ids not retained and
    /// [`LedgerError::Stats`] when the counters cannot move.
    pub fn update_decision(
        &mut self,
        id: ResultId,
        decision: Decision,
    ) -> Result<(AnalysisResult, DecisionChange), LedgerError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| entry.result.id == id)
            .ok_or(LedgerError::UnknownResult(id))?;
        let previous = entry.result.assessment.decision;
        let change = DecisionChange {
            previous,
            current: decision,
        };
        if change.changed() {
            self.stats.transfer(previous, decision)?;
            entry.result.assessment.decision = decision;
            entry.result.assessment.action_required = None;
        }
        Ok((entry.result.clone(), change))
    }

    /// Builds an export report of the session.
    #[must_use]
    pub fn export(&self, active_tool: ToolType, now: OffsetDateTime) -> ExportReport {
        ExportReport::new(
            &self.config.app_name,
            active_tool,
            self.stats,
            self.results().cloned().collect(),
            now,
        )
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Ledger failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// No retained result has the id.
    #[error("unknown result id: {0}")]
    UnknownResult(ResultId),
    /// Counter arithmetic failed.
    #[error(transparent)]
    Stats(#[from] StatsError),
    /// Baseline buckets do not add up to the baseline total.
    #[error("baseline counters are unbalanced")]
    UnbalancedBaseline,
}
