// crates/reagvis-core/src/core/stats.rs
// ============================================================================
// Module: Reagvis KPI Counters
// Description: Aggregate decision counters shown on the review desk.
// Purpose: Track totals per decision bucket under analyst overrides.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Counters start from a seeded baseline and move with every recorded result
//! and every decision override. Bucket arithmetic is checked and fails closed
//! instead of wrapping.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::verdict::Decision;

// ============================================================================
// SECTION: Counters
// ============================================================================

/// Running KPI counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiStats {
    /// Total results scanned.
    pub total: u64,
    /// Results currently rejected.
    pub rejected: u64,
    /// Results currently awaiting manual review.
    pub manual: u64,
    /// Results currently approved.
    pub approved: u64,
}

impl Default for KpiStats {
    fn default() -> Self {
        Self::baseline()
    }
}

impl KpiStats {
    /// Seeded desk baseline.
    #[must_use]
    pub const fn baseline() -> Self {
        Self {
            total: 124,
            rejected: 12,
            manual: 5,
            approved: 107,
        }
    }

    /// All-zero counters.
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            total: 0,
            rejected: 0,
            manual: 0,
            approved: 0,
        }
    }

    /// Returns true when the buckets add up to the total.
    #[must_use]
    pub const fn is_balanced(&self) -> bool {
        match self.rejected.checked_add(self.manual) {
            Some(partial) => match partial.checked_add(self.approved) {
                Some(sum) => sum == self.total,
                None => false,
            },
            None => false,
        }
    }

    /// Returns the bucket count for a decision.
    #[must_use]
    pub const fn bucket(&self, decision: Decision) -> u64 {
        match decision {
            Decision::Approve => self.approved,
            Decision::Reject => self.rejected,
            Decision::ManualReview => self.manual,
        }
    }

    /// Counts a newly recorded result.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError::Overflow`] when a counter would overflow.
    pub fn record(&mut self, decision: Decision) -> Result<(), StatsError> {
        let total = self.total.checked_add(1).ok_or(StatsError::Overflow)?;
        let bucket = self.bucket_mut(decision);
        *bucket = bucket.checked_add(1).ok_or(StatsError::Overflow)?;
        self.total = total;
        Ok(())
    }

    /// Moves one result from one decision bucket to another.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError`] when the source bucket is empty or the target
    /// would overflow. Counters are unchanged on error.
    pub fn transfer(&mut self, from: Decision, to: Decision) -> Result<(), StatsError> {
        if from == to {
            return Ok(());
        }
        let source = self.bucket(from).checked_sub(1).ok_or(StatsError::Underflow(from))?;
        let target = self.bucket(to).checked_add(1).ok_or(StatsError::Overflow)?;
        *self.bucket_mut(from) = source;
        *self.bucket_mut(to) = target;
        Ok(())
    }

    /// Returns a mutable reference to the bucket for a decision.
    const fn bucket_mut(&mut self, decision: Decision) -> &mut u64 {
        match decision {
            Decision::Approve => &mut self.approved,
            Decision::Reject => &mut self.rejected,
            Decision::ManualReview => &mut self.manual,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Counter arithmetic failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StatsError {
    /// A bucket would drop below zero.
    #[error("kpi bucket {0} would underflow")]
    Underflow(Decision),
    /// A counter would overflow.
    #[error("kpi counter overflow")]
    Overflow,
}

// ============================================================================
// SECTION: Tests
// ============================================================================
