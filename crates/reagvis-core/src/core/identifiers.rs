// crates/reagvis-core/src/core/identifiers.rs
// ============================================================================
// Module: Reagvis Identifiers
// Description: Typed identifiers for analysis results.
// Purpose: Keep result ids distinct from other integers at API boundaries.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Result identifiers are issued by the ledger in strictly increasing order.
//! They serialize as plain JSON numbers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Identifier of a recorded analysis result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultId(u64);

impl ResultId {
    /// Creates a result identifier from its raw value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw identifier value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns the identifier that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for ResultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for ResultId {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}
