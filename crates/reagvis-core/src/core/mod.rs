// crates/reagvis-core/src/core/mod.rs
// ============================================================================
// Module: Reagvis Core Types
// Description: Domain vocabulary for requests, results, and counters.
// Purpose: Group the serializable data model behind one re-export surface.
// Dependencies: crate::core::*
// ============================================================================

//! ## Overview
//! Data-only types. Behavior that interprets them lives in `rules` and
//! `runtime`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod identifiers;
pub mod request;
pub mod result;
pub mod stats;
pub mod verdict;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use identifiers::*;
pub use request::*;
pub use result::*;
pub use stats::*;
pub use verdict::*;
