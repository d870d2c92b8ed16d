// crates/reagvis-core/src/rules/mod.rs
// ============================================================================
// Module: Reagvis Rules
// Description: Keyword triggers, location matching, canned evidence, derivation.
// Purpose: Group the decision-derivation rule set.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! The rule set is pure: given a request and a score source it produces an
//! assessment without touching shared state.

pub mod catalog;
pub mod derive;
pub mod location;
pub mod triggers;

pub use derive::apply_demo_override;
pub use derive::derive_assessment;
pub use location::LocationPrediction;
pub use location::match_claim;
pub use location::normalize_location;
pub use location::predict_location;
pub use triggers::DemoOverride;
pub use triggers::demo_override;
