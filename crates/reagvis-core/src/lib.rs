// crates/reagvis-core/src/lib.rs
// ============================================================================
// Module: Reagvis Core Library
// Description: Public API surface for the Reagvis review desk core.
// Purpose: Expose domain types, derivation rules, and runtime helpers.
// Dependencies: crate::{core, interfaces, rules, runtime}
// ============================================================================

//! ## Overview
//! Reagvis core turns a submission descriptor (tool, filename, optional text,
//! optional file, optional claimed location) into a scored assessment with a
//! risk tier, a routing decision, and canned evidence. It keeps the review
//! session ledger whose KPI counters follow analyst overrides, and it drives
//! an optional remote integrity backend through an explicit interface.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod rules;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use interfaces::BackendError;
pub use interfaces::BackendStage;
pub use interfaces::IntegrityBackend;
pub use interfaces::LowerBoundScores;
pub use interfaces::ScoreSource;
pub use interfaces::SeededScores;
pub use interfaces::UploadTicket;
pub use rules::DemoOverride;
pub use rules::apply_demo_override;
pub use rules::demo_override;
pub use rules::derive_assessment;
pub use runtime::AnalysisPath;
pub use runtime::AnalysisPipeline;
pub use runtime::DecisionChange;
pub use runtime::ExportReport;
pub use runtime::ExportSummary;
pub use runtime::Ledger;
pub use runtime::LedgerConfig;
pub use runtime::LedgerError;
pub use runtime::PipelineFailure;
pub use runtime::PipelineOutcome;
pub use runtime::export_file_name;
