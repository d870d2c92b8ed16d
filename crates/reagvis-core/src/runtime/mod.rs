// crates/reagvis-core/src/runtime/mod.rs
// ============================================================================
// Module: Reagvis Runtime
// Description: Review ledger, export, and analysis pipeline.
// Purpose: Stateful orchestration on top of the pure rule set.
// Dependencies: crate::core, crate::interfaces, crate::rules
// ============================================================================

//! ## Overview
//! Runtime components own session state and talk to the backend. Rule
//! evaluation itself stays in [`crate::rules`].

pub mod export;
pub mod ledger;
pub mod pipeline;

pub use export::ExportReport;
pub use export::ExportSummary;
pub use export::export_file_name;
pub use ledger::DecisionChange;
pub use ledger::Ledger;
pub use ledger::LedgerConfig;
pub use ledger::LedgerError;
pub use pipeline::AnalysisPath;
pub use pipeline::AnalysisPipeline;
pub use pipeline::PipelineFailure;
pub use pipeline::PipelineOutcome;
