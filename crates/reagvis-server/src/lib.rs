// crates/reagvis-server/src/lib.rs
// ============================================================================
// Module: Reagvis Server Library
// Description: HTTP service for the integrity review desk.
// Purpose: Expose analysis, review, and export routes over axum.
// Dependencies: reagvis-core, reagvis-config, reagvis-backend, axum, tokio
// ============================================================================

//! ## Overview
//! `reagvis-server` wires the core pipeline and ledger behind a JSON HTTP
//! API. Blocking backend calls run on the blocking pool; pacing delays run on
//! the async timer so the reactor never stalls.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod api;
pub mod audit;
pub mod server;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AuditSink;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use server::ReagvisServer;
pub use server::ServerError;
