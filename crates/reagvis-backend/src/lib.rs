// crates/reagvis-backend/src/lib.rs
// ============================================================================
// Module: Reagvis Backend Library
// Description: Remote document integrity backend over HTTP.
// Purpose: Implement the core integrity backend interface with reqwest.
// Dependencies: reagvis-core, reqwest, serde_json
// ============================================================================

//! ## Overview
//! `reagvis-backend` implements [`reagvis_core::IntegrityBackend`] against
//! the upload-then-analyze HTTP API: request a pre-signed upload URL, `PUT`
//! the file bytes, then ask for a risk score for the stored object.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod http;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use http::HttpBackendConfig;
pub use http::HttpIntegrityBackend;
