// crates/reagvis-config/src/lib.rs
// ============================================================================
// Module: Reagvis Config Library
// Description: Canonical config model, validation, and example generation.
// Purpose: Single source of truth for reagvis.toml semantics.
// Dependencies: reagvis-core, serde, toml
// ============================================================================

//! ## Overview
//! `reagvis-config` defines the configuration model for the review desk
//! service. Loading is size- and path-limited and validation fails closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
