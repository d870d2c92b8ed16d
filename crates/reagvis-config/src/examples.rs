// crates/reagvis-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payload.
// Purpose: Deterministic example for docs and `reagvis config example`.
// Dependencies: std
// ============================================================================

//! ## Overview
//! The canonical example spells out every key with its default, except the
//! backend which is shown enabled against a placeholder URL.

/// Returns a canonical example `reagvis.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[server]
bind = "127.0.0.1:8080"
max_body_bytes = 16777216
allow_non_loopback = false

[backend]
enabled = true
api_base_url = "https://integrity.example.com/prod"
bucket = "doc-risk-demo-reagvis"
timeout_ms = 10000
max_response_bytes = 1048576
allow_http = false
user_agent = "reagvis/0.1"

[pacing]
simulated_latency_ms = 1500
min_delay_ms = 800

[ledger]
app_name = "Reagvis Labs Pvt. Ltd."
max_results = 500

[ledger.baseline]
total = 124
rejected = 12
manual = 5
approved = 107

[scoring]
# seed = 42

[audit]
enabled = true
# path = "reagvis-audit.jsonl"
"#,
    )
}
