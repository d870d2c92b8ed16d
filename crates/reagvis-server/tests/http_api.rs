// crates/reagvis-server/tests/http_api.rs
// ============================================================================
// Module: Review Desk HTTP Tests
// Description: End-to-end route checks against a live local listener.
// Purpose: Verify analysis, review, preview, export, and audit behavior.
// Dependencies: reagvis-server, reagvis-core, reagvis-config, reqwest, tokio
// ============================================================================

//! ## Overview
//! Each test binds an ephemeral loopback listener, serves the router with an
//! immediate pacing profile (or a fixed non-zero one for the pacing tests)
//! and a deterministic score source, and talks to it over HTTP.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use reagvis_config::AuditConfig;
use reagvis_config::PacingConfig;
use reagvis_config::ReagvisConfig;
use reagvis_core::AnalysisPipeline;
use reagvis_core::Attachment;
use reagvis_core::BackendError;
use reagvis_core::BackendStage;
use reagvis_core::IntegrityBackend;
use reagvis_core::LowerBoundScores;
use reagvis_core::UploadTicket;
use reagvis_server::FileAuditSink;
use reagvis_server::ReagvisServer;
use reagvis_server::audit::AnalysisAuditEvent;
use reagvis_server::audit::AuditSink;
use reagvis_server::audit::DecisionAuditEvent;
use reagvis_server::audit::ExportAuditEvent;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

/// Backend returning a fixed score or failing storage uploads.
struct FixedBackend {
    /// Score returned by analyze.
    score: f64,
    /// Fail every storage upload.
    fail_storage: bool,
}

impl IntegrityBackend for FixedBackend {
    fn request_upload_url(&self) -> Result<UploadTicket, BackendError> {
        Ok(UploadTicket {
            upload_url: "https://storage.test/obj-1".to_string(),
            key: "obj-1".to_string(),
        })
    }

    fn upload(&self, _upload_url: &str, _attachment: &Attachment) -> Result<(), BackendError> {
        if self.fail_storage {
            return Err(BackendError::new(BackendStage::StorageUpload, "unexpected status 403"));
        }
        Ok(())
    }

    fn analyze(&self, _key: &str) -> Result<f64, BackendError> {
        Ok(self.score)
    }
}

/// Audit sink capturing event names in memory.
#[derive(Default)]
struct RecordingSink {
    /// Captured event identifiers.
    events: Mutex<Vec<String>>,
}

impl RecordingSink {
    /// Returns the captured event identifiers.
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl AuditSink for RecordingSink {
    fn record_analysis(&self, event: &AnalysisAuditEvent) {
        self.events.lock().unwrap().push(event.event.to_string());
    }

    fn record_decision(&self, event: &DecisionAuditEvent) {
        self.events.lock().unwrap().push(event.event.to_string());
    }

    fn record_export(&self, event: &ExportAuditEvent) {
        self.events.lock().unwrap().push(event.event.to_string());
    }
}

/// Test configuration with immediate pacing and audit disabled.
fn test_config() -> ReagvisConfig {
    let mut config = ReagvisConfig::default();
    config.pacing = PacingConfig::immediate();
    config.audit = AuditConfig {
        enabled: false,
        path: None,
    };
    config
}

/// Serves a server on an ephemeral port and returns its base URL.
async fn spawn_server(pipeline: AnalysisPipeline, audit: Arc<dyn AuditSink>) -> String {
    spawn_server_with(test_config(), pipeline, audit).await
}

/// Serves a server built from `config` and returns its base URL.
async fn spawn_server_with(
    config: ReagvisConfig,
    pipeline: AnalysisPipeline,
    audit: Arc<dyn AuditSink>,
) -> String {
    let server = ReagvisServer::with_parts(config, pipeline, audit).unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server.serve_on(listener));
    format!("http://{addr}")
}

/// Simulated-only pipeline with lower-bound scores.
fn simulated_pipeline() -> AnalysisPipeline {
    AnalysisPipeline::new(Arc::new(LowerBoundScores))
}

/// Pipeline with a fixed-score backend attached.
fn remote_pipeline(score: f64, fail_storage: bool) -> AnalysisPipeline {
    simulated_pipeline().with_backend(Arc::new(FixedBackend {
        score,
        fail_storage,
    }))
}

/// Posts a JSON body and returns the status and parsed reply.
async fn post_json(client: &reqwest::Client, url: &str, body: &Value) -> (u16, Value) {
    let response = client.post(url).json(body).send().await.unwrap();
    let status = response.status().as_u16();
    (status, response.json::<Value>().await.unwrap())
}

// ============================================================================
// SECTION: Analysis Tests
// ============================================================================

/// Verifies a simulated submission is recorded and counted.
#[tokio::test(flavor = "multi_thread")]
async fn simulated_analysis_is_recorded() {
    let base = spawn_server(simulated_pipeline(), Arc::new(RecordingSink::default())).await;
    let client = reqwest::Client::new();

    let (status, body) = post_json(
        &client,
        &format!("{base}/api/analysis"),
        &json!({ "toolType": "document", "filename": "sensex_budgetday.png" }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["result"]["id"], 1);
    assert_eq!(body["result"]["riskScore"], 40);
    assert_eq!(body["result"]["priority"], "MEDIUM");
    assert_eq!(body["result"]["decision"], "MANUAL_REVIEW");
    assert_eq!(body["stats"], json!({ "total": 125, "rejected": 12, "manual": 6, "approved": 107 }));
    assert_eq!(body["progress"][0], "Uploading and processing...");

    let listed: Value =
        client.get(format!("{base}/api/results")).send().await.unwrap().json().await.unwrap();
    assert_eq!(listed["results"].as_array().map(Vec::len), Some(1));
}

/// Verifies newest results are listed first with increasing ids.
#[tokio::test(flavor = "multi_thread")]
async fn results_are_listed_newest_first() {
    let base = spawn_server(simulated_pipeline(), Arc::new(RecordingSink::default())).await;
    let client = reqwest::Client::new();
    let url = format!("{base}/api/analysis");
    post_json(&client, &url, &json!({ "toolType": "propaganda", "filename": "gossamer_ledger.jpg" }))
        .await;
    post_json(
        &client,
        &url,
        &json!({ "toolType": "verification", "filename": "eiffel_night.jpg", "claimedLocation": "Paris" }),
    )
    .await;

    let listed: Value =
        client.get(format!("{base}/api/results")).send().await.unwrap().json().await.unwrap();
    assert_eq!(listed["results"][0]["id"], 2);
    assert_eq!(listed["results"][0]["decision"], "APPROVE");
    assert_eq!(listed["results"][1]["id"], 1);
    assert_eq!(listed["results"][1]["decision"], "REJECT");
    assert_eq!(listed["stats"], json!({ "total": 126, "rejected": 13, "manual": 5, "approved": 108 }));
}

/// Verifies image documents go through the backend and expose a preview.
#[tokio::test(flavor = "multi_thread")]
async fn remote_image_analysis_serves_preview() {
    let base = spawn_server(remote_pipeline(72.6, false), Arc::new(RecordingSink::default())).await;
    let client = reqwest::Client::new();

    let (status, body) = post_json(
        &client,
        &format!("{base}/api/analysis"),
        &json!({
            "toolType": "document",
            "filename": "invoice.png",
            "file": { "contentType": "image/png", "dataBase64": "iVBORw==" }
        }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["result"]["riskScore"], 73);
    assert_eq!(body["result"]["decision"], "REJECT");
    assert_eq!(body["result"]["attachment"]["sizeBytes"], 4);
    assert_eq!(body["result"]["previewUrl"], "/api/results/1/preview");
    assert_eq!(body["progress"].as_array().map(Vec::len), Some(5));

    let preview = client.get(format!("{base}/api/results/1/preview")).send().await.unwrap();
    assert_eq!(preview.status().as_u16(), 200);
    assert_eq!(
        preview.headers().get("content-type").and_then(|value| value.to_str().ok()),
        Some("image/png")
    );
    assert_eq!(preview.bytes().await.unwrap().as_ref(), &[0x89, 0x50, 0x4e, 0x47]);
}

/// Verifies a stage failure returns 502 and records nothing.
#[tokio::test(flavor = "multi_thread")]
async fn backend_failure_is_reported_by_stage() {
    let sink = Arc::new(RecordingSink::default());
    let base = spawn_server(remote_pipeline(10.0, true), sink.clone()).await;
    let client = reqwest::Client::new();

    let (status, body) = post_json(
        &client,
        &format!("{base}/api/analysis"),
        &json!({
            "toolType": "document",
            "file": { "contentType": "image/jpeg", "dataBase64": "AQID" }
        }),
    )
    .await;
    assert_eq!(status, 502);
    assert_eq!(body["error"]["stage"], "storage-upload");
    assert_eq!(
        body["progress"].as_array().and_then(|lines| lines.last()).cloned(),
        Some(Value::String(BackendStage::StorageUpload.user_message().to_string()))
    );

    let stats: Value =
        client.get(format!("{base}/api/stats")).send().await.unwrap().json().await.unwrap();
    assert_eq!(stats["total"], 124);
    assert_eq!(sink.events(), vec!["analysis_failed".to_string()]);
}

/// Verifies malformed submissions are rejected before analysis.
#[tokio::test(flavor = "multi_thread")]
async fn malformed_submission_is_bad_request() {
    let base = spawn_server(simulated_pipeline(), Arc::new(RecordingSink::default())).await;
    let client = reqwest::Client::new();
    let url = format!("{base}/api/analysis");

    let (status, body) = post_json(&client, &url, &json!({ "toolType": "deepfake" })).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "invalid_request");

    let (status, body) = post_json(
        &client,
        &url,
        &json!({ "toolType": "document", "file": { "dataBase64": "***" } }),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["message"], "file.dataBase64 is not valid base64");
}

// ============================================================================
// SECTION: Review Tests
// ============================================================================

/// Verifies decision overrides move counters and unknown ids are 404.
#[tokio::test(flavor = "multi_thread")]
async fn decision_override_moves_counters() {
    let sink = Arc::new(RecordingSink::default());
    let base = spawn_server(simulated_pipeline(), sink.clone()).await;
    let client = reqwest::Client::new();
    post_json(
        &client,
        &format!("{base}/api/analysis"),
        &json!({ "toolType": "document", "filename": "contract.pdf" }),
    )
    .await;

    let (status, body) = post_json(
        &client,
        &format!("{base}/api/results/1/decision"),
        &json!({ "decision": "APPROVE" }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["result"]["decision"], "APPROVE");
    assert_eq!(body["result"]["actionRequired"], Value::Null);
    assert_eq!(body["result"]["riskScore"], 40);
    assert_eq!(body["stats"], json!({ "total": 125, "rejected": 12, "manual": 5, "approved": 108 }));

    let (status, body) = post_json(
        &client,
        &format!("{base}/api/results/99/decision"),
        &json!({ "decision": "REJECT" }),
    )
    .await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], "not_found");

    let missing = client.get(format!("{base}/api/results/99")).send().await.unwrap();
    assert_eq!(missing.status().as_u16(), 404);
    assert_eq!(sink.events(), vec!["analysis_completed".to_string(), "decision_override".to_string()]);
}

/// Verifies non-image results have no preview.
#[tokio::test(flavor = "multi_thread")]
async fn preview_requires_image_upload() {
    let base = spawn_server(simulated_pipeline(), Arc::new(RecordingSink::default())).await;
    let client = reqwest::Client::new();
    post_json(
        &client,
        &format!("{base}/api/analysis"),
        &json!({
            "toolType": "fact-check",
            "filename": "memo.txt",
            "file": { "contentType": "text/plain", "dataBase64": "aGVsbG8=" }
        }),
    )
    .await;

    let result: Value =
        client.get(format!("{base}/api/results/1")).send().await.unwrap().json().await.unwrap();
    assert_eq!(result["previewUrl"], Value::Null);
    assert_eq!(result["attachment"]["contentType"], "text/plain");
    let preview = client.get(format!("{base}/api/results/1/preview")).send().await.unwrap();
    assert_eq!(preview.status().as_u16(), 404);
}

/// Verifies the export download carries the report and a filename.
#[tokio::test(flavor = "multi_thread")]
async fn export_downloads_report() {
    let sink = Arc::new(RecordingSink::default());
    let base = spawn_server(simulated_pipeline(), sink.clone()).await;
    let client = reqwest::Client::new();
    post_json(
        &client,
        &format!("{base}/api/analysis"),
        &json!({ "toolType": "propaganda", "filename": "gossamer_ledger.jpg" }),
    )
    .await;

    let response =
        client.get(format!("{base}/api/export?activeTool=propaganda")).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let disposition = response
        .headers()
        .get("content-disposition")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .unwrap();
    assert!(disposition.starts_with("attachment; filename=\"reagvis-labs-report-"));
    assert!(disposition.ends_with(".json\""));
    let report: Value = response.json().await.unwrap();
    assert_eq!(report["appName"], "Reagvis Labs Pvt. Ltd.");
    assert_eq!(report["activeTool"], "propaganda");
    assert_eq!(report["summary"], json!({ "total": 125, "rejected": 13, "manualReview": 5, "approved": 107 }));
    assert_eq!(report["results"].as_array().map(Vec::len), Some(1));
    assert_eq!(sink.events().last().map(String::as_str), Some("session_export"));
}

/// Verifies path and query rejections use the JSON error envelope.
#[tokio::test(flavor = "multi_thread")]
async fn extractor_rejections_use_error_envelope() {
    let base = spawn_server(simulated_pipeline(), Arc::new(RecordingSink::default())).await;
    let client = reqwest::Client::new();

    for url in [
        format!("{base}/api/export?activeTool=deepfake"),
        format!("{base}/api/results/abc"),
        format!("{base}/api/results/abc/preview"),
    ] {
        let response = client.get(&url).send().await.unwrap();
        assert_eq!(response.status().as_u16(), 400);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"]["code"], "invalid_request");
        assert!(body["error"]["message"].as_str().is_some_and(|message| !message.is_empty()));
    }

    let (status, body) = post_json(
        &client,
        &format!("{base}/api/results/abc/decision"),
        &json!({ "decision": "APPROVE" }),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "invalid_request");
}

// ============================================================================
// SECTION: Pacing Tests
// ============================================================================

/// Simulated latency used by the pacing tests.
const SIMULATED_LATENCY_MS: u64 = 1_500;
/// Minimum analysis duration used by the pacing tests.
const MIN_DELAY_MS: u64 = 300;

/// Serves a server with non-zero pacing.
async fn spawn_paced_server(pipeline: AnalysisPipeline) -> String {
    let mut config = test_config();
    config.pacing = PacingConfig {
        simulated_latency_ms: SIMULATED_LATENCY_MS,
        min_delay_ms: MIN_DELAY_MS,
    };
    spawn_server_with(config, pipeline, Arc::new(RecordingSink::default())).await
}

/// Posts an analysis body and returns the status and wall-clock duration.
async fn timed_analysis(base: &str, body: &Value) -> (u16, Duration) {
    let client = reqwest::Client::new();
    let started = Instant::now();
    let (status, _) = post_json(&client, &format!("{base}/api/analysis"), body).await;
    (status, started.elapsed())
}

/// Verifies simulated analyses wait for the simulated latency.
#[tokio::test(flavor = "multi_thread")]
async fn simulated_analysis_pays_simulated_latency() {
    let base = spawn_paced_server(simulated_pipeline()).await;
    let (status, elapsed) =
        timed_analysis(&base, &json!({ "toolType": "document", "filename": "lease.pdf" })).await;
    assert_eq!(status, 200);
    assert!(elapsed >= Duration::from_millis(SIMULATED_LATENCY_MS));
}

/// Verifies remote analyses skip the simulated latency but keep the minimum delay.
#[tokio::test(flavor = "multi_thread")]
async fn remote_analysis_keeps_only_minimum_delay() {
    let base = spawn_paced_server(remote_pipeline(20.0, false)).await;
    let (status, elapsed) = timed_analysis(
        &base,
        &json!({
            "toolType": "document",
            "file": { "contentType": "image/png", "dataBase64": "iVBORw==" }
        }),
    )
    .await;
    assert_eq!(status, 200);
    assert!(elapsed >= Duration::from_millis(MIN_DELAY_MS));
    assert!(elapsed < Duration::from_millis(SIMULATED_LATENCY_MS));
}

/// Verifies failed analyses still take the minimum delay.
#[tokio::test(flavor = "multi_thread")]
async fn failed_analysis_keeps_minimum_delay() {
    let base = spawn_paced_server(remote_pipeline(20.0, true)).await;
    let (status, elapsed) = timed_analysis(
        &base,
        &json!({
            "toolType": "document",
            "file": { "contentType": "image/png", "dataBase64": "iVBORw==" }
        }),
    )
    .await;
    assert_eq!(status, 502);
    assert!(elapsed >= Duration::from_millis(MIN_DELAY_MS));
    assert!(elapsed < Duration::from_millis(SIMULATED_LATENCY_MS));
}

// ============================================================================
// SECTION: Audit Tests
// ============================================================================

/// Verifies the file sink appends one JSON line per event without content.
#[tokio::test(flavor = "multi_thread")]
async fn file_audit_sink_writes_json_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.jsonl");
    let sink = Arc::new(FileAuditSink::new(&path).unwrap());
    let base = spawn_server(simulated_pipeline(), sink).await;
    let client = reqwest::Client::new();
    post_json(
        &client,
        &format!("{base}/api/analysis"),
        &json!({ "toolType": "document", "filename": "secret_plan.pdf", "content": "top secret words" }),
    )
    .await;

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    let started: Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(started["event"], "server_started");
    let analysis: Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(analysis["event"], "analysis_completed");
    assert_eq!(analysis["result_id"], 1);
    assert_eq!(analysis["path"], "simulated");
    assert!(!text.contains("top secret words"));
    assert!(!text.contains("secret_plan"));
}
