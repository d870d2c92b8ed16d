// crates/reagvis-server/src/server.rs
// ============================================================================
// Module: Reagvis HTTP Server
// Description: axum routes for analysis, review, and export.
// Purpose: Serve the review desk over HTTP with pacing and audit logging.
// Dependencies: reagvis-core, reagvis-config, reagvis-backend, axum, tokio
// ============================================================================

//! ## Overview
//! Routes:
//! - `POST /api/analysis` runs one submission and records it.
//! - `GET /api/results`, `GET /api/results/{id}`, and
//!   `GET /api/results/{id}/preview` read the session.
//! - `POST /api/results/{id}/decision` applies an analyst override.
//! - `GET /api/stats` returns the KPI counters.
//! - `GET /api/export` downloads the session report.
//!
//! The ledger sits behind a synchronous mutex that is never held across an
//! await point.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Duration;
use std::time::Instant;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::DefaultBodyLimit;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::extract::rejection::PathRejection;
use axum::extract::rejection::QueryRejection;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::http::header::CONTENT_DISPOSITION;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use reagvis_backend::HttpBackendConfig;
use reagvis_backend::HttpIntegrityBackend;
use reagvis_config::PacingConfig;
use reagvis_config::ReagvisConfig;
use reagvis_core::AnalysisPipeline;
use reagvis_core::Attachment;
use reagvis_core::Ledger;
use reagvis_core::LedgerError;
use reagvis_core::ResultId;
use reagvis_core::ScoreSource;
use reagvis_core::SeededScores;
use reagvis_core::ToolType;
use thiserror::Error;
use time::OffsetDateTime;

use crate::api::AnalysisFailureResponse;
use crate::api::AnalysisResponse;
use crate::api::AnalysisSubmission;
use crate::api::DecisionResponse;
use crate::api::DecisionSubmission;
use crate::api::ErrorResponse;
use crate::api::ExportQuery;
use crate::api::ResultsResponse;
use crate::api::StageErrorBody;
use crate::audit::AnalysisAuditEvent;
use crate::audit::AnalysisAuditParams;
use crate::audit::AuditSink;
use crate::audit::DecisionAuditEvent;
use crate::audit::ExportAuditEvent;
use crate::audit::LifecycleAuditEvent;
use crate::audit::audit_sink_from_config;

// ============================================================================
// SECTION: Server
// ============================================================================

/// Review desk server instance.
pub struct ReagvisServer {
    /// Validated configuration.
    config: ReagvisConfig,
    /// Shared handler state.
    state: Arc<ServerState>,
}

impl ReagvisServer {
    /// Builds a server from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when configuration is invalid or the backend,
    /// ledger, or audit sink cannot be initialized.
    pub fn from_config(config: ReagvisConfig) -> Result<Self, ServerError> {
        config.validate().map_err(|err| ServerError::Config(err.to_string()))?;
        let scores: Arc<dyn ScoreSource> = Arc::new(
            config.scoring.seed.map_or_else(SeededScores::from_entropy, SeededScores::from_seed),
        );
        let mut pipeline = AnalysisPipeline::new(scores);
        if config.backend.enabled {
            let backend = HttpIntegrityBackend::new(HttpBackendConfig {
                api_base_url: config.backend.api_base_url.clone(),
                bucket: config.backend.bucket.clone(),
                allow_http: config.backend.allow_http,
                timeout_ms: config.backend.timeout_ms,
                max_response_bytes: config.backend.max_response_bytes,
                user_agent: config.backend.user_agent.clone(),
            })
            .map_err(|err| ServerError::Init(err.to_string()))?;
            pipeline = pipeline.with_backend(Arc::new(backend));
        }
        let audit =
            audit_sink_from_config(&config.audit).map_err(|err| ServerError::Init(err.to_string()))?;
        Self::with_parts(config, pipeline, audit)
    }

    /// Builds a server from configuration with an explicit pipeline and sink.
    ///
    /// Backend and scoring settings in `config` are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when configuration is invalid or the ledger
    /// baseline is unbalanced.
    pub fn with_parts(
        config: ReagvisConfig,
        pipeline: AnalysisPipeline,
        audit: Arc<dyn AuditSink>,
    ) -> Result<Self, ServerError> {
        config.validate().map_err(|err| ServerError::Config(err.to_string()))?;
        let ledger =
            Ledger::new(config.ledger_config()).map_err(|err| ServerError::Init(err.to_string()))?;
        let state = Arc::new(ServerState {
            ledger: Mutex::new(ledger),
            pipeline,
            pacing: config.pacing,
            max_file_bytes: config.server.max_body_bytes,
            audit,
        });
        Ok(Self {
            config,
            state,
        })
    }

    /// Returns the axum router for this server.
    #[must_use]
    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/analysis", post(handle_analysis))
            .route("/api/results", get(handle_list_results))
            .route("/api/results/{id}", get(handle_get_result))
            .route("/api/results/{id}/preview", get(handle_preview))
            .route("/api/results/{id}/decision", post(handle_decision))
            .route("/api/stats", get(handle_stats))
            .route("/api/export", get(handle_export))
            .layer(DefaultBodyLimit::max(self.config.server.max_body_bytes))
            .with_state(Arc::clone(&self.state))
    }

    /// Binds the configured address and serves requests.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), ServerError> {
        let addr = self.config.server.bind_addr().map_err(|err| ServerError::Config(err.to_string()))?;
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|_| ServerError::Transport("http bind failed".to_string()))?;
        self.serve_on(listener).await
    }

    /// Serves requests on an already bound listener.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when serving fails.
    pub async fn serve_on(self, listener: tokio::net::TcpListener) -> Result<(), ServerError> {
        let bound = listener
            .local_addr()
            .map_or_else(|_| self.config.server.bind.clone(), |addr| addr.to_string());
        self.state.audit.record_lifecycle(&LifecycleAuditEvent::started(
            bound,
            self.state.pipeline.has_backend(),
            self.config.scoring.seed.is_some(),
        ));
        let app = self.router();
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .map_err(|_| ServerError::Transport("http server failed".to_string()))
    }
}

/// Shared server state for route handlers.
struct ServerState {
    /// Review session.
    ledger: Mutex<Ledger>,
    /// Analysis pipeline.
    pipeline: AnalysisPipeline,
    /// Perceived-latency pacing.
    pacing: PacingConfig,
    /// Maximum decoded file size.
    max_file_bytes: usize,
    /// Audit sink.
    audit: Arc<dyn AuditSink>,
}

impl ServerState {
    /// Locks the ledger or produces a 500 response.
    fn ledger(&self) -> Result<MutexGuard<'_, Ledger>, Response> {
        self.ledger
            .lock()
            .map_err(|_| error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal", "ledger unavailable"))
    }
}

// ============================================================================
// SECTION: Analysis Handler
// ============================================================================

/// Runs one submission through the pipeline and records the result.
async fn handle_analysis(State(state): State<Arc<ServerState>>, body: Bytes) -> Response {
    let started = Instant::now();
    let submission: AnalysisSubmission = match serde_json::from_slice(&body) {
        Ok(submission) => submission,
        Err(err) => return invalid_request(err.to_string()),
    };
    let request = match submission.into_request(state.max_file_bytes) {
        Ok(request) => request,
        Err(message) => return invalid_request(message),
    };
    let tool = request.tool_type;
    let attachment = request.attachment.as_ref().map(Attachment::summary);
    let now = OffsetDateTime::now_utc();

    let pipeline = state.pipeline.clone();
    let joined = tokio::task::spawn_blocking(move || {
        let run = pipeline.run(&request, now);
        (request, run)
    })
    .await;
    let (request, run) = match joined {
        Ok(joined) => joined,
        Err(_) => {
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal", "analysis task failed");
        }
    };

    match run {
        Ok(outcome) => {
            if outcome.path.is_simulated() {
                pause(state.pacing.simulated_latency_ms).await;
            }
            enforce_min_delay(started, state.pacing.min_delay_ms).await;
            let recorded = {
                let mut ledger = match state.ledger() {
                    Ok(ledger) => ledger,
                    Err(response) => return response,
                };
                ledger
                    .record(outcome.assessment, request.attachment.as_ref(), now)
                    .map(|result| (result, ledger.stats()))
            };
            let (result, stats) = match recorded {
                Ok(recorded) => recorded,
                Err(err) => return ledger_error_response(&err),
            };
            state.audit.record_analysis(&AnalysisAuditEvent::completed(AnalysisAuditParams {
                tool,
                path: Some(outcome.path.as_str()),
                result_id: Some(result.id.get()),
                decision: Some(result.decision()),
                risk_score: Some(result.assessment.risk_score.value()),
                stage: None,
                attachment_sha256: attachment.as_ref().map(|summary| summary.sha256.clone()),
                attachment_bytes: attachment.as_ref().map(|summary| summary.size_bytes),
                duration_ms: started.elapsed().as_millis(),
            }));
            (StatusCode::OK, Json(AnalysisResponse {
                result,
                stats,
                progress: outcome.progress,
            }))
                .into_response()
        }
        Err(failure) => {
            enforce_min_delay(started, state.pacing.min_delay_ms).await;
            state.audit.record_analysis(&AnalysisAuditEvent::failed(AnalysisAuditParams {
                tool,
                path: None,
                result_id: None,
                decision: None,
                risk_score: None,
                stage: Some(failure.stage().as_str()),
                attachment_sha256: attachment.as_ref().map(|summary| summary.sha256.clone()),
                attachment_bytes: attachment.as_ref().map(|summary| summary.size_bytes),
                duration_ms: started.elapsed().as_millis(),
            }));
            (StatusCode::BAD_GATEWAY, Json(AnalysisFailureResponse {
                error: StageErrorBody {
                    stage: failure.stage().as_str(),
                    message: failure.user_message(),
                },
                progress: failure.progress,
            }))
                .into_response()
        }
    }
}

// ============================================================================
// SECTION: Review Handlers
// ============================================================================

/// Lists retained results, newest first.
async fn handle_list_results(State(state): State<Arc<ServerState>>) -> Response {
    let ledger = match state.ledger() {
        Ok(ledger) => ledger,
        Err(response) => return response,
    };
    let body = ResultsResponse {
        results: ledger.results().cloned().collect(),
        stats: ledger.stats(),
    };
    drop(ledger);
    (StatusCode::OK, Json(body)).into_response()
}

/// Returns one retained result.
async fn handle_get_result(
    State(state): State<Arc<ServerState>>,
    id: Result<Path<u64>, PathRejection>,
) -> Response {
    let id = match id {
        Ok(Path(id)) => id,
        Err(rejection) => return invalid_request(rejection.body_text()),
    };
    let ledger = match state.ledger() {
        Ok(ledger) => ledger,
        Err(response) => return response,
    };
    let found = ledger.get(ResultId::new(id)).cloned();
    drop(ledger);
    match found {
        Some(result) => (StatusCode::OK, Json(result)).into_response(),
        None => not_found(id),
    }
}

/// Returns the stored image bytes of a result.
async fn handle_preview(
    State(state): State<Arc<ServerState>>,
    id: Result<Path<u64>, PathRejection>,
) -> Response {
    let id = match id {
        Ok(Path(id)) => id,
        Err(rejection) => return invalid_request(rejection.body_text()),
    };
    let ledger = match state.ledger() {
        Ok(ledger) => ledger,
        Err(response) => return response,
    };
    let preview = ledger.preview(ResultId::new(id)).cloned();
    drop(ledger);
    let Some(image) = preview else {
        return not_found(id);
    };
    let content_type = HeaderValue::from_str(image.effective_content_type())
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    (StatusCode::OK, [(CONTENT_TYPE, content_type)], image.bytes).into_response()
}

/// Applies an analyst decision override.
async fn handle_decision(
    State(state): State<Arc<ServerState>>,
    id: Result<Path<u64>, PathRejection>,
    body: Bytes,
) -> Response {
    let id = match id {
        Ok(Path(id)) => id,
        Err(rejection) => return invalid_request(rejection.body_text()),
    };
    let submission: DecisionSubmission = match serde_json::from_slice(&body) {
        Ok(submission) => submission,
        Err(err) => return invalid_request(err.to_string()),
    };
    let updated = {
        let mut ledger = match state.ledger() {
            Ok(ledger) => ledger,
            Err(response) => return response,
        };
        ledger
            .update_decision(ResultId::new(id), submission.decision)
            .map(|(result, change)| (result, change, ledger.stats()))
    };
    match updated {
        Ok((result, change, stats)) => {
            state.audit.record_decision(&DecisionAuditEvent::new(
                id,
                change.previous,
                change.current,
            ));
            (StatusCode::OK, Json(DecisionResponse {
                result,
                stats,
            }))
                .into_response()
        }
        Err(err) => ledger_error_response(&err),
    }
}

/// Returns the KPI counters.
async fn handle_stats(State(state): State<Arc<ServerState>>) -> Response {
    match state.ledger() {
        Ok(ledger) => {
            let stats = ledger.stats();
            drop(ledger);
            (StatusCode::OK, Json(stats)).into_response()
        }
        Err(response) => response,
    }
}

/// Downloads the session report.
async fn handle_export(
    State(state): State<Arc<ServerState>>,
    query: Result<Query<ExportQuery>, QueryRejection>,
) -> Response {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return invalid_request(rejection.body_text()),
    };
    let active_tool = query.active_tool.unwrap_or(ToolType::Document);
    let report = match state.ledger() {
        Ok(ledger) => ledger.export(active_tool, OffsetDateTime::now_utc()),
        Err(response) => return response,
    };
    let file_name = report.file_name();
    state.audit.record_export(&ExportAuditEvent::new(
        active_tool,
        report.results.len(),
        file_name.clone(),
    ));
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{file_name}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    (StatusCode::OK, [(CONTENT_DISPOSITION, disposition)], Json(report)).into_response()
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Sleeps for `millis` milliseconds when non-zero.
async fn pause(millis: u64) {
    if millis > 0 {
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }
}

/// Sleeps until at least `min_ms` milliseconds have passed since `started`.
async fn enforce_min_delay(started: Instant, min_ms: u64) {
    let minimum = Duration::from_millis(min_ms);
    if let Some(remaining) = minimum.checked_sub(started.elapsed())
        && !remaining.is_zero()
    {
        tokio::time::sleep(remaining).await;
    }
}

/// Builds a JSON error response.
fn error_response(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse::new(code, message))).into_response()
}

/// Builds a 400 for input rejected before reaching a handler body.
fn invalid_request(message: impl Into<String>) -> Response {
    error_response(StatusCode::BAD_REQUEST, "invalid_request", message)
}

/// Builds a 404 for an unknown result id.
fn not_found(id: u64) -> Response {
    error_response(StatusCode::NOT_FOUND, "not_found", format!("unknown result id: {id}"))
}

/// Maps ledger failures to HTTP responses.
fn ledger_error_response(err: &LedgerError) -> Response {
    match err {
        LedgerError::UnknownResult(id) => not_found(id.get()),
        LedgerError::Stats(_) => error_response(StatusCode::CONFLICT, "counter_conflict", err.to_string()),
        LedgerError::UnbalancedBaseline => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal", err.to_string())
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Server initialization and transport errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}
