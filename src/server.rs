//! HTTP server for the repo agent.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/repos/{repo_id}/agent/chat` | Run one chat turn; returns the full thread |
//! | `GET`  | `/repos/{repo_id}/agent/threads/{thread_id}` | Replay a thread |
//! | `POST` | `/repos/{repo_id}/index` | Index content into the repo |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "repo not found: 42" } }
//! ```
//!
//! | Code | Status | Cause |
//! |------|--------|-------|
//! | `bad_request` | 400 | malformed JSON or failed validation (adds `details`) |
//! | `not_found` | 404 | unknown repo or thread |
//! | `agent_disabled` | 403 | agent turned off for the repo |
//! | `provider_unimplemented` | 501 | selected provider cannot answer yet |
//! | `internal` | 500 | storage or generation failure |
//!
//! Storage failures during indexing are reported with a fixed message;
//! the detail only goes to the log.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use repo_agent_core::error::{ChatError, IndexError};
use repo_agent_core::provider::ProviderError;
use repo_agent_core::store::Store;

use crate::chat::{chat, get_thread, ChatRequest, ChatResponse};
use crate::config::Config;
use crate::db;
use crate::ingest::{index_content, IndexRequest};
use crate::sqlite_store::SqliteStore;
use crate::validate::ValidationError;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn Store>,
}

/// Starts the HTTP server against the configured SQLite database.
///
/// Binds to `[server].bind` and runs until the process is terminated.
/// The schema must already exist (`repo-agent init`).
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let pool = db::connect(config).await?;
    let store: Arc<dyn Store> = Arc::new(SqliteStore::new(pool));

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!(bind = %listener.local_addr()?, "repo agent listening");

    axum::serve(listener, router(Arc::new(config.clone()), store)).await?;
    Ok(())
}

/// Build the application router over any [`Store`].
pub fn router(config: Arc<Config>, store: Arc<dyn Store>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/repos/{repo_id}/agent/chat", post(handle_chat))
        .route(
            "/repos/{repo_id}/agent/threads/{thread_id}",
            get(handle_get_thread),
        )
        .route("/repos/{repo_id}/index", post(handle_index))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(AppState { config, store })
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<ValidationError>,
}

/// Error type that converts into an Axum HTTP response.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
    details: Option<ValidationError>,
}

impl AppError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
                details: self.details,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError::new(StatusCode::BAD_REQUEST, "bad_request", message)
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError::new(StatusCode::NOT_FOUND, "not_found", message)
}

fn internal(message: impl Into<String>) -> AppError {
    AppError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        let mut e = bad_request("Invalid input");
        e.details = Some(err);
        e
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        bad_request(format!("Invalid input: {}", rejection.body_text()))
    }
}

impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::RepoNotFound(_) => not_found("Repo not found"),
            ChatError::AgentDisabled(_) => AppError::new(
                StatusCode::FORBIDDEN,
                "agent_disabled",
                "Agent disabled for this repo",
            ),
            ChatError::Provider(e @ ProviderError::Unimplemented { .. }) => {
                AppError::new(StatusCode::NOT_IMPLEMENTED, "provider_unimplemented", e.to_string())
            }
            ChatError::Provider(e @ ProviderError::Generation(_)) => internal(e.to_string()),
            ChatError::Store(e) => {
                error!(error = %e, "chat storage failure");
                internal("Failed to process chat message")
            }
        }
    }
}

impl From<IndexError> for AppError {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::RepoNotFound(_) => not_found("Repo not found"),
            IndexError::Store(e) => {
                error!(error = %e, "indexing failure");
                internal("Failed to index content")
            }
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============ POST /repos/{repo_id}/agent/chat ============

async fn handle_chat(
    State(state): State<AppState>,
    Path(repo_id): Path<String>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(request) = body?;
    request.validate()?;

    let response = chat(state.store.as_ref(), &state.config, &repo_id, &request).await?;
    Ok(Json(response))
}

// ============ GET /repos/{repo_id}/agent/threads/{thread_id} ============

async fn handle_get_thread(
    State(state): State<AppState>,
    Path((repo_id, thread_id)): Path<(String, String)>,
) -> Result<Json<ChatResponse>, AppError> {
    let thread = get_thread(state.store.as_ref(), &repo_id, &thread_id)
        .await
        .map_err(|e| {
            error!(error = %e, "thread lookup failure");
            internal("Failed to load thread")
        })?;

    thread
        .map(Json)
        .ok_or_else(|| not_found("Thread not found"))
}

// ============ POST /repos/{repo_id}/index ============

#[derive(Serialize)]
struct IndexResponse {
    success: bool,
    message: &'static str,
    chunks: usize,
}

async fn handle_index(
    State(state): State<AppState>,
    Path(repo_id): Path<String>,
    body: Result<Json<IndexRequest>, JsonRejection>,
) -> Result<Json<IndexResponse>, AppError> {
    let Json(request) = body?;
    request.validate()?;

    let report = index_content(state.store.as_ref(), &state.config, &repo_id, &request).await?;

    Ok(Json(IndexResponse {
        success: true,
        message: "Content indexed successfully",
        chunks: report.chunks,
    }))
}
