//! HTTP surface over the [`Pipeline`].

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::pipeline::{Analysis, Health, Pipeline, PipelineError};

/// Body of `/api/analyze` and `/api/compare`. A missing or null `query` is
/// treated as empty.
#[derive(Debug, Default, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: Option<String>,
}

impl From<JsonRejection> for PipelineError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl PipelineError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::EmptyQuery | Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::NoMatchingRows => StatusCode::NOT_FOUND,
            Self::DatasetUnavailable | Self::MissingColumn(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub fn router(pipeline: Arc<Pipeline>) -> Router {
    Router::new()
        .route("/api/analyze", post(analyze))
        .route("/api/analyze/", post(analyze))
        .route("/api/compare", post(compare))
        .route("/api/areas", get(areas))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(pipeline)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(pipeline: Arc<Pipeline>, addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, router(pipeline))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}

// ── Handlers ──

async fn analyze(
    State(pipeline): State<Arc<Pipeline>>,
    body: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<Analysis>, PipelineError> {
    let Json(req) = body?;
    let query = req.query.unwrap_or_default();
    Ok(Json(pipeline.analyze(&query).await?))
}

async fn compare(
    State(pipeline): State<Arc<Pipeline>>,
    body: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<Value>, PipelineError> {
    let Json(req) = body?;
    let query = req.query.unwrap_or_default();
    let series = pipeline.compare(&query)?;
    Ok(Json(json!({ "areas": series })))
}

async fn areas(State(pipeline): State<Arc<Pipeline>>) -> Result<Json<Value>, PipelineError> {
    Ok(Json(json!({ "areas": pipeline.areas()? })))
}

async fn health(State(pipeline): State<Arc<Pipeline>>) -> Json<Health> {
    Json(pipeline.health())
}
