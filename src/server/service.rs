//! HTTP service: `POST /analyze`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::types::{AnalyzeRequest, AnalyzeResponse};
use crate::{Analyzer, MoodlensError};

/// Build the router around a loaded analyzer.
pub fn router(analyzer: Analyzer) -> Router {
    Router::new()
        .route("/analyze", post(analyze))
        .with_state(analyzer)
}

/// Serve the router on an already-bound listener until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    analyzer: Analyzer,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, router(analyzer))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn analyze(
    State(analyzer): State<Analyzer>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    // Forward passes are CPU-bound; keep them off the async workers.
    let response = tokio::task::spawn_blocking(move || analyzer.analyze(&request.text))
        .await
        .map_err(|e| MoodlensError::Inference(format!("analysis task failed: {e}")))??;
    Ok(Json(response))
}

/// A failed analysis, rendered as `500 {"error": "..."}`.
#[derive(Debug)]
pub struct ApiError(pub MoodlensError);

impl From<MoodlensError> for ApiError {
    fn from(err: MoodlensError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(error = %self.0, "analyze failed");
        let body = serde_json::json!({ "error": self.0.to_string() });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
