//! Health and metrics endpoints.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;

use crate::error::HttpError;
use crate::state::AppState;

pub async fn health() -> &'static str {
    "OK"
}

/// Prometheus text exposition.
pub async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse, HttpError> {
    let body = state
        .metrics
        .render()
        .map_err(|e| HttpError::Internal(format!("Failed to render metrics: {e}")))?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    ))
}
