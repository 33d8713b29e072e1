//! HTTP surface: `GET /health` and `POST /score`.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use promptcoach_runtime::{CoachConfig, CoachError, PromptCoach};

#[derive(Debug, Deserialize)]
pub struct PromptIn {
    pub text: String,
}

/// Shared handler state.
///
/// A configuration failure at startup is kept and reported per request, so
/// `/health` stays reachable with a missing credential or a bad setting.
#[derive(Clone)]
pub struct AppState {
    coach: Result<Arc<PromptCoach>, String>,
}

impl AppState {
    pub fn new(coach: Result<PromptCoach, CoachError>) -> Self {
        Self {
            coach: coach.map(Arc::new).map_err(|e| e.to_string()),
        }
    }

    /// Build the coach from a possibly invalid configuration.
    pub fn from_config(config: Result<CoachConfig, CoachError>) -> Self {
        let coach = config.and_then(|c| PromptCoach::from_config(&c));
        if let Err(e) = &coach {
            tracing::warn!(error = %e, "coach not configured; /score will fail");
        }
        Self::new(coach)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/score", post(score))
        .with_state(state)
}

pub async fn run(
    addr: SocketAddr,
    config: Result<CoachConfig, CoachError>,
) -> anyhow::Result<()> {
    let state = AppState::from_config(config);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(%addr, "serving prompt coach");

    axum::serve(listener, router(state))
        .await
        .context("server error")?;
    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

async fn score(State(state): State<AppState>, Json(body): Json<PromptIn>) -> Response {
    let coach = match &state.coach {
        Ok(coach) => coach,
        Err(message) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, message),
    };

    match coach.evaluate(&body.text).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => {
            let status = if e.is_config() {
                StatusCode::INTERNAL_SERVER_ERROR
            } else {
                StatusCode::BAD_GATEWAY
            };
            error_response(status, &e.to_string())
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
