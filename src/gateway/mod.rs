/// HTTP front door for the bot.
///
/// Exposes the LINE webhook receiver and a health probe. The webhook handler
/// only deals with HTTP concerns (size limit, header extraction, status
/// mapping); everything else happens in [`Dispatcher`].
use std::sync::Arc;

use anyhow::Result;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::dispatch::{Dispatcher, InboundPayload};
use crate::errors::ShopcrabError;
use crate::line::SIGNATURE_HEADER;

/// Max webhook payload size: 1 MB.
pub const WEBHOOK_MAX_BODY: usize = 1_048_576;

pub const HEALTH_PATH: &str = "/api/health";

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct GatewayState {
    dispatcher: Arc<Dispatcher>,
}

impl GatewayState {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }
}

/// Build the HTTP router with the webhook mounted at `webhook_path`.
pub fn build_router(state: GatewayState, webhook_path: &str) -> Router {
    Router::new()
        .route(webhook_path, post(webhook_handler))
        .route(HEALTH_PATH, get(health_handler))
        .with_state(state)
}

/// GET /api/health: liveness probe.
async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION
    }))
}

/// POST {webhook_path}: receive a LINE webhook call.
///
/// 200 once the call is authenticated and decoded, regardless of how the
/// individual events fared; LINE does not retry on per-event failures.
async fn webhook_handler(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let request_id = format!("webhook-{}", Uuid::new_v4());

    if body.len() > WEBHOOK_MAX_BODY {
        warn!("{}: payload too large ({} bytes)", request_id, body.len());
        return StatusCode::PAYLOAD_TOO_LARGE;
    }

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    let payload = InboundPayload {
        body: &body,
        signature,
    };
    match state.dispatcher.dispatch(&request_id, payload).await {
        Ok(_) => StatusCode::OK,
        Err(e) => status_for(&request_id, &e),
    }
}

fn status_for(request_id: &str, err: &ShopcrabError) -> StatusCode {
    match err {
        ShopcrabError::Authentication(msg) => {
            warn!("{}: rejected: {}", request_id, msg);
            StatusCode::BAD_REQUEST
        }
        ShopcrabError::Decode(msg) => {
            warn!("{}: undecodable payload: {}", request_id, msg);
            StatusCode::BAD_REQUEST
        }
        other => {
            error!("{}: dispatch failed: {}", request_id, other);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Bind the listener and serve in a background task.
pub async fn start(
    host: &str,
    port: u16,
    webhook_path: &str,
    dispatcher: Arc<Dispatcher>,
) -> Result<tokio::task::JoinHandle<()>> {
    let app = build_router(GatewayState::new(dispatcher), webhook_path);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("webhook listening on http://{}{}", addr, webhook_path);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("HTTP server error: {}", e);
        }
    });

    Ok(handle)
}
