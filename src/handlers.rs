use axum::{
    Form, Json,
    extract::State,
    http::StatusCode,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::error::CryptogramError;
use crate::key_manager::encrypt_for;
use crate::models::{CryptogramRequest, ErrorResponse, StatsResponse};

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Shared by every handler of the stub server.
pub struct ServerState {
    message: String,
    started: Instant,
    issued: AtomicU64,
}

impl ServerState {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            started: Instant::now(),
            issued: AtomicU64::new(0),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub async fn root() -> &'static str {
    "Cryptogram Demo Server\n\nEndpoints:\n- POST /cryptogram: form field `pubkey` (PEM), returns a base64 PKCS#1 v1.5 cryptogram\n- GET /stats: Get service statistics"
}

// Encrypt the configured message for the posted public key
pub async fn issue_cryptogram(
    State(state): State<Arc<ServerState>>,
    Form(request): Form<CryptogramRequest>,
) -> Result<String, ApiError> {
    let start = Instant::now();

    let cryptogram = encrypt_for(&request.pubkey, &state.message).map_err(|e| {
        let status = match e {
            CryptogramError::InvalidPublicKey(_) => StatusCode::BAD_REQUEST,
            CryptogramError::TooLarge(_, _) => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::warn!(%status, "rejected cryptogram request: {}", e);

        (
            status,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })?;

    state.issued.fetch_add(1, Ordering::Relaxed);
    tracing::info!(elapsed = ?start.elapsed(), "issued cryptogram");

    Ok(cryptogram)
}

// Service health check and statistics
pub async fn get_stats(State(state): State<Arc<ServerState>>) -> Json<StatsResponse> {
    Json(StatsResponse {
        status: "healthy".to_string(),
        uptime_seconds: state.started.elapsed().as_secs(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cryptograms_issued: state.issued.load(Ordering::Relaxed),
    })
}
