//! `POST /blyss/setup` — atomically (re)configures the data-plane upstream
//! and perturbation magnitude.

use std::sync::Arc;

use axum::extract::State;
use sap_core::ProxyError;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::ProxyState;

#[derive(Deserialize)]
pub struct SetupRequest {
    pub upstream: String,
    #[serde(default)]
    pub beta: f32,
}

#[derive(Serialize)]
pub struct SetupResponse {
    pub ok: bool,
}

#[instrument(skip_all, name = "(setup)")]
pub async fn handle(
    State(state): State<Arc<ProxyState>>,
    axum::Json(req): axum::Json<SetupRequest>,
) -> Result<axum::Json<SetupResponse>, ProxyError> {
    if req.upstream.trim().is_empty() {
        return Err(ProxyError::invalid_record("`upstream` must not be empty"));
    }
    if !(req.beta.is_finite() && req.beta >= 0.0) {
        return Err(ProxyError::invalid_record("`beta` must be a non-negative finite number"));
    }

    info!(upstream = %req.upstream, beta = req.beta, "updating shared configuration");
    state.config.set_upstream_and_beta(req.upstream, req.beta);

    Ok(axum::Json(SetupResponse { ok: true }))
}
