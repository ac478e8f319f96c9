//! Transparent fallback: any path not matched by `/blyss/setup`, `/query`,
//! or `/vectors/upsert` is forwarded as-is. `/databases*` is routed to the
//! control-plane URL; everything else goes to the data-plane upstream.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    response::{IntoResponse, Response},
};
use http::Request;
use sap_core::ProxyError;
use tracing::instrument;

use super::ProxyState;
use crate::forward::UpstreamResponse;

#[instrument(skip_all, name = "(passthrough)")]
pub async fn handle(
    State(state): State<Arc<ProxyState>>,
    req: Request<Body>,
) -> Result<Response, ProxyError> {
    let (parts, body) = req.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(|e| ProxyError::invalid_record(format!("failed to read request body: {e}")))?;

    let config = state.config.load();
    let path = parts.uri.path();
    let base_url = if path.trim_start_matches('/').starts_with("databases") {
        &config.control_plane_url
    } else {
        &config.upstream_url
    };

    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or(path);
    let target_url = format!("{}{}", base_url.trim_end_matches('/'), path_and_query);

    let upstream = state
        .forwarder
        .forward(parts.method, target_url, parts.headers, body_bytes)
        .await?;

    Ok(into_axum_response(upstream))
}

pub(super) fn into_axum_response(upstream: UpstreamResponse) -> Response {
    let mut builder = axum::http::Response::builder().status(upstream.status);
    if let Some(headers) = builder.headers_mut() {
        *headers = upstream.headers;
    }
    builder
        .body(Body::from(upstream.body))
        .expect("status/headers copied from a well-formed upstream response")
        .into_response()
}
