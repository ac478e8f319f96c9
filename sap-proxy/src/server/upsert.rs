//! `POST /vectors/upsert` — encrypts each vector with a fresh nonce and the
//! current global beta, embeds the nonce/beta into its metadata so it can
//! later be decrypted standalone, and forwards the rewritten body upstream.

use std::sync::Arc;

use axum::{
    extract::State,
    response::Response,
    Json,
};
use bytes::Bytes;
use http::{HeaderMap, Method};
use sap_core::{ProxyError, Record};
use serde_json::Value;
use tracing::instrument;

use super::{passthrough::into_axum_response, ProxyState};
use crate::{key::extract_key, rng::fresh_nonce};

#[instrument(skip_all, name = "(upsert)")]
pub async fn handle(
    State(state): State<Arc<ProxyState>>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Result<Response, ProxyError> {
    let key = extract_key(&headers)?;
    let config = state.config.load();

    let body_obj = body
        .as_object_mut()
        .ok_or_else(|| ProxyError::invalid_record("upsert body must be a JSON object"))?;

    let vectors_val = body_obj
        .remove("vectors")
        .ok_or_else(|| ProxyError::invalid_record("missing `vectors`"))?;
    let mut vectors: Vec<Record> = serde_json::from_value(vectors_val)
        .map_err(|e| ProxyError::invalid_record(format!("invalid `vectors`: {e}")))?;

    for record in &mut vectors {
        let nonce = fresh_nonce(&state.rng)?;
        record.apply_encrypt(&key, &nonce, config.beta)?;
    }

    body_obj.insert(
        "vectors".to_string(),
        serde_json::to_value(&vectors).expect("Record always serializes"),
    );

    let url = format!("{}/vectors/upsert", config.upstream_url.trim_end_matches('/'));
    let body_bytes = Bytes::from(
        serde_json::to_vec(&body).expect("rewritten upsert body always serializes"),
    );

    let upstream = state
        .forwarder
        .forward(Method::POST, url, headers, body_bytes)
        .await?;

    Ok(into_axum_response(upstream))
}
