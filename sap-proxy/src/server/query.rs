//! `POST /query` — encrypts a plaintext query vector, overfetches from the
//! upstream to compensate for cipher-space search error, decrypts and
//! reranks the returned candidates, and truncates back to the caller's
//! requested `topK`.
//!
//! Queries that carry no `values` (pure id lookups) skip all of this and
//! pass straight through: there's no plaintext vector to rescore against.

use std::sync::Arc;

use axum::{extract::State, response::{IntoResponse as _, Response}, Json};
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use sap_core::{ProxyError, Record};
use serde::Serialize;
use serde_json::Value;
use tracing::{instrument, warn};

use super::{passthrough::into_axum_response, ProxyState, OVERFETCH_FACTOR};
use crate::{key::extract_key, rng::fresh_nonce};

/// Used when the caller doesn't specify `topK`.
const DEFAULT_TOP_K: u64 = 10;

#[derive(Serialize)]
struct QueryResponse {
    matches: Vec<Record>,
    /// The untruncated, pre-decryption upstream matches, exposed for
    /// callers that want to audit what cipher-space search actually
    /// returned.
    ciphermatches: Vec<Record>,
}

#[instrument(skip_all, name = "(query)")]
pub async fn handle(
    State(state): State<Arc<ProxyState>>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Result<Response, ProxyError> {
    let body_obj = body
        .as_object_mut()
        .ok_or_else(|| ProxyError::invalid_record("query body must be a JSON object"))?;

    let Some(values_val) = body_obj.remove("values") else {
        // id-passthrough: no plaintext vector means nothing to transform.
        let config = state.config.load();
        let url = format!("{}/query", config.upstream_url.trim_end_matches('/'));
        let body_bytes =
            Bytes::from(serde_json::to_vec(&body).expect("id-only query body always serializes"));
        let upstream = state
            .forwarder
            .forward(Method::POST, url, headers, body_bytes)
            .await?;
        return Ok(into_axum_response(upstream));
    };

    let query_vector: Vec<f32> = serde_json::from_value(values_val)
        .map_err(|e| ProxyError::invalid_record(format!("invalid `values`: {e}")))?;

    let key = extract_key(&headers)?;
    let config = state.config.load();
    let nonce = fresh_nonce(&state.rng)?;

    let cipher_vector = sap_crypto::transform::encrypt(&key, &nonce, config.beta, &query_vector);
    body_obj.insert("vector".to_string(), serde_json::to_value(&cipher_vector).unwrap());
    body_obj.insert("includeValues".to_string(), Value::Bool(true));
    body_obj.insert("includeMetadata".to_string(), Value::Bool(true));

    let original_top_k = body_obj
        .get("topK")
        .and_then(Value::as_u64)
        .unwrap_or(DEFAULT_TOP_K);
    let overfetch_top_k = original_top_k * OVERFETCH_FACTOR;
    body_obj.insert("topK".to_string(), Value::Number(overfetch_top_k.into()));

    let url = format!("{}/query", config.upstream_url.trim_end_matches('/'));
    let body_bytes =
        Bytes::from(serde_json::to_vec(&body).expect("rewritten query body always serializes"));

    let upstream = state
        .forwarder
        .forward(Method::POST, url, headers, body_bytes)
        .await?;

    if !upstream.status.is_success() {
        return Ok(into_axum_response(upstream));
    }

    #[derive(serde::Deserialize)]
    struct UpstreamQueryResponse {
        #[serde(default)]
        matches: Vec<Record>,
    }

    let upstream_parsed: UpstreamQueryResponse = serde_json::from_slice(&upstream.body)
        .map_err(|e| ProxyError::upstream_error(StatusCode::BAD_GATEWAY, format!("invalid upstream JSON: {e}")))?;

    let ciphermatches = upstream_parsed.matches.clone();

    let mut matches = Vec::with_capacity(upstream_parsed.matches.len());
    for mut record in upstream_parsed.matches {
        match record.apply_decrypt(&key) {
            Ok(()) => {
                if let Err(e) = record.rescore(&query_vector) {
                    warn!(id = ?record.id, error = %e, "dropping match: rescore failed");
                    continue;
                }
                matches.push(record);
            }
            Err(e) => {
                warn!(id = ?record.id, error = %e, "dropping match: missing decrypt parameters");
            }
        }
    }

    matches.sort_by(|a, b| {
        a.score
            .partial_cmp(&b.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    matches.truncate(original_top_k as usize);

    Ok(Json(QueryResponse {
        matches,
        ciphermatches,
    })
    .into_response())
}
