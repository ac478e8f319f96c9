//! The vector record model shared by the query and upsert pipelines.
//!
//! A [`Record`] mirrors the shape of a single vector as it appears in both a
//! client request body and an upstream response body: an optional id, an
//! optional dense vector, free-form metadata, an opaque (unsupported) sparse
//! representation, and an optional score attached by the upstream search.

use base64::Engine as _;
use sap_crypto::{transform, Key, Nonce};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ProxyError;

const NONCE_META_KEY: &str = "nonce_b64";
const BETA_META_KEY: &str = "beta";

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Record {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    /// Present only to detect and reject sparse vectors; never transformed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sparse_values: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl Record {
    /// Borrow this record's dense vector, rejecting sparse or missing
    /// vectors up front.
    pub fn as_vector(&self) -> Result<&[f32], ProxyError> {
        if self.sparse_values.is_some() {
            return Err(ProxyError::unsupported_sparse());
        }
        self.values
            .as_deref()
            .ok_or_else(|| ProxyError::invalid_record("record is missing `values`"))
    }

    /// Encrypt this record's vector in place under `(key, nonce, beta)`, and
    /// embed `nonce_b64`/`beta` into its metadata so a later holder of `key`
    /// can invert the transform without any other shared state.
    pub fn apply_encrypt(
        &mut self,
        key: &Key,
        nonce: &Nonce,
        beta: f32,
    ) -> Result<(), ProxyError> {
        let plain = self.as_vector()?;
        let cipher = transform::encrypt(key, nonce, beta, plain);
        self.values = Some(cipher);

        let metadata = self.metadata.get_or_insert_with(Map::new);
        let nonce_b64 = base64::engine::general_purpose::STANDARD.encode(nonce.as_bytes());
        metadata.insert(NONCE_META_KEY.to_string(), Value::String(nonce_b64));
        metadata.insert(
            BETA_META_KEY.to_string(),
            serde_json::Number::from_f64(beta as f64)
                .map(Value::Number)
                .unwrap_or(Value::Null),
        );

        Ok(())
    }

    /// Decrypt this record's vector in place, reading `nonce_b64`/`beta`
    /// from its own metadata. Fails with
    /// [`ErrorKind::MissingParameters`](crate::error::ErrorKind::MissingParameters)
    /// if either is absent or malformed — this is never a whole-query
    /// failure; callers filter the offending match out instead.
    pub fn apply_decrypt(&mut self, key: &Key) -> Result<(), ProxyError> {
        let cipher = self.as_vector()?;

        let metadata = self
            .metadata
            .as_ref()
            .ok_or_else(|| ProxyError::missing_parameters("record has no metadata"))?;

        let nonce_b64 = metadata
            .get(NONCE_META_KEY)
            .and_then(Value::as_str)
            .ok_or_else(|| ProxyError::missing_parameters("metadata missing `nonce_b64`"))?;
        let nonce_bytes = base64::engine::general_purpose::STANDARD
            .decode(nonce_b64)
            .map_err(|e| ProxyError::missing_parameters(format!("invalid `nonce_b64`: {e}")))?;
        let nonce = Nonce::try_from(nonce_bytes.as_slice())
            .map_err(|e| ProxyError::missing_parameters(format!("invalid `nonce_b64`: {e}")))?;

        let beta = metadata
            .get(BETA_META_KEY)
            .and_then(Value::as_f64)
            .ok_or_else(|| ProxyError::missing_parameters("metadata missing `beta`"))?
            as f32;

        let plain = transform::decrypt(key, &nonce, beta, cipher);
        self.values = Some(plain);
        Ok(())
    }

    /// Euclidean distance between this record's vector and `query`,
    /// recorded into [`Record::score`] and returned.
    pub fn rescore(&mut self, query: &[f32]) -> Result<f32, ProxyError> {
        let values = self
            .values
            .as_deref()
            .ok_or_else(|| ProxyError::invalid_record("record is missing `values`"))?;
        if values.len() != query.len() {
            return Err(ProxyError::transform_error(format!(
                "dimension mismatch: record has {}, query has {}",
                values.len(),
                query.len()
            )));
        }
        let distance = transform::euclidean_distance(values, query);
        self.score = Some(distance);
        Ok(distance)
    }
}
