//! The proxy's error type and its mapping onto HTTP responses.
//!
//! Modeled on the `ApiError` / `ToHttpStatus` / `ErrorResponse` pattern used
//! across the Lexe API surface, simplified down to the handful of kinds this
//! service actually produces.

use axum::{response::IntoResponse, Json};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

/// The kinds of error this proxy can surface to a caller.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// `x-data-key` missing, not valid base64, or not 32 bytes.
    InvalidKey,
    /// A record is malformed: missing required fields, mismatched
    /// dimensions, or an invalid `/blyss/setup` body.
    InvalidRecord,
    /// A record carries `sparse_values`, which this proxy cannot transform.
    UnsupportedSparse,
    /// A returned match's metadata is missing `nonce_b64`/`beta` and cannot
    /// be decrypted. Callers of [`crate::record::Record::apply_decrypt`] see
    /// this as a plain `Result::Err`; the query pipeline catches it and
    /// drops the offending match rather than failing the whole request.
    MissingParameters,
    /// The upstream backend returned a non-2xx response.
    UpstreamError,
    /// An internal transform precondition failed (e.g. shape mismatch)
    /// outside of what [`InvalidRecord`](ErrorKind::InvalidRecord) already
    /// catches at the boundary.
    TransformError,
}

impl ErrorKind {
    pub fn to_http_status(self) -> StatusCode {
        match self {
            ErrorKind::InvalidKey => StatusCode::BAD_REQUEST,
            ErrorKind::InvalidRecord => StatusCode::BAD_REQUEST,
            ErrorKind::UnsupportedSparse => StatusCode::NOT_IMPLEMENTED,
            ErrorKind::MissingParameters => StatusCode::BAD_REQUEST,
            ErrorKind::UpstreamError => StatusCode::BAD_GATEWAY,
            ErrorKind::TransformError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// The proxy's top-level error type.
#[derive(Clone, Debug, Error)]
#[error("{kind:?}: {msg}")]
pub struct ProxyError {
    pub kind: ErrorKind,
    pub msg: String,
}

impl ProxyError {
    pub fn new(kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            msg: msg.into(),
        }
    }

    pub fn invalid_key(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidKey, msg)
    }

    pub fn invalid_record(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRecord, msg)
    }

    pub fn unsupported_sparse() -> Self {
        Self::new(ErrorKind::UnsupportedSparse, "sparse_values is not supported")
    }

    pub fn missing_parameters(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingParameters, msg)
    }

    pub fn upstream_error(status: StatusCode, msg: impl Into<String>) -> Self {
        let _ = status;
        Self::new(ErrorKind::UpstreamError, msg)
    }

    pub fn transform_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::TransformError, msg)
    }
}

/// The wire shape of an error response: `{ "code": u16, "msg": String }`.
#[derive(Serialize)]
struct ErrorResponse {
    code: u16,
    msg: String,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> axum::response::Response {
        let status = self.kind.to_http_status();
        if status.is_server_error() {
            error!(kind = ?self.kind, msg = %self.msg, "request failed");
        } else {
            warn!(kind = ?self.kind, msg = %self.msg, "request rejected");
        }

        let body = ErrorResponse {
            code: status.as_u16(),
            msg: self.msg,
        };
        (status, Json(body)).into_response()
    }
}
