//! Forwarding requests to an upstream backend, with the header scrubbing the
//! proxy runtime requires at every passthrough boundary.

use bytes::Bytes;
use http::{HeaderMap, HeaderName, Method, StatusCode};
use sap_core::ProxyError;
use tracing::warn;

use crate::key::X_DATA_KEY_HEADER;

/// Headers stripped before forwarding a request upstream: the secret key
/// must never leave this process, and `content-length`/`host` are
/// recomputed by the HTTP client for the new request.
const STRIPPED_REQUEST_HEADERS: &[&str] = &[X_DATA_KEY_HEADER, "content-length", "host"];

/// Hop-by-hop response headers that are meaningless once re-framed by the
/// proxy's own HTTP stack.
const STRIPPED_RESPONSE_HEADERS: &[&str] =
    &["connection", "transfer-encoding", "keep-alive", "upgrade"];

#[derive(Clone)]
pub struct Forwarder {
    client: reqwest::Client,
}

impl Default for Forwarder {
    fn default() -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("Failed to build reqwest Client");
        Self { client }
    }
}

pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Forwarder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward `method`/`headers`/`body` to `url`, stripping the headers
    /// that must never cross the proxy boundary and returning the upstream
    /// response's status, headers, and body verbatim.
    pub async fn forward(
        &self,
        method: Method,
        url: String,
        mut headers: HeaderMap,
        body: Bytes,
    ) -> Result<UpstreamResponse, ProxyError> {
        for name in STRIPPED_REQUEST_HEADERS {
            headers.remove(*name);
        }

        let response = self
            .client
            .request(method.clone(), &url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                warn!(%method, %url, error = %e, "upstream request failed");
                ProxyError::upstream_error(StatusCode::BAD_GATEWAY, format!("upstream request failed: {e}"))
            })?;

        let status = response.status();
        let mut resp_headers = response.headers().clone();
        for name in STRIPPED_RESPONSE_HEADERS {
            if let Ok(header_name) = HeaderName::try_from(*name) {
                resp_headers.remove(header_name);
            }
        }

        let body = response.bytes().await.map_err(|e| {
            ProxyError::upstream_error(
                StatusCode::BAD_GATEWAY,
                format!("failed to read upstream response body: {e}"),
            )
        })?;

        Ok(UpstreamResponse {
            status,
            headers: resp_headers,
            body,
        })
    }
}
