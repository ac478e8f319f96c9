//! Parsing the client's secret key out of the `x-data-key` request header.

use base64::Engine as _;
use http::HeaderMap;
use sap_core::ProxyError;
use sap_crypto::Key;

pub const X_DATA_KEY_HEADER: &str = "x-data-key";

/// Extract and validate the 32-byte secret key from `x-data-key`.
///
/// The key is base64-encoded and never persisted; it exists only for the
/// duration of a single request.
pub fn extract_key(headers: &HeaderMap) -> Result<Key, ProxyError> {
    let value = headers
        .get(X_DATA_KEY_HEADER)
        .ok_or_else(|| ProxyError::invalid_key("missing `x-data-key` header"))?
        .to_str()
        .map_err(|_| ProxyError::invalid_key("`x-data-key` is not valid UTF-8"))?;

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(value)
        .map_err(|e| ProxyError::invalid_key(format!("`x-data-key` is not valid base64: {e}")))?;

    Key::try_from(bytes.as_slice())
        .map_err(|e| ProxyError::invalid_key(format!("`x-data-key` must be 32 bytes: {e}")))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rejects_missing_header() {
        let headers = HeaderMap::new();
        let err = extract_key(&headers).unwrap_err();
        assert_eq!(err.kind, sap_core::ErrorKind::InvalidKey);
    }

    #[test]
    fn rejects_wrong_length() {
        let mut headers = HeaderMap::new();
        let short_key_b64 = base64::engine::general_purpose::STANDARD.encode([0u8; 16]);
        headers.insert(X_DATA_KEY_HEADER, short_key_b64.parse().unwrap());
        let err = extract_key(&headers).unwrap_err();
        assert_eq!(err.kind, sap_core::ErrorKind::InvalidKey);
    }

    #[test]
    fn accepts_valid_key() {
        let mut headers = HeaderMap::new();
        let key_b64 = base64::engine::general_purpose::STANDARD.encode([7u8; 32]);
        headers.insert(X_DATA_KEY_HEADER, key_b64.parse().unwrap());
        extract_key(&headers).unwrap();
    }
}
