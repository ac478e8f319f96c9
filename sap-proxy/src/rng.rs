//! Secure nonce generation.
//!
//! Distinct from the deterministic AES-CTR keystream in `sap-crypto`: a
//! fresh per-record nonce must be unpredictable, so it's drawn from a CSPRNG
//! rather than derived from anything the proxy already knows.

use ring::rand::{SecureRandom, SystemRandom};
use sap_core::ProxyError;
use sap_crypto::{Nonce, NONCE_LEN};

/// Generate a fresh, cryptographically random nonce.
pub fn fresh_nonce(rng: &SystemRandom) -> Result<Nonce, ProxyError> {
    let mut bytes = [0u8; NONCE_LEN];
    rng.fill(&mut bytes)
        .map_err(|_| ProxyError::transform_error("failed to generate a random nonce"))?;
    Ok(Nonce::from_bytes(bytes))
}
