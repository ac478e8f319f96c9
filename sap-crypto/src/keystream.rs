//! Deterministic keystream primitives built on AES-256 in counter mode.
//!
//! These are not an AEAD: the output is a pure function of `(key, nonce,
//! length)`, encrypting an all-zero plaintext. That determinism is the whole
//! point — the same `(key, nonce)` pair must reproduce the same permutation
//! and the same noise on decrypt as it did on encrypt, possibly on a
//! different machine entirely.

use aes::Aes256;
use ctr::cipher::{KeyIvInit, StreamCipher};
use thiserror::Error;

/// Length in bytes of a [`Key`].
pub const KEY_LEN: usize = 32;
/// Length in bytes of a [`Nonce`].
pub const NONCE_LEN: usize = 16;

type Aes256Ctr = ctr::Ctr128BE<Aes256>;

#[derive(Clone, Debug, Error)]
#[error("key must be exactly {KEY_LEN} bytes")]
pub struct InvalidKeyLen;

/// A 32-byte AES-256 key.
#[derive(Clone, PartialEq, Eq)]
pub struct Key([u8; KEY_LEN]);

impl Key {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }
}

impl std::fmt::Debug for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Key(..)")
    }
}

impl TryFrom<&[u8]> for Key {
    type Error = InvalidKeyLen;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; KEY_LEN] = bytes.try_into().map_err(|_| InvalidKeyLen)?;
        Ok(Self(arr))
    }
}

/// A 16-byte AES-CTR nonce (the CTR "counter block" seed).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Nonce([u8; NONCE_LEN]);

impl Nonce {
    pub const ZERO: Self = Self([0u8; NONCE_LEN]);

    pub fn from_bytes(bytes: [u8; NONCE_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; NONCE_LEN] {
        &self.0
    }
}

impl TryFrom<&[u8]> for Nonce {
    type Error = InvalidKeyLen;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; NONCE_LEN] = bytes.try_into().map_err(|_| InvalidKeyLen)?;
        Ok(Self(arr))
    }
}

/// Produce `len` bytes of AES-256-CTR keystream for `(key, nonce)`.
///
/// Equivalent to encrypting `len` zero bytes: the keystream is exactly the
/// ciphertext.
pub fn keystream_bytes(key: &Key, nonce: &Nonce, len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    let mut cipher = Aes256Ctr::new((&key.0).into(), (&nonce.0).into());
    cipher.apply_keystream(&mut buf);
    buf
}

/// Derive `count` independent uniform `f32` samples in `[0, 1]` from the
/// keystream, 4 bytes (one little-endian `u32`) per sample. Dividing by
/// `u32::MAX` (not `u32::MAX + 1`) matches the reference construction
/// exactly, including its slight bias toward `1.0`.
pub fn uniform_floats(key: &Key, nonce: &Nonce, count: usize) -> Vec<f32> {
    let bytes = keystream_bytes(key, nonce, count * 4);
    bytes
        .chunks_exact(4)
        .map(|chunk| {
            let word = u32::from_le_bytes(chunk.try_into().expect("chunk is 4 bytes"));
            (word as f64 / u32::MAX as f64) as f32
        })
        .collect()
}

/// Derive the deterministic Fisher-Yates permutation of `0..dim` for `key`.
///
/// The permutation nonce is fixed to all zeros: unlike per-record noise, the
/// dimension permutation must be the same for every record encrypted under a
/// given key, or matches from different records would live in incompatible
/// cipher spaces.
///
/// Swap indices are drawn from the keystream as 8-byte little-endian unsigned
/// integers, one per iteration `i` in `0..dim-1`, reduced mod `dim - i`
/// (*not* `dim - i + 1`): the last position is never re-swapped. This
/// asymmetry must be preserved exactly for cross-implementation agreement.
pub fn permutation(key: &Key, dim: usize) -> Vec<usize> {
    let mut perm: Vec<usize> = (0..dim).collect();
    if dim <= 1 {
        return perm;
    }

    let draws = dim - 1;
    let randoms = keystream_bytes(key, &Nonce::ZERO, draws * 8);
    for (i, chunk) in randoms.chunks_exact(8).enumerate() {
        let r = u64::from_le_bytes(chunk.try_into().expect("chunk is 8 bytes"));
        let remaining = (dim - i) as u64;
        let j = i + (r % remaining) as usize;
        perm.swap(i, j);
    }
    perm
}

/// Invert a permutation: `inverse[perm[i]] == i`.
pub fn invert_permutation(perm: &[usize]) -> Vec<usize> {
    let mut inverse = vec![0usize; perm.len()];
    for (i, &p) in perm.iter().enumerate() {
        inverse[p] = i;
    }
    inverse
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::*;

    fn key_strategy() -> impl Strategy<Value = Key> {
        proptest::collection::vec(any::<u8>(), KEY_LEN)
            .prop_map(|v| Key::try_from(v.as_slice()).unwrap())
    }

    fn nonce_strategy() -> impl Strategy<Value = Nonce> {
        proptest::collection::vec(any::<u8>(), NONCE_LEN)
            .prop_map(|v| Nonce::try_from(v.as_slice()).unwrap())
    }

    #[test]
    fn keystream_is_deterministic() {
        proptest!(|(key in key_strategy(), nonce in nonce_strategy())| {
            let a = keystream_bytes(&key, &nonce, 128);
            let b = keystream_bytes(&key, &nonce, 128);
            prop_assert_eq!(a, b);
        });
    }

    #[test]
    fn uniform_floats_are_in_unit_interval() {
        proptest!(|(key in key_strategy(), nonce in nonce_strategy())| {
            let samples = uniform_floats(&key, &nonce, 64);
            for s in samples {
                prop_assert!(s >= 0.0 && s <= 1.0);
            }
        });
    }

    #[test]
    fn permutation_is_a_bijection() {
        proptest!(|(key in key_strategy(), dim in 0usize..512)| {
            let perm = permutation(&key, dim);
            let mut seen = vec![false; dim];
            for &p in &perm {
                prop_assert!(p < dim);
                prop_assert!(!seen[p]);
                seen[p] = true;
            }
            prop_assert!(seen.into_iter().all(|s| s));
        });
    }

    #[test]
    fn permutation_is_deterministic() {
        proptest!(|(key in key_strategy(), dim in 1usize..256)| {
            let a = permutation(&key, dim);
            let b = permutation(&key, dim);
            prop_assert_eq!(a, b);
        });
    }

    #[test]
    fn permutation_roundtrips_through_its_inverse() {
        proptest!(|(key in key_strategy(), dim in 0usize..256)| {
            let perm = permutation(&key, dim);
            let inverse = invert_permutation(&perm);
            for i in 0..dim {
                prop_assert_eq!(inverse[perm[i]], i);
            }
        });
    }

    #[test]
    fn last_position_is_never_reswapped_by_construction() {
        // Regression test for the `D - i` (not `D - i + 1`) asymmetry: with
        // dim == 1 there are zero draws, and with larger dims the final
        // swap's `j` range excludes re-visiting index `dim - 1` as a `from`.
        let key = Key::from_bytes([7u8; KEY_LEN]);
        let perm = permutation(&key, 1);
        assert_eq!(perm, vec![0]);
    }
}
