//! Shuffle-And-Perturb (SAP): a deterministic, keyed vector transform.
//!
//! This crate contains only the cryptographic core: an AES-256-CTR
//! keystream and the permute-then-perturb transform built on it. It has no
//! knowledge of HTTP, JSON, or the record/metadata model layered on top by
//! `sap-core`.

pub mod keystream;
pub mod transform;

pub use keystream::{InvalidKeyLen, Key, Nonce, KEY_LEN, NONCE_LEN};
