//! # sap-proxy
//!
//! A privacy-preserving vector-search proxy. Clients submit plaintext
//! vectors; this service transforms them with the Shuffle-And-Perturb (SAP)
//! transform (see `sap-crypto`) before forwarding to an untrusted
//! vector-search backend, and inverts the transform on the way back so
//! callers see plaintext results ranked by plaintext distance.
//!
//! The proxy is stateless across requests: it holds no vectors, no keys, and
//! no per-record state. The only thing it remembers between requests is the
//! current `(upstream_url, control_plane_url, beta)` configuration, updated
//! atomically by `POST /blyss/setup`.

pub mod cli;
mod env_ext;
pub mod forward;
pub mod key;
pub mod logger;
pub mod rng;
pub mod run;
pub mod server;
pub mod shutdown;
