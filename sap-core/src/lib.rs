//! Shared types for the SAP proxy: the error model, the vector record, and
//! the atomically-swapped runtime configuration. `sap-proxy` wires these
//! into an HTTP server; `sap-crypto` supplies the underlying transform.

pub mod config;
pub mod error;
pub mod record;

pub use config::{ConfigHandle, SharedConfig};
pub use error::{ErrorKind, ProxyError};
pub use record::Record;
