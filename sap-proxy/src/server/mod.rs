//! The proxy's HTTP surface: `/blyss/setup`, `/query`, `/vectors/upsert`,
//! and a passthrough fallback for everything else (routed to the
//! control-plane URL for `/databases*`, the data-plane upstream otherwise).

mod passthrough;
mod query;
mod setup;
mod upsert;

use std::sync::Arc;

use axum::{
    routing::post,
    Router,
};
use ring::rand::SystemRandom;
use sap_core::ConfigHandle;

use crate::forward::Forwarder;

/// `topK` is multiplied by this factor before forwarding a query upstream,
/// then the locally-reranked results are truncated back down. Recovers
/// plaintext ranking accuracy lost by searching in cipher space. Not exposed
/// as a request parameter.
pub const OVERFETCH_FACTOR: u64 = 3;

pub struct ProxyState {
    pub config: ConfigHandle,
    pub forwarder: Forwarder,
    pub rng: SystemRandom,
}

impl ProxyState {
    pub fn new(config: ConfigHandle) -> Self {
        Self {
            config,
            forwarder: Forwarder::new(),
            rng: SystemRandom::new(),
        }
    }
}

pub fn router(state: Arc<ProxyState>) -> Router<()> {
    Router::new()
        .route("/blyss/setup", post(setup::handle))
        .route("/query", post(query::handle))
        .route("/vectors/upsert", post(upsert::handle))
        .fallback(passthrough::handle)
        .with_state(state)
}
