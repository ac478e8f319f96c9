//! The proxy's shared, hot-swappable configuration.
//!
//! `upstream_url` and `beta` are set together by `POST /blyss/setup` and
//! must always be read as a consistent pair — a request started just before
//! a concurrent `/blyss/setup` call must never see the new `upstream_url`
//! with the old `beta`, or vice versa. `ArcSwap` gives us that: every
//! `/blyss/setup` does one atomic `.store()` of a freshly built
//! [`SharedConfig`], and every other handler does one `.load()`, so no
//! request can observe a torn combination.

use std::sync::Arc;

use arc_swap::ArcSwap;

/// A point-in-time snapshot of the proxy's mutable configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct SharedConfig {
    /// Data-plane upstream URL, e.g. `https://index.example.com`.
    pub upstream_url: String,
    /// Control-plane URL that `/databases*` paths are routed to.
    pub control_plane_url: String,
    /// Perturbation magnitude used for new encryptions.
    pub beta: f32,
}

/// An `Arc<ArcSwap<SharedConfig>>`-backed handle, cheap to clone and share
/// across the router's `Arc<ProxyState>`.
#[derive(Clone)]
pub struct ConfigHandle(Arc<ArcSwap<SharedConfig>>);

impl ConfigHandle {
    pub fn new(initial: SharedConfig) -> Self {
        Self(Arc::new(ArcSwap::new(Arc::new(initial))))
    }

    /// Load a consistent snapshot of the current configuration.
    pub fn load(&self) -> Arc<SharedConfig> {
        self.0.load_full()
    }

    /// Atomically replace `upstream_url` and `beta`, leaving
    /// `control_plane_url` untouched (the `/blyss/setup` body never carries
    /// it).
    pub fn set_upstream_and_beta(&self, upstream_url: String, beta: f32) {
        let previous = self.load();
        self.0.store(Arc::new(SharedConfig {
            upstream_url,
            control_plane_url: previous.control_plane_url.clone(),
            beta,
        }));
    }
}
