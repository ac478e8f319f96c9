//! `sap-proxy` CLI arguments.

use std::net::SocketAddr;

use crate::env_ext::OrEnvExt as _;

/// A privacy-preserving vector-search proxy (Shuffle-And-Perturb transform).
#[derive(argh::FromArgs)]
pub struct ProxyArgs {
    /// the <ip-address:port> to listen on.
    ///
    /// Default: `127.0.0.1:8080`.
    /// Env: `LISTEN_ADDR`.
    #[argh(option)]
    pub listen_addr: Option<SocketAddr>,

    /// the data-plane vector-search backend to forward requests to.
    /// Settable here at startup, or later via `POST /blyss/setup`.
    ///
    /// Env: `UPSTREAM_URL`.
    #[argh(option)]
    pub upstream_url: Option<String>,

    /// the control-plane backend that `/databases*` paths are routed to.
    /// Not settable post-boot.
    ///
    /// Env: `CONTROL_PLANE_URL`.
    #[argh(option)]
    pub control_plane_url: Option<String>,

    /// the initial perturbation magnitude used for new encryptions, until
    /// changed by `POST /blyss/setup`.
    ///
    /// Default: `0.0`.
    /// Env: `BETA`.
    #[argh(option)]
    pub beta: Option<f32>,
}

impl ProxyArgs {
    pub fn from_cli() -> Self {
        argh::from_env()
    }

    /// Fill any unset fields from their matching environment variables.
    pub fn or_env_mut(&mut self) -> anyhow::Result<()> {
        self.listen_addr.or_env_mut("LISTEN_ADDR")?;
        self.upstream_url.or_env_mut("UPSTREAM_URL")?;
        self.control_plane_url.or_env_mut("CONTROL_PLANE_URL")?;
        self.beta.or_env_mut("BETA")?;
        Ok(())
    }
}
