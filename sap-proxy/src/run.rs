use std::{
    net::{Ipv4Addr, SocketAddr, SocketAddrV4},
    sync::Arc,
};

use anyhow::Context;
use axum::Router;
use sap_core::{ConfigHandle, SharedConfig};
use tokio::net::TcpListener;
use tracing::{info, info_span, instrument, Instrument};

use crate::{cli::ProxyArgs, server, shutdown::ShutdownChannel};

/// `127.0.0.1:8080`.
const DEFAULT_LISTEN_ADDR: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 8080));

pub struct Proxy {
    listen_addr: SocketAddr,
    router: Router<()>,
    shutdown: ShutdownChannel,
}

impl Proxy {
    #[instrument(skip_all, name = "(proxy)")]
    pub fn init(args: ProxyArgs) -> anyhow::Result<Self> {
        let listen_addr = args.listen_addr.unwrap_or(DEFAULT_LISTEN_ADDR);
        let upstream_url = args.upstream_url.unwrap_or_default();
        let control_plane_url = args.control_plane_url.unwrap_or_default();
        let beta = args.beta.unwrap_or(0.0);

        if upstream_url.is_empty() {
            info!(
                "No --upstream-url/UPSTREAM_URL configured at startup; \
                 waiting for `POST /blyss/setup` before passthrough routes \
                 will work."
            );
        }

        let config = ConfigHandle::new(SharedConfig {
            upstream_url,
            control_plane_url,
            beta,
        });
        let state = Arc::new(server::ProxyState::new(config));
        let router = server::router(state);

        Ok(Self {
            listen_addr,
            router,
            shutdown: ShutdownChannel::new(),
        })
    }

    pub fn shutdown_channel(&self) -> ShutdownChannel {
        self.shutdown.clone()
    }

    /// Serve until a shutdown signal arrives.
    ///
    /// Set `spawn_ctrlc_handler` to `true` to have the proxy listen for
    /// Ctrl+C and trigger its own shutdown.
    #[instrument(skip_all, name = "(proxy)")]
    pub async fn run(self, spawn_ctrlc_handler: bool) -> anyhow::Result<()> {
        let listener = TcpListener::bind(self.listen_addr)
            .await
            .with_context(|| format!("Failed to bind {}", self.listen_addr))?;
        let local_addr = listener.local_addr().context("Failed to get local addr")?;
        info!("Listening on http://{local_addr}");

        let shutdown_for_ctrlc = self.shutdown.clone();
        if spawn_ctrlc_handler {
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_err() {
                    return;
                }
                info!(
                    "Ctrl+C received, starting graceful shutdown. \
                     Hit Ctrl+C again to quit immediately."
                );
                shutdown_for_ctrlc.send();
                if tokio::signal::ctrl_c().await.is_ok() {
                    std::process::exit(1);
                }
            });
        }

        let shutdown = self.shutdown.clone();
        std::future::IntoFuture::into_future(axum::serve(listener, self.router).with_graceful_shutdown(
            async move {
                shutdown.recv().await;
                info!("Shutting down API server");
            },
        ))
        .instrument(info_span!("(server)"))
        .await
        .context("API server error")?;

        Ok(())
    }
}
