//! # Depot Server
//!
//! HTTP front of the Depot file store: uploads, retrieval, admin listings, and the health check,
//! documented with `OpenAPI` and served over plain HTTP or rustls.
//!
//! ## Example
//! ```no_run
//! use depot_server::Server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Server::builder()
//!         .port(4583)
//!         .build()
//!         .await?
//!         .run()
//!         .await
//! }
//! ```

mod router;

use anyhow::{Context, Result};
use axum::Router;
use axum_server::Handle;
use axum_server::tls_rustls::RustlsConfig;
use depot_domain::config::ApiConfig;
use depot_kernel::security::admin::SharedAdminCheck;
use depot_kernel::server::ApiState;
use depot_storage::Storage;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};

/// A fluent builder for configuring and initializing the [`Server`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ServerBuilder {
    cfg: ApiConfig,
    admin: Option<SharedAdminCheck>,
}

impl ServerBuilder {
    pub fn config(mut self, cfg: ApiConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.cfg.server.port = port;
        self
    }

    /// Replaces the bearer-token admin check, e.g. with one backed by the site's sessions.
    pub fn admin_check(mut self, admin: SharedAdminCheck) -> Self {
        self.admin = Some(admin);
        self
    }

    async fn init_storage(&self) -> Result<Storage> {
        let storage_cfg = &self.cfg.storage;
        Storage::builder()
            .root(&storage_cfg.root)
            .create(storage_cfg.create)
            .public_prefix(&storage_cfg.public_prefix)
            .connect()
            .await
            .with_context(|| format!("Failed to open storage at {}", storage_cfg.root.display()))
    }

    fn validate_ssl_config(&self) -> Result<()> {
        if let Some(ssl) = &self.cfg.server.ssl {
            if !ssl.cert.exists() {
                anyhow::bail!("SSL certificate not found at: {}", ssl.cert.display());
            }
            if !ssl.key.exists() {
                anyhow::bail!("SSL key not found at: {}", ssl.key.display());
            }

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if ssl.key.metadata()?.permissions().mode() & 0o077 != 0 {
                    warn!(key = %ssl.key.display(), "SSL private key is readable by others");
                }
            }
        }
        Ok(())
    }

    /// Opens the storage root and assembles the application state.
    ///
    /// Leftover temporary files from an interrupted run are purged while the storage opens.
    ///
    /// # Errors
    /// Fails when the SSL files are missing, or the storage root cannot be created or
    /// canonicalized.
    pub async fn build(self) -> Result<Server> {
        self.validate_ssl_config()?;

        let address = SocketAddr::new(self.cfg.server.address, self.cfg.server.port);
        info!(%address, root = %self.cfg.storage.root.display(), "Initializing server");

        if self.cfg.security.admin_token.is_none() && self.admin.is_none() {
            warn!("No admin token configured; file listings are disabled");
        }

        let storage = self.init_storage().await?;

        let mut state = ApiState::builder().config(self.cfg).storage(storage);
        if let Some(admin) = self.admin {
            state = state.admin(admin);
        }
        let state = state.build().context("Failed to finalize API state")?;

        Ok(Server { state })
    }
}

/// A fully initialized server, ready to run.
#[must_use = "call .run().await to start the server"]
#[derive(Debug)]
pub struct Server {
    state: ApiState,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// The complete application router, including the API reference at `/api`.
    pub fn router(&self) -> Router {
        router::init(self.state.clone())
    }

    /// Serves until SIGINT or SIGTERM, then drains in-flight requests for
    /// `server.shutdown_grace_seconds`.
    ///
    /// # Errors
    /// Returns an error if binding fails or the TLS material cannot be loaded.
    pub async fn run(self) -> Result<()> {
        let server_cfg = self.state.config.server.clone();
        let address = SocketAddr::new(server_cfg.address, server_cfg.port);
        let grace = Duration::from_secs(server_cfg.shutdown_grace_seconds);

        let handle = Handle::<SocketAddr>::new();
        tokio::spawn(drain_on_signal(handle.clone(), grace));

        let service = self.router().into_make_service();

        match &server_cfg.ssl {
            Some(ssl) => {
                let tls = RustlsConfig::from_pem_file(&ssl.cert, &ssl.key)
                    .await
                    .context("Failed to load SSL/TLS certificates")?;
                info!("Listening on https://{address}");
                axum_server::bind_rustls(address, tls)
                    .handle(handle)
                    .serve(service)
                    .await
                    .context("HTTPS server failed")?;
            },
            None => {
                info!("Listening on http://{address}");
                axum_server::bind(address)
                    .handle(handle)
                    .serve(service)
                    .await
                    .context("HTTP server failed")?;
            },
        }

        info!("Server stopped");
        Ok(())
    }

    #[must_use]
    pub const fn state(&self) -> &ApiState {
        &self.state
    }
}

async fn drain_on_signal(handle: Handle<SocketAddr>, grace: Duration) {
    match shutdown_signal().await {
        Ok(()) => {
            info!(grace_seconds = grace.as_secs(), "Shutdown requested, draining connections");
            handle.graceful_shutdown(Some(grace));
        },
        Err(e) => error!("Cannot listen for shutdown signals: {e:#}"),
    }
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal as unix_signal};
        let mut terminate =
            unix_signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;
        tokio::select! {
            res = signal::ctrl_c() => res.context("Failed to listen for Ctrl+C")?,
            _ = terminate.recv() => {},
        }
    }

    #[cfg(not(unix))]
    signal::ctrl_c().await.context("Failed to listen for Ctrl+C")?;

    Ok(())
}
