//! `GambitServer` builder and serve loop.
//!
//! This is the entry point for running a Gambit server. It ties together
//! all the layers: HTTP → auth → session service → sessions.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use gambit_auth::TokenStore;
use gambit_engine::{EngineLauncher, UciLauncher};
use gambit_session::{DriverConfig, SessionConfig, SessionRegistry, SessionService};
use tokio::net::TcpListener;

use crate::GambitError;
use crate::handler::{AppState, router};

/// Builder for configuring and starting a Gambit server.
///
/// `L` is the automated-opponent launcher. Without one, requests for an
/// automated opponent are refused.
///
/// # Example
///
/// ```rust,no_run
/// use gambit::prelude::*;
///
/// # async fn run() -> Result<(), GambitError> {
/// let engine = UciLauncher::locate("stockfish", UciConfig::default())?;
/// let server = GambitServer::builder()
///     .bind("0.0.0.0:8080")
///     .launcher(engine)
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct GambitServerBuilder<L: EngineLauncher = UciLauncher> {
    bind_addr: String,
    session_config: SessionConfig,
    driver_config: DriverConfig,
    launcher: Option<L>,
}

impl GambitServerBuilder<UciLauncher> {
    /// Creates a new builder with default settings and no engine.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            session_config: SessionConfig::default(),
            driver_config: DriverConfig::default(),
            launcher: None,
        }
    }
}

impl Default for GambitServerBuilder<UciLauncher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: EngineLauncher> GambitServerBuilder<L> {
    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the per-session configuration (allotment, ticker, queue size).
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Sets the automated-opponent configuration.
    pub fn driver_config(mut self, config: DriverConfig) -> Self {
        self.driver_config = config;
        self
    }

    /// Enables automated opponents, started by `launcher`.
    pub fn launcher<M: EngineLauncher>(self, launcher: M) -> GambitServerBuilder<M> {
        GambitServerBuilder {
            bind_addr: self.bind_addr,
            session_config: self.session_config,
            driver_config: self.driver_config,
            launcher: Some(launcher),
        }
    }

    /// Binds the listener and assembles the application.
    pub async fn build(self) -> Result<GambitServer, GambitError> {
        let listener = TcpListener::bind(&self.bind_addr).await?;

        let registry = Arc::new(SessionRegistry::new());
        let service = SessionService::new(
            registry,
            self.launcher.map(Arc::new),
            self.session_config,
            self.driver_config,
        );
        let state = Arc::new(AppState {
            service,
            tokens: TokenStore::new(),
        });

        Ok(GambitServer {
            listener,
            router: router(state),
        })
    }
}

/// A bound Gambit server.
///
/// Call [`run()`](Self::run) to start serving requests.
pub struct GambitServer {
    listener: TcpListener,
    router: Router,
}

impl GambitServer {
    /// Creates a new builder.
    pub fn builder() -> GambitServerBuilder {
        GambitServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves requests until the process is terminated.
    pub async fn run(self) -> Result<(), GambitError> {
        let addr = self.listener.local_addr()?;
        tracing::info!(%addr, "Gambit server running");
        axum::serve(self.listener, self.router).await?;
        Ok(())
    }
}
