//! Axum server bootstrap: the composition root.
//!
//! The only place where the tool bridge, tool configuration and session
//! manager are wired together for the HTTP adapter.

use std::future::IntoFuture;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use anyhow::{Context, Result};
use droidscope_core::{DeviceBridgePort, ToolConfig};
use droidscope_runtime::{SessionManager, ToolBridge};
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8080;

/// CORS configuration for the web server.
#[derive(Debug, Clone, Default)]
pub enum CorsConfig {
    /// Allow all origins (development mode).
    #[default]
    AllowAll,
    /// Allow specific origins.
    AllowOrigins(Vec<String>),
}

/// Server configuration for the Axum adapter.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: IpAddr,
    /// Port for the HTTP server.
    pub port: u16,
    /// CORS configuration.
    pub cors: CorsConfig,
    /// External tools and session knobs.
    pub tools: ToolConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            cors: CorsConfig::default(),
            tools: ToolConfig::default(),
        }
    }
}

impl ServerConfig {
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Set CORS to allow specific origins.
    #[must_use]
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.cors = CorsConfig::AllowOrigins(origins);
        self
    }

    #[must_use]
    pub fn with_tools(mut self, tools: ToolConfig) -> Self {
        self.tools = tools;
        self
    }
}

/// Application context for the Axum adapter.
#[derive(Debug, Clone)]
pub struct AxumContext {
    /// Opens sessions and answers device queries.
    pub manager: SessionManager,
}

impl AxumContext {
    /// Context over an arbitrary device bridge.
    pub fn new(bridge: Arc<dyn DeviceBridgePort>, tools: ToolConfig) -> Self {
        Self {
            manager: SessionManager::new(bridge, tools),
        }
    }
}

/// Wire the production services.
pub fn bootstrap(config: &ServerConfig) -> AxumContext {
    let tools = config.tools.clone();
    info!(
        adb = %tools.adb,
        frida = %tools.frida,
        frida_trace = %tools.frida_trace,
        frida_ps = %tools.frida_ps,
        enumeration_script = %tools.enumeration_script.display(),
        enumeration_timeout = ?tools.enumeration_timeout,
        exclusive_traces = tools.exclusive_traces,
        "Axum bootstrap resolved tools"
    );

    let bridge: Arc<dyn DeviceBridgePort> = Arc::new(ToolBridge::new(tools.clone()));
    AxumContext::new(bridge, tools)
}

/// Start the web server and serve until Ctrl-C.
///
/// Returning drops every session task; their processes are killed with them.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    let ctx = bootstrap(&config);
    let app = crate::routes::create_router(ctx, &config.cors);

    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("droidscope listening on http://{}", listener.local_addr()?);

    // Streams never finish on their own, so graceful draining would hang
    tokio::select! {
        result = axum::serve(listener, app).into_future() => result?,
        () = shutdown_signal() => info!("shutdown requested, stopping sessions"),
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
