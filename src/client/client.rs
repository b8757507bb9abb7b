//! Main client structure
//!
//! Owns the listener and spawns one independent task per accepted
//! connection. Sessions are never joined; each one ends on its own when
//! its connections fail or close.

use super::session::{handle_connection, ReplyTiming, SessionContext};
use crate::config::{ClientConfig, Credentials};
use crate::socks::SuccessReply;
use crate::transport::{SocketOpts, TunnelDialer};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Pause after a failed accept, so a persistent error such as EMFILE does
/// not spin the loop
pub const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Main Fakio client
pub struct Client {
    /// Client configuration
    config: ClientConfig,
    /// State shared read-only by all sessions
    context: Arc<SessionContext>,
    /// Socket options for accepted local connections
    socket_opts: SocketOpts,
}

impl Client {
    /// Create a new client with the given configuration
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate().context("Invalid configuration")?;

        let credentials =
            Arc::new(Credentials::from_config(&config).context("Invalid credentials")?);
        let reply = SuccessReply::from_listen_addr(&config.local)
            .with_context(|| format!("Cannot build SOCKS5 reply for {}", config.local))?;

        let context = Arc::new(SessionContext {
            dialer: TunnelDialer::from_config(&config, credentials),
            reply,
            reply_timing: ReplyTiming::from_flag(config.reply_before_dial),
        });

        Ok(Client {
            socket_opts: SocketOpts::from_tcp_config(&config.tcp),
            config,
            context,
        })
    }

    /// Bind the configured listen address and run until shutdown
    pub async fn run(self, shutdown_rx: broadcast::Receiver<bool>) -> Result<()> {
        let listener = TcpListener::bind(&self.config.local)
            .await
            .with_context(|| format!("Failed to listen on {}", self.config.local))?;

        self.serve(listener, shutdown_rx).await
    }

    /// Accept connections on `listener` until shutdown
    pub async fn serve(
        self,
        listener: TcpListener,
        mut shutdown_rx: broadcast::Receiver<bool>,
    ) -> Result<()> {
        info!(
            "Starting fakio client (SOCKS5 server) at {}",
            listener.local_addr()?
        );
        info!("Remote server: {}", self.config.server);

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            debug!("Accepted connection from {}", peer);
                            self.socket_opts.hint(&stream);

                            let context = self.context.clone();
                            tokio::spawn(async move {
                                match handle_connection(stream, &context).await {
                                    Ok(outcome) => debug!("Session {} closed: {}", peer, outcome),
                                    Err(e) => warn!("Session {} failed: {}", peer, e),
                                }
                            });
                        }
                        Err(e) => {
                            error!("Failed to accept connection: {}", e);
                            tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received, stopping client");
                    break;
                }
            }
        }

        info!("Client stopped");
        Ok(())
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}
