//! Client module for Fakio
//!
//! This module contains the local SOCKS5 listener and the per-connection
//! session logic that forwards each connection through the tunnel.

#[allow(clippy::module_inception)]
mod client;
mod session;

pub use client::Client;
pub use session::{handle_connection, ReplyTiming, SessionContext};

use crate::config::Config;
use anyhow::Result;
use tokio::sync::broadcast;

/// Run the client with the given configuration
pub async fn run_client(config: Config, shutdown_rx: broadcast::Receiver<bool>) -> Result<()> {
    let client = Client::new(config.client)?;
    client.run(shutdown_rx).await
}
