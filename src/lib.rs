//! # Fakio - SOCKS5 client for the Fakio encrypted tunnel
//!
//! Fakio exposes a standard SOCKS5 listener to local applications and
//! forwards every accepted connection, AES-CFB encrypted, to a remote Fakio
//! server that makes the outbound connection on the client's behalf.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fakio::config::load_config;
//! use fakio::client::run_client;
//! use tokio::sync::broadcast;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config("config.toml")?;
//!     let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
//!
//!     run_client(config, shutdown_rx).await
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! App -> SOCKS5 front end -> handshake -> TunnelConnection -> relay -> Fakio server -> Target
//! ```
//!
//! Each session sends one fixed-size handshake request carrying the target
//! address, receives fresh per-session key material, and then relays bytes
//! through an AES-128-CFB stream until either side closes.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod client;
pub mod config;
pub mod crypto;
pub mod error;
pub mod protocol;
pub mod relay;
pub mod socks;
pub mod transport;

// Re-export commonly used items
pub use client::run_client;
pub use config::{load_config, Config, Credentials};
pub use error::{FakioError, HandshakeError, Socks5Error};

/// Version of the Fakio library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the application
pub const NAME: &str = env!("CARGO_PKG_NAME");
