//! Client configuration types
//!
//! Defines the main configuration structures for the Fakio client.

use super::TcpConfig;
use crate::error::{FakioError, Result};
use crate::socks::SuccessReply;
use serde::{Deserialize, Serialize};

/// Default optimistic reply setting
fn default_reply_before_dial() -> bool {
    true
}

/// Root configuration structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Client configuration
    pub client: ClientConfig,
}

/// Client configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ClientConfig {
    /// Remote Fakio server address (e.g., "fakio.example.com:8888")
    pub server: String,

    /// Local SOCKS5 listen address (e.g., "127.0.0.1:1080")
    pub local: String,

    /// Username sent in clear in every handshake
    pub username: String,

    /// Password; only its SHA-256 digest is ever used
    pub password: String,

    /// Send the SOCKS5 success reply before the tunnel is dialed
    #[serde(default = "default_reply_before_dial")]
    pub reply_before_dial: bool,

    /// TCP socket configuration
    #[serde(default)]
    pub tcp: TcpConfig,
}

impl ClientConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.is_empty() {
            return Err(invalid("server address is empty"));
        }
        if self.local.is_empty() {
            return Err(invalid("local address is empty"));
        }
        if self.username.is_empty() {
            return Err(invalid("username is empty"));
        }
        if self.username.len() > u8::MAX as usize {
            return Err(invalid(format!(
                "username is {} bytes, at most 255 allowed",
                self.username.len()
            )));
        }

        SuccessReply::from_listen_addr(&self.local)
            .map_err(|e| invalid(format!("local address {}: {}", self.local, e)))?;

        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> FakioError {
    FakioError::Config(msg.into())
}
