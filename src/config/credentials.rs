//! Tunnel credentials
//!
//! Built once from the configuration and shared read-only by every session.

use super::ClientConfig;
use crate::crypto::{digest, Digest};
use crate::error::HandshakeError;
use std::fmt;

/// Username plus the password-derived handshake key
#[derive(Clone)]
pub struct Credentials {
    username: Vec<u8>,
    key: Digest,
}

impl Credentials {
    /// Create credentials, deriving the handshake key as `SHA256(password)`
    pub fn new(username: impl Into<Vec<u8>>, password: &[u8]) -> Result<Self, HandshakeError> {
        let username = username.into();
        if username.len() > u8::MAX as usize {
            return Err(HandshakeError::UsernameTooLong(username.len()));
        }
        Ok(Credentials {
            username,
            key: digest(password),
        })
    }

    /// Build credentials from the client configuration
    pub fn from_config(config: &ClientConfig) -> Result<Self, HandshakeError> {
        Self::new(config.username.as_bytes(), config.password.as_bytes())
    }

    /// Raw username bytes
    pub fn username(&self) -> &[u8] {
        &self.username
    }

    /// The 32-byte handshake key
    pub fn handshake_key(&self) -> &Digest {
        &self.key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &String::from_utf8_lossy(&self.username))
            .field("key", &"<redacted>")
            .finish()
    }
}
