//! Error types for Fakio
//!
//! This module defines all custom error types used throughout the client.
//! Every error is scoped to a single proxied session.

use std::io;
use thiserror::Error;

/// Main error type for Fakio operations
#[derive(Error, Debug)]
pub enum FakioError {
    /// Transport error on either the local or the tunnel connection
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// SOCKS5 protocol error
    #[error("SOCKS5 error: {0}")]
    Socks5(#[from] Socks5Error),

    /// Tunnel handshake error
    #[error("Handshake error: {0}")]
    Handshake(#[from] HandshakeError),

    /// Cipher construction error
    #[error("Cipher error: {0}")]
    Cipher(#[from] CipherError),
}

/// SOCKS5 specific errors raised by the local front end
#[derive(Error, Debug)]
pub enum Socks5Error {
    /// Unsupported SOCKS version
    #[error("Unsupported SOCKS version: {0}")]
    UnsupportedVersion(u8),

    /// Command other than CONNECT
    #[error("Command not supported: {0}")]
    UnsupportedCommand(u8),

    /// Address type other than IPv4 or domain name
    #[error("Address type not supported: {0}")]
    UnsupportedAddressType(u8),

    /// Invalid domain name
    #[error("Invalid domain name: {0}")]
    InvalidDomain(String),

    /// Address that cannot be split into host and port
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

/// Errors raised while performing the tunnel handshake
#[derive(Error, Debug)]
pub enum HandshakeError {
    /// Username does not fit the one-byte length prefix
    #[error("Username too long: {0} bytes (max 255)")]
    UsernameTooLong(usize),

    /// The target address does not fit the fixed-size request
    #[error("Target address encoding too long: {0} bytes")]
    TargetTooLong(usize),

    /// The handshake request could not be written in full
    #[error("Failed to send handshake request: {0}")]
    Send(#[source] io::Error),

    /// The handshake response could not be read in full
    #[error("Failed to receive handshake response: {0}")]
    Recv(#[source] io::Error),

    /// The handshake response is shorter than expected
    #[error("Handshake response too short: {0} bytes")]
    Decode(usize),
}

/// Cipher construction errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherError {
    /// Key or IV length not accepted by the block cipher
    #[error("Invalid key length: {0}")]
    InvalidKeyLength(usize),
}

/// Result alias used by the tunnel engine
pub type Result<T> = std::result::Result<T, FakioError>;
