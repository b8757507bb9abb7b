//! Test utilities and mocks for Fakio
//!
//! This module provides common test utilities used across integration tests,
//! including a minimal in-process Fakio server.

#![allow(dead_code)]

use fakio::config::{ClientConfig, TcpConfig};
use fakio::crypto::{digest, Decryptor, Encryptor, StreamCipher};
use fakio::protocol::{HANDSHAKE_MARKER, HANDSHAKE_REQUEST_LEN, SESSION_KEY_MATERIAL_LEN};
use fakio::transport::TunnelConnection;
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

/// Create a test TCP listener on an available port
pub async fn create_test_listener() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

/// Address nobody listens on
pub async fn unused_addr() -> SocketAddr {
    let (listener, addr) = create_test_listener().await;
    drop(listener);
    addr
}

/// Test configuration builder
pub struct TestConfigBuilder {
    server: String,
    username: String,
    password: String,
    reply_before_dial: bool,
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        TestConfigBuilder {
            server: "127.0.0.1:8888".to_string(),
            username: "alice".to_string(),
            password: "secret".to_string(),
            reply_before_dial: true,
        }
    }
}

impl TestConfigBuilder {
    /// Create a new test config builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set server address
    pub fn server(mut self, addr: SocketAddr) -> Self {
        self.server = addr.to_string();
        self
    }

    /// Set credentials
    pub fn credentials(mut self, username: &str, password: &str) -> Self {
        self.username = username.to_string();
        self.password = password.to_string();
        self
    }

    /// Set reply timing
    pub fn reply_before_dial(mut self, before: bool) -> Self {
        self.reply_before_dial = before;
        self
    }

    /// Build the configuration
    pub fn build(self) -> ClientConfig {
        ClientConfig {
            server: self.server,
            local: "127.0.0.1:1080".to_string(),
            username: self.username,
            password: self.password,
            reply_before_dial: self.reply_before_dial,
            tcp: TcpConfig::default(),
        }
    }
}

/// What the mock server does after reading a request
#[derive(Debug, Clone, Copy)]
pub enum ServerBehavior {
    /// Answer with key material and echo the data phase
    Echo,
    /// Write this many response bytes, then close
    Truncate(usize),
}

/// In-process Fakio server
///
/// Decodes each handshake with the shared password, reports
/// `(username, target encoding)` on the returned channel, and then acts
/// according to its [`ServerBehavior`].
pub struct MockServer {
    /// Address the server listens on
    pub addr: SocketAddr,
    /// Decoded handshakes, one per accepted connection
    pub requests: mpsc::UnboundedReceiver<(Vec<u8>, Vec<u8>)>,
}

impl MockServer {
    /// Start a mock server for `password`
    pub async fn start(password: &str, behavior: ServerBehavior) -> Self {
        let (listener, addr) = create_test_listener().await;
        let (tx, requests) = mpsc::unbounded_channel();
        let key = digest(password.as_bytes());

        tokio::spawn(async move {
            loop {
                let (stream, _) = match listener.accept().await {
                    Ok(accepted) => accepted,
                    Err(_) => break,
                };
                let tx = tx.clone();
                tokio::spawn(serve_one(stream, key, behavior, tx));
            }
        });

        MockServer { addr, requests }
    }
}

async fn serve_one(
    mut stream: TcpStream,
    key: [u8; 32],
    behavior: ServerBehavior,
    tx: mpsc::UnboundedSender<(Vec<u8>, Vec<u8>)>,
) {
    let mut request = vec![0u8; HANDSHAKE_REQUEST_LEN];
    if stream.read_exact(&mut request).await.is_err() {
        return;
    }

    let ulen = request[16] as usize;
    let username = request[17..17 + ulen].to_vec();
    let mut body = request[17 + ulen..].to_vec();
    Decryptor::new(&key, &request[..16]).unwrap().decrypt(&mut body);
    if body[0] != HANDSHAKE_MARKER {
        return;
    }
    let target = target_encoding(&body[1..]);
    let _ = tx.send((username, target));

    let material: [u8; SESSION_KEY_MATERIAL_LEN] = std::array::from_fn(|i| (i * 11 + 5) as u8);
    let iv = [0x42u8; 16];
    let mut response = material.to_vec();
    Encryptor::new(&key, &iv).unwrap().encrypt(&mut response);
    let mut wire = iv.to_vec();
    wire.extend_from_slice(&response);

    match behavior {
        ServerBehavior::Truncate(n) => {
            let _ = stream.write_all(&wire[..n]).await;
        }
        ServerBehavior::Echo => {
            if stream.write_all(&wire).await.is_err() {
                return;
            }
            // Server side mirrors the client's IVs
            let cipher =
                StreamCipher::new(&material[32..48], &material[16..32], &material[0..16]).unwrap();
            echo(TunnelConnection::new(stream, cipher)).await;
        }
    }
}

/// Cut the `[atyp][addr][port]` prefix out of the decrypted request body
fn target_encoding(body: &[u8]) -> Vec<u8> {
    let len = match body[0] {
        0x01 => 1 + 4 + 2,
        0x03 => 1 + 1 + body[1] as usize + 2,
        other => panic!("unexpected address type {}", other),
    };
    body[..len].to_vec()
}

async fn echo(mut tunnel: TunnelConnection<TcpStream>) {
    let mut buf = [0u8; 1024];
    loop {
        let n = match tunnel.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        if tunnel.write_all(&buf[..n]).await.is_err() || tunnel.flush().await.is_err() {
            return;
        }
    }
}

/// Mock SOCKS5 handshake data
pub mod socks5_mock {
    use fakio::socks::*;

    /// Create a no-auth method selection request
    pub fn create_auth_request_no_auth() -> Vec<u8> {
        vec![SOCKS5_VERSION, 1, SOCKS5_AUTH_METHOD_NONE]
    }

    /// Create a connect command to IPv4 address
    pub fn create_connect_ipv4(ip: [u8; 4], port: u16) -> Vec<u8> {
        let mut cmd = vec![
            SOCKS5_VERSION,
            SOCKS5_CMD_TCP_CONNECT,
            SOCKS5_RESERVED,
            SOCKS5_ADDR_TYPE_IPV4,
        ];
        cmd.extend_from_slice(&ip);
        cmd.extend_from_slice(&port.to_be_bytes());
        cmd
    }

    /// Create a connect command to domain
    pub fn create_connect_domain(domain: &str, port: u16) -> Vec<u8> {
        let mut cmd = vec![
            SOCKS5_VERSION,
            SOCKS5_CMD_TCP_CONNECT,
            SOCKS5_RESERVED,
            SOCKS5_ADDR_TYPE_DOMAIN,
            domain.len() as u8,
        ];
        cmd.extend_from_slice(domain.as_bytes());
        cmd.extend_from_slice(&port.to_be_bytes());
        cmd
    }
}
