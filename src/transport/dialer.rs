//! Tunnel dialer
//!
//! Opens a TCP connection to the Fakio server, performs the handshake and
//! returns a ready [`TunnelConnection`].

use super::{SocketOpts, TunnelConnection};
use crate::config::{ClientConfig, Credentials};
use crate::error::{HandshakeError, Result};
use crate::protocol::{decode_response, HandshakeRequest, HANDSHAKE_RESPONSE_LEN};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

/// Dialer for the remote Fakio server
#[derive(Debug, Clone)]
pub struct TunnelDialer {
    /// Server address as `host:port`
    server: String,
    /// Shared, immutable credentials
    credentials: Arc<Credentials>,
    /// Socket options to apply to tunnel connections
    socket_opts: SocketOpts,
    /// Connection timeout; `None` waits for the operating system
    connect_timeout: Option<Duration>,
}

impl TunnelDialer {
    /// Create a new dialer with default socket options and no timeout
    pub fn new(server: impl Into<String>, credentials: Arc<Credentials>) -> Self {
        TunnelDialer {
            server: server.into(),
            credentials,
            socket_opts: SocketOpts::default(),
            connect_timeout: None,
        }
    }

    /// Create a dialer from the client configuration
    pub fn from_config(config: &ClientConfig, credentials: Arc<Credentials>) -> Self {
        TunnelDialer {
            server: config.server.clone(),
            credentials,
            socket_opts: SocketOpts::from_tcp_config(&config.tcp),
            connect_timeout: config.tcp.connect_timeout.map(Duration::from_secs),
        }
    }

    /// Set connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Server address this dialer connects to
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Connect to the server and perform the handshake for `target`
    ///
    /// `target` is the `[atyp][addr][port]` encoding taken verbatim from
    /// the SOCKS5 request. On any failure the TCP connection is dropped
    /// before returning.
    pub async fn dial(&self, target: &[u8]) -> Result<TunnelConnection<TcpStream>> {
        let stream = self.connect().await?;
        self.socket_opts.hint(&stream);

        tracing::debug!("TCP connection established to {}", self.server);

        handshake(stream, &self.credentials, target).await
    }

    async fn connect(&self) -> io::Result<TcpStream> {
        let connect = TcpStream::connect(self.server.as_str());
        let result = match self.connect_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, connect).await {
                Ok(result) => result,
                Err(_) => Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("connection timeout after {:?}", timeout),
                )),
            },
            None => connect.await,
        };

        result.map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("failed to connect to {}: {}", self.server, e),
            )
        })
    }
}

/// Perform the Fakio handshake over an established stream
///
/// Sends the full 1024-byte request, reads exactly 64 response bytes and
/// builds the session cipher from the decoded key material.
pub async fn handshake<S>(
    mut stream: S,
    credentials: &Credentials,
    target: &[u8],
) -> Result<TunnelConnection<S>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let request = HandshakeRequest::new(credentials, target)?.encrypt(credentials)?;

    stream
        .write_all(&request)
        .await
        .map_err(HandshakeError::Send)?;
    stream.flush().await.map_err(HandshakeError::Send)?;

    let mut response = [0u8; HANDSHAKE_RESPONSE_LEN];
    stream
        .read_exact(&mut response)
        .await
        .map_err(HandshakeError::Recv)?;

    let cipher = decode_response(&response, credentials)?.into_cipher()?;

    tracing::trace!("Fakio handshake completed");

    Ok(TunnelConnection::new(stream, cipher))
}
