//! Full-duplex relay between the local client and the tunnel
//!
//! Two copy loops run concurrently, one per direction. The first loop to
//! stop, on EOF or on any I/O error, ends the relay: the other loop is
//! cancelled and both connections are closed before [`relay`] returns.
//! Nothing is retried.

use std::fmt;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Size of the reusable buffer of each copy loop
pub const RELAY_BUFFER_SIZE: usize = 1024;

/// Direction of a copy loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Local client to tunnel
    LocalToRemote,
    /// Tunnel to local client
    RemoteToLocal,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::LocalToRemote => write!(f, "local->remote"),
            Direction::RemoteToLocal => write!(f, "remote->local"),
        }
    }
}

/// Why a copy loop stopped
#[derive(Debug)]
pub enum StopReason {
    /// The source reached end of stream
    Eof,
    /// Reading from the source failed
    Read(io::Error),
    /// Writing to the destination failed
    Write(io::Error),
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Eof => write!(f, "end of stream"),
            StopReason::Read(e) => write!(f, "read error: {}", e),
            StopReason::Write(e) => write!(f, "write error: {}", e),
        }
    }
}

/// Result of a finished relay
#[derive(Debug)]
pub struct RelayOutcome {
    /// The loop that stopped first
    pub direction: Direction,
    /// Why it stopped
    pub reason: StopReason,
    /// Bytes copied from the local client to the tunnel
    pub local_to_remote: u64,
    /// Bytes copied from the tunnel to the local client
    pub remote_to_local: u64,
}

impl fmt::Display for RelayOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} stopped on {} (sent {} bytes, received {} bytes)",
            self.direction, self.reason, self.local_to_remote, self.remote_to_local
        )
    }
}

/// Copy from `reader` to `writer` until one of them fails
async fn pump<R, W>(reader: &mut R, writer: &mut W, transferred: &mut u64) -> StopReason
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buf = [0u8; RELAY_BUFFER_SIZE];
    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => return StopReason::Eof,
            Ok(n) => n,
            Err(e) => return StopReason::Read(e),
        };
        if let Err(e) = writer.write_all(&buf[..n]).await {
            return StopReason::Write(e);
        }
        if let Err(e) = writer.flush().await {
            return StopReason::Write(e);
        }
        *transferred += n as u64;
    }
}

/// Relay bytes between `local` and `remote` until either side fails
///
/// Both streams are owned by the relay and are closed exactly once, when
/// it returns.
pub async fn relay<L, R>(local: L, remote: R) -> RelayOutcome
where
    L: AsyncRead + AsyncWrite,
    R: AsyncRead + AsyncWrite,
{
    let (mut local_read, mut local_write) = tokio::io::split(local);
    let (mut remote_read, mut remote_write) = tokio::io::split(remote);

    let mut local_to_remote = 0u64;
    let mut remote_to_local = 0u64;

    let (direction, reason) = tokio::select! {
        reason = pump(&mut local_read, &mut remote_write, &mut local_to_remote) => {
            (Direction::LocalToRemote, reason)
        }
        reason = pump(&mut remote_read, &mut local_write, &mut remote_to_local) => {
            (Direction::RemoteToLocal, reason)
        }
    };

    drop((local_read, local_write));
    drop((remote_read, remote_write));

    let outcome = RelayOutcome {
        direction,
        reason,
        local_to_remote,
        remote_to_local,
    };
    tracing::debug!("Relay finished: {}", outcome);
    outcome
}
