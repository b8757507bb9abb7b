//! Ciphered tunnel connection
//!
//! Wraps a transport stream with the session [`StreamCipher`]. Bytes read
//! are decrypted in place before they reach the caller; bytes written are
//! encrypted before they reach the transport. Lengths never change.

use crate::crypto::StreamCipher;
use std::io;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

/// Upper bound on ciphertext buffered by a single `poll_write`
const MAX_PENDING: usize = 16 * 1024;

/// A transport stream decorated with a session cipher
///
/// Owns exactly one stream and one cipher for its whole life. The write
/// side keeps encrypted bytes it has accepted but not yet handed to the
/// transport, so the keystream advances exactly once per plaintext byte
/// even when the transport returns `Pending`.
pub struct TunnelConnection<S> {
    inner: S,
    cipher: StreamCipher,
    pending: Vec<u8>,
    pending_pos: usize,
    shutdown: bool,
}

impl<S> TunnelConnection<S> {
    /// Wrap `inner` with `cipher`
    pub fn new(inner: S, cipher: StreamCipher) -> Self {
        TunnelConnection {
            inner,
            cipher,
            pending: Vec::new(),
            pending_pos: 0,
            shutdown: false,
        }
    }

    /// Get a reference to the underlying transport
    pub fn get_ref(&self) -> &S {
        &self.inner
    }
}

impl<S: AsyncWrite + Unpin> TunnelConnection<S> {
    /// Push buffered ciphertext into the transport
    fn poll_drain(&mut self, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        while self.pending_pos < self.pending.len() {
            let n = ready!(
                Pin::new(&mut self.inner).poll_write(cx, &self.pending[self.pending_pos..])
            )?;
            if n == 0 {
                return Poll::Ready(Err(io::ErrorKind::WriteZero.into()));
            }
            self.pending_pos += n;
        }
        self.pending.clear();
        self.pending_pos = 0;
        Poll::Ready(Ok(()))
    }
}

impl<S: AsyncRead + Unpin> AsyncRead for TunnelConnection<S> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let before = buf.filled().len();
        ready!(Pin::new(&mut this.inner).poll_read(cx, buf))?;
        this.cipher.decrypt(&mut buf.filled_mut()[before..]);
        Poll::Ready(Ok(()))
    }
}

impl<S: AsyncWrite + Unpin> AsyncWrite for TunnelConnection<S> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        ready!(this.poll_drain(cx))?;
        if buf.is_empty() {
            return Poll::Ready(Ok(0));
        }

        let n = buf.len().min(MAX_PENDING);
        this.pending.extend_from_slice(&buf[..n]);
        this.cipher.encrypt(&mut this.pending);

        // Accepted bytes are ours now; a Pending here is finished by the
        // next write, flush or shutdown
        if let Poll::Ready(Err(e)) = this.poll_drain(cx) {
            return Poll::Ready(Err(e));
        }
        Poll::Ready(Ok(n))
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        ready!(this.poll_drain(cx))?;
        Pin::new(&mut this.inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if this.shutdown {
            return Poll::Ready(Ok(()));
        }
        ready!(this.poll_drain(cx))?;
        ready!(Pin::new(&mut this.inner).poll_shutdown(cx))?;
        this.shutdown = true;
        Poll::Ready(Ok(()))
    }
}

impl<S> std::fmt::Debug for TunnelConnection<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TunnelConnection")
            .field("pending", &(self.pending.len() - self.pending_pos))
            .field("shutdown", &self.shutdown)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::SessionKeyMaterial;
    use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt};

    fn material() -> [u8; 48] {
        let mut bytes = [0u8; 48];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = (i * 7 + 3) as u8;
        }
        bytes
    }

    /// Client and server ciphers; the server mirrors the client's IVs
    fn cipher_pair() -> (StreamCipher, StreamCipher) {
        let m = material();
        let client = SessionKeyMaterial::from_bytes(m).into_cipher().unwrap();
        let server = StreamCipher::new(&m[32..48], &m[16..32], &m[0..16]).unwrap();
        (client, server)
    }

    #[tokio::test]
    async fn test_round_trip_through_tunnel_pair() {
        let (client_cipher, server_cipher) = cipher_pair();
        let (a, b) = duplex(4096);
        let mut client = TunnelConnection::new(a, client_cipher);
        let mut server = TunnelConnection::new(b, server_cipher);

        client.write_all(b"hello through the tunnel").await.unwrap();
        client.flush().await.unwrap();
        let mut buf = [0u8; 24];
        server.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"hello through the tunnel");

        server.write_all(b"and back again").await.unwrap();
        server.flush().await.unwrap();
        let mut buf = [0u8; 14];
        client.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"and back again");
    }

    #[tokio::test]
    async fn test_bytes_on_wire_are_encrypted() {
        let (client_cipher, _) = cipher_pair();
        let (a, mut raw) = duplex(4096);
        let mut client = TunnelConnection::new(a, client_cipher);

        let plaintext = b"GET / HTTP/1.1\r\n\r\n";
        client.write_all(plaintext).await.unwrap();
        client.flush().await.unwrap();

        let mut wire = vec![0u8; plaintext.len()];
        raw.read_exact(&mut wire).await.unwrap();
        assert_ne!(&wire[..], &plaintext[..]);

        let m = material();
        let mut expected = plaintext.to_vec();
        crate::crypto::Encryptor::new(&m[32..48], &m[0..16])
            .unwrap()
            .encrypt(&mut expected);
        assert_eq!(wire, expected);
    }

    #[tokio::test]
    async fn test_large_write_through_small_pipe() {
        let (client_cipher, server_cipher) = cipher_pair();
        // Pipe smaller than the payload forces Pending on the write side
        let (a, b) = duplex(64);
        let mut client = TunnelConnection::new(a, client_cipher);
        let mut server = TunnelConnection::new(b, server_cipher);

        let data: Vec<u8> = (0..100_000u32).map(|i| (i % 253) as u8).collect();
        let expected = data.clone();

        let writer = tokio::spawn(async move {
            client.write_all(&data).await.unwrap();
            client.flush().await.unwrap();
            client
        });

        let mut received = vec![0u8; expected.len()];
        server.read_exact(&mut received).await.unwrap();
        assert_eq!(received, expected);
        writer.await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent() {
        let (client_cipher, _) = cipher_pair();
        let (a, mut raw) = duplex(64);
        let mut client = TunnelConnection::new(a, client_cipher);

        client.write_all(b"bye").await.unwrap();
        client.shutdown().await.unwrap();
        client.shutdown().await.unwrap();

        let mut rest = Vec::new();
        raw.read_to_end(&mut rest).await.unwrap();
        assert_eq!(rest.len(), 3);
    }

    #[tokio::test]
    async fn test_read_eof_passes_through() {
        let (client_cipher, _) = cipher_pair();
        let (a, raw) = duplex(64);
        let mut client = TunnelConnection::new(a, client_cipher);
        drop(raw);

        let mut buf = [0u8; 16];
        let n = client.read(&mut buf).await.unwrap();
        assert_eq!(n, 0);
    }
}
