//! SOCKS5 request acceptance
//!
//! Runs the front-end state machine up to the point where the target is
//! known. Sending the success reply is a separate step owned by the session.

use crate::error::Result;
use crate::socks::command::parse_request;
use crate::socks::greeting::negotiate_method;
use crate::socks::types::Socks5Request;
use tokio::io::{AsyncRead, AsyncWrite};

/// Negotiate the method and read the CONNECT request
///
/// # Protocol Flow
///
/// 1. Greeting, answered with "no authentication required"
/// 2. CONNECT request, parsed into a [`Socks5Request`]
///
/// Any failure aborts without writing further bytes; the caller closes
/// the connection.
pub async fn accept_connect<S>(stream: &mut S) -> Result<Socks5Request>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    negotiate_method(stream).await?;
    parse_request(stream).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FakioError, Socks5Error};
    use crate::socks::consts::*;
    use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt};

    fn create_socks5_handshake(command: u8, addr: &[u8]) -> Vec<u8> {
        let mut data = vec![SOCKS5_VERSION, 1, SOCKS5_AUTH_METHOD_NONE];
        data.push(SOCKS5_VERSION);
        data.push(command);
        data.push(SOCKS5_RESERVED);
        data.extend_from_slice(addr);
        data
    }

    #[tokio::test]
    async fn test_accept_connect_ipv4() {
        let (mut client, mut server) = duplex(1024);
        let addr = [SOCKS5_ADDR_TYPE_IPV4, 127, 0, 0, 1, 0x1F, 0x90];
        client
            .write_all(&create_socks5_handshake(SOCKS5_CMD_TCP_CONNECT, &addr))
            .await
            .unwrap();

        let request = accept_connect(&mut server).await.unwrap();
        assert_eq!(request.target.to_string(), "127.0.0.1:8080");
        assert_eq!(request.encoding, addr);

        let mut reply = [0u8; 2];
        client.read_exact(&mut reply).await.unwrap();
        assert_eq!(reply, [0x05, 0x00]);
    }

    #[tokio::test]
    async fn test_accept_connect_bind_only_method_reply_written() {
        let (mut client, mut server) = duplex(1024);
        let addr = [SOCKS5_ADDR_TYPE_IPV4, 127, 0, 0, 1, 0x1F, 0x90];
        client
            .write_all(&create_socks5_handshake(SOCKS5_CMD_TCP_BIND, &addr))
            .await
            .unwrap();

        let result = accept_connect(&mut server).await;
        assert!(matches!(
            result,
            Err(FakioError::Socks5(Socks5Error::UnsupportedCommand(0x02)))
        ));
        drop(server);

        let mut written = Vec::new();
        client.read_to_end(&mut written).await.unwrap();
        assert_eq!(written, vec![0x05, 0x00]);
    }
}
