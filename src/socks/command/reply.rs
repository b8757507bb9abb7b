//! SOCKS5 success reply
//!
//! The reply is built once at startup from the listener's own address and
//! then written unchanged for every accepted CONNECT.

use crate::error::{Result, Socks5Error};
use crate::socks::consts::*;
use std::net::Ipv4Addr;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Precomputed success reply
///
/// # SOCKS5 Reply Format
///
/// ```text
/// +----+-----+-------+------+----------+----------+
/// |VER | REP |  RSV  | ATYP | BND.ADDR | BND.PORT |
/// +----+-----+-------+------+----------+----------+
/// | 1  |  1  | X'00' |  1   | Variable |    2     |
/// +----+-----+-------+------+----------+----------+
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessReply {
    bytes: Vec<u8>,
}

impl SuccessReply {
    /// Build the reply from a `host:port` listen address
    ///
    /// An IPv4 literal host gives a 10-byte reply; anything else is sent
    /// as a domain name.
    pub fn from_listen_addr(addr: &str) -> std::result::Result<Self, Socks5Error> {
        let (host, port) = addr
            .rsplit_once(':')
            .ok_or_else(|| Socks5Error::InvalidAddress(addr.to_string()))?;
        let port: u16 = port
            .parse()
            .map_err(|_| Socks5Error::InvalidAddress(addr.to_string()))?;

        let mut bytes = vec![SOCKS5_VERSION, SOCKS5_REPLY_SUCCEEDED, SOCKS5_RESERVED];
        match host.parse::<Ipv4Addr>() {
            Ok(ip) => {
                bytes.push(SOCKS5_ADDR_TYPE_IPV4);
                bytes.extend_from_slice(&ip.octets());
            }
            Err(_) => {
                if host.is_empty() || host.len() > MAX_DOMAIN_LEN {
                    return Err(Socks5Error::InvalidDomain(host.to_string()));
                }
                bytes.push(SOCKS5_ADDR_TYPE_DOMAIN);
                bytes.push(host.len() as u8);
                bytes.extend_from_slice(host.as_bytes());
            }
        }
        bytes.extend_from_slice(&port.to_be_bytes());

        Ok(SuccessReply { bytes })
    }

    /// The encoded reply
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Write the reply to the local client
    pub async fn send<S>(&self, stream: &mut S) -> Result<()>
    where
        S: AsyncWrite + Unpin,
    {
        stream.write_all(&self.bytes).await?;
        stream.flush().await?;
        Ok(())
    }
}
