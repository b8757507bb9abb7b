//! SOCKS5 request parser
//!
//! Parses the CONNECT request from the local client.

use crate::error::{Result, Socks5Error};
use crate::socks::consts::*;
use crate::socks::types::{Socks5Request, TargetAddr};
use std::net::Ipv4Addr;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Bytes read before the frame length is known: VER CMD RSV ATYP and the
/// first address byte (the domain length for ATYP 0x03)
const REQUEST_PREFIX_LEN: usize = 5;

/// Parse a SOCKS5 CONNECT request from the stream
///
/// # SOCKS5 Request Format
///
/// ```text
/// +----+-----+-------+------+----------+----------+
/// |VER | CMD |  RSV  | ATYP | DST.ADDR | DST.PORT |
/// +----+-----+-------+------+----------+----------+
/// | 1  |  1  | X'00' |  1   | Variable |    2     |
/// +----+-----+-------+------+----------+----------+
/// ```
///
/// Only CONNECT with an IPv4 or domain address is accepted. Nothing is
/// written to the stream, on success or failure.
pub async fn parse_request<S>(stream: &mut S) -> Result<Socks5Request>
where
    S: AsyncRead + Unpin,
{
    let mut frame = [0u8; MAX_REQUEST_LEN];
    stream.read_exact(&mut frame[..REQUEST_PREFIX_LEN]).await?;

    if frame[0] != SOCKS5_VERSION {
        return Err(Socks5Error::UnsupportedVersion(frame[0]).into());
    }
    if frame[1] != SOCKS5_CMD_TCP_CONNECT {
        return Err(Socks5Error::UnsupportedCommand(frame[1]).into());
    }

    let request_len = match frame[3] {
        SOCKS5_ADDR_TYPE_IPV4 => 3 + 1 + 4 + 2,
        SOCKS5_ADDR_TYPE_DOMAIN => 3 + 1 + 1 + 2 + frame[4] as usize,
        atyp => return Err(Socks5Error::UnsupportedAddressType(atyp).into()),
    };

    stream
        .read_exact(&mut frame[REQUEST_PREFIX_LEN..request_len])
        .await?;

    let port = u16::from_be_bytes([frame[request_len - 2], frame[request_len - 1]]);
    let target = match frame[3] {
        SOCKS5_ADDR_TYPE_IPV4 => {
            TargetAddr::ipv4(Ipv4Addr::new(frame[4], frame[5], frame[6], frame[7]), port)
        }
        _ => {
            // Name bytes are forwarded untouched; the lossy string is for logs
            let raw = &frame[5..request_len - 2];
            TargetAddr::domain(String::from_utf8_lossy(raw), port)
        }
    };

    tracing::debug!("Parsed SOCKS5 CONNECT to {}", target);

    Ok(Socks5Request {
        target,
        encoding: frame[3..request_len].to_vec(),
    })
}
