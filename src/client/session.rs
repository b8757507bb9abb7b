//! Per-connection session
//!
//! Drives one accepted local connection through the SOCKS5 front end, the
//! tunnel handshake and the relay.

use crate::error::Result;
use crate::relay::{relay, RelayOutcome};
use crate::socks::{accept_connect, SuccessReply};
use crate::transport::TunnelDialer;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::info;

/// When the SOCKS5 success reply is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyTiming {
    /// As soon as the request is parsed, before the tunnel is dialed.
    /// A later dial failure shows up as an abrupt close.
    BeforeDial,
    /// Only after the tunnel handshake has completed
    AfterDial,
}

impl ReplyTiming {
    /// Map the `reply_before_dial` configuration flag
    pub fn from_flag(reply_before_dial: bool) -> Self {
        if reply_before_dial {
            ReplyTiming::BeforeDial
        } else {
            ReplyTiming::AfterDial
        }
    }
}

/// Read-only state shared by all sessions
#[derive(Debug)]
pub struct SessionContext {
    /// Dialer for the Fakio server
    pub dialer: TunnelDialer,
    /// Reply built once from the listen address
    pub reply: SuccessReply,
    /// When to send `reply`
    pub reply_timing: ReplyTiming,
}

/// Handle one accepted local connection to completion
///
/// Returns once the relay has stopped and both connections are closed, or
/// with the error that aborted the session before the relay started.
pub async fn handle_connection<S>(mut local: S, ctx: &SessionContext) -> Result<RelayOutcome>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    let request = accept_connect(&mut local).await?;

    info!("connect {}", request.target);

    if ctx.reply_timing == ReplyTiming::BeforeDial {
        send_success_reply(&mut local, &ctx.reply).await?;
    }

    let tunnel = ctx.dialer.dial(&request.encoding).await?;

    if ctx.reply_timing == ReplyTiming::AfterDial {
        send_success_reply(&mut local, &ctx.reply).await?;
    }

    Ok(relay(local, tunnel).await)
}

/// Acknowledge the CONNECT to the local client
async fn send_success_reply<S>(local: &mut S, reply: &SuccessReply) -> Result<()>
where
    S: AsyncWrite + Unpin,
{
    reply.send(local).await
}
