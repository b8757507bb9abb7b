//! SOCKS5 front end for Fakio
//!
//! Implements the minimal server side of SOCKS5 against a locally accepted
//! connection: no-auth method selection, CONNECT only, IPv4 and domain
//! addresses only.

mod command;
mod consts;
mod greeting;
mod handler;
mod types;

pub use command::{parse_request, SuccessReply};
pub use consts::*;
pub use greeting::negotiate_method;
pub use handler::accept_connect;
pub use types::{Socks5Request, TargetAddr};
