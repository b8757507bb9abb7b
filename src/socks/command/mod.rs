//! SOCKS5 command parsing module
//!
//! Handles parsing the CONNECT request and building the success reply.

mod parser;
mod reply;

pub use parser::parse_request;
pub use reply::SuccessReply;
