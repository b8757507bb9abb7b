//! Fakio tunnel wire protocol
//!
//! The handshake is a fixed 1024-byte request followed by a fixed 64-byte
//! response. Everything after it is a raw AES-CFB byte stream.
//!
//! ```text
//! request:  [iv:16][ulen:1][username:ulen][0x05][atyp][addr][port:2][zero padding]
//!                                          \______ encrypted with SHA256(password) ______/
//! response: [iv:16][ciphertext:48]
//!           ciphertext -> [enc_iv:16][dec_iv:16][aes_key:16]
//! ```

mod handshake;

pub use handshake::{decode_response, HandshakeRequest, SessionKeyMaterial};

/// Size of the handshake request, always sent in full
pub const HANDSHAKE_REQUEST_LEN: usize = 1024;

/// Size of the handshake response
pub const HANDSHAKE_RESPONSE_LEN: usize = 64;

/// Marker byte that precedes the target address in the request
pub const HANDSHAKE_MARKER: u8 = 0x05;

/// Size of the decrypted session key material
pub const SESSION_KEY_MATERIAL_LEN: usize = 48;

/// Size of the session AES key (AES-128)
pub const SESSION_KEY_LEN: usize = 16;
