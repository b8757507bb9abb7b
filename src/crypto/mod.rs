//! Cryptographic primitives for the Fakio tunnel
//!
//! Provides SHA-256 key derivation, random IV generation and the AES-CFB
//! stream cipher used both for the handshake and for the data phase.

mod cipher;
mod digest;

pub use cipher::{Decryptor, Encryptor, StreamCipher};
pub use digest::{digest, Digest, HASH_WIDTH_IN_BYTES};

use rand::rngs::OsRng;
use rand::RngCore;

/// Length of every IV used by the tunnel (one AES block)
pub const IV_LEN: usize = 16;

/// Initialization vector
pub type Iv = [u8; IV_LEN];

/// Generate a fresh IV from the operating system CSPRNG
pub fn random_iv() -> Iv {
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);
    iv
}
