//! Digest/hash functions
//!
//! Provides the SHA-256 hashing used to derive the handshake key.

use sha2::{Digest as Sha2Digest, Sha256};

/// Width of a SHA-256 digest
pub const HASH_WIDTH_IN_BYTES: usize = 32;

/// A SHA-256 digest
pub type Digest = [u8; HASH_WIDTH_IN_BYTES];

/// Compute SHA-256 digest of data
///
/// The handshake key is `digest(password)`, which is why it is always
/// 32 bytes long and selects AES-256 for the handshake cipher.
///
/// # Example
///
/// ```
/// use fakio::crypto::digest;
///
/// let key = digest(b"password");
/// assert_eq!(key.len(), 32);
/// ```
pub fn digest(data: &[u8]) -> Digest {
    let d = Sha256::new().chain_update(data).finalize();
    let mut result = [0u8; HASH_WIDTH_IN_BYTES];
    result.copy_from_slice(&d);
    result
}
