//! AES-CFB stream cipher
//!
//! Full-block CFB turns AES into a self-synchronizing keystream that can be
//! applied in place to buffers of any length, including partial reads.
//! Ciphertext length always equals plaintext length.

use crate::error::CipherError;
use aes::{Aes128, Aes256};
use cfb_mode::cipher::KeyIvInit;
use cfb_mode::{BufDecryptor, BufEncryptor};

/// Encrypting half of a CFB stream
pub enum Encryptor {
    /// AES-128, selected by a 16-byte key
    Aes128(BufEncryptor<Aes128>),
    /// AES-256, selected by a 32-byte key
    Aes256(BufEncryptor<Aes256>),
}

impl Encryptor {
    /// Create an encrypt stream; the key length selects the AES variant
    pub fn new(key: &[u8], iv: &[u8]) -> Result<Self, CipherError> {
        let invalid = |_| CipherError::InvalidKeyLength(key.len());
        match key.len() {
            16 => Ok(Encryptor::Aes128(
                BufEncryptor::new_from_slices(key, iv).map_err(invalid)?,
            )),
            32 => Ok(Encryptor::Aes256(
                BufEncryptor::new_from_slices(key, iv).map_err(invalid)?,
            )),
            n => Err(CipherError::InvalidKeyLength(n)),
        }
    }

    /// XOR the keystream into `buf` in place
    pub fn encrypt(&mut self, buf: &mut [u8]) {
        match self {
            Encryptor::Aes128(c) => c.encrypt(buf),
            Encryptor::Aes256(c) => c.encrypt(buf),
        }
    }
}

/// Decrypting half of a CFB stream
pub enum Decryptor {
    /// AES-128, selected by a 16-byte key
    Aes128(BufDecryptor<Aes128>),
    /// AES-256, selected by a 32-byte key
    Aes256(BufDecryptor<Aes256>),
}

impl Decryptor {
    /// Create a decrypt stream; the key length selects the AES variant
    pub fn new(key: &[u8], iv: &[u8]) -> Result<Self, CipherError> {
        let invalid = |_| CipherError::InvalidKeyLength(key.len());
        match key.len() {
            16 => Ok(Decryptor::Aes128(
                BufDecryptor::new_from_slices(key, iv).map_err(invalid)?,
            )),
            32 => Ok(Decryptor::Aes256(
                BufDecryptor::new_from_slices(key, iv).map_err(invalid)?,
            )),
            n => Err(CipherError::InvalidKeyLength(n)),
        }
    }

    /// Recover plaintext from `buf` in place
    pub fn decrypt(&mut self, buf: &mut [u8]) {
        match self {
            Decryptor::Aes128(c) => c.decrypt(buf),
            Decryptor::Aes256(c) => c.decrypt(buf),
        }
    }
}

/// A pair of independent CFB streams sharing one block-cipher key
///
/// One stream encrypts outbound bytes, the other decrypts inbound bytes.
/// Each keeps its own position, so the two directions never interfere.
pub struct StreamCipher {
    enc: Encryptor,
    dec: Decryptor,
}

impl StreamCipher {
    /// Create a cipher from a 16 or 32 byte key and one IV per direction
    pub fn new(key: &[u8], enc_iv: &[u8], dec_iv: &[u8]) -> Result<Self, CipherError> {
        Ok(StreamCipher {
            enc: Encryptor::new(key, enc_iv)?,
            dec: Decryptor::new(key, dec_iv)?,
        })
    }

    /// Encrypt `buf` in place with the outbound stream
    pub fn encrypt(&mut self, buf: &mut [u8]) {
        self.enc.encrypt(buf);
    }

    /// Decrypt `buf` in place with the inbound stream
    pub fn decrypt(&mut self, buf: &mut [u8]) {
        self.dec.decrypt(buf);
    }
}

impl std::fmt::Debug for StreamCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StreamCipher { .. }")
    }
}
