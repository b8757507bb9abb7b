//! Handshake request building and response decoding

use super::{
    HANDSHAKE_MARKER, HANDSHAKE_REQUEST_LEN, HANDSHAKE_RESPONSE_LEN, SESSION_KEY_LEN,
    SESSION_KEY_MATERIAL_LEN,
};
use crate::config::Credentials;
use crate::crypto::{random_iv, Decryptor, Encryptor, Iv, StreamCipher, IV_LEN};
use crate::error::{CipherError, HandshakeError, Result};
use std::fmt;

/// A plaintext handshake request
///
/// Built once per connection attempt and consumed by [`HandshakeRequest::encrypt`].
pub struct HandshakeRequest {
    buf: Vec<u8>,
    /// Offset of the marker byte; everything from here on gets encrypted
    marker_offset: usize,
}

impl HandshakeRequest {
    /// Build a request with a fresh random IV
    pub fn new(credentials: &Credentials, target: &[u8]) -> std::result::Result<Self, HandshakeError> {
        Self::with_iv(credentials, target, random_iv())
    }

    /// Build a request with an explicit IV
    pub fn with_iv(
        credentials: &Credentials,
        target: &[u8],
        iv: Iv,
    ) -> std::result::Result<Self, HandshakeError> {
        let username = credentials.username();
        if username.len() > u8::MAX as usize {
            return Err(HandshakeError::UsernameTooLong(username.len()));
        }

        let marker_offset = IV_LEN + 1 + username.len();
        if marker_offset + 1 + target.len() > HANDSHAKE_REQUEST_LEN {
            return Err(HandshakeError::TargetTooLong(target.len()));
        }

        let mut buf = vec![0u8; HANDSHAKE_REQUEST_LEN];
        buf[..IV_LEN].copy_from_slice(&iv);
        buf[IV_LEN] = username.len() as u8;
        buf[IV_LEN + 1..marker_offset].copy_from_slice(username);
        buf[marker_offset] = HANDSHAKE_MARKER;
        buf[marker_offset + 1..marker_offset + 1 + target.len()].copy_from_slice(target);

        Ok(HandshakeRequest { buf, marker_offset })
    }

    /// The IV in the first 16 bytes
    pub fn iv(&self) -> &[u8] {
        &self.buf[..IV_LEN]
    }

    /// Offset from which the request is encrypted
    pub fn encrypted_offset(&self) -> usize {
        self.marker_offset
    }

    /// The plaintext request bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Encrypt the marker, address and padding under `SHA256(password)`
    ///
    /// The IV and the username stay in clear. Returns the wire bytes.
    pub fn encrypt(mut self, credentials: &Credentials) -> std::result::Result<Vec<u8>, CipherError> {
        let mut enc = Encryptor::new(credentials.handshake_key(), &self.buf[..IV_LEN])?;
        enc.encrypt(&mut self.buf[self.marker_offset..]);
        Ok(self.buf)
    }
}

impl fmt::Debug for HandshakeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandshakeRequest")
            .field("len", &self.buf.len())
            .field("marker_offset", &self.marker_offset)
            .finish()
    }
}

/// Per-session key material carried by the handshake response
///
/// Used once to build the session cipher and then dropped.
pub struct SessionKeyMaterial([u8; SESSION_KEY_MATERIAL_LEN]);

impl SessionKeyMaterial {
    /// Wrap 48 raw bytes
    pub fn from_bytes(bytes: [u8; SESSION_KEY_MATERIAL_LEN]) -> Self {
        SessionKeyMaterial(bytes)
    }

    /// IV of the client's encrypt stream
    pub fn enc_iv(&self) -> &[u8] {
        &self.0[..IV_LEN]
    }

    /// IV of the client's decrypt stream
    pub fn dec_iv(&self) -> &[u8] {
        &self.0[IV_LEN..2 * IV_LEN]
    }

    /// Session AES-128 key
    pub fn key(&self) -> &[u8] {
        &self.0[SESSION_KEY_MATERIAL_LEN - SESSION_KEY_LEN..]
    }

    /// The raw 48 bytes
    pub fn as_bytes(&self) -> &[u8; SESSION_KEY_MATERIAL_LEN] {
        &self.0
    }

    /// Build the session cipher, consuming the material
    pub fn into_cipher(self) -> std::result::Result<StreamCipher, CipherError> {
        StreamCipher::new(self.key(), self.enc_iv(), self.dec_iv())
    }
}

impl fmt::Debug for SessionKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionKeyMaterial(<redacted>)")
    }
}

/// Decode the server's handshake response into session key material
///
/// `response` must hold at least 64 bytes; only the first 64 are used.
pub fn decode_response(response: &[u8], credentials: &Credentials) -> Result<SessionKeyMaterial> {
    if response.len() < HANDSHAKE_RESPONSE_LEN {
        return Err(HandshakeError::Decode(response.len()).into());
    }

    let mut material = [0u8; SESSION_KEY_MATERIAL_LEN];
    material.copy_from_slice(&response[IV_LEN..HANDSHAKE_RESPONSE_LEN]);

    let mut dec = Decryptor::new(credentials.handshake_key(), &response[..IV_LEN])?;
    dec.decrypt(&mut material);

    Ok(SessionKeyMaterial(material))
}
