//! Payload AEAD: XChaCha20-Poly1305, no associated data
//!
//! Output of [`seal`]: `[N bytes: ciphertext][16 bytes: Poly1305 tag]`.
//! The 24-byte nonce lives in the header, not alongside the ciphertext.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};

use crate::error::{Error, Result};
use crate::{KEY_SIZE, NONCE_SIZE};

/// Encrypt `plaintext`, returning ciphertext with the tag appended.
pub fn seal(key: &[u8; KEY_SIZE], nonce: &[u8; NONCE_SIZE], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = XChaCha20Poly1305::new(key.into());
    cipher
        .encrypt(XNonce::from_slice(nonce), plaintext)
        .map_err(Error::Seal)
}

/// Authenticate and decrypt `ciphertext` (tag included).
pub fn open(key: &[u8; KEY_SIZE], nonce: &[u8; NONCE_SIZE], ciphertext: &[u8]) -> Result<Vec<u8>> {
    let cipher = XChaCha20Poly1305::new(key.into());
    cipher
        .decrypt(XNonce::from_slice(nonce), ciphertext)
        .map_err(Error::InvalidMac)
}
