//! abcrypt: a passphrase-based authenticated encrypted data format
//!
//! Envelope layout (all integers little-endian):
//! ```text
//! [7]  magic number "abcrypt"
//! [1]  format version (1)
//! [4]  Argon2 type
//! [4]  Argon2 version
//! [4]  memory cost (KiB)
//! [4]  time cost
//! [4]  parallelism
//! [32] salt
//! [24] XChaCha20-Poly1305 nonce
//! [64] BLAKE2b-512 MAC over bytes [0, 84)
//! [N]  ciphertext
//! [16] Poly1305 tag
//! ```
//!
//! Key hierarchy:
//! ```text
//! Argon2(passphrase, salt) → 96-byte derived key
//!   ├── [0, 32)  XChaCha20-Poly1305 payload key
//!   └── [32, 96) BLAKE2b-512 header MAC key
//! ```
//!
//! Key derivation is deliberately expensive and blocks the calling thread.
//! Async callers should run [`Encryptor`] and [`Decryptor`] construction on a
//! blocking worker.

pub mod cipher;
pub mod decrypt;
pub mod encrypt;
pub mod error;
pub mod format;
pub mod kdf;
pub mod mac;
pub mod params;

pub use argon2;
pub use chacha20poly1305;

pub use decrypt::{decrypt, Decryptor};
pub use encrypt::{encrypt, encrypt_with_context, encrypt_with_params, encrypt_with_type, Encryptor};
pub use error::{Error, Result};
pub use kdf::{
    Argon2Type, Argon2Version, KdfParams, DEFAULT_MEMORY_COST, DEFAULT_PARALLELISM,
    DEFAULT_TIME_COST,
};
pub use params::Params;

/// Number of bytes in the header
pub const HEADER_SIZE: usize = 148;

/// Size of the Poly1305 authentication tag appended to the ciphertext
pub const TAG_SIZE: usize = 16;

/// Size of the XChaCha20-Poly1305 payload key (256-bit)
pub const KEY_SIZE: usize = 32;

/// Size of an XChaCha20-Poly1305 nonce (192-bit)
pub const NONCE_SIZE: usize = 24;

/// Size of the per-file Argon2 salt
pub const SALT_SIZE: usize = 32;

/// Size of the BLAKE2b-512 header MAC and its key
pub const MAC_SIZE: usize = 64;
