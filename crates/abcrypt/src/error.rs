use chacha20poly1305::aead;
use thiserror::Error;

use crate::{HEADER_SIZE, MAC_SIZE, TAG_SIZE};

pub type Result<T> = std::result::Result<T, Error>;

/// Every way encrypting or decrypting abcrypt data can fail.
///
/// The `argon2` and `aead` error types only implement `std::error::Error`
/// behind their `std` features, so they are carried as values and rendered in
/// the message instead of being exposed through `source()`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("encrypted data is shorter than {} bytes", HEADER_SIZE + TAG_SIZE)]
    InvalidLength,

    #[error("invalid magic number")]
    InvalidMagicNumber,

    #[error("unsupported version number `{0}`")]
    UnsupportedVersion(u8),

    #[error("unknown version number `{0}`")]
    UnknownVersion(u8),

    #[error("invalid Argon2 type `{0}`")]
    InvalidArgon2Type(u32),

    #[error("invalid Argon2 version `{0:#x}`")]
    InvalidArgon2Version(u32),

    #[error("invalid Argon2 parameters: {0}")]
    InvalidArgon2Params(argon2::Error),

    #[error("Argon2 key derivation failed: {0}")]
    Argon2(argon2::Error),

    /// Wrong passphrase, or the header was corrupted or tampered with.
    #[error("invalid header MAC")]
    InvalidHeaderMac(Box<[u8; MAC_SIZE]>),

    /// The header verified but the payload did not.
    #[error("invalid ciphertext MAC: {0}")]
    InvalidMac(aead::Error),

    #[error("payload encryption failed: {0}")]
    Seal(aead::Error),
}

impl Error {
    /// The claimed header MAC, when this is an [`Error::InvalidHeaderMac`].
    pub fn header_mac(&self) -> Option<&[u8; MAC_SIZE]> {
        match self {
            Self::InvalidHeaderMac(mac) => Some(mac),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_length_message() {
        assert_eq!(
            Error::InvalidLength.to_string(),
            "encrypted data is shorter than 164 bytes"
        );
    }

    #[test]
    fn test_invalid_magic_number_message() {
        assert_eq!(Error::InvalidMagicNumber.to_string(), "invalid magic number");
    }

    #[test]
    fn test_version_messages() {
        assert_eq!(
            Error::UnsupportedVersion(0).to_string(),
            "unsupported version number `0`"
        );
        assert_eq!(
            Error::UnknownVersion(u8::MAX).to_string(),
            "unknown version number `255`"
        );
    }

    #[test]
    fn test_argon2_identifier_messages() {
        assert_eq!(Error::InvalidArgon2Type(3).to_string(), "invalid Argon2 type `3`");
        assert_eq!(
            Error::InvalidArgon2Version(0x14).to_string(),
            "invalid Argon2 version `0x14`"
        );
    }

    #[test]
    fn test_argon2_params_message() {
        let err = Error::InvalidArgon2Params(argon2::Error::ThreadsTooMany);
        assert!(err.to_string().starts_with("invalid Argon2 parameters: "));
    }

    #[test]
    fn test_invalid_header_mac_carries_tag() {
        let err = Error::InvalidHeaderMac(Box::new([0xAB; MAC_SIZE]));
        assert_eq!(err.to_string(), "invalid header MAC");
        assert_eq!(err.header_mac(), Some(&[0xAB; MAC_SIZE]));
        assert_eq!(Error::InvalidLength.header_mac(), None);
    }

    #[test]
    fn test_invalid_mac_message() {
        let err = Error::InvalidMac(aead::Error);
        assert!(err.to_string().starts_with("invalid ciphertext MAC: "));
    }
}
