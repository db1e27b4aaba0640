//! Encryption: build header → derive keys → MAC header → seal payload

use crate::cipher;
use crate::error::Result;
use crate::format::Header;
use crate::kdf::{derive_key, Argon2Type, Argon2Version, DerivedKey, KdfParams};
use crate::{HEADER_SIZE, TAG_SIZE};

/// Encryptor for the abcrypt format.
///
/// All randomness (salt, nonce) and the key derivation happen in the
/// constructor, so [`Encryptor::encrypt`] is deterministic for one instance.
#[derive(Debug)]
pub struct Encryptor<'m> {
    header: Header,
    dk: DerivedKey,
    plaintext: &'m [u8],
}

impl<'m> Encryptor<'m> {
    /// Create an encryptor with the recommended Argon2id parameters.
    pub fn new(
        plaintext: &'m (impl AsRef<[u8]> + ?Sized),
        passphrase: impl AsRef<[u8]>,
    ) -> Result<Self> {
        Self::with_params(plaintext, passphrase, KdfParams::default())
    }

    /// Create an encryptor with the given Argon2 cost parameters, using Argon2id.
    pub fn with_params(
        plaintext: &'m (impl AsRef<[u8]> + ?Sized),
        passphrase: impl AsRef<[u8]>,
        params: KdfParams,
    ) -> Result<Self> {
        Self::with_type(plaintext, passphrase, Argon2Type::default(), params)
    }

    /// Create an encryptor with the given Argon2 type, using version 0x13.
    pub fn with_type(
        plaintext: &'m (impl AsRef<[u8]> + ?Sized),
        passphrase: impl AsRef<[u8]>,
        argon2_type: Argon2Type,
        params: KdfParams,
    ) -> Result<Self> {
        Self::with_context(
            plaintext,
            passphrase,
            argon2_type,
            Argon2Version::default(),
            params,
        )
    }

    /// Create an encryptor with every Argon2 setting spelled out.
    ///
    /// Fails only if Argon2 rejects `params` (e.g. a time cost of zero, or
    /// less than 8 KiB of memory per lane).
    pub fn with_context(
        plaintext: &'m (impl AsRef<[u8]> + ?Sized),
        passphrase: impl AsRef<[u8]>,
        argon2_type: Argon2Type,
        argon2_version: Argon2Version,
        params: KdfParams,
    ) -> Result<Self> {
        let mut header = Header::new(argon2_type, argon2_version, &params);
        let dk = derive_key(passphrase.as_ref(), &header)?;
        header.compute_mac(dk.mac());

        Ok(Self {
            header,
            dk,
            plaintext: plaintext.as_ref(),
        })
    }

    /// Encrypt the plaintext, returning `header || ciphertext || tag`.
    pub fn encrypt(&self) -> Result<Vec<u8>> {
        let sealed = cipher::seal(self.dk.encrypt(), self.header.nonce(), self.plaintext)?;

        let mut out = Vec::with_capacity(self.out_len());
        out.extend_from_slice(&self.header.as_bytes());
        out.extend_from_slice(&sealed);
        Ok(out)
    }

    /// Number of bytes [`Encryptor::encrypt`] will return.
    pub fn out_len(&self) -> usize {
        HEADER_SIZE + self.plaintext.len() + TAG_SIZE
    }

    pub fn header(&self) -> &Header {
        &self.header
    }
}

/// Encrypt `plaintext` with the recommended Argon2id parameters.
pub fn encrypt(plaintext: impl AsRef<[u8]>, passphrase: impl AsRef<[u8]>) -> Result<Vec<u8>> {
    Encryptor::new(plaintext.as_ref(), passphrase)?.encrypt()
}

/// Encrypt `plaintext` with Argon2id and the given cost parameters.
pub fn encrypt_with_params(
    plaintext: impl AsRef<[u8]>,
    passphrase: impl AsRef<[u8]>,
    params: KdfParams,
) -> Result<Vec<u8>> {
    Encryptor::with_params(plaintext.as_ref(), passphrase, params)?.encrypt()
}

/// Encrypt `plaintext` with the given Argon2 type and cost parameters.
pub fn encrypt_with_type(
    plaintext: impl AsRef<[u8]>,
    passphrase: impl AsRef<[u8]>,
    argon2_type: Argon2Type,
    params: KdfParams,
) -> Result<Vec<u8>> {
    Encryptor::with_type(plaintext.as_ref(), passphrase, argon2_type, params)?.encrypt()
}

/// Encrypt `plaintext` with the given Argon2 type, version and cost parameters.
pub fn encrypt_with_context(
    plaintext: impl AsRef<[u8]>,
    passphrase: impl AsRef<[u8]>,
    argon2_type: Argon2Type,
    argon2_version: Argon2Version,
    params: KdfParams,
) -> Result<Vec<u8>> {
    Encryptor::with_context(
        plaintext.as_ref(),
        passphrase,
        argon2_type,
        argon2_version,
        params,
    )?
    .encrypt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::MAGIC_NUMBER;
    use crate::Error;

    const PASSPHRASE: &str = "passphrase";

    fn fast_params() -> KdfParams {
        KdfParams::new(32, 3, 4)
    }

    #[test]
    fn test_minimum_output_length() {
        let encryptor = Encryptor::with_params(b"", PASSPHRASE, fast_params()).unwrap();
        assert_eq!(encryptor.out_len(), HEADER_SIZE + TAG_SIZE);

        let ciphertext = encryptor.encrypt().unwrap();
        assert_eq!(ciphertext.len(), 164);
    }

    #[test]
    fn test_out_len_matches_output() {
        let plaintext = vec![0x5Au8; 1000];
        let encryptor = Encryptor::with_params(&plaintext, PASSPHRASE, fast_params()).unwrap();

        let ciphertext = encryptor.encrypt().unwrap();
        assert_eq!(ciphertext.len(), encryptor.out_len());
        assert_eq!(ciphertext.len(), HEADER_SIZE + 1000 + TAG_SIZE);
    }

    #[test]
    fn test_encrypt_is_repeatable() {
        let encryptor = Encryptor::with_params("some data", PASSPHRASE, fast_params()).unwrap();
        assert_eq!(encryptor.encrypt().unwrap(), encryptor.encrypt().unwrap());
    }

    #[test]
    fn test_separate_encryptions_differ() {
        let a = encrypt_with_params("some data", PASSPHRASE, fast_params()).unwrap();
        let b = encrypt_with_params("some data", PASSPHRASE, fast_params()).unwrap();
        assert_ne!(a, b, "salt and nonce must be fresh per encryption");
    }

    #[test]
    fn test_header_fields_written() {
        let ciphertext = encrypt_with_context(
            "some data",
            PASSPHRASE,
            Argon2Type::Argon2i,
            Argon2Version::V0x10,
            fast_params(),
        )
        .unwrap();

        assert_eq!(&ciphertext[..7], MAGIC_NUMBER);
        assert_eq!(ciphertext[7], 1);
        assert_eq!(ciphertext[8..12], 1u32.to_le_bytes());
        assert_eq!(ciphertext[12..16], 0x10u32.to_le_bytes());
        assert_eq!(ciphertext[16..20], 32u32.to_le_bytes());
        assert_eq!(ciphertext[20..24], 3u32.to_le_bytes());
        assert_eq!(ciphertext[24..28], 4u32.to_le_bytes());
    }

    #[test]
    fn test_ciphertext_differs_from_plaintext() {
        let plaintext = b"plaintext that must not appear verbatim";
        let ciphertext = encrypt_with_params(plaintext, PASSPHRASE, fast_params()).unwrap();
        assert_ne!(&ciphertext[HEADER_SIZE..HEADER_SIZE + plaintext.len()], plaintext);
    }

    #[test]
    fn test_default_type_is_argon2id() {
        let encryptor = Encryptor::with_params("", PASSPHRASE, fast_params()).unwrap();
        assert_eq!(encryptor.header().argon2_type(), Argon2Type::Argon2id);
        assert_eq!(encryptor.header().argon2_version(), Argon2Version::V0x13);
    }

    #[test]
    fn test_rejected_params() {
        let err = Encryptor::with_params("", PASSPHRASE, KdfParams::new(32, 0, 1)).unwrap_err();
        assert!(matches!(err, Error::InvalidArgon2Params(_)));
    }
}
