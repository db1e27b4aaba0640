//! Decryption: parse header → derive keys → verify header MAC → open payload

use crate::cipher;
use crate::error::Result;
use crate::format::Header;
use crate::kdf::{derive_key, DerivedKey};
use crate::{HEADER_SIZE, TAG_SIZE};

/// Decryptor for the abcrypt format.
///
/// Construction only succeeds once the header MAC has verified, so a wrong
/// passphrase is reported as [`crate::Error::InvalidHeaderMac`] without ever
/// touching the payload.
#[derive(Debug)]
pub struct Decryptor<'c> {
    header: Header,
    dk: DerivedKey,
    ciphertext: &'c [u8],
}

impl<'c> Decryptor<'c> {
    pub fn new(
        ciphertext: &'c (impl AsRef<[u8]> + ?Sized),
        passphrase: impl AsRef<[u8]>,
    ) -> Result<Self> {
        let data = ciphertext.as_ref();
        let header = Header::parse(data)?;
        let dk = derive_key(passphrase.as_ref(), &header)?;
        header.verify_mac(dk.mac())?;

        Ok(Self {
            header,
            dk,
            ciphertext: &data[HEADER_SIZE..],
        })
    }

    /// Authenticate and decrypt the payload.
    pub fn decrypt(&self) -> Result<Vec<u8>> {
        cipher::open(self.dk.encrypt(), self.header.nonce(), self.ciphertext)
    }

    /// Number of bytes [`Decryptor::decrypt`] returns on success.
    pub fn out_len(&self) -> usize {
        self.ciphertext.len() - TAG_SIZE
    }

    pub fn header(&self) -> &Header {
        &self.header
    }
}

/// Decrypt an abcrypt envelope with `passphrase`.
pub fn decrypt(ciphertext: impl AsRef<[u8]>, passphrase: impl AsRef<[u8]>) -> Result<Vec<u8>> {
    Decryptor::new(ciphertext.as_ref(), passphrase)?.decrypt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{encrypt_with_params, Error, KdfParams};

    const PASSPHRASE: &str = "passphrase";

    fn encrypted(plaintext: &[u8]) -> Vec<u8> {
        encrypt_with_params(plaintext, PASSPHRASE, KdfParams::new(32, 3, 4)).unwrap()
    }

    #[test]
    fn test_decrypt_roundtrip() {
        let ciphertext = encrypted(b"hello, encrypted world!");
        assert_eq!(decrypt(&ciphertext, PASSPHRASE).unwrap(), b"hello, encrypted world!");
    }

    #[test]
    fn test_decrypt_empty() {
        let ciphertext = encrypted(b"");
        let decryptor = Decryptor::new(&ciphertext, PASSPHRASE).unwrap();
        assert_eq!(decryptor.out_len(), 0);
        assert!(decryptor.decrypt().unwrap().is_empty());
    }

    #[test]
    fn test_out_len() {
        let ciphertext = encrypted(&[7u8; 321]);
        let decryptor = Decryptor::new(&ciphertext, PASSPHRASE).unwrap();
        assert_eq!(decryptor.out_len(), 321);
        assert_eq!(decryptor.decrypt().unwrap().len(), 321);
    }

    #[test]
    fn test_wrong_passphrase() {
        let ciphertext = encrypted(b"secret data");
        let err = Decryptor::new(&ciphertext, "password").unwrap_err();

        assert!(matches!(err, Error::InvalidHeaderMac(_)));
        assert_eq!(err.header_mac().map(|m| &m[..]), Some(&ciphertext[84..148]));
    }

    #[test]
    fn test_tampered_tag() {
        let mut ciphertext = encrypted(b"secret data");
        let last = ciphertext.len() - 1;
        ciphertext[last] ^= 0x01;

        let decryptor = Decryptor::new(&ciphertext, PASSPHRASE).unwrap();
        assert!(matches!(decryptor.decrypt(), Err(Error::InvalidMac(_))));
    }

    #[test]
    fn test_tampered_header_mac() {
        let mut ciphertext = encrypted(b"secret data");
        ciphertext[100] ^= 0x80;

        assert!(matches!(
            Decryptor::new(&ciphertext, PASSPHRASE),
            Err(Error::InvalidHeaderMac(_))
        ));
    }

    #[test]
    fn test_invalid_length() {
        let data = [0u8; HEADER_SIZE + TAG_SIZE - 1];
        assert!(matches!(
            Decryptor::new(&data[..], PASSPHRASE),
            Err(Error::InvalidLength)
        ));
    }

    #[test]
    fn test_parallelism_over_u8_fails_at_derivation() {
        let mut ciphertext = encrypted(b"");
        ciphertext[24..28].copy_from_slice(&256u32.to_le_bytes());

        assert!(matches!(
            Decryptor::new(&ciphertext, PASSPHRASE),
            Err(Error::InvalidArgon2Params(argon2::Error::ThreadsTooMany))
        ));
    }
}
