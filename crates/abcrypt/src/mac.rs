//! Header authentication: keyed BLAKE2b-512 over the non-MAC header bytes

use blake2::digest::Mac;
use blake2::Blake2bMac512;

use crate::error::{Error, Result};
use crate::MAC_SIZE;

/// Compute the 64-byte BLAKE2b-512 MAC of `data` under `key`.
pub fn compute_mac(key: &[u8; MAC_SIZE], data: &[u8]) -> [u8; MAC_SIZE] {
    let mut mac = Blake2bMac512::new(key.into());
    mac.update(data);

    let mut tag = [0u8; MAC_SIZE];
    tag.copy_from_slice(&mac.finalize().into_bytes());
    tag
}

/// Recompute the MAC of `data` and compare it with `tag` in constant time.
///
/// On mismatch the claimed tag is returned inside the error.
pub fn verify_mac(key: &[u8; MAC_SIZE], data: &[u8], tag: &[u8; MAC_SIZE]) -> Result<()> {
    let mut mac = Blake2bMac512::new(key.into());
    mac.update(data);
    mac.verify_slice(tag)
        .map_err(|_| Error::InvalidHeaderMac(Box::new(*tag)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_verify_roundtrip() {
        let key = [3u8; MAC_SIZE];
        let tag = compute_mac(&key, b"header bytes");
        assert!(verify_mac(&key, b"header bytes", &tag).is_ok());
    }

    #[test]
    fn test_mac_is_keyed() {
        let data = b"header bytes";
        assert_ne!(compute_mac(&[1u8; MAC_SIZE], data), compute_mac(&[2u8; MAC_SIZE], data));
    }

    #[test]
    fn test_tampered_data_rejected() {
        let key = [3u8; MAC_SIZE];
        let tag = compute_mac(&key, b"header bytes");

        let err = verify_mac(&key, b"header bytez", &tag).unwrap_err();
        assert_eq!(err.header_mac(), Some(&tag), "error must echo the claimed tag");
    }

    #[test]
    fn test_tampered_tag_rejected() {
        let key = [3u8; MAC_SIZE];
        let mut tag = compute_mac(&key, b"header bytes");
        tag[MAC_SIZE - 1] ^= 0x01;

        assert!(matches!(
            verify_mac(&key, b"header bytes", &tag),
            Err(Error::InvalidHeaderMac(_))
        ));
    }
}
