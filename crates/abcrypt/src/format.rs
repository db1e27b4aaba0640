//! Fixed-layout header codec
//!
//! ```text
//! offset  size  field
//!      0     7  magic number "abcrypt"
//!      7     1  format version
//!      8     4  Argon2 type (LE)
//!     12     4  Argon2 version (LE)
//!     16     4  memory cost, KiB (LE)
//!     20     4  time cost (LE)
//!     24     4  parallelism (LE)
//!     28    32  salt
//!     60    24  nonce
//!     84    64  BLAKE2b-512 MAC over [0, 84)
//! ```
//!
//! Parsing checks the cheap, format-identifying fields first (length, magic,
//! version, algorithm identifiers) so the most specific error wins. Cost
//! parameters are accepted verbatim; the MAC is carried but not verified
//! until the key has been derived.

use rand::RngCore;

use crate::error::{Error, Result};
use crate::kdf::{Argon2Type, Argon2Version, KdfParams};
use crate::mac;
use crate::{HEADER_SIZE, MAC_SIZE, NONCE_SIZE, SALT_SIZE, TAG_SIZE};

/// File signature at offset 0.
pub const MAGIC_NUMBER: &[u8; 7] = b"abcrypt";

const VERSION_OFFSET: usize = 7;
const ARGON2_TYPE_OFFSET: usize = 8;
const ARGON2_VERSION_OFFSET: usize = 12;
const MEMORY_COST_OFFSET: usize = 16;
const TIME_COST_OFFSET: usize = 20;
const PARALLELISM_OFFSET: usize = 24;
const SALT_OFFSET: usize = 28;
const NONCE_OFFSET: usize = SALT_OFFSET + SALT_SIZE;

/// Start of the header MAC; everything before it is authenticated.
pub const MAC_OFFSET: usize = NONCE_OFFSET + NONCE_SIZE;

/// Format version byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum FormatVersion {
    /// Legacy layout without Argon2 identifiers; recognized, never accepted
    V0 = 0,
    V1 = 1,
}

impl FormatVersion {
    pub const CURRENT: Self = Self::V1;
}

/// A parsed or freshly built abcrypt header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
    version: FormatVersion,
    argon2_type: Argon2Type,
    argon2_version: Argon2Version,
    memory_cost: u32,
    time_cost: u32,
    parallelism: u32,
    salt: [u8; SALT_SIZE],
    nonce: [u8; NONCE_SIZE],
    mac: [u8; MAC_SIZE],
}

impl Header {
    /// Build a current-version header with a random salt and nonce.
    ///
    /// The MAC is all zeroes until [`Header::compute_mac`] is called.
    pub fn new(argon2_type: Argon2Type, argon2_version: Argon2Version, params: &KdfParams) -> Self {
        let mut salt = [0u8; SALT_SIZE];
        rand::thread_rng().fill_bytes(&mut salt);
        let mut nonce = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce);

        Self {
            version: FormatVersion::CURRENT,
            argon2_type,
            argon2_version,
            memory_cost: params.memory_cost,
            time_cost: params.time_cost,
            parallelism: u32::from(params.parallelism),
            salt,
            nonce,
            mac: [0u8; MAC_SIZE],
        }
    }

    /// Parse the header at the front of `data`.
    ///
    /// `data` is the whole envelope: anything shorter than a header plus an
    /// empty payload's tag is rejected before the magic number is looked at.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE + TAG_SIZE {
            return Err(Error::InvalidLength);
        }

        if &data[..VERSION_OFFSET] != MAGIC_NUMBER {
            return Err(Error::InvalidMagicNumber);
        }

        let version = match data[VERSION_OFFSET] {
            0 => return Err(Error::UnsupportedVersion(FormatVersion::V0 as u8)),
            1 => FormatVersion::V1,
            v => return Err(Error::UnknownVersion(v)),
        };

        let argon2_type = Argon2Type::try_from(read_u32(data, ARGON2_TYPE_OFFSET))?;
        let argon2_version = Argon2Version::try_from(read_u32(data, ARGON2_VERSION_OFFSET))?;

        let mut salt = [0u8; SALT_SIZE];
        salt.copy_from_slice(&data[SALT_OFFSET..NONCE_OFFSET]);
        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&data[NONCE_OFFSET..MAC_OFFSET]);
        let mut mac = [0u8; MAC_SIZE];
        mac.copy_from_slice(&data[MAC_OFFSET..HEADER_SIZE]);

        Ok(Self {
            version,
            argon2_type,
            argon2_version,
            memory_cost: read_u32(data, MEMORY_COST_OFFSET),
            time_cost: read_u32(data, TIME_COST_OFFSET),
            parallelism: read_u32(data, PARALLELISM_OFFSET),
            salt,
            nonce,
            mac,
        })
    }

    /// Serialize to the fixed 148-byte layout.
    pub fn as_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[..VERSION_OFFSET].copy_from_slice(MAGIC_NUMBER);
        buf[VERSION_OFFSET] = self.version as u8;
        write_u32(&mut buf, ARGON2_TYPE_OFFSET, self.argon2_type.into());
        write_u32(&mut buf, ARGON2_VERSION_OFFSET, self.argon2_version.into());
        write_u32(&mut buf, MEMORY_COST_OFFSET, self.memory_cost);
        write_u32(&mut buf, TIME_COST_OFFSET, self.time_cost);
        write_u32(&mut buf, PARALLELISM_OFFSET, self.parallelism);
        buf[SALT_OFFSET..NONCE_OFFSET].copy_from_slice(&self.salt);
        buf[NONCE_OFFSET..MAC_OFFSET].copy_from_slice(&self.nonce);
        buf[MAC_OFFSET..].copy_from_slice(&self.mac);
        buf
    }

    /// Fill in the header MAC. Only bytes `[0, 84)` are authenticated.
    pub fn compute_mac(&mut self, key: &[u8; MAC_SIZE]) {
        let bytes = self.as_bytes();
        self.mac = mac::compute_mac(key, &bytes[..MAC_OFFSET]);
    }

    /// Check the carried MAC against one recomputed with `key`.
    pub fn verify_mac(&self, key: &[u8; MAC_SIZE]) -> Result<()> {
        let bytes = self.as_bytes();
        mac::verify_mac(key, &bytes[..MAC_OFFSET], &self.mac)
    }

    pub fn version(&self) -> FormatVersion {
        self.version
    }

    pub fn argon2_type(&self) -> Argon2Type {
        self.argon2_type
    }

    pub fn argon2_version(&self) -> Argon2Version {
        self.argon2_version
    }

    pub fn memory_cost(&self) -> u32 {
        self.memory_cost
    }

    pub fn time_cost(&self) -> u32 {
        self.time_cost
    }

    pub fn parallelism(&self) -> u32 {
        self.parallelism
    }

    pub fn salt(&self) -> &[u8; SALT_SIZE] {
        &self.salt
    }

    pub fn nonce(&self) -> &[u8; NONCE_SIZE] {
        &self.nonce
    }

    pub fn mac(&self) -> &[u8; MAC_SIZE] {
        &self.mac
    }

    #[cfg(test)]
    pub(crate) fn set_parallelism(&mut self, parallelism: u32) {
        self.parallelism = parallelism;
    }
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&data[offset..offset + 4]);
    u32::from_le_bytes(buf)
}

fn write_u32(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}
