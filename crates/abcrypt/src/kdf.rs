//! Key derivation: Argon2(passphrase, salt) → payload key + header MAC key

use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, Zeroizing};

use crate::error::{Error, Result};
use crate::format::Header;
use crate::{KEY_SIZE, MAC_SIZE};

/// Number of bytes requested from Argon2 before splitting into subkeys.
pub const DERIVED_KEY_SIZE: usize = KEY_SIZE + MAC_SIZE;

/// Recommended memory cost in KiB (19 MiB, OWASP Password Storage Cheat Sheet)
pub const DEFAULT_MEMORY_COST: u32 = 19456;

/// Recommended number of Argon2 passes
pub const DEFAULT_TIME_COST: u32 = 2;

/// Recommended number of Argon2 lanes
pub const DEFAULT_PARALLELISM: u8 = 1;

/// Argon2 variant, stored in the header as a little-endian `u32`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u32)]
pub enum Argon2Type {
    /// Data-dependent memory access; fastest, not side-channel resistant
    Argon2d = 0,
    /// Data-independent memory access; side-channel resistant
    Argon2i = 1,
    /// Hybrid of Argon2i and Argon2d
    #[default]
    Argon2id = 2,
}

impl TryFrom<u32> for Argon2Type {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            0 => Ok(Self::Argon2d),
            1 => Ok(Self::Argon2i),
            2 => Ok(Self::Argon2id),
            v => Err(Error::InvalidArgon2Type(v)),
        }
    }
}

impl From<Argon2Type> for u32 {
    fn from(value: Argon2Type) -> Self {
        value as u32
    }
}

impl From<Argon2Type> for Algorithm {
    fn from(value: Argon2Type) -> Self {
        match value {
            Argon2Type::Argon2d => Algorithm::Argon2d,
            Argon2Type::Argon2i => Algorithm::Argon2i,
            Argon2Type::Argon2id => Algorithm::Argon2id,
        }
    }
}

/// Argon2 algorithm revision, stored in the header as a little-endian `u32`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum Argon2Version {
    #[serde(rename = "0x10")]
    V0x10 = 0x10,
    #[default]
    #[serde(rename = "0x13")]
    V0x13 = 0x13,
}

impl TryFrom<u32> for Argon2Version {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            0x10 => Ok(Self::V0x10),
            0x13 => Ok(Self::V0x13),
            v => Err(Error::InvalidArgon2Version(v)),
        }
    }
}

impl From<Argon2Version> for u32 {
    fn from(value: Argon2Version) -> Self {
        value as u32
    }
}

impl From<Argon2Version> for Version {
    fn from(value: Argon2Version) -> Self {
        match value {
            Argon2Version::V0x10 => Version::V0x10,
            Argon2Version::V0x13 => Version::V0x13,
        }
    }
}

/// Argon2 cost parameters chosen when encrypting.
///
/// `parallelism` is a `u8` so that an out-of-range lane count cannot be
/// written into a new header. Parsed headers keep the full `u32` and are
/// range-checked in [`derive_key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory cost in KiB (default: 19456 = 19 MiB)
    pub memory_cost: u32,
    /// Time cost / iterations (default: 2)
    pub time_cost: u32,
    /// Parallelism (default: 1)
    pub parallelism: u8,
}

impl KdfParams {
    pub fn new(memory_cost: u32, time_cost: u32, parallelism: u8) -> Self {
        Self {
            memory_cost,
            time_cost,
            parallelism,
        }
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_COST, DEFAULT_TIME_COST, DEFAULT_PARALLELISM)
    }
}

/// Payload key and header MAC key split from one Argon2 output.
///
/// Zeroized on drop to prevent secrets lingering in memory.
pub struct DerivedKey {
    encrypt: [u8; KEY_SIZE],
    mac: [u8; MAC_SIZE],
}

impl DerivedKey {
    /// Split a 96-byte Argon2 output: `[0, 32)` encrypts, `[32, 96)` authenticates.
    pub fn from_bytes(bytes: &[u8; DERIVED_KEY_SIZE]) -> Self {
        let mut encrypt = [0u8; KEY_SIZE];
        let mut mac = [0u8; MAC_SIZE];
        encrypt.copy_from_slice(&bytes[..KEY_SIZE]);
        mac.copy_from_slice(&bytes[KEY_SIZE..]);
        Self { encrypt, mac }
    }

    pub fn encrypt(&self) -> &[u8; KEY_SIZE] {
        &self.encrypt
    }

    pub fn mac(&self) -> &[u8; MAC_SIZE] {
        &self.mac
    }
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.encrypt.zeroize();
        self.mac.zeroize();
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("encrypt", &"[REDACTED]")
            .field("mac", &"[REDACTED]")
            .finish()
    }
}

/// Run Argon2 with the algorithm, cost parameters and salt recorded in
/// `header`, then split the output into a [`DerivedKey`].
///
/// Costs read from an untrusted header are not capped here. A caller that
/// decrypts untrusted input should inspect [`crate::Params`] first and refuse
/// anything above its own ceiling.
pub fn derive_key(passphrase: &[u8], header: &Header) -> Result<DerivedKey> {
    let parallelism = header.parallelism();
    if parallelism > u32::from(u8::MAX) {
        return Err(Error::InvalidArgon2Params(argon2::Error::ThreadsTooMany));
    }

    let params = Params::new(
        header.memory_cost(),
        header.time_cost(),
        parallelism,
        Some(DERIVED_KEY_SIZE),
    )
    .map_err(Error::InvalidArgon2Params)?;

    let argon2 = Argon2::new(
        header.argon2_type().into(),
        header.argon2_version().into(),
        params,
    );

    let mut dk = Zeroizing::new([0u8; DERIVED_KEY_SIZE]);
    argon2
        .hash_password_into(passphrase, header.salt(), &mut dk[..])
        .map_err(Error::Argon2)?;

    Ok(DerivedKey::from_bytes(&dk))
}
