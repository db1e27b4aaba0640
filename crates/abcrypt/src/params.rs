//! Unauthenticated read of the Argon2 cost parameters in a header

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::format::Header;

/// Argon2 cost parameters declared by an encrypted file.
///
/// Reading these needs no passphrase and verifies nothing: the values are
/// what the header claims, which is exactly what a caller needs to decide
/// whether decrypting the file is affordable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Params {
    memory_cost: u32,
    time_cost: u32,
    parallelism: u32,
}

impl Params {
    /// Parse the header of `ciphertext` and return its cost parameters.
    pub fn new(ciphertext: impl AsRef<[u8]>) -> Result<Self> {
        Header::parse(ciphertext.as_ref()).map(|header| Self::from(&header))
    }

    /// Memory size in KiB
    pub fn memory_cost(&self) -> u32 {
        self.memory_cost
    }

    /// Number of iterations
    pub fn time_cost(&self) -> u32 {
        self.time_cost
    }

    /// Degree of parallelism
    pub fn parallelism(&self) -> u32 {
        self.parallelism
    }
}

impl From<&Header> for Params {
    fn from(header: &Header) -> Self {
        Self {
            memory_cost: header.memory_cost(),
            time_cost: header.time_cost(),
            parallelism: header.parallelism(),
        }
    }
}
