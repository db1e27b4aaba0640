use abcrypt::{Argon2Type, Argon2Version, KdfParams, Params};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level CLI configuration (loaded from abcrypt.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AbcryptConfig {
    pub kdf: KdfConfig,
    pub limits: LimitsConfig,
}

/// Argon2 settings used by `encrypt` when no flag overrides them
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KdfConfig {
    /// Argon2 type: "argon2d", "argon2i" or "argon2id" (default: argon2id)
    pub argon2_type: Argon2Type,
    /// Argon2 version: "0x10" or "0x13" (default: 0x13)
    pub argon2_version: Argon2Version,
    /// Memory cost in KiB (default: 19456 = 19 MiB)
    pub memory_cost: u32,
    /// Time cost / iterations (default: 2)
    pub time_cost: u32,
    /// Parallelism (default: 1)
    pub parallelism: u8,
}

impl Default for KdfConfig {
    fn default() -> Self {
        let params = KdfParams::default();
        Self {
            argon2_type: Argon2Type::default(),
            argon2_version: Argon2Version::default(),
            memory_cost: params.memory_cost,
            time_cost: params.time_cost,
            parallelism: params.parallelism,
        }
    }
}

impl KdfConfig {
    pub fn params(&self) -> KdfParams {
        KdfParams::new(self.memory_cost, self.time_cost, self.parallelism)
    }
}

/// Ceilings applied to untrusted files before `decrypt` derives a key
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Refuse files declaring more memory than this (KiB)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_memory_cost: Option<u32>,
    /// Refuse files declaring more iterations than this
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_time_cost: Option<u32>,
}

impl LimitsConfig {
    pub fn check(&self, params: &Params) -> Result<()> {
        if let Some(max) = self.max_memory_cost {
            if params.memory_cost() > max {
                anyhow::bail!(
                    "memory cost {} KiB exceeds configured limit of {} KiB",
                    params.memory_cost(),
                    max
                );
            }
        }
        if let Some(max) = self.max_time_cost {
            if params.time_cost() > max {
                anyhow::bail!(
                    "time cost {} exceeds configured limit of {}",
                    params.time_cost(),
                    max
                );
            }
        }
        Ok(())
    }
}

pub async fn load(path: &Path) -> Result<AbcryptConfig> {
    if path.exists() {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading config: {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing config: {}", path.display()))
    } else {
        tracing::debug!("config file not found: {} (using defaults)", path.display());
        Ok(AbcryptConfig::default())
    }
}
