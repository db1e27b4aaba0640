//! Passphrase sources: interactive prompt, environment variable, or file

use anyhow::{Context, Result};
use clap::Args;
use secrecy::{ExposeSecret, SecretString};
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct PassphraseArgs {
    /// Read the passphrase from this environment variable instead of prompting
    #[arg(long, value_name = "VAR", conflicts_with = "passphrase_from_file")]
    pub passphrase_from_env: Option<String>,

    /// Read the passphrase from the first line of this file instead of prompting
    #[arg(long, value_name = "FILE")]
    pub passphrase_from_file: Option<PathBuf>,
}

/// Obtain the passphrase. When prompting and `confirm` is set, ask twice.
pub fn read(args: &PassphraseArgs, confirm: bool) -> Result<SecretString> {
    if let Some(var) = &args.passphrase_from_env {
        return from_env(var);
    }
    if let Some(path) = &args.passphrase_from_file {
        return from_file(path);
    }
    prompt(confirm)
}

fn from_env(var: &str) -> Result<SecretString> {
    let value = std::env::var(var)
        .with_context(|| format!("reading passphrase from environment variable {var}"))?;
    Ok(SecretString::from(value))
}

fn from_file(path: &Path) -> Result<SecretString> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading passphrase file: {}", path.display()))?;
    let line = content.lines().next().unwrap_or_default();
    Ok(SecretString::from(line.to_string()))
}

fn prompt(confirm: bool) -> Result<SecretString> {
    let passphrase = SecretString::from(
        rpassword::prompt_password("Enter passphrase: ").context("reading passphrase")?,
    );
    if confirm {
        let again = SecretString::from(
            rpassword::prompt_password("Confirm passphrase: ").context("reading passphrase")?,
        );
        if passphrase.expose_secret() != again.expose_secret() {
            anyhow::bail!("passphrases do not match");
        }
    }
    Ok(passphrase)
}
