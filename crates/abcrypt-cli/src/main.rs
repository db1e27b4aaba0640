//! abcrypt: encrypt, decrypt and inspect files in the abcrypt format
//!
//! Commands:
//!   encrypt <INFILE> [-o OUTFILE]  - encrypt a file with a passphrase
//!   decrypt <INFILE> [-o OUTFILE]  - decrypt a file with a passphrase
//!   information [INFILE]           - show the Argon2 parameters of a file
//!   config show                    - display the effective configuration
//!
//! Output goes to stdout unless `-o` is given. Logs go to stderr.

mod config;
mod passphrase;

use abcrypt::{Argon2Type, Argon2Version, Decryptor, KdfParams, Params};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use secrecy::ExposeSecret;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info};

use config::AbcryptConfig;
use passphrase::PassphraseArgs;

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "abcrypt",
    version,
    about = "Passphrase-based file encryption in the abcrypt format"
)]
struct Cli {
    /// Path to abcrypt.toml configuration file
    #[arg(long, short = 'c', env = "ABCRYPT_CONFIG", default_value = "abcrypt.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "ABCRYPT_LOG", default_value = "warn")]
    log: String,

    /// Log format (json, text)
    #[arg(long, env = "ABCRYPT_LOG_FORMAT", default_value = "text")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Debug, ValueEnum)]
enum LogFormat {
    Json,
    Text,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encrypt a file
    Encrypt {
        /// File to encrypt
        input: PathBuf,
        /// Destination file (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        /// Argon2 type (overrides config)
        #[arg(long, value_enum)]
        argon2_type: Option<Argon2TypeArg>,
        /// Argon2 version (overrides config)
        #[arg(long, value_enum)]
        argon2_version: Option<Argon2VersionArg>,
        /// Memory size in KiB (overrides config)
        #[arg(long, short = 'm')]
        memory_cost: Option<u32>,
        /// Number of iterations (overrides config)
        #[arg(long, short = 't')]
        time_cost: Option<u32>,
        /// Degree of parallelism (overrides config)
        #[arg(long, short = 'p')]
        parallelism: Option<u8>,
        #[command(flatten)]
        passphrase: PassphraseArgs,
    },

    /// Decrypt a file
    Decrypt {
        /// File to decrypt
        input: PathBuf,
        /// Destination file (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        #[command(flatten)]
        passphrase: PassphraseArgs,
    },

    /// Show the Argon2 parameters of an encrypted file (no passphrase needed)
    #[command(visible_alias = "info")]
    Information {
        /// Encrypted file (default: stdin)
        input: Option<PathBuf>,
        /// Print as JSON
        #[arg(long, short = 'j')]
        json: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the active configuration (merged defaults + config file)
    Show,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Argon2TypeArg {
    #[value(name = "argon2d")]
    Argon2d,
    #[value(name = "argon2i")]
    Argon2i,
    #[value(name = "argon2id")]
    Argon2id,
}

impl From<Argon2TypeArg> for Argon2Type {
    fn from(value: Argon2TypeArg) -> Self {
        match value {
            Argon2TypeArg::Argon2d => Argon2Type::Argon2d,
            Argon2TypeArg::Argon2i => Argon2Type::Argon2i,
            Argon2TypeArg::Argon2id => Argon2Type::Argon2id,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Argon2VersionArg {
    #[value(name = "0x10")]
    V0x10,
    #[value(name = "0x13")]
    V0x13,
}

impl From<Argon2VersionArg> for Argon2Version {
    fn from(value: Argon2VersionArg) -> Self {
        match value {
            Argon2VersionArg::V0x10 => Argon2Version::V0x10,
            Argon2VersionArg::V0x13 => Argon2Version::V0x13,
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log, &cli.log_format);

    let config = config::load(&cli.config).await?;

    match cli.command {
        Commands::Encrypt {
            input,
            output,
            argon2_type,
            argon2_version,
            memory_cost,
            time_cost,
            parallelism,
            passphrase,
        } => {
            let argon2_type = argon2_type.map_or(config.kdf.argon2_type, Into::into);
            let argon2_version = argon2_version.map_or(config.kdf.argon2_version, Into::into);
            let params = KdfParams::new(
                memory_cost.unwrap_or(config.kdf.memory_cost),
                time_cost.unwrap_or(config.kdf.time_cost),
                parallelism.unwrap_or(config.kdf.parallelism),
            );
            cmd_encrypt(
                &input,
                output.as_deref(),
                argon2_type,
                argon2_version,
                params,
                &passphrase,
            )
            .await
        }
        Commands::Decrypt {
            input,
            output,
            passphrase,
        } => cmd_decrypt(&config, &input, output.as_deref(), &passphrase).await,
        Commands::Information { input, json } => cmd_information(input.as_deref(), json).await,
        Commands::Config {
            action: ConfigAction::Show,
        } => cmd_config_show(&config, &cli.config),
    }
}

fn init_logging(level: &str, format: &LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

// ── I/O helpers ───────────────────────────────────────────────────────────────

async fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) => tokio::fs::read(path)
            .await
            .with_context(|| format!("reading {}", path.display())),
        None => {
            let mut buf = Vec::new();
            tokio::io::stdin()
                .read_to_end(&mut buf)
                .await
                .context("reading stdin")?;
            Ok(buf)
        }
    }
}

async fn write_output(path: Option<&Path>, data: &[u8]) -> Result<()> {
    match path {
        Some(path) => tokio::fs::write(path, data)
            .await
            .with_context(|| format!("writing {}", path.display())),
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(data).await.context("writing stdout")?;
            stdout.flush().await.context("flushing stdout")
        }
    }
}

/// Spinner on stderr while Argon2 runs; key derivation has no progress to report.
fn make_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

// ── `abcrypt encrypt` ─────────────────────────────────────────────────────────

async fn cmd_encrypt(
    input: &Path,
    output: Option<&Path>,
    argon2_type: Argon2Type,
    argon2_version: Argon2Version,
    params: KdfParams,
    passphrase_args: &PassphraseArgs,
) -> Result<()> {
    let plaintext = read_input(Some(input)).await?;
    let passphrase = passphrase::read(passphrase_args, true)?;

    info!(
        input = %input.display(),
        argon2_type = ?argon2_type,
        argon2_version = ?argon2_version,
        memory_cost = params.memory_cost,
        time_cost = params.time_cost,
        parallelism = params.parallelism,
        "encrypting"
    );

    let pb = make_spinner("deriving key");
    let started = Instant::now();
    // Argon2 blocks for as long as the cost parameters ask; keep it off the runtime.
    let result = tokio::task::spawn_blocking(move || {
        abcrypt::encrypt_with_context(
            &plaintext,
            passphrase.expose_secret(),
            argon2_type,
            argon2_version,
            params,
        )
    })
    .await
    .context("encryption task failed")?;
    pb.finish_and_clear();

    let ciphertext = result.with_context(|| format!("encrypting {}", input.display()))?;
    debug!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        bytes = ciphertext.len(),
        "encrypted"
    );

    write_output(output, &ciphertext).await
}

// ── `abcrypt decrypt` ─────────────────────────────────────────────────────────

async fn cmd_decrypt(
    config: &AbcryptConfig,
    input: &Path,
    output: Option<&Path>,
    passphrase_args: &PassphraseArgs,
) -> Result<()> {
    let ciphertext = read_input(Some(input)).await?;

    // Reject unaffordable files before prompting or deriving anything.
    let params = Params::new(&ciphertext)
        .with_context(|| format!("reading header of {}", input.display()))?;
    config.limits.check(&params)?;

    let passphrase = passphrase::read(passphrase_args, false)?;

    info!(
        input = %input.display(),
        memory_cost = params.memory_cost(),
        time_cost = params.time_cost(),
        parallelism = params.parallelism(),
        "decrypting"
    );

    let pb = make_spinner("deriving key");
    let started = Instant::now();
    let result = tokio::task::spawn_blocking(move || {
        Decryptor::new(&ciphertext, passphrase.expose_secret())?.decrypt()
    })
    .await
    .context("decryption task failed")?;
    pb.finish_and_clear();

    let plaintext = result.with_context(|| format!("decrypting {}", input.display()))?;
    debug!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        bytes = plaintext.len(),
        "decrypted"
    );

    write_output(output, &plaintext).await
}

// ── `abcrypt information` ─────────────────────────────────────────────────────

async fn cmd_information(input: Option<&Path>, json: bool) -> Result<()> {
    let ciphertext = read_input(input).await?;
    let params = Params::new(&ciphertext).context("reading header")?;

    if json {
        let rendered = serde_json::to_string(&params).context("serializing parameters")?;
        println!("{rendered}");
    } else {
        println!(
            "Parameters used: memoryCost = {}; timeCost = {}; parallelism = {};",
            params.memory_cost(),
            params.time_cost(),
            params.parallelism()
        );
    }
    Ok(())
}

// ── `abcrypt config show` ─────────────────────────────────────────────────────

fn cmd_config_show(config: &AbcryptConfig, config_path: &Path) -> Result<()> {
    if config_path.exists() {
        println!("# Configuration from: {}", config_path.display());
    } else {
        println!("# Configuration: defaults (no file at {})", config_path.display());
    }
    println!();
    let rendered = toml::to_string_pretty(config).context("serializing config to TOML")?;
    print!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn encrypt_flags_parse() {
        let cli = Cli::try_parse_from([
            "abcrypt",
            "encrypt",
            "data.txt",
            "-o",
            "data.txt.abcrypt",
            "--argon2-type",
            "argon2i",
            "--argon2-version",
            "0x10",
            "-m",
            "32",
            "-t",
            "3",
            "-p",
            "4",
            "--passphrase-from-env",
            "PASS",
        ])
        .unwrap();

        match cli.command {
            Commands::Encrypt {
                argon2_type,
                argon2_version,
                memory_cost,
                parallelism,
                passphrase,
                ..
            } => {
                assert_eq!(argon2_type.map(Argon2Type::from), Some(Argon2Type::Argon2i));
                assert_eq!(
                    argon2_version.map(Argon2Version::from),
                    Some(Argon2Version::V0x10)
                );
                assert_eq!(memory_cost, Some(32));
                assert_eq!(parallelism, Some(4));
                assert_eq!(passphrase.passphrase_from_env.as_deref(), Some("PASS"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parallelism_above_u8_rejected() {
        let result = Cli::try_parse_from(["abcrypt", "encrypt", "data.txt", "-p", "256"]);
        assert!(result.is_err());
    }

    #[test]
    fn passphrase_sources_conflict() {
        let result = Cli::try_parse_from([
            "abcrypt",
            "decrypt",
            "data.txt.abcrypt",
            "--passphrase-from-env",
            "PASS",
            "--passphrase-from-file",
            "pass.txt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn info_alias() {
        let cli = Cli::try_parse_from(["abcrypt", "info", "-j"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Information {
                input: None,
                json: true
            }
        ));
    }
}
