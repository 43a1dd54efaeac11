use alloy::primitives::{Address, B256};
use alloy::signers::local::PrivateKeySigner;
use clap::Parser;
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::Level;
use url::Url;

use crate::vault::{DeploymentError, VaultDeployment};

#[derive(Parser, Debug, Clone)]
pub struct Env {
    /// Path to plaintext TOML configuration file
    #[clap(long)]
    pub config: PathBuf,
    /// Path to TOML secrets file
    #[clap(long)]
    pub secrets: PathBuf,
}

/// Non-secret settings deserialized from the plaintext config TOML.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Config {
    log_level: Option<LogLevel>,
    vault: Option<VaultDeployment>,
}

/// Secret credentials deserialized from the secrets TOML.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Secrets {
    evm: EvmSecrets,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct EvmSecrets {
    rpc_url: Url,
    private_key: Option<B256>,
}

// ===== Runtime types (assembled from Config + Secrets) =====

/// Runtime context assembled from plaintext config and secrets.
#[derive(Debug, Clone)]
pub struct Ctx {
    pub log_level: LogLevel,
    pub vault: VaultDeployment,
    pub evm: EvmCtx,
}

/// Chain endpoint and, for signing sessions, the wallet key.
#[derive(Clone)]
pub struct EvmCtx {
    pub rpc_url: Url,
    pub(crate) private_key: Option<B256>,
}

impl std::fmt::Debug for EvmCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvmCtx")
            .field("rpc_url", &self.rpc_url)
            .field(
                "private_key",
                &self.private_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl EvmCtx {
    /// Address of the configured signer, or `None` for a read-only
    /// session.
    pub(crate) fn signer_address(&self) -> Result<Option<Address>, ConfigError> {
        self.private_key
            .as_ref()
            .map(|key| {
                PrivateKeySigner::from_bytes(key)
                    .map(|signer| signer.address())
                    .map_err(ConfigError::PrivateKeyDerivation)
            })
            .transpose()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

impl From<&LogLevel> for Level {
    fn from(log_level: &LogLevel) -> Self {
        (*log_level).into()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to derive address from the configured private key")]
    PrivateKeyDerivation(#[source] alloy::signers::k256::ecdsa::Error),
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    #[error("failed to parse TOML")]
    Toml(#[from] toml::de::Error),
    #[error("invalid [vault] section: {0}")]
    Deployment(#[from] DeploymentError),
}

impl Ctx {
    pub fn load_files(config: &Path, secrets: &Path) -> Result<Self, ConfigError> {
        let config_str = std::fs::read_to_string(config)?;
        let secrets_str = std::fs::read_to_string(secrets)?;
        Self::from_toml(&config_str, &secrets_str)
    }

    pub fn from_toml(config_toml: &str, secrets_toml: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(config_toml)?;
        let secrets: Secrets = toml::from_str(secrets_toml)?;

        let vault = config.vault.unwrap_or_default().validate()?;

        let evm = EvmCtx {
            rpc_url: secrets.evm.rpc_url,
            private_key: secrets.evm.private_key,
        };

        // Unusable keys are rejected at load time.
        evm.signer_address()?;

        Ok(Self {
            log_level: config.log_level.unwrap_or(LogLevel::Info),
            vault,
            evm,
        })
    }
}

pub fn setup_tracing(log_level: &LogLevel) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(log_level))
        .init();
}

/// Tracing for the terminal UI, which owns stdout. Events go to
/// `log_file` without ANSI colors.
pub fn setup_file_tracing(log_level: &LogLevel, log_file: File) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(log_level))
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();
}

fn env_filter(log_level: &LogLevel) -> tracing_subscriber::EnvFilter {
    let level: Level = log_level.into();
    let default_filter = format!("stargate_vault={level},stargate_evm={level}");

    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into())
}
