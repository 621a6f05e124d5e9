//! Configuration for PathMem.
//!
//! Read from `~/.pathmem/config.toml`. Every section and field is optional:
//!
//! ```toml
//! [ledger]
//! deploy_type = "sepolia"          # mainnet | sepolia | localhost
//! node_url = "https://..."         # wins over deploy_type
//! namespace = "full_starter_react"
//! request_timeout_secs = 30
//!
//! [account]
//! address = "${PATHMEM_ADDRESS}"
//!
//! [game]
//! path_attempt_budget = 10000
//! mistake_delay_ms = 800
//!
//! [pipeline]
//! success_display_ms = 3000
//! ```
//!
//! `PATHMEM_NODE_URL`, `PATHMEM_DEPLOY_TYPE` and `PATHMEM_ACCOUNT` override the file.

use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

pub const ENV_NODE_URL: &str = "PATHMEM_NODE_URL";
pub const ENV_DEPLOY_TYPE: &str = "PATHMEM_DEPLOY_TYPE";
pub const ENV_ACCOUNT: &str = "PATHMEM_ACCOUNT";

const MAINNET_RPC_URL: &str = "https://api.cartridge.gg/x/starknet/mainnet";
const SEPOLIA_RPC_URL: &str = "https://api.cartridge.gg/x/starknet/sepolia";
const LOCALHOST_RPC_URL: &str = "http://localhost:5050";

pub const DEFAULT_NAMESPACE: &str = "full_starter_react";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Read { path, .. } | Self::Parse { path, .. } => path,
        }
    }
}

/// Which ledger network to talk to when no explicit node URL is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployType {
    Mainnet,
    Sepolia,
    #[default]
    Localhost,
}

impl DeployType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Sepolia => "sepolia",
            Self::Localhost => "localhost",
        }
    }

    #[must_use]
    pub const fn rpc_url(self) -> &'static str {
        match self {
            Self::Mainnet => MAINNET_RPC_URL,
            Self::Sepolia => SEPOLIA_RPC_URL,
            Self::Localhost => LOCALHOST_RPC_URL,
        }
    }
}

impl FromStr for DeployType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "sepolia" => Ok(Self::Sepolia),
            "localhost" => Ok(Self::Localhost),
            other => Err(format!("unknown deploy type '{other}'")),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PathMemConfig {
    pub ledger: Option<LedgerConfig>,
    pub account: Option<AccountConfig>,
    pub game: Option<GameConfig>,
    pub pipeline: Option<PipelineConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LedgerConfig {
    pub deploy_type: Option<DeployType>,
    pub node_url: Option<String>,
    pub namespace: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AccountConfig {
    /// Sender address. Supports `${ENV_VAR}` references.
    pub address: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GameConfig {
    pub path_attempt_budget: Option<u32>,
    pub mistake_delay_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PipelineConfig {
    pub success_display_ms: Option<u64>,
}

/// Effective settings after env overrides and defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub deploy_type: DeployType,
    pub node_url: String,
    pub namespace: String,
    pub request_timeout: Duration,
    pub account: Option<String>,
    pub path_attempt_budget: Option<u32>,
    pub mistake_delay: Option<Duration>,
    pub success_display: Option<Duration>,
}

impl PathMemConfig {
    /// Load the user's config. `Ok(None)` when there is no home directory or no file.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let Some(path) = config_path() else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(&path).map(Some)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| {
            tracing::warn!(path = %path.display(), error = %source, "Failed to read config");
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;

        toml::from_str(&content).map_err(|source| {
            tracing::warn!(path = %path.display(), error = %source, "Failed to parse config");
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    #[must_use]
    pub fn resolve(&self) -> ResolvedConfig {
        self.resolve_with(|name| env::var(name).ok())
    }

    /// Resolve with `lookup` standing in for the process environment.
    pub fn resolve_with(&self, lookup: impl Fn(&str) -> Option<String>) -> ResolvedConfig {
        let ledger = self.ledger.as_ref();
        let non_empty = |value: String| {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };

        let deploy_type = match lookup(ENV_DEPLOY_TYPE).and_then(non_empty) {
            Some(raw) => raw.parse::<DeployType>().unwrap_or_else(|e: String| {
                tracing::warn!("Ignoring {ENV_DEPLOY_TYPE}: {e}");
                ledger.and_then(|l| l.deploy_type).unwrap_or_default()
            }),
            None => ledger.and_then(|l| l.deploy_type).unwrap_or_default(),
        };

        let node_url = lookup(ENV_NODE_URL)
            .and_then(non_empty)
            .or_else(|| {
                ledger
                    .and_then(|l| l.node_url.as_deref())
                    .map(|url| expand_with(url, &lookup))
                    .and_then(non_empty)
            })
            .unwrap_or_else(|| deploy_type.rpc_url().to_string());

        let account = lookup(ENV_ACCOUNT).and_then(non_empty).or_else(|| {
            self.account
                .as_ref()
                .and_then(|a| a.address.as_deref())
                .map(|address| expand_with(address, &lookup))
                .and_then(non_empty)
        });

        let game = self.game.as_ref();
        ResolvedConfig {
            deploy_type,
            node_url,
            namespace: ledger
                .and_then(|l| l.namespace.clone())
                .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
            request_timeout: ledger
                .and_then(|l| l.request_timeout_secs)
                .map_or(DEFAULT_REQUEST_TIMEOUT, Duration::from_secs),
            account,
            path_attempt_budget: game.and_then(|g| g.path_attempt_budget),
            mistake_delay: game
                .and_then(|g| g.mistake_delay_ms)
                .map(Duration::from_millis),
            success_display: self
                .pipeline
                .as_ref()
                .and_then(|p| p.success_display_ms)
                .map(Duration::from_millis),
        }
    }
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".pathmem").join("config.toml"))
}

/// Replace `${VAR}` references using `lookup`. Unset variables become empty.
fn expand_with(value: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(open) = rest.find("${") {
        let Some(len) = rest[open + 2..].find('}') else {
            break;
        };
        out.push_str(&rest[..open]);
        let name = &rest[open + 2..open + 2 + len];
        if !name.is_empty()
            && let Some(replacement) = lookup(name)
        {
            out.push_str(&replacement);
        }
        rest = &rest[open + 3 + len..];
    }

    out.push_str(rest);
    out
}
