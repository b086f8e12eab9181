//! Harness configuration.
//!
//! Loads configuration from a TOML file. The private key, the wallet endpoint
//! and per-chain URLs may reference environment variables as `$VAR` or
//! `${VAR}`.
//!
//! # Example Configuration
//!
//! ```toml
//! backend = "local-key"
//! private_key = "$WALLET_PRIVATE_KEY"
//! default_chain = 8453
//!
//! [chains."8453"]
//! rpc_url = "https://mainnet.base.org"
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIG` - Path to configuration file (default: `walletbridge.toml`)
//! - Keys and endpoints referenced by `$VAR` in the config file

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use url::Url;
use walletbridge::{ChainDescriptor, ChainId, ChainRegistry};

/// Which wallet backend the harness composes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    /// Private key held by the harness; it tracks the active chain itself.
    #[default]
    LocalKey,
    /// Private key behind an account that routes each transaction to its chain.
    Managed,
    /// External EIP-1193 wallet reached over HTTP JSON-RPC.
    Eip1193,
}

/// Top-level harness configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Wallet backend (default: `local-key`).
    #[serde(default)]
    pub backend: Backend,

    /// Private key for the `local-key` and `managed` backends (hex, with or
    /// without `0x` prefix). Supports `$VAR` / `${VAR}`.
    #[serde(default)]
    pub private_key: Option<String>,

    /// JSON-RPC endpoint of the wallet for the `eip1193` backend.
    #[serde(default)]
    pub wallet_url: Option<String>,

    /// Chain to start on (default: Ethereum Mainnet).
    #[serde(default)]
    pub default_chain: Option<ChainId>,

    /// Per-chain overrides keyed by decimal chain ID.
    #[serde(default)]
    pub chains: BTreeMap<String, ChainConfig>,
}

/// Per-chain overrides of the built-in registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChainConfig {
    /// HTTP RPC endpoint URL.
    #[serde(default)]
    pub rpc_url: Option<String>,

    /// Block explorer URL.
    #[serde(default)]
    pub explorer_url: Option<String>,
}

/// Errors from loading or applying the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),
    /// The file is not valid TOML for [`WalletConfig`].
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    /// A `[chains]` key is not a decimal chain ID.
    #[error("invalid chain ID {0:?} in [chains]")]
    InvalidChainKey(String),
    /// An override or `default_chain` names a chain outside the registry.
    #[error("chain {0} is not supported")]
    UnknownChain(ChainId),
    /// A URL does not parse.
    #[error("invalid {field} for chain {chain_id}: {source}")]
    InvalidUrl {
        /// Chain the URL belongs to.
        chain_id: ChainId,
        /// Config field name.
        field: &'static str,
        /// Parser error.
        #[source]
        source: url::ParseError,
    },
    /// `wallet_url` is missing or does not parse.
    #[error("wallet_url is required for the eip1193 backend and must be a valid URL")]
    WalletUrl,
}

impl WalletConfig {
    /// Loads configuration from a file path, expanding `$VAR` references.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = if path.exists() {
            std::fs::read_to_string(path)?
        } else {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            String::new()
        };
        Self::parse(&content)
    }

    /// Parses TOML content, then expands `$VAR` references in the key and
    /// endpoint values.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not a valid configuration.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        expand_in_place(&mut config.private_key);
        expand_in_place(&mut config.wallet_url);
        for chain in config.chains.values_mut() {
            expand_in_place(&mut chain.rpc_url);
            expand_in_place(&mut chain.explorer_url);
        }
        Ok(config)
    }

    /// The private key, unless absent, empty or an unresolved `$VAR`.
    #[must_use]
    pub fn private_key(&self) -> Option<&str> {
        self.private_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && !key.starts_with('$'))
    }

    /// The wallet endpoint for the `eip1193` backend.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::WalletUrl`] if unset or not a URL.
    pub fn wallet_url(&self) -> Result<Url, ConfigError> {
        self.wallet_url
            .as_deref()
            .and_then(|url| url.trim().parse().ok())
            .ok_or(ConfigError::WalletUrl)
    }

    /// Builds the chain registry: the built-in chains with overrides
    /// applied and `default_chain` moved to the front.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed keys or URLs and for chains outside
    /// the built-in registry.
    pub fn registry(&self) -> Result<ChainRegistry, ConfigError> {
        let mut chains: Vec<ChainDescriptor> = ChainRegistry::default().iter().cloned().collect();

        for (key, overrides) in &self.chains {
            let chain_id: ChainId = key
                .parse()
                .map_err(|_| ConfigError::InvalidChainKey(key.clone()))?;
            let chain = chains
                .iter_mut()
                .find(|c| c.id == chain_id)
                .ok_or(ConfigError::UnknownChain(chain_id))?;
            if let Some(url) = &overrides.rpc_url {
                chain.rpc_url = Some(parse_url(chain_id, "rpc_url", url)?);
            }
            if let Some(url) = &overrides.explorer_url {
                chain.explorer_url = Some(parse_url(chain_id, "explorer_url", url)?);
            }
        }

        if let Some(default) = self.default_chain {
            let index = chains
                .iter()
                .position(|c| c.id == default)
                .ok_or(ConfigError::UnknownChain(default))?;
            let chain = chains.remove(index);
            chains.insert(0, chain);
        }

        Ok(ChainRegistry::new(chains))
    }
}

fn parse_url(chain_id: ChainId, field: &'static str, url: &str) -> Result<Url, ConfigError> {
    url.trim()
        .parse()
        .map_err(|source| ConfigError::InvalidUrl {
            chain_id,
            field,
            source,
        })
}

/// `$VAR` or `${VAR}`.
static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(?:\{([A-Za-z_][A-Za-z0-9_]*)\}|([A-Za-z_][A-Za-z0-9_]*))").expect("valid regex")
});

/// Replaces `$VAR` and `${VAR}` in `value` from the environment.
///
/// Unset variables are left as written, so an unresolved key stays
/// recognisable to [`WalletConfig::private_key`].
fn expand_env_vars(value: &str) -> String {
    ENV_VAR
        .replace_all(value, |caps: &Captures<'_>| {
            let name = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            std::env::var(name).unwrap_or_else(|_| caps[0].to_owned())
        })
        .into_owned()
}

fn expand_in_place(value: &mut Option<String>) {
    if let Some(value) = value {
        *value = expand_env_vars(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use walletbridge::networks::{BASE_MAINNET, ETHEREUM_MAINNET};

    const UNSET: &str = "WALLETBRIDGE_TEST_VARIABLE_THAT_IS_NOT_SET";

    #[test]
    fn test_expand_env_vars() {
        let path = std::env::var("PATH").unwrap();
        assert_eq!(expand_env_vars("$PATH"), path);
        assert_eq!(expand_env_vars("${PATH}/x"), format!("{path}/x"));
        assert_eq!(expand_env_vars(&format!("${UNSET}")), format!("${UNSET}"));
        assert_eq!(expand_env_vars(&format!("${{{UNSET}}}")), format!("${{{UNSET}}}"));
        assert_eq!(expand_env_vars("5$"), "5$");
    }

    #[test]
    fn test_only_value_fields_are_expanded() {
        let path = std::env::var("PATH").unwrap();
        let config = WalletConfig::parse(
            r#"
            private_key = "$PATH"
            wallet_url = "${PATH}"

            [chains."10"]
            rpc_url = "$PATH"
            "#,
        )
        .unwrap();
        assert_eq!(config.private_key.as_deref(), Some(path.as_str()));
        assert_eq!(config.wallet_url.as_deref(), Some(path.as_str()));
        assert_eq!(config.chains["10"].rpc_url.as_deref(), Some(path.as_str()));

        // Variables elsewhere are not TOML values and stay a parse error.
        assert!(matches!(
            WalletConfig::parse("default_chain = $PATH"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_defaults() {
        let config = WalletConfig::parse("").unwrap();
        assert_eq!(config.backend, Backend::LocalKey);
        assert!(config.private_key().is_none());
        assert!(config.wallet_url().is_err());
        let registry = config.registry().unwrap();
        assert_eq!(registry.default_chain().map(|c| c.id), Some(ETHEREUM_MAINNET));
    }

    #[test]
    fn test_unresolved_private_key_is_ignored() {
        let config = WalletConfig::parse(&format!("private_key = \"${UNSET}\"")).unwrap();
        assert!(config.private_key().is_none());

        let config = WalletConfig::parse("private_key = \"  0xabc \"").unwrap();
        assert_eq!(config.private_key(), Some("0xabc"));
    }

    #[test]
    fn test_full_config() {
        let config = WalletConfig::parse(
            r#"
            backend = "eip1193"
            wallet_url = "http://127.0.0.1:8545"
            default_chain = 8453

            [chains."8453"]
            rpc_url = "https://base.example.org/rpc"
            explorer_url = "https://explorer.example.org"
            "#,
        )
        .unwrap();
        assert_eq!(config.backend, Backend::Eip1193);
        assert_eq!(config.wallet_url().unwrap().as_str(), "http://127.0.0.1:8545/");

        let registry = config.registry().unwrap();
        let base = registry.default_chain().unwrap();
        assert_eq!(base.id, BASE_MAINNET);
        assert_eq!(base.rpc_url.as_ref().unwrap().as_str(), "https://base.example.org/rpc");
        assert_eq!(
            base.explorer_url.as_ref().unwrap().as_str(),
            "https://explorer.example.org/"
        );
        assert_eq!(registry.len(), ChainRegistry::default().len());
        assert!(registry.contains(ETHEREUM_MAINNET));
    }

    #[test]
    fn test_registry_errors() {
        let config = WalletConfig::parse("default_chain = 5").unwrap();
        assert!(matches!(config.registry(), Err(ConfigError::UnknownChain(5))));

        let config = WalletConfig::parse("[chains.base]\nrpc_url = \"https://x.org\"").unwrap();
        assert!(matches!(config.registry(), Err(ConfigError::InvalidChainKey(_))));

        let config = WalletConfig::parse("[chains.\"10\"]\nrpc_url = \"not a url\"").unwrap();
        assert!(matches!(
            config.registry(),
            Err(ConfigError::InvalidUrl {
                chain_id: 10,
                field: "rpc_url",
                ..
            })
        ));
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        assert!(matches!(
            WalletConfig::parse("backend = \"ledger\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
