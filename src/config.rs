//! Configuration management for the harness
//!
//! Loads configuration from TOML files with environment variable substitution.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

/// Chain entry name for the first rollup
pub const ROLLUP_A: &str = "rollup-a";
/// Chain entry name for the second rollup
pub const ROLLUP_B: &str = "rollup-b";

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub harness: HarnessConfig,
    pub chains: HashMap<String, ChainConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HarnessConfig {
    /// Sender id stamped on every coordination bundle
    pub sender_id: String,
    /// Interval between confirmation poll queries
    pub poll_interval_ms: u64,
    /// Retry budget for the not-yet-propagated phase
    pub max_not_found_retries: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub name: String,
    pub rpc_url: String,
    /// Hex private key of the funded account on this chain
    pub private_key: String,
}

impl Settings {
    /// Load settings from configuration files
    pub fn load() -> Result<Self> {
        let config_path = env::var("HARNESS_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config/default.toml"));

        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        Self::parse(&config_str)
    }

    /// Parse and validate settings from a TOML string
    pub fn parse(raw: &str) -> Result<Self> {
        // Substitute environment variables
        let config_str = substitute_env_vars(raw);

        let settings: Settings = toml::from_str(&config_str)
            .with_context(|| "Failed to parse configuration")?;

        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        for name in [ROLLUP_A, ROLLUP_B] {
            let chain = self
                .chains
                .get(name)
                .with_context(|| format!("Chain entry '{}' must be configured", name))?;

            if chain.chain_id == 0 {
                anyhow::bail!("Chain {} has a zero chain id", name);
            }
            if chain.rpc_url.is_empty() {
                anyhow::bail!("Chain {} has no RPC URL configured", name);
            }
            if chain.private_key.is_empty() {
                anyhow::bail!("Chain {} has no private key configured", name);
            }
        }

        if self.harness.sender_id.is_empty() {
            anyhow::bail!("harness.sender_id must be non-empty");
        }
        if self.harness.poll_interval_ms == 0 {
            anyhow::bail!("harness.poll_interval_ms must be non-zero");
        }

        Ok(())
    }

    /// The two configured rollups, in (a, b) order
    pub fn rollup_pair(&self) -> (&ChainConfig, &ChainConfig) {
        // validate() guarantees both entries exist
        (&self.chains[ROLLUP_A], &self.chains[ROLLUP_B])
    }

    /// Get chain config by chain ID
    pub fn get_chain_by_id(&self, chain_id: u64) -> Option<&ChainConfig> {
        self.chains.values().find(|c| c.chain_id == chain_id)
    }
}

/// Substitute environment variables in the format ${VAR_NAME}
fn substitute_env_vars(input: &str) -> String {
    let mut result = input.to_string();
    let re = regex::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();

    for cap in re.captures_iter(input) {
        let var_name = &cap[1];
        let var_value = env::var(var_name).unwrap_or_default();
        result = result.replace(&cap[0], &var_value);
    }

    result
}
