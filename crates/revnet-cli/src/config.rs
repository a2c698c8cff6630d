//! CLI configuration
//!
//! Read from an optional TOML file, then overridden by `REVNET_*`
//! environment variables (`REVNET_PRICING__CALLER_CHAIN_ID=10`).

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use revnet_bridge::FetchOptions;
use revnet_core::prelude::*;
use revnet_core::TOKEN_DECIMALS;
use serde::{Deserialize, Serialize};

/// Complete CLI configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub pricing: PricingSettings,

    #[serde(default)]
    pub fetch: FetchSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Quote and display settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PricingSettings {
    /// Chain the caller is connected to
    #[serde(default = "default_caller_chain_id")]
    pub caller_chain_id: u64,

    /// Exchange rate from the surplus unit into the display currency
    #[serde(default)]
    pub display_rate: Option<String>,

    #[serde(default = "default_display_symbol")]
    pub display_symbol: String,
}

fn default_caller_chain_id() -> u64 {
    1
}

fn default_display_symbol() -> String {
    "USD".to_string()
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            caller_chain_id: default_caller_chain_id(),
            display_rate: None,
            display_symbol: default_display_symbol(),
        }
    }
}

/// Per-chain read settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchSettings {
    /// Deadline for each chain's read
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Logging configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Filter used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `text` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl CliConfig {
    /// Load from `path` if it exists, then apply environment overrides
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix("REVNET")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("reading configuration from {}", path.display()))?;

        settings
            .try_deserialize()
            .context("invalid configuration")
    }

    pub fn caller_chain(&self) -> ChainId {
        ChainId(self.pricing.caller_chain_id)
    }

    /// Parsed display rate, at 18 decimals
    pub fn display_rate(&self) -> anyhow::Result<Option<FixedAmount>> {
        self.pricing
            .display_rate
            .as_deref()
            .map(|rate| {
                FixedAmount::parse(rate, 18)
                    .with_context(|| format!("pricing.display_rate {:?}", rate))
            })
            .transpose()
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            timeout: Duration::from_millis(self.fetch.timeout_ms),
            token_decimals: TOKEN_DECIMALS,
        }
    }
}
