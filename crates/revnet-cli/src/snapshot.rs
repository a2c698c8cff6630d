//! Snapshot of chain reads
//!
//! The CLI never talks to a chain. It prices from a JSON file holding what
//! the chain-read and pool-lookup collaborators returned, served back
//! through the same source traits a live reader implements.

use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use revnet_bridge::{
    pool_quote, ConversionRates, PoolLookup, PoolPriceSource, PoolState, SurplusSource,
};
use revnet_core::prelude::*;
use revnet_core::TOKEN_DECIMALS;
use revnet_economics::RulesetRead;
use serde::{Deserialize, Serialize};

/// Ruleset read on one chain
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainRuleset {
    pub chain_id: ChainId,
    pub ruleset: RulesetRead,
}

/// Pool state read on one chain
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainPool {
    pub chain_id: ChainId,
    pub pool: PoolState,
}

/// Everything read for one revnet
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub project_id: ProjectId,
    #[serde(default)]
    pub rulesets: Vec<ChainRuleset>,
    #[serde(default)]
    pub token_configs: Vec<ChainTokenConfig>,
    #[serde(default)]
    pub surplus_records: Vec<SurplusRecord>,
    #[serde(default)]
    pub pools: Vec<ChainPool>,
    /// Oracle rates for chain-groups holding mixed assets
    #[serde(default)]
    pub rates: Option<ConversionRates>,
}

impl Snapshot {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading snapshot {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("parsing snapshot {}", path.display()))
    }

    /// Normalized ruleset for a chain
    pub fn ruleset(&self, chain_id: ChainId) -> Result<Ruleset> {
        self.rulesets
            .iter()
            .find(|r| r.chain_id == chain_id)
            .ok_or_else(|| {
                PricingError::DataUnavailable(format!("no ruleset for chain {}", chain_id))
            })?
            .ruleset
            .clone()
            .into_ruleset()
    }

    /// Token config of this snapshot's project on a chain
    pub fn token_config(&self, chain_id: ChainId) -> Result<&ChainTokenConfig> {
        self.token_configs
            .iter()
            .find(|c| c.chain_id == chain_id && c.project_id == self.project_id)
            .ok_or_else(|| {
                PricingError::DataUnavailable(format!(
                    "no token config for project {} on chain {}",
                    self.project_id, chain_id
                ))
            })
    }

    pub fn chains(&self) -> Vec<ChainId> {
        self.token_configs
            .iter()
            .filter(|c| c.project_id == self.project_id)
            .map(|c| c.chain_id)
            .collect()
    }
}

#[async_trait]
impl SurplusSource for Snapshot {
    fn name(&self) -> &str {
        "snapshot"
    }

    async fn read_surplus(&self, config: &ChainTokenConfig) -> Result<SurplusRecord> {
        self.surplus_records
            .iter()
            .find(|r| r.chain_id == config.chain_id && r.project_id == config.project_id)
            .cloned()
            .ok_or_else(|| {
                PricingError::DataUnavailable(format!(
                    "no surplus for project {} on chain {}",
                    config.project_id, config.chain_id
                ))
            })
    }
}

#[async_trait]
impl PoolPriceSource for Snapshot {
    fn name(&self) -> &str {
        "snapshot"
    }

    async fn best_pool_quote(
        &self,
        chain_id: ChainId,
        amount_in: &FixedAmount,
    ) -> Result<PoolLookup> {
        let mut best: Option<Quote> = None;
        let mut any_pool = false;
        for entry in self.pools.iter().filter(|p| p.chain_id == chain_id) {
            any_pool = true;
            let lookup = pool_quote(chain_id, amount_in, &entry.pool, TOKEN_DECIMALS)?;
            if let PoolLookup::Found(quote) = lookup {
                let better = best
                    .as_ref()
                    .map(|b| quote.payer_tokens.compare(&b.payer_tokens).is_gt())
                    .unwrap_or(true);
                if better {
                    best = Some(quote);
                }
            }
        }
        Ok(match (best, any_pool) {
            (Some(quote), _) => PoolLookup::Found(quote),
            (None, true) => PoolLookup::InsufficientLiquidity,
            (None, false) => PoolLookup::Unavailable,
        })
    }
}
