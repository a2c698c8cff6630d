//! Data collaborators and the per-chain fan-out
//!
//! Chain reads and pool lookups live behind these traits. Every chain in a
//! chain-group is read concurrently with its own timeout; a read that fails
//! or times out becomes an "unavailable" entry so one slow chain never
//! blocks the others.

use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use revnet_core::prelude::*;
use revnet_core::TOKEN_DECIMALS;
use tracing::{debug, warn};

use crate::quotes::PoolLookup;

/// Reads a project's surplus, supply and pending reserved tokens on one chain
#[async_trait]
pub trait SurplusSource: Send + Sync {
    /// Source name for logs
    fn name(&self) -> &str;

    async fn read_surplus(&self, config: &ChainTokenConfig) -> Result<SurplusRecord>;
}

/// Looks up the best external liquidity-pool quote on one chain
#[async_trait]
pub trait PoolPriceSource: Send + Sync {
    /// Source name for logs
    fn name(&self) -> &str;

    async fn best_pool_quote(
        &self,
        chain_id: ChainId,
        amount_in: &FixedAmount,
    ) -> Result<PoolLookup>;
}

/// Fan-out settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchOptions {
    /// Per-chain deadline
    pub timeout: Duration,
    /// Precision of placeholder supply figures for unavailable chains
    pub token_decimals: u8,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            token_decimals: TOKEN_DECIMALS,
        }
    }
}

/// Read every chain-group member in parallel
///
/// Returns one record per config, in config order.
pub async fn fetch_surplus_records(
    source: &dyn SurplusSource,
    configs: &[ChainTokenConfig],
    options: &FetchOptions,
) -> Vec<SurplusRecord> {
    let reads = configs.iter().map(|config| async move {
        match tokio::time::timeout(options.timeout, source.read_surplus(config)).await {
            Ok(Ok(record)) => record,
            Ok(Err(e)) => {
                warn!(
                    source = source.name(),
                    chain = %config.chain_id,
                    error = %e,
                    "surplus read failed"
                );
                unavailable(config, options)
            }
            Err(_) => {
                warn!(
                    source = source.name(),
                    chain = %config.chain_id,
                    timeout_ms = options.timeout.as_millis() as u64,
                    "surplus read timed out"
                );
                unavailable(config, options)
            }
        }
    });

    let records = join_all(reads).await;
    debug!(
        source = source.name(),
        chains = records.len(),
        available = records.iter().filter(|r| r.is_available()).count(),
        "fetched surplus"
    );
    records
}

fn unavailable(config: &ChainTokenConfig, options: &FetchOptions) -> SurplusRecord {
    SurplusRecord::unavailable(config.chain_id, config.project_id, options.token_decimals)
}

/// Ask every chain for a pool quote in parallel
///
/// Returns one lookup per chain, in input order.
pub async fn fetch_pool_quotes(
    source: &dyn PoolPriceSource,
    chains: &[ChainId],
    amount_in: &FixedAmount,
    options: &FetchOptions,
) -> Vec<(ChainId, PoolLookup)> {
    let lookups = chains.iter().map(|&chain_id| async move {
        let read = source.best_pool_quote(chain_id, amount_in);
        let lookup = match tokio::time::timeout(options.timeout, read).await {
            Ok(Ok(lookup)) => lookup,
            Ok(Err(e)) => {
                warn!(source = source.name(), chain = %chain_id, error = %e, "pool lookup failed");
                PoolLookup::Unavailable
            }
            Err(_) => {
                warn!(source = source.name(), chain = %chain_id, "pool lookup timed out");
                PoolLookup::Unavailable
            }
        };
        (chain_id, lookup)
    });

    join_all(lookups).await
}
