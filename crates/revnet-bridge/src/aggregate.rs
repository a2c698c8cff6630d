//! # Cross-Chain Surplus Aggregation
//!
//! Folds one `SurplusRecord` per chain instance into a single figure for the
//! chain-group.
//!
//! - all-native and all-stable groups are summed directly after rescaling to
//!   the finest precision present
//! - mixed groups get no total from `aggregate`; `aggregate_converted` sums
//!   them through caller-supplied rates instead
//! - a chain whose read did not resolve stays in `per_chain` as
//!   `Unavailable` and the result is marked `partial`
//! - `ChainSurplus::included` marks exactly the chains summed into `total`

use std::collections::HashMap;

use revnet_core::prelude::*;
use revnet_economics::{cash_out_quote, CashOutParams};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::chains::{classify_asset, classify_group, AssetClass, GroupClass};

/// Surplus reading of one chain instance
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "surplus", rename_all = "lowercase")]
pub enum ChainReading {
    Available(FixedAmount),
    Unavailable,
}

impl ChainReading {
    pub fn amount(&self) -> Option<&FixedAmount> {
        match self {
            ChainReading::Available(amount) => Some(amount),
            ChainReading::Unavailable => None,
        }
    }
}

/// One chain's contribution to an aggregate
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSurplus {
    pub chain_id: ChainId,
    pub asset: AssetClass,
    pub reading: ChainReading,
    /// Counted in the aggregate's total
    pub included: bool,
}

/// Surplus of a whole chain-group
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurplusAggregate {
    /// None when the members cannot be summed into one unit
    pub total: Option<FixedAmount>,
    pub classification: GroupClass,
    /// In chain-group membership order
    pub per_chain: Vec<ChainSurplus>,
    /// At least one chain was excluded
    pub partial: bool,
    /// Members hold different asset types
    pub imprecise: bool,
    /// Total is already in the conversion rates' unit
    #[serde(default)]
    pub converted: bool,
}

impl SurplusAggregate {
    /// Total converted with an exchange rate from the surplus unit
    ///
    /// Keeps the total's precision. None when there is no total, or when the
    /// total came from `aggregate_converted` and is no longer in the surplus
    /// unit.
    pub fn in_display_currency(&self, rate: &FixedAmount) -> Result<Option<FixedAmount>> {
        if self.converted {
            return Ok(None);
        }
        self.total.map(|total| total.mul_amount(rate)).transpose()
    }

    /// Chains summed into the total
    pub fn included_chains(&self) -> impl Iterator<Item = ChainId> + '_ {
        self.per_chain.iter().filter(|c| c.included).map(|c| c.chain_id)
    }
}

/// Fold per-chain surplus readings into one chain-group total
pub fn aggregate(
    records: &[SurplusRecord],
    token_configs: &[ChainTokenConfig],
) -> Result<SurplusAggregate> {
    let classification = classify_group(token_configs)
        .ok_or_else(|| PricingError::DataUnavailable("chain-group has no members".into()))?;
    let mut per_chain = collect_readings(records, token_configs)?;
    let partial = per_chain.iter().any(|c| !c.included);

    if classification == GroupClass::Mixed {
        debug!(chains = per_chain.len(), "mixed asset group, no total");
        for chain in &mut per_chain {
            chain.included = false;
        }
        return Ok(SurplusAggregate {
            total: None,
            classification,
            per_chain,
            partial,
            imprecise: true,
            converted: false,
        });
    }

    let total = sum_finest(per_chain.iter().filter_map(|c| c.reading.amount().copied()))?;
    debug!(total = %total, ?classification, partial, "aggregated surplus");

    Ok(SurplusAggregate {
        total: Some(total),
        classification,
        per_chain,
        partial,
        imprecise: false,
        converted: false,
    })
}

/// Exchange rates into one common unit, supplied by a price oracle
///
/// A per-chain rate wins over the rate for the chain's asset class.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRates {
    #[serde(default)]
    pub by_class: HashMap<AssetClass, FixedAmount>,
    #[serde(default)]
    pub by_chain: HashMap<ChainId, FixedAmount>,
    /// Precision of the converted total
    pub decimals: u8,
}

impl ConversionRates {
    pub fn new(decimals: u8) -> Self {
        Self {
            decimals,
            ..Self::default()
        }
    }

    pub fn with_class_rate(mut self, class: AssetClass, rate: FixedAmount) -> Self {
        self.by_class.insert(class, rate);
        self
    }

    pub fn with_chain_rate(mut self, chain_id: ChainId, rate: FixedAmount) -> Self {
        self.by_chain.insert(chain_id, rate);
        self
    }

    fn rate_for(&self, chain: &ChainSurplus) -> Option<&FixedAmount> {
        let rate = self
            .by_chain
            .get(&chain.chain_id)
            .or_else(|| self.by_class.get(&chain.asset));
        if rate.is_none() {
            warn!(
                chain = %chain.chain_id,
                asset = ?chain.asset,
                "no conversion rate, chain excluded"
            );
        }
        rate
    }
}

/// Aggregate any chain-group by converting every member into one unit first
///
/// A chain without a rate is left out of the total like an unavailable
/// reading. The result is never imprecise.
pub fn aggregate_converted(
    records: &[SurplusRecord],
    token_configs: &[ChainTokenConfig],
    rates: &ConversionRates,
) -> Result<SurplusAggregate> {
    let classification = classify_group(token_configs)
        .ok_or_else(|| PricingError::DataUnavailable("chain-group has no members".into()))?;
    let mut per_chain = collect_readings(records, token_configs)?;

    let mut partial = false;
    let mut total = FixedAmount::zero(rates.decimals);
    for chain in &mut per_chain {
        let Some(amount) = chain.reading.amount().copied() else {
            partial = true;
            continue;
        };
        let Some(rate) = rates.rate_for(chain) else {
            chain.included = false;
            partial = true;
            continue;
        };
        let converted = amount.mul_amount(rate)?.rescale(rates.decimals)?;
        total = total.checked_add(&converted)?;
    }

    debug!(total = %total, ?classification, partial, "aggregated converted surplus");
    Ok(SurplusAggregate {
        total: Some(total),
        classification,
        per_chain,
        partial,
        imprecise: false,
        converted: true,
    })
}

/// Cash-out quote against the pooled surplus of the chains in the total
///
/// Supply and pending reserved tokens are summed over the chains marked
/// `included`, the same ones that contributed to `aggregate.total`.
pub fn cross_chain_cash_out_quote(
    token_amount: &FixedAmount,
    aggregate: &SurplusAggregate,
    records: &[SurplusRecord],
    cash_out_tax_rate: Percent,
) -> Result<FixedAmount> {
    let surplus = aggregate.total.ok_or_else(|| {
        PricingError::InvalidState("cash out against a chain-group without a total".into())
    })?;

    let included: Vec<&SurplusRecord> = aggregate
        .included_chains()
        .filter_map(|chain| records.iter().find(|r| r.chain_id == chain))
        .collect();
    let supply = sum_finest(included.iter().map(|r| r.total_supply))?;
    let reserved = sum_finest(included.iter().map(|r| r.reserved_tokens))?;

    let decimals = supply.decimals().max(reserved.decimals()).max(token_amount.decimals());
    let params = CashOutParams {
        surplus: surplus.value(),
        total_supply: supply.rescale(decimals)?.value(),
        cash_out_tax_rate,
        reserved_tokens: reserved.rescale(decimals)?.value(),
    };
    let payout = cash_out_quote(token_amount.rescale(decimals)?.value(), &params)?;
    Ok(FixedAmount::new(payout, surplus.decimals()))
}

fn collect_readings(
    records: &[SurplusRecord],
    token_configs: &[ChainTokenConfig],
) -> Result<Vec<ChainSurplus>> {
    if token_configs.is_empty() {
        return Err(PricingError::DataUnavailable("chain-group has no members".into()));
    }

    for record in records {
        if !token_configs.iter().any(|c| c.chain_id == record.chain_id) {
            warn!(chain = %record.chain_id, "surplus record outside the chain-group, ignored");
        }
    }

    let per_chain: Vec<ChainSurplus> = token_configs
        .iter()
        .map(|config| {
            let reading = records
                .iter()
                .find(|r| r.chain_id == config.chain_id)
                .and_then(|r| r.surplus)
                .map(ChainReading::Available)
                .unwrap_or(ChainReading::Unavailable);
            if reading == ChainReading::Unavailable {
                warn!(chain = %config.chain_id, "surplus unavailable, chain excluded");
            }
            ChainSurplus {
                chain_id: config.chain_id,
                asset: classify_asset(config),
                included: reading != ChainReading::Unavailable,
                reading,
            }
        })
        .collect();

    if per_chain.iter().all(|c| c.reading == ChainReading::Unavailable) {
        return Err(PricingError::DataUnavailable(
            "no chain in the group reported a surplus".into(),
        ));
    }
    Ok(per_chain)
}

/// Sum at the finest precision present, zero at 0 decimals when empty
fn sum_finest(amounts: impl Iterator<Item = FixedAmount>) -> Result<FixedAmount> {
    amounts.fold(Ok(FixedAmount::zero(0)), |acc, amount| acc?.checked_add(&amount))
}
