//! Ruleset reads from either protocol generation
//!
//! Legacy deployments name the curve parameters `discountRate`,
//! `reservedRate` and `redemptionRate`; current ones use `weightCutPercent`,
//! `reservedPercent` and `cashOutTaxRate`. A redemption rate is the
//! complement of a tax rate. Both shapes convert into one `Ruleset` here so
//! the pricing functions only ever see one parameterization.

use revnet_core::prelude::*;
use revnet_core::{MAX_CASH_OUT_TAX_RATE, MAX_RESERVED_PERCENT, MAX_WEIGHT_CUT_PERCENT};
use serde::{Deserialize, Serialize};

/// Scale of a legacy `reservedRate`
pub const MAX_RESERVED_RATE: u64 = 10_000;

/// Scale of a legacy `discountRate`
pub const MAX_DISCOUNT_RATE: u64 = 1_000_000_000;

/// Scale of a legacy `redemptionRate`
pub const MAX_REDEMPTION_RATE: u64 = 10_000;

/// Current-generation ruleset as returned by the ruleset store
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesetV4Read {
    pub id: u64,
    pub start: u64,
    pub duration: u64,
    #[serde(default)]
    pub weight: Option<FixedAmount>,
    pub weight_cut_percent: u64,
    pub reserved_percent: u64,
    pub cash_out_tax_rate: u64,
}

/// Legacy funding cycle as returned by older stores
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyRulesetRead {
    pub number: u64,
    pub start: u64,
    pub duration: u64,
    #[serde(default)]
    pub weight: Option<FixedAmount>,
    pub discount_rate: u64,
    pub reserved_rate: u64,
    pub redemption_rate: u64,
}

/// A ruleset read tagged with its protocol generation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "version", rename_all = "lowercase")]
pub enum RulesetRead {
    V2(LegacyRulesetRead),
    V3(LegacyRulesetRead),
    V4(RulesetV4Read),
}

impl RulesetRead {
    /// Normalize into a validated `Ruleset`
    pub fn into_ruleset(self) -> Result<Ruleset> {
        let ruleset = match self {
            RulesetRead::V4(read) => Ruleset {
                id: read.id,
                start: read.start,
                duration: read.duration,
                weight: require_weight(read.weight, read.id)?,
                weight_cut_percent: Percent::weight_cut_percent(read.weight_cut_percent)
                    .map_err(|e| invalid(read.id, e))?,
                reserved_percent: Percent::reserved_percent(read.reserved_percent)
                    .map_err(|e| invalid(read.id, e))?,
                cash_out_tax_rate: Percent::cash_out_tax_rate(read.cash_out_tax_rate)
                    .map_err(|e| invalid(read.id, e))?,
            },
            RulesetRead::V2(read) | RulesetRead::V3(read) => {
                let id = read.number;
                let redemption = Percent::new(read.redemption_rate, MAX_REDEMPTION_RATE)
                    .map_err(|e| invalid(id, e))?;
                Ruleset {
                    id,
                    start: read.start,
                    duration: read.duration,
                    weight: require_weight(read.weight, id)?,
                    weight_cut_percent: rescale(
                        read.discount_rate,
                        MAX_DISCOUNT_RATE,
                        MAX_WEIGHT_CUT_PERCENT,
                    )
                        .map_err(|e| invalid(id, e))?,
                    reserved_percent: rescale(
                        read.reserved_rate,
                        MAX_RESERVED_RATE,
                        MAX_RESERVED_PERCENT,
                    )
                        .map_err(|e| invalid(id, e))?,
                    cash_out_tax_rate: rescale(
                        redemption.complement().value(),
                        MAX_REDEMPTION_RATE,
                        MAX_CASH_OUT_TAX_RATE,
                    )
                    .map_err(|e| invalid(id, e))?,
                }
            }
        };
        ruleset.validate()?;
        Ok(ruleset)
    }
}

impl TryFrom<RulesetRead> for Ruleset {
    type Error = PricingError;

    fn try_from(read: RulesetRead) -> Result<Self> {
        read.into_ruleset()
    }
}

fn require_weight(weight: Option<FixedAmount>, id: u64) -> Result<FixedAmount> {
    weight.ok_or_else(|| PricingError::InvalidRuleset(format!("ruleset {} has no weight", id)))
}

fn invalid(id: u64, err: PricingError) -> PricingError {
    PricingError::InvalidRuleset(format!("ruleset {}: {}", id, err))
}

fn rescale(value: u64, from_max: u64, to_max: u64) -> Result<Percent> {
    if value > from_max {
        return Err(PricingError::InvalidInput(format!("{} exceeds scale {}", value, from_max)));
    }
    let scaled = value as u128 * to_max as u128 / from_max as u128;
    Percent::new(scaled as u64, to_max)
}
