//! # Issuance Quote
//!
//! Tokens minted for a contribution of base asset.
//!
//! ```text
//! total    = weight × amount_in / 10^base_decimals
//! reserved = total × reserved_percent
//! payer    = total − reserved
//! ```
//!
//! Every division truncates and `payer` is derived by subtraction, so
//! `payer + reserved == total` and no token is created by rounding.

use revnet_core::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Curve inputs for an issuance quote
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuanceParams {
    /// Tokens per whole base unit
    pub weight: FixedAmount,
    pub reserved_percent: Percent,
}

impl From<&Ruleset> for IssuanceParams {
    fn from(ruleset: &Ruleset) -> Self {
        Self {
            weight: ruleset.weight,
            reserved_percent: ruleset.reserved_percent,
        }
    }
}

/// Split of newly minted tokens
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuanceQuote {
    pub total_tokens: FixedAmount,
    pub reserved_tokens: FixedAmount,
    pub payer_tokens: FixedAmount,
}

impl IssuanceQuote {
    fn zero(decimals: u8) -> Self {
        Self {
            total_tokens: FixedAmount::zero(decimals),
            reserved_tokens: FixedAmount::zero(decimals),
            payer_tokens: FixedAmount::zero(decimals),
        }
    }

    /// Comparator entry for this quote
    pub fn to_quote(&self, chain_id: ChainId, amount_in: FixedAmount) -> Quote {
        Quote::issuance(chain_id, amount_in, self.payer_tokens)
    }
}

/// Quote minting for `amount_in` raw base units
///
/// Token amounts carry the weight's decimals.
pub fn issuance_quote(
    amount_in: U256,
    base_decimals: u8,
    params: &IssuanceParams,
) -> Result<IssuanceQuote> {
    let decimals = params.weight.decimals();
    if amount_in.is_zero() {
        return Ok(IssuanceQuote::zero(decimals));
    }

    let total = mul_div(params.weight.value(), amount_in, pow10(base_decimals)?)?;
    let reserved = mul_div(
        total,
        params.reserved_percent.numerator(),
        params.reserved_percent.denominator(),
    )?;
    let payer = total - reserved;

    debug!(%amount_in, base_decimals, weight = %params.weight, %total, %reserved, "issuance quote");

    Ok(IssuanceQuote {
        total_tokens: FixedAmount::new(total, decimals),
        reserved_tokens: FixedAmount::new(reserved, decimals),
        payer_tokens: FixedAmount::new(payer, decimals),
    })
}

/// Base asset needed to mint one whole token, None while issuance is paused
pub fn issuance_price(weight: &FixedAmount, base_decimals: u8) -> Result<Option<FixedAmount>> {
    if weight.is_zero() {
        return Ok(None);
    }
    let price = mul_div(
        pow10(base_decimals)?,
        pow10(weight.decimals())?,
        weight.value(),
    )?;
    Ok(Some(FixedAmount::new(price, base_decimals)))
}

/// Smallest contribution (raw base units) whose payer share is at least `target`
///
/// None when no contribution can reach the target: issuance paused or every
/// minted token reserved.
pub fn amount_for_payer_tokens(
    target: U256,
    base_decimals: u8,
    params: &IssuanceParams,
) -> Result<Option<U256>> {
    if target.is_zero() {
        return Ok(Some(U256::zero()));
    }
    let payer_share = params.reserved_percent.complement();
    if params.weight.is_zero() || payer_share.is_zero() {
        return Ok(None);
    }

    let total_needed = mul_div_ceil(target, payer_share.denominator(), payer_share.numerator())?;
    let amount = mul_div_ceil(total_needed, pow10(base_decimals)?, params.weight.value())?;
    Ok(Some(amount))
}
