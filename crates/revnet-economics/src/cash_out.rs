//! # Cash-Out Quote
//!
//! Base asset reclaimable by cashing out project tokens against the surplus.
//!
//! ```text
//! s      = total_supply + reserved_tokens      (pending reserved tokens dilute holders)
//! base   = surplus × x / s                     (pro-rata share)
//! factor = (1 − t) + t × x / s                 (bonding curve, t = tax rate)
//! payout = base × factor
//! ```
//!
//! With `t = 0` the payout is exactly the pro-rata share. As `t` grows,
//! small cash-outs are penalised more than large ones. Cashing out the
//! whole effective supply always reclaims the whole surplus.
//!
//! Intermediate steps truncate the way terminals do on-chain, so a quote
//! never promises more than the terminal pays.

use revnet_core::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Surplus-side inputs of a cash-out quote, all raw integer amounts
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashOutParams {
    pub surplus: U256,
    pub total_supply: U256,
    pub cash_out_tax_rate: Percent,
    pub reserved_tokens: U256,
}

/// Base asset reclaimable for `token_amount` raw project tokens
///
/// The result is in the surplus's units.
pub fn cash_out_quote(token_amount: U256, params: &CashOutParams) -> Result<U256> {
    if token_amount.is_zero() || params.surplus.is_zero() {
        return Ok(U256::zero());
    }

    let effective_supply = params
        .total_supply
        .checked_add(params.reserved_tokens)
        .ok_or_else(|| PricingError::Overflow("total supply + reserved tokens".into()))?;
    if effective_supply.is_zero() {
        return Err(PricingError::InvalidState(
            "cash out against zero effective supply".into(),
        ));
    }
    if token_amount >= effective_supply {
        return Ok(params.surplus);
    }

    let base = mul_div(params.surplus, token_amount, effective_supply)?;
    let tax = params.cash_out_tax_rate;
    if tax.is_zero() {
        return Ok(base);
    }

    let factor =
        tax.complement().numerator() + mul_div(tax.numerator(), token_amount, effective_supply)?;
    let payout = mul_div(base, factor, tax.denominator())?;

    debug!(%token_amount, %effective_supply, %base, %payout, tax = %tax, "cash out quote");
    Ok(payout)
}

/// Value of cashing out one whole token (the floor price)
pub fn cash_out_value_per_token(params: &CashOutParams, token_decimals: u8) -> Result<U256> {
    cash_out_quote(pow10(token_decimals)?, params)
}

/// Single-chain cash-out quote straight from a surplus reading
///
/// A missing reading is the only data source here, so `DataUnavailable`
/// propagates to the caller.
pub fn cash_out_from_record(
    token_amount: &FixedAmount,
    record: &SurplusRecord,
    cash_out_tax_rate: Percent,
) -> Result<FixedAmount> {
    let surplus = record.require_surplus()?;
    let supply_decimals = record.total_supply.decimals();

    let params = CashOutParams {
        surplus: surplus.value(),
        total_supply: record.total_supply.value(),
        cash_out_tax_rate,
        reserved_tokens: record.reserved_tokens.rescale(supply_decimals)?.value(),
    };
    let tokens = token_amount.rescale(supply_decimals)?.value();
    Ok(FixedAmount::new(cash_out_quote(tokens, &params)?, surplus.decimals()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use revnet_core::MAX_CASH_OUT_TAX_RATE;

    fn params(surplus: u64, supply: u64, tax: u64, reserved: u64) -> CashOutParams {
        CashOutParams {
            surplus: U256::from(surplus),
            total_supply: U256::from(supply),
            cash_out_tax_rate: Percent::cash_out_tax_rate(tax).unwrap(),
            reserved_tokens: U256::from(reserved),
        }
    }

    #[test]
    fn test_untaxed_is_pro_rata() {
        // 10% of supply with no tax reclaims 10% of surplus
        let payout = cash_out_quote(U256::from(100u64), &params(1_000, 1_000, 0, 0)).unwrap();
        assert_eq!(payout, U256::from(100u64));
    }

    #[test]
    fn test_full_tax_curve() {
        // t = 1: factor = x/s = 0.1, payout = 100 × 0.1
        let payout = cash_out_quote(
            U256::from(100u64),
            &params(1_000, 1_000, MAX_CASH_OUT_TAX_RATE, 0),
        )
        .unwrap();
        assert_eq!(payout, U256::from(10u64));
    }

    #[test]
    fn test_partial_tax() {
        // t = 0.5, x/s = 0.1: factor = 0.5 + 0.05 = 0.55, base = 100
        let payout = cash_out_quote(U256::from(100u64), &params(1_000, 1_000, 5_000, 0)).unwrap();
        assert_eq!(payout, U256::from(55u64));
    }

    #[test]
    fn test_reserved_tokens_dilute() {
        let without = cash_out_quote(U256::from(100u64), &params(1_000, 900, 0, 0)).unwrap();
        let with = cash_out_quote(U256::from(100u64), &params(1_000, 900, 0, 100)).unwrap();
        assert_eq!(with, U256::from(100u64));
        assert!(with < without);
    }

    #[test]
    fn test_zero_inputs() {
        assert!(cash_out_quote(U256::zero(), &params(1_000, 1_000, 0, 0)).unwrap().is_zero());
        assert!(cash_out_quote(U256::from(5u8), &params(0, 1_000, 0, 0)).unwrap().is_zero());
    }

    #[test]
    fn test_zero_supply_is_invalid_state() {
        assert!(matches!(
            cash_out_quote(U256::from(5u8), &params(1_000, 0, 0, 0)),
            Err(PricingError::InvalidState(_))
        ));
    }

    #[test]
    fn test_whole_supply_reclaims_surplus() {
        let p = params(1_000, 800, 6_000, 200);
        assert_eq!(cash_out_quote(U256::from(1_000u64), &p).unwrap(), U256::from(1_000u64));
        assert_eq!(cash_out_quote(U256::from(5_000u64), &p).unwrap(), U256::from(1_000u64));
    }

    #[test]
    fn test_value_per_token() {
        let p = CashOutParams {
            surplus: FixedAmount::parse("10", 18).unwrap().value(),
            total_supply: FixedAmount::parse("1000", 18).unwrap().value(),
            cash_out_tax_rate: Percent::zero(MAX_CASH_OUT_TAX_RATE),
            reserved_tokens: U256::zero(),
        };
        let floor = cash_out_value_per_token(&p, 18).unwrap();
        assert_eq!(FixedAmount::new(floor, 18).to_string(), "0.01");
    }

    #[test]
    fn test_from_record() {
        let record = SurplusRecord {
            chain_id: ChainId(10),
            project_id: 4,
            surplus: Some(FixedAmount::parse("1000", 6).unwrap()),
            total_supply: FixedAmount::parse("1000", 18).unwrap(),
            reserved_tokens: FixedAmount::zero(18),
        };
        let tokens = FixedAmount::parse("100", 18).unwrap();
        let payout =
            cash_out_from_record(&tokens, &record, Percent::zero(MAX_CASH_OUT_TAX_RATE)).unwrap();
        assert_eq!(payout.decimals(), 6);
        assert_eq!(payout.to_string(), "100");

        let missing = SurplusRecord::unavailable(ChainId(10), 4, 18);
        assert!(matches!(
            cash_out_from_record(&tokens, &missing, Percent::zero(MAX_CASH_OUT_TAX_RATE)),
            Err(PricingError::DataUnavailable(_))
        ));
    }
}
