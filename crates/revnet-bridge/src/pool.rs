//! Spot pricing from concentrated-liquidity pools
//!
//! A pool reports its price as `sqrtPriceX96 = sqrt(token1 / token0) * 2^96`
//! in raw units. The output for a small trade is the input, less the pool
//! fee, multiplied by the squared price. Price impact is ignored, so this is
//! an upper bound for large trades.

use revnet_core::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::quotes::PoolLookup;

/// Denominator of `fee_tier` (hundredths of a basis point)
pub const FEE_DENOMINATOR: u32 = 1_000_000;

fn q96() -> U256 {
    U256::one() << 96
}

/// Pool state as read from the chain
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolState {
    pub descriptor: PoolDescriptor,
    pub sqrt_price_x96: U256,
    /// Whether the project token is token1, i.e. buying it swaps 0 for 1
    pub project_token_is_token1: bool,
}

/// Raw output for `amount_in` raw input units at the pool's spot price
pub fn spot_quote_from_sqrt_price(
    amount_in: U256,
    sqrt_price_x96: U256,
    fee_tier: u32,
    zero_for_one: bool,
) -> Result<U256> {
    if fee_tier > FEE_DENOMINATOR {
        return Err(PricingError::InvalidInput(format!(
            "fee tier {} exceeds {}",
            fee_tier, FEE_DENOMINATOR
        )));
    }
    if sqrt_price_x96.is_zero() {
        return Err(PricingError::InvalidState("pool has no price".into()));
    }

    let after_fee = mul_div(
        amount_in,
        U256::from(FEE_DENOMINATOR - fee_tier),
        U256::from(FEE_DENOMINATOR),
    )?;
    // Two steps keep every intermediate within 512 bits
    if zero_for_one {
        mul_div(mul_div(after_fee, sqrt_price_x96, q96())?, sqrt_price_x96, q96())
    } else {
        mul_div(mul_div(after_fee, q96(), sqrt_price_x96)?, q96(), sqrt_price_x96)
    }
}

/// Price buying project tokens with `amount_in` through one pool
pub fn pool_quote(
    chain_id: ChainId,
    amount_in: &FixedAmount,
    pool: &PoolState,
    token_decimals: u8,
) -> Result<PoolLookup> {
    if pool.descriptor.liquidity == 0 {
        debug!(chain = %chain_id, pool = %pool.descriptor.address, "pool has no liquidity");
        return Ok(PoolLookup::InsufficientLiquidity);
    }

    let out = spot_quote_from_sqrt_price(
        amount_in.value(),
        pool.sqrt_price_x96,
        pool.descriptor.fee_tier,
        pool.project_token_is_token1,
    )?;
    if out.is_zero() && !amount_in.is_zero() {
        return Ok(PoolLookup::InsufficientLiquidity);
    }

    Ok(PoolLookup::Found(Quote::pool(
        chain_id,
        *amount_in,
        FixedAmount::new(out, token_decimals),
        pool.descriptor.clone(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(sqrt_price_x96: U256, liquidity: u128, fee_tier: u32) -> PoolState {
        PoolState {
            descriptor: PoolDescriptor {
                address: Address::from_hex("0x2222222222222222222222222222222222222222").unwrap(),
                fee_tier,
                liquidity,
            },
            sqrt_price_x96,
            project_token_is_token1: true,
        }
    }

    #[test]
    fn test_unit_price() {
        let out = spot_quote_from_sqrt_price(U256::from(1_000u64), q96(), 0, true).unwrap();
        assert_eq!(out, U256::from(1_000u64));
    }

    #[test]
    fn test_price_direction() {
        // sqrt price 2 means 4 token1 per token0
        let sqrt = q96() * U256::from(2u8);
        assert_eq!(
            spot_quote_from_sqrt_price(U256::from(100u64), sqrt, 0, true).unwrap(),
            U256::from(400u64)
        );
        assert_eq!(
            spot_quote_from_sqrt_price(U256::from(400u64), sqrt, 0, false).unwrap(),
            U256::from(100u64)
        );
    }

    #[test]
    fn test_fee_applied() {
        // 0.3% fee
        let out = spot_quote_from_sqrt_price(U256::from(1_000_000u64), q96(), 3_000, true).unwrap();
        assert_eq!(out, U256::from(997_000u64));
    }

    #[test]
    fn test_bad_pool_inputs() {
        assert!(matches!(
            spot_quote_from_sqrt_price(U256::one(), q96(), 1_000_001, true),
            Err(PricingError::InvalidInput(_))
        ));
        assert!(matches!(
            spot_quote_from_sqrt_price(U256::one(), U256::zero(), 500, true),
            Err(PricingError::InvalidState(_))
        ));
    }

    #[test]
    fn test_pool_quote_lookup() {
        let amount = FixedAmount::parse("1", 18).unwrap();
        let pool = state(q96() * U256::from(3u8), 10_000, 0);
        match pool_quote(ChainId(10), &amount, &pool, 18).unwrap() {
            PoolLookup::Found(quote) => {
                assert_eq!(quote.kind, QuoteKind::Pool);
                assert_eq!(quote.payer_tokens.to_string(), "9");
                assert_eq!(quote.pool.unwrap().liquidity, 10_000);
            }
            other => panic!("expected a quote, got {:?}", other),
        }

        assert_eq!(
            pool_quote(ChainId(10), &amount, &state(q96(), 0, 0), 18).unwrap(),
            PoolLookup::InsufficientLiquidity
        );
    }
}
