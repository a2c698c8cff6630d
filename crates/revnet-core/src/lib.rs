//! # Revnet Core
//!
//! Value types shared by every part of the revnet pricing engine.
//!
//! - `FixedAmount` - 256-bit integer tagged with a decimal exponent, used for
//!   every token and currency quantity
//! - `Percent` - bounded fraction expressed on one of the protocol's scales
//! - `Ruleset`, `ChainTokenConfig`, `SurplusRecord`, `Quote` - immutable
//!   snapshots of what the chain-read and indexer collaborators return
//!
//! Nothing in this crate performs I/O. Values are rebuilt from fresh reads
//! and never mutated in place.
//!
//! ```text
//!   chain reads / indexer ──► Ruleset, SurplusRecord, ChainTokenConfig
//!                                      │
//!                                      ▼
//!              weight curve · issuance · cash-out · aggregate · compare
//!                                      │
//!                                      ▼
//!                          Quote, SurplusAggregate ──► UI
//! ```

pub mod amount;
pub mod error;
pub mod percent;
pub mod types;

pub use amount::*;
pub use error::*;
pub use percent::*;
pub use types::*;

/// Protocol constants
pub mod constants {
    use crate::types::Address;

    /// Decimals of a ruleset weight (tokens minted per whole base unit)
    pub const WEIGHT_DECIMALS: u8 = 18;

    /// Decimals of every project token
    pub const TOKEN_DECIMALS: u8 = 18;

    /// Scale of `reserved_percent`
    pub const MAX_RESERVED_PERCENT: u64 = 10_000;

    /// Scale of `cash_out_tax_rate`
    pub const MAX_CASH_OUT_TAX_RATE: u64 = 10_000;

    /// Scale of `weight_cut_percent`
    pub const MAX_WEIGHT_CUT_PERCENT: u64 = 1_000_000_000;

    /// Sentinel address terminals use for the chain's native coin
    pub const NATIVE_TOKEN: Address = Address::new([
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xEE, 0xEE,
    ]);

    /// Currency code derived from `NATIVE_TOKEN` (low 32 bits of the address)
    pub const NATIVE_CURRENCY: u32 = 61_166;

    /// Abstract ETH currency code used by price feeds
    pub const ETH_CURRENCY: u32 = 1;

    /// Abstract USD currency code used by price feeds
    pub const USD_CURRENCY: u32 = 2;
}

pub use constants::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::amount::{mul_div, mul_div_ceil, pow10, FixedAmount};
    pub use crate::error::{PricingError, Result};
    pub use crate::percent::Percent;
    pub use crate::types::*;
    pub use primitive_types::U256;
}

pub use primitive_types::U256;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_currency_matches_sentinel() {
        assert_eq!(NATIVE_TOKEN.currency_id(), NATIVE_CURRENCY);
    }

    #[test]
    fn test_native_token_hex() {
        assert_eq!(
            NATIVE_TOKEN.to_hex(),
            "0x000000000000000000000000000000000000eeee"
        );
    }
}
