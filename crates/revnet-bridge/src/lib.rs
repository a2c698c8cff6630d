//! # Cross-Chain Pricing
//!
//! A revnet is deployed as a chain-group: one project instance per chain,
//! kept in balance by a bridging mechanism. This crate combines what each
//! instance reports into figures the dashboard can show for the whole group.
//!
//! - `chains` - known chains and their native/stable asset identities
//! - `aggregate` - one surplus figure across the chain-group
//! - `pool` - spot pricing from concentrated-liquidity pools
//! - `quotes` - issuance vs pool quotes, best here and best elsewhere
//! - `sources` - collaborator traits and the parallel per-chain fan-out
//!
//! ```text
//!   chain A ──┐                          ┌── issuance quote (chain C)
//!   chain B ──┼─► aggregate ─► total     ├── pool quote (chain A)
//!   chain C ──┘     (classify, rescale)  └── pool quote (chain B)
//!                                                 │
//!                                          best_quotes(caller = C)
//! ```
//!
//! Everything except `sources` is synchronous and free of I/O.

pub mod aggregate;
pub mod chains;
pub mod pool;
pub mod quotes;
pub mod sources;

pub use aggregate::{
    aggregate, aggregate_converted, cross_chain_cash_out_quote, ChainReading, ChainSurplus,
    ConversionRates, SurplusAggregate,
};
pub use chains::{
    chain_info, classify_asset, classify_group, AssetClass, ChainInfo, GroupClass, CHAINS,
};
pub use pool::{pool_quote, spot_quote_from_sqrt_price, PoolState, FEE_DENOMINATOR};
pub use quotes::{best_quotes, PoolLookup, QuoteComparison};
pub use sources::{
    fetch_pool_quotes, fetch_surplus_records, FetchOptions, PoolPriceSource, SurplusSource,
};
