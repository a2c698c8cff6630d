//! # Revnet Economics - Issuance & Cash-Out Pricing
//!
//! Pure pricing math for one chain instance of a revnet.
//!
//! ## Components
//!
//! - **Weight curve**: issuance weight per period, cut by a fixed
//!   percentage each time a period elapses
//! - **Issuance quote**: tokens minted for a contribution, split between
//!   the payer and the reserved recipients
//! - **Cash-out quote**: base asset reclaimable from the surplus along the
//!   bonding curve
//! - **Ruleset adapter**: maps legacy and current protocol parameter shapes
//!   into one `Ruleset`
//!
//! ## Weight decay
//!
//! ```text
//! period   weight (cut 10%)
//!   -1     1.111111111111111111
//!    0     1.0
//!   +1     0.9
//!   +2     0.81
//! ```
//!
//! ## Cash-out curve
//!
//! ```text
//! y = o·x/s · ((1 - t) + t·x/s)
//!
//! o = surplus, x = tokens cashed out, s = supply + pending reserved, t = tax rate
//! ```

pub mod cash_out;
pub mod issuance;
pub mod ruleset;
pub mod weight;

// Re-exports
pub use cash_out::{cash_out_from_record, cash_out_quote, cash_out_value_per_token, CashOutParams};
pub use issuance::{
    amount_for_payer_tokens, issuance_price, issuance_quote, IssuanceParams, IssuanceQuote,
};
pub use ruleset::{LegacyRulesetRead, RulesetRead, RulesetV4Read};
pub use weight::{
    next_cut_at, periods_elapsed, weight_at, weight_at_time, weight_schedule, WeightSchedule,
    MAX_PERIOD_STEPS,
};
