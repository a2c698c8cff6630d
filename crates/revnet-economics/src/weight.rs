//! # Ruleset Weight Curve
//!
//! Issuance weight for any period relative to a ruleset's own period.
//!
//! Moving one period forward multiplies the weight by `(1 - cut)`; moving one
//! period back divides by it. Steps are applied one at a time with
//! truncation, matching how terminals derive the next period's weight, so
//! the result is exact per step rather than a closed-form power.

use revnet_core::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Largest period offset `weight_at` iterates over
pub const MAX_PERIOD_STEPS: u64 = 20_000;

/// Weight `period_offset` periods away from the ruleset's period
///
/// `0` is the ruleset's own weight, `-1` the previous period, `+1` the next.
pub fn weight_at(ruleset: &Ruleset, period_offset: i64) -> Result<FixedAmount> {
    ruleset.validate()?;

    let steps = period_offset.unsigned_abs();
    if steps > MAX_PERIOD_STEPS {
        return Err(PricingError::InvalidInput(format!(
            "period offset {} exceeds {} steps",
            period_offset, MAX_PERIOD_STEPS
        )));
    }

    let cut = ruleset.weight_cut_percent;
    if steps == 0 || cut.is_zero() {
        return Ok(ruleset.weight);
    }

    let keep = cut.complement();
    let mut weight = ruleset.weight;
    for _ in 0..steps {
        if weight.is_zero() {
            break;
        }
        weight = if period_offset > 0 {
            weight.mul_div(keep.numerator(), keep.denominator())?
        } else {
            weight.mul_div(keep.denominator(), keep.numerator())?
        };
    }

    trace!(ruleset = ruleset.id, period_offset, %weight, "derived weight");
    Ok(weight)
}

/// The four weights the dashboard shows for a ruleset
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightSchedule {
    pub previous: FixedAmount,
    pub current: FixedAmount,
    pub next: FixedAmount,
    pub next_after: FixedAmount,
}

/// Previous, current, next and next-next weight
pub fn weight_schedule(ruleset: &Ruleset) -> Result<WeightSchedule> {
    Ok(WeightSchedule {
        previous: weight_at(ruleset, -1)?,
        current: weight_at(ruleset, 0)?,
        next: weight_at(ruleset, 1)?,
        next_after: weight_at(ruleset, 2)?,
    })
}

/// Whole periods elapsed since `ruleset.start` at `timestamp`
///
/// Zero before the start and for rulesets that never elapse.
pub fn periods_elapsed(ruleset: &Ruleset, timestamp: u64) -> u64 {
    if ruleset.duration == 0 || timestamp < ruleset.start {
        return 0;
    }
    (timestamp - ruleset.start) / ruleset.duration
}

/// Weight in effect at `timestamp`
pub fn weight_at_time(ruleset: &Ruleset, timestamp: u64) -> Result<FixedAmount> {
    let elapsed = periods_elapsed(ruleset, timestamp);
    let offset = i64::try_from(elapsed)
        .map_err(|_| PricingError::InvalidInput(format!("{} periods elapsed", elapsed)))?;
    weight_at(ruleset, offset)
}

/// Unix time of the next weight cut after `timestamp`, None if the ruleset never elapses
pub fn next_cut_at(ruleset: &Ruleset, timestamp: u64) -> Option<u64> {
    if ruleset.duration == 0 {
        return None;
    }
    let next_period = periods_elapsed(ruleset, timestamp).checked_add(1)?;
    next_period
        .checked_mul(ruleset.duration)
        .and_then(|offset| ruleset.start.checked_add(offset))
}
