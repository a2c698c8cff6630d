//! Bounded fractions on the protocol's integer scales
//!
//! Rulesets store percentages as integers over a fixed maximum:
//! reserved percent and cash-out tax rate over `10_000`, weight cut over
//! `1_000_000_000`. `Percent` keeps the scale next to the value so math
//! never mixes the two.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{MAX_CASH_OUT_TAX_RATE, MAX_RESERVED_PERCENT, MAX_WEIGHT_CUT_PERCENT};
use crate::amount::{mul_div, pow10, MAX_DECIMALS};
use crate::error::{PricingError, Result};
use primitive_types::U256;

/// Fraction `value / max` with `value <= max`
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPercent")]
pub struct Percent {
    value: u64,
    max: u64,
}

impl Percent {
    /// Build a fraction; fails if `value > max` or `max == 0`
    pub fn new(value: u64, max: u64) -> Result<Self> {
        if max == 0 {
            return Err(PricingError::InvalidInput("percent scale of zero".into()));
        }
        if value > max {
            return Err(PricingError::InvalidInput(format!(
                "percent {} exceeds scale {}",
                value, max
            )));
        }
        Ok(Self { value, max })
    }

    /// Zero on the given scale
    pub const fn zero(max: u64) -> Self {
        Self { value: 0, max }
    }

    /// Reserved percent out of 10_000
    pub fn reserved_percent(value: u64) -> Result<Self> {
        Self::new(value, MAX_RESERVED_PERCENT)
    }

    /// Cash-out tax rate out of 10_000
    pub fn cash_out_tax_rate(value: u64) -> Result<Self> {
        Self::new(value, MAX_CASH_OUT_TAX_RATE)
    }

    /// Weight cut percent out of 1_000_000_000
    pub fn weight_cut_percent(value: u64) -> Result<Self> {
        Self::new(value, MAX_WEIGHT_CUT_PERCENT)
    }

    /// Parse a decimal fraction such as `"0.05"` onto the given scale
    ///
    /// Digits below the scale's resolution are truncated.
    pub fn parse_fraction(input: &str, max: u64) -> Result<Self> {
        let trimmed = input.trim();
        let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
        let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty())
            || !all_digits(whole)
            || !all_digits(fraction)
        {
            return Err(PricingError::InvalidInput(format!("not a fraction: {:?}", input)));
        }
        let whole: u64 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| PricingError::InvalidInput(format!("not a fraction: {:?}", input)))?
        };

        let out_of_range =
            || PricingError::InvalidInput(format!("fraction {:?} out of range", input));
        let whole_part = whole.checked_mul(max).ok_or_else(out_of_range)?;
        let value = whole_part
            .checked_add(Self::scale_fraction(fraction, max)?)
            .ok_or_else(out_of_range)?;
        Self::new(value, max)
    }

    fn scale_fraction(fraction: &str, max: u64) -> Result<u64> {
        if fraction.is_empty() {
            return Ok(0);
        }
        let numerator = U256::from_dec_str(fraction)
            .map_err(|_| PricingError::InvalidInput(format!("not a fraction: {:?}", fraction)))?;
        if fraction.len() > MAX_DECIMALS as usize {
            return Err(PricingError::InvalidInput(format!("fraction {:?} too long", fraction)));
        }
        let denominator = pow10(fraction.len() as u8)?;
        let scaled = mul_div(numerator, U256::from(max), denominator)?;
        Ok(scaled.low_u64())
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn max(&self) -> u64 {
        self.max
    }

    pub fn is_zero(&self) -> bool {
        self.value == 0
    }

    /// True when the fraction equals one
    pub fn is_full(&self) -> bool {
        self.value == self.max
    }

    /// `1 - self` on the same scale
    pub fn complement(&self) -> Self {
        Self {
            value: self.max - self.value,
            max: self.max,
        }
    }

    /// Numerator as a `U256` for fixed-point math
    pub fn numerator(&self) -> U256 {
        U256::from(self.value)
    }

    /// Scale as a `U256` for fixed-point math
    pub fn denominator(&self) -> U256 {
        U256::from(self.max)
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Hundredths of a percent are enough for every scale the dashboard shows
        let basis_points = self.value as u128 * 10_000 / self.max as u128;
        write!(f, "{}.{:02}%", basis_points / 100, basis_points % 100)
    }
}

impl fmt::Debug for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Percent({}/{})", self.value, self.max)
    }
}

#[derive(Deserialize)]
struct RawPercent {
    value: u64,
    max: u64,
}

impl TryFrom<RawPercent> for Percent {
    type Error = PricingError;

    fn try_from(raw: RawPercent) -> Result<Self> {
        Self::new(raw.value, raw.max)
    }
}
