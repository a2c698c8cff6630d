//! Fixed-point amounts
//!
//! Every token and currency quantity is a `U256` integer in the asset's
//! smallest unit, tagged with the number of decimals that make one whole
//! unit. `1.5` of an 18-decimal token is `1_500_000_000_000_000_000 @ 18`.
//!
//! Arithmetic truncates toward zero. Products are taken over a 512-bit
//! intermediate so a `mul_div` never loses precision before its single
//! division.

use primitive_types::{U256, U512};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::error::{PricingError, Result};

/// Largest exponent accepted when scaling (10^77 is the last power of ten below 2^256)
pub const MAX_DECIMALS: u8 = 77;

/// 10^decimals as a `U256`
pub fn pow10(decimals: u8) -> Result<U256> {
    if decimals > MAX_DECIMALS {
        return Err(PricingError::Overflow(format!("10^{} exceeds 256 bits", decimals)));
    }
    U256::from(10u8)
        .checked_pow(U256::from(decimals))
        .ok_or_else(|| PricingError::Overflow(format!("10^{}", decimals)))
}

/// `a * b / denominator`, truncated, with a 512-bit intermediate product
pub fn mul_div(a: U256, b: U256, denominator: U256) -> Result<U256> {
    if denominator.is_zero() {
        return Err(PricingError::InvalidState("division by zero".into()));
    }
    let quotient = a.full_mul(b) / U512::from(denominator);
    narrow(quotient)
}

/// `a * b / denominator`, rounded up
pub fn mul_div_ceil(a: U256, b: U256, denominator: U256) -> Result<U256> {
    if denominator.is_zero() {
        return Err(PricingError::InvalidState("division by zero".into()));
    }
    let product = a.full_mul(b);
    let den = U512::from(denominator);
    let mut quotient = product / den;
    if !(product % den).is_zero() {
        quotient = quotient + U512::one();
    }
    narrow(quotient)
}

fn narrow(value: U512) -> Result<U256> {
    U256::try_from(value).map_err(|_| PricingError::Overflow("result exceeds 256 bits".into()))
}

/// Integer amount tagged with its decimal exponent
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "FixedAmountRepr", into = "FixedAmountRepr")]
pub struct FixedAmount {
    value: U256,
    decimals: u8,
}

impl FixedAmount {
    /// Wrap a raw integer amount
    pub fn new(value: U256, decimals: u8) -> Self {
        Self { value, decimals }
    }

    /// Zero at the given precision
    pub fn zero(decimals: u8) -> Self {
        Self::new(U256::zero(), decimals)
    }

    /// `units` whole units (e.g. `from_whole(5, 18)` = 5.0)
    pub fn from_whole(units: u64, decimals: u8) -> Result<Self> {
        let value = U256::from(units)
            .checked_mul(pow10(decimals)?)
            .ok_or_else(|| PricingError::Overflow(format!("{} whole units", units)))?;
        Ok(Self::new(value, decimals))
    }

    /// Parse a decimal string such as `"0.95"`
    ///
    /// Fraction digits beyond `decimals` are truncated.
    pub fn parse(input: &str, decimals: u8) -> Result<Self> {
        if decimals > MAX_DECIMALS {
            return Err(PricingError::InvalidInput(format!("{} decimals", decimals)));
        }
        let trimmed = input.trim().replace('_', "");
        let (whole, fraction) = match trimmed.split_once('.') {
            Some((w, f)) => (w, f),
            None => (trimmed.as_str(), ""),
        };
        let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty())
            || !all_digits(whole)
            || !all_digits(fraction)
        {
            return Err(PricingError::InvalidInput(format!("not a decimal amount: {:?}", input)));
        }

        let mut digits = String::with_capacity(whole.len() + decimals as usize);
        digits.push_str(whole);
        let kept = fraction.len().min(decimals as usize);
        digits.push_str(&fraction[..kept]);
        digits.extend(std::iter::repeat('0').take(decimals as usize - kept));

        let digits = digits.trim_start_matches('0');
        let value = if digits.is_empty() {
            U256::zero()
        } else {
            U256::from_dec_str(digits)
                .map_err(|_| PricingError::Overflow(format!("amount {:?}", input)))?
        };
        Ok(Self::new(value, decimals))
    }

    /// Raw integer value in the smallest unit
    pub fn value(&self) -> U256 {
        self.value
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Re-express at another precision, truncating when precision drops
    pub fn rescale(&self, decimals: u8) -> Result<Self> {
        let value = match decimals.cmp(&self.decimals) {
            Ordering::Equal => self.value,
            Ordering::Greater => self
                .value
                .checked_mul(pow10(decimals - self.decimals)?)
                .ok_or_else(|| {
                    PricingError::Overflow(format!("rescale {} to {} decimals", self, decimals))
                })?,
            Ordering::Less => self.value / pow10(self.decimals - decimals)?,
        };
        Ok(Self::new(value, decimals))
    }

    /// Sum at the finer of the two precisions
    pub fn checked_add(&self, other: &Self) -> Result<Self> {
        let decimals = self.decimals.max(other.decimals);
        let (a, b) = (self.rescale(decimals)?, other.rescale(decimals)?);
        let value = a
            .value
            .checked_add(b.value)
            .ok_or_else(|| PricingError::Overflow(format!("{} + {}", self, other)))?;
        Ok(Self::new(value, decimals))
    }

    /// Difference at the finer of the two precisions; fails when negative
    pub fn checked_sub(&self, other: &Self) -> Result<Self> {
        let decimals = self.decimals.max(other.decimals);
        let (a, b) = (self.rescale(decimals)?, other.rescale(decimals)?);
        let value = a.value.checked_sub(b.value).ok_or_else(|| {
            PricingError::InvalidInput(format!("{} - {} is negative", self, other))
        })?;
        Ok(Self::new(value, decimals))
    }

    /// `self * numerator / denominator` at the same precision, truncated
    pub fn mul_div(&self, numerator: U256, denominator: U256) -> Result<Self> {
        Ok(Self::new(mul_div(self.value, numerator, denominator)?, self.decimals))
    }

    /// Multiply by another amount read as a rate (e.g. a USD price with 18 decimals)
    ///
    /// The result keeps `self`'s precision.
    pub fn mul_amount(&self, rate: &FixedAmount) -> Result<Self> {
        self.mul_div(rate.value, pow10(rate.decimals)?)
    }

    /// Order by economic value regardless of precision
    pub fn compare(&self, other: &Self) -> Ordering {
        if self.decimals == other.decimals {
            return self.value.cmp(&other.value);
        }
        // Lifted into 512 bits before scaling
        let lift = |amount: &Self, to: u8| -> U512 {
            let mut value = U512::from(amount.value);
            for _ in amount.decimals..to {
                value = value.saturating_mul(U512::from(10u8));
            }
            value
        };
        let decimals = self.decimals.max(other.decimals);
        lift(self, decimals).cmp(&lift(other, decimals))
    }
}

impl fmt::Display for FixedAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.value.to_string();
        let decimals = self.decimals as usize;
        if decimals == 0 {
            return write!(f, "{}", digits);
        }
        let padded = if digits.len() <= decimals {
            format!("{}{}", "0".repeat(decimals + 1 - digits.len()), digits)
        } else {
            digits
        };
        let (whole, fraction) = padded.split_at(padded.len() - decimals);
        let fraction = fraction.trim_end_matches('0');
        if fraction.is_empty() {
            write!(f, "{}", whole)
        } else {
            write!(f, "{}.{}", whole, fraction)
        }
    }
}

impl fmt::Debug for FixedAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedAmount({} @ {})", self.value, self.decimals)
    }
}

/// Wire shape: the integer as a decimal string so JSON consumers never lose precision
#[derive(Serialize, Deserialize)]
struct FixedAmountRepr {
    value: String,
    decimals: u8,
}

impl From<FixedAmount> for FixedAmountRepr {
    fn from(amount: FixedAmount) -> Self {
        Self {
            value: amount.value.to_string(),
            decimals: amount.decimals,
        }
    }
}

impl TryFrom<FixedAmountRepr> for FixedAmount {
    type Error = PricingError;

    fn try_from(repr: FixedAmountRepr) -> Result<Self> {
        if repr.decimals > MAX_DECIMALS {
            return Err(PricingError::InvalidInput(format!(
                "{} decimals exceeds {}",
                repr.decimals, MAX_DECIMALS
            )));
        }
        let value = U256::from_dec_str(&repr.value)
            .map_err(|_| PricingError::InvalidInput(format!("not an integer: {:?}", repr.value)))?;
        Ok(Self::new(value, repr.decimals))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wad(s: &str) -> FixedAmount {
        FixedAmount::parse(s, 18).unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        let amount = wad("0.95");
        assert_eq!(amount.value(), U256::from(950_000_000_000_000_000u128));
        assert_eq!(amount.to_string(), "0.95");

        assert_eq!(wad("12").to_string(), "12");
        assert_eq!(wad("0").to_string(), "0");
        assert_eq!(wad(".5").to_string(), "0.5");
        assert_eq!(FixedAmount::parse("1_000.25", 6).unwrap().to_string(), "1000.25");
    }

    #[test]
    fn test_parse_truncates_extra_digits() {
        let amount = FixedAmount::parse("1.23456789", 6).unwrap();
        assert_eq!(amount.value(), U256::from(1_234_567u64));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(FixedAmount::parse("", 18).is_err());
        assert!(FixedAmount::parse("1.2.3", 18).is_err());
        assert!(FixedAmount::parse("-1", 18).is_err());
        assert!(FixedAmount::parse("abc", 18).is_err());
    }

    #[test]
    fn test_rescale() {
        let usdc = FixedAmount::parse("3.141592", 6).unwrap();
        let wide = usdc.rescale(18).unwrap();
        assert_eq!(wide.value(), U256::from(3_141_592_000_000_000_000u128));

        let narrow = wad("1.999999999999999999").rescale(6).unwrap();
        assert_eq!(narrow.value(), U256::from(1_999_999u64));
    }

    #[test]
    fn test_add_aligns_precision() {
        let sum = FixedAmount::parse("1.5", 6)
            .unwrap()
            .checked_add(&wad("2.25"))
            .unwrap();
        assert_eq!(sum.decimals(), 18);
        assert_eq!(sum.to_string(), "3.75");
    }

    #[test]
    fn test_sub_negative_fails() {
        assert!(wad("1").checked_sub(&wad("2")).is_err());
        assert_eq!(wad("2").checked_sub(&wad("0.5")).unwrap().to_string(), "1.5");
    }

    #[test]
    fn test_mul_div_wide_intermediate() {
        // (2^255) * 4 / 8 only fits thanks to the 512-bit product
        let big = U256::one() << 255;
        let result = mul_div(big, U256::from(4u8), U256::from(8u8)).unwrap();
        assert_eq!(result, U256::one() << 254);
    }

    #[test]
    fn test_mul_div_ceil() {
        assert_eq!(
            mul_div_ceil(U256::from(10u8), U256::one(), U256::from(3u8)).unwrap(),
            U256::from(4u8)
        );
        assert_eq!(
            mul_div_ceil(U256::from(9u8), U256::one(), U256::from(3u8)).unwrap(),
            U256::from(3u8)
        );
    }

    #[test]
    fn test_mul_div_by_zero() {
        assert!(matches!(
            mul_div(U256::one(), U256::one(), U256::zero()),
            Err(PricingError::InvalidState(_))
        ));
    }

    #[test]
    fn test_mul_amount() {
        let eth = wad("2.5");
        let usd_per_eth = wad("3000");
        assert_eq!(eth.mul_amount(&usd_per_eth).unwrap().to_string(), "7500");
    }

    #[test]
    fn test_compare_across_precision() {
        let six = FixedAmount::parse("1.000001", 6).unwrap();
        assert_eq!(six.compare(&wad("1.000001")), Ordering::Equal);
        assert_eq!(six.compare(&wad("1.0000011")), Ordering::Less);
        assert_eq!(wad("2").compare(&six), Ordering::Greater);
    }

    #[test]
    fn test_serde_decimal_string() {
        let amount = wad("1.25");
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, r#"{"value":"1250000000000000000","decimals":18}"#);
        let back: FixedAmount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amount);
    }

    #[test]
    fn test_serde_rejects_excess_decimals() {
        let json = r#"{"value":"1","decimals":200}"#;
        assert!(serde_json::from_str::<FixedAmount>(json).is_err());
        let json = r#"{"value":"1","decimals":77}"#;
        assert!(serde_json::from_str::<FixedAmount>(json).is_ok());
    }

    #[test]
    fn test_pow10_bounds() {
        assert_eq!(pow10(0).unwrap(), U256::one());
        assert!(pow10(77).is_ok());
        assert!(pow10(78).is_err());
    }
}
