//! Core type definitions for the revnet pricing engine
//!
//! Everything here is an immutable snapshot of a chain or indexer read.
//! Refetching replaces a value wholesale; nothing is updated in place.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::amount::FixedAmount;
use crate::constants::MAX_WEIGHT_CUT_PERCENT;
use crate::error::{PricingError, Result};
use crate::percent::Percent;

/// Project identifier on one chain
pub type ProjectId = u64;

/// EVM chain identifier (EIP-155)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(pub u64);

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// 20-byte EVM address
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Address([u8; 20]);

impl Address {
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Address from a 40-digit hex literal (no `0x`), checked at compile time
    pub const fn from_hex_literal(digits: &str) -> Self {
        const fn nibble(c: u8) -> u8 {
            match c {
                b'0'..=b'9' => c - b'0',
                b'a'..=b'f' => c - b'a' + 10,
                b'A'..=b'F' => c - b'A' + 10,
                _ => panic!("invalid hex digit in address literal"),
            }
        }
        let raw = digits.as_bytes();
        assert!(raw.len() == 40, "address literal must be 40 hex digits");
        let mut bytes = [0u8; 20];
        let mut i = 0;
        while i < 20 {
            bytes[i] = (nibble(raw[2 * i]) << 4) | nibble(raw[2 * i + 1]);
            i += 1;
        }
        Self(bytes)
    }

    /// Lowercase `0x`-prefixed hex
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parse from hex, with or without `0x`, any letter case
    pub fn from_hex(s: &str) -> Result<Self> {
        let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
        let bytes = hex::decode(digits)
            .map_err(|e| PricingError::InvalidInput(format!("address {:?}: {}", s, e)))?;
        let bytes: [u8; 20] = bytes
            .try_into()
            .map_err(|_| PricingError::InvalidInput(format!("address {:?} is not 20 bytes", s)))?;
        Ok(Self(bytes))
    }

    /// Currency code terminals derive from a token address (its low 32 bits)
    pub fn currency_id(&self) -> u32 {
        u32::from_be_bytes([self.0[16], self.0[17], self.0[18], self.0[19]])
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Address {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Time-boxed configuration period for one chain instance of a project
///
/// `duration == 0` never elapses. A zero `weight` pauses issuance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ruleset {
    /// Opaque ordinal
    pub id: u64,
    /// Unix seconds
    pub start: u64,
    /// Seconds per period, 0 = infinite
    pub duration: u64,
    /// Tokens minted per whole unit of base currency (18 decimals)
    pub weight: FixedAmount,
    /// Reduction applied to `weight` at each subsequent period, in [0, 1)
    pub weight_cut_percent: Percent,
    /// Share of minted tokens withheld for split recipients, in [0, 1]
    pub reserved_percent: Percent,
    /// Cash-out penalty, in [0, 1]
    pub cash_out_tax_rate: Percent,
}

impl Ruleset {
    /// Check every parameter is inside its documented range
    pub fn validate(&self) -> Result<()> {
        if self.weight_cut_percent.is_full() {
            return Err(PricingError::InvalidRuleset(format!(
                "ruleset {}: weight cut of 100% collapses the curve",
                self.id
            )));
        }
        if self.weight_cut_percent.max() != MAX_WEIGHT_CUT_PERCENT {
            return Err(PricingError::InvalidRuleset(format!(
                "ruleset {}: weight cut scale {} (expected {})",
                self.id,
                self.weight_cut_percent.max(),
                MAX_WEIGHT_CUT_PERCENT
            )));
        }
        Ok(())
    }

    /// Same parameters with another weight
    pub fn with_weight(&self, weight: FixedAmount) -> Self {
        Self {
            weight,
            ..self.clone()
        }
    }

    /// Issuance is paused when the weight is zero
    pub fn is_paused(&self) -> bool {
        self.weight.is_zero()
    }

    /// End of the first period, None if the ruleset never elapses
    pub fn ends_at(&self) -> Option<u64> {
        if self.duration == 0 {
            None
        } else {
            Some(self.start.saturating_add(self.duration))
        }
    }
}

/// Base-asset identity of one chain instance within a chain-group
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainTokenConfig {
    pub chain_id: ChainId,
    pub project_id: ProjectId,
    /// Base asset accepted by the terminal on that chain
    pub token: Address,
    /// Numeric currency code
    pub currency: u32,
    pub decimals: u8,
}

/// Point-in-time reading of reclaimable reserve on one chain instance
///
/// `surplus == None` means the read failed or has not resolved yet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurplusRecord {
    pub chain_id: ChainId,
    pub project_id: ProjectId,
    #[serde(default)]
    pub surplus: Option<FixedAmount>,
    pub total_supply: FixedAmount,
    /// Pending reserved tokens not yet minted
    pub reserved_tokens: FixedAmount,
}

impl SurplusRecord {
    /// Placeholder for a chain whose read failed
    pub fn unavailable(chain_id: ChainId, project_id: ProjectId, token_decimals: u8) -> Self {
        Self {
            chain_id,
            project_id,
            surplus: None,
            total_supply: FixedAmount::zero(token_decimals),
            reserved_tokens: FixedAmount::zero(token_decimals),
        }
    }

    pub fn is_available(&self) -> bool {
        self.surplus.is_some()
    }

    /// The surplus, or `DataUnavailable` when the read did not resolve
    pub fn require_surplus(&self) -> Result<&FixedAmount> {
        self.surplus.as_ref().ok_or_else(|| {
            PricingError::DataUnavailable(format!(
                "surplus for project {} on chain {}",
                self.project_id, self.chain_id
            ))
        })
    }
}

/// Where a quote came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteKind {
    /// Minted through the protocol's issuance curve
    Issuance,
    /// Bought from third-party liquidity
    Pool,
}

/// Liquidity pool a pool quote was sourced from
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolDescriptor {
    pub address: Address,
    /// Fee in hundredths of a basis point (3000 = 0.3%)
    pub fee_tier: u32,
    /// In-range liquidity
    pub liquidity: u128,
}

/// Result of pricing one conversion path
///
/// Quotes are only comparable when `amount_in` matches.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub kind: QuoteKind,
    pub chain_id: ChainId,
    pub amount_in: FixedAmount,
    /// Project tokens the payer receives
    pub payer_tokens: FixedAmount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool: Option<PoolDescriptor>,
}

impl Quote {
    pub fn issuance(chain_id: ChainId, amount_in: FixedAmount, payer_tokens: FixedAmount) -> Self {
        Self {
            kind: QuoteKind::Issuance,
            chain_id,
            amount_in,
            payer_tokens,
            pool: None,
        }
    }

    pub fn pool(
        chain_id: ChainId,
        amount_in: FixedAmount,
        payer_tokens: FixedAmount,
        pool: PoolDescriptor,
    ) -> Self {
        Self {
            kind: QuoteKind::Pool,
            chain_id,
            amount_in,
            payer_tokens,
            pool: Some(pool),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{MAX_CASH_OUT_TAX_RATE, MAX_RESERVED_PERCENT};

    fn ruleset(cut: u64) -> Ruleset {
        Ruleset {
            id: 1,
            start: 1_700_000_000,
            duration: 86_400,
            weight: FixedAmount::from_whole(1, 18).unwrap(),
            weight_cut_percent: Percent::weight_cut_percent(cut).unwrap(),
            reserved_percent: Percent::zero(MAX_RESERVED_PERCENT),
            cash_out_tax_rate: Percent::zero(MAX_CASH_OUT_TAX_RATE),
        }
    }

    #[test]
    fn test_address_roundtrip_case_insensitive() {
        let checksummed = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";
        let addr: Address = checksummed.parse().unwrap();
        assert_eq!(addr.to_hex(), checksummed.to_lowercase());
        assert_eq!(Address::from_hex(&checksummed[2..]).unwrap(), addr);
    }

    #[test]
    fn test_address_literal() {
        const USDC: Address = Address::from_hex_literal("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
        assert_eq!(USDC, Address::from_hex("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48").unwrap());
    }

    #[test]
    fn test_address_rejects_bad_length() {
        assert!(Address::from_hex("0x1234").is_err());
        assert!(Address::from_hex("0xzz").is_err());
    }

    #[test]
    fn test_ruleset_validation() {
        assert!(ruleset(100_000_000).validate().is_ok());
        assert!(matches!(
            ruleset(MAX_WEIGHT_CUT_PERCENT).validate(),
            Err(PricingError::InvalidRuleset(_))
        ));
    }

    #[test]
    fn test_ruleset_wrong_cut_scale() {
        let mut r = ruleset(0);
        r.weight_cut_percent = Percent::new(10, 100).unwrap();
        assert!(r.validate().is_err());
    }

    #[test]
    fn test_ruleset_end() {
        assert_eq!(ruleset(0).ends_at(), Some(1_700_086_400));
        let mut forever = ruleset(0);
        forever.duration = 0;
        assert_eq!(forever.ends_at(), None);
    }

    #[test]
    fn test_paused_when_weight_zero() {
        let r = ruleset(0);
        assert!(!r.is_paused());
        assert!(r.with_weight(FixedAmount::zero(18)).is_paused());
    }

    #[test]
    fn test_require_surplus() {
        let record = SurplusRecord::unavailable(ChainId(10), 3, 18);
        assert!(matches!(
            record.require_surplus(),
            Err(PricingError::DataUnavailable(_))
        ));
    }

    #[test]
    fn test_surplus_record_json() {
        let json = r#"{
            "chain_id": 8453,
            "project_id": 3,
            "surplus": null,
            "total_supply": {"value": "1000", "decimals": 18},
            "reserved_tokens": {"value": "0", "decimals": 18}
        }"#;
        let record: SurplusRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.chain_id, ChainId(8453));
        assert!(!record.is_available());
    }
}
