//! Known chains and base-asset classification
//!
//! A chain-group's members may accept different base assets. Members
//! paying in the chain's native coin share one economic unit; members
//! paying in the chain's canonical USDC share another. Anything else
//! cannot be summed without a price conversion.

use revnet_core::prelude::*;
use revnet_core::{ETH_CURRENCY, NATIVE_CURRENCY, NATIVE_TOKEN, USD_CURRENCY};
use serde::{Deserialize, Serialize};

/// Static facts about a supported chain
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainInfo {
    pub chain_id: ChainId,
    pub name: &'static str,
    pub native_symbol: &'static str,
    /// Canonical USDC deployment
    pub usdc: Address,
    pub testnet: bool,
}

/// Chains revnets are deployed on
pub const CHAINS: &[ChainInfo] = &[
    ChainInfo {
        chain_id: ChainId(1),
        name: "Ethereum",
        native_symbol: "ETH",
        usdc: Address::from_hex_literal("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"),
        testnet: false,
    },
    ChainInfo {
        chain_id: ChainId(10),
        name: "Optimism",
        native_symbol: "ETH",
        usdc: Address::from_hex_literal("0b2C639c533813f4Aa9D7837CAf62653d097Ff85"),
        testnet: false,
    },
    ChainInfo {
        chain_id: ChainId(8453),
        name: "Base",
        native_symbol: "ETH",
        usdc: Address::from_hex_literal("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"),
        testnet: false,
    },
    ChainInfo {
        chain_id: ChainId(42161),
        name: "Arbitrum",
        native_symbol: "ETH",
        usdc: Address::from_hex_literal("af88d065e77c8cC2239327C5EDb3A432268e5831"),
        testnet: false,
    },
    ChainInfo {
        chain_id: ChainId(11155111),
        name: "Sepolia",
        native_symbol: "ETH",
        usdc: Address::from_hex_literal("1c7D4B196Cb0C7B01d743Fbc6116a902379C7238"),
        testnet: true,
    },
    ChainInfo {
        chain_id: ChainId(11155420),
        name: "Optimism Sepolia",
        native_symbol: "ETH",
        usdc: Address::from_hex_literal("5fd84259d66Cd46123540766Be93DFE6D43130D7"),
        testnet: true,
    },
    ChainInfo {
        chain_id: ChainId(84532),
        name: "Base Sepolia",
        native_symbol: "ETH",
        usdc: Address::from_hex_literal("036CbD53842c5426634e7929541eC2318f3dCF7e"),
        testnet: true,
    },
    ChainInfo {
        chain_id: ChainId(421614),
        name: "Arbitrum Sepolia",
        native_symbol: "ETH",
        usdc: Address::from_hex_literal("75faf114eafb1BDbe2F0316DF893fd58CE46AA4d"),
        testnet: true,
    },
];

/// Look up a supported chain
pub fn chain_info(chain_id: ChainId) -> Option<&'static ChainInfo> {
    CHAINS.iter().find(|c| c.chain_id == chain_id)
}

/// Economic unit of one member's base asset
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    /// The chain's native coin
    Native,
    /// The chain's canonical USD stablecoin
    Stable,
    /// Anything else
    Other,
}

/// How a whole chain-group's base assets relate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupClass {
    AllNative,
    AllStable,
    /// Members disagree, or at least one asset is unrecognized
    Mixed,
}

/// Classify one member's base asset
pub fn classify_asset(config: &ChainTokenConfig) -> AssetClass {
    if config.token == NATIVE_TOKEN
        || config.currency == NATIVE_CURRENCY
        || config.currency == ETH_CURRENCY
    {
        return AssetClass::Native;
    }
    let is_usdc = chain_info(config.chain_id)
        .map(|chain| chain.usdc == config.token || chain.usdc.currency_id() == config.currency)
        .unwrap_or(false);
    if is_usdc || config.currency == USD_CURRENCY {
        AssetClass::Stable
    } else {
        AssetClass::Other
    }
}

/// Classify a chain-group, None when it has no members
pub fn classify_group(configs: &[ChainTokenConfig]) -> Option<GroupClass> {
    let mut classes = configs.iter().map(classify_asset);
    let first = classes.next()?;
    if classes.any(|class| class != first) {
        return Some(GroupClass::Mixed);
    }
    Some(match first {
        AssetClass::Native => GroupClass::AllNative,
        AssetClass::Stable => GroupClass::AllStable,
        AssetClass::Other => GroupClass::Mixed,
    })
}
