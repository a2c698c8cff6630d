//! # Quote Comparison
//!
//! Ranks the issuance quote against one pool quote per chain instance for
//! the same trade, and picks the best option on the caller's chain and the
//! best option anywhere else.
//!
//! More payer tokens for the same input is strictly better. Ties keep their
//! input order, so the issuance quote wins a tie with a pool.

use revnet_core::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Outcome of asking one chain for a pool quote
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "quote", rename_all = "snake_case")]
pub enum PoolLookup {
    Found(Quote),
    /// A pool exists but cannot fill the trade
    InsufficientLiquidity,
    /// The lookup failed or timed out
    Unavailable,
}

impl PoolLookup {
    pub fn quote(&self) -> Option<&Quote> {
        match self {
            PoolLookup::Found(quote) => Some(quote),
            _ => None,
        }
    }
}

/// Ranked quotes for one trade
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteComparison {
    /// Non-increasing by `payer_tokens`
    pub all: Vec<Quote>,
    pub best_on_selected_chain: Option<Quote>,
    pub best_on_other_chain: Option<Quote>,
}

impl QuoteComparison {
    /// Whether another chain beats what the caller can get where they are
    pub fn better_price_elsewhere(&self) -> bool {
        match (&self.best_on_selected_chain, &self.best_on_other_chain) {
            (Some(here), Some(there)) => there.payer_tokens.compare(&here.payer_tokens).is_gt(),
            (None, Some(there)) => !there.payer_tokens.is_zero(),
            _ => false,
        }
    }

    pub fn best(&self) -> Option<&Quote> {
        self.all.first()
    }
}

/// Merge and rank every available quote for one trade
pub fn best_quotes(
    issuance: Option<Quote>,
    pool_quotes_by_chain: &[(ChainId, PoolLookup)],
    caller_chain_id: ChainId,
) -> Result<QuoteComparison> {
    let mut all: Vec<Quote> = issuance.into_iter().collect();
    for (chain_id, lookup) in pool_quotes_by_chain {
        match lookup {
            PoolLookup::Found(quote) => {
                if quote.chain_id != *chain_id {
                    return Err(PricingError::InvalidInput(format!(
                        "pool quote for chain {} listed under chain {}",
                        quote.chain_id, chain_id
                    )));
                }
                all.push(quote.clone());
            }
            PoolLookup::InsufficientLiquidity | PoolLookup::Unavailable => {
                debug!(chain = %chain_id, ?lookup, "no pool quote");
            }
        }
    }

    if let Some(first) = all.first() {
        if let Some(other) = all.iter().find(|q| q.amount_in.compare(&first.amount_in).is_ne()) {
            return Err(PricingError::InvalidInput(format!(
                "quotes priced for different inputs: {} and {}",
                first.amount_in, other.amount_in
            )));
        }
    }

    // sort_by is stable
    all.sort_by(|a, b| b.payer_tokens.compare(&a.payer_tokens));

    let best_on_selected_chain = all.iter().find(|q| q.chain_id == caller_chain_id).cloned();
    let best_on_other_chain = all.iter().find(|q| q.chain_id != caller_chain_id).cloned();

    debug!(
        quotes = all.len(),
        caller = %caller_chain_id,
        here = ?best_on_selected_chain.as_ref().map(|q| q.payer_tokens.to_string()),
        elsewhere = ?best_on_other_chain.as_ref().map(|q| q.payer_tokens.to_string()),
        "ranked quotes"
    );

    Ok(QuoteComparison {
        all,
        best_on_selected_chain,
        best_on_other_chain,
    })
}
