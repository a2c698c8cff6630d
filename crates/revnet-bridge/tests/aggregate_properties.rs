//! Aggregation and comparison laws

use proptest::prelude::*;
use revnet_bridge::*;
use revnet_core::prelude::*;
use revnet_core::{NATIVE_CURRENCY, NATIVE_TOKEN};

const GROUP: [u64; 4] = [1, 10, 8453, 42161];

fn native(chain: u64) -> ChainTokenConfig {
    ChainTokenConfig {
        chain_id: ChainId(chain),
        project_id: 12,
        token: NATIVE_TOKEN,
        currency: NATIVE_CURRENCY,
        decimals: 18,
    }
}

fn record(chain: u64, surplus: Option<u64>) -> SurplusRecord {
    SurplusRecord {
        chain_id: ChainId(chain),
        project_id: 12,
        surplus: surplus.map(|s| FixedAmount::new(U256::from(s), 18)),
        total_supply: FixedAmount::from_whole(1_000, 18).unwrap(),
        reserved_tokens: FixedAmount::zero(18),
    }
}

#[test]
fn test_unavailable_chain_excluded_not_blocking() {
    let configs: Vec<_> = [1, 10, 8453].into_iter().map(native).collect();
    let records = vec![record(1, Some(5)), record(10, Some(3)), record(8453, None)];
    let agg = aggregate(&records, &configs).unwrap();

    assert_eq!(agg.total.unwrap().value(), U256::from(8u8));
    assert!(agg.partial);
    assert_eq!(agg.included_chains().collect::<Vec<_>>(), vec![ChainId(1), ChainId(10)]);
}

fn pool_lookup(chain: u64, out: u64) -> (ChainId, PoolLookup) {
    let amount_in = FixedAmount::from_whole(1, 18).unwrap();
    let descriptor = PoolDescriptor {
        address: Address::new([7; 20]),
        fee_tier: 500,
        liquidity: 1,
    };
    let quote = Quote::pool(
        ChainId(chain),
        amount_in,
        FixedAmount::new(U256::from(out), 18),
        descriptor,
    );
    (ChainId(chain), PoolLookup::Found(quote))
}

proptest! {
    #[test]
    fn prop_total_is_sum_of_available(
        readings in prop::collection::vec(prop::option::of(0u64..1_000_000_000_000), 4)
    ) {
        let configs: Vec<_> = GROUP.into_iter().map(native).collect();
        let records: Vec<_> = GROUP.iter().zip(&readings).map(|(&c, &s)| record(c, s)).collect();
        let expected: u128 = readings.iter().flatten().map(|&s| s as u128).sum();

        match aggregate(&records, &configs) {
            Ok(agg) => {
                prop_assert_eq!(agg.total.unwrap().value(), U256::from(expected));
                prop_assert_eq!(agg.per_chain.len(), GROUP.len());
                prop_assert_eq!(agg.partial, readings.iter().any(|r| r.is_none()));
                prop_assert!(!agg.imprecise);
            }
            Err(e) => {
                prop_assert!(readings.iter().all(|r| r.is_none()));
                prop_assert!(e.is_recoverable());
            }
        }
    }

    #[test]
    fn prop_ranking_is_non_increasing(
        issuance_out in 0u64..10_000,
        outs in prop::collection::vec(0u64..10_000, 0..4),
        caller_idx in 0usize..4,
    ) {
        let caller = ChainId(GROUP[caller_idx]);
        let issuance = Quote::issuance(
            caller,
            FixedAmount::from_whole(1, 18).unwrap(),
            FixedAmount::new(U256::from(issuance_out), 18),
        );
        let pools: Vec<_> = GROUP.iter().zip(&outs).map(|(&c, &o)| pool_lookup(c, o)).collect();
        let cmp = best_quotes(Some(issuance), &pools, caller).unwrap();

        prop_assert_eq!(cmp.all.len(), outs.len() + 1);
        for pair in cmp.all.windows(2) {
            prop_assert!(pair[0].payer_tokens.compare(&pair[1].payer_tokens).is_ge());
        }
        let here = cmp.best_on_selected_chain.as_ref().unwrap();
        prop_assert!(cmp.all.contains(here));
        prop_assert_eq!(here.chain_id, caller);
        if let Some(there) = &cmp.best_on_other_chain {
            prop_assert!(cmp.all.contains(there));
            prop_assert!(there.chain_id != caller);
            prop_assert_eq!(
                cmp.better_price_elsewhere(),
                there.payer_tokens.compare(&here.payer_tokens).is_gt()
            );
        }
    }
}
