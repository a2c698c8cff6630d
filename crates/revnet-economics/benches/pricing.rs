//! Benchmarks for the pricing hot paths the dashboard calls on every refetch

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use revnet_core::prelude::*;
use revnet_economics::{cash_out_quote, issuance_quote, weight_at, CashOutParams, IssuanceParams};

fn ruleset() -> Ruleset {
    Ruleset {
        id: 1,
        start: 0,
        duration: 86_400,
        weight: FixedAmount::from_whole(1_000, 18).unwrap(),
        weight_cut_percent: Percent::weight_cut_percent(50_000_000).unwrap(),
        reserved_percent: Percent::reserved_percent(2_000).unwrap(),
        cash_out_tax_rate: Percent::cash_out_tax_rate(6_000).unwrap(),
    }
}

fn bench_weight_curve(c: &mut Criterion) {
    let r = ruleset();
    let mut group = c.benchmark_group("weight_curve");
    group.bench_function("next_period", |b| b.iter(|| weight_at(black_box(&r), 1)));
    group.bench_function("hundred_periods", |b| b.iter(|| weight_at(black_box(&r), 100)));
    group.finish();
}

fn bench_issuance(c: &mut Criterion) {
    let params = IssuanceParams::from(&ruleset());
    let amount = FixedAmount::parse("1.5", 18).unwrap().value();
    c.bench_function("issuance_quote", |b| {
        b.iter(|| issuance_quote(black_box(amount), 18, black_box(&params)))
    });
}

fn bench_cash_out(c: &mut Criterion) {
    let params = CashOutParams {
        surplus: FixedAmount::from_whole(250, 18).unwrap().value(),
        total_supply: FixedAmount::from_whole(1_000_000, 18).unwrap().value(),
        cash_out_tax_rate: Percent::cash_out_tax_rate(6_000).unwrap(),
        reserved_tokens: FixedAmount::from_whole(20_000, 18).unwrap().value(),
    };
    let tokens = FixedAmount::from_whole(1_000, 18).unwrap().value();
    c.bench_function("cash_out_quote", |b| {
        b.iter(|| cash_out_quote(black_box(tokens), black_box(&params)))
    });
}

criterion_group!(benches, bench_weight_curve, bench_issuance, bench_cash_out);
criterion_main!(benches);
