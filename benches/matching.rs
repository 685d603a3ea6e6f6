//! Matching benchmarks: imbalance computation and greedy pairing.

use basketbook::{Basket, PriceMap, TradeMatcher};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

/// Build an equal-weight basket of `n` assets with skewed holdings.
///
/// Holdings and prices are drawn from a simple deterministic RNG so every
/// run benchmarks the same inputs.
fn skewed_basket(n: usize) -> (Basket, PriceMap) {
    let names: Vec<String> = (0..n).map(|i| format!("T{i:04}")).collect();
    let w = 1.0 / n as f64;
    let mut basket = Basket::new(
        "bench",
        names.iter().map(String::as_str),
        names.iter().map(|s| (s.as_str(), w)),
    )
    .expect("valid basket");

    // Simple deterministic PRNG (xorshift32)
    let mut rng_state: u32 = 42;
    let mut next = || {
        rng_state ^= rng_state << 13;
        rng_state ^= rng_state >> 17;
        rng_state ^= rng_state << 5;
        rng_state
    };

    let mut prices = PriceMap::new();
    for name in &names {
        let price = 1.0 + (next() % 1000) as f64 / 10_000.0; // 1.0 .. 1.1
        let holding = (next() % 10_000) as f64;
        prices.insert(name.as_str(), price);
        basket.set_holding(name.as_str(), holding);
    }
    (basket, prices)
}

fn bench_imbalances(c: &mut Criterion) {
    let mut group = c.benchmark_group("basket/imbalances");

    for n in [4, 32, 256] {
        let (basket, prices) = skewed_basket(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| black_box(basket.imbalances(&prices)))
        });
    }

    group.finish();
}

fn bench_compute_trades(c: &mut Criterion) {
    let mut group = c.benchmark_group("basket/compute_trades");

    for n in [4, 32, 256, 1024] {
        let (basket, prices) = skewed_basket(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| black_box(basket.compute_trades(&prices)))
        });
    }

    group.finish();
}

fn bench_matcher_only(c: &mut Criterion) {
    let mut group = c.benchmark_group("matcher/run");
    let matcher = TradeMatcher::default();

    for n in [32, 256, 1024] {
        let (basket, prices) = skewed_basket(n);
        let imb = basket.imbalances(&prices).expect("priced");
        group.bench_with_input(BenchmarkId::from_parameter(n), &imb, |b, imb| {
            b.iter_batched(
                || (imb.sells.clone(), imb.buys.clone()),
                |(sells, buys)| black_box(matcher.run(sells, buys, &prices)),
                criterion::BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_imbalances,
    bench_compute_trades,
    bench_matcher_only,
);
criterion_main!(benches);
