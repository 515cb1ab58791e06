//! Set difference: natural equality vs differentiators.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use mirrorsync_core::{compute_changes, Differentiator, Equivalence};
use mirrorsync_testkit::fixtures::{by_id, churn, seeded_rng, KeyedItem};

/// Same relation as `by_id`, without identity keys.
struct PairwiseById;

impl Differentiator<KeyedItem> for PairwiseById {
    fn same(&self, a: &KeyedItem, b: &KeyedItem) -> bool {
        a.id == b.id
    }
}

fn snapshots(len: u32) -> (Vec<KeyedItem>, Vec<KeyedItem>) {
    let mut rng = seeded_rng(u64::from(len));
    let old: Vec<u32> = (0..len).collect();
    let new = churn(&mut rng, &old, len * 2, 0.1);
    let wrap = |ids: Vec<u32>| -> Vec<KeyedItem> {
        ids.into_iter().map(|id| KeyedItem::new(id, 0)).collect()
    };
    (wrap(old), wrap(new))
}

fn bench_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_changes");

    for len in [100u32, 1_000, 5_000] {
        let (old, new) = snapshots(len);

        let natural = Equivalence::Natural;
        group.bench_with_input(BenchmarkId::new("natural", len), &len, |b, _| {
            b.iter(|| compute_changes(black_box(&old), black_box(&new), &natural))
        });

        let keyed = Equivalence::custom(by_id());
        group.bench_with_input(BenchmarkId::new("keyed", len), &len, |b, _| {
            b.iter(|| compute_changes(black_box(&old), black_box(&new), &keyed))
        });

        if len <= 1_000 {
            let pairwise = Equivalence::custom(PairwiseById);
            group.bench_with_input(BenchmarkId::new("pairwise", len), &len, |b, _| {
                b.iter(|| compute_changes(black_box(&old), black_box(&new), &pairwise))
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_diff);
criterion_main!(benches);
