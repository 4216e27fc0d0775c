use concord::{
    build_pairs, compare_collections, reconcile_with, AnnotationCollection, ConcordConfig,
    GoldOptions, Span, TagRef,
};
use criterion::{criterion_group, criterion_main, Criterion};
use pprof::criterion::{Output, PProfProfiler};

const TAGS: [&str; 4] = ["event", "state", "process", "non_event"];

/// Builds two collections of `n_spans` spans each. The second collection is a shifted and
/// partially retagged copy of the first one, with some spans missing.
fn build_collections(n_spans: usize) -> (AnnotationCollection, AnnotationCollection) {
    let tags: Vec<TagRef> = TAGS
        .iter()
        .map(|t| TagRef::new(format!("tag-{t}"), *t))
        .collect();
    let mut first = Vec::with_capacity(n_spans);
    let mut second = Vec::with_capacity(n_spans);
    for i in 0..n_spans {
        let start = i * 20;
        let len = 5 + i % 11;
        first.push(Span::new(format!("a-{i}"), start, start + len, tags[i % 4].clone()).unwrap());
        if i % 7 != 0 {
            let shift = i % 3;
            let tag = if i % 5 == 0 { &tags[(i + 1) % 4] } else { &tags[i % 4] };
            second.push(
                Span::new(format!("b-{i}"), start + shift, start + len, tag.clone()).unwrap(),
            );
        }
    }
    (
        AnnotationCollection::new("first", "document", first),
        AnnotationCollection::new("second", "document", second),
    )
}

fn benchmark_small_pairing(c: &mut Criterion) {
    let (first, second) = build_collections(200);
    c.bench_function("small_pairing", |b| {
        b.iter(|| build_pairs(&first, &second, None, false, None).unwrap())
    });
}

fn benchmark_big_pairing(c: &mut Criterion) {
    let (first, second) = build_collections(5000);
    c.bench_function("big_pairing", |b| {
        b.iter(|| build_pairs(&first, &second, None, false, None).unwrap())
    });
}

fn benchmark_full_comparison(c: &mut Criterion) {
    let (first, second) = build_collections(2000);
    let config = ConcordConfig::default();
    c.bench_function("full_comparison", |b| {
        b.iter(|| compare_collections(&first, &second, &config).unwrap())
    });
}

fn benchmark_gold(c: &mut Criterion) {
    let (first, second) = build_collections(2000);
    let options = GoldOptions {
        min_overlap: 0.8,
        ..Default::default()
    };
    c.bench_function("gold_reconciliation", |b| {
        b.iter(|| reconcile_with(&first, &second, &options).unwrap())
    });
}

criterion_group!(
    name=pairing_benches;
    config = Criterion::default().sample_size(100).with_profiler(PProfProfiler::new(3000, Output::Flamegraph(None)));
    targets = benchmark_small_pairing,
    benchmark_big_pairing,
    benchmark_full_comparison,
    benchmark_gold
);
criterion_main!(pairing_benches);
