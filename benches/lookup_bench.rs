use std::{hint::black_box, time::Duration};

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use locdata::{
    Category, CompileConfig, LocaleId, compile, match_locale,
    store::{self, Store},
    testing::fixtures,
};

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");
    let sources = fixtures::sources();

    for threads in [1, 4] {
        let config = CompileConfig {
            threads: Some(threads),
            ..Default::default()
        };
        group.bench_with_input(BenchmarkId::new("fixtures", threads), &config, |b, config| {
            b.iter(|| black_box(compile(black_box(&sources), config).unwrap()))
        });
    }

    let compilation = fixtures::compiled().unwrap();
    group.bench_function("to_bytes", |b| {
        b.iter(|| black_box(store::to_bytes(black_box(&compilation.bundles)).unwrap()))
    });
    group.finish();
}

fn bench_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("store");
    let bytes = store::to_bytes(&fixtures::compiled().unwrap().bundles).unwrap();

    group.bench_function("index_only", |b| {
        b.iter(|| black_box(Store::from_bytes(black_box(bytes.clone())).unwrap()))
    });

    group.bench_function("first_bundle_decode", |b| {
        let en_gb = LocaleId::parse("en_GB").unwrap();
        b.iter(|| {
            let store = Store::from_bytes(bytes.clone()).unwrap();
            black_box(store.bundle(&en_gb).unwrap().len())
        })
    });

    let store = Store::from_bytes(bytes.clone()).unwrap();
    let cases = [
        ("en_GB", Category::Date, "gregorian.short", "own value"),
        ("fr_CA", Category::Calendar, "gregorian.months.format.wide", "inherited list"),
        ("th", Category::Languages, "en", "missing key"),
    ];
    for (tag, category, key, name) in cases {
        let id = LocaleId::parse(tag).unwrap();
        group.bench_function(BenchmarkId::new("lookup", name), |b| {
            b.iter(|| black_box(store.lookup(black_box(&id), category, black_box(key)).unwrap()))
        });
    }
    group.finish();
}

fn bench_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("matching");
    let compilation = fixtures::compiled().unwrap();
    let available: Vec<&LocaleId> = compilation.bundles.keys().collect();

    for tag in ["en_GB", "fr_CA_POSIX", "zh_Hant_HK", "en-US"] {
        let requested = LocaleId::parse(tag).unwrap();
        group.bench_function(BenchmarkId::new("match_locale", tag), |b| {
            b.iter(|| black_box(match_locale(black_box(&requested), available.iter().copied())))
        });
    }
    group.bench_function("parse_tag", |b| {
        b.iter(|| black_box(LocaleId::parse(black_box("zh-hant-tw.UTF-8")).unwrap()))
    });
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default()
        .measurement_time(Duration::from_secs(2))
        .warm_up_time(Duration::from_secs(1))
        .noise_threshold(0.015)
        .significance_level(0.05);
    targets = bench_compile, bench_store, bench_matching
);
criterion_main!(benches);
