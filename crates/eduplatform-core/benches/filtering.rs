use criterion::{black_box, criterion_group, criterion_main, Criterion};

use eduplatform_core::filter::ListFilter;
use eduplatform_core::mock::post;
use eduplatform_core::model::{Category, ForumPost};

fn make_posts(n: usize) -> Vec<ForumPost> {
    (0..n)
        .map(|i| {
            post(
                &i.to_string(),
                &format!("Post number {i} about ownership"),
                &format!("Body {i}: lifetimes, traits and the borrow checker"),
                Category::ALL[i % Category::ALL.len()],
            )
        })
        .collect()
}

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("forum_filter");

    let small = make_posts(50);
    let large = make_posts(5_000);

    let search_only = ListFilter::<Category>::new("BORROW", None);
    let combined = ListFilter::new("number 4", Some(Category::Help));
    let no_match = ListFilter::<Category>::new("no such text anywhere", None);

    group.bench_function("50_search", |b| {
        b.iter(|| search_only.apply(black_box(&small)).len())
    });

    group.bench_function("5000_search", |b| {
        b.iter(|| search_only.apply(black_box(&large)).len())
    });

    group.bench_function("5000_search_and_category", |b| {
        b.iter(|| combined.apply(black_box(&large)).len())
    });

    group.bench_function("5000_no_match", |b| {
        b.iter(|| no_match.apply(black_box(&large)).len())
    });

    group.finish();
}

criterion_group!(benches, bench_filter);
criterion_main!(benches);
