use chrono::{Duration, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use feed_ranking::geohash::{encode, POST_PRECISION};
use feed_ranking::metrics::RequestContext;
use feed_ranking::{Candidate, MultiFactorRanker};
use uuid::Uuid;

fn batch(size: usize) -> Vec<Candidate> {
    let now = Utc::now();
    (0..size)
        .map(|i| {
            let latitude = 37.70 + (i % 100) as f64 * 0.001;
            let longitude = -122.50 + (i % 37) as f64 * 0.002;
            Candidate {
                post_id: Uuid::new_v4(),
                author_id: Uuid::new_v4(),
                created_at: now - Duration::seconds(i as i64 * 13),
                latitude: Some(latitude),
                longitude: Some(longitude),
                likes_count: (i % 97) as i64,
                comments_count: (i % 11) as i64,
                geo_cell: encode(latitude, longitude, POST_PRECISION).ok(),
                image_url: String::new(),
                caption: None,
                location_name: None,
                author_username: String::new(),
                author_avatar_url: None,
            }
        })
        .collect()
}

/// Over-fetched batch sizes for page limits 10, 20 and 50
fn bench_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("multi_factor_rank");
    let ranker = MultiFactorRanker::default();
    let ctx = RequestContext::new(Utc::now(), 37.7749, -122.4194);

    for size in [50_usize, 100, 250] {
        let candidates = batch(size);
        group.bench_with_input(format!("batch_{}", size), &candidates, |b, cands| {
            b.iter(|| ranker.rank(black_box(cands.clone()), &ctx, size / 5))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_rank);
criterion_main!(benches);
