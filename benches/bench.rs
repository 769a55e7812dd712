// Criterion benchmarks for Nearby Drivers

use criterion::{black_box, criterion_group, criterion_main, Criterion, BenchmarkId};
use nearby_drivers::core::{
    ProximityRanker,
    distance::{haversine_distance, calculate_bounding_box, EARTH_RADIUS_KM},
    normalize::normalize_collection,
};
use nearby_drivers::models::{Coordinate, FeedPayload, RawCoordinates, RawRecord};
use std::collections::BTreeMap;

const RIYADH: Coordinate = Coordinate {
    latitude: 24.7136,
    longitude: 46.6753,
};

fn create_collection(count: usize) -> FeedPayload {
    let records = (0..count)
        .map(|i| {
            // Spread drivers over roughly 50km so about a fifth are within range
            let lat_offset = ((i * 37) % 100) as f64 * 0.0045 - 0.225;
            let lon_offset = ((i * 61) % 100) as f64 * 0.0045 - 0.225;
            let record = RawRecord {
                name: Some(format!("Driver {}", i)),
                coordinates: Some(RawCoordinates {
                    lat: Some(RIYADH.latitude + lat_offset),
                    lng: Some(RIYADH.longitude + lon_offset),
                }),
                rating: if i % 3 == 0 { None } else { Some(4.5) },
                trips: Some(i as u64),
                ..Default::default()
            };
            (format!("d{}", i), record)
        })
        .collect::<BTreeMap<_, _>>();

    Some(records)
}

fn bench_haversine_distance(c: &mut Criterion) {
    c.bench_function("haversine_distance", |b| {
        b.iter(|| {
            haversine_distance(
                black_box(RIYADH),
                black_box(Coordinate::new(24.75, 46.70)),
            )
        });
    });
}

fn bench_bounding_box(c: &mut Criterion) {
    c.bench_function("bounding_box_calculation", |b| {
        b.iter(|| {
            calculate_bounding_box(
                black_box(RIYADH),
                black_box(10.0),
                black_box(EARTH_RADIUS_KM),
            )
        });
    });
}

fn bench_recompute(c: &mut Criterion) {
    let ranker = ProximityRanker::default();

    let mut group = c.benchmark_group("recompute");

    for driver_count in [10, 100, 1000, 10000].iter() {
        let payload = create_collection(*driver_count);

        group.bench_with_input(
            BenchmarkId::new("normalize_and_rank", driver_count),
            driver_count,
            |b, _| {
                b.iter(|| {
                    let snapshots = normalize_collection(black_box(payload.clone()));
                    ranker.compute(black_box(RIYADH), snapshots)
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_haversine_distance,
    bench_bounding_box,
    bench_recompute
);

criterion_main!(benches);
