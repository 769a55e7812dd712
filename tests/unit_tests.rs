// Unit tests for Nearby Drivers

use nearby_drivers::core::{
    distance::{distance_km, haversine_distance, calculate_bounding_box, is_within_bounding_box, EARTH_RADIUS_KM},
    normalize::{normalize, DEFAULT_RATING},
    ranker::{compute_proximity, ProximityRanker},
};
use nearby_drivers::models::{Coordinate, EntitySnapshot, RawCoordinates, RawRecord};

fn sample_points() -> Vec<Coordinate> {
    vec![
        Coordinate::new(0.0, 0.0),
        Coordinate::new(24.7136, 46.6753),
        Coordinate::new(24.75, 46.70),
        Coordinate::new(-33.8688, 151.2093),
        Coordinate::new(51.5074, -0.1278),
        Coordinate::new(89.9, 179.9),
        Coordinate::new(-17.0, -179.99),
    ]
}

fn driver(id: &str, lat: f64, lng: f64) -> EntitySnapshot {
    normalize(
        id,
        RawRecord {
            coordinates: Some(RawCoordinates { lat: Some(lat), lng: Some(lng) }),
            ..Default::default()
        },
    )
}

#[test]
fn test_distance_symmetry() {
    for a in sample_points() {
        for b in sample_points() {
            assert_eq!(distance_km(a, b), distance_km(b, a), "{:?} <-> {:?}", a, b);
        }
    }
}

#[test]
fn test_distance_to_self_is_zero() {
    for a in sample_points() {
        assert_eq!(distance_km(a, a), 0.0);
    }
}

#[test]
fn test_haversine_riyadh_to_jeddah() {
    // Riyadh to Jeddah is roughly 850 km
    let riyadh = Coordinate::new(24.7136, 46.6753);
    let jeddah = Coordinate::new(21.4858, 39.1925);

    let distance = haversine_distance(riyadh, jeddah);
    assert!(distance > 800.0 && distance < 900.0, "got {}", distance);
}

#[test]
fn test_bounding_box_never_drops_included_drivers() {
    let center = Coordinate::new(24.7136, 46.6753);
    let bbox = calculate_bounding_box(center, 10.0, EARTH_RADIUS_KM);

    // Sweep points around the center at increasing offsets
    for step in 0..40 {
        let offset = step as f64 * 0.005;
        for (dlat, dlng) in [(offset, 0.0), (-offset, 0.0), (0.0, offset), (0.0, -offset), (offset, offset)] {
            let point = Coordinate::new(center.latitude + dlat, center.longitude + dlng);
            if distance_km(center, point) <= 10.0 {
                assert!(is_within_bounding_box(point, &bbox), "{:?} dropped by the box", point);
            }
        }
    }
}

#[test]
fn test_drivers_beyond_radius_are_absent() {
    let reference = Coordinate::new(24.7136, 46.6753);
    let candidates: Vec<EntitySnapshot> = (0..50)
        .map(|i| driver(&format!("d{:02}", i), 24.7136 + i as f64 * 0.004, 46.6753))
        .collect();

    let result = compute_proximity(reference, candidates.clone(), 10.0);

    for candidate in &candidates {
        let included = result.entities.iter().any(|e| e.id() == candidate.id);
        let distance = distance_km(reference, candidate.coordinates);
        assert_eq!(included, distance <= 10.0, "{} at {} km", candidate.id, distance);
    }
}

#[test]
fn test_result_is_sorted() {
    let reference = Coordinate::new(24.7136, 46.6753);
    let candidates: Vec<EntitySnapshot> = (0..30)
        .map(|i| {
            let angle = i as f64 * 0.7;
            let radius = (i % 7) as f64 * 0.01;
            driver(&i.to_string(), 24.7136 + radius * angle.sin(), 46.6753 + radius * angle.cos())
        })
        .collect();

    let result = ProximityRanker::default().compute(reference, candidates);

    assert!(!result.entities.is_empty());
    for pair in result.entities.windows(2) {
        assert!(pair[0].distance_km <= pair[1].distance_km);
    }
}

#[test]
fn test_custom_radius() {
    let reference = Coordinate::ORIGIN;
    let candidates = vec![driver("near", 0.0, 0.01), driver("mid", 0.0, 0.05)];

    let result = ProximityRanker::with_radius(2.0).compute(reference, candidates);

    assert_eq!(result.entities.len(), 1);
    assert_eq!(result.entities[0].id(), "near");
}

#[test]
fn test_unrated_driver_defaults() {
    let snapshot = normalize("d1", RawRecord::default());

    assert_eq!(snapshot.rating, DEFAULT_RATING);
    assert!(!snapshot.rated);
    assert_eq!(snapshot.trip_count, 0);
}
