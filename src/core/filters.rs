use crate::core::distance::{calculate_bounding_box, is_within_bounding_box};
use crate::models::{BoundingBox, Coordinate, EntitySnapshot};

/// Parameters of one proximity recomputation
#[derive(Debug, Clone, Copy)]
pub struct ProximityQuery {
    pub reference: Coordinate,
    pub radius_km: f64,
    pub bounding_box: BoundingBox,
}

impl ProximityQuery {
    pub fn new(reference: Coordinate, radius_km: f64, earth_radius_km: f64) -> Self {
        Self {
            reference,
            radius_km,
            bounding_box: calculate_bounding_box(reference, radius_km, earth_radius_km),
        }
    }
}

/// Stage 1 - geospatial pre-filter, cheap and never stricter than the radius
#[inline]
pub fn matches_bounding_box(snapshot: &EntitySnapshot, query: &ProximityQuery) -> bool {
    is_within_bounding_box(snapshot.coordinates, &query.bounding_box)
}

/// Stage 2 - inclusion rule on the rounded distance
#[inline]
pub fn within_radius(distance_km: f64, query: &ProximityQuery) -> bool {
    distance_km <= query.radius_km
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::distance::EARTH_RADIUS_KM;
    use crate::core::normalize::normalize;
    use crate::models::{RawCoordinates, RawRecord};

    fn snapshot_at(lat: f64, lng: f64) -> EntitySnapshot {
        normalize(
            "d",
            RawRecord {
                coordinates: Some(RawCoordinates { lat: Some(lat), lng: Some(lng) }),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_bounding_box_stage() {
        let query = ProximityQuery::new(Coordinate::new(24.7136, 46.6753), 10.0, EARTH_RADIUS_KM);

        assert!(matches_bounding_box(&snapshot_at(24.75, 46.70), &query));
        assert!(!matches_bounding_box(&snapshot_at(21.4858, 39.1925), &query));
    }

    #[test]
    fn test_radius_is_inclusive() {
        let query = ProximityQuery::new(Coordinate::ORIGIN, 10.0, EARTH_RADIUS_KM);

        assert!(within_radius(10.0, &query));
        assert!(within_radius(0.0, &query));
        assert!(!within_radius(10.1, &query));
        assert!(!within_radius(15.0, &query));
    }
}
