use crate::models::{Coordinate, EntitySnapshot, RankedEntity};
use crate::core::{
    distance::{haversine_distance_with_radius, round_to_tenth, EARTH_RADIUS_KM},
    filters::{matches_bounding_box, within_radius, ProximityQuery},
};

/// Drivers shown by default are those within this many kilometers
pub const DEFAULT_RADIUS_KM: f64 = 10.0;

/// Result of one proximity recomputation
#[derive(Debug, Clone, PartialEq)]
pub struct ProximityResult {
    /// Drivers within the radius, nearest first
    pub entities: Vec<RankedEntity>,
    /// Number of drivers in the feed before filtering
    pub total_tracked: usize,
}

/// Filters and orders a full set of driver snapshots around a reference point
///
/// # Pipeline Stages
/// 1. Geospatial bounding box pre-filter
/// 2. Distance annotation (haversine, rounded to one decimal)
/// 3. Radius filter
/// 4. Ascending sort by distance, ties by driver id
///
/// The output depends only on the inputs, nothing is carried over between calls.
#[derive(Debug, Clone, Copy)]
pub struct ProximityRanker {
    radius_km: f64,
    earth_radius_km: f64,
}

impl ProximityRanker {
    pub fn new(radius_km: f64, earth_radius_km: f64) -> Self {
        Self {
            radius_km,
            earth_radius_km,
        }
    }

    pub fn with_radius(radius_km: f64) -> Self {
        Self::new(radius_km, EARTH_RADIUS_KM)
    }

    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }

    /// Rank the snapshots around `reference`
    ///
    /// O(n log n) in the number of snapshots.
    pub fn compute(&self, reference: Coordinate, snapshots: Vec<EntitySnapshot>) -> ProximityResult {
        let total_tracked = snapshots.len();
        let query = ProximityQuery::new(reference, self.radius_km, self.earth_radius_km);

        let mut entities: Vec<RankedEntity> = snapshots
            .into_iter()
            // Stage 1: Geospatial pre-filter
            .filter(|snapshot| matches_bounding_box(snapshot, &query))
            // Stage 2 & 3: Annotate and apply the radius
            .filter_map(|entity| {
                let distance_km = round_to_tenth(haversine_distance_with_radius(
                    reference,
                    entity.coordinates,
                    self.earth_radius_km,
                ));

                within_radius(distance_km, &query).then_some(RankedEntity { entity, distance_km })
            })
            .collect();

        // Stage 4: Nearest first, id keeps equal distances deterministic
        entities.sort_by(|a, b| {
            a.distance_km
                .total_cmp(&b.distance_km)
                .then_with(|| a.entity.id.cmp(&b.entity.id))
        });

        ProximityResult {
            entities,
            total_tracked,
        }
    }
}

impl Default for ProximityRanker {
    fn default() -> Self {
        Self::new(DEFAULT_RADIUS_KM, EARTH_RADIUS_KM)
    }
}

/// Rank snapshots within `radius_km` of `reference` on the standard earth sphere
pub fn compute_proximity(
    reference: Coordinate,
    snapshots: Vec<EntitySnapshot>,
    radius_km: f64,
) -> ProximityResult {
    ProximityRanker::with_radius(radius_km).compute(reference, snapshots)
}
