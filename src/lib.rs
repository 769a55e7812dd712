//! Nearby Drivers - live proximity feed service
//!
//! Locates the user once, subscribes to the realtime drivers collection and
//! keeps a radius-filtered, distance-sorted view of the drivers around them.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{ProximityRanker, ProximityResult, distance::{distance_km, haversine_distance, calculate_bounding_box}};
pub use crate::models::{Coordinate, EntitySnapshot, RankedEntity, RawRecord, FeedStatus, ErrorKind, ProximityView};
pub use crate::services::{ChannelFeed, FeedSource, LocationProvider, ProximityFeed};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Verify that the library exports work correctly
        let center = Coordinate::new(40.7128, -74.0060);
        let bbox = calculate_bounding_box(center, 10.0, crate::core::distance::EARTH_RADIUS_KM);
        assert!(bbox.min_lat < 40.7128);
        assert_eq!(distance_km(center, center), 0.0);
    }
}
