// Core algorithm exports
pub mod distance;
pub mod filters;
pub mod normalize;
pub mod ranker;

pub use distance::{distance_km, haversine_distance, calculate_bounding_box, is_within_bounding_box};
pub use filters::{matches_bounding_box, within_radius, ProximityQuery};
pub use normalize::{normalize, normalize_collection};
pub use ranker::{compute_proximity, ProximityRanker, ProximityResult};
