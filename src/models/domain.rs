use serde::{Deserialize, Serialize};
use validator::Validate;

/// A point on the earth's surface in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct Coordinate {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

impl Coordinate {
    /// Latitude/longitude (0, 0), the fallback for drivers without a usable position
    pub const ORIGIN: Coordinate = Coordinate {
        latitude: 0.0,
        longitude: 0.0,
    };

    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Finite and inside [-90, 90] x [-180, 180]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite() && self.validate().is_ok()
    }
}

/// Normalized driver record. Every field is filled in, absent source
/// values have already been replaced by their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: String,
    pub name: String,
    pub coordinates: Coordinate,
    pub rating: f64,
    /// False when the source record carried no rating and `rating` is the default
    pub rated: bool,
    #[serde(rename = "tripCount")]
    pub trip_count: u64,
    #[serde(rename = "vehicleType")]
    pub vehicle_type: String,
    #[serde(rename = "vehicleModel")]
    pub vehicle_model: String,
    #[serde(rename = "locationLabel")]
    pub location_label: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

/// A snapshot annotated with its distance from the reference point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntity {
    #[serde(flatten)]
    pub entity: EntitySnapshot,
    /// Great-circle distance rounded to one decimal place
    #[serde(rename = "distanceKm")]
    pub distance_km: f64,
}

impl RankedEntity {
    pub fn id(&self) -> &str {
        &self.entity.id
    }
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// Lifecycle of a single observation session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FeedStatus {
    AwaitingLocation,
    Subscribing,
    Ready,
    Failed,
}

/// Terminal failures surfaced to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// The host has no way of locating the user
    LocationUnavailable,
    LocationDenied,
    LocationTimeout,
}

impl ErrorKind {
    /// Human-readable message shown instead of the driver list
    pub fn message(&self) -> &'static str {
        match self {
            ErrorKind::LocationUnavailable => "Location services are not supported on this device",
            ErrorKind::LocationDenied => "Failed to determine your location",
            ErrorKind::LocationTimeout => "Timed out while determining your location",
        }
    }
}
