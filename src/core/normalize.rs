use crate::models::{Coordinate, EntitySnapshot, FeedPayload, RawCoordinates, RawRecord};

/// Rating shown for drivers that have not been rated yet
pub const DEFAULT_RATING: f64 = 5.0;

/// Avatar used when a driver has no picture
pub const DEFAULT_IMAGE_URL: &str = "/default-avatar.png";

/// Turn a raw database record into a fully populated snapshot
///
/// Never fails. Missing fields degrade to defaults:
/// - coordinates: (0, 0), per component when only one is missing
/// - rating: [`DEFAULT_RATING`], with `rated` cleared
/// - trips: 0
/// - image: [`DEFAULT_IMAGE_URL`]
/// - text fields: empty
pub fn normalize(id: &str, raw: RawRecord) -> EntitySnapshot {
    let coordinates = normalize_coordinates(id, raw.coordinates);

    let (rating, rated) = match raw.rating {
        Some(rating) if rating.is_finite() => (rating, true),
        _ => (DEFAULT_RATING, false),
    };

    let image_url = raw
        .image_url
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_IMAGE_URL.to_string());

    EntitySnapshot {
        id: id.to_string(),
        name: raw.name.unwrap_or_default(),
        coordinates,
        rating,
        rated,
        trip_count: raw.trips.unwrap_or(0),
        vehicle_type: raw.car_type.unwrap_or_default(),
        vehicle_model: raw.car_model.unwrap_or_default(),
        location_label: raw.location.unwrap_or_default(),
        image_url,
    }
}

fn normalize_coordinates(id: &str, raw: Option<RawCoordinates>) -> Coordinate {
    let Some(raw) = raw else {
        return Coordinate::ORIGIN;
    };

    let coordinate = Coordinate::new(raw.lat.unwrap_or(0.0), raw.lng.unwrap_or(0.0));
    if coordinate.is_valid() {
        coordinate
    } else {
        tracing::warn!(
            "Driver {} has invalid coordinates ({}, {}), using origin",
            id,
            coordinate.latitude,
            coordinate.longitude
        );
        Coordinate::ORIGIN
    }
}

/// Normalize every record of a full-collection push, in id order
///
/// An absent collection is the same as an empty one.
pub fn normalize_collection(payload: FeedPayload) -> Vec<EntitySnapshot> {
    payload
        .unwrap_or_default()
        .into_iter()
        .map(|(id, raw)| normalize(&id, raw))
        .collect()
}
