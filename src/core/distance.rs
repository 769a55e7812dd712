use crate::models::{BoundingBox, Coordinate};

/// Earth's radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Largest amount a distance can shrink by when rounded to one decimal
const ROUNDING_SLACK_KM: f64 = 0.05;

/// Calculate the Haversine distance between two points in kilometers
///
/// The result is not rounded, see [`distance_km`] for the displayed value.
#[inline]
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> f64 {
    haversine_distance_with_radius(a, b, EARTH_RADIUS_KM)
}

/// Haversine distance on a sphere of the given radius
#[inline]
pub fn haversine_distance_with_radius(a: Coordinate, b: Coordinate, earth_radius_km: f64) -> f64 {
    let lat1_rad = a.latitude.to_radians();
    let lat2_rad = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    earth_radius_km * c
}

/// Round to exactly one decimal digit
#[inline]
pub fn round_to_tenth(km: f64) -> f64 {
    (km * 10.0).round() / 10.0
}

/// Distance between two points as shown to users: kilometers, one decimal
#[inline]
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    round_to_tenth(haversine_distance(a, b))
}

/// Calculate a bounding box around a center point
///
/// Much cheaper than Haversine, used to discard far away drivers before the
/// exact distance is computed. The box is a superset of the circle: it is
/// padded by the rounding slack so a driver whose rounded distance equals
/// the radius is never rejected, and it spans every longitude when the
/// circle reaches a pole.
pub fn calculate_bounding_box(center: Coordinate, radius_km: f64, earth_radius_km: f64) -> BoundingBox {
    let angular = (radius_km.max(0.0) + ROUNDING_SLACK_KM) / earth_radius_km;
    let lat = center.latitude.to_radians();
    let lon = center.longitude.to_radians();

    let min_lat = lat - angular;
    let max_lat = lat + angular;
    let half_pi = std::f64::consts::FRAC_PI_2;

    if min_lat <= -half_pi || max_lat >= half_pi {
        return BoundingBox {
            min_lat: min_lat.max(-half_pi).to_degrees(),
            max_lat: max_lat.min(half_pi).to_degrees(),
            min_lon: -180.0,
            max_lon: 180.0,
        };
    }

    let ratio = angular.sin() / lat.cos();
    if ratio >= 1.0 {
        return BoundingBox {
            min_lat: min_lat.to_degrees(),
            max_lat: max_lat.to_degrees(),
            min_lon: -180.0,
            max_lon: 180.0,
        };
    }

    let lon_delta = ratio.asin();
    BoundingBox {
        min_lat: min_lat.to_degrees(),
        max_lat: max_lat.to_degrees(),
        min_lon: (lon - lon_delta).to_degrees(),
        max_lon: (lon + lon_delta).to_degrees(),
    }
}

/// Check if a point is within a bounding box
///
/// Boxes crossing the antimeridian have `min_lon < -180` or `max_lon > 180`;
/// the point is tested in its shifted positions as well.
#[inline]
pub fn is_within_bounding_box(point: Coordinate, bbox: &BoundingBox) -> bool {
    if point.latitude < bbox.min_lat || point.latitude > bbox.max_lat {
        return false;
    }

    let lon = point.longitude;
    let in_range = |l: f64| l >= bbox.min_lon && l <= bbox.max_lon;
    in_range(lon) || in_range(lon + 360.0) || in_range(lon - 360.0)
}
