use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Driver record as stored in the realtime database. Nothing is guaranteed
/// to be present; the normalizer fills the gaps.
///
/// Every field is read leniently: a value of the wrong type is treated as
/// absent instead of rejecting the whole record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_coordinates")]
    pub coordinates: Option<RawCoordinates>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub rating: Option<f64>,
    #[serde(default, alias = "tripCount", deserialize_with = "lenient_count")]
    pub trips: Option<u64>,
    #[serde(rename = "carType", alias = "vehicleType", default, deserialize_with = "lenient_string")]
    pub car_type: Option<String>,
    #[serde(rename = "carModel", alias = "vehicleModel", default, deserialize_with = "lenient_string")]
    pub car_model: Option<String>,
    #[serde(default, alias = "locationLabel", deserialize_with = "lenient_string")]
    pub location: Option<String>,
    #[serde(rename = "imageUrl", default, deserialize_with = "lenient_string")]
    pub image_url: Option<String>,
}

/// Position as written by the driver app, either component may be missing
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCoordinates {
    #[serde(default, alias = "latitude", deserialize_with = "lenient_f64")]
    pub lat: Option<f64>,
    #[serde(default, alias = "longitude", deserialize_with = "lenient_f64")]
    pub lng: Option<f64>,
}

/// One full-collection push keyed by driver id. `None` when the collection
/// is absent or null.
pub type FeedPayload = Option<BTreeMap<String, RawRecord>>;

/// Numbers, or strings holding a number
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(number(&value).filter(|n| n.is_finite()))
}

/// Non-negative counts, fractions are truncated
fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(number(&value)
        .filter(|n| n.is_finite() && *n >= 0.0)
        .map(|n| n.trunc() as u64))
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_coordinates<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<RawCoordinates>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_field_names() {
        let raw: RawRecord = serde_json::from_str(
            r#"{
                "name": "Khalid",
                "coordinates": { "lat": 24.75, "lng": 46.7 },
                "rating": 4.8,
                "trips": 120,
                "carType": "SUV",
                "carModel": "Tahoe",
                "location": "Al Malqa",
                "imageUrl": "https://cdn.example.com/k.png"
            }"#,
        )
        .unwrap();

        assert_eq!(raw.name.as_deref(), Some("Khalid"));
        assert_eq!(raw.coordinates.unwrap().lng, Some(46.7));
        assert_eq!(raw.trips, Some(120));
        assert_eq!(raw.car_type.as_deref(), Some("SUV"));
    }

    #[test]
    fn test_aliases_and_missing_fields() {
        let raw: RawRecord = serde_json::from_str(
            r#"{ "tripCount": 7, "vehicleType": "Van", "coordinates": { "latitude": 1.5 } }"#,
        )
        .unwrap();

        assert_eq!(raw.trips, Some(7));
        assert_eq!(raw.car_type.as_deref(), Some("Van"));
        assert_eq!(raw.coordinates.unwrap().lat, Some(1.5));
        assert_eq!(raw.coordinates.unwrap().lng, None);
        assert!(raw.rating.is_none());
        assert!(raw.name.is_none());
    }

    #[test]
    fn test_nulls_deserialize_as_absent() {
        let raw: RawRecord =
            serde_json::from_str(r#"{ "name": null, "coordinates": null, "rating": null }"#).unwrap();
        assert_eq!(raw, RawRecord::default());
    }

    #[test]
    fn test_wrongly_typed_fields_degrade_to_absent() {
        let raw: RawRecord = serde_json::from_str(
            r#"{
                "name": 42,
                "coordinates": { "lat": "24.72", "lng": 46.68 },
                "rating": "4.5",
                "trips": 3.5,
                "carType": ["Sedan"],
                "imageUrl": false
            }"#,
        )
        .unwrap();

        assert_eq!(raw.name.as_deref(), Some("42"));
        assert_eq!(raw.coordinates, Some(RawCoordinates { lat: Some(24.72), lng: Some(46.68) }));
        assert_eq!(raw.rating, Some(4.5));
        assert_eq!(raw.trips, Some(3));
        assert!(raw.car_type.is_none());
        assert!(raw.image_url.is_none());
    }

    #[test]
    fn test_unusable_values_are_absent() {
        let raw: RawRecord = serde_json::from_str(
            r#"{ "coordinates": "somewhere", "rating": "five", "trips": -1 }"#,
        )
        .unwrap();

        assert!(raw.coordinates.is_none());
        assert!(raw.rating.is_none());
        assert!(raw.trips.is_none());

        let coords: RawCoordinates = serde_json::from_str(r#"{ "lat": true, "lng": "east" }"#).unwrap();
        assert_eq!(coords, RawCoordinates::default());
    }
}
