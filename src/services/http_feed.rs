use crate::models::{FeedPayload, RawRecord};
use crate::services::feed::{FeedSource, FeedSubscription};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Errors that can occur when reading the realtime database
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid or missing auth token")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Realtime database REST client
///
/// Reads `{base_url}/{collection}.json` on a fixed interval and pushes the
/// whole collection whenever it differs from the previous read. Failed reads
/// are logged and retried on the next tick.
#[derive(Clone)]
pub struct HttpFeed {
    base_url: String,
    auth_token: Option<String>,
    poll_interval: Duration,
    client: Client,
}

impl HttpFeed {
    /// Create a new realtime database client
    pub fn new(
        base_url: String,
        auth_token: Option<String>,
        poll_interval: Duration,
        request_timeout: Duration,
    ) -> Result<Self, FeedError> {
        let client = Client::builder().timeout(request_timeout).build()?;

        Ok(Self {
            base_url,
            auth_token,
            poll_interval,
            client,
        })
    }

    fn collection_url(&self, collection_path: &str) -> String {
        format!(
            "{}/{}.json",
            self.base_url.trim_end_matches('/'),
            collection_path.trim_matches('/')
        )
    }

    /// Read the current state of a collection once
    pub async fn fetch(&self, collection_path: &str) -> Result<FeedPayload, FeedError> {
        let url = self.collection_url(collection_path);

        tracing::trace!("Fetching collection from: {}", url);

        let mut request = self.client.get(&url);
        if let Some(token) = &self.auth_token {
            request = request.query(&[("auth", token)]);
        }

        let response = request.send().await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(FeedError::Unauthorized),
            status if !status.is_success() => {
                return Err(FeedError::ApiError(format!(
                    "Failed to fetch {}: {}",
                    collection_path, status
                )))
            }
            _ => {}
        }

        let json: Value = response.json().await?;
        parse_collection(json)
    }

    async fn poll(
        self,
        collection_path: String,
        tx: mpsc::Sender<FeedPayload>,
        cancel: CancellationToken,
    ) {
        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last: Option<FeedPayload> = None;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {}
            }

            let fetched = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                fetched = self.fetch(&collection_path) => fetched,
            };

            match fetched {
                Ok(payload) => {
                    if last.as_ref() == Some(&payload) {
                        continue;
                    }
                    if tx.send(payload.clone()).await.is_err() {
                        break;
                    }
                    last = Some(payload);
                }
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", collection_path, e);
                }
            }
        }

        tracing::debug!("Stopped polling {}", collection_path);
    }
}

impl FeedSource for HttpFeed {
    /// Must be called from within a tokio runtime, polling runs on a spawned task
    fn subscribe(&self, collection_path: &str) -> FeedSubscription {
        let (tx, cancel, subscription) = FeedSubscription::channel();
        tokio::spawn(self.clone().poll(collection_path.to_string(), tx, cancel));
        tracing::info!("Polling {} every {:?}", self.collection_url(collection_path), self.poll_interval);
        subscription
    }
}

/// Parse a collection read into a payload
///
/// `null` means the collection does not exist. The database returns arrays
/// for collections keyed by small integers, indexes become ids and holes are
/// skipped. Entries that are not objects are skipped with a warning, fields of
/// the wrong type inside an object are treated as absent.
pub fn parse_collection(json: Value) -> Result<FeedPayload, FeedError> {
    let entries: Vec<(String, Value)> = match json {
        Value::Null => return Ok(None),
        Value::Object(map) => map.into_iter().collect(),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .filter(|(_, v)| !v.is_null())
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        other => {
            return Err(FeedError::InvalidResponse(format!(
                "Expected an object, got {}",
                other
            )))
        }
    };

    let records: BTreeMap<String, RawRecord> = entries
        .into_iter()
        .filter(|(id, value)| {
            if !value.is_object() {
                tracing::warn!("Skipping driver entry {}: not an object", id);
            }
            value.is_object()
        })
        .filter_map(|(id, value)| match serde_json::from_value::<RawRecord>(value) {
            Ok(record) => Some((id, record)),
            Err(e) => {
                tracing::warn!("Skipping malformed driver record {}: {}", id, e);
                None
            }
        })
        .collect();

    Ok(Some(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_null_collection() {
        assert_eq!(parse_collection(Value::Null).unwrap(), None);
    }

    #[test]
    fn test_parse_object_collection() {
        let payload = parse_collection(json!({
            "d1": { "name": "Omar", "coordinates": { "lat": 24.7, "lng": 46.6 } },
            "d2": { "name": "Nasser" }
        }))
        .unwrap()
        .unwrap();

        assert_eq!(payload.len(), 2);
        assert_eq!(payload["d1"].name.as_deref(), Some("Omar"));
    }

    #[test]
    fn test_parse_array_collection_skips_holes() {
        let payload = parse_collection(json!([null, { "name": "Ali" }, { "name": "Huda" }]))
            .unwrap()
            .unwrap();

        let ids: Vec<_> = payload.keys().cloned().collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_parse_skips_non_object_entries() {
        let payload = parse_collection(json!({
            "ok": { "name": "Reem" },
            "bad": "not a driver",
            "list": [1, 2, 3],
            "odd": { "rating": "five" }
        }))
        .unwrap()
        .unwrap();

        let ids: Vec<_> = payload.keys().cloned().collect();
        assert_eq!(ids, vec!["odd", "ok"]);
        assert!(payload["odd"].rating.is_none());
    }

    #[test]
    fn test_wrongly_typed_fields_keep_the_driver() {
        let payload = parse_collection(json!({
            "string_rating": { "name": "Sara", "coordinates": { "lat": 24.72, "lng": 46.68 }, "rating": "4.5" },
            "float_trips": { "name": "Faisal", "coordinates": { "lat": 24.72, "lng": 46.68 }, "trips": 3.5 },
            "string_coords": { "name": "Lama", "coordinates": { "lat": "24.72", "lng": "46.68" } }
        }))
        .unwrap();

        let snapshots = crate::core::normalize_collection(payload);
        let result = crate::core::ProximityRanker::default()
            .compute(crate::models::Coordinate::new(24.7136, 46.6753), snapshots);

        assert_eq!(result.total_tracked, 3);
        let ids: Vec<_> = result.entities.iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec!["float_trips", "string_coords", "string_rating"]);
        assert!(result.entities.iter().all(|e| e.distance_km == 0.9));
        assert_eq!(result.entities[0].entity.trip_count, 3);
        assert_eq!(result.entities[2].entity.rating, 4.5);
    }

    #[test]
    fn test_parse_rejects_scalars() {
        assert!(matches!(parse_collection(json!(42)), Err(FeedError::InvalidResponse(_))));
    }

    #[test]
    fn test_collection_url() {
        let feed = HttpFeed::new(
            "https://example.firebaseio.com/".to_string(),
            None,
            Duration::from_secs(1),
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(feed.collection_url("/drivers"), "https://example.firebaseio.com/drivers.json");
    }

    #[tokio::test]
    async fn test_fetch_and_subscribe() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/drivers.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{ "d1": { "name": "Omar", "coordinates": { "lat": 24.75, "lng": 46.7 } } }"#)
            .expect_at_least(1)
            .create_async()
            .await;

        let feed = HttpFeed::new(server.url(), None, Duration::from_millis(20), Duration::from_secs(5)).unwrap();

        let fetched = feed.fetch("drivers").await.unwrap().unwrap();
        assert_eq!(fetched["d1"].name.as_deref(), Some("Omar"));

        let mut subscription = feed.subscribe("drivers");
        let pushed = tokio::time::timeout(Duration::from_secs(5), subscription.next())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(pushed, Some(fetched));

        subscription.unsubscribe();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unauthorized_read() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/drivers.json")
            .match_query(mockito::Matcher::Any)
            .with_status(401)
            .create_async()
            .await;

        let feed = HttpFeed::new(server.url(), Some("bad".to_string()), Duration::from_secs(1), Duration::from_secs(5)).unwrap();

        assert!(matches!(feed.fetch("drivers").await, Err(FeedError::Unauthorized)));
    }
}
