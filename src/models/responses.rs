use serde::{Deserialize, Serialize};
use crate::models::domain::{ErrorKind, FeedStatus, RankedEntity};

/// What the presentation layer renders: lifecycle status, the error (if
/// any) and the nearest drivers in ascending distance order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProximityView {
    pub status: FeedStatus,
    pub error: Option<ErrorKind>,
    pub message: Option<String>,
    pub result: Vec<RankedEntity>,
    #[serde(rename = "totalTracked")]
    pub total_tracked: usize,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl ProximityView {
    pub fn awaiting_location() -> Self {
        Self {
            status: FeedStatus::AwaitingLocation,
            error: None,
            message: None,
            result: Vec::new(),
            total_tracked: 0,
            updated_at: None,
        }
    }

    pub fn subscribing() -> Self {
        Self {
            status: FeedStatus::Subscribing,
            ..Self::awaiting_location()
        }
    }

    pub fn ready(result: Vec<RankedEntity>, total_tracked: usize) -> Self {
        Self {
            status: FeedStatus::Ready,
            error: None,
            message: None,
            result,
            total_tracked,
            updated_at: Some(chrono::Utc::now()),
        }
    }

    /// Errors never carry a partial result
    pub fn failed(kind: ErrorKind) -> Self {
        Self {
            status: FeedStatus::Failed,
            error: Some(kind),
            message: Some(kind.message().to_string()),
            result: Vec::new(),
            total_tracked: 0,
            updated_at: Some(chrono::Utc::now()),
        }
    }
}

impl Default for ProximityView {
    fn default() -> Self {
        Self::awaiting_location()
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub feed_status: FeedStatus,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Accepted conversation or reservation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse {
    pub success: bool,
    #[serde(rename = "requestId")]
    pub request_id: String,
}
