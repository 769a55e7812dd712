use crate::models::{Coordinate, ErrorKind};
use reqwest::{Client, StatusCode};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Errors from a one-shot position request
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("Location services are unavailable")]
    Unavailable,

    #[error("Location request denied: {0}")]
    Denied(String),

    #[error("Location request timed out")]
    Timeout,
}

impl LocationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LocationError::Unavailable => ErrorKind::LocationUnavailable,
            LocationError::Denied(_) => ErrorKind::LocationDenied,
            LocationError::Timeout => ErrorKind::LocationTimeout,
        }
    }
}

/// Something that can tell where the user currently is
pub trait LocationProvider: Send + Sync {
    /// One-shot position request
    fn request_current_position(
        &self,
    ) -> impl Future<Output = Result<Coordinate, LocationError>> + Send;
}

/// A fixed reference point, typically read from configuration
#[derive(Debug, Clone, Copy)]
pub struct StaticLocation(Option<Coordinate>);

impl StaticLocation {
    pub fn new(position: Option<Coordinate>) -> Self {
        Self(position)
    }
}

impl LocationProvider for StaticLocation {
    async fn request_current_position(&self) -> Result<Coordinate, LocationError> {
        match self.0 {
            None => Err(LocationError::Unavailable),
            Some(position) if !position.is_valid() => Err(LocationError::Denied(format!(
                "configured position ({}, {}) is out of range",
                position.latitude, position.longitude
            ))),
            Some(position) => Ok(position),
        }
    }
}

/// Looks the position up from an HTTP endpoint answering
/// `{ "latitude": .., "longitude": .. }`
#[derive(Clone)]
pub struct HttpLocation {
    url: String,
    client: Client,
}

impl HttpLocation {
    pub fn new(url: String, timeout: Duration) -> Result<Self, LocationError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LocationError::Denied(e.to_string()))?;

        Ok(Self { url, client })
    }

    async fn lookup(&self) -> Result<Coordinate, LocationError> {
        let response = self.client.get(&self.url).send().await.map_err(map_request_error)?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(LocationError::Denied("permission denied".to_string()))
            }
            status if !status.is_success() => {
                return Err(LocationError::Denied(format!("lookup failed: {}", status)))
            }
            _ => {}
        }

        let position: Coordinate = response.json().await.map_err(map_request_error)?;
        if !position.is_valid() {
            return Err(LocationError::Denied(format!(
                "lookup returned invalid position ({}, {})",
                position.latitude, position.longitude
            )));
        }

        Ok(position)
    }
}

fn map_request_error(e: reqwest::Error) -> LocationError {
    if e.is_timeout() {
        LocationError::Timeout
    } else {
        LocationError::Denied(e.to_string())
    }
}

impl LocationProvider for HttpLocation {
    async fn request_current_position(&self) -> Result<Coordinate, LocationError> {
        tracing::debug!("Requesting position from {}", self.url);
        self.lookup().await
    }
}

/// Provider chosen at startup from configuration
#[derive(Clone)]
pub enum ConfiguredLocation {
    Static(StaticLocation),
    Http(HttpLocation),
}

impl LocationProvider for ConfiguredLocation {
    async fn request_current_position(&self) -> Result<Coordinate, LocationError> {
        match self {
            ConfiguredLocation::Static(provider) => provider.request_current_position().await,
            ConfiguredLocation::Http(provider) => provider.request_current_position().await,
        }
    }
}
