use reqwest::Client;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when handing an action to the booking/chat backend
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Action rejected: {0}")]
    Rejected(String),

    #[error("Invalid driver id")]
    InvalidDriver,
}

/// Side effects triggered from the driver list. Each call returns the id
/// of the request it submitted.
pub trait ActionDelegate: Send + Sync {
    /// Open a chat with the driver
    fn open_conversation(&self, driver_id: &str) -> impl Future<Output = Result<String, ActionError>> + Send;

    /// Ask to book the driver
    fn reserve_entity(&self, driver_id: &str) -> impl Future<Output = Result<String, ActionError>> + Send;
}

#[derive(Debug, Serialize)]
struct ActionPayload<'a> {
    #[serde(rename = "driverId")]
    driver_id: &'a str,
    #[serde(rename = "requestId")]
    request_id: String,
}

/// Forwards actions as JSON posts to `{base_url}/conversations` and
/// `{base_url}/reservations`
#[derive(Clone)]
pub struct WebhookActions {
    base_url: String,
    client: Client,
}

impl WebhookActions {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, ActionError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, client })
    }

    async fn post(&self, endpoint: &str, driver_id: &str) -> Result<String, ActionError> {
        if driver_id.trim().is_empty() {
            return Err(ActionError::InvalidDriver);
        }

        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), endpoint);
        let payload = ActionPayload {
            driver_id,
            request_id: uuid::Uuid::new_v4().to_string(),
        };

        let response = self.client.post(&url).json(&payload).send().await?;

        if !response.status().is_success() {
            return Err(ActionError::Rejected(format!(
                "{} returned {}",
                endpoint,
                response.status()
            )));
        }

        tracing::info!("Submitted {} request {} for driver {}", endpoint, payload.request_id, driver_id);
        Ok(payload.request_id)
    }
}

impl ActionDelegate for WebhookActions {
    async fn open_conversation(&self, driver_id: &str) -> Result<String, ActionError> {
        self.post("conversations", driver_id).await
    }

    async fn reserve_entity(&self, driver_id: &str) -> Result<String, ActionError> {
        self.post("reservations", driver_id).await
    }
}
