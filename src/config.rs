use crate::core::distance::EARTH_RADIUS_KM;
use crate::core::ranker::{ProximityRanker, DEFAULT_RADIUS_KM};
use crate::models::Coordinate;
use crate::services::subscription::DRIVERS_COLLECTION;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use validator::Validate;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub feed: FeedSettings,
    #[serde(default)]
    pub location: LocationSettings,
    #[serde(default)]
    pub proximity: ProximitySettings,
    #[serde(default)]
    pub actions: ActionSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

/// Realtime database the drivers feed is read from
#[derive(Debug, Clone, Deserialize)]
pub struct FeedSettings {
    #[serde(default = "default_feed_url")]
    pub base_url: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    pub auth_token: Option<String>,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            base_url: default_feed_url(),
            collection: default_collection(),
            auth_token: None,
            poll_interval_ms: default_poll_interval_ms(),
            request_timeout_secs: default_timeout_secs(),
        }
    }
}

impl FeedSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_feed_url() -> String { "http://localhost:9000".to_string() }
fn default_collection() -> String { DRIVERS_COLLECTION.to_string() }
fn default_poll_interval_ms() -> u64 { 2000 }
fn default_timeout_secs() -> u64 { 10 }

/// Where the user is. Either a fixed point or a lookup endpoint; with
/// neither the session fails with `LocationUnavailable`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LocationSettings {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    pub provider_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LocationSettings {
    fn default() -> Self {
        Self {
            latitude: None,
            longitude: None,
            provider_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl LocationSettings {
    /// The configured fixed point, only when both components are set
    pub fn reference_point(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinate::new(latitude, longitude)),
            _ => None,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProximitySettings {
    #[serde(default = "default_radius_km")]
    #[validate(range(min = 0.0))]
    pub radius_km: f64,
    #[serde(default = "default_earth_radius_km")]
    #[validate(range(min = 1.0))]
    pub earth_radius_km: f64,
}

impl Default for ProximitySettings {
    fn default() -> Self {
        Self {
            radius_km: default_radius_km(),
            earth_radius_km: default_earth_radius_km(),
        }
    }
}

impl ProximitySettings {
    pub fn ranker(&self) -> ProximityRanker {
        ProximityRanker::new(self.radius_km, self.earth_radius_km)
    }
}

fn default_radius_km() -> f64 { DEFAULT_RADIUS_KM }
fn default_earth_radius_km() -> f64 { EARTH_RADIUS_KM }

/// Chat and booking backend
#[derive(Debug, Clone, Deserialize)]
pub struct ActionSettings {
    pub webhook_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ActionSettings {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ActionSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

/// Output format of the log subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl LoggingSettings {
    /// `json` and `pretty` are recognised, anything else is compact text
    pub fn log_format(&self) -> LogFormat {
        match self.format.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Compact,
        }
    }
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with NEARBY__)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., NEARBY__FEED__BASE_URL -> feed.base_url
            .add_source(
                Environment::with_prefix("NEARBY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings = apply_env_overrides(settings)?;

        settings.try_deserialize::<Self>()?.validated()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("NEARBY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize::<Self>()?.validated()
    }

    fn validated(self) -> Result<Self, ConfigError> {
        self.location
            .validate()
            .map_err(|e| ConfigError::Message(format!("Invalid location settings: {}", e)))?;
        self.proximity
            .validate()
            .map_err(|e| ConfigError::Message(format!("Invalid proximity settings: {}", e)))?;
        Ok(self)
    }
}

/// Short environment names for the values that usually differ per deployment
fn apply_env_overrides(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(base_url) = env::var("FEED_BASE_URL") {
        builder = builder.set_override("feed.base_url", base_url)?;
    }
    if let Ok(token) = env::var("FEED_AUTH_TOKEN") {
        builder = builder.set_override("feed.auth_token", token)?;
    }
    if let Ok(level) = env::var("LOG_LEVEL") {
        builder = builder.set_override("logging.level", level)?;
    }
    if let Ok(format) = env::var("LOG_FORMAT") {
        builder = builder.set_override("logging.format", format)?;
    }

    builder.build()
}
