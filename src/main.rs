use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use nearby_drivers::config::{LogFormat, Settings};
use nearby_drivers::routes::{self, drivers::AppState};
use nearby_drivers::services::{ConfiguredLocation, HttpFeed, HttpLocation, ProximityFeed, StaticLocation, WebhookActions};
use std::sync::Arc;
use tracing::{info, error, warn};
use tracing_subscriber::EnvFilter;

/// JSON error response for malformed paths and queries
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self)
    }
}

/// Handle path extraction errors
pub fn handle_path_error(err: error::PathError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("Path error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_path".to_string(),
        message: format!("Invalid path: {}", err),
        status_code: 400,
    }
    .into()
}

fn init_logging(settings: &Settings) {
    let filter = EnvFilter::try_new(&settings.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    match settings.logging.log_format() {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Pretty => subscriber.pretty().init(),
        LogFormat::Compact => subscriber.compact().init(),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    init_logging(&settings);

    info!("Starting nearby drivers service...");

    let location = match &settings.location.provider_url {
        Some(url) => {
            let provider = HttpLocation::new(url.clone(), settings.location.timeout()).map_err(|e| {
                error!("Failed to create location client: {}", e);
                std::io::Error::other(e.to_string())
            })?;
            info!("Using location lookup at {}", url);
            ConfiguredLocation::Http(provider)
        }
        None => {
            let reference = settings.location.reference_point();
            if reference.is_none() {
                warn!("No reference point configured, the feed will report LocationUnavailable");
            }
            ConfiguredLocation::Static(StaticLocation::new(reference))
        }
    };

    let feed = HttpFeed::new(
        settings.feed.base_url.clone(),
        settings.feed.auth_token.clone(),
        settings.feed.poll_interval(),
        settings.feed.request_timeout(),
    )
    .map_err(|e| {
        error!("Failed to create feed client: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    let actions = match &settings.actions.webhook_url {
        Some(url) => match WebhookActions::new(url.clone(), settings.actions.timeout()) {
            Ok(actions) => Some(Arc::new(actions)),
            Err(e) => {
                error!("Failed to create action client ({}), actions disabled", e);
                None
            }
        },
        None => {
            info!("No action webhook configured, chat and booking are disabled");
            None
        }
    };

    let ranker = settings.proximity.ranker();
    info!("Showing drivers within {} km", ranker.radius_km());

    let observation = ProximityFeed::new(location, feed, ranker)
        .with_collection(settings.feed.collection.clone())
        .spawn();

    let app_state = AppState {
        view: observation.view(),
        actions,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    let served = HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::PathConfig::default().error_handler(handle_path_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await;

    let status = observation.shutdown().await;
    info!("Feed session stopped in state {:?}", status);

    served
}
