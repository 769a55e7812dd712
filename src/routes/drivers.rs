use actix_web::{web, HttpResponse, Responder};
use crate::models::{ActionResponse, ErrorResponse, FeedStatus, HealthResponse, ProximityView};
use crate::services::{ActionDelegate, ActionError, WebhookActions};
use std::sync::Arc;
use tokio::sync::watch;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub view: watch::Receiver<ProximityView>,
    pub actions: Option<Arc<WebhookActions>>,
}

/// Configure all driver-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/drivers/nearby", web::get().to(nearby_drivers))
        .route("/drivers/{id}/conversation", web::post().to(open_conversation))
        .route("/drivers/{id}/reservation", web::post().to(reserve_driver));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let feed_status = state.view.borrow().status;
    let status = if feed_status == FeedStatus::Failed { "degraded" } else { "healthy" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        feed_status,
        timestamp: chrono::Utc::now(),
    })
}

/// Nearby drivers endpoint
///
/// GET /api/v1/drivers/nearby
///
/// Always 200, the `status` field tells whether the list is usable:
/// ```json
/// {
///   "status": "ready",
///   "error": null,
///   "message": null,
///   "result": [{ "id": "d1", "name": "...", "distanceKm": 1.2, ... }],
///   "totalTracked": 12,
///   "updatedAt": "2024-01-01T00:00:00Z"
/// }
/// ```
async fn nearby_drivers(state: web::Data<AppState>) -> impl Responder {
    let view = state.view.borrow().clone();

    tracing::debug!("Serving {} nearby drivers ({:?})", view.result.len(), view.status);

    HttpResponse::Ok().json(view)
}

/// POST /api/v1/drivers/{id}/conversation
async fn open_conversation(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let driver_id = path.into_inner();
    let Some(actions) = state.actions.as_ref() else {
        return actions_unavailable();
    };

    action_response(actions.open_conversation(&driver_id).await, "open conversation", &driver_id)
}

/// POST /api/v1/drivers/{id}/reservation
async fn reserve_driver(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let driver_id = path.into_inner();
    let Some(actions) = state.actions.as_ref() else {
        return actions_unavailable();
    };

    action_response(actions.reserve_entity(&driver_id).await, "reserve driver", &driver_id)
}

fn actions_unavailable() -> HttpResponse {
    HttpResponse::ServiceUnavailable().json(ErrorResponse {
        error: "Actions unavailable".to_string(),
        message: "No action webhook is configured".to_string(),
        status_code: 503,
    })
}

fn action_response(result: Result<String, ActionError>, action: &str, driver_id: &str) -> HttpResponse {
    match result {
        Ok(request_id) => HttpResponse::Accepted().json(ActionResponse {
            success: true,
            request_id,
        }),
        Err(ActionError::InvalidDriver) => HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: ActionError::InvalidDriver.to_string(),
            status_code: 400,
        }),
        Err(e) => {
            tracing::error!("Failed to {} for {}: {}", action, driver_id, e);
            HttpResponse::BadGateway().json(ErrorResponse {
                error: format!("Failed to {}", action),
                message: e.to_string(),
                status_code: 502,
            })
        }
    }
}
