use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use tracing::{debug, error};
use utoipa::ToSchema;

use crate::app_state::AppState;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    store: String,
}

#[utoipa::path(
    get,
    path = "/healthz",
    tag = "health",
    responses(
        (status = 200, description = "Health check successful", body = HealthResponse),
        (status = 503, description = "Job store unreachable")
    )
)]
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, StatusCode> {
    match state.scheduler.store().ping().await {
        Ok(()) => {
            debug!("Health check passed");
            Ok(Json(HealthResponse {
                status: "OK".to_string(),
                store: "healthy".to_string(),
            }))
        }
        Err(e) => {
            error!("Job store health check failed: {}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}
