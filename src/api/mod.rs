//! HTTP submission and polling surface.

pub mod dtos;
pub mod handlers;

use axum::{
    Json, Router,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::{app_state::AppState, health};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::submit_extract,
        handlers::submit_analyze_text,
        handlers::submit_analyze_url,
        handlers::get_job,
        health::health_check,
    ),
    components(schemas(
        dtos::SubmitUrlRequest,
        dtos::SubmitTextRequest,
        dtos::SubmitResponse,
        dtos::JobResponse,
        dtos::ErrorResponse,
        health::HealthResponse,
    )),
    tags(
        (name = "jobs", description = "Submit acquisition and analysis jobs and poll them"),
        (name = "health", description = "Liveness and store reachability")
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/extract", post(handlers::submit_extract))
        .route("/api/analyze-text", post(handlers::submit_analyze_text))
        .route("/api/analyze-url", post(handlers::submit_analyze_url))
        .route("/api/job/{id}", get(handlers::get_job))
        .route("/healthz", get(health::health_check))
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .with_state(state)
}
