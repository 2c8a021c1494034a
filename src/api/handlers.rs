use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;
use uuid::Uuid;

use crate::{
    api::dtos::{ErrorResponse, JobResponse, SubmitResponse, SubmitTextRequest, SubmitUrlRequest},
    app_state::AppState,
    entities::{JobKind, JobPayload, JobStatus},
    jobs::SubmitError,
};

pub const UNKNOWN_JOB: &str = "unknown job";

fn bad_request(message: impl Into<String>) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message))).into_response()
}

/// Malformed or non-JSON bodies get the same `400 {error}` shape as
/// validation failures.
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    match body {
        Ok(Json(payload)) => Ok(payload),
        Err(rejection) => Err(bad_request(rejection.body_text())),
    }
}

async fn submit(state: &AppState, kind: JobKind, payload: JobPayload) -> Response {
    match state.scheduler.submit(kind, payload).await {
        Ok(job_id) => (
            StatusCode::ACCEPTED,
            Json(SubmitResponse {
                job_id,
                status: JobStatus::Pending,
            }),
        )
            .into_response(),
        Err(e) if e.is_validation() => bad_request(e.to_string()),
        Err(SubmitError::ShuttingDown) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::new(SubmitError::ShuttingDown.to_string())),
        )
            .into_response(),
        Err(e) => {
            error!("Job submission failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to create job")),
            )
                .into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/extract",
    tag = "jobs",
    request_body = SubmitUrlRequest,
    responses(
        (status = 202, description = "Extraction job created", body = SubmitResponse),
        (status = 400, description = "Missing or invalid URL, or malformed body", body = ErrorResponse)
    )
)]
pub async fn submit_extract(
    State(state): State<AppState>,
    body: Result<Json<SubmitUrlRequest>, JsonRejection>,
) -> Response {
    let payload = match json_body(body) {
        Ok(payload) => payload,
        Err(response) => return response,
    };
    submit(&state, JobKind::Extract, JobPayload::Url(payload.url)).await
}

#[utoipa::path(
    post,
    path = "/api/analyze-text",
    tag = "jobs",
    request_body = SubmitTextRequest,
    responses(
        (status = 202, description = "Analysis job created", body = SubmitResponse),
        (status = 400, description = "Text too short to analyze, or malformed body", body = ErrorResponse)
    )
)]
pub async fn submit_analyze_text(
    State(state): State<AppState>,
    body: Result<Json<SubmitTextRequest>, JsonRejection>,
) -> Response {
    let payload = match json_body(body) {
        Ok(payload) => payload,
        Err(response) => return response,
    };
    submit(&state, JobKind::Analyze, JobPayload::Text(payload.text)).await
}

#[utoipa::path(
    post,
    path = "/api/analyze-url",
    tag = "jobs",
    request_body = SubmitUrlRequest,
    responses(
        (status = 202, description = "Acquire-then-analyze job created", body = SubmitResponse),
        (status = 400, description = "Missing or invalid URL, or malformed body", body = ErrorResponse)
    )
)]
pub async fn submit_analyze_url(
    State(state): State<AppState>,
    body: Result<Json<SubmitUrlRequest>, JsonRejection>,
) -> Response {
    let payload = match json_body(body) {
        Ok(payload) => payload,
        Err(response) => return response,
    };
    submit(&state, JobKind::Analyze, JobPayload::Url(payload.url)).await
}

#[utoipa::path(
    get,
    path = "/api/job/{id}",
    tag = "jobs",
    params(("id" = String, Path, description = "Job id returned at submission")),
    responses(
        (status = 200, description = "Current job snapshot", body = JobResponse),
        (status = 404, description = "Unknown job", body = ErrorResponse)
    )
)]
pub async fn get_job(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let not_found =
        || (StatusCode::NOT_FOUND, Json(ErrorResponse::new(UNKNOWN_JOB))).into_response();

    let Ok(id) = Uuid::parse_str(&id) else {
        return not_found();
    };

    match state.scheduler.get(id).await {
        Ok(Some(job)) => (StatusCode::OK, Json(JobResponse::from(job))).into_response(),
        Ok(None) => not_found(),
        Err(e) => {
            error!("Failed to load job {}: {}", id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Job store unavailable")),
            )
                .into_response()
        }
    }
}
