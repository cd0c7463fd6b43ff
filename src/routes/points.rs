//! Submission lifecycle routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::{get, post},
};
use axum_valid::Valid;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    dao::models::{Decision, SubmissionStatus},
    dto::submission::{
        DecisionResponse, SubmissionSummary, SubmitPointsRequest, SubmitPointsResponse,
        WardLogResponse,
    },
    error::AppError,
    services::{auth_service, submission_service},
    state::SharedState,
};

/// Query parameters accepted by the submission listing.
#[derive(Debug, Deserialize, IntoParams)]
pub struct SubmissionsQuery {
    /// Status filter; defaults to `pending`.
    status: Option<SubmissionStatus>,
}

/// Routes handling point submission, verdicts, and history.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/points", post(submit_points))
        .route("/api/points/{id}/approve", post(approve_submission))
        .route("/api/points/{id}/reject", post(reject_submission))
        .route("/api/submissions", get(list_submissions))
        .route("/api/wards/{id}/log", get(ward_log))
}

#[utoipa::path(
    post,
    path = "/api/points",
    tag = "points",
    request_body = SubmitPointsRequest,
    responses(
        (status = 200, description = "Submission accepted", body = SubmitPointsResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Ward not found")
    )
)]
/// Submit a claimed point amount for a ward.
pub async fn submit_points(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<SubmitPointsRequest>>,
) -> Result<Json<SubmitPointsResponse>, AppError> {
    let response = submission_service::submit(&state, payload).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/points/{id}/approve",
    tag = "points",
    params(("id" = Uuid, Path, description = "Submission to approve")),
    responses(
        (status = 200, description = "Submission approved", body = DecisionResponse),
        (status = 401, description = "No session"),
        (status = 403, description = "Not an approver for this ward"),
        (status = 404, description = "Submission missing or already processed")
    )
)]
/// Approve a pending submission.
pub async fn approve_submission(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<DecisionResponse>, AppError> {
    let identity = auth_service::require_identity(&state, &headers).await?;
    let response = submission_service::decide(&state, id, &identity, Decision::Approve).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/points/{id}/reject",
    tag = "points",
    params(("id" = Uuid, Path, description = "Submission to reject")),
    responses(
        (status = 200, description = "Submission rejected", body = DecisionResponse),
        (status = 401, description = "No session"),
        (status = 403, description = "Not an approver for this ward"),
        (status = 404, description = "Submission missing or already processed")
    )
)]
/// Reject a pending submission.
pub async fn reject_submission(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<DecisionResponse>, AppError> {
    let identity = auth_service::require_identity(&state, &headers).await?;
    let response = submission_service::decide(&state, id, &identity, Decision::Reject).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/submissions",
    tag = "points",
    params(SubmissionsQuery),
    responses(
        (status = 200, description = "Submissions visible to the caller", body = [SubmissionSummary]),
        (status = 401, description = "No session")
    )
)]
/// List submissions by status, scoped to the caller's role.
pub async fn list_submissions(
    State(state): State<SharedState>,
    Query(query): Query<SubmissionsQuery>,
    headers: HeaderMap,
) -> Result<Json<Vec<SubmissionSummary>>, AppError> {
    let identity = auth_service::require_identity(&state, &headers).await?;
    let status = query.status.unwrap_or(SubmissionStatus::Pending);
    let submissions = submission_service::list_by_status(&state, &identity, status).await?;
    Ok(Json(submissions))
}

#[utoipa::path(
    get,
    path = "/api/wards/{id}/log",
    tag = "points",
    params(("id" = Uuid, Path, description = "Ward whose history to return")),
    responses(
        (status = 200, description = "Ward totals and history", body = WardLogResponse),
        (status = 404, description = "Ward not found")
    )
)]
/// Return a ward's totals plus its full submission history.
pub async fn ward_log(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WardLogResponse>, AppError> {
    let response = submission_service::ward_log(&state, id).await?;
    Ok(Json(response))
}
