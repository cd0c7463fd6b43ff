//! Leaderboard route.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    dto::leaderboard::{LeaderboardResponse, SortKey},
    error::AppError,
    services::leaderboard_service,
    state::SharedState,
};

/// Query parameters accepted by the leaderboard endpoint.
#[derive(Debug, Deserialize, IntoParams)]
pub struct LeaderboardQuery {
    /// Sort key; unrecognized values fall back to verified-desc.
    sort: Option<String>,
}

/// Routes serving standings and statistics.
pub fn router() -> Router<SharedState> {
    Router::new().route("/api/leaderboard", get(get_leaderboard))
}

#[utoipa::path(
    get,
    path = "/api/leaderboard",
    tag = "leaderboard",
    params(LeaderboardQuery),
    responses((status = 200, description = "Current standings and stats", body = LeaderboardResponse))
)]
/// Return the ranked standings plus summary statistics.
pub async fn get_leaderboard(
    State(state): State<SharedState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    let sort = query
        .sort
        .as_deref()
        .map(SortKey::parse)
        .unwrap_or_default();
    let response = leaderboard_service::get_leaderboard(&state, sort).await?;
    Ok(Json(response))
}
