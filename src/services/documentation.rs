//! Aggregated OpenAPI specification.

use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the ward points backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::websocket::ws_handler,
        crate::routes::points::submit_points,
        crate::routes::points::approve_submission,
        crate::routes::points::reject_submission,
        crate::routes::points::list_submissions,
        crate::routes::points::ward_log,
        crate::routes::leaderboard::get_leaderboard,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::current_user,
        crate::routes::auth::auth_status,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::submission::SubmitPointsRequest,
            crate::dto::submission::SubmitPointsResponse,
            crate::dto::submission::DecisionResponse,
            crate::dto::submission::SubmissionSummary,
            crate::dto::submission::WardLogResponse,
            crate::dto::leaderboard::LeaderboardEntry,
            crate::dto::leaderboard::Stats,
            crate::dto::leaderboard::LeaderboardResponse,
            crate::dto::auth::LoginRequest,
            crate::dto::auth::SessionResponse,
            crate::dto::auth::UserSummary,
            crate::dto::auth::AuthStatus,
            crate::dto::ws::ServerEvent,
            crate::dto::ws::LeaderboardUpdateEvent,
            crate::dto::ws::AchievementEvent,
            crate::dao::models::SubmissionStatus,
            crate::dao::models::Role,
        )
    ),
    tags(
        (name = "points", description = "Submission lifecycle operations"),
        (name = "leaderboard", description = "Standings and statistics"),
        (name = "auth", description = "Session boundary"),
        (name = "health", description = "Health check endpoints"),
        (name = "viewers", description = "WebSocket stream for live viewers"),
    )
)]
pub struct ApiDoc;
