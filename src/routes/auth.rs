//! Session boundary routes.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};

use crate::{
    dao::store::PointsStore,
    dto::auth::{AuthStatus, LoginRequest, SessionResponse, UserSummary},
    error::{AppError, ServiceError},
    services::auth_service,
    state::SharedState,
};

/// Routes handling session lifecycle and introspection.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/user", get(current_user))
        .route("/api/auth/status", get(auth_status))
}

#[utoipa::path(
    post,
    path = "/api/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session opened", body = SessionResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
/// Exchange credentials for a bearer session token.
pub async fn login(
    State(state): State<SharedState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = auth_service::login(&state, payload).await?;
    Ok(Json(session))
}

#[utoipa::path(
    post,
    path = "/api/logout",
    tag = "auth",
    responses((status = 204, description = "Session revoked"))
)]
/// Revoke the caller's session token.
pub async fn logout(State(state): State<SharedState>, headers: HeaderMap) -> StatusCode {
    auth_service::logout(&state, &headers);
    StatusCode::NO_CONTENT
}

#[utoipa::path(
    get,
    path = "/api/user",
    tag = "auth",
    responses(
        (status = 200, description = "Authenticated account", body = UserSummary),
        (status = 401, description = "No session")
    )
)]
/// Return the account behind the caller's session.
pub async fn current_user(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<UserSummary>, AppError> {
    let identity = auth_service::require_identity(&state, &headers).await?;
    let user = state
        .store()
        .find_user(identity.user_id)
        .await
        .map_err(ServiceError::from)?
        .ok_or_else(|| AppError::NotFound("user not found".into()))?;
    Ok(Json(UserSummary::from(user)))
}

#[utoipa::path(
    get,
    path = "/api/auth/status",
    tag = "auth",
    responses((status = 200, description = "Whether the caller holds a live session", body = AuthStatus))
)]
/// Report whether the caller holds a live session, and for whom.
pub async fn auth_status(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<AuthStatus>, AppError> {
    let identity = auth_service::resolve_identity(&state, &headers).await?;
    let status = match identity {
        Some(identity) => {
            let user = state
                .store()
                .find_user(identity.user_id)
                .await
                .map_err(ServiceError::from)?;
            AuthStatus {
                authenticated: user.is_some(),
                user: user.map(UserSummary::from),
            }
        }
        None => AuthStatus {
            authenticated: false,
            user: None,
        },
    };
    Ok(Json(status))
}
