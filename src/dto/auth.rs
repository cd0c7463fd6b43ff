//! Session boundary requests and responses.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dao::models::{Role, UserRecord};

/// Credentials presented at login.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Account secret.
    pub password: String,
}

/// Session token plus the authenticated account.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    /// Bearer token to present on subsequent requests.
    pub token: String,
    /// Account the token was minted for.
    pub user: UserSummary,
}

/// Public projection of an account.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserSummary {
    /// Account identifier.
    pub id: Uuid,
    /// Login email.
    pub email: String,
    /// Role attached to the account.
    pub role: Role,
    /// Assigned ward for approver accounts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ward_id: Option<Uuid>,
}

impl From<UserRecord> for UserSummary {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
            ward_id: user.ward_id,
        }
    }
}

/// Whether the caller holds a live session, and for whom.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthStatus {
    /// Whether the presented token maps to a live session.
    pub authenticated: bool,
    /// Account behind the session, when authenticated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}
