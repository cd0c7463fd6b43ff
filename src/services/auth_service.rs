//! Session boundary: token minting and per-request identity resolution.
//!
//! The rest of the core never inspects transport details; it receives an
//! [`Identity`] resolved here and only checks role and ward scope against it.

use axum::http::{HeaderMap, header};
use uuid::Uuid;

use crate::{
    dao::{models::Role, store::PointsStore},
    dto::auth::{LoginRequest, SessionResponse, UserSummary},
    error::ServiceError,
    state::SharedState,
};

/// Resolved caller identity: who they are and which ward they may act on.
#[derive(Clone, Debug)]
pub struct Identity {
    /// Authenticated account id.
    pub user_id: Uuid,
    /// Role attached to the account.
    pub role: Role,
    /// Assigned ward for `ward_approver` accounts.
    pub ward_id: Option<Uuid>,
}

/// Verify credentials and mint a bearer session token.
pub async fn login(
    state: &SharedState,
    request: LoginRequest,
) -> Result<SessionResponse, ServiceError> {
    let Some(user) = state.store().find_user_by_email(&request.email).await? else {
        return Err(ServiceError::Unauthorized("invalid credentials".into()));
    };
    if user.password != request.password {
        return Err(ServiceError::Unauthorized("invalid credentials".into()));
    }

    let token = Uuid::new_v4().simple().to_string();
    state.sessions().insert(token.clone(), user.id);
    tracing::info!(user = %user.email, "session opened");

    Ok(SessionResponse {
        token,
        user: UserSummary::from(user),
    })
}

/// Revoke the caller's session token, if one was presented.
pub fn logout(state: &SharedState, headers: &HeaderMap) {
    if let Some(token) = bearer_token(headers) {
        state.sessions().remove(token);
    }
}

/// Resolve the caller to an identity, if the request carries a live session.
pub async fn resolve_identity(
    state: &SharedState,
    headers: &HeaderMap,
) -> Result<Option<Identity>, ServiceError> {
    let Some(token) = bearer_token(headers) else {
        return Ok(None);
    };
    let Some(user_id) = state.sessions().get(token).map(|entry| *entry.value()) else {
        return Ok(None);
    };
    let Some(user) = state.store().find_user(user_id).await? else {
        // Session points at a deleted account; drop it.
        state.sessions().remove(token);
        return Ok(None);
    };

    Ok(Some(Identity {
        user_id: user.id,
        role: user.role,
        ward_id: user.ward_id,
    }))
}

/// Resolve the caller or fail with `Unauthorized`.
pub async fn require_identity(
    state: &SharedState,
    headers: &HeaderMap,
) -> Result<Identity, ServiceError> {
    resolve_identity(state, headers)
        .await?
        .ok_or_else(|| ServiceError::Unauthorized("authentication required".into()))
}

/// Check that the identity may approve or reject submissions for `ward_id`.
pub fn authorize_for_ward(identity: &Identity, ward_id: Uuid) -> Result<(), ServiceError> {
    match identity.role {
        Role::Admin => Ok(()),
        Role::WardApprover if identity.ward_id == Some(ward_id) => Ok(()),
        Role::WardApprover => Err(ServiceError::Forbidden(
            "not authorized to decide for this ward".into(),
        )),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(role: Role, ward_id: Option<Uuid>) -> Identity {
        Identity {
            user_id: Uuid::new_v4(),
            role,
            ward_id,
        }
    }

    #[test]
    fn admins_may_decide_for_any_ward() {
        let ward = Uuid::new_v4();
        assert!(authorize_for_ward(&identity(Role::Admin, None), ward).is_ok());
    }

    #[test]
    fn approvers_are_scoped_to_their_ward() {
        let own = Uuid::new_v4();
        let other = Uuid::new_v4();
        let approver = identity(Role::WardApprover, Some(own));
        assert!(authorize_for_ward(&approver, own).is_ok());
        assert!(matches!(
            authorize_for_ward(&approver, other),
            Err(ServiceError::Forbidden(_))
        ));
        // An approver without an assigned ward may decide for nothing.
        let unassigned = identity(Role::WardApprover, None);
        assert!(authorize_for_ward(&unassigned, own).is_err());
    }

    #[test]
    fn bearer_token_requires_the_scheme_prefix() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer abc123".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc123"));

        headers.insert(header::AUTHORIZATION, "abc123".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);
    }
}
