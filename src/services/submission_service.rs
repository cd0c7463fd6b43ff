//! Submission ledger: the pending → approved/rejected state machine and the
//! ward total consistency rules.

use std::collections::HashMap;

use tracing::info;
use uuid::Uuid;

use crate::{
    dao::{
        models::{Decision, NewActivity, NewSubmission, Role, SubmissionStatus},
        store::PointsStore,
    },
    dto::submission::{
        DecisionResponse, SubmissionSummary, SubmitPointsRequest, SubmitPointsResponse,
        WardLogResponse,
    },
    error::ServiceError,
    services::{achievement_service, auth_service::Identity, auth_service, ws_events},
    state::SharedState,
};

/// Cap applied to the role-scoped submission listing.
const SUBMISSION_LIST_CAP: usize = 50;

/// Insert a fresh pending submission for a ward.
///
/// The ward's pending-points cache is recomputed as the aggregate sum of its
/// pending submissions rather than incremented, which tolerates prior drift.
pub async fn submit(
    state: &SharedState,
    request: SubmitPointsRequest,
) -> Result<SubmitPointsResponse, ServiceError> {
    let SubmitPointsRequest {
        ward_id,
        submitter_name,
        points,
        note,
    } = request;

    let submitter_name = submitter_name.trim().to_string();
    if submitter_name.is_empty() {
        return Err(ServiceError::InvalidInput(
            "submitter name must not be empty".into(),
        ));
    }
    if points <= 0 {
        return Err(ServiceError::InvalidInput(
            "points must be greater than zero".into(),
        ));
    }

    let store = state.store();
    let Some(ward) = store.find_ward(ward_id).await? else {
        return Err(ServiceError::NotFound(format!("ward `{ward_id}` not found")));
    };

    let record = store
        .insert_submission(NewSubmission {
            ward_id,
            submitter_name: submitter_name.clone(),
            points,
            note,
        })
        .await?;
    store.recompute_pending_points(ward_id).await?;
    store
        .append_activity(NewActivity {
            ward_id,
            user_id: None,
            action: "points_submitted".into(),
            details: format!("{submitter_name} submitted {points} points"),
            points,
        })
        .await?;

    info!(submission = %record.id, ward = %ward.name, points, "points submitted");
    ws_events::broadcast_leaderboard(state).await;

    Ok(SubmitPointsResponse {
        id: record.id,
        message: "Points submitted successfully! Waiting for approval.".into(),
    })
}

/// Pass a verdict on a pending submission.
///
/// Authorization is checked before any mutation. The transition itself goes
/// through [`claim_pending`](crate::dao::store::PointsStore::claim_pending),
/// so among any number of concurrent verdicts on the same submission exactly
/// one wins; the rest observe `NotFound`. Ward totals are then moved with relative
/// updates, and only an approval can unlock achievements.
pub async fn decide(
    state: &SharedState,
    submission_id: Uuid,
    identity: &Identity,
    decision: Decision,
) -> Result<DecisionResponse, ServiceError> {
    let store = state.store();

    let Some(submission) = store.find_submission(submission_id).await? else {
        return Err(ServiceError::NotFound(format!(
            "submission `{submission_id}` not found"
        )));
    };
    if submission.status != SubmissionStatus::Pending {
        return Err(ServiceError::NotFound(format!(
            "submission `{submission_id}` already processed"
        )));
    }
    auth_service::authorize_for_ward(identity, submission.ward_id)?;

    let Some(claimed) = store
        .claim_pending(submission_id, identity.user_id, decision)
        .await?
    else {
        // Lost the race against a concurrent verdict.
        return Err(ServiceError::NotFound(format!(
            "submission `{submission_id}` already processed"
        )));
    };

    let message = match decision {
        Decision::Approve => {
            store
                .adjust_ward_points(claimed.ward_id, claimed.points, -claimed.points)
                .await?;
            achievement_service::evaluate(state, claimed.ward_id).await?;
            store
                .append_activity(NewActivity {
                    ward_id: claimed.ward_id,
                    user_id: Some(identity.user_id),
                    action: "points_approved".into(),
                    details: format!(
                        "Approved {} points from {}",
                        claimed.points, claimed.submitter_name
                    ),
                    points: claimed.points,
                })
                .await?;
            info!(submission = %claimed.id, points = claimed.points, "points approved");
            "Points approved successfully!"
        }
        Decision::Reject => {
            store
                .adjust_ward_points(claimed.ward_id, 0, -claimed.points)
                .await?;
            info!(submission = %claimed.id, points = claimed.points, "points rejected");
            "Points rejected"
        }
    };

    ws_events::broadcast_leaderboard(state).await;

    Ok(DecisionResponse {
        message: message.into(),
    })
}

/// Ward totals plus its full submission history, newest first.
pub async fn ward_log(state: &SharedState, ward_id: Uuid) -> Result<WardLogResponse, ServiceError> {
    let store = state.store();
    let Some(ward) = store.find_ward(ward_id).await? else {
        return Err(ServiceError::NotFound(format!("ward `{ward_id}` not found")));
    };

    let submissions = store
        .submissions_for_ward(ward_id)
        .await?
        .into_iter()
        .map(|record| SubmissionSummary::from_record(record, None))
        .collect();

    Ok(WardLogResponse {
        ward_id: ward.id,
        ward_name: ward.name,
        verified_points: ward.verified_points,
        pending_points: ward.pending_points,
        submissions,
    })
}

/// Submissions matching `status`, scoped by the caller's role: admins see all
/// wards, ward approvers only their own.
pub async fn list_by_status(
    state: &SharedState,
    identity: &Identity,
    status: SubmissionStatus,
) -> Result<Vec<SubmissionSummary>, ServiceError> {
    let store = state.store();
    let scope = match identity.role {
        Role::Admin => None,
        Role::WardApprover => match identity.ward_id {
            Some(ward_id) => Some(ward_id),
            None => {
                return Err(ServiceError::Forbidden(
                    "approver has no assigned ward".into(),
                ));
            }
        },
    };

    let records = store
        .submissions_by_status(status, scope, SUBMISSION_LIST_CAP)
        .await?;
    let ward_names: HashMap<Uuid, String> = store
        .list_wards()
        .await?
        .into_iter()
        .map(|ward| (ward.id, ward.name))
        .collect();

    Ok(records
        .into_iter()
        .map(|record| {
            let ward_name = ward_names.get(&record.ward_id).cloned();
            SubmissionSummary::from_record(record, ward_name)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::extract::ws::Message;
    use tokio::sync::mpsc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            models::Role,
            store::{PointsStore, memory::MemoryStore},
        },
        state::{AppState, ViewerConnection},
    };

    struct Fixture {
        state: SharedState,
        store: MemoryStore,
        ward: Uuid,
        admin: Identity,
    }

    async fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let ward = store.seed_ward("North Ward").await;
        let admin_id = store.seed_user("admin@example.org", "s3cret", Role::Admin, None).await;
        let state = AppState::new(AppConfig::default(), Arc::new(store.clone()));
        Fixture {
            state,
            store,
            ward,
            admin: Identity {
                user_id: admin_id,
                role: Role::Admin,
                ward_id: None,
            },
        }
    }

    fn request(ward_id: Uuid, points: i64) -> SubmitPointsRequest {
        SubmitPointsRequest {
            ward_id,
            submitter_name: "Sister Allred".into(),
            points,
            note: "Service project".into(),
        }
    }

    async fn ward_totals(store: &MemoryStore, ward: Uuid) -> (i64, i64) {
        let record = store.find_ward(ward).await.unwrap().unwrap();
        (record.verified_points, record.pending_points)
    }

    #[tokio::test]
    async fn submit_rejects_non_positive_points_without_side_effects() {
        let f = fixture().await;
        for points in [0, -5] {
            assert!(matches!(
                submit(&f.state, request(f.ward, points)).await,
                Err(ServiceError::InvalidInput(_))
            ));
        }
        assert!(f.store.submissions_for_ward(f.ward).await.unwrap().is_empty());
        assert_eq!(ward_totals(&f.store, f.ward).await, (0, 0));
    }

    #[tokio::test]
    async fn submit_unknown_ward_is_not_found() {
        let f = fixture().await;
        assert!(matches!(
            submit(&f.state, request(Uuid::new_v4(), 10)).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn submit_recomputes_the_pending_cache() {
        let f = fixture().await;
        submit(&f.state, request(f.ward, 50)).await.unwrap();
        submit(&f.state, request(f.ward, 25)).await.unwrap();
        assert_eq!(ward_totals(&f.store, f.ward).await, (0, 75));
    }

    #[tokio::test]
    async fn approve_moves_points_from_pending_to_verified() {
        let f = fixture().await;
        let accepted = submit(&f.state, request(f.ward, 50)).await.unwrap();

        decide(&f.state, accepted.id, &f.admin, Decision::Approve)
            .await
            .unwrap();
        assert_eq!(ward_totals(&f.store, f.ward).await, (50, 0));

        // A second verdict observes the terminal state and changes nothing.
        let again = decide(&f.state, accepted.id, &f.admin, Decision::Approve).await;
        assert!(matches!(again, Err(ServiceError::NotFound(_))));
        assert_eq!(ward_totals(&f.store, f.ward).await, (50, 0));
    }

    #[tokio::test]
    async fn reject_releases_pending_points_only() {
        let f = fixture().await;
        let accepted = submit(&f.state, request(f.ward, 40)).await.unwrap();

        decide(&f.state, accepted.id, &f.admin, Decision::Reject)
            .await
            .unwrap();
        assert_eq!(ward_totals(&f.store, f.ward).await, (0, 0));
        assert!(f
            .store
            .achievements_for_ward(f.ward)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn approver_of_another_ward_is_forbidden() {
        let f = fixture().await;
        let other_ward = f.store.seed_ward("South Ward").await;
        let accepted = submit(&f.state, request(f.ward, 30)).await.unwrap();

        let outsider = Identity {
            user_id: Uuid::new_v4(),
            role: Role::WardApprover,
            ward_id: Some(other_ward),
        };
        assert!(matches!(
            decide(&f.state, accepted.id, &outsider, Decision::Approve).await,
            Err(ServiceError::Forbidden(_))
        ));
        // Rejection of authorization leaves the submission untouched.
        let record = f.store.find_submission(accepted.id).await.unwrap().unwrap();
        assert_eq!(record.status, SubmissionStatus::Pending);
    }

    #[tokio::test]
    async fn approving_across_a_threshold_awards_once_and_broadcasts() {
        let f = fixture().await;
        let (tx, mut rx) = mpsc::channel(32);
        f.state.hub().register(ViewerConnection {
            id: Uuid::new_v4(),
            tx,
        });

        let accepted = submit(&f.state, request(f.ward, 100)).await.unwrap();
        decide(&f.state, accepted.id, &f.admin, Decision::Approve)
            .await
            .unwrap();
        let _ = f.state.hub().viewer_count().await;

        let rows = f.store.achievements_for_ward(f.ward).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].kind, "first_100");

        let mut kinds = Vec::new();
        while let Ok(Message::Text(text)) = rx.try_recv() {
            let event: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
            kinds.push(event["type"].as_str().unwrap().to_string());
        }
        // One update for the submit, one achievement, one update for the
        // approval, in that order.
        assert_eq!(kinds, ["leaderboard-update", "achievement", "leaderboard-update"]);
    }

    #[tokio::test]
    async fn ward_log_lists_history_newest_first() {
        let f = fixture().await;
        let first = submit(&f.state, request(f.ward, 10)).await.unwrap();
        decide(&f.state, first.id, &f.admin, Decision::Approve)
            .await
            .unwrap();
        submit(&f.state, request(f.ward, 20)).await.unwrap();

        let log = ward_log(&f.state, f.ward).await.unwrap();
        assert_eq!(log.verified_points, 10);
        assert_eq!(log.pending_points, 20);
        assert_eq!(log.submissions.len(), 2);
        assert!(log.submissions[0].created_at >= log.submissions[1].created_at);
    }

    #[tokio::test]
    async fn listing_is_scoped_to_the_approvers_ward() {
        let f = fixture().await;
        let other_ward = f.store.seed_ward("South Ward").await;
        submit(&f.state, request(f.ward, 10)).await.unwrap();
        submit(&f.state, request(other_ward, 20)).await.unwrap();

        let admin_view = list_by_status(&f.state, &f.admin, SubmissionStatus::Pending)
            .await
            .unwrap();
        assert_eq!(admin_view.len(), 2);

        let approver = Identity {
            user_id: Uuid::new_v4(),
            role: Role::WardApprover,
            ward_id: Some(f.ward),
        };
        let scoped = list_by_status(&f.state, &approver, SubmissionStatus::Pending)
            .await
            .unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].ward_id, f.ward);
        assert_eq!(scoped[0].ward_name.as_deref(), Some("North Ward"));
    }
}
