//! In-memory [`PointsStore`] backend.
//!
//! Rows live in insertion-ordered maps behind a single async lock, so each
//! trait call observes and mutates a consistent snapshot. That per-call
//! atomicity is what the service layer builds its concurrency guards on.

use std::{collections::HashSet, sync::Arc};

use futures::future::BoxFuture;
use indexmap::IndexMap;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::dao::{
    models::{
        AchievementRecord, ActivityRecord, Decision, NewAchievement, NewActivity, NewSubmission,
        Role, SubmissionRecord, SubmissionStatus, UserRecord, WardEngagement, WardRecord,
    },
    store::{PointsStore, StorageResult},
};

#[derive(Default)]
struct Tables {
    wards: IndexMap<Uuid, WardRecord>,
    users: IndexMap<Uuid, UserRecord>,
    submissions: IndexMap<Uuid, SubmissionRecord>,
    achievements: Vec<AchievementRecord>,
    activity: Vec<ActivityRecord>,
}

/// Insertion-ordered in-memory store, cheap to clone and share.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a ward with zeroed totals, returning its id.
    pub async fn seed_ward(&self, name: &str) -> Uuid {
        let mut tables = self.tables.write().await;
        let id = Uuid::new_v4();
        tables.wards.insert(
            id,
            WardRecord {
                id,
                name: name.to_string(),
                verified_points: 0,
                pending_points: 0,
                created_at: OffsetDateTime::now_utc(),
            },
        );
        id
    }

    /// Insert an account, returning its id.
    pub async fn seed_user(
        &self,
        email: &str,
        password: &str,
        role: Role,
        ward_id: Option<Uuid>,
    ) -> Uuid {
        let mut tables = self.tables.write().await;
        let id = Uuid::new_v4();
        tables.users.insert(
            id,
            UserRecord {
                id,
                email: email.to_string(),
                password: password.to_string(),
                role,
                ward_id,
                created_at: OffsetDateTime::now_utc(),
            },
        );
        id
    }

    /// Ward id for a seeded name, if present. Used when wiring config
    /// accounts to their wards.
    pub async fn ward_id_by_name(&self, name: &str) -> Option<Uuid> {
        let tables = self.tables.read().await;
        tables
            .wards
            .values()
            .find(|ward| ward.name == name)
            .map(|ward| ward.id)
    }
}

impl PointsStore for MemoryStore {
    fn list_wards(&self) -> BoxFuture<'static, StorageResult<Vec<WardRecord>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let tables = tables.read().await;
            Ok(tables.wards.values().cloned().collect())
        })
    }

    fn find_ward(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<WardRecord>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let tables = tables.read().await;
            Ok(tables.wards.get(&id).cloned())
        })
    }

    fn insert_submission(
        &self,
        submission: NewSubmission,
    ) -> BoxFuture<'static, StorageResult<SubmissionRecord>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut tables = tables.write().await;
            let id = Uuid::new_v4();
            let record = SubmissionRecord {
                id,
                ward_id: submission.ward_id,
                submitter_name: submission.submitter_name,
                points: submission.points,
                note: submission.note,
                status: SubmissionStatus::Pending,
                decided_by: None,
                decided_at: None,
                created_at: OffsetDateTime::now_utc(),
            };
            tables.submissions.insert(id, record.clone());
            Ok(record)
        })
    }

    fn find_submission(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<SubmissionRecord>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let tables = tables.read().await;
            Ok(tables.submissions.get(&id).cloned())
        })
    }

    fn claim_pending(
        &self,
        id: Uuid,
        approver: Uuid,
        decision: Decision,
    ) -> BoxFuture<'static, StorageResult<Option<SubmissionRecord>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut tables = tables.write().await;
            let Some(submission) = tables.submissions.get_mut(&id) else {
                return Ok(None);
            };
            if submission.status != SubmissionStatus::Pending {
                return Ok(None);
            }
            submission.status = decision.status();
            submission.decided_by = Some(approver);
            submission.decided_at = Some(OffsetDateTime::now_utc());
            Ok(Some(submission.clone()))
        })
    }

    fn recompute_pending_points(&self, ward_id: Uuid) -> BoxFuture<'static, StorageResult<i64>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut tables = tables.write().await;
            let pending: i64 = tables
                .submissions
                .values()
                .filter(|s| s.ward_id == ward_id && s.status == SubmissionStatus::Pending)
                .map(|s| s.points)
                .sum();
            if let Some(ward) = tables.wards.get_mut(&ward_id) {
                ward.pending_points = pending;
            }
            Ok(pending)
        })
    }

    fn adjust_ward_points(
        &self,
        ward_id: Uuid,
        verified_delta: i64,
        pending_delta: i64,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut tables = tables.write().await;
            if let Some(ward) = tables.wards.get_mut(&ward_id) {
                ward.verified_points += verified_delta;
                ward.pending_points += pending_delta;
            }
            Ok(())
        })
    }

    fn award_achievement(
        &self,
        achievement: NewAchievement,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut tables = tables.write().await;
            let already_held = tables
                .achievements
                .iter()
                .any(|a| a.ward_id == achievement.ward_id && a.kind == achievement.kind);
            if already_held {
                return Ok(false);
            }
            tables.achievements.push(AchievementRecord {
                id: Uuid::new_v4(),
                ward_id: achievement.ward_id,
                kind: achievement.kind,
                title: achievement.title,
                description: achievement.description,
                icon: achievement.icon,
                earned_at: OffsetDateTime::now_utc(),
            });
            Ok(true)
        })
    }

    fn achievements_for_ward(
        &self,
        ward_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<AchievementRecord>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let tables = tables.read().await;
            Ok(tables
                .achievements
                .iter()
                .filter(|a| a.ward_id == ward_id)
                .cloned()
                .collect())
        })
    }

    fn append_activity(&self, entry: NewActivity) -> BoxFuture<'static, StorageResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut tables = tables.write().await;
            tables.activity.push(ActivityRecord {
                id: Uuid::new_v4(),
                ward_id: entry.ward_id,
                user_id: entry.user_id,
                action: entry.action,
                details: entry.details,
                points: entry.points,
                created_at: OffsetDateTime::now_utc(),
            });
            Ok(())
        })
    }

    fn ward_engagement(
        &self,
        ward_id: Uuid,
        window_start: OffsetDateTime,
    ) -> BoxFuture<'static, StorageResult<WardEngagement>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let tables = tables.read().await;
            let mut days = HashSet::new();
            let mut last_activity = None;
            for entry in tables.activity.iter().filter(|e| e.ward_id == ward_id) {
                if entry.created_at >= window_start {
                    days.insert(entry.created_at.date());
                }
                if last_activity.is_none_or(|seen| entry.created_at > seen) {
                    last_activity = Some(entry.created_at);
                }
            }
            Ok(WardEngagement {
                active_days: days.len() as u32,
                last_activity,
            })
        })
    }

    fn submissions_for_ward(
        &self,
        ward_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<SubmissionRecord>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let tables = tables.read().await;
            let mut rows: Vec<_> = tables
                .submissions
                .values()
                .filter(|s| s.ward_id == ward_id)
                .cloned()
                .collect();
            rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(rows)
        })
    }

    fn submissions_by_status(
        &self,
        status: SubmissionStatus,
        ward_id: Option<Uuid>,
        limit: usize,
    ) -> BoxFuture<'static, StorageResult<Vec<SubmissionRecord>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let tables = tables.read().await;
            let mut rows: Vec<_> = tables
                .submissions
                .values()
                .filter(|s| s.status == status)
                .filter(|s| ward_id.is_none_or(|ward| s.ward_id == ward))
                .cloned()
                .collect();
            rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            rows.truncate(limit);
            Ok(rows)
        })
    }

    fn find_user_by_email(
        &self,
        email: &str,
    ) -> BoxFuture<'static, StorageResult<Option<UserRecord>>> {
        let tables = self.tables.clone();
        let email = email.to_string();
        Box::pin(async move {
            let tables = tables.read().await;
            Ok(tables
                .users
                .values()
                .find(|user| user.email == email)
                .cloned())
        })
    }

    fn find_user(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<UserRecord>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let tables = tables.read().await;
            Ok(tables.users.get(&id).cloned())
        })
    }

    fn earliest_approved_at(
        &self,
    ) -> BoxFuture<'static, StorageResult<Option<OffsetDateTime>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let tables = tables.read().await;
            Ok(tables
                .submissions
                .values()
                .filter(|s| s.status == SubmissionStatus::Approved)
                .map(|s| s.created_at)
                .min())
        })
    }

    fn distinct_submitter_count(&self) -> BoxFuture<'static, StorageResult<usize>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let tables = tables.read().await;
            let submitters: HashSet<_> = tables
                .submissions
                .values()
                .map(|s| s.submitter_name.as_str())
                .collect();
            Ok(submitters.len())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn submission(ward_id: Uuid, points: i64) -> NewSubmission {
        NewSubmission {
            ward_id,
            submitter_name: "Sister Allred".into(),
            points,
            note: String::new(),
        }
    }

    #[tokio::test]
    async fn claim_pending_has_exactly_one_winner() {
        let store = MemoryStore::new();
        let ward = store.seed_ward("North Ward").await;
        let approver = Uuid::new_v4();
        let inserted = store.insert_submission(submission(ward, 40)).await.unwrap();

        let first = store
            .claim_pending(inserted.id, approver, Decision::Approve)
            .await
            .unwrap();
        let second = store
            .claim_pending(inserted.id, approver, Decision::Reject)
            .await
            .unwrap();

        assert_eq!(
            first.map(|s| s.status),
            Some(SubmissionStatus::Approved)
        );
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn award_achievement_is_idempotent_per_kind() {
        let store = MemoryStore::new();
        let ward = store.seed_ward("North Ward").await;
        let award = NewAchievement {
            ward_id: ward,
            kind: "first_100".into(),
            title: "First 100 Points!".into(),
            description: String::new(),
            icon: "💯".into(),
        };

        assert!(store.award_achievement(award.clone()).await.unwrap());
        assert!(!store.award_achievement(award).await.unwrap());
        assert_eq!(store.achievements_for_ward(ward).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn recompute_pending_points_sums_only_pending_rows() {
        let store = MemoryStore::new();
        let ward = store.seed_ward("North Ward").await;
        let approver = Uuid::new_v4();

        store.insert_submission(submission(ward, 30)).await.unwrap();
        let decided = store.insert_submission(submission(ward, 25)).await.unwrap();
        store
            .claim_pending(decided.id, approver, Decision::Approve)
            .await
            .unwrap();

        assert_eq!(store.recompute_pending_points(ward).await.unwrap(), 30);
        let ward = store.find_ward(ward).await.unwrap().unwrap();
        assert_eq!(ward.pending_points, 30);
    }

    #[tokio::test]
    async fn ward_engagement_counts_distinct_days_in_window() {
        let store = MemoryStore::new();
        let ward = store.seed_ward("North Ward").await;
        for _ in 0..3 {
            store
                .append_activity(NewActivity {
                    ward_id: ward,
                    user_id: None,
                    action: "points_submitted".into(),
                    details: String::new(),
                    points: 10,
                })
                .await
                .unwrap();
        }

        let window_start = OffsetDateTime::now_utc() - Duration::days(7);
        let engagement = store.ward_engagement(ward, window_start).await.unwrap();
        // All entries land on today's date.
        assert_eq!(engagement.active_days, 1);
        assert!(engagement.last_activity.is_some());
    }
}
