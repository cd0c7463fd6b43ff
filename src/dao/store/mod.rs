//! Store abstraction over wards, submissions, achievements, activity, and users.

pub mod memory;

use std::error::Error;

use futures::future::BoxFuture;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::dao::models::{
    AchievementRecord, Decision, NewAchievement, NewActivity, NewSubmission, SubmissionRecord,
    SubmissionStatus, UserRecord, WardEngagement, WardRecord,
};

/// Result alias for store operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by store backends regardless of the underlying engine.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not serve the request.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// What the store was doing when the failure happened.
        message: String,
        /// Underlying backend failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}

/// Abstraction over the persistence layer.
///
/// Every method is atomic on its own: callers compose multi-step mutations out
/// of these calls and rely on per-call atomicity for their concurrency guards
/// (notably [`PointsStore::claim_pending`] and
/// [`PointsStore::adjust_ward_points`]).
pub trait PointsStore: Send + Sync {
    /// All wards in stable insertion order. That order is the deterministic
    /// "underlying row order" rank tie-breaking falls back on.
    fn list_wards(&self) -> BoxFuture<'static, StorageResult<Vec<WardRecord>>>;

    /// Look a ward up by id.
    fn find_ward(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<WardRecord>>>;

    /// Insert a fresh `pending` submission and return the stored record.
    fn insert_submission(
        &self,
        submission: NewSubmission,
    ) -> BoxFuture<'static, StorageResult<SubmissionRecord>>;

    /// Look a submission up by id.
    fn find_submission(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<SubmissionRecord>>>;

    /// Atomically transition a submission out of `pending`, recording the
    /// approver and decision time. Returns the updated record, or `None` when
    /// the submission does not exist or is no longer pending, so under
    /// concurrent decisions exactly one caller wins.
    fn claim_pending(
        &self,
        id: Uuid,
        approver: Uuid,
        decision: Decision,
    ) -> BoxFuture<'static, StorageResult<Option<SubmissionRecord>>>;

    /// Recompute a ward's pending-points cache as the aggregate sum of its
    /// currently-pending submissions, returning the new value.
    fn recompute_pending_points(&self, ward_id: Uuid) -> BoxFuture<'static, StorageResult<i64>>;

    /// Apply relative deltas to a ward's verified and pending totals in one
    /// atomic step.
    fn adjust_ward_points(
        &self,
        ward_id: Uuid,
        verified_delta: i64,
        pending_delta: i64,
    ) -> BoxFuture<'static, StorageResult<()>>;

    /// Award an achievement unless the ward already holds one of the same
    /// kind. Returns `true` only for a genuinely new award.
    fn award_achievement(
        &self,
        achievement: NewAchievement,
    ) -> BoxFuture<'static, StorageResult<bool>>;

    /// Achievements held by a ward, in earned order.
    fn achievements_for_ward(
        &self,
        ward_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<AchievementRecord>>>;

    /// Append an activity log entry.
    fn append_activity(&self, entry: NewActivity) -> BoxFuture<'static, StorageResult<()>>;

    /// Engagement figures for a ward: distinct active days since
    /// `window_start` plus the overall latest activity timestamp.
    fn ward_engagement(
        &self,
        ward_id: Uuid,
        window_start: OffsetDateTime,
    ) -> BoxFuture<'static, StorageResult<WardEngagement>>;

    /// Full submission history for a ward, newest first.
    fn submissions_for_ward(
        &self,
        ward_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<SubmissionRecord>>>;

    /// Submissions matching `status`, optionally scoped to one ward, newest
    /// first, capped at `limit` rows.
    fn submissions_by_status(
        &self,
        status: SubmissionStatus,
        ward_id: Option<Uuid>,
        limit: usize,
    ) -> BoxFuture<'static, StorageResult<Vec<SubmissionRecord>>>;

    /// Look a user up by email.
    fn find_user_by_email(
        &self,
        email: &str,
    ) -> BoxFuture<'static, StorageResult<Option<UserRecord>>>;

    /// Look a user up by id.
    fn find_user(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<UserRecord>>>;

    /// Creation time of the earliest approved submission, if any.
    fn earliest_approved_at(&self)
    -> BoxFuture<'static, StorageResult<Option<OffsetDateTime>>>;

    /// Number of distinct submitter display names across all submissions.
    fn distinct_submitter_count(&self) -> BoxFuture<'static, StorageResult<usize>>;

    /// Cheap readiness probe used by the health endpoint.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}
