//! Persisted record types shared between store implementations and services.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

/// A competing group whose point totals are tracked.
///
/// `verified_points` and `pending_points` are caches derived from the
/// submission ledger; the ledger is the source of truth and the caches are
/// resynchronised on every status transition.
#[derive(Clone, Debug)]
pub struct WardRecord {
    /// Stable identifier for the ward.
    pub id: Uuid,
    /// Display name, unique within the roster.
    pub name: String,
    /// Sum of all approved submission amounts.
    pub verified_points: i64,
    /// Sum of all currently pending submission amounts.
    pub pending_points: i64,
    /// When the ward was registered.
    pub created_at: OffsetDateTime,
}

/// Lifecycle status of a point submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    /// Awaiting an approver's verdict.
    Pending,
    /// Counted towards the ward's verified total. Terminal.
    Approved,
    /// Discarded by an approver. Terminal.
    Rejected,
}

/// Verdict an approver can pass on a pending submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Move the submission to [`SubmissionStatus::Approved`].
    Approve,
    /// Move the submission to [`SubmissionStatus::Rejected`].
    Reject,
}

impl Decision {
    /// Terminal status this verdict resolves to.
    pub fn status(self) -> SubmissionStatus {
        match self {
            Decision::Approve => SubmissionStatus::Approved,
            Decision::Reject => SubmissionStatus::Rejected,
        }
    }
}

/// A claimed point amount awaiting or having received approval.
#[derive(Clone, Debug)]
pub struct SubmissionRecord {
    /// Stable identifier for the submission.
    pub id: Uuid,
    /// Ward the points are claimed for.
    pub ward_id: Uuid,
    /// Display name of whoever submitted the claim.
    pub submitter_name: String,
    /// Claimed point amount, strictly positive.
    pub points: i64,
    /// Free-form context supplied with the claim.
    pub note: String,
    /// Current lifecycle status.
    pub status: SubmissionStatus,
    /// Set exactly once, together with `decided_at`, when the submission
    /// leaves the pending state.
    pub decided_by: Option<Uuid>,
    /// When the deciding verdict was recorded.
    pub decided_at: Option<OffsetDateTime>,
    /// When the submission entered the ledger.
    pub created_at: OffsetDateTime,
}

/// Input for inserting a fresh pending submission.
#[derive(Clone, Debug)]
pub struct NewSubmission {
    /// Ward the points are claimed for.
    pub ward_id: Uuid,
    /// Display name of whoever submitted the claim.
    pub submitter_name: String,
    /// Claimed point amount, strictly positive.
    pub points: i64,
    /// Free-form context supplied with the claim.
    pub note: String,
}

/// Milestone awarded to a ward; at most one per (ward, kind).
#[derive(Clone, Debug)]
pub struct AchievementRecord {
    /// Stable identifier for the award.
    pub id: Uuid,
    /// Ward that earned the milestone.
    pub ward_id: Uuid,
    /// Machine-readable milestone kind, unique per ward.
    pub kind: String,
    /// Short display title.
    pub title: String,
    /// Longer display description.
    pub description: String,
    /// Emoji or glyph shown next to the title.
    pub icon: String,
    /// When the milestone was first reached.
    pub earned_at: OffsetDateTime,
}

/// Input for awarding an achievement to a ward.
#[derive(Clone, Debug)]
pub struct NewAchievement {
    /// Ward that earned the milestone.
    pub ward_id: Uuid,
    /// Machine-readable milestone kind, unique per ward.
    pub kind: String,
    /// Short display title.
    pub title: String,
    /// Longer display description.
    pub description: String,
    /// Emoji or glyph shown next to the title.
    pub icon: String,
}

/// Append-only audit entry; feeds the streak and last-activity figures.
#[derive(Clone, Debug)]
pub struct ActivityRecord {
    /// Stable identifier for the entry.
    pub id: Uuid,
    /// Ward the action concerns.
    pub ward_id: Uuid,
    /// Acting account, when the action was authenticated.
    pub user_id: Option<Uuid>,
    /// Machine-readable action name, e.g. `points_submitted`.
    pub action: String,
    /// Human-readable description of the action.
    pub details: String,
    /// Point amount the action concerned.
    pub points: i64,
    /// When the action happened.
    pub created_at: OffsetDateTime,
}

/// Input for appending an activity log entry.
#[derive(Clone, Debug)]
pub struct NewActivity {
    /// Ward the action concerns.
    pub ward_id: Uuid,
    /// Acting account, when the action was authenticated.
    pub user_id: Option<Uuid>,
    /// Machine-readable action name, e.g. `points_submitted`.
    pub action: String,
    /// Human-readable description of the action.
    pub details: String,
    /// Point amount the action concerned.
    pub points: i64,
}

/// Role attached to an authenticated account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// May approve or reject submissions for any ward.
    Admin,
    /// May approve or reject submissions for the assigned ward only.
    WardApprover,
}

/// An account that can authenticate against the backend.
#[derive(Clone, Debug)]
pub struct UserRecord {
    /// Stable identifier for the account.
    pub id: Uuid,
    /// Login email, unique across accounts.
    pub email: String,
    /// Stored secret compared verbatim at login; hashing is handled outside
    /// this core.
    pub password: String,
    /// Role governing what the account may decide.
    pub role: Role,
    /// Assigned ward for [`Role::WardApprover`] accounts.
    pub ward_id: Option<Uuid>,
    /// When the account was created.
    pub created_at: OffsetDateTime,
}

/// Windowed engagement figures for one ward, derived from the activity log.
#[derive(Clone, Copy, Debug, Default)]
pub struct WardEngagement {
    /// Distinct calendar days with activity inside the queried window.
    pub active_days: u32,
    /// Most recent activity timestamp, regardless of the window.
    pub last_activity: Option<OffsetDateTime>,
}
