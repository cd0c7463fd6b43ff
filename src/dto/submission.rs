//! Submission lifecycle requests and responses.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{SubmissionRecord, SubmissionStatus},
    dto::{format_timestamp, validation::validate_submitter_name},
};

/// Payload used to submit a claimed point amount for a ward.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SubmitPointsRequest {
    /// Ward the points are claimed for.
    pub ward_id: Uuid,
    /// Display name of the person submitting.
    #[validate(custom(function = validate_submitter_name))]
    pub submitter_name: String,
    /// Claimed point amount; must be strictly positive.
    #[validate(range(min = 1, message = "points must be greater than zero"))]
    pub points: i64,
    /// Free-text note describing the activity.
    #[serde(default)]
    pub note: String,
}

/// Acknowledgement returned after a successful submission.
#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitPointsResponse {
    /// Identifier of the inserted submission.
    pub id: Uuid,
    /// Human-readable confirmation.
    pub message: String,
}

/// Acknowledgement returned after an approve/reject verdict.
#[derive(Debug, Serialize, ToSchema)]
pub struct DecisionResponse {
    /// Human-readable confirmation.
    pub message: String,
}

/// Public projection of a submission row.
#[derive(Debug, Serialize, ToSchema)]
pub struct SubmissionSummary {
    /// Submission identifier.
    pub id: Uuid,
    /// Ward the points were claimed for.
    pub ward_id: Uuid,
    /// Ward display name, when the caller asked for a cross-ward listing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ward_name: Option<String>,
    /// Display name of whoever submitted the claim.
    pub submitter_name: String,
    /// Claimed point amount.
    pub points: i64,
    /// Free-text note supplied with the claim.
    pub note: String,
    /// Current lifecycle status.
    pub status: SubmissionStatus,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

impl SubmissionSummary {
    /// Project a stored record, optionally attaching the ward display name.
    pub fn from_record(record: SubmissionRecord, ward_name: Option<String>) -> Self {
        Self {
            id: record.id,
            ward_id: record.ward_id,
            ward_name,
            submitter_name: record.submitter_name,
            points: record.points,
            note: record.note,
            status: record.status,
            created_at: format_timestamp(record.created_at),
        }
    }
}

/// Ward totals plus full submission history, newest first.
#[derive(Debug, Serialize, ToSchema)]
pub struct WardLogResponse {
    /// Ward identifier.
    pub ward_id: Uuid,
    /// Ward display name.
    pub ward_name: String,
    /// Approved point total.
    pub verified_points: i64,
    /// Point total still awaiting a verdict.
    pub pending_points: i64,
    /// Full submission history, newest first.
    pub submissions: Vec<SubmissionSummary>,
}
