//! Wire-facing request/response types.

use time::{OffsetDateTime, format_description::well_known::Rfc3339};

pub mod auth;
pub mod health;
pub mod leaderboard;
pub mod submission;
pub mod validation;
pub mod ws;

/// Render a timestamp as RFC 3339 for wire payloads.
pub(crate) fn format_timestamp(time: OffsetDateTime) -> String {
    time.format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
