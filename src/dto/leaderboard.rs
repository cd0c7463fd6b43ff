//! Leaderboard projections and summary statistics.

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Ordering applied to the leaderboard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Verified points, highest first. The default.
    #[default]
    VerifiedDesc,
    /// Verified points, lowest first.
    VerifiedAsc,
    /// Verified plus pending points, highest first.
    TotalDesc,
    /// Verified plus pending points, lowest first.
    TotalAsc,
    /// Ward name, A to Z.
    WardAsc,
    /// Ward name, Z to A.
    WardDesc,
}

impl SortKey {
    /// Parse a query-string sort key; unrecognized values fall back to the
    /// default ordering.
    pub fn parse(value: &str) -> Self {
        match value {
            "verified-asc" => SortKey::VerifiedAsc,
            "total-desc" => SortKey::TotalDesc,
            "total-asc" => SortKey::TotalAsc,
            "ward-asc" => SortKey::WardAsc,
            "ward-desc" => SortKey::WardDesc,
            _ => SortKey::VerifiedDesc,
        }
    }
}

/// One ranked row of the leaderboard. Derived on demand, never persisted.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct LeaderboardEntry {
    /// 1-based position after sorting.
    pub rank: usize,
    /// Ward identifier.
    pub ward_id: Uuid,
    /// Ward display name.
    pub ward_name: String,
    /// Approved point total.
    pub verified_points: i64,
    /// Point total still awaiting a verdict.
    pub pending_points: i64,
    /// Verified plus pending.
    pub total_points: i64,
    /// Verified points as a percentage of the competition goal, one decimal.
    pub progress: f64,
    /// "icon title" display strings for earned achievements.
    pub achievements: Vec<String>,
    /// Distinct active days in the trailing 7-day window.
    pub streak: u32,
    /// Timestamp of the ward's most recent activity, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<String>,
}

/// Competition-wide summary statistics.
#[derive(Clone, Debug, Default, Serialize, ToSchema)]
pub struct Stats {
    /// Ward with the highest verified total (ties broken by name).
    pub leading_ward: String,
    /// Sum of verified points across all wards.
    pub total_points: i64,
    /// Whole days since the earliest approved submission; 0 when none exist.
    pub days_active: i64,
    /// Number of distinct submitter display names seen.
    pub participants: usize,
}

/// Standings plus statistics returned by the leaderboard endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardResponse {
    /// Ranked standings in the requested order.
    pub leaderboard: Vec<LeaderboardEntry>,
    /// Competition-wide summary figures.
    pub stats: Stats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_sort_keys_fall_back_to_verified_desc() {
        assert_eq!(SortKey::parse("ward-asc"), SortKey::WardAsc);
        assert_eq!(SortKey::parse("total-desc"), SortKey::TotalDesc);
        assert_eq!(SortKey::parse(""), SortKey::VerifiedDesc);
        assert_eq!(SortKey::parse("bogus"), SortKey::VerifiedDesc);
    }
}
