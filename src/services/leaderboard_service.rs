//! Leaderboard aggregation: ranked standings and summary statistics.

use std::cmp::Ordering;

use time::{Duration, OffsetDateTime};

use crate::{
    dao::{models::WardRecord, store::PointsStore},
    dto::{
        format_timestamp,
        leaderboard::{LeaderboardEntry, LeaderboardResponse, SortKey, Stats},
    },
    error::ServiceError,
    state::SharedState,
};

/// Trailing window used for the streak figure.
const STREAK_WINDOW: Duration = Duration::days(7);

/// Compute ranked standings for every ward. A full snapshot is rebuilt on
/// each call; nothing is cached.
pub async fn compute_standings(
    state: &SharedState,
    sort: SortKey,
) -> Result<Vec<LeaderboardEntry>, ServiceError> {
    let store = state.store();
    let goal = state.config().goal_points();
    let window_start = OffsetDateTime::now_utc() - STREAK_WINDOW;

    let mut entries = Vec::new();
    for ward in store.list_wards().await? {
        let achievements = store
            .achievements_for_ward(ward.id)
            .await?
            .into_iter()
            .map(|a| format!("{} {}", a.icon, a.title))
            .collect();
        let engagement = store.ward_engagement(ward.id, window_start).await?;

        entries.push(LeaderboardEntry {
            rank: 0,
            ward_id: ward.id,
            ward_name: ward.name,
            verified_points: ward.verified_points,
            pending_points: ward.pending_points,
            total_points: ward.verified_points + ward.pending_points,
            progress: progress_toward_goal(ward.verified_points, goal),
            achievements,
            streak: engagement.active_days,
            last_activity: engagement.last_activity.map(format_timestamp),
        });
    }

    entries.sort_by(|a, b| compare_entries(a, b, sort));
    for (position, entry) in entries.iter_mut().enumerate() {
        entry.rank = position + 1;
    }

    Ok(entries)
}

/// Compute competition-wide summary statistics.
pub async fn compute_stats(state: &SharedState) -> Result<Stats, ServiceError> {
    let store = state.store();
    let wards = store.list_wards().await?;

    let leading_ward = wards
        .iter()
        .min_by(|a, b| leading_order(a, b))
        .map(|ward| ward.name.clone())
        .unwrap_or_default();
    let total_points = wards.iter().map(|ward| ward.verified_points).sum();

    let days_active = match store.earliest_approved_at().await? {
        Some(first) => (OffsetDateTime::now_utc() - first).whole_days().max(0),
        None => 0,
    };
    let participants = store.distinct_submitter_count().await?;

    Ok(Stats {
        leading_ward,
        total_points,
        days_active,
        participants,
    })
}

/// Standings plus statistics, as served by the leaderboard endpoint and the
/// `leaderboard-update` broadcast.
pub async fn get_leaderboard(
    state: &SharedState,
    sort: SortKey,
) -> Result<LeaderboardResponse, ServiceError> {
    Ok(LeaderboardResponse {
        leaderboard: compute_standings(state, sort).await?,
        stats: compute_stats(state).await?,
    })
}

/// Verified points as a percentage of the goal, rounded to one decimal.
pub fn progress_toward_goal(verified_points: i64, goal_points: i64) -> f64 {
    if goal_points <= 0 {
        return 0.0;
    }
    (verified_points as f64 / goal_points as f64 * 1000.0).round() / 10.0
}

/// Orders wards by verified points descending, ties broken by name ascending,
/// so the "leading ward" pick is deterministic.
fn leading_order(a: &WardRecord, b: &WardRecord) -> Ordering {
    b.verified_points
        .cmp(&a.verified_points)
        .then_with(|| a.name.cmp(&b.name))
}

fn compare_entries(a: &LeaderboardEntry, b: &LeaderboardEntry, sort: SortKey) -> Ordering {
    // Ward name ascending is the deterministic tie-breaker for every
    // point-based ordering.
    let by_name = || a.ward_name.cmp(&b.ward_name);
    match sort {
        SortKey::VerifiedDesc => b
            .verified_points
            .cmp(&a.verified_points)
            .then_with(by_name),
        SortKey::VerifiedAsc => a
            .verified_points
            .cmp(&b.verified_points)
            .then_with(by_name),
        SortKey::TotalDesc => b.total_points.cmp(&a.total_points).then_with(by_name),
        SortKey::TotalAsc => a.total_points.cmp(&b.total_points).then_with(by_name),
        SortKey::WardAsc => a.ward_name.cmp(&b.ward_name),
        SortKey::WardDesc => b.ward_name.cmp(&a.ward_name),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::store::{PointsStore, memory::MemoryStore},
    };

    async fn state_with_standings() -> SharedState {
        let store = MemoryStore::new();
        for (name, verified, pending) in [
            ("Moroni 1st Ward", 847, 50),
            ("Fountain Green 2nd Ward", 765, 55),
            ("Sanpitch Ward", 692, 0),
        ] {
            let id = store.seed_ward(name).await;
            store.adjust_ward_points(id, verified, pending).await.unwrap();
        }
        crate::state::AppState::new(AppConfig::default(), Arc::new(store))
    }

    #[test]
    fn progress_is_rounded_to_one_decimal() {
        assert_eq!(progress_toward_goal(650, 1300), 50.0);
        assert_eq!(progress_toward_goal(333, 1300), 25.6);
        assert_eq!(progress_toward_goal(0, 1300), 0.0);
        assert_eq!(progress_toward_goal(1300, 1300), 100.0);
        // A zero goal must not divide.
        assert_eq!(progress_toward_goal(100, 0), 0.0);
    }

    #[tokio::test]
    async fn default_sort_ranks_by_verified_points_descending() {
        let state = state_with_standings().await;
        let entries = compute_standings(&state, SortKey::default()).await.unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.ward_name.as_str()).collect();
        assert_eq!(
            names,
            ["Moroni 1st Ward", "Fountain Green 2nd Ward", "Sanpitch Ward"]
        );
        let ranks: Vec<_> = entries.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, [1, 2, 3]);
    }

    #[tokio::test]
    async fn ward_asc_sorts_by_name_regardless_of_points() {
        let state = state_with_standings().await;
        let entries = compute_standings(&state, SortKey::WardAsc).await.unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.ward_name.as_str()).collect();
        assert_eq!(
            names,
            ["Fountain Green 2nd Ward", "Moroni 1st Ward", "Sanpitch Ward"]
        );
    }

    #[tokio::test]
    async fn total_desc_orders_by_verified_plus_pending() {
        let state = state_with_standings().await;
        let entries = compute_standings(&state, SortKey::TotalDesc).await.unwrap();
        let totals: Vec<_> = entries.iter().map(|e| e.total_points).collect();
        assert_eq!(totals, [897, 820, 692]);
    }

    #[tokio::test]
    async fn point_ties_break_by_ward_name() {
        let store = MemoryStore::new();
        let b = store.seed_ward("Beta Ward").await;
        let a = store.seed_ward("Alpha Ward").await;
        store.adjust_ward_points(a, 100, 0).await.unwrap();
        store.adjust_ward_points(b, 100, 0).await.unwrap();
        let state = crate::state::AppState::new(AppConfig::default(), Arc::new(store));

        let entries = compute_standings(&state, SortKey::VerifiedDesc).await.unwrap();
        assert_eq!(entries[0].ward_name, "Alpha Ward");

        let stats = compute_stats(&state).await.unwrap();
        assert_eq!(stats.leading_ward, "Alpha Ward");
    }

    #[tokio::test]
    async fn stats_default_safely_with_no_approvals() {
        let state = state_with_standings().await;
        let stats = compute_stats(&state).await.unwrap();
        assert_eq!(stats.leading_ward, "Moroni 1st Ward");
        assert_eq!(stats.total_points, 847 + 765 + 692);
        assert_eq!(stats.days_active, 0);
        assert_eq!(stats.participants, 0);
    }
}
