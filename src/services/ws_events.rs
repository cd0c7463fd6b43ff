//! Helpers that publish state-change events onto the broadcast hub.
//!
//! Broadcast failures never fail the triggering request: everything here logs
//! and returns.

use tracing::warn;

use crate::{
    dto::{
        leaderboard::SortKey,
        ws::{AchievementEvent, LeaderboardUpdateEvent, ServerEvent},
    },
    services::leaderboard_service,
    state::SharedState,
};

/// Recompute the standings and push a `leaderboard-update` event to every
/// connected viewer.
pub async fn broadcast_leaderboard(state: &SharedState) {
    let response = match leaderboard_service::get_leaderboard(state, SortKey::default()).await {
        Ok(response) => response,
        Err(err) => {
            warn!(error = %err, "failed to recompute leaderboard for broadcast");
            return;
        }
    };

    let payload = LeaderboardUpdateEvent {
        leaderboard: response.leaderboard,
        stats: response.stats,
    };
    publish(state, "leaderboard-update", &payload);
}

/// Push an `achievement` event announcing a newly earned milestone.
pub fn broadcast_achievement(state: &SharedState, ward_name: &str, title: &str) {
    let payload = AchievementEvent {
        ward: ward_name.to_string(),
        achievement: title.to_string(),
        milestone: format!("{ward_name} earned: {title}"),
    };
    publish(state, "achievement", &payload);
}

fn publish<T: serde::Serialize>(state: &SharedState, kind: &str, payload: &T) {
    match ServerEvent::json(kind, payload) {
        Ok(event) => state.hub().broadcast(event),
        Err(err) => warn!(kind, error = %err, "failed to serialize broadcast event"),
    }
}
