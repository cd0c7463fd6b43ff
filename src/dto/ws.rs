//! WebSocket event envelope and broadcast payloads.

use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::leaderboard::{LeaderboardEntry, Stats};

/// Envelope carried on the viewer WebSocket: `{type, data}`.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct ServerEvent {
    /// Event kind (`leaderboard-update` or `achievement`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Event-specific payload.
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
}

impl ServerEvent {
    /// Wrap a serializable payload in the broadcast envelope.
    pub fn json<T>(kind: &str, payload: &T) -> serde_json::Result<Self>
    where
        T: Serialize,
    {
        Ok(Self {
            kind: kind.to_string(),
            data: serde_json::to_value(payload)?,
        })
    }
}

/// Broadcast whenever standings may have changed.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardUpdateEvent {
    /// Freshly recomputed standings.
    pub leaderboard: Vec<LeaderboardEntry>,
    /// Summary statistics accompanying the standings.
    pub stats: Stats,
}

/// Broadcast when a ward earns a new achievement.
#[derive(Debug, Serialize, ToSchema)]
pub struct AchievementEvent {
    /// Name of the ward that earned the achievement.
    pub ward: String,
    /// Achievement title.
    pub achievement: String,
    /// Human-readable milestone line for toasts/banners.
    pub milestone: String,
}
