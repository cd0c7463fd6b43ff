//! Health endpoint response.

use serde::Serialize;
use utoipa::ToSchema;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Number of currently connected leaderboard viewers.
    pub viewers: usize,
}

impl HealthResponse {
    /// Health response indicating the system is operational.
    pub fn ok(viewers: usize) -> Self {
        Self {
            status: "ok".to_string(),
            viewers,
        }
    }

    /// Health response indicating the storage backend is unreachable.
    pub fn degraded(viewers: usize) -> Self {
        Self {
            status: "degraded".to_string(),
            viewers,
        }
    }
}
