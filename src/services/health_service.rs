//! Health probe combining store reachability and hub occupancy.

use tracing::warn;

use crate::{dao::store::PointsStore, dto::health::HealthResponse, state::SharedState};

/// Respond with the current health payload, logging store failures.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let viewers = state.hub().viewer_count().await;

    match state.store().health_check().await {
        Ok(()) => HealthResponse::ok(viewers),
        Err(err) => {
            warn!(error = %err, "storage health check failed");
            HealthResponse::degraded(viewers)
        }
    }
}
