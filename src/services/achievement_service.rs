//! Achievement evaluation from the configured milestone table.

use tracing::info;
use uuid::Uuid;

use crate::{
    dao::{models::NewAchievement, store::PointsStore},
    error::ServiceError,
    services::ws_events,
    state::SharedState,
};

/// Award every milestone the ward's verified total has reached.
///
/// The uniqueness of (ward, kind) is enforced at the store, so this is safe to
/// call repeatedly and concurrently: only a genuinely new award produces a
/// broadcast.
pub async fn evaluate(state: &SharedState, ward_id: Uuid) -> Result<(), ServiceError> {
    let store = state.store();
    let Some(ward) = store.find_ward(ward_id).await? else {
        return Err(ServiceError::NotFound(format!("ward `{ward_id}` not found")));
    };

    for milestone in state.config().milestones_reached(ward.verified_points) {
        let newly_awarded = store
            .award_achievement(NewAchievement {
                ward_id,
                kind: milestone.kind.clone(),
                title: milestone.title.clone(),
                description: milestone.description.clone(),
                icon: milestone.icon.clone(),
            })
            .await?;

        if newly_awarded {
            info!(ward = %ward.name, kind = %milestone.kind, "achievement earned");
            ws_events::broadcast_achievement(state, &ward.name, &milestone.title);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::extract::ws::Message;
    use tokio::sync::mpsc;
    use uuid::Uuid;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::store::{PointsStore, memory::MemoryStore},
        state::{AppState, SharedState, ViewerConnection},
    };

    async fn state_with_ward(verified: i64) -> (SharedState, Uuid) {
        let store = MemoryStore::new();
        let ward = store.seed_ward("North Ward").await;
        store.adjust_ward_points(ward, verified, 0).await.unwrap();
        let state = AppState::new(AppConfig::default(), Arc::new(store));
        (state, ward)
    }

    fn drain_achievement_events(rx: &mut mpsc::Receiver<Message>) -> usize {
        let mut count = 0;
        while let Ok(Message::Text(text)) = rx.try_recv() {
            let event: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
            if event["type"] == "achievement" {
                count += 1;
            }
        }
        count
    }

    #[tokio::test]
    async fn evaluate_awards_each_reached_milestone_once() {
        let (state, ward) = state_with_ward(650).await;
        let (tx, mut rx) = mpsc::channel(16);
        state.hub().register(ViewerConnection {
            id: Uuid::new_v4(),
            tx,
        });

        evaluate(&state, ward).await.unwrap();
        evaluate(&state, ward).await.unwrap();
        // Round-trip through the dispatch task so broadcasts are delivered.
        state.hub().viewer_count().await;

        let rows = state.store().achievements_for_ward(ward).await.unwrap();
        let kinds: Vec<_> = rows.iter().map(|a| a.kind.as_str()).collect();
        assert_eq!(kinds, ["first_100", "first_500"]);
        assert_eq!(drain_achievement_events(&mut rx), 2);
    }

    #[tokio::test]
    async fn evaluate_below_every_threshold_awards_nothing() {
        let (state, ward) = state_with_ward(50).await;
        evaluate(&state, ward).await.unwrap();
        assert!(state
            .store()
            .achievements_for_ward(ward)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn evaluate_unknown_ward_is_not_found() {
        let (state, _) = state_with_ward(0).await;
        assert!(matches!(
            evaluate(&state, Uuid::new_v4()).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
