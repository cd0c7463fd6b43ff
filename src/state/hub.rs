//! Broadcast hub fanning out server events to every connected viewer.
//!
//! The live-connection set is owned by a single dispatch task and is only ever
//! touched through [`HubCommand`] messages, so registration, unregistration,
//! and broadcast never race. Each viewer has a bounded outbound queue; a
//! viewer whose queue is full at broadcast time is treated as unresponsive and
//! dropped so it cannot stall delivery to the others.

use std::collections::HashMap;

use axum::extract::ws::Message;
use tokio::sync::{
    mpsc::{self, error::TrySendError},
    oneshot,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::dto::ws::ServerEvent;

/// Capacity of each viewer's outbound queue.
pub const OUTBOUND_BUFFER: usize = 32;

#[derive(Clone)]
/// Handle used to push messages to a connected viewer.
pub struct ViewerConnection {
    /// Identifier assigned when the socket was accepted.
    pub id: Uuid,
    /// Bounded outbound queue drained by the connection's writer task.
    pub tx: mpsc::Sender<Message>,
}

enum HubCommand {
    Register(ViewerConnection),
    Unregister(Uuid),
    Broadcast(ServerEvent),
    ViewerCount(oneshot::Sender<usize>),
}

/// Cloneable handle to the hub dispatch task.
#[derive(Clone)]
pub struct BroadcastHub {
    tx: mpsc::UnboundedSender<HubCommand>,
}

impl BroadcastHub {
    /// Spawn the dispatch task and return a handle to it.
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_dispatch(rx));
        Self { tx }
    }

    /// Add a viewer to the live set.
    pub fn register(&self, connection: ViewerConnection) {
        let _ = self.tx.send(HubCommand::Register(connection));
    }

    /// Remove a viewer from the live set; a no-op if it was already dropped.
    pub fn unregister(&self, id: Uuid) {
        let _ = self.tx.send(HubCommand::Unregister(id));
    }

    /// Serialize an event once and enqueue it for every registered viewer.
    pub fn broadcast(&self, event: ServerEvent) {
        let _ = self.tx.send(HubCommand::Broadcast(event));
    }

    /// Number of currently registered viewers.
    pub async fn viewer_count(&self) -> usize {
        let (tx, rx) = oneshot::channel();
        if self.tx.send(HubCommand::ViewerCount(tx)).is_err() {
            return 0;
        }
        rx.await.unwrap_or(0)
    }
}

async fn run_dispatch(mut rx: mpsc::UnboundedReceiver<HubCommand>) {
    let mut viewers: HashMap<Uuid, mpsc::Sender<Message>> = HashMap::new();

    while let Some(command) = rx.recv().await {
        match command {
            HubCommand::Register(connection) => {
                info!(id = %connection.id, "viewer connected");
                viewers.insert(connection.id, connection.tx);
            }
            HubCommand::Unregister(id) => {
                if viewers.remove(&id).is_some() {
                    info!(id = %id, "viewer disconnected");
                }
            }
            HubCommand::Broadcast(event) => {
                let payload = match serde_json::to_string(&event) {
                    Ok(payload) => payload,
                    Err(err) => {
                        warn!(error = %err, "failed to serialize broadcast event");
                        continue;
                    }
                };
                viewers.retain(|id, tx| {
                    match tx.try_send(Message::Text(payload.clone().into())) {
                        Ok(()) => true,
                        Err(TrySendError::Full(_)) => {
                            warn!(id = %id, "viewer outbound queue full; dropping connection");
                            false
                        }
                        Err(TrySendError::Closed(_)) => false,
                    }
                });
            }
            HubCommand::ViewerCount(reply) => {
                let _ = reply.send(viewers.len());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::task::yield_now;

    fn viewer(capacity: usize) -> (ViewerConnection, mpsc::Receiver<Message>) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            ViewerConnection {
                id: Uuid::new_v4(),
                tx,
            },
            rx,
        )
    }

    fn event() -> ServerEvent {
        ServerEvent::json("leaderboard-update", &serde_json::json!({"rows": []}))
            .expect("serializable payload")
    }

    async fn settle(hub: &BroadcastHub) {
        // A round-trip through the dispatch task proves prior commands ran.
        let _ = hub.viewer_count().await;
        yield_now().await;
    }

    #[tokio::test]
    async fn broadcast_reaches_every_registered_viewer() {
        let hub = BroadcastHub::spawn();
        let (first, mut first_rx) = viewer(4);
        let (second, mut second_rx) = viewer(4);
        hub.register(first);
        hub.register(second);

        hub.broadcast(event());
        settle(&hub).await;

        assert!(matches!(first_rx.try_recv(), Ok(Message::Text(_))));
        assert!(matches!(second_rx.try_recv(), Ok(Message::Text(_))));
    }

    #[tokio::test]
    async fn saturated_viewer_is_dropped_without_blocking_others() {
        let hub = BroadcastHub::spawn();
        let (slow, mut slow_rx) = viewer(1);
        let (healthy, mut healthy_rx) = viewer(4);
        // Fill the slow viewer's queue so the next broadcast cannot be enqueued.
        slow.tx.try_send(Message::Text("stale".into())).unwrap();
        hub.register(slow);
        hub.register(healthy);

        hub.broadcast(event());
        settle(&hub).await;
        assert_eq!(hub.viewer_count().await, 1);
        assert!(matches!(healthy_rx.try_recv(), Ok(Message::Text(_))));

        // The slow viewer kept only its stale message and is now detached.
        assert!(matches!(slow_rx.try_recv(), Ok(Message::Text(text)) if text.as_str() == "stale"));
        hub.broadcast(event());
        settle(&hub).await;
        assert!(slow_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn shedding_a_viewer_closes_its_outbound_channel() {
        let hub = BroadcastHub::spawn();
        let (slow, mut slow_rx) = viewer(1);
        slow.tx.try_send(Message::Text("stale".into())).unwrap();
        hub.register(slow);

        // Registration moved the only sender into the hub, so shedding the
        // saturated viewer must leave the receiver disconnected. The writer
        // task relies on that closure to hang up the socket.
        hub.broadcast(event());
        settle(&hub).await;

        assert!(matches!(slow_rx.recv().await, Some(Message::Text(_))));
        assert!(slow_rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn unregistering_closes_the_outbound_channel() {
        let hub = BroadcastHub::spawn();
        let (connection, mut rx) = viewer(4);
        let id = connection.id;
        hub.register(connection);
        settle(&hub).await;

        hub.unregister(id);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn unregister_is_idempotent() {
        let hub = BroadcastHub::spawn();
        let (connection, _rx) = viewer(4);
        let id = connection.id;
        hub.register(connection);
        settle(&hub).await;
        assert_eq!(hub.viewer_count().await, 1);

        hub.unregister(id);
        hub.unregister(id);
        settle(&hub).await;
        assert_eq!(hub.viewer_count().await, 0);
    }
}
