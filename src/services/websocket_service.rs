//! Viewer WebSocket lifecycle: register with the hub, keep the peer alive,
//! tear the socket down when either side lets go.

use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use tokio::{
    sync::mpsc,
    time::{interval, timeout},
};
use tracing::warn;
use uuid::Uuid;

use crate::state::{OUTBOUND_BUFFER, SharedState, ViewerConnection};

/// Interval between keepalive pings sent to the viewer.
const PING_INTERVAL: Duration = Duration::from_secs(30);
/// A viewer that stays silent for this long is considered gone.
const CLIENT_TIMEOUT: Duration = Duration::from_secs(60);

/// Handle the full lifecycle for one viewer connection.
///
/// The hub's registration holds the only long-lived handle to the outbound
/// queue: the moment the hub lets go of the viewer, whether through an
/// explicit unregister or a backpressure drop, the writer task observes the
/// channel close and winds down. Whichever of the two loops finishes first,
/// the socket is torn down and the connection unregistered before we return.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (sender, receiver) = socket.split();
    let (outbound_tx, outbound_rx) = mpsc::channel::<Message>(OUTBOUND_BUFFER);

    let viewer_id = Uuid::new_v4();
    state.hub().register(ViewerConnection {
        id: viewer_id,
        tx: outbound_tx,
    });

    let mut writer_task = tokio::spawn(write_loop(sender, outbound_rx));

    let writer_finished = tokio::select! {
        // The writer exits only once the hub has released its queue handle;
        // finishing here hangs up on a viewer the hub shed for backpressure.
        _ = &mut writer_task => true,
        _ = read_loop(receiver) => false,
    };

    state.hub().unregister(viewer_id);
    if !writer_finished {
        // Unregistering drops the last queue handle; the writer sees the
        // channel close, sends a close frame, and exits.
        let _ = writer_task.await;
    }
}

/// Drain the outbound queue onto the socket, interleaving keepalive pings.
async fn write_loop(
    mut sender: SplitSink<WebSocket, Message>,
    mut outbound_rx: mpsc::Receiver<Message>,
) {
    let mut ticker = interval(PING_INTERVAL);
    // The first tick fires immediately; skip it so pings are spaced out.
    ticker.tick().await;

    loop {
        tokio::select! {
            message = outbound_rx.recv() => match message {
                Some(message) => {
                    if sender.send(message).await.is_err() {
                        break;
                    }
                }
                None => {
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            },
            _ = ticker.tick() => {
                if sender.send(Message::Ping(Default::default())).await.is_err() {
                    break;
                }
            }
        }
    }
}

/// Consume inbound frames until the peer closes, errors, or misses the
/// keepalive deadline.
async fn read_loop(mut receiver: SplitStream<WebSocket>) {
    loop {
        match timeout(CLIENT_TIMEOUT, receiver.next()).await {
            Err(_) => {
                warn!("viewer missed the keepalive deadline; closing");
                break;
            }
            Ok(None) => break,
            Ok(Some(Ok(message))) => match message {
                Message::Close(_) => break,
                // Pings are answered at the protocol layer; any inbound frame
                // refreshes the deadline. The stream is otherwise write-only
                // from the server's perspective.
                Message::Ping(_) | Message::Pong(_) | Message::Text(_) | Message::Binary(_) => {}
            },
            Ok(Some(Err(err))) => {
                warn!(error = %err, "websocket error");
                break;
            }
        }
    }
}
