//! HTTP route trees.

use axum::Router;

use crate::state::SharedState;

pub mod auth;
pub mod docs;
pub mod health;
pub mod leaderboard;
pub mod points;
pub mod websocket;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(websocket::router())
        .merge(leaderboard::router())
        .merge(points::router())
        .merge(auth::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
