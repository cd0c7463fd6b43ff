//! Service layer implementing the submission ledger, achievement evaluation,
//! leaderboard aggregation, and the session boundary.

pub mod achievement_service;
pub mod auth_service;
pub mod documentation;
pub mod health_service;
pub mod leaderboard_service;
pub mod submission_service;
pub mod websocket_service;
pub mod ws_events;
