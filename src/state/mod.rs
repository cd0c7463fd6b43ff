//! Shared application state.

mod hub;

use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use crate::{config::AppConfig, dao::store::PointsStore};

pub use self::hub::{BroadcastHub, OUTBOUND_BUFFER, ViewerConnection};

/// Cheaply cloneable handle to the application state.
pub type SharedState = Arc<AppState>;

/// Central application state storing the store handle, broadcast hub, session
/// registry, and immutable configuration.
pub struct AppState {
    config: AppConfig,
    store: Arc<dyn PointsStore>,
    hub: BroadcastHub,
    sessions: DashMap<String, Uuid>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`], spawning the hub
    /// dispatch task.
    pub fn new(config: AppConfig, store: Arc<dyn PointsStore>) -> SharedState {
        Arc::new(Self {
            config,
            store,
            hub: BroadcastHub::spawn(),
            sessions: DashMap::new(),
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Handle to the persistence layer.
    pub fn store(&self) -> &Arc<dyn PointsStore> {
        &self.store
    }

    /// Handle to the broadcast hub dispatch task.
    pub fn hub(&self) -> &BroadcastHub {
        &self.hub
    }

    /// Registry of live session tokens mapped to user ids.
    pub fn sessions(&self) -> &DashMap<String, Uuid> {
        &self.sessions
    }
}
