//! Ward points backend binary entrypoint wiring REST, WebSocket, and store layers.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod dao;
mod dto;
mod error;
mod routes;
mod services;
mod state;

use config::AppConfig;
use dao::{models::Role, store::memory::MemoryStore};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let store = MemoryStore::new();
    seed_store(&store, &config).await;

    let app_state = AppState::new(config, Arc::new(store));
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Seed the configured ward roster and accounts into an empty store.
async fn seed_store(store: &MemoryStore, config: &AppConfig) {
    for name in config.wards() {
        store.seed_ward(name).await;
    }

    for account in config.accounts() {
        let ward_id = match &account.ward {
            Some(ward_name) => {
                let found = store.ward_id_by_name(ward_name).await;
                if found.is_none() {
                    warn!(
                        email = %account.email,
                        ward = %ward_name,
                        "account references an unknown ward; seeding without one"
                    );
                }
                found
            }
            None => None,
        };

        if account.role == Role::WardApprover && ward_id.is_none() {
            warn!(
                email = %account.email,
                "ward approver without a resolvable ward will be unable to decide"
            );
        }

        store
            .seed_user(&account.email, &account.password, account.role, ward_id)
            .await;
    }

    info!(
        wards = config.wards().len(),
        accounts = config.accounts().len(),
        "store seeded"
    );
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: state::SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
