//! Courtside Back binary entrypoint wiring the local caches, the remote
//! backend supervisor and the REST/SSE layers.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use courtside_back::{
    config::AppConfig,
    dao::{
        local_cache::FileCache,
        remote_store::{MemoryRemoteStore, StorageBackend},
    },
    routes,
    services::{snapshot_feed, sse_events, storage_supervisor, sync_service},
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let cache = FileCache::open(&config.cache_dir).context("opening local cache")?;
    let app_state = AppState::new(config, Arc::new(cache));
    app_state.load_caches().context("loading local caches")?;

    let backend = match StorageBackend::from_env().await {
        Ok(backend) => backend,
        Err(err) => {
            warn!(error = %err, "storage backend misconfigured; falling back to the memory store");
            StorageBackend::Memory(MemoryRemoteStore::new())
        }
    };
    info!(backend = backend.name(), "selected storage backend");

    spawn_background_tasks(&app_state, backend);
    // Build the HTTP router once the shared state is ready.
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

fn spawn_background_tasks(state: &SharedState, backend: StorageBackend) {
    tokio::spawn(sync_service::run_reconnect_listener(state.clone()));
    tokio::spawn(sse_events::run_change_forwarder(state.clone()));
    tokio::spawn(snapshot_feed::run(state.clone()));
    tokio::spawn(storage_supervisor::run(state.clone(), move || {
        backend.connect()
    }));
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
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

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
