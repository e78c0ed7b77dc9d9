//! Periodic full-collection refresh standing in for a real-time subscription.

use tokio::time::{MissedTickBehavior, interval};

use crate::{services::sync_service, state::SharedState};

/// Refresh every collection from the remote store each snapshot interval
/// while the gate is online and no reconnect sweep is owed.
pub async fn run(state: SharedState) {
    let mut ticker = interval(state.config().snapshot_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        if state.gate().is_online() {
            sync_service::refresh_all(&state).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            local_cache::MemoryCache,
            models::{EntityKind, RemoteDocument},
            remote_store::MemoryRemoteStore,
        },
        state::AppState,
    };

    fn league_night() -> RemoteDocument {
        RemoteDocument {
            id: "s1".into(),
            last_modified: 1_000,
            body: json!({ "title": "League", "starts_at": 0 }),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn adopts_remote_records_while_online() {
        let state = AppState::new(AppConfig::default(), Arc::new(MemoryCache::new()));
        let remote = MemoryRemoteStore::new();
        state.sync().install_remote(Arc::new(remote.clone()));
        sync_service::set_connectivity(&state, true);
        sync_service::sweep_all(&state).await.unwrap();
        remote.put(EntityKind::Schedules, league_night());
        let mut schedules = state.schedules().subscribe();
        schedules.borrow_and_update();

        let feed = tokio::spawn(run(state.clone()));
        schedules.changed().await.unwrap();

        assert_eq!(
            state.schedules().find_by_remote_id("s1").unwrap().fields.title,
            "League"
        );
        feed.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn holds_off_until_the_reconnect_sweep_ran() {
        let state = AppState::new(AppConfig::default(), Arc::new(MemoryCache::new()));
        let remote = MemoryRemoteStore::new();
        remote.put(EntityKind::Schedules, league_night());
        state.sync().install_remote(Arc::new(remote));
        sync_service::set_connectivity(&state, true);

        let feed = tokio::spawn(run(state.clone()));
        tokio::time::sleep(state.config().snapshot_interval * 3).await;
        assert!(state.schedules().list().is_empty());

        sync_service::sweep_all(&state).await.unwrap();
        assert!(state.schedules().find_by_remote_id("s1").is_some());
        feed.abort();
    }
}
