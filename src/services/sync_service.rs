//! Reconnect sweep, snapshot refresh and the write-then-push helpers used by
//! the domain services.

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dao::models::{Entity, Record},
    dto::{
        common::{DeleteResponse, SyncStatus},
        connectivity::{CollectionSyncReport, ConnectivityResponse},
    },
    error::{ServiceError, SyncError},
    services::sse_events,
    state::{LocalRemoteStore, RecordKey, SharedState, Transition},
};

/// Push `record`'s latest local version and report how the remote half went.
///
/// The returned record reflects a remote id assigned by the push.
pub async fn push_and_report<T: Entity>(
    state: &SharedState,
    store: &LocalRemoteStore<T>,
    record: Record<T>,
) -> (Record<T>, SyncStatus) {
    let result = store.push_to_remote(record.local_id).await;
    if let Err(err) = &result
        && !matches!(err, SyncError::Offline)
    {
        warn!(collection = %T::KIND, local_id = %record.local_id, error = %err, "push failed");
        sse_events::broadcast_sync_notice(state, T::KIND, &err.user_message());
    }
    let status = SyncStatus::from_push(result);
    let record = store.get(record.local_id).unwrap_or(record);
    (record, status)
}

/// Store `fields` as a new local record, then try to push it.
pub async fn create<T: Entity>(
    state: &SharedState,
    store: &LocalRemoteStore<T>,
    fields: T,
) -> Result<(Record<T>, SyncStatus), ServiceError> {
    let record = store.insert_local(fields)?;
    Ok(push_and_report(state, store, record).await)
}

/// Apply `update` locally, then try to push the result.
pub async fn update<T, F>(
    state: &SharedState,
    store: &LocalRemoteStore<T>,
    local_id: Uuid,
    update: F,
) -> Result<(Record<T>, SyncStatus), ServiceError>
where
    T: Entity,
    F: FnOnce(&mut T),
{
    let record = store.update_local(local_id, update)?;
    Ok(push_and_report(state, store, record).await)
}

/// Delete locally, then remotely when possible.
pub async fn delete<T: Entity>(
    state: &SharedState,
    store: &LocalRemoteStore<T>,
    local_id: Uuid,
) -> Result<DeleteResponse, ServiceError> {
    let deleted = store.delete_record(RecordKey::Local(local_id)).await?;
    if let Err(err) = &deleted.remote {
        warn!(collection = %T::KIND, %local_id, error = %err, "remote delete failed");
        sse_events::broadcast_sync_notice(state, T::KIND, &err.user_message());
    }
    Ok(DeleteResponse {
        local_id,
        sync: SyncStatus::from_deletion(&deleted.remote),
    })
}

/// Look a record up by its local id.
pub fn get<T: Entity>(store: &LocalRemoteStore<T>, local_id: Uuid) -> Result<Record<T>, ServiceError> {
    store
        .get(local_id)
        .ok_or_else(|| ServiceError::NotFound(format!("record `{local_id}`")))
}

async fn sync_collection<T: Entity>(
    state: &SharedState,
    store: &LocalRemoteStore<T>,
) -> CollectionSyncReport {
    let report = match store.sweep().await {
        Ok(report) => report,
        Err(err) => {
            warn!(collection = %T::KIND, error = %err, "collection sweep failed");
            sse_events::broadcast_sync_notice(state, T::KIND, &err.user_message());
            return CollectionSyncReport::failed(T::KIND, err.user_message());
        }
    };
    for failure in &report.failures {
        sse_events::broadcast_sync_notice(state, T::KIND, &failure.message);
    }

    let refreshed = match store.refresh_from_remote().await {
        Ok(summary) => Some(summary),
        Err(err) => {
            warn!(collection = %T::KIND, error = %err, "snapshot refresh after sweep failed");
            None
        }
    };
    CollectionSyncReport::new(report, refreshed)
}

/// Push every pending record of every collection, then refresh each snapshot.
///
/// Returns [`ServiceError::Offline`] when the gate is offline. Concurrent
/// calls are serialised. A collection that fails as a whole is reported and
/// does not stop the others.
pub async fn sweep_all(state: &SharedState) -> Result<Vec<CollectionSyncReport>, ServiceError> {
    let _guard = state.sweep_gate().lock().await;
    if state.sync().remote_if_online().is_none() {
        return Err(ServiceError::Offline);
    }
    let token = state.gate().reconnect_token();

    let collections = vec![
        sync_collection(state, state.players()).await,
        sync_collection(state, state.schedules()).await,
        sync_collection(state, state.team_configs()).await,
    ];
    state.gate().mark_swept(token);
    info!(
        failures = collections
            .iter()
            .map(|report| report.failures.len() + usize::from(report.error.is_some()))
            .sum::<usize>(),
        "reconnect sweep finished"
    );
    Ok(collections)
}

async fn refresh_collection<T: Entity>(store: &LocalRemoteStore<T>) {
    match store.refresh_from_remote().await {
        Ok(summary) if summary.changed() => {
            debug!(collection = %T::KIND, ?summary, "snapshot applied");
        }
        Ok(_) => {}
        Err(SyncError::Offline) => {}
        Err(err) => warn!(collection = %T::KIND, error = %err, "snapshot refresh failed"),
    }
}

/// Fold a fresh snapshot of every collection into the local caches.
///
/// Skipped until the sweep following the latest reconnect has pushed the
/// records edited offline.
pub async fn refresh_all(state: &SharedState) {
    let _guard = state.sweep_gate().lock().await;
    if state.gate().sweep_pending() {
        debug!("reconnect sweep pending; skipping snapshot refresh");
        return;
    }
    refresh_collection(state.players()).await;
    refresh_collection(state.schedules()).await;
    refresh_collection(state.team_configs()).await;
}

/// Record a connectivity event from the host or the supervisor.
pub fn set_connectivity(state: &SharedState, online: bool) -> Option<Transition> {
    let transition = state.gate().set_online(online);
    if let Some(transition) = transition {
        info!(?transition, "connectivity changed");
    }
    transition
}

/// Gate state, backend presence and the number of records awaiting a sweep.
pub fn connectivity_status(state: &SharedState) -> ConnectivityResponse {
    ConnectivityResponse {
        online: state.gate().is_online(),
        backend_connected: state.sync().remote().is_some(),
        pending: state.players().pending().len()
            + state.schedules().pending().len()
            + state.team_configs().pending().len(),
    }
}

/// Run the reconnect sweep after every offline to online transition.
pub async fn run_reconnect_listener(state: SharedState) {
    let mut online = state.gate().subscribe();
    while online.changed().await.is_ok() {
        if !*online.borrow_and_update() {
            continue;
        }
        match sweep_all(&state).await {
            Ok(_) => {}
            Err(ServiceError::Offline) => debug!("went offline again before the sweep started"),
            Err(err) => warn!(error = %err, "reconnect sweep aborted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            local_cache::{CacheError, CacheResult, LocalCache, MemoryCache},
            models::{EntityKind, Player, Schedule},
            remote_store::MemoryRemoteStore,
        },
        state::AppState,
    };

    /// Memory cache refusing writes to one key.
    struct ReadOnlyKey {
        inner: MemoryCache,
        key: &'static str,
    }

    impl LocalCache for ReadOnlyKey {
        fn get(&self, key: &str) -> CacheResult<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> CacheResult<()> {
            if key == self.key {
                return Err(CacheError::Write {
                    key: key.to_string(),
                    source: std::io::Error::other("disk full"),
                });
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> CacheResult<()> {
            self.inner.remove(key)
        }
    }

    fn player(name: &str) -> Player {
        Player {
            name: name.into(),
            position: None,
            skill: 3,
            active: true,
            jersey_number: None,
        }
    }

    fn state_with_remote() -> (SharedState, MemoryRemoteStore) {
        let state = AppState::new(AppConfig::default(), Arc::new(MemoryCache::new()));
        let remote = MemoryRemoteStore::new();
        state.sync().install_remote(Arc::new(remote.clone()));
        (state, remote)
    }

    #[tokio::test]
    async fn offline_create_reports_offline_status() {
        let (state, remote) = state_with_remote();

        let (record, status) = create(&state, state.players(), player("Ana")).await.unwrap();

        assert!(record.id.is_none());
        assert!(matches!(status, SyncStatus::Offline { .. }));
        assert!(remote.documents(EntityKind::Players).is_empty());
    }

    #[tokio::test]
    async fn online_create_returns_the_assigned_id() {
        let (state, remote) = state_with_remote();
        set_connectivity(&state, true);

        let (record, status) = create(&state, state.players(), player("Ana")).await.unwrap();

        assert_eq!(status, SyncStatus::Synced);
        let id = record.id.unwrap();
        assert!(remote.get(EntityKind::Players, &id).is_some());
    }

    #[tokio::test]
    async fn sweep_all_pushes_every_collection() {
        let (state, remote) = state_with_remote();
        state.players().insert_local(player("Ana")).unwrap();
        state.players().insert_local(player("Ben")).unwrap();
        state
            .schedules()
            .insert_local(Schedule {
                title: "League".into(),
                starts_at: 0,
                location: None,
                notes: None,
                rsvps: Default::default(),
            })
            .unwrap();

        assert!(matches!(sweep_all(&state).await, Err(ServiceError::Offline)));

        set_connectivity(&state, true);
        let reports = sweep_all(&state).await.unwrap();

        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].created, 2);
        assert_eq!(reports[1].created, 1);
        assert_eq!(remote.documents(EntityKind::Players).len(), 2);
        assert_eq!(connectivity_status(&state).pending, 0);
    }

    #[tokio::test]
    async fn going_online_triggers_the_sweep() {
        let (state, remote) = state_with_remote();
        state.players().insert_local(player("Ana")).unwrap();
        let listener = tokio::spawn(run_reconnect_listener(state.clone()));
        let mut players = state.players().subscribe();
        players.borrow_and_update();

        set_connectivity(&state, true);
        // the id back-fill bumps the revision
        players.changed().await.unwrap();

        assert!(state.players().list()[0].id.is_some());
        assert_eq!(remote.documents(EntityKind::Players).len(), 1);
        listener.abort();
    }

    #[tokio::test]
    async fn delete_reports_skipped_remote_while_offline() {
        let (state, remote) = state_with_remote();
        set_connectivity(&state, true);
        let (record, _) = create(&state, state.players(), player("Ana")).await.unwrap();
        set_connectivity(&state, false);

        let response = delete(&state, state.players(), record.local_id).await.unwrap();

        assert!(matches!(response.sync, SyncStatus::Offline { .. }));
        assert_eq!(remote.documents(EntityKind::Players).len(), 1);
        assert!(state.players().list().is_empty());
    }

    #[tokio::test]
    async fn refresh_waits_for_the_reconnect_sweep() {
        let (state, remote) = state_with_remote();
        set_connectivity(&state, true);
        let (record, _) = create(&state, state.players(), player("Ana")).await.unwrap();
        let id = record.id.clone().unwrap();
        set_connectivity(&state, false);
        update(&state, state.players(), record.local_id, |fields| fields.skill = 5)
            .await
            .unwrap();
        set_connectivity(&state, true);

        refresh_all(&state).await;
        assert_eq!(state.players().get(record.local_id).unwrap().fields.skill, 5);

        sweep_all(&state).await.unwrap();
        assert_eq!(remote.get(EntityKind::Players, &id).unwrap().body["skill"], 5);
        assert_eq!(state.players().get(record.local_id).unwrap().fields.skill, 5);
        assert!(!state.gate().sweep_pending());
    }

    #[tokio::test]
    async fn failing_collection_does_not_stop_the_sweep() {
        let cache = ReadOnlyKey {
            inner: MemoryCache::new(),
            key: "players_sync",
        };
        let state = AppState::new(AppConfig::default(), Arc::new(cache));
        let remote = MemoryRemoteStore::new();
        state.sync().install_remote(Arc::new(remote.clone()));
        state.players().insert_local(player("Ana")).unwrap();
        state
            .schedules()
            .insert_local(Schedule {
                title: "League".into(),
                starts_at: 0,
                location: None,
                notes: None,
                rsvps: Default::default(),
            })
            .unwrap();
        set_connectivity(&state, true);

        let reports = sweep_all(&state).await.unwrap();

        assert_eq!(reports.len(), 3);
        assert!(reports[0].error.is_some());
        assert!(reports[1].error.is_none());
        assert_eq!(reports[1].created, 1);
        assert_eq!(remote.documents(EntityKind::Schedules).len(), 1);
    }
}
