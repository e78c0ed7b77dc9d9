use serde::Serialize;
use tokio::sync::watch;
use tokio_stream::{StreamExt, wrappers::WatchStream};
use tracing::{debug, warn};

use crate::{
    dao::models::EntityKind,
    dto::sse::{CollectionChangedEvent, ConnectivityEvent, ServerEvent, SyncNoticeEvent},
    state::SharedState,
};

const EVENT_COLLECTION_CHANGED: &str = "collection_changed";
const EVENT_CONNECTIVITY: &str = "connectivity";
const EVENT_SYNC_NOTICE: &str = "sync_notice";

/// Tell clients a collection changed so they re-fetch it.
pub fn broadcast_collection_changed(state: &SharedState, kind: EntityKind, revision: u64) {
    let payload = CollectionChangedEvent {
        collection: kind.to_string(),
        revision,
    };
    send_event(state, EVENT_COLLECTION_CHANGED, &payload);
}

/// Broadcast the new connectivity state.
pub fn broadcast_connectivity(state: &SharedState, online: bool) {
    send_event(state, EVENT_CONNECTIVITY, &ConnectivityEvent { online });
}

/// Surface a sync failure as a toast.
pub fn broadcast_sync_notice(state: &SharedState, kind: EntityKind, message: &str) {
    let payload = SyncNoticeEvent {
        collection: kind.to_string(),
        message: message.to_string(),
    };
    send_event(state, EVENT_SYNC_NOTICE, &payload);
}

fn send_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.sse().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize SSE payload"),
    }
}

enum Change {
    Collection(EntityKind, u64),
    Connectivity(bool),
}

/// Forward store revisions and gate transitions onto the change stream.
pub async fn run_change_forwarder(state: SharedState) {
    let revisions = |kind: EntityKind, receiver: watch::Receiver<u64>| {
        WatchStream::from_changes(receiver).map(move |revision| Change::Collection(kind, revision))
    };
    let mut changes = revisions(EntityKind::Players, state.players().subscribe())
        .merge(revisions(EntityKind::Schedules, state.schedules().subscribe()))
        .merge(revisions(EntityKind::TeamConfigs, state.team_configs().subscribe()))
        .merge(WatchStream::from_changes(state.gate().subscribe()).map(Change::Connectivity));

    while let Some(change) = changes.next().await {
        match change {
            Change::Collection(kind, revision) => {
                broadcast_collection_changed(&state, kind, revision)
            }
            Change::Connectivity(online) => broadcast_connectivity(&state, online),
        }
    }

    debug!("change forwarder stopped");
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{local_cache::MemoryCache, models::Player},
        state::AppState,
    };

    #[tokio::test]
    async fn local_writes_reach_the_change_stream() {
        let state = AppState::new(AppConfig::default(), Arc::new(MemoryCache::new()));
        let mut events = state.sse().subscribe();
        let forwarder = tokio::spawn(run_change_forwarder(state.clone()));
        tokio::task::yield_now().await;

        state
            .players()
            .insert_local(Player {
                name: "Ana".into(),
                position: None,
                skill: 3,
                active: true,
                jersey_number: None,
            })
            .unwrap();

        let event = events.recv().await.unwrap();
        assert_eq!(event.event.as_deref(), Some(EVENT_COLLECTION_CHANGED));
        assert!(event.data.contains("\"players\""));
        forwarder.abort();
    }
}
