//! Game schedules and attendance answers.

use uuid::Uuid;

use crate::{
    dto::{
        common::DeleteResponse,
        schedule::{RsvpEntry, ScheduleInput, ScheduleResponse},
    },
    error::ServiceError,
    services::sync_service,
    state::SharedState,
};

/// Schedules sorted by start time.
pub fn list_schedules(state: &SharedState) -> Vec<ScheduleResponse> {
    let mut records = state.schedules().list();
    records.sort_by_key(|record| record.fields.starts_at);
    records.into_iter().map(ScheduleResponse::from).collect()
}

/// One schedule by local id.
pub fn get_schedule(state: &SharedState, local_id: Uuid) -> Result<ScheduleResponse, ServiceError> {
    sync_service::get(state.schedules(), local_id).map(ScheduleResponse::from)
}

/// Store a new schedule and push it.
pub async fn create_schedule(
    state: &SharedState,
    input: ScheduleInput,
) -> Result<ScheduleResponse, ServiceError> {
    let (record, sync) =
        sync_service::create(state, state.schedules(), input.into_schedule()).await?;
    Ok(ScheduleResponse::from(record).with_sync(sync))
}

/// Overwrite a schedule's fields, keeping its RSVPs, and push them.
pub async fn update_schedule(
    state: &SharedState,
    local_id: Uuid,
    input: ScheduleInput,
) -> Result<ScheduleResponse, ServiceError> {
    let (record, sync) =
        sync_service::update(state, state.schedules(), local_id, |schedule| input.apply(schedule))
            .await?;
    Ok(ScheduleResponse::from(record).with_sync(sync))
}

/// Record a player's answer. An existing answer is replaced in place.
pub async fn set_rsvp(
    state: &SharedState,
    local_id: Uuid,
    entry: RsvpEntry,
) -> Result<ScheduleResponse, ServiceError> {
    let player = entry.player.trim().to_string();
    let (record, sync) = sync_service::update(state, state.schedules(), local_id, |schedule| {
        schedule.rsvps.insert(player, entry.status);
    })
    .await?;
    Ok(ScheduleResponse::from(record).with_sync(sync))
}

/// Delete a schedule.
pub async fn delete_schedule(
    state: &SharedState,
    local_id: Uuid,
) -> Result<DeleteResponse, ServiceError> {
    sync_service::delete(state, state.schedules(), local_id).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{local_cache::MemoryCache, models::RsvpStatus},
        state::AppState,
    };

    fn entry(player: &str, status: RsvpStatus) -> RsvpEntry {
        RsvpEntry {
            player: player.into(),
            status,
        }
    }

    #[tokio::test]
    async fn rsvp_upsert_keeps_answer_order() {
        let state = AppState::new(AppConfig::default(), Arc::new(MemoryCache::new()));
        let input: ScheduleInput =
            serde_json::from_value(json!({ "title": "League", "starts_at": 0 })).unwrap();
        let created = create_schedule(&state, input).await.unwrap();
        let id = created.meta.local_id;

        set_rsvp(&state, id, entry("Zoe", RsvpStatus::Going)).await.unwrap();
        set_rsvp(&state, id, entry("Ana", RsvpStatus::Maybe)).await.unwrap();
        let updated = set_rsvp(&state, id, entry(" Zoe ", RsvpStatus::NotGoing))
            .await
            .unwrap();

        let answers: Vec<_> = updated
            .rsvps
            .iter()
            .map(|entry| (entry.player.as_str(), entry.status))
            .collect();
        assert_eq!(
            answers,
            [("Zoe", RsvpStatus::NotGoing), ("Ana", RsvpStatus::Maybe)]
        );
    }

    #[tokio::test]
    async fn unknown_schedule_is_not_found() {
        let state = AppState::new(AppConfig::default(), Arc::new(MemoryCache::new()));
        let err = set_rsvp(&state, Uuid::new_v4(), entry("Ana", RsvpStatus::Going))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
