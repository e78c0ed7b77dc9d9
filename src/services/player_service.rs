//! Roster management on top of the player store.

use uuid::Uuid;

use crate::{
    dao::models::Player,
    dto::{
        common::DeleteResponse,
        player::{PlayerInput, PlayerResponse},
    },
    error::ServiceError,
    services::sync_service,
    state::SharedState,
};

/// Every player, in insertion order.
pub fn list_players(state: &SharedState) -> Vec<PlayerResponse> {
    state
        .players()
        .list()
        .into_iter()
        .map(PlayerResponse::from)
        .collect()
}

/// One player by local id.
pub fn get_player(state: &SharedState, local_id: Uuid) -> Result<PlayerResponse, ServiceError> {
    sync_service::get(state.players(), local_id).map(PlayerResponse::from)
}

/// Store a new player and push it.
pub async fn create_player(
    state: &SharedState,
    input: PlayerInput,
) -> Result<PlayerResponse, ServiceError> {
    let (record, sync) = sync_service::create(state, state.players(), Player::from(input)).await?;
    Ok(PlayerResponse::from(record).with_sync(sync))
}

/// Overwrite a player's fields and push them.
pub async fn update_player(
    state: &SharedState,
    local_id: Uuid,
    input: PlayerInput,
) -> Result<PlayerResponse, ServiceError> {
    let player = Player::from(input);
    let (record, sync) =
        sync_service::update(state, state.players(), local_id, |fields| *fields = player).await?;
    Ok(PlayerResponse::from(record).with_sync(sync))
}

/// Delete a player.
pub async fn delete_player(
    state: &SharedState,
    local_id: Uuid,
) -> Result<DeleteResponse, ServiceError> {
    sync_service::delete(state, state.players(), local_id).await
}

/// Names of the active players, in roster order.
pub fn active_player_names(state: &SharedState) -> Vec<String> {
    state
        .players()
        .list()
        .into_iter()
        .filter(|record| record.fields.active)
        .map(|record| record.fields.name)
        .collect()
}
