use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::{
        common::DeleteResponse,
        player::{PlayerInput, PlayerResponse},
    },
    error::AppError,
    services::player_service,
    state::SharedState,
};

/// Roster endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/players", get(list_players).post(create_player))
        .route(
            "/players/{local_id}",
            get(get_player).put(update_player).delete(delete_player),
        )
}

/// List every player held locally.
#[utoipa::path(
    get,
    path = "/players",
    tag = "players",
    responses((status = 200, description = "Roster", body = [PlayerResponse]))
)]
pub async fn list_players(State(state): State<SharedState>) -> Json<Vec<PlayerResponse>> {
    Json(player_service::list_players(&state))
}

/// Fetch one player.
#[utoipa::path(
    get,
    path = "/players/{local_id}",
    tag = "players",
    params(("local_id" = Uuid, Path, description = "Device-local player handle")),
    responses(
        (status = 200, description = "Player", body = PlayerResponse),
        (status = 404, description = "Unknown player")
    )
)]
pub async fn get_player(
    State(state): State<SharedState>,
    Path(local_id): Path<Uuid>,
) -> Result<Json<PlayerResponse>, AppError> {
    Ok(Json(player_service::get_player(&state, local_id)?))
}

/// Add a player locally and try to push it.
#[utoipa::path(
    post,
    path = "/players",
    tag = "players",
    request_body = PlayerInput,
    responses(
        (status = 200, description = "Player stored; `sync` tells whether it reached the server", body = PlayerResponse),
        (status = 400, description = "Invalid payload")
    )
)]
pub async fn create_player(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<PlayerInput>>,
) -> Result<Json<PlayerResponse>, AppError> {
    Ok(Json(player_service::create_player(&state, payload).await?))
}

/// Replace a player's details locally and try to push them.
#[utoipa::path(
    put,
    path = "/players/{local_id}",
    tag = "players",
    params(("local_id" = Uuid, Path, description = "Device-local player handle")),
    request_body = PlayerInput,
    responses(
        (status = 200, description = "Player updated", body = PlayerResponse),
        (status = 404, description = "Unknown player")
    )
)]
pub async fn update_player(
    State(state): State<SharedState>,
    Path(local_id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<PlayerInput>>,
) -> Result<Json<PlayerResponse>, AppError> {
    Ok(Json(
        player_service::update_player(&state, local_id, payload).await?,
    ))
}

/// Remove a player locally, and remotely when online.
#[utoipa::path(
    delete,
    path = "/players/{local_id}",
    tag = "players",
    params(("local_id" = Uuid, Path, description = "Device-local player handle")),
    responses(
        (status = 200, description = "Player deleted", body = DeleteResponse),
        (status = 404, description = "Unknown player")
    )
)]
pub async fn delete_player(
    State(state): State<SharedState>,
    Path(local_id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, AppError> {
    Ok(Json(player_service::delete_player(&state, local_id).await?))
}
