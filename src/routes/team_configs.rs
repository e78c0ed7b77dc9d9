use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::{
        common::DeleteResponse,
        team_config::{TeamConfigInput, TeamConfigResponse},
    },
    error::AppError,
    services::team_config_service,
    state::SharedState,
};

/// Team configuration endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route(
            "/team-configs",
            get(list_team_configs).post(create_team_config),
        )
        .route(
            "/team-configs/{local_id}",
            get(get_team_config)
                .put(update_team_config)
                .delete(delete_team_config),
        )
        .route("/team-configs/{local_id}/generate", post(generate_teams))
}

/// List every team config held locally.
#[utoipa::path(
    get,
    path = "/team-configs",
    tag = "teams",
    responses((status = 200, description = "Team configurations", body = [TeamConfigResponse]))
)]
pub async fn list_team_configs(State(state): State<SharedState>) -> Json<Vec<TeamConfigResponse>> {
    Json(team_config_service::list_team_configs(&state))
}

/// Fetch one team config.
#[utoipa::path(
    get,
    path = "/team-configs/{local_id}",
    tag = "teams",
    params(("local_id" = Uuid, Path, description = "Device-local configuration handle")),
    responses(
        (status = 200, description = "Team configuration", body = TeamConfigResponse),
        (status = 404, description = "Unknown configuration")
    )
)]
pub async fn get_team_config(
    State(state): State<SharedState>,
    Path(local_id): Path<Uuid>,
) -> Result<Json<TeamConfigResponse>, AppError> {
    Ok(Json(team_config_service::get_team_config(&state, local_id)?))
}

/// Add a team config locally and try to push it.
#[utoipa::path(
    post,
    path = "/team-configs",
    tag = "teams",
    request_body = TeamConfigInput,
    responses(
        (status = 200, description = "Configuration stored", body = TeamConfigResponse),
        (status = 400, description = "Invalid payload")
    )
)]
pub async fn create_team_config(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<TeamConfigInput>>,
) -> Result<Json<TeamConfigResponse>, AppError> {
    Ok(Json(
        team_config_service::create_team_config(&state, payload).await?,
    ))
}

/// Replace a team config's fields locally and try to push them.
#[utoipa::path(
    put,
    path = "/team-configs/{local_id}",
    tag = "teams",
    params(("local_id" = Uuid, Path, description = "Device-local configuration handle")),
    request_body = TeamConfigInput,
    responses(
        (status = 200, description = "Configuration updated", body = TeamConfigResponse),
        (status = 404, description = "Unknown configuration")
    )
)]
pub async fn update_team_config(
    State(state): State<SharedState>,
    Path(local_id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<TeamConfigInput>>,
) -> Result<Json<TeamConfigResponse>, AppError> {
    Ok(Json(
        team_config_service::update_team_config(&state, local_id, payload).await?,
    ))
}

/// Shuffle the active roster into teams of the configured size.
#[utoipa::path(
    post,
    path = "/team-configs/{local_id}/generate",
    tag = "teams",
    params(("local_id" = Uuid, Path, description = "Device-local configuration handle")),
    responses(
        (status = 200, description = "Teams generated", body = TeamConfigResponse),
        (status = 400, description = "No active players"),
        (status = 404, description = "Unknown configuration")
    )
)]
pub async fn generate_teams(
    State(state): State<SharedState>,
    Path(local_id): Path<Uuid>,
) -> Result<Json<TeamConfigResponse>, AppError> {
    Ok(Json(
        team_config_service::generate_teams(&state, local_id).await?,
    ))
}

/// Delete a team config locally, then remotely when possible.
#[utoipa::path(
    delete,
    path = "/team-configs/{local_id}",
    tag = "teams",
    params(("local_id" = Uuid, Path, description = "Device-local configuration handle")),
    responses(
        (status = 200, description = "Configuration deleted", body = DeleteResponse),
        (status = 404, description = "Unknown configuration")
    )
)]
pub async fn delete_team_config(
    State(state): State<SharedState>,
    Path(local_id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, AppError> {
    Ok(Json(
        team_config_service::delete_team_config(&state, local_id).await?,
    ))
}
