//! Team configurations and random team generation.

use uuid::Uuid;

use crate::{
    dao::models::{TeamConfig, now_ms},
    dto::{
        common::DeleteResponse,
        team_config::{TeamConfigInput, TeamConfigResponse},
    },
    error::ServiceError,
    services::{player_service, sync_service, team_generator},
    state::SharedState,
};

/// Every team config, in insertion order.
pub fn list_team_configs(state: &SharedState) -> Vec<TeamConfigResponse> {
    state
        .team_configs()
        .list()
        .into_iter()
        .map(TeamConfigResponse::from)
        .collect()
}

/// One team config by local id.
pub fn get_team_config(
    state: &SharedState,
    local_id: Uuid,
) -> Result<TeamConfigResponse, ServiceError> {
    sync_service::get(state.team_configs(), local_id).map(TeamConfigResponse::from)
}

/// Store a new team config and push it.
pub async fn create_team_config(
    state: &SharedState,
    input: TeamConfigInput,
) -> Result<TeamConfigResponse, ServiceError> {
    let config = TeamConfig {
        name: input.name.trim().to_string(),
        team_size: input
            .team_size
            .unwrap_or(state.config().default_team_size),
        teams: Vec::new(),
        generated_at: None,
    };
    let (record, sync) = sync_service::create(state, state.team_configs(), config).await?;
    Ok(TeamConfigResponse::from(record).with_sync(sync))
}

/// Rename or resize a configuration; previously generated teams are kept.
pub async fn update_team_config(
    state: &SharedState,
    local_id: Uuid,
    input: TeamConfigInput,
) -> Result<TeamConfigResponse, ServiceError> {
    let name = input.name.trim().to_string();
    let (record, sync) =
        sync_service::update(state, state.team_configs(), local_id, |config| {
            config.name = name;
            if let Some(team_size) = input.team_size {
                config.team_size = team_size;
            }
        })
        .await?;
    Ok(TeamConfigResponse::from(record).with_sync(sync))
}

/// Split the active roster into teams of the configured size and store them.
pub async fn generate_teams(
    state: &SharedState,
    local_id: Uuid,
) -> Result<TeamConfigResponse, ServiceError> {
    let config = sync_service::get(state.team_configs(), local_id)?;
    let teams = team_generator::generate(
        player_service::active_player_names(state),
        config.fields.team_size,
        &mut rand::rng(),
    )?;

    let generated_at = now_ms();
    let (record, sync) =
        sync_service::update(state, state.team_configs(), local_id, |config| {
            config.teams = teams;
            config.generated_at = Some(generated_at);
        })
        .await?;
    Ok(TeamConfigResponse::from(record).with_sync(sync))
}

/// Delete a team config.
pub async fn delete_team_config(
    state: &SharedState,
    local_id: Uuid,
) -> Result<DeleteResponse, ServiceError> {
    sync_service::delete(state, state.team_configs(), local_id).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{local_cache::MemoryCache, models::Player},
        state::AppState,
    };

    fn player(name: &str, active: bool) -> Player {
        Player {
            name: name.into(),
            position: None,
            skill: 3,
            active,
            jersey_number: None,
        }
    }

    #[tokio::test]
    async fn generation_skips_inactive_players() {
        let state = AppState::new(AppConfig::default(), Arc::new(MemoryCache::new()));
        for name in ["Ana", "Ben", "Cleo", "Dan", "Eve"] {
            state.players().insert_local(player(name, true)).unwrap();
        }
        state.players().insert_local(player("Injured", false)).unwrap();
        let input: TeamConfigInput =
            serde_json::from_value(json!({ "name": "Friday", "team_size": 2 })).unwrap();
        let created = create_team_config(&state, input).await.unwrap();

        let generated = generate_teams(&state, created.meta.local_id).await.unwrap();

        assert_eq!(generated.teams.len(), 3);
        let mut names: Vec<_> = generated
            .teams
            .iter()
            .flat_map(|team| team.players.clone())
            .collect();
        names.sort();
        assert_eq!(names, ["Ana", "Ben", "Cleo", "Dan", "Eve"]);
        assert!(generated.generated_at.is_some());
    }

    #[tokio::test]
    async fn generation_without_players_is_rejected() {
        let state = AppState::new(AppConfig::default(), Arc::new(MemoryCache::new()));
        let input: TeamConfigInput = serde_json::from_value(json!({ "name": "Empty" })).unwrap();
        let created = create_team_config(&state, input).await.unwrap();
        assert_eq!(created.team_size, state.config().default_team_size);

        let err = generate_teams(&state, created.meta.local_id).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }
}
