//! DTO definitions for team configurations and generated teams.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::models::{GeneratedTeam, Record, TeamConfig},
    dto::{
        common::{RecordMeta, SyncStatus},
        format_timestamp_ms,
        validation::validate_display_name,
    },
};

/// Payload creating or renaming a team configuration.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct TeamConfigInput {
    #[validate(custom(function = "validate_display_name"))]
    pub name: String,
    /// Players per team; the configured default is used when omitted.
    #[serde(default)]
    #[validate(range(min = 2, max = 12))]
    pub team_size: Option<usize>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TeamDto {
    pub name: String,
    pub players: Vec<String>,
}

impl From<GeneratedTeam> for TeamDto {
    fn from(team: GeneratedTeam) -> Self {
        Self {
            name: team.name,
            players: team.players,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TeamConfigResponse {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub name: String,
    pub team_size: usize,
    pub teams: Vec<TeamDto>,
    /// RFC 3339 time of the last generation.
    pub generated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync: Option<SyncStatus>,
}

impl TeamConfigResponse {
    pub fn with_sync(mut self, sync: SyncStatus) -> Self {
        self.sync = Some(sync);
        self
    }
}

impl From<Record<TeamConfig>> for TeamConfigResponse {
    fn from(record: Record<TeamConfig>) -> Self {
        let meta = RecordMeta::from(&record);
        let config = record.fields;
        Self {
            meta,
            name: config.name,
            team_size: config.team_size,
            teams: config.teams.into_iter().map(TeamDto::from).collect(),
            generated_at: config.generated_at.map(format_timestamp_ms),
            sync: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn team_size_must_be_in_range() {
        let ok: TeamConfigInput =
            serde_json::from_value(json!({ "name": "Friday", "team_size": 6 })).unwrap();
        assert!(ok.validate().is_ok());
        let default: TeamConfigInput = serde_json::from_value(json!({ "name": "Friday" })).unwrap();
        assert!(default.validate().is_ok());
        let too_big: TeamConfigInput =
            serde_json::from_value(json!({ "name": "Friday", "team_size": 13 })).unwrap();
        assert!(too_big.validate().is_err());
    }
}
