//! DTO definitions for the roster endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::models::{DEFAULT_SKILL, Player, Record},
    dto::{
        common::{RecordMeta, SyncStatus},
        validation::validate_display_name,
    },
};

/// Payload creating or replacing a roster entry.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct PlayerInput {
    #[validate(custom(function = "validate_display_name"))]
    pub name: String,
    /// Free text such as "setter" or "libero".
    #[serde(default)]
    #[validate(length(max = 32))]
    pub position: Option<String>,
    /// 1 to 5, defaults to 3.
    #[serde(default)]
    #[validate(range(min = 1, max = 5))]
    pub skill: Option<u8>,
    /// Defaults to `true`.
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    #[validate(range(max = 99))]
    pub jersey_number: Option<u8>,
}

impl From<PlayerInput> for Player {
    fn from(input: PlayerInput) -> Self {
        Self {
            name: input.name.trim().to_string(),
            position: input
                .position
                .map(|position| position.trim().to_string())
                .filter(|position| !position.is_empty()),
            skill: input.skill.unwrap_or(DEFAULT_SKILL),
            active: input.active.unwrap_or(true),
            jersey_number: input.jersey_number,
        }
    }
}

/// Roster entry as returned to clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlayerResponse {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub name: String,
    pub position: Option<String>,
    pub skill: u8,
    pub active: bool,
    pub jersey_number: Option<u8>,
    /// Present on write responses only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync: Option<SyncStatus>,
}

impl PlayerResponse {
    pub fn with_sync(mut self, sync: SyncStatus) -> Self {
        self.sync = Some(sync);
        self
    }
}

impl From<Record<Player>> for PlayerResponse {
    fn from(record: Record<Player>) -> Self {
        let meta = RecordMeta::from(&record);
        let Player {
            name,
            position,
            skill,
            active,
            jersey_number,
        } = record.fields;
        Self {
            meta,
            name,
            position,
            skill,
            active,
            jersey_number,
            sync: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn input(value: serde_json::Value) -> PlayerInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn defaults_and_trimming_apply() {
        let player = Player::from(input(json!({ "name": "  Ana ", "position": " " })));
        assert_eq!(player.name, "Ana");
        assert_eq!(player.position, None);
        assert_eq!(player.skill, DEFAULT_SKILL);
        assert!(player.active);
    }

    #[test]
    fn rejects_out_of_range_fields() {
        assert!(input(json!({ "name": "Ana", "skill": 3 })).validate().is_ok());
        assert!(input(json!({ "name": "Ana", "skill": 0 })).validate().is_err());
        assert!(input(json!({ "name": "Ana", "skill": 6 })).validate().is_err());
        assert!(input(json!({ "name": "Ana", "jersey_number": 100 })).validate().is_err());
        assert!(input(json!({ "name": " " })).validate().is_err());
    }

    #[test]
    fn write_responses_carry_sync_status() {
        let record = Record::new(Player::from(input(json!({ "name": "Ana" }))));
        let value = serde_json::to_value(PlayerResponse::from(record.clone())).unwrap();
        assert!(value.get("sync").is_none());
        assert_eq!(value["local_id"], json!(record.local_id));

        let value =
            serde_json::to_value(PlayerResponse::from(record).with_sync(SyncStatus::Synced))
                .unwrap();
        assert_eq!(value["sync"]["state"], "synced");
    }
}
