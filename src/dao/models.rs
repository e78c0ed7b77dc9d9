use std::{
    fmt,
    time::{SystemTime, UNIX_EPOCH},
};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

/// Collections synchronised between the local cache and the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Roster entries.
    Players,
    /// Games and practices.
    Schedules,
    /// Team-split configurations.
    TeamConfigs,
}

impl EntityKind {
    /// Every kind, in the order sweeps and snapshot refreshes visit them.
    pub const ALL: [EntityKind; 3] = [
        EntityKind::Players,
        EntityKind::Schedules,
        EntityKind::TeamConfigs,
    ];

    /// Stable collection name used as cache key and remote collection name.
    pub const fn collection(self) -> &'static str {
        match self {
            EntityKind::Players => "players",
            EntityKind::Schedules => "schedules",
            EntityKind::TeamConfigs => "team_configs",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

/// How a snapshot is folded into the local collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// Greater `last_modified` wins; ties go to the remote copy.
    LastWriteWins,
    /// A snapshot that is non-empty, came from the live server or carries
    /// pending writes overrides matching local records regardless of their
    /// timestamps. An empty cached snapshot leaves the collection untouched.
    PreferAuthoritativeSnapshot,
}

/// Payload type stored inside a [`Record`].
pub trait Entity:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Collection this entity lives in.
    const KIND: EntityKind;
    /// Merge policy applied by `reconcile_from_snapshot`.
    const MERGE_POLICY: MergePolicy = MergePolicy::LastWriteWins;
}

/// Client-clock timestamp in milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        })
}

/// A synchronised record as held in the local cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<T> {
    /// Device-local handle, never sent to the remote store.
    pub local_id: Uuid,
    /// Remote identifier; `None` until the remote store assigned one.
    pub id: Option<String>,
    /// Last modification time (ms since epoch), the sole conflict key.
    pub last_modified: i64,
    /// Entity payload.
    pub fields: T,
}

impl<T: Entity> Record<T> {
    /// Wrap `fields` into a local-only record.
    pub fn new(fields: T) -> Self {
        Self {
            local_id: Uuid::new_v4(),
            id: None,
            last_modified: 0,
            fields,
        }
    }

    /// Decode a remote document into a fresh local record.
    pub fn from_remote(document: RemoteDocument) -> serde_json::Result<Self> {
        let fields = serde_json::from_value(document.body)?;
        Ok(Self {
            local_id: Uuid::new_v4(),
            id: Some(document.id),
            last_modified: document.last_modified,
            fields,
        })
    }

    /// Encode the payload for the remote store.
    pub fn body(&self) -> serde_json::Result<Value> {
        serde_json::to_value(&self.fields)
    }
}

/// A document as stored in a remote collection.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteDocument {
    /// Identifier assigned by the remote store.
    pub id: String,
    /// Modification time carried with the document.
    pub last_modified: i64,
    /// Entity payload.
    pub body: Value,
}

/// Full-collection payload delivered by the snapshot feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteSnapshot {
    /// Every document of the collection.
    pub documents: Vec<RemoteDocument>,
    /// Snapshot was served from a client-side cache rather than the live server.
    pub from_cache: bool,
    /// Snapshot includes writes not yet acknowledged by the server.
    pub has_pending_writes: bool,
}

impl RemoteSnapshot {
    /// Snapshot freshly read from the live server.
    pub fn live(documents: Vec<RemoteDocument>) -> Self {
        Self {
            documents,
            from_cache: false,
            has_pending_writes: false,
        }
    }
}

/// Roster entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Display name, trimmed.
    pub name: String,
    /// Preferred court position.
    #[serde(default)]
    pub position: Option<String>,
    /// Skill rating from 1 to 5.
    #[serde(default = "default_skill")]
    pub skill: u8,
    /// Inactive players are left out of team generation.
    #[serde(default = "default_active")]
    pub active: bool,
    /// Shirt number.
    #[serde(default)]
    pub jersey_number: Option<u8>,
}

impl Entity for Player {
    const KIND: EntityKind = EntityKind::Players;
    const MERGE_POLICY: MergePolicy = MergePolicy::PreferAuthoritativeSnapshot;
}

/// Skill given to players created without one.
pub const DEFAULT_SKILL: u8 = 3;

fn default_skill() -> u8 {
    DEFAULT_SKILL
}

fn default_active() -> bool {
    true
}

/// Attendance answer for a scheduled game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RsvpStatus {
    /// Will attend.
    Going,
    /// Undecided.
    Maybe,
    /// Will not attend.
    NotGoing,
}

/// A scheduled game or practice slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Short label shown in the schedule.
    pub title: String,
    /// Start time in ms since epoch.
    pub starts_at: i64,
    /// Venue.
    #[serde(default)]
    pub location: Option<String>,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Answers keyed by player name, in the order they were first given.
    #[serde(default)]
    pub rsvps: IndexMap<String, RsvpStatus>,
}

impl Entity for Schedule {
    const KIND: EntityKind = EntityKind::Schedules;
}

/// A named team-split configuration and the teams last generated from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamConfig {
    /// Display name.
    pub name: String,
    /// Players per generated team.
    pub team_size: usize,
    /// Teams from the last generation.
    #[serde(default)]
    pub teams: Vec<GeneratedTeam>,
    /// When the teams were generated (ms since epoch).
    #[serde(default)]
    pub generated_at: Option<i64>,
}

impl Entity for TeamConfig {
    const KIND: EntityKind = EntityKind::TeamConfigs;
}

/// One team of a generated split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedTeam {
    /// "Team N", numbered from 1.
    pub name: String,
    /// Names of the players in the team.
    pub players: Vec<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn player_defaults_fill_missing_fields() {
        let player: Player = serde_json::from_value(json!({ "name": "Ana" })).unwrap();
        assert_eq!(player.skill, DEFAULT_SKILL);
        assert!(player.active);
        assert_eq!(player.position, None);
    }

    #[test]
    fn record_from_remote_keeps_id_and_timestamp() {
        let document = RemoteDocument {
            id: "abc123".into(),
            last_modified: 1000,
            body: json!({ "name": "Ana", "skill": 4 }),
        };
        let record = Record::<Player>::from_remote(document).unwrap();
        assert_eq!(record.id.as_deref(), Some("abc123"));
        assert_eq!(record.last_modified, 1000);
        assert_eq!(record.fields.skill, 4);
    }

    #[test]
    fn record_body_omits_local_metadata() {
        let record = Record::new(TeamConfig {
            name: "Friday".into(),
            team_size: 6,
            teams: Vec::new(),
            generated_at: None,
        });
        let body = record.body().unwrap();
        assert!(body.get("local_id").is_none());
        assert!(body.get("last_modified").is_none());
        assert_eq!(body["team_size"], 6);
    }

    #[test]
    fn schedule_rsvps_keep_insertion_order() {
        let schedule: Schedule = serde_json::from_value(json!({
            "title": "League night",
            "starts_at": 1_700_000_000_000i64,
            "rsvps": { "Zoe": "going", "Ana": "not_going" }
        }))
        .unwrap();
        let names: Vec<_> = schedule.rsvps.keys().cloned().collect();
        assert_eq!(names, ["Zoe", "Ana"]);
        assert_eq!(schedule.rsvps["Ana"], RsvpStatus::NotGoing);
    }

    #[test]
    fn collection_names_are_stable() {
        assert_eq!(EntityKind::TeamConfigs.to_string(), "team_configs");
        assert_eq!(EntityKind::ALL.len(), 3);
    }
}
