//! DTO definitions for the schedule and RSVP endpoints.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::models::{Record, RsvpStatus, Schedule},
    dto::{
        common::{RecordMeta, SyncStatus},
        format_timestamp_ms,
        validation::validate_display_name,
    },
};

/// Payload creating or replacing a scheduled game. Answers already given are
/// kept on replacement.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ScheduleInput {
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    /// Start time in ms since the Unix epoch.
    #[validate(range(min = 0))]
    pub starts_at: i64,
    #[serde(default)]
    #[validate(length(max = 120))]
    pub location: Option<String>,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

impl ScheduleInput {
    /// Copy the input over `schedule`, leaving its answers untouched.
    pub fn apply(self, schedule: &mut Schedule) {
        schedule.title = self.title.trim().to_string();
        schedule.starts_at = self.starts_at;
        schedule.location = self.location;
        schedule.notes = self.notes;
    }

    pub fn into_schedule(self) -> Schedule {
        let mut schedule = Schedule {
            title: String::new(),
            starts_at: 0,
            location: None,
            notes: None,
            rsvps: IndexMap::new(),
        };
        self.apply(&mut schedule);
        schedule
    }
}

/// One player's attendance answer.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct RsvpEntry {
    #[validate(custom(function = "validate_display_name"))]
    pub player: String,
    pub status: RsvpStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ScheduleResponse {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub title: String,
    pub starts_at: i64,
    /// `starts_at` as RFC 3339.
    pub starts_at_iso: String,
    pub location: Option<String>,
    pub notes: Option<String>,
    /// Answers in the order they were first given.
    pub rsvps: Vec<RsvpEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync: Option<SyncStatus>,
}

impl ScheduleResponse {
    pub fn with_sync(mut self, sync: SyncStatus) -> Self {
        self.sync = Some(sync);
        self
    }
}

impl From<Record<Schedule>> for ScheduleResponse {
    fn from(record: Record<Schedule>) -> Self {
        let meta = RecordMeta::from(&record);
        let schedule = record.fields;
        Self {
            meta,
            starts_at_iso: format_timestamp_ms(schedule.starts_at),
            title: schedule.title,
            starts_at: schedule.starts_at,
            location: schedule.location,
            notes: schedule.notes,
            rsvps: schedule
                .rsvps
                .into_iter()
                .map(|(player, status)| RsvpEntry { player, status })
                .collect(),
            sync: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn replacing_details_keeps_answers() {
        let mut schedule = Schedule {
            title: "Old".into(),
            starts_at: 1,
            location: Some("Gym".into()),
            notes: None,
            rsvps: IndexMap::from([("Ana".to_string(), RsvpStatus::Going)]),
        };
        let input: ScheduleInput =
            serde_json::from_value(json!({ "title": " League ", "starts_at": 5 })).unwrap();
        input.apply(&mut schedule);

        assert_eq!(schedule.title, "League");
        assert_eq!(schedule.location, None);
        assert_eq!(schedule.rsvps.len(), 1);
    }

    #[test]
    fn rsvps_are_listed_in_answer_order() {
        let mut record = Record::new(
            serde_json::from_value::<ScheduleInput>(json!({ "title": "Cup", "starts_at": 0 }))
                .unwrap()
                .into_schedule(),
        );
        record.fields.rsvps.insert("Zoe".into(), RsvpStatus::Maybe);
        record.fields.rsvps.insert("Ana".into(), RsvpStatus::Going);

        let response = ScheduleResponse::from(record);
        let players: Vec<_> = response.rsvps.iter().map(|entry| entry.player.as_str()).collect();
        assert_eq!(players, ["Zoe", "Ana"]);
        assert_eq!(response.starts_at_iso, "1970-01-01T00:00:00Z");
    }

    #[test]
    fn rejects_empty_title_and_negative_start() {
        let blank: ScheduleInput =
            serde_json::from_value(json!({ "title": "", "starts_at": 0 })).unwrap();
        assert!(blank.validate().is_err());
        let negative: ScheduleInput =
            serde_json::from_value(json!({ "title": "Cup", "starts_at": -1 })).unwrap();
        assert!(negative.validate().is_err());
    }
}
