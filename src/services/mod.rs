/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Roster management.
pub mod player_service;
/// Timeout plus bounded retry for remote calls.
pub mod retry;
/// Schedules and RSVPs.
pub mod schedule_service;
/// Periodic remote snapshot refresh.
pub mod snapshot_feed;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events streaming.
pub mod sse_service;
/// Remote backend supervision driving the connectivity gate.
pub mod storage_supervisor;
/// Reconnect sweep and write-then-push helpers.
pub mod sync_service;
/// Team configurations and generation.
pub mod team_config_service;
/// Random team split.
pub mod team_generator;
