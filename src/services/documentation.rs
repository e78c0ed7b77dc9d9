use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Courtside Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::connectivity::get_connectivity,
        crate::routes::connectivity::set_connectivity,
        crate::routes::connectivity::sync_now,
        crate::routes::players::list_players,
        crate::routes::players::get_player,
        crate::routes::players::create_player,
        crate::routes::players::update_player,
        crate::routes::players::delete_player,
        crate::routes::schedules::list_schedules,
        crate::routes::schedules::get_schedule,
        crate::routes::schedules::create_schedule,
        crate::routes::schedules::update_schedule,
        crate::routes::schedules::set_rsvp,
        crate::routes::schedules::delete_schedule,
        crate::routes::team_configs::list_team_configs,
        crate::routes::team_configs::get_team_config,
        crate::routes::team_configs::create_team_config,
        crate::routes::team_configs::update_team_config,
        crate::routes::team_configs::generate_teams,
        crate::routes::team_configs::delete_team_config,
        crate::routes::sse::changes_stream,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::common::SyncStatus,
            crate::dto::common::RecordMeta,
            crate::dto::common::DeleteResponse,
            crate::dto::connectivity::ConnectivityRequest,
            crate::dto::connectivity::ConnectivityResponse,
            crate::dto::connectivity::SyncResponse,
            crate::dto::connectivity::CollectionSyncReport,
            crate::dto::connectivity::ReconcileCounts,
            crate::dto::player::PlayerInput,
            crate::dto::player::PlayerResponse,
            crate::dto::schedule::ScheduleInput,
            crate::dto::schedule::ScheduleResponse,
            crate::dto::schedule::RsvpEntry,
            crate::dto::team_config::TeamConfigInput,
            crate::dto::team_config::TeamConfigResponse,
            crate::dto::team_config::TeamDto,
            crate::dto::sse::Handshake,
            crate::dto::sse::CollectionChangedEvent,
            crate::dto::sse::ConnectivityEvent,
            crate::dto::sse::SyncNoticeEvent,
            crate::dao::models::RsvpStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sync", description = "Connectivity events and reconnect sweep"),
        (name = "players", description = "Roster management"),
        (name = "schedules", description = "Game schedules and RSVPs"),
        (name = "teams", description = "Team configurations and generation"),
        (name = "sse", description = "Server-sent events streams"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/healthcheck",
            "/connectivity",
            "/sync",
            "/players/{local_id}",
            "/schedules/{local_id}/rsvp",
            "/team-configs/{local_id}/generate",
            "/sse/changes",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
