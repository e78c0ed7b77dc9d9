use axum::Router;

use crate::state::SharedState;

/// Connectivity events and on-demand sync.
pub mod connectivity;
/// Swagger UI and the OpenAPI document.
pub mod docs;
/// Liveness endpoint.
pub mod health;
/// Roster CRUD.
pub mod players;
/// Schedule CRUD and RSVPs.
pub mod schedules;
/// Change stream.
pub mod sse;
/// Team config CRUD and team generation.
pub mod team_configs;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(connectivity::router())
        .merge(players::router())
        .merge(schedules::router())
        .merge(team_configs::router())
        .merge(sse::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
