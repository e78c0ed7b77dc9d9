use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::connectivity::{ConnectivityRequest, ConnectivityResponse, SyncResponse},
    error::AppError,
    services::sync_service,
    state::SharedState,
};

/// Connectivity events and on-demand sync.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/connectivity", get(get_connectivity).post(set_connectivity))
        .route("/sync", post(sync_now))
}

/// Report the gate state and the pending record count.
#[utoipa::path(
    get,
    path = "/connectivity",
    tag = "sync",
    responses((status = 200, description = "Current connectivity", body = ConnectivityResponse))
)]
pub async fn get_connectivity(State(state): State<SharedState>) -> Json<ConnectivityResponse> {
    Json(sync_service::connectivity_status(&state))
}

/// Report a reachability change from the host. Going online starts the
/// reconnect sweep in the background.
#[utoipa::path(
    post,
    path = "/connectivity",
    tag = "sync",
    request_body = ConnectivityRequest,
    responses((status = 200, description = "Connectivity recorded", body = ConnectivityResponse))
)]
pub async fn set_connectivity(
    State(state): State<SharedState>,
    Json(payload): Json<ConnectivityRequest>,
) -> Json<ConnectivityResponse> {
    sync_service::set_connectivity(&state, payload.online);
    Json(sync_service::connectivity_status(&state))
}

/// Push every pending record now and refresh each collection.
#[utoipa::path(
    post,
    path = "/sync",
    tag = "sync",
    responses(
        (status = 200, description = "Sweep report", body = SyncResponse),
        (status = 503, description = "Remote store offline")
    )
)]
pub async fn sync_now(State(state): State<SharedState>) -> Result<Json<SyncResponse>, AppError> {
    let collections = sync_service::sweep_all(&state).await?;
    Ok(Json(SyncResponse { collections }))
}
