use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, put},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::{
        common::DeleteResponse,
        schedule::{RsvpEntry, ScheduleInput, ScheduleResponse},
    },
    error::AppError,
    services::schedule_service,
    state::SharedState,
};

/// Schedule and RSVP endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/schedules", get(list_schedules).post(create_schedule))
        .route(
            "/schedules/{local_id}",
            get(get_schedule).put(update_schedule).delete(delete_schedule),
        )
        .route("/schedules/{local_id}/rsvp", put(set_rsvp))
}

/// List scheduled games by start time.
#[utoipa::path(
    get,
    path = "/schedules",
    tag = "schedules",
    responses((status = 200, description = "Schedules", body = [ScheduleResponse]))
)]
pub async fn list_schedules(State(state): State<SharedState>) -> Json<Vec<ScheduleResponse>> {
    Json(schedule_service::list_schedules(&state))
}

/// Fetch one schedule.
#[utoipa::path(
    get,
    path = "/schedules/{local_id}",
    tag = "schedules",
    params(("local_id" = Uuid, Path, description = "Device-local schedule handle")),
    responses(
        (status = 200, description = "Schedule", body = ScheduleResponse),
        (status = 404, description = "Unknown schedule")
    )
)]
pub async fn get_schedule(
    State(state): State<SharedState>,
    Path(local_id): Path<Uuid>,
) -> Result<Json<ScheduleResponse>, AppError> {
    Ok(Json(schedule_service::get_schedule(&state, local_id)?))
}

/// Add a schedule locally and try to push it.
#[utoipa::path(
    post,
    path = "/schedules",
    tag = "schedules",
    request_body = ScheduleInput,
    responses(
        (status = 200, description = "Schedule stored", body = ScheduleResponse),
        (status = 400, description = "Invalid payload")
    )
)]
pub async fn create_schedule(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<ScheduleInput>>,
) -> Result<Json<ScheduleResponse>, AppError> {
    Ok(Json(schedule_service::create_schedule(&state, payload).await?))
}

/// Replace the details of a schedule, keeping its answers.
#[utoipa::path(
    put,
    path = "/schedules/{local_id}",
    tag = "schedules",
    params(("local_id" = Uuid, Path, description = "Device-local schedule handle")),
    request_body = ScheduleInput,
    responses(
        (status = 200, description = "Schedule updated", body = ScheduleResponse),
        (status = 404, description = "Unknown schedule")
    )
)]
pub async fn update_schedule(
    State(state): State<SharedState>,
    Path(local_id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<ScheduleInput>>,
) -> Result<Json<ScheduleResponse>, AppError> {
    Ok(Json(
        schedule_service::update_schedule(&state, local_id, payload).await?,
    ))
}

/// Record or change a player's attendance answer.
#[utoipa::path(
    put,
    path = "/schedules/{local_id}/rsvp",
    tag = "schedules",
    params(("local_id" = Uuid, Path, description = "Device-local schedule handle")),
    request_body = RsvpEntry,
    responses(
        (status = 200, description = "Answer recorded", body = ScheduleResponse),
        (status = 404, description = "Unknown schedule")
    )
)]
pub async fn set_rsvp(
    State(state): State<SharedState>,
    Path(local_id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<RsvpEntry>>,
) -> Result<Json<ScheduleResponse>, AppError> {
    Ok(Json(
        schedule_service::set_rsvp(&state, local_id, payload).await?,
    ))
}

/// Delete a schedule locally, then remotely when possible.
#[utoipa::path(
    delete,
    path = "/schedules/{local_id}",
    tag = "schedules",
    params(("local_id" = Uuid, Path, description = "Device-local schedule handle")),
    responses(
        (status = 200, description = "Schedule deleted", body = DeleteResponse),
        (status = 404, description = "Unknown schedule")
    )
)]
pub async fn delete_schedule(
    State(state): State<SharedState>,
    Path(local_id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, AppError> {
    Ok(Json(
        schedule_service::delete_schedule(&state, local_id).await?,
    ))
}
