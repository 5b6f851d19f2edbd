//! Preventive-maintenance schedule endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::schedule::{
        CreateScheduleEntry, ScheduleEntry, UpcomingMaintenance, UpcomingQuery,
        UpdateScheduleEntry,
    },
};

use super::AuthenticatedUser;

/// List all schedule entries
#[utoipa::path(
    get,
    path = "/schedules",
    tag = "schedules",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of schedule entries", body = Vec<ScheduleEntry>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_schedules(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<ScheduleEntry>>> {
    let entries = state.services.schedules.list().await?;
    Ok(Json(entries))
}

/// Non-completed entries due within the window (default 7 days)
#[utoipa::path(
    get,
    path = "/schedules/upcoming",
    tag = "schedules",
    security(("bearer_auth" = [])),
    params(UpcomingQuery),
    responses(
        (status = 200, description = "Upcoming maintenance", body = Vec<UpcomingMaintenance>)
    )
)]
pub async fn list_upcoming(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<UpcomingQuery>,
) -> AppResult<Json<Vec<UpcomingMaintenance>>> {
    let entries = state
        .services
        .schedules
        .list_upcoming(query.days.unwrap_or(7))
        .await?;
    Ok(Json(entries))
}

/// Get a schedule entry by ID
#[utoipa::path(
    get,
    path = "/schedules/{id}",
    tag = "schedules",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Schedule entry ID")
    ),
    responses(
        (status = 200, description = "Schedule entry", body = ScheduleEntry),
        (status = 404, description = "Schedule entry not found")
    )
)]
pub async fn get_schedule(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ScheduleEntry>> {
    let entry = state.services.schedules.get_by_id(id).await?;
    Ok(Json(entry))
}

/// Create a schedule entry
#[utoipa::path(
    post,
    path = "/schedules",
    tag = "schedules",
    security(("bearer_auth" = [])),
    request_body = CreateScheduleEntry,
    responses(
        (status = 201, description = "Schedule entry created", body = ScheduleEntry),
        (status = 400, description = "Invalid input"),
        (status = 422, description = "Equipment does not exist")
    )
)]
pub async fn create_schedule(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateScheduleEntry>,
) -> AppResult<(StatusCode, Json<ScheduleEntry>)> {
    let created = state.services.schedules.create(&claims, data).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a schedule entry (status transitions included)
#[utoipa::path(
    put,
    path = "/schedules/{id}",
    tag = "schedules",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Schedule entry ID")
    ),
    request_body = UpdateScheduleEntry,
    responses(
        (status = 200, description = "Schedule entry updated", body = ScheduleEntry),
        (status = 404, description = "Schedule entry not found")
    )
)]
pub async fn update_schedule(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(data): Json<UpdateScheduleEntry>,
) -> AppResult<Json<ScheduleEntry>> {
    let updated = state.services.schedules.update(&claims, id, data).await?;
    Ok(Json(updated))
}

/// Delete a schedule entry
#[utoipa::path(
    delete,
    path = "/schedules/{id}",
    tag = "schedules",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Schedule entry ID")
    ),
    responses(
        (status = 204, description = "Schedule entry deleted"),
        (status = 404, description = "Schedule entry not found")
    )
)]
pub async fn delete_schedule(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.services.schedules.delete(&claims, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
