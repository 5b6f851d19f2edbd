//! Intervention ledger endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::intervention::{
        CreateIntervention, Intervention, InterventionDetails, UpdateIntervention,
    },
};

use super::AuthenticatedUser;

/// List all interventions, newest first
#[utoipa::path(
    get,
    path = "/interventions",
    tag = "interventions",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of interventions", body = Vec<Intervention>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_interventions(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Intervention>>> {
    let interventions = state.services.interventions.list().await?;
    Ok(Json(interventions))
}

/// Intervention details with its part-usage lines
#[utoipa::path(
    get,
    path = "/interventions/{id}",
    tag = "interventions",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Intervention ID")
    ),
    responses(
        (status = 200, description = "Intervention details", body = InterventionDetails),
        (status = 404, description = "Intervention not found")
    )
)]
pub async fn get_intervention(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<InterventionDetails>> {
    let details = state.services.interventions.get_details(id).await?;
    Ok(Json(details))
}

/// Record a new intervention; requested part usages are debited from stock
/// atomically with the record itself
#[utoipa::path(
    post,
    path = "/interventions",
    tag = "interventions",
    security(("bearer_auth" = [])),
    request_body = CreateIntervention,
    responses(
        (status = 201, description = "Intervention created", body = InterventionDetails),
        (status = 400, description = "Invalid input"),
        (status = 422, description = "Insufficient stock or unknown part/equipment")
    )
)]
pub async fn create_intervention(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateIntervention>,
) -> AppResult<(StatusCode, Json<InterventionDetails>)> {
    let created = state.services.interventions.create(&claims, data).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Edit an intervention; its part-usage set is replaced wholesale
/// (compensate-then-apply)
#[utoipa::path(
    put,
    path = "/interventions/{id}",
    tag = "interventions",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Intervention ID")
    ),
    request_body = UpdateIntervention,
    responses(
        (status = 200, description = "Intervention updated", body = InterventionDetails),
        (status = 404, description = "Intervention not found"),
        (status = 422, description = "Insufficient stock or unknown part")
    )
)]
pub async fn update_intervention(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(data): Json<UpdateIntervention>,
) -> AppResult<Json<InterventionDetails>> {
    let updated = state
        .services
        .interventions
        .update(&claims, id, data)
        .await?;
    Ok(Json(updated))
}

/// Delete an intervention, restoring the stock its lines were holding
#[utoipa::path(
    delete,
    path = "/interventions/{id}",
    tag = "interventions",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Intervention ID")
    ),
    responses(
        (status = 204, description = "Intervention deleted, stock restored"),
        (status = 404, description = "Intervention not found"),
        (status = 422, description = "A referenced part no longer exists")
    )
)]
pub async fn delete_intervention(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.services.interventions.delete(&claims, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
