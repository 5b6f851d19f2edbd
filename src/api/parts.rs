//! Spare-parts inventory endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::part::{AdjustStock, CreatePart, LowStockQuery, Part, UpdatePart},
};

use super::AuthenticatedUser;

/// List all parts
#[utoipa::path(
    get,
    path = "/parts",
    tag = "parts",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of parts", body = Vec<Part>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_parts(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Part>>> {
    let parts = state.services.parts.list().await?;
    Ok(Json(parts))
}

/// Parts at or below the low-stock threshold
#[utoipa::path(
    get,
    path = "/parts/low-stock",
    tag = "parts",
    security(("bearer_auth" = [])),
    params(LowStockQuery),
    responses(
        (status = 200, description = "Low-stock parts, ordered by name", body = Vec<Part>)
    )
)]
pub async fn list_low_stock(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<LowStockQuery>,
) -> AppResult<Json<Vec<Part>>> {
    let parts = state.services.parts.list_low_stock(query.threshold).await?;
    Ok(Json(parts))
}

/// Get part by ID
#[utoipa::path(
    get,
    path = "/parts/{id}",
    tag = "parts",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Part ID")
    ),
    responses(
        (status = 200, description = "Part details", body = Part),
        (status = 404, description = "Part not found")
    )
)]
pub async fn get_part(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Part>> {
    let part = state.services.parts.get_by_id(id).await?;
    Ok(Json(part))
}

/// Create a part
#[utoipa::path(
    post,
    path = "/parts",
    tag = "parts",
    security(("bearer_auth" = [])),
    request_body = CreatePart,
    responses(
        (status = 201, description = "Part created", body = Part),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Reference already exists")
    )
)]
pub async fn create_part(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreatePart>,
) -> AppResult<(StatusCode, Json<Part>)> {
    let created = state.services.parts.create(&claims, data).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a part (stock moves only through the adjust-stock operation)
#[utoipa::path(
    put,
    path = "/parts/{id}",
    tag = "parts",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Part ID")
    ),
    request_body = UpdatePart,
    responses(
        (status = 200, description = "Part updated", body = Part),
        (status = 404, description = "Part not found"),
        (status = 409, description = "Reference already exists")
    )
)]
pub async fn update_part(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(data): Json<UpdatePart>,
) -> AppResult<Json<Part>> {
    let updated = state.services.parts.update(&claims, id, data).await?;
    Ok(Json(updated))
}

/// Delete a part
#[utoipa::path(
    delete,
    path = "/parts/{id}",
    tag = "parts",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Part ID")
    ),
    responses(
        (status = 204, description = "Part deleted"),
        (status = 404, description = "Part not found")
    )
)]
pub async fn delete_part(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.services.parts.delete(&claims, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Adjust stock by a signed delta (restock or manual correction)
#[utoipa::path(
    post,
    path = "/parts/{id}/adjust-stock",
    tag = "parts",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Part ID")
    ),
    request_body = AdjustStock,
    responses(
        (status = 200, description = "Stock adjusted", body = Part),
        (status = 404, description = "Part not found"),
        (status = 422, description = "Stock would become negative")
    )
)]
pub async fn adjust_stock(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(data): Json<AdjustStock>,
) -> AppResult<Json<Part>> {
    let part = state
        .services
        .parts
        .adjust_stock(&claims, id, data.delta)
        .await?;
    Ok(Json(part))
}
