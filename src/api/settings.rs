//! Display and reminder settings exposed to the front end

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppResult;

use super::AuthenticatedUser;

/// Configuration values the front end needs for display and thresholds
#[derive(Serialize, ToSchema)]
pub struct SettingsResponse {
    /// Symbol used when rendering monetary amounts
    pub currency_symbol: String,
    /// Parts at or below this quantity count as low stock
    pub low_stock_threshold: i64,
    /// Hours between two reminder scans
    pub reminder_interval_hours: u64,
}

/// Current server settings
#[utoipa::path(
    get,
    path = "/settings",
    tag = "settings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Server settings", body = SettingsResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_settings(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<SettingsResponse>> {
    Ok(Json(SettingsResponse {
        currency_symbol: state.config.display.currency_symbol.clone(),
        low_stock_threshold: state.config.reminders.low_stock_threshold,
        reminder_interval_hours: state.config.reminders.interval_hours,
    }))
}
