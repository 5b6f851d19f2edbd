//! Intervention (repair) model and part-usage lines

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Intervention row from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Intervention {
    pub id: i64,
    pub equipment_id: i64,
    pub entry_date: NaiveDate,
    pub exit_date: Option<NaiveDate>,
    pub repair_details: Option<String>,
    pub technician: Option<String>,
    pub labor_cost: f64,
    /// labor_cost plus the sum of the line costs; recomputed on every write
    pub total_cost: f64,
}

/// Part usage line attached to an intervention
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PartUsage {
    pub id: i64,
    pub intervention_id: i64,
    pub part_id: i64,
    pub quantity_used: i64,
    /// quantity_used x unit_price at recording time
    pub line_cost: f64,
}

/// Part usage line joined with its part for display
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PartUsageDetails {
    pub id: i64,
    pub part_id: i64,
    pub part_name: String,
    pub part_reference: String,
    pub quantity_used: i64,
    pub line_cost: f64,
}

/// Intervention with equipment identification and its usage lines
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InterventionDetails {
    pub id: i64,
    pub equipment_id: i64,
    pub serial_number: String,
    pub entry_date: NaiveDate,
    pub exit_date: Option<NaiveDate>,
    pub repair_details: Option<String>,
    pub technician: Option<String>,
    pub labor_cost: f64,
    pub total_cost: f64,
    pub part_usages: Vec<PartUsageDetails>,
}

/// One requested part usage line
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PartUsageRequest {
    pub part_id: i64,
    /// Strictly positive quantity, validated against stock at apply time
    pub quantity: i64,
}

/// Create intervention request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateIntervention {
    pub equipment_id: i64,
    /// Entry date (YYYY-MM-DD), required
    pub entry_date: String,
    /// Exit date (YYYY-MM-DD)
    pub exit_date: Option<String>,
    pub repair_details: Option<String>,
    pub technician: Option<String>,
    pub labor_cost: Option<f64>,
    #[serde(default)]
    pub part_usages: Vec<PartUsageRequest>,
}

/// Update intervention request; the part-usage set is replaced wholesale
/// (compensate-then-apply), the equipment link is immutable
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateIntervention {
    pub entry_date: String,
    pub exit_date: Option<String>,
    pub repair_details: Option<String>,
    pub technician: Option<String>,
    pub labor_cost: Option<f64>,
    #[serde(default)]
    pub part_usages: Vec<PartUsageRequest>,
}
