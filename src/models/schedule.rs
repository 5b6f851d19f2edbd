//! Preventive-maintenance schedule models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{
    sqlite::{Sqlite, SqliteArgumentValue, SqliteTypeInfo, SqliteValueRef},
    Decode, Encode, FromRow,
};
use utoipa::{IntoParams, ToSchema};

/// Status of a preventive-maintenance entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceStatus {
    Scheduled,
    InProgress,
    Completed,
}

impl MaintenanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaintenanceStatus::Scheduled => "scheduled",
            MaintenanceStatus::InProgress => "in_progress",
            MaintenanceStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for MaintenanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MaintenanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "scheduled" => Ok(MaintenanceStatus::Scheduled),
            "in_progress" => Ok(MaintenanceStatus::InProgress),
            "completed" => Ok(MaintenanceStatus::Completed),
            _ => Err(format!("Invalid maintenance status: {}", s)),
        }
    }
}

// SQLx conversion for MaintenanceStatus (stored as TEXT)
impl sqlx::Type<Sqlite> for MaintenanceStatus {
    fn type_info() -> SqliteTypeInfo {
        <String as sqlx::Type<Sqlite>>::type_info()
    }
}

impl<'r> Decode<'r, Sqlite> for MaintenanceStatus {
    fn decode(value: SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Sqlite>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl<'q> Encode<'q, Sqlite> for MaintenanceStatus {
    fn encode_by_ref(&self, buf: &mut Vec<SqliteArgumentValue<'q>>) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Sqlite>>::encode(s, buf)
    }
}

/// Preventive-maintenance schedule entry for one equipment
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ScheduleEntry {
    pub id: i64,
    pub equipment_id: i64,
    pub due_date: NaiveDate,
    /// Kind of maintenance (e.g. "revision", "calibration")
    pub maintenance_type: String,
    pub technician: Option<String>,
    pub status: MaintenanceStatus,
    pub notes: Option<String>,
}

/// Create schedule entry request; new entries start as `scheduled`
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateScheduleEntry {
    pub equipment_id: i64,
    /// Due date (YYYY-MM-DD)
    pub due_date: String,
    pub maintenance_type: String,
    pub technician: Option<String>,
    pub notes: Option<String>,
}

/// Update schedule entry request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateScheduleEntry {
    pub due_date: Option<String>,
    pub maintenance_type: Option<String>,
    pub technician: Option<String>,
    pub status: Option<MaintenanceStatus>,
    pub notes: Option<String>,
}

/// Schedule entry joined with its equipment for reminder display
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UpcomingMaintenance {
    pub id: i64,
    pub equipment_id: i64,
    pub serial_number: String,
    pub brand: String,
    pub model: String,
    pub due_date: NaiveDate,
    pub maintenance_type: String,
    pub technician: Option<String>,
    pub status: MaintenanceStatus,
}

/// Query parameters for the upcoming-maintenance listing
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct UpcomingQuery {
    /// Window size in days, defaults to 7
    pub days: Option<i64>,
}
