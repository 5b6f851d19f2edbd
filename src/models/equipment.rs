//! Equipment model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Equipment record, identified by its unique serial number
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Equipment {
    pub id: i64,
    /// Serial number (unique, search key of the whole workflow)
    pub serial_number: String,
    pub brand: String,
    pub model: String,
    pub purchase_date: NaiveDate,
    /// Set when the equipment has been sold on
    pub sale_date: Option<NaiveDate>,
    /// Identifier of the buyer, free text
    pub buyer_id: Option<String>,
    pub notes: Option<String>,
}

/// Create equipment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEquipment {
    #[validate(length(min = 1, message = "Serial number is required"))]
    pub serial_number: String,
    #[validate(length(min = 1, message = "Brand is required"))]
    pub brand: String,
    #[validate(length(min = 1, message = "Model is required"))]
    pub model: String,
    /// Purchase date (YYYY-MM-DD)
    pub purchase_date: String,
    /// Sale date (YYYY-MM-DD)
    pub sale_date: Option<String>,
    pub buyer_id: Option<String>,
    pub notes: Option<String>,
}

/// Update equipment request (serial number is immutable)
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateEquipment {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub purchase_date: Option<String>,
    pub sale_date: Option<String>,
    pub buyer_id: Option<String>,
    pub notes: Option<String>,
}
