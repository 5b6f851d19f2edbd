//! Spare part model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Spare part with its authoritative stock quantity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Part {
    pub id: i64,
    pub name: String,
    /// Supplier reference (unique)
    pub reference: String,
    pub supplier: Option<String>,
    pub unit_price: f64,
    /// Current stock; only ever mutated through `adjust_stock`
    pub stock_quantity: i64,
    pub description: Option<String>,
}

/// Create part request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePart {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Reference is required"))]
    pub reference: String,
    pub supplier: Option<String>,
    #[validate(range(min = 0.0, message = "Unit price must not be negative"))]
    pub unit_price: f64,
    /// Initial stock quantity
    #[validate(range(min = 0, message = "Stock quantity must not be negative"))]
    pub stock_quantity: i64,
    pub description: Option<String>,
}

/// Update part request; stock quantity is excluded on purpose, it only
/// moves through the adjust-stock operation
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePart {
    pub name: Option<String>,
    pub reference: Option<String>,
    pub supplier: Option<String>,
    pub unit_price: Option<f64>,
    pub description: Option<String>,
}

/// Direct stock adjustment request (restock or manual correction)
#[derive(Debug, Deserialize, ToSchema)]
pub struct AdjustStock {
    /// Signed quantity delta; a negative result is rejected
    pub delta: i64,
}

/// Query parameters for the low-stock listing
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct LowStockQuery {
    /// Threshold override; defaults to the configured value
    pub threshold: Option<i64>,
}
