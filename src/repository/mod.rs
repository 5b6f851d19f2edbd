//! Repository layer for database operations

pub mod equipment;
pub mod interventions;
pub mod parts;
pub mod schedules;
pub mod users;

use chrono::NaiveDate;
use sqlx::{Pool, Sqlite};

use crate::error::{AppError, AppResult};

/// Main repository struct holding the database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Sqlite>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Create all tables if absent. Foreign keys are declared for
    /// documentation but not enforced by the engine; referential checks
    /// happen in the repository operations themselves.
    pub async fn init_schema(&self) -> AppResult<()> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS equipment (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                serial_number TEXT NOT NULL UNIQUE,
                brand TEXT NOT NULL,
                model TEXT NOT NULL,
                purchase_date TEXT NOT NULL,
                sale_date TEXT,
                buyer_id TEXT,
                notes TEXT
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS parts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                reference TEXT NOT NULL UNIQUE,
                supplier TEXT,
                unit_price REAL NOT NULL DEFAULT 0,
                stock_quantity INTEGER NOT NULL DEFAULT 0,
                description TEXT
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS interventions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                equipment_id INTEGER NOT NULL,
                entry_date TEXT NOT NULL,
                exit_date TEXT,
                repair_details TEXT,
                technician TEXT,
                labor_cost REAL NOT NULL DEFAULT 0,
                total_cost REAL NOT NULL DEFAULT 0,
                FOREIGN KEY(equipment_id) REFERENCES equipment(id)
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS part_usages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                intervention_id INTEGER NOT NULL,
                part_id INTEGER NOT NULL,
                quantity_used INTEGER NOT NULL,
                line_cost REAL NOT NULL DEFAULT 0,
                FOREIGN KEY(intervention_id) REFERENCES interventions(id),
                FOREIGN KEY(part_id) REFERENCES parts(id)
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS schedule_entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                equipment_id INTEGER NOT NULL,
                due_date TEXT NOT NULL,
                maintenance_type TEXT NOT NULL,
                technician TEXT,
                status TEXT NOT NULL DEFAULT 'scheduled',
                notes TEXT,
                FOREIGN KEY(equipment_id) REFERENCES equipment(id)
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'user',
                force_password_change INTEGER NOT NULL DEFAULT 0
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS permissions (
                user_id INTEGER PRIMARY KEY,
                can_view_interventions INTEGER NOT NULL DEFAULT 0,
                can_add_interventions INTEGER NOT NULL DEFAULT 0,
                can_edit_interventions INTEGER NOT NULL DEFAULT 0,
                can_delete_interventions INTEGER NOT NULL DEFAULT 0,
                can_view_stock INTEGER NOT NULL DEFAULT 0,
                can_add_stock INTEGER NOT NULL DEFAULT 0,
                can_edit_stock INTEGER NOT NULL DEFAULT 0,
                can_delete_stock INTEGER NOT NULL DEFAULT 0,
                can_manage_users INTEGER NOT NULL DEFAULT 0,
                FOREIGN KEY(user_id) REFERENCES users(id)
            )
            "#,
        ];

        for statement in statements {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }
}

/// Parse a YYYY-MM-DD date field from a request
pub(crate) fn parse_date(value: &str, field: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Invalid {} (use YYYY-MM-DD)", field)))
}
