//! Equipment catalog methods on Repository

use super::{parse_date, Repository};
use crate::{
    error::{AppError, AppResult},
    models::{
        equipment::{CreateEquipment, Equipment, UpdateEquipment},
        intervention::Intervention,
    },
};

impl Repository {
    /// List all equipment
    pub async fn equipment_list(&self) -> AppResult<Vec<Equipment>> {
        let rows = sqlx::query_as::<_, Equipment>("SELECT * FROM equipment ORDER BY serial_number")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get equipment by ID
    pub async fn equipment_get_by_id(&self, id: i64) -> AppResult<Equipment> {
        sqlx::query_as::<_, Equipment>("SELECT * FROM equipment WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    /// Get equipment by serial number; a miss is how the front end decides
    /// to open its creation form
    pub async fn equipment_get_by_serial(&self, serial_number: &str) -> AppResult<Equipment> {
        sqlx::query_as::<_, Equipment>("SELECT * FROM equipment WHERE serial_number = ?")
            .bind(serial_number)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "No equipment with serial number {}",
                    serial_number
                ))
            })
    }

    /// Create equipment
    pub async fn equipment_create(&self, data: &CreateEquipment) -> AppResult<Equipment> {
        let purchase_date = parse_date(&data.purchase_date, "purchase_date")?;
        let sale_date = data
            .sale_date
            .as_deref()
            .map(|s| parse_date(s, "sale_date"))
            .transpose()?;

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM equipment WHERE serial_number = ?)",
        )
        .bind(&data.serial_number)
        .fetch_one(&self.pool)
        .await?;
        if exists {
            return Err(AppError::Conflict(format!(
                "Serial number {} already exists",
                data.serial_number
            )));
        }

        let row = sqlx::query_as::<_, Equipment>(
            r#"
            INSERT INTO equipment (serial_number, brand, model, purchase_date, sale_date, buyer_id, notes)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&data.serial_number)
        .bind(&data.brand)
        .bind(&data.model)
        .bind(purchase_date)
        .bind(sale_date)
        .bind(&data.buyer_id)
        .bind(&data.notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update equipment (serial number is immutable, equipment is never deleted)
    pub async fn equipment_update(&self, id: i64, data: &UpdateEquipment) -> AppResult<Equipment> {
        let purchase_date = data
            .purchase_date
            .as_deref()
            .map(|s| parse_date(s, "purchase_date"))
            .transpose()?;
        let sale_date = data
            .sale_date
            .as_deref()
            .map(|s| parse_date(s, "sale_date"))
            .transpose()?;

        let mut sets = Vec::new();

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(concat!($name, " = ?"));
                }
            };
        }

        add_field!(data.brand, "brand");
        add_field!(data.model, "model");
        add_field!(purchase_date, "purchase_date");
        add_field!(sale_date, "sale_date");
        add_field!(data.buyer_id, "buyer_id");
        add_field!(data.notes, "notes");

        if sets.is_empty() {
            return self.equipment_get_by_id(id).await;
        }

        let query = format!(
            "UPDATE equipment SET {} WHERE id = {} RETURNING *",
            sets.join(", "),
            id
        );

        let mut builder = sqlx::query_as::<_, Equipment>(&query);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.brand);
        bind_field!(data.model);
        bind_field!(purchase_date);
        bind_field!(sale_date);
        bind_field!(data.buyer_id);
        bind_field!(data.notes);

        builder
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    /// Repair history for one equipment, newest first
    pub async fn equipment_list_interventions(
        &self,
        equipment_id: i64,
    ) -> AppResult<Vec<Intervention>> {
        let rows = sqlx::query_as::<_, Intervention>(
            "SELECT * FROM interventions WHERE equipment_id = ? ORDER BY entry_date DESC, id DESC",
        )
        .bind(equipment_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
