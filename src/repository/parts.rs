//! Parts inventory methods on Repository
//!
//! `adjust_stock` is the only place a stock quantity ever changes, both for
//! direct restocks and for the intervention ledger.

use sqlx::{Sqlite, Transaction};

use super::Repository;
use crate::{
    error::{AppError, AppResult},
    models::part::{CreatePart, Part, UpdatePart},
};

/// Apply a signed stock delta inside an open transaction.
///
/// The check and the write are one statement, so a concurrent writer cannot
/// slip between them; a result that would go negative aborts the caller's
/// transaction with an insufficient-stock error.
pub(crate) async fn adjust_stock(
    tx: &mut Transaction<'_, Sqlite>,
    part_id: i64,
    delta: i64,
) -> AppResult<i64> {
    let new_quantity: Option<i64> = sqlx::query_scalar(
        "UPDATE parts SET stock_quantity = stock_quantity + ? WHERE id = ? RETURNING stock_quantity",
    )
    .bind(delta)
    .bind(part_id)
    .fetch_optional(&mut **tx)
    .await?;

    let new_quantity = new_quantity
        .ok_or_else(|| AppError::Referential(format!("Part {} no longer exists", part_id)))?;

    if new_quantity < 0 {
        return Err(AppError::InsufficientStock(format!(
            "Part {}: only {} in stock, {} requested",
            part_id,
            new_quantity - delta,
            -delta
        )));
    }

    Ok(new_quantity)
}

impl Repository {
    /// List all parts
    pub async fn parts_list(&self) -> AppResult<Vec<Part>> {
        let rows = sqlx::query_as::<_, Part>("SELECT * FROM parts ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get part by ID
    pub async fn parts_get_by_id(&self, id: i64) -> AppResult<Part> {
        sqlx::query_as::<_, Part>("SELECT * FROM parts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Part {} not found", id)))
    }

    /// Check whether a supplier reference is already taken
    pub async fn parts_reference_exists(
        &self,
        reference: &str,
        exclude_id: Option<i64>,
    ) -> AppResult<bool> {
        let exists: bool = match exclude_id {
            Some(id) => {
                sqlx::query_scalar(
                    "SELECT EXISTS(SELECT 1 FROM parts WHERE reference = ? AND id != ?)",
                )
                .bind(reference)
                .bind(id)
                .fetch_one(&self.pool)
                .await?
            }
            None => {
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM parts WHERE reference = ?)")
                    .bind(reference)
                    .fetch_one(&self.pool)
                    .await?
            }
        };
        Ok(exists)
    }

    /// Create a part
    pub async fn parts_create(&self, data: &CreatePart) -> AppResult<Part> {
        if data.name.trim().is_empty() {
            return Err(AppError::Validation("Name must not be empty".to_string()));
        }
        if data.reference.trim().is_empty() {
            return Err(AppError::Validation("Reference must not be empty".to_string()));
        }
        if self.parts_reference_exists(&data.reference, None).await? {
            return Err(AppError::Conflict(format!(
                "Reference {} already exists",
                data.reference
            )));
        }

        let row = sqlx::query_as::<_, Part>(
            r#"
            INSERT INTO parts (name, reference, supplier, unit_price, stock_quantity, description)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.reference)
        .bind(&data.supplier)
        .bind(data.unit_price)
        .bind(data.stock_quantity)
        .bind(&data.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update a part (stock quantity excluded, see `parts_adjust_stock`)
    pub async fn parts_update(&self, id: i64, data: &UpdatePart) -> AppResult<Part> {
        if let Some(ref reference) = data.reference {
            if reference.trim().is_empty() {
                return Err(AppError::Validation("Reference must not be empty".to_string()));
            }
            if self.parts_reference_exists(reference, Some(id)).await? {
                return Err(AppError::Conflict(format!(
                    "Reference {} already exists",
                    reference
                )));
            }
        }
        if let Some(ref name) = data.name {
            if name.trim().is_empty() {
                return Err(AppError::Validation("Name must not be empty".to_string()));
            }
        }
        if let Some(price) = data.unit_price {
            if price < 0.0 {
                return Err(AppError::Validation(
                    "Unit price must not be negative".to_string(),
                ));
            }
        }

        let mut sets = Vec::new();

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(concat!($name, " = ?"));
                }
            };
        }

        add_field!(data.name, "name");
        add_field!(data.reference, "reference");
        add_field!(data.supplier, "supplier");
        add_field!(data.unit_price, "unit_price");
        add_field!(data.description, "description");

        if sets.is_empty() {
            return self.parts_get_by_id(id).await;
        }

        let query = format!(
            "UPDATE parts SET {} WHERE id = {} RETURNING *",
            sets.join(", "),
            id
        );

        let mut builder = sqlx::query_as::<_, Part>(&query);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.name);
        bind_field!(data.reference);
        bind_field!(data.supplier);
        bind_field!(data.unit_price);
        bind_field!(data.description);

        builder
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Part {} not found", id)))
    }

    /// Delete a part. Recorded usage lines keep pointing at the dead id;
    /// the ledger operations that later touch them fail referentially
    /// instead of dropping the line.
    pub async fn parts_delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM parts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Part {} not found", id)));
        }
        Ok(())
    }

    /// Direct stock adjustment (restock or manual correction)
    pub async fn parts_adjust_stock(&self, id: i64, delta: i64) -> AppResult<Part> {
        let mut tx = self.pool.begin().await?;
        adjust_stock(&mut tx, id, delta).await?;
        tx.commit().await?;
        self.parts_get_by_id(id).await
    }

    /// Parts at or below the threshold, ordered by name
    pub async fn parts_list_low_stock(&self, threshold: i64) -> AppResult<Vec<Part>> {
        let rows =
            sqlx::query_as::<_, Part>("SELECT * FROM parts WHERE stock_quantity <= ? ORDER BY name")
                .bind(threshold)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows)
    }
}
