//! Intervention ledger methods on Repository
//!
//! Every mutation here runs inside a single transaction: the intervention
//! row, its usage lines and the stock adjustments commit together or not at
//! all. An error on any step returns before `commit`, and the dropped
//! transaction rolls the store back to its pre-operation state.

use sqlx::{Sqlite, Transaction};

use super::{parse_date, parts::adjust_stock, Repository};
use crate::{
    error::{AppError, AppResult},
    models::intervention::{
        CreateIntervention, Intervention, InterventionDetails, PartUsageDetails,
        PartUsageRequest, UpdateIntervention,
    },
};

/// Insert the requested usage lines and debit stock for each, returning the
/// summed line costs. Quantities are re-validated against current stock
/// here, inside the transaction, regardless of what the caller saw when the
/// request was composed.
async fn apply_usages(
    tx: &mut Transaction<'_, Sqlite>,
    intervention_id: i64,
    usages: &[PartUsageRequest],
) -> AppResult<f64> {
    let mut parts_cost = 0.0;

    for usage in usages {
        if usage.quantity <= 0 {
            return Err(AppError::Validation(format!(
                "Quantity for part {} must be a positive integer",
                usage.part_id
            )));
        }

        let unit_price: Option<f64> = sqlx::query_scalar("SELECT unit_price FROM parts WHERE id = ?")
            .bind(usage.part_id)
            .fetch_optional(&mut **tx)
            .await?;
        let unit_price = unit_price
            .ok_or_else(|| AppError::Referential(format!("Part {} does not exist", usage.part_id)))?;

        adjust_stock(tx, usage.part_id, -usage.quantity).await?;

        let line_cost = usage.quantity as f64 * unit_price;
        sqlx::query(
            r#"
            INSERT INTO part_usages (intervention_id, part_id, quantity_used, line_cost)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(intervention_id)
        .bind(usage.part_id)
        .bind(usage.quantity)
        .bind(line_cost)
        .execute(&mut **tx)
        .await?;

        parts_cost += line_cost;
    }

    Ok(parts_cost)
}

/// Give back the stock held by the intervention's current usage lines and
/// delete them. A line whose part has been deleted from the inventory fails
/// the whole operation rather than being skipped.
async fn compensate_usages(
    tx: &mut Transaction<'_, Sqlite>,
    intervention_id: i64,
) -> AppResult<()> {
    let lines: Vec<(i64, i64)> = sqlx::query_as(
        "SELECT part_id, quantity_used FROM part_usages WHERE intervention_id = ?",
    )
    .bind(intervention_id)
    .fetch_all(&mut **tx)
    .await?;

    for (part_id, quantity) in lines {
        adjust_stock(tx, part_id, quantity).await?;
    }

    sqlx::query("DELETE FROM part_usages WHERE intervention_id = ?")
        .bind(intervention_id)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

impl Repository {
    /// List all interventions, newest first
    pub async fn interventions_list(&self) -> AppResult<Vec<Intervention>> {
        let rows = sqlx::query_as::<_, Intervention>(
            "SELECT * FROM interventions ORDER BY entry_date DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Get intervention by ID
    pub async fn interventions_get_by_id(&self, id: i64) -> AppResult<Intervention> {
        sqlx::query_as::<_, Intervention>("SELECT * FROM interventions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Intervention {} not found", id)))
    }

    /// Intervention with equipment identification and usage lines. Lines
    /// whose part has been deleted stay visible with a placeholder name.
    pub async fn interventions_get_details(&self, id: i64) -> AppResult<InterventionDetails> {
        let intervention = self.interventions_get_by_id(id).await?;

        let serial_number: String =
            sqlx::query_scalar("SELECT serial_number FROM equipment WHERE id = ?")
                .bind(intervention.equipment_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| {
                    AppError::Referential(format!(
                        "Equipment {} no longer exists",
                        intervention.equipment_id
                    ))
                })?;

        let part_usages = sqlx::query_as::<_, PartUsageDetails>(
            r#"
            SELECT pu.id, pu.part_id,
                   COALESCE(p.name, '(deleted part)') AS part_name,
                   COALESCE(p.reference, '') AS part_reference,
                   pu.quantity_used, pu.line_cost
            FROM part_usages pu
            LEFT JOIN parts p ON pu.part_id = p.id
            WHERE pu.intervention_id = ?
            ORDER BY pu.id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(InterventionDetails {
            id: intervention.id,
            equipment_id: intervention.equipment_id,
            serial_number,
            entry_date: intervention.entry_date,
            exit_date: intervention.exit_date,
            repair_details: intervention.repair_details,
            technician: intervention.technician,
            labor_cost: intervention.labor_cost,
            total_cost: intervention.total_cost,
            part_usages,
        })
    }

    /// Create an intervention together with its usage lines
    pub async fn interventions_create(
        &self,
        data: &CreateIntervention,
    ) -> AppResult<InterventionDetails> {
        let entry_date = parse_date(&data.entry_date, "entry_date")?;
        let exit_date = data
            .exit_date
            .as_deref()
            .map(|s| parse_date(s, "exit_date"))
            .transpose()?;
        let labor_cost = data.labor_cost.unwrap_or(0.0);

        let mut tx = self.pool.begin().await?;

        let equipment_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM equipment WHERE id = ?)")
                .bind(data.equipment_id)
                .fetch_one(&mut *tx)
                .await?;
        if !equipment_exists {
            return Err(AppError::Referential(format!(
                "Equipment {} does not exist",
                data.equipment_id
            )));
        }

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO interventions
                (equipment_id, entry_date, exit_date, repair_details, technician, labor_cost, total_cost)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(data.equipment_id)
        .bind(entry_date)
        .bind(exit_date)
        .bind(&data.repair_details)
        .bind(&data.technician)
        .bind(labor_cost)
        .bind(labor_cost)
        .fetch_one(&mut *tx)
        .await?;

        let parts_cost = apply_usages(&mut tx, id, &data.part_usages).await?;

        sqlx::query("UPDATE interventions SET total_cost = ? WHERE id = ?")
            .bind(labor_cost + parts_cost)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.interventions_get_details(id).await
    }

    /// Edit an intervention, replacing its usage set wholesale.
    ///
    /// Compensate-then-apply: the original lines give their stock back and
    /// are deleted, then the new lines are validated against the restored
    /// levels and applied. Both halves live in the same transaction, so a
    /// failure during apply also undoes the compensation.
    pub async fn interventions_update(
        &self,
        id: i64,
        data: &UpdateIntervention,
    ) -> AppResult<InterventionDetails> {
        let entry_date = parse_date(&data.entry_date, "entry_date")?;
        let exit_date = data
            .exit_date
            .as_deref()
            .map(|s| parse_date(s, "exit_date"))
            .transpose()?;
        let labor_cost = data.labor_cost.unwrap_or(0.0);

        let mut tx = self.pool.begin().await?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM interventions WHERE id = ?)")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        if !exists {
            return Err(AppError::NotFound(format!("Intervention {} not found", id)));
        }

        compensate_usages(&mut tx, id).await?;
        let parts_cost = apply_usages(&mut tx, id, &data.part_usages).await?;

        sqlx::query(
            r#"
            UPDATE interventions
            SET entry_date = ?, exit_date = ?, repair_details = ?, technician = ?,
                labor_cost = ?, total_cost = ?
            WHERE id = ?
            "#,
        )
        .bind(entry_date)
        .bind(exit_date)
        .bind(&data.repair_details)
        .bind(&data.technician)
        .bind(labor_cost)
        .bind(labor_cost + parts_cost)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.interventions_get_details(id).await
    }

    /// Delete an intervention, restoring the stock its lines were holding
    pub async fn interventions_delete(&self, id: i64) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM interventions WHERE id = ?)")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        if !exists {
            return Err(AppError::NotFound(format!("Intervention {} not found", id)));
        }

        compensate_usages(&mut tx, id).await?;

        sqlx::query("DELETE FROM interventions WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
