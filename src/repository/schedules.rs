//! Preventive-maintenance schedule methods on Repository

use chrono::NaiveDate;

use super::{parse_date, Repository};
use crate::{
    error::{AppError, AppResult},
    models::schedule::{
        CreateScheduleEntry, MaintenanceStatus, ScheduleEntry, UpcomingMaintenance,
        UpdateScheduleEntry,
    },
};

impl Repository {
    /// List all schedule entries, soonest first
    pub async fn schedules_list(&self) -> AppResult<Vec<ScheduleEntry>> {
        let rows = sqlx::query_as::<_, ScheduleEntry>(
            "SELECT * FROM schedule_entries ORDER BY due_date, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Get a schedule entry by ID
    pub async fn schedules_get_by_id(&self, id: i64) -> AppResult<ScheduleEntry> {
        sqlx::query_as::<_, ScheduleEntry>("SELECT * FROM schedule_entries WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Schedule entry {} not found", id)))
    }

    /// Create a schedule entry; new entries start as `scheduled`
    pub async fn schedules_create(&self, data: &CreateScheduleEntry) -> AppResult<ScheduleEntry> {
        let due_date = parse_date(&data.due_date, "due_date")?;

        if data.maintenance_type.trim().is_empty() {
            return Err(AppError::Validation(
                "Maintenance type is required".to_string(),
            ));
        }

        let equipment_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM equipment WHERE id = ?)")
                .bind(data.equipment_id)
                .fetch_one(&self.pool)
                .await?;
        if !equipment_exists {
            return Err(AppError::Referential(format!(
                "Equipment {} does not exist",
                data.equipment_id
            )));
        }

        let row = sqlx::query_as::<_, ScheduleEntry>(
            r#"
            INSERT INTO schedule_entries (equipment_id, due_date, maintenance_type, technician, status, notes)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(data.equipment_id)
        .bind(due_date)
        .bind(&data.maintenance_type)
        .bind(&data.technician)
        .bind(MaintenanceStatus::Scheduled)
        .bind(&data.notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update a schedule entry
    pub async fn schedules_update(
        &self,
        id: i64,
        data: &UpdateScheduleEntry,
    ) -> AppResult<ScheduleEntry> {
        let due_date = data
            .due_date
            .as_deref()
            .map(|s| parse_date(s, "due_date"))
            .transpose()?;

        let mut sets = Vec::new();

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(concat!($name, " = ?"));
                }
            };
        }

        add_field!(due_date, "due_date");
        add_field!(data.maintenance_type, "maintenance_type");
        add_field!(data.technician, "technician");
        add_field!(data.status, "status");
        add_field!(data.notes, "notes");

        if sets.is_empty() {
            return self.schedules_get_by_id(id).await;
        }

        let query = format!(
            "UPDATE schedule_entries SET {} WHERE id = {} RETURNING *",
            sets.join(", "),
            id
        );

        let mut builder = sqlx::query_as::<_, ScheduleEntry>(&query);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(due_date);
        bind_field!(data.maintenance_type);
        bind_field!(data.technician);
        bind_field!(data.status);
        bind_field!(data.notes);

        builder
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Schedule entry {} not found", id)))
    }

    /// Delete a schedule entry
    pub async fn schedules_delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM schedule_entries WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Schedule entry {} not found", id)));
        }
        Ok(())
    }

    /// Non-completed entries due inside the window, joined with their
    /// equipment; feeds both the manual listing and the reminder scan
    pub async fn schedules_list_upcoming(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<UpcomingMaintenance>> {
        let rows = sqlx::query_as::<_, UpcomingMaintenance>(
            r#"
            SELECT s.id, s.equipment_id, e.serial_number, e.brand, e.model,
                   s.due_date, s.maintenance_type, s.technician, s.status
            FROM schedule_entries s
            JOIN equipment e ON s.equipment_id = e.id
            WHERE s.due_date >= ? AND s.due_date <= ? AND s.status != ?
            ORDER BY s.due_date, s.id
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(MaintenanceStatus::Completed)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
