//! Preventive-maintenance schedule service

use chrono::{Duration, NaiveDate, Utc};

use crate::{
    error::AppResult,
    models::{
        schedule::{
            CreateScheduleEntry, ScheduleEntry, UpcomingMaintenance, UpdateScheduleEntry,
        },
        user::UserClaims,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct SchedulesService {
    repository: Repository,
}

impl SchedulesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List all schedule entries
    pub async fn list(&self) -> AppResult<Vec<ScheduleEntry>> {
        self.repository.schedules_list().await
    }

    /// Get a schedule entry by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<ScheduleEntry> {
        self.repository.schedules_get_by_id(id).await
    }

    /// Create a schedule entry
    pub async fn create(
        &self,
        claims: &UserClaims,
        data: CreateScheduleEntry,
    ) -> AppResult<ScheduleEntry> {
        claims.require_add_interventions()?;
        self.repository.schedules_create(&data).await
    }

    /// Update a schedule entry
    pub async fn update(
        &self,
        claims: &UserClaims,
        id: i64,
        data: UpdateScheduleEntry,
    ) -> AppResult<ScheduleEntry> {
        claims.require_edit_interventions()?;
        self.repository.schedules_update(id, &data).await
    }

    /// Delete a schedule entry
    pub async fn delete(&self, claims: &UserClaims, id: i64) -> AppResult<()> {
        claims.require_delete_interventions()?;
        self.repository.schedules_delete(id).await
    }

    /// Non-completed entries due within the next `days` days
    pub async fn list_upcoming(&self, days: i64) -> AppResult<Vec<UpcomingMaintenance>> {
        let today = Utc::now().date_naive();
        self.list_upcoming_from(today, days).await
    }

    /// Same window query with an explicit start date
    pub async fn list_upcoming_from(
        &self,
        from: NaiveDate,
        days: i64,
    ) -> AppResult<Vec<UpcomingMaintenance>> {
        let to = from + Duration::days(days);
        self.repository.schedules_list_upcoming(from, to).await
    }
}
