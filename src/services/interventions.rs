//! Intervention ledger service
//!
//! The permission gate runs here, before any transaction is opened; the
//! atomic ledger work itself lives in the repository.

use crate::{
    error::AppResult,
    models::{
        intervention::{
            CreateIntervention, Intervention, InterventionDetails, UpdateIntervention,
        },
        user::UserClaims,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct InterventionsService {
    repository: Repository,
}

impl InterventionsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List all interventions
    pub async fn list(&self) -> AppResult<Vec<Intervention>> {
        self.repository.interventions_list().await
    }

    /// Intervention with equipment identification and usage lines
    pub async fn get_details(&self, id: i64) -> AppResult<InterventionDetails> {
        self.repository.interventions_get_details(id).await
    }

    /// Record a new intervention and debit its part usages from stock
    pub async fn create(
        &self,
        claims: &UserClaims,
        data: CreateIntervention,
    ) -> AppResult<InterventionDetails> {
        claims.require_add_interventions()?;
        self.repository.interventions_create(&data).await
    }

    /// Edit an intervention, compensate-then-apply on its usage lines
    pub async fn update(
        &self,
        claims: &UserClaims,
        id: i64,
        data: UpdateIntervention,
    ) -> AppResult<InterventionDetails> {
        claims.require_edit_interventions()?;
        self.repository.interventions_update(id, &data).await
    }

    /// Delete an intervention, restoring the stock it was holding
    pub async fn delete(&self, claims: &UserClaims, id: i64) -> AppResult<()> {
        claims.require_delete_interventions()?;
        self.repository.interventions_delete(id).await
    }
}
