//! Equipment catalog service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        equipment::{CreateEquipment, Equipment, UpdateEquipment},
        intervention::Intervention,
        user::UserClaims,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct EquipmentService {
    repository: Repository,
}

impl EquipmentService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List all equipment
    pub async fn list(&self) -> AppResult<Vec<Equipment>> {
        self.repository.equipment_list().await
    }

    /// Get equipment by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Equipment> {
        self.repository.equipment_get_by_id(id).await
    }

    /// Look up equipment by serial number; the 404 on a miss is what sends
    /// the front end to its creation form
    pub async fn get_by_serial(&self, serial_number: &str) -> AppResult<Equipment> {
        self.repository.equipment_get_by_serial(serial_number).await
    }

    /// Create equipment
    pub async fn create(&self, claims: &UserClaims, data: CreateEquipment) -> AppResult<Equipment> {
        claims.require_add_interventions()?;
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.equipment_create(&data).await
    }

    /// Update equipment
    pub async fn update(
        &self,
        claims: &UserClaims,
        id: i64,
        data: UpdateEquipment,
    ) -> AppResult<Equipment> {
        claims.require_edit_interventions()?;
        self.repository.equipment_update(id, &data).await
    }

    /// Repair history for one equipment
    pub async fn list_interventions(&self, equipment_id: i64) -> AppResult<Vec<Intervention>> {
        // Surface a 404 rather than an empty history for unknown equipment
        self.repository.equipment_get_by_id(equipment_id).await?;
        self.repository
            .equipment_list_interventions(equipment_id)
            .await
    }
}
