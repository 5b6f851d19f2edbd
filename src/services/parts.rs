//! Parts inventory service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        part::{CreatePart, Part, UpdatePart},
        user::UserClaims,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct PartsService {
    repository: Repository,
    default_low_stock_threshold: i64,
}

impl PartsService {
    pub fn new(repository: Repository, default_low_stock_threshold: i64) -> Self {
        Self {
            repository,
            default_low_stock_threshold,
        }
    }

    /// List all parts
    pub async fn list(&self) -> AppResult<Vec<Part>> {
        self.repository.parts_list().await
    }

    /// Get part by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Part> {
        self.repository.parts_get_by_id(id).await
    }

    /// Create a part
    pub async fn create(&self, claims: &UserClaims, data: CreatePart) -> AppResult<Part> {
        claims.require_add_stock()?;
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.parts_create(&data).await
    }

    /// Update a part
    pub async fn update(&self, claims: &UserClaims, id: i64, data: UpdatePart) -> AppResult<Part> {
        claims.require_edit_stock()?;
        self.repository.parts_update(id, &data).await
    }

    /// Delete a part
    pub async fn delete(&self, claims: &UserClaims, id: i64) -> AppResult<()> {
        claims.require_delete_stock()?;
        self.repository.parts_delete(id).await
    }

    /// Direct stock adjustment (restock or correction)
    pub async fn adjust_stock(&self, claims: &UserClaims, id: i64, delta: i64) -> AppResult<Part> {
        claims.require_edit_stock()?;
        self.repository.parts_adjust_stock(id, delta).await
    }

    /// Parts at or below the threshold (configured default if none given)
    pub async fn list_low_stock(&self, threshold: Option<i64>) -> AppResult<Vec<Part>> {
        let threshold = threshold.unwrap_or(self.default_low_stock_threshold);
        self.repository.parts_list_low_stock(threshold).await
    }
}
