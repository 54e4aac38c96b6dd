//! Staff repository.

use std::sync::Arc;

use crate::entities::{Staff, staff};
use farol_common::{AppError, AppResult};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait};

/// Staff repository for database operations.
#[derive(Clone)]
pub struct StaffRepository {
    db: Arc<DatabaseConnection>,
}

impl StaffRepository {
    /// Create a new staff repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a staff member by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<staff::Model>> {
        Staff::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new staff member.
    pub async fn create(&self, model: staff::ActiveModel) -> AppResult<staff::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
