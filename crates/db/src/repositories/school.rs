//! School repository.

use std::sync::Arc;

use crate::entities::{School, school};
use farol_common::{AppError, AppResult};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait};

/// School repository for database operations.
#[derive(Clone)]
pub struct SchoolRepository {
    db: Arc<DatabaseConnection>,
}

impl SchoolRepository {
    /// Create a new school repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a school by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<school::Model>> {
        School::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new school.
    pub async fn create(&self, model: school::ActiveModel) -> AppResult<school::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
