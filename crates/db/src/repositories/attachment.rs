//! Attachment repository.

use std::sync::Arc;

use crate::entities::{Attachment, attachment};
use farol_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Attachment repository for database operations.
#[derive(Clone)]
pub struct AttachmentRepository {
    db: Arc<DatabaseConnection>,
}

impl AttachmentRepository {
    /// Create a new attachment repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an attachment by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<attachment::Model>> {
        Attachment::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get an attachment by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<attachment::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Attachment {id}")))
    }

    /// Create a new attachment row.
    pub async fn create(&self, model: attachment::ActiveModel) -> AppResult<attachment::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete an attachment row.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Attachment::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Attachments of a complaint, oldest first.
    pub async fn find_by_complaint(&self, complaint_id: &str) -> AppResult<Vec<attachment::Model>> {
        Attachment::find()
            .filter(attachment::Column::ComplaintId.eq(complaint_id))
            .order_by_asc(attachment::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
