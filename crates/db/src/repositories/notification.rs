//! Notification repository.

use std::sync::Arc;

use crate::entities::{Notification, notification};
use farol_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

/// Notification repository for database operations.
#[derive(Clone)]
pub struct NotificationRepository {
    db: Arc<DatabaseConnection>,
}

impl NotificationRepository {
    /// Create a new notification repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a notification by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<notification::Model>> {
        Notification::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new notification.
    pub async fn create(&self, model: notification::ActiveModel) -> AppResult<notification::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store a notification on `conn`, folding it into the student's unread
    /// notification for the same complaint when there is one.
    pub async fn upsert_unread<C: ConnectionTrait>(
        conn: &C,
        model: notification::Model,
    ) -> AppResult<notification::Model> {
        let existing = Notification::find()
            .filter(notification::Column::StudentId.eq(model.student_id.as_str()))
            .filter(notification::Column::ComplaintId.eq(model.complaint_id.as_str()))
            .filter(notification::Column::IsRead.eq(false))
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if let Some(existing) = existing {
            let mut active: notification::ActiveModel = existing.into();
            active.message = Set(model.message);
            active.url = Set(model.url);
            active.created_at = Set(model.created_at);
            return active
                .update(conn)
                .await
                .map_err(|e| AppError::Database(e.to_string()));
        }

        Self::insert_unread(conn, model).await
    }

    /// Store a notification on `conn` as a new unread row, leaving any
    /// earlier notification for the same complaint untouched.
    pub async fn insert_unread<C: ConnectionTrait>(
        conn: &C,
        model: notification::Model,
    ) -> AppResult<notification::Model> {
        notification::ActiveModel {
            id: Set(model.id),
            student_id: Set(model.student_id),
            complaint_id: Set(model.complaint_id),
            message: Set(model.message),
            url: Set(model.url),
            is_read: Set(false),
            created_at: Set(model.created_at),
        }
        .insert(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a notification.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let notification = self.find_by_id(id).await?;
        if let Some(n) = notification {
            n.delete(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }

    /// Get notifications for a student, most recent first.
    pub async fn find_by_student(
        &self,
        student_id: &str,
        limit: u64,
        unread_only: bool,
    ) -> AppResult<Vec<notification::Model>> {
        let mut query = Notification::find()
            .filter(notification::Column::StudentId.eq(student_id))
            .order_by_desc(notification::Column::CreatedAt)
            .order_by_desc(notification::Column::Id);

        if unread_only {
            query = query.filter(notification::Column::IsRead.eq(false));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Mark a notification as read.
    pub async fn mark_as_read(&self, id: &str) -> AppResult<()> {
        let notification = self.find_by_id(id).await?;
        if let Some(n) = notification {
            if n.is_read {
                return Ok(());
            }
            let mut active: notification::ActiveModel = n.into();
            active.is_read = Set(true);
            active
                .update(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }

    /// Mark all notifications as read for a student.
    pub async fn mark_all_as_read(&self, student_id: &str) -> AppResult<u64> {
        let result = Notification::update_many()
            .filter(notification::Column::StudentId.eq(student_id))
            .filter(notification::Column::IsRead.eq(false))
            .col_expr(notification::Column::IsRead, true.into())
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Mark a student's unread notifications about one complaint as read.
    pub async fn mark_read_for_complaint(
        &self,
        student_id: &str,
        complaint_id: &str,
    ) -> AppResult<u64> {
        let result = Notification::update_many()
            .filter(notification::Column::StudentId.eq(student_id))
            .filter(notification::Column::ComplaintId.eq(complaint_id))
            .filter(notification::Column::IsRead.eq(false))
            .col_expr(notification::Column::IsRead, true.into())
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Count unread notifications for a student.
    pub async fn count_unread(&self, student_id: &str) -> AppResult<u64> {
        Notification::find()
            .filter(notification::Column::StudentId.eq(student_id))
            .filter(notification::Column::IsRead.eq(false))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete all notifications for a student.
    pub async fn delete_all_for_student(&self, student_id: &str) -> AppResult<u64> {
        let result = Notification::delete_many()
            .filter(notification::Column::StudentId.eq(student_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}
