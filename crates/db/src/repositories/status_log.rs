//! Status log repository.
//!
//! The log is append-only; entries are written by
//! [`ComplaintRepository`](super::ComplaintRepository) inside lifecycle
//! transactions. This repository only reads.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use farol_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};

use crate::entities::{StatusLog, complaint::ComplaintStatus, status_log};

/// Status log repository for database operations.
#[derive(Clone)]
pub struct StatusLogRepository {
    db: Arc<DatabaseConnection>,
}

impl StatusLogRepository {
    /// Create a new status log repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Entries of one complaint in chronological order.
    pub async fn find_by_complaint(&self, complaint_id: &str) -> AppResult<Vec<status_log::Model>> {
        StatusLog::find()
            .filter(status_log::Column::ComplaintId.eq(complaint_id))
            .order_by_asc(status_log::Column::CreatedAt)
            .order_by_asc(status_log::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Full history of several complaints, grouped by complaint and in
    /// chronological order within each group.
    pub async fn find_by_complaints(&self, ids: &[String]) -> AppResult<Vec<status_log::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        StatusLog::find()
            .filter(status_log::Column::ComplaintId.is_in(ids.to_vec()))
            .order_by_asc(status_log::Column::ComplaintId)
            .order_by_asc(status_log::Column::CreatedAt)
            .order_by_asc(status_log::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Entries in `[start, end)` whose new status is one of `statuses`.
    pub async fn find_transitions_between(
        &self,
        statuses: &[ComplaintStatus],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<status_log::Model>> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }
        StatusLog::find()
            .filter(status_log::Column::NewStatus.is_in(statuses.iter().map(|s| s.as_str())))
            .filter(status_log::Column::CreatedAt.gte(start))
            .filter(status_log::Column::CreatedAt.lt(end))
            .order_by_asc(status_log::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Ids of every complaint that ever entered one of `statuses`.
    pub async fn find_complaint_ids_reaching(
        &self,
        statuses: &[ComplaintStatus],
    ) -> AppResult<Vec<String>> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }
        StatusLog::find()
            .select_only()
            .column(status_log::Column::ComplaintId)
            .distinct()
            .filter(status_log::Column::NewStatus.is_in(statuses.iter().map(|s| s.as_str())))
            .order_by_asc(status_log::Column::ComplaintId)
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
