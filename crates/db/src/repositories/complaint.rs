//! Complaint repository.
//!
//! Besides lookups, this repository owns the transactional write units of the
//! complaint lifecycle: every status change commits together with its log
//! entry, notification and side records, or not at all.

use std::sync::Arc;

use chrono::Utc;
use farol_common::{AppError, AppResult};
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;

use crate::entities::{
    Attachment, Complaint, ComplaintWitness, Response, StatusLog, Student, Witness, attachment,
    complaint, complaint::ComplaintStatus, complaint_witness, notification, response, status_log,
    student, witness,
};
use crate::repositories::NotificationRepository;

/// Filter for complaint listings.
#[derive(Debug, Clone, Default)]
pub struct ComplaintFilter {
    /// Only complaints in this status.
    pub status: Option<ComplaintStatus>,
    /// Only complaints in this category.
    pub category: Option<String>,
    /// Only complaints filed at this school.
    pub school_id: Option<String>,
    /// Only complaints owned by this student.
    pub student_id: Option<String>,
    /// Matches the complaint id exactly or the title partially.
    pub search: Option<String>,
}

/// A complaint together with all of its child records.
#[derive(Debug, Clone, Serialize)]
pub struct ComplaintDetails {
    pub complaint: complaint::Model,
    pub attachments: Vec<attachment::Model>,
    pub responses: Vec<response::Model>,
    pub witnesses: Vec<witness::Model>,
    pub status_log: Vec<status_log::Model>,
}

/// Penalty applied to the owning student when a complaint is marked false.
#[derive(Debug, Clone)]
pub struct PenaltyUpdate {
    pub student_id: String,
    /// Counter value read before the write; the update fails if it changed.
    pub expected_count: i32,
    pub new_count: i32,
    pub blocked: bool,
}

/// One atomic write against a complaint.
///
/// `None` fields are left untouched. The complaint row is always updated so
/// its version is bumped even when only child records change.
#[derive(Debug, Default)]
pub struct ComplaintWrite {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub is_anonymous: Option<bool>,
    pub student_id: Option<Option<String>>,
    pub status: Option<ComplaintStatus>,
    pub is_false: Option<bool>,
    /// Replaces every witness link of the complaint.
    pub witnesses: Option<Vec<witness::Model>>,
    pub status_log: Option<status_log::ActiveModel>,
    pub response: Option<response::ActiveModel>,
    pub penalty: Option<PenaltyUpdate>,
    pub notification: Option<notification::Model>,
}

/// Complaint repository for database operations.
#[derive(Clone)]
pub struct ComplaintRepository {
    db: Arc<DatabaseConnection>,
}

impl ComplaintRepository {
    /// Create a new complaint repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a complaint by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<complaint::Model>> {
        Complaint::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a complaint by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<complaint::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Complaint {id}")))
    }

    /// Insert a complaint with its witnesses and its first log entry.
    pub async fn create(
        &self,
        model: complaint::ActiveModel,
        witnesses: Vec<witness::Model>,
        first_log: status_log::ActiveModel,
    ) -> AppResult<complaint::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let created = model
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        link_witnesses(&txn, &created.id, witnesses).await?;

        first_log
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(created)
    }

    /// Apply a write to the complaint at `expected_version`.
    ///
    /// Returns [`AppError::Conflict`] when the complaint was changed or
    /// deleted since it was read, or when the penalty counter moved.
    pub async fn commit(
        &self,
        id: &str,
        expected_version: i32,
        write: ComplaintWrite,
    ) -> AppResult<complaint::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut update = Complaint::update_many()
            .col_expr(
                complaint::Column::Version,
                Expr::col(complaint::Column::Version).add(1),
            )
            .col_expr(complaint::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(complaint::Column::Id.eq(id))
            .filter(complaint::Column::Version.eq(expected_version));

        if let Some(title) = write.title {
            update = update.col_expr(complaint::Column::Title, Expr::value(title));
        }
        if let Some(description) = write.description {
            update = update.col_expr(complaint::Column::Description, Expr::value(description));
        }
        if let Some(category) = write.category {
            update = update.col_expr(complaint::Column::Category, Expr::value(category));
        }
        if let Some(is_anonymous) = write.is_anonymous {
            update = update.col_expr(complaint::Column::IsAnonymous, Expr::value(is_anonymous));
        }
        if let Some(student_id) = write.student_id {
            update = update.col_expr(complaint::Column::StudentId, Expr::value(student_id));
        }
        if let Some(status) = write.status {
            update = update.col_expr(complaint::Column::Status, Expr::value(status.as_str()));
        }
        if let Some(is_false) = write.is_false {
            update = update.col_expr(complaint::Column::IsFalse, Expr::value(is_false));
        }

        let result = update
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::Conflict(format!(
                "Complaint {id} was modified or removed concurrently"
            )));
        }

        if let Some(witnesses) = write.witnesses {
            ComplaintWitness::delete_many()
                .filter(complaint_witness::Column::ComplaintId.eq(id))
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            link_witnesses(&txn, id, witnesses).await?;
            delete_orphan_witnesses(&txn).await?;
        }

        if let Some(log) = write.status_log {
            log.insert(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        if let Some(response) = write.response {
            response
                .insert(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        if let Some(penalty) = write.penalty {
            let result = Student::update_many()
                .col_expr(
                    student::Column::FalseReportCount,
                    Expr::value(penalty.new_count),
                )
                .col_expr(student::Column::IsBlocked, Expr::value(penalty.blocked))
                .filter(student::Column::Id.eq(penalty.student_id.as_str()))
                .filter(student::Column::FalseReportCount.eq(penalty.expected_count))
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;

            if result.rows_affected == 0 {
                return Err(AppError::Conflict(format!(
                    "Student {} was modified or removed concurrently",
                    penalty.student_id
                )));
            }
        }

        let updated = Complaint::find_by_id(id)
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::Conflict(format!("Complaint {id} disappeared")))?;

        // The false-report notice is never folded into a later message
        if let Some(notification) = write.notification {
            if updated.is_false {
                NotificationRepository::insert_unread(&txn, notification).await?;
            } else {
                NotificationRepository::upsert_unread(&txn, notification).await?;
            }
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(updated)
    }

    /// Delete a complaint. Child rows cascade; witnesses left without any
    /// complaint are removed as well.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let result = Complaint::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Complaint {id}")));
        }

        delete_orphan_witnesses(&txn).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Load a complaint with its attachments, responses, witnesses and status log.
    pub async fn find_details(&self, id: &str) -> AppResult<Option<ComplaintDetails>> {
        let Some(complaint) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let attachments = Attachment::find()
            .filter(attachment::Column::ComplaintId.eq(id))
            .order_by_asc(attachment::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let responses = Response::find()
            .filter(response::Column::ComplaintId.eq(id))
            .order_by_asc(response::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let witness_ids: Vec<String> = ComplaintWitness::find()
            .filter(complaint_witness::Column::ComplaintId.eq(id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .into_iter()
            .map(|link| link.witness_id)
            .collect();

        let witnesses = if witness_ids.is_empty() {
            Vec::new()
        } else {
            Witness::find()
                .filter(witness::Column::Id.is_in(witness_ids))
                .order_by_asc(witness::Column::Name)
                .all(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?
        };

        let status_log = StatusLog::find()
            .filter(status_log::Column::ComplaintId.eq(id))
            .order_by_asc(status_log::Column::CreatedAt)
            .order_by_asc(status_log::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(Some(ComplaintDetails {
            complaint,
            attachments,
            responses,
            witnesses,
            status_log,
        }))
    }

    /// List complaints matching a filter, newest first.
    pub async fn list(
        &self,
        filter: &ComplaintFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<complaint::Model>> {
        let mut condition = Condition::all();

        if let Some(status) = filter.status {
            condition = condition.add(complaint::Column::Status.eq(status.as_str()));
        }
        if let Some(category) = &filter.category {
            condition = condition.add(complaint::Column::Category.eq(category.as_str()));
        }
        if let Some(school_id) = &filter.school_id {
            condition = condition.add(complaint::Column::SchoolId.eq(school_id.as_str()));
        }
        if let Some(student_id) = &filter.student_id {
            condition = condition.add(complaint::Column::StudentId.eq(student_id.as_str()));
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            condition = condition.add(
                Condition::any()
                    .add(complaint::Column::Id.eq(search))
                    .add(complaint::Column::Title.contains(search)),
            );
        }

        Complaint::find()
            .filter(condition)
            .order_by_desc(complaint::Column::CreatedAt)
            .order_by_desc(complaint::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Complaints owned by a student, newest first.
    pub async fn find_by_student(&self, student_id: &str) -> AppResult<Vec<complaint::Model>> {
        Complaint::find()
            .filter(complaint::Column::StudentId.eq(student_id))
            .order_by_desc(complaint::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Distinct categories in alphabetical order.
    pub async fn find_categories(&self) -> AppResult<Vec<String>> {
        Complaint::find()
            .select_only()
            .column(complaint::Column::Category)
            .distinct()
            .order_by_asc(complaint::Column::Category)
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Complaints created in `[start, end)`.
    pub async fn find_created_between(
        &self,
        start: chrono::DateTime<Utc>,
        end: chrono::DateTime<Utc>,
    ) -> AppResult<Vec<complaint::Model>> {
        Complaint::find()
            .filter(complaint::Column::CreatedAt.gte(start))
            .filter(complaint::Column::CreatedAt.lt(end))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find complaints by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<complaint::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Complaint::find()
            .filter(complaint::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Total number of complaints.
    pub async fn count_all(&self) -> AppResult<u64> {
        Complaint::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Number of complaints created in `[start, end)`.
    pub async fn count_created_between(
        &self,
        start: chrono::DateTime<Utc>,
        end: chrono::DateTime<Utc>,
    ) -> AppResult<u64> {
        Complaint::find()
            .filter(complaint::Column::CreatedAt.gte(start))
            .filter(complaint::Column::CreatedAt.lt(end))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Number of complaints per current status.
    pub async fn count_by_status(&self) -> AppResult<Vec<(ComplaintStatus, u64)>> {
        let rows = Complaint::find()
            .select_only()
            .column(complaint::Column::Status)
            .column_as(complaint::Column::Id.count(), "count")
            .group_by(complaint::Column::Status)
            .into_tuple::<(String, i64)>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .filter_map(|(status, count)| {
                status
                    .parse::<ComplaintStatus>()
                    .ok()
                    .map(|status| (status, count.max(0) as u64))
            })
            .collect())
    }
}

async fn link_witnesses<C: ConnectionTrait>(
    conn: &C,
    complaint_id: &str,
    witnesses: Vec<witness::Model>,
) -> AppResult<()> {
    for witness in witnesses {
        let witness_id = witness.id.clone();
        Witness::insert(witness::ActiveModel {
            id: Set(witness.id),
            name: Set(witness.name),
            phone: Set(witness.phone),
        })
        .exec_without_returning(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        ComplaintWitness::insert(complaint_witness::ActiveModel {
            complaint_id: Set(complaint_id.to_string()),
            witness_id: Set(witness_id),
        })
        .exec_without_returning(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    }
    Ok(())
}

async fn delete_orphan_witnesses<C: ConnectionTrait>(conn: &C) -> AppResult<u64> {
    let result = Witness::delete_many()
        .filter(
            witness::Column::Id.not_in_subquery(
                Query::select()
                    .column(complaint_witness::Column::WitnessId)
                    .from(ComplaintWitness)
                    .to_owned(),
            ),
        )
        .exec(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    if result.rows_affected > 0 {
        tracing::debug!(count = result.rows_affected, "Removed orphan witnesses");
    }
    Ok(result.rows_affected)
}
