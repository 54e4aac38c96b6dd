//! Notification service.
//!
//! Lifecycle writes build their notification with the helpers here and hand
//! it to the complaint repository, so it commits with the transition. The
//! service itself only serves the student-facing reads and updates.

use chrono::Utc;
use farol_common::{AppError, AppResult, IdGenerator};
use farol_db::{entities::notification, repositories::NotificationRepository};

use crate::services::penalty::PenaltyOutcome;
use crate::services::principal::Principal;

/// Longest stored message, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 500;

/// Default page size for notification listings.
pub const DEFAULT_LIMIT: u64 = 50;

/// Deep link to a complaint.
#[must_use]
pub fn complaint_url(complaint_id: &str) -> String {
    format!("/complaints/{complaint_id}")
}

/// Message for a status change made by staff.
#[must_use]
pub fn status_changed_message(complaint_id: &str, label: &str) -> String {
    format!("Your complaint #{complaint_id} status was updated to: {label}.")
}

/// Message for a staff response.
#[must_use]
pub fn response_message(complaint_id: &str, label: &str) -> String {
    format!("Your complaint #{complaint_id} received a response. Status: {label}.")
}

/// Message for a complaint marked as a false report.
///
/// Once the student is blocked the message says so instead of counting down.
#[must_use]
pub fn false_report_message(complaint_id: &str, outcome: &PenaltyOutcome, threshold: i32) -> String {
    if outcome.blocked {
        format!(
            "Your complaint #{complaint_id} was marked as a false report. \
             You have reached {threshold} false reports and can no longer file complaints."
        )
    } else {
        let remaining = outcome.remaining(threshold);
        format!(
            "Your complaint #{complaint_id} was marked as a false report. \
             {remaining} more false report(s) will block you from filing complaints."
        )
    }
}

/// Notification service for business logic.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    id_gen: IdGenerator,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(notification_repo: NotificationRepository) -> Self {
        Self {
            notification_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Build an unread notification for a student about a complaint.
    #[must_use]
    pub fn build(&self, student_id: &str, complaint_id: &str, message: &str) -> notification::Model {
        notification::Model {
            id: self.id_gen.generate(),
            student_id: student_id.to_string(),
            complaint_id: complaint_id.to_string(),
            message: truncate_message(message),
            url: complaint_url(complaint_id),
            is_read: false,
            created_at: Utc::now().into(),
        }
    }

    /// Number of unread notifications of a student.
    pub async fn unread_count(&self, principal: &Principal) -> AppResult<u64> {
        self.notification_repo.count_unread(&principal.id).await
    }

    /// Notifications of a student, newest first.
    pub async fn list(
        &self,
        principal: &Principal,
        limit: Option<u64>,
        unread_only: bool,
    ) -> AppResult<Vec<notification::Model>> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, 100);
        self.notification_repo
            .find_by_student(&principal.id, limit, unread_only)
            .await
    }

    /// Mark one notification read.
    pub async fn mark_read(&self, principal: &Principal, notification_id: &str) -> AppResult<()> {
        self.get_owned(principal, notification_id).await?;
        self.notification_repo.mark_as_read(notification_id).await
    }

    /// Mark every notification of the student read.
    pub async fn mark_all_read(&self, principal: &Principal) -> AppResult<u64> {
        self.notification_repo.mark_all_as_read(&principal.id).await
    }

    /// Mark the notifications about one complaint read.
    pub async fn mark_read_for_complaint(
        &self,
        student_id: &str,
        complaint_id: &str,
    ) -> AppResult<u64> {
        self.notification_repo
            .mark_read_for_complaint(student_id, complaint_id)
            .await
    }

    /// Delete one notification.
    pub async fn delete(&self, principal: &Principal, notification_id: &str) -> AppResult<()> {
        self.get_owned(principal, notification_id).await?;
        self.notification_repo.delete(notification_id).await
    }

    /// Delete every notification of the student.
    pub async fn delete_all(&self, principal: &Principal) -> AppResult<u64> {
        let deleted = self
            .notification_repo
            .delete_all_for_student(&principal.id)
            .await?;
        tracing::debug!(student_id = %principal.id, deleted, "Cleared notifications");
        Ok(deleted)
    }

    async fn get_owned(
        &self,
        principal: &Principal,
        notification_id: &str,
    ) -> AppResult<notification::Model> {
        let notification = self
            .notification_repo
            .find_by_id(notification_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Notification {notification_id}")))?;

        if notification.student_id != principal.id {
            return Err(AppError::Forbidden(
                "Notification belongs to another student".to_string(),
            ));
        }
        Ok(notification)
    }
}

fn truncate_message(message: &str) -> String {
    message.chars().take(MAX_MESSAGE_LENGTH).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::penalty::apply_penalty;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn sample(id: &str, student_id: &str) -> notification::Model {
        notification::Model {
            id: id.to_string(),
            student_id: student_id.to_string(),
            complaint_id: "c1".to_string(),
            message: "hello".to_string(),
            url: complaint_url("c1"),
            is_read: false,
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            status_changed_message("c1", "Resolved"),
            "Your complaint #c1 status was updated to: Resolved."
        );
        assert_eq!(
            response_message("c1", "Answered"),
            "Your complaint #c1 received a response. Status: Answered."
        );
        assert_eq!(complaint_url("c1"), "/complaints/c1");
    }

    #[test]
    fn test_false_report_message_variants() {
        let first = false_report_message("c1", &apply_penalty(0, false, 3), 3);
        let third = false_report_message("c3", &apply_penalty(2, false, 3), 3);

        assert!(first.contains("2 more false report(s)"));
        assert!(third.contains("can no longer file complaints"));
        assert_ne!(first.replace("c1", ""), third.replace("c3", ""));
    }

    #[test]
    fn test_build_truncates_message() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = NotificationService::new(NotificationRepository::new(db));

        let long = "x".repeat(MAX_MESSAGE_LENGTH + 20);
        let built = service.build("s1", "c1", &long);

        assert_eq!(built.message.chars().count(), MAX_MESSAGE_LENGTH);
        assert!(!built.is_read);
        assert_eq!(built.url, "/complaints/c1");
    }

    #[tokio::test]
    async fn test_mark_read_rejects_foreign_notification() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[sample("n1", "other")]])
                .into_connection(),
        );
        let service = NotificationService::new(NotificationRepository::new(db));

        let result = service.mark_read(&Principal::student("s1"), "n1").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_notification() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<notification::Model>::new()])
                .into_connection(),
        );
        let service = NotificationService::new(NotificationRepository::new(db));

        let result = service.delete(&Principal::student("s1"), "n1").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
