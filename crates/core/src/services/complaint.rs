//! Complaint lifecycle service.
//!
//! Every transition is committed through [`ComplaintRepository::commit`]
//! together with its status log entry and the owner's notification, guarded
//! by the complaint's version. Attachments go to the file store after the
//! database write and are reported per file.

use std::sync::Arc;

use chrono::Utc;
use farol_common::{
    AppError, AppResult, IdGenerator, StorageBackend, generate_storage_key,
};
use farol_db::{
    entities::{
        attachment, complaint, complaint::ComplaintStatus, response, staff, status_log, student,
        witness,
    },
    repositories::{
        AttachmentRepository, ComplaintDetails, ComplaintFilter, ComplaintRepository,
        ComplaintWrite, PenaltyUpdate, SchoolRepository, StaffRepository, StudentRepository,
    },
};
use sea_orm::Set;
use serde::Serialize;
use validator::Validate;

use crate::services::notification::{
    NotificationService, false_report_message, response_message, status_changed_message,
};
use crate::services::penalty::{apply_penalty, ensure_not_blocked};
use crate::services::principal::{Principal, Role};
use crate::services::status_policy::StatusPolicy;

/// Default page size for staff listings.
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// A file sent along with a complaint.
#[derive(Debug, Clone)]
pub struct NewAttachment {
    /// Name as uploaded.
    pub file_name: String,
    /// MIME type reported by the client.
    pub content_type: String,
    /// Raw file contents.
    pub data: Vec<u8>,
}

/// A witness named by the author.
#[derive(Debug, Clone)]
pub struct WitnessInput {
    /// Entries with a blank name are dropped.
    pub name: String,
    /// Optional contact number.
    pub phone: Option<String>,
}

/// Input for filing a complaint.
#[derive(Debug, Clone, Validate)]
pub struct CreateComplaintInput {
    /// School the complaint is filed against.
    pub school_id: String,
    /// Short summary.
    #[validate(length(max = 200))]
    pub title: String,
    /// Full account of the incident.
    #[validate(length(max = 10000))]
    pub description: String,
    /// Free-form category.
    #[validate(length(max = 100))]
    pub category: String,
    /// Hide the author from staff.
    pub is_anonymous: bool,
    /// Witnesses, possibly none.
    pub witnesses: Vec<WitnessInput>,
    /// Files to store with the complaint.
    pub attachments: Vec<NewAttachment>,
}

/// Changes to an open complaint. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Validate)]
pub struct EditComplaintInput {
    /// New title.
    #[validate(length(max = 200))]
    pub title: Option<String>,
    /// New description.
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    /// New category.
    #[validate(length(max = 100))]
    pub category: Option<String>,
    /// New anonymity flag.
    pub is_anonymous: Option<bool>,
    /// Replaces every witness when present.
    pub witnesses: Option<Vec<WitnessInput>>,
    /// Appended to the existing attachments.
    pub attachments: Vec<NewAttachment>,
    /// Staff only: reassign or clear the owner.
    pub student_id: Option<Option<String>>,
    /// Staff only: set the status directly.
    pub status: Option<ComplaintStatus>,
}

/// A file that could not be stored.
#[derive(Debug, Clone, Serialize)]
pub struct UploadFailure {
    /// Name as uploaded.
    pub file_name: String,
    /// Why the file was refused or could not be written.
    pub reason: String,
}

/// Result of a create or edit: the complaint plus the per-file upload report.
#[derive(Debug, Clone, Serialize)]
pub struct ComplaintOutcome {
    /// The complaint as committed.
    pub complaint: complaint::Model,
    /// Attachments stored by this call.
    pub attachments: Vec<attachment::Model>,
    /// Files that were skipped.
    pub failed_uploads: Vec<UploadFailure>,
}

impl ComplaintOutcome {
    /// Whether some attachments were not stored.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.failed_uploads.is_empty()
    }
}

/// An attachment read back from the file store.
#[derive(Debug, Clone)]
pub struct AttachmentDownload {
    /// Stored metadata.
    pub attachment: attachment::Model,
    /// File contents.
    pub data: Vec<u8>,
}

/// Complaint lifecycle service.
#[derive(Clone)]
pub struct ComplaintService {
    complaint_repo: ComplaintRepository,
    attachment_repo: AttachmentRepository,
    student_repo: StudentRepository,
    staff_repo: StaffRepository,
    school_repo: SchoolRepository,
    notification_service: NotificationService,
    storage: Arc<dyn StorageBackend>,
    policy: Arc<StatusPolicy>,
    id_gen: IdGenerator,
    max_file_size: usize,
}

impl ComplaintService {
    /// Create a new complaint service.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        complaint_repo: ComplaintRepository,
        attachment_repo: AttachmentRepository,
        student_repo: StudentRepository,
        staff_repo: StaffRepository,
        school_repo: SchoolRepository,
        notification_service: NotificationService,
        storage: Arc<dyn StorageBackend>,
        policy: Arc<StatusPolicy>,
    ) -> Self {
        Self {
            complaint_repo,
            attachment_repo,
            student_repo,
            staff_repo,
            school_repo,
            notification_service,
            storage,
            policy,
            id_gen: IdGenerator::new(),
            max_file_size: 10 * 1024 * 1024,
        }
    }

    /// Set the largest accepted attachment, in bytes.
    pub fn set_max_file_size(&mut self, max_file_size: usize) {
        self.max_file_size = max_file_size;
    }

    /// The status table in use.
    #[must_use]
    pub fn policy(&self) -> &StatusPolicy {
        &self.policy
    }

    // ========== Lifecycle ==========

    /// File a new complaint as the calling student.
    pub async fn create(
        &self,
        principal: &Principal,
        input: CreateComplaintInput,
    ) -> AppResult<ComplaintOutcome> {
        if principal.role != Role::Student {
            return Err(AppError::Forbidden(
                "Only students can file complaints".to_string(),
            ));
        }
        let author = self.author(principal).await?;
        ensure_not_blocked(&author)?;

        let title = required("title", &input.title)?;
        let description = required("description", &input.description)?;
        let category = required("category", &input.category)?;
        input.validate()?;

        if self.school_repo.find_by_id(&input.school_id).await?.is_none() {
            return Err(AppError::NotFound(format!("School {}", input.school_id)));
        }

        let id = self.id_gen.generate();
        let now = Utc::now();
        let model = complaint::ActiveModel {
            id: Set(id.clone()),
            title: Set(title),
            description: Set(description),
            category: Set(category),
            status: Set(ComplaintStatus::Open),
            is_anonymous: Set(input.is_anonymous),
            is_false: Set(false),
            student_id: Set(Some(author.id.clone())),
            school_id: Set(input.school_id),
            version: Set(0),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let witnesses = self.build_witnesses(input.witnesses);
        let first_log = self.log_entry(
            &id,
            None,
            ComplaintStatus::Open,
            principal.id.as_str(),
            Role::Student,
        );

        let complaint = self.complaint_repo.create(model, witnesses, first_log).await?;

        tracing::info!(
            complaint_id = %complaint.id,
            student_id = %author.id,
            anonymous = complaint.is_anonymous,
            "Complaint filed"
        );

        let (attachments, failed_uploads) =
            self.store_attachments(&complaint.id, input.attachments).await;

        Ok(ComplaintOutcome {
            complaint,
            attachments,
            failed_uploads,
        })
    }

    /// Edit a complaint that nobody has acted on yet.
    pub async fn edit(
        &self,
        id: &str,
        principal: &Principal,
        input: EditComplaintInput,
    ) -> AppResult<ComplaintOutcome> {
        let complaint = self.complaint_repo.get_by_id(id).await?;

        let actor_role = if principal.is_staff() {
            self.resolve_staff(principal).await?.role
        } else {
            if complaint.student_id.as_deref() != Some(principal.id.as_str()) {
                return Err(AppError::Forbidden(
                    "You can only edit your own complaints".to_string(),
                ));
            }
            ensure_not_blocked(&self.author(principal).await?)?;
            if input.student_id.is_some() || input.status.is_some() {
                return Err(AppError::Forbidden(
                    "Only staff can change the owner or status of a complaint".to_string(),
                ));
            }
            Role::Student
        };

        if complaint.is_false {
            return Err(AppError::InvalidState(
                "Complaint was marked as a false report and can no longer be edited".to_string(),
            ));
        }
        if !StatusPolicy::is_editable(complaint.status) {
            return Err(AppError::InvalidState(format!(
                "Complaint can no longer be edited (status: {})",
                self.policy.label(complaint.status)
            )));
        }

        input.validate()?;
        let mut write = ComplaintWrite {
            title: input.title.as_deref().map(|v| required("title", v)).transpose()?,
            description: input
                .description
                .as_deref()
                .map(|v| required("description", v))
                .transpose()?,
            category: input
                .category
                .as_deref()
                .map(|v| required("category", v))
                .transpose()?,
            is_anonymous: input.is_anonymous,
            witnesses: input.witnesses.map(|w| self.build_witnesses(w)),
            ..Default::default()
        };

        let mut owner = complaint.student_id.clone();
        if let Some(student_id) = input.student_id {
            if let Some(ref sid) = student_id {
                self.student_repo.get_by_id(sid).await?;
            }
            owner.clone_from(&student_id);
            write.student_id = Some(student_id);
        }

        if let Some(new_status) = input.status.filter(|s| *s != complaint.status) {
            if new_status == ComplaintStatus::RejectedFalse {
                return Err(AppError::InvalidState(
                    "Use mark-as-false to reject a complaint as false".to_string(),
                ));
            }
            write.status = Some(new_status);
            write.status_log = Some(self.log_entry(
                id,
                Some(complaint.status),
                new_status,
                &principal.id,
                actor_role,
            ));
            write.notification = owner.as_deref().map(|sid| {
                self.notification_service.build(
                    sid,
                    id,
                    &status_changed_message(id, self.policy.label(new_status)),
                )
            });
        }

        let updated = self
            .complaint_repo
            .commit(id, complaint.version, write)
            .await?;

        tracing::info!(complaint_id = %id, editor = %principal.id, "Complaint edited");

        let (attachments, failed_uploads) = self.store_attachments(id, input.attachments).await;

        Ok(ComplaintOutcome {
            complaint: updated,
            attachments,
            failed_uploads,
        })
    }

    /// Move a complaint to another status.
    pub async fn change_status(
        &self,
        id: &str,
        principal: &Principal,
        new_status: ComplaintStatus,
    ) -> AppResult<complaint::Model> {
        let actor = self.resolve_staff(principal).await?;
        let complaint = self.complaint_repo.get_by_id(id).await?;

        if complaint.status == new_status {
            tracing::debug!(complaint_id = %id, status = new_status.as_str(), "Status unchanged");
            return Ok(complaint);
        }
        if complaint.status == ComplaintStatus::RejectedFalse {
            return Err(AppError::InvalidState(
                "Complaint was rejected as false; its status is final".to_string(),
            ));
        }
        if new_status == ComplaintStatus::RejectedFalse {
            return Err(AppError::InvalidState(
                "Use mark-as-false to reject a complaint as false".to_string(),
            ));
        }

        let write = ComplaintWrite {
            status: Some(new_status),
            status_log: Some(self.log_entry(
                id,
                Some(complaint.status),
                new_status,
                &actor.id,
                actor.role,
            )),
            notification: complaint.student_id.as_deref().map(|sid| {
                self.notification_service.build(
                    sid,
                    id,
                    &status_changed_message(id, self.policy.label(new_status)),
                )
            }),
            ..Default::default()
        };

        let updated = self
            .complaint_repo
            .commit(id, complaint.version, write)
            .await?;

        tracing::info!(
            complaint_id = %id,
            from = complaint.status.as_str(),
            to = new_status.as_str(),
            actor = %actor.id,
            "Complaint status changed"
        );

        Ok(updated)
    }

    /// Post a staff response, moving an active complaint to `Answered`.
    pub async fn respond(
        &self,
        id: &str,
        principal: &Principal,
        text: &str,
    ) -> AppResult<complaint::Model> {
        let actor = self.resolve_staff(principal).await?;
        let body = required("response", text)?;
        let complaint = self.complaint_repo.get_by_id(id).await?;

        let next_status = if self.policy.is_active(complaint.status)
            && complaint.status != ComplaintStatus::Answered
        {
            ComplaintStatus::Answered
        } else {
            complaint.status
        };

        let mut write = ComplaintWrite {
            response: Some(response::ActiveModel {
                id: Set(self.id_gen.generate()),
                complaint_id: Set(id.to_string()),
                staff_id: Set(actor.id.clone()),
                body: Set(body),
                created_at: Set(Utc::now().into()),
            }),
            notification: complaint.student_id.as_deref().map(|sid| {
                self.notification_service.build(
                    sid,
                    id,
                    &response_message(id, self.policy.label(next_status)),
                )
            }),
            ..Default::default()
        };

        if next_status != complaint.status {
            write.status = Some(next_status);
            write.status_log = Some(self.log_entry(
                id,
                Some(complaint.status),
                next_status,
                &actor.id,
                actor.role,
            ));
        }

        let updated = self
            .complaint_repo
            .commit(id, complaint.version, write)
            .await?;

        tracing::info!(
            complaint_id = %id,
            actor = %actor.id,
            status = updated.status.as_str(),
            "Complaint answered"
        );

        Ok(updated)
    }

    /// Reject a complaint as a false report and penalize its owner.
    pub async fn mark_as_false(
        &self,
        id: &str,
        principal: &Principal,
    ) -> AppResult<complaint::Model> {
        let actor = self.resolve_staff(principal).await?;
        let complaint = self.complaint_repo.get_by_id(id).await?;

        if complaint.is_false {
            tracing::warn!(complaint_id = %id, actor = %actor.id, "Complaint already marked as false");
            return Ok(complaint);
        }
        if self.policy.is_final(complaint.status) {
            return Err(AppError::InvalidState(format!(
                "Complaint is already {}",
                self.policy.label(complaint.status)
            )));
        }

        let mut write = ComplaintWrite {
            status: Some(ComplaintStatus::RejectedFalse),
            is_false: Some(true),
            status_log: Some(self.log_entry(
                id,
                Some(complaint.status),
                ComplaintStatus::RejectedFalse,
                &actor.id,
                actor.role,
            )),
            ..Default::default()
        };

        let owner = match complaint.student_id.as_deref() {
            Some(sid) => self.student_repo.find_by_id(sid).await?,
            None => None,
        };

        let mut outcome = None;
        if let Some(student) = &owner {
            let threshold = self.policy.false_report_threshold();
            let penalty = apply_penalty(student.false_report_count, student.is_blocked, threshold);
            write.penalty = Some(PenaltyUpdate {
                student_id: student.id.clone(),
                expected_count: student.false_report_count,
                new_count: penalty.false_report_count,
                blocked: penalty.blocked,
            });
            write.notification = Some(self.notification_service.build(
                &student.id,
                id,
                &false_report_message(id, &penalty, threshold),
            ));
            outcome = Some((student.id.clone(), penalty));
        }

        let updated = self
            .complaint_repo
            .commit(id, complaint.version, write)
            .await?;

        tracing::info!(complaint_id = %id, actor = %actor.id, "Complaint marked as false");
        if let Some((student_id, penalty)) = outcome {
            if penalty.newly_blocked {
                tracing::info!(
                    student_id = %student_id,
                    false_reports = penalty.false_report_count,
                    "Student blocked after repeated false reports"
                );
            }
        }

        Ok(updated)
    }

    // ========== Queries ==========

    /// Staff listing, newest first.
    pub async fn list(
        &self,
        principal: &Principal,
        filter: &ComplaintFilter,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> AppResult<Vec<complaint::Model>> {
        principal.require_staff()?;
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 100);
        let complaints = self
            .complaint_repo
            .list(filter, limit, offset.unwrap_or(0))
            .await?;
        Ok(complaints.into_iter().map(hide_anonymous_owner).collect())
    }

    /// Distinct categories in use.
    pub async fn categories(&self) -> AppResult<Vec<String>> {
        self.complaint_repo.find_categories().await
    }

    /// The calling student's complaints, newest first.
    pub async fn my_complaints(&self, principal: &Principal) -> AppResult<Vec<complaint::Model>> {
        if principal.is_staff() {
            return Err(AppError::Forbidden(
                "Only students have their own complaints".to_string(),
            ));
        }
        self.complaint_repo.find_by_student(&principal.id).await
    }

    /// Load a complaint with all of its child records.
    pub async fn get(&self, id: &str, principal: &Principal) -> AppResult<ComplaintDetails> {
        let mut details = self
            .complaint_repo
            .find_details(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Complaint {id}")))?;

        if principal.is_staff() {
            details.complaint = hide_anonymous_owner(details.complaint);
        } else {
            if details.complaint.student_id.as_deref() != Some(principal.id.as_str()) {
                return Err(AppError::Forbidden(
                    "You can only view your own complaints".to_string(),
                ));
            }
            self.notification_service
                .mark_read_for_complaint(&principal.id, id)
                .await?;
        }

        Ok(details)
    }

    /// Remove a complaint, its child rows and its stored files.
    pub async fn delete(&self, id: &str, principal: &Principal) -> AppResult<()> {
        let actor = self.resolve_staff(principal).await?;
        let attachments = self.attachment_repo.find_by_complaint(id).await?;

        self.complaint_repo.delete(id).await?;

        for attachment in attachments {
            if let Err(e) = self.storage.delete(&attachment.storage_key).await {
                tracing::warn!(
                    complaint_id = %id,
                    storage_key = %attachment.storage_key,
                    error = %e,
                    "Failed to delete stored attachment"
                );
            }
        }

        tracing::info!(complaint_id = %id, actor = %actor.id, "Complaint deleted");
        Ok(())
    }

    // ========== Attachments ==========

    /// Read an attachment back from the file store.
    pub async fn download_attachment(
        &self,
        attachment_id: &str,
        principal: &Principal,
    ) -> AppResult<AttachmentDownload> {
        let attachment = self.attachment_repo.get_by_id(attachment_id).await?;
        if !principal.is_staff() {
            let complaint = self.complaint_repo.get_by_id(&attachment.complaint_id).await?;
            if complaint.student_id.as_deref() != Some(principal.id.as_str()) {
                return Err(AppError::Forbidden(
                    "Attachment belongs to another student's complaint".to_string(),
                ));
            }
        }

        let data = self.storage.read(&attachment.storage_key).await?;
        Ok(AttachmentDownload { attachment, data })
    }

    /// Delete an attachment file and its row.
    pub async fn remove_attachment(
        &self,
        attachment_id: &str,
        principal: &Principal,
    ) -> AppResult<()> {
        let attachment = self.attachment_repo.get_by_id(attachment_id).await?;

        if principal.is_staff() {
            self.resolve_staff(principal).await?;
        } else {
            let complaint = self.complaint_repo.get_by_id(&attachment.complaint_id).await?;
            if complaint.student_id.as_deref() != Some(principal.id.as_str()) {
                return Err(AppError::Forbidden(
                    "Attachment belongs to another student's complaint".to_string(),
                ));
            }
            ensure_not_blocked(&self.author(principal).await?)?;
            if complaint.is_false || !StatusPolicy::is_editable(complaint.status) {
                return Err(AppError::InvalidState(
                    "Attachments can only be removed while the complaint is open".to_string(),
                ));
            }
        }

        if let Err(e) = self.storage.delete(&attachment.storage_key).await {
            tracing::warn!(
                attachment_id = %attachment_id,
                storage_key = %attachment.storage_key,
                error = %e,
                "Failed to delete stored file, proceeding with database deletion"
            );
        }

        self.attachment_repo.delete(attachment_id).await
    }

    // ========== Helpers ==========

    async fn author(&self, principal: &Principal) -> AppResult<student::Model> {
        self.student_repo
            .find_by_id(&principal.id)
            .await?
            .ok_or_else(|| AppError::Forbidden("Unknown student account".to_string()))
    }

    /// Look up the staff record behind a principal. The stored role decides the rank.
    async fn resolve_staff(&self, principal: &Principal) -> AppResult<staff::Model> {
        principal.require_staff()?;
        let staff = self
            .staff_repo
            .find_by_id(&principal.id)
            .await?
            .ok_or_else(|| AppError::Forbidden("Unknown staff account".to_string()))?;
        if !staff.role.is_staff() {
            return Err(AppError::Forbidden(
                "This action requires a staff or admin account".to_string(),
            ));
        }
        Ok(staff)
    }

    fn log_entry(
        &self,
        complaint_id: &str,
        previous_status: Option<ComplaintStatus>,
        new_status: ComplaintStatus,
        actor_id: &str,
        actor_role: Role,
    ) -> status_log::ActiveModel {
        status_log::ActiveModel {
            id: Set(self.id_gen.generate()),
            complaint_id: Set(complaint_id.to_string()),
            previous_status: Set(previous_status),
            new_status: Set(new_status),
            actor_id: Set(actor_id.to_string()),
            actor_role: Set(actor_role),
            actor_rank: Set(actor_role.rank()),
            created_at: Set(Utc::now().into()),
        }
    }

    fn build_witnesses(&self, witnesses: Vec<WitnessInput>) -> Vec<witness::Model> {
        witnesses
            .into_iter()
            .filter_map(|w| {
                let name = w.name.trim();
                if name.is_empty() {
                    return None;
                }
                Some(witness::Model {
                    id: self.id_gen.generate(),
                    name: name.to_string(),
                    phone: w
                        .phone
                        .map(|p| p.trim().to_string())
                        .filter(|p| !p.is_empty()),
                })
            })
            .collect()
    }

    /// Store each file independently; one failure never stops the rest.
    async fn store_attachments(
        &self,
        complaint_id: &str,
        files: Vec<NewAttachment>,
    ) -> (Vec<attachment::Model>, Vec<UploadFailure>) {
        let mut stored = Vec::new();
        let mut failed = Vec::new();

        for file in files {
            if file.data.is_empty() {
                tracing::debug!(complaint_id = %complaint_id, file = %file.file_name, "Skipping empty upload");
                continue;
            }
            match self.store_attachment(complaint_id, &file).await {
                Ok(model) => stored.push(model),
                Err(e) => {
                    tracing::warn!(
                        complaint_id = %complaint_id,
                        file = %file.file_name,
                        error = %e,
                        "Failed to store attachment"
                    );
                    failed.push(UploadFailure {
                        file_name: file.file_name,
                        reason: e.to_string(),
                    });
                }
            }
        }

        (stored, failed)
    }

    async fn store_attachment(
        &self,
        complaint_id: &str,
        file: &NewAttachment,
    ) -> AppResult<attachment::Model> {
        if file.data.len() > self.max_file_size {
            return Err(AppError::BadRequest(format!(
                "File too large. Maximum size is {} bytes",
                self.max_file_size
            )));
        }

        let key = generate_storage_key(complaint_id, &file.file_name);
        let uploaded = self
            .storage
            .upload(&key, &file.data, &file.content_type)
            .await?;

        let model = attachment::ActiveModel {
            id: Set(self.id_gen.generate()),
            complaint_id: Set(complaint_id.to_string()),
            original_name: Set(file.file_name.clone()),
            storage_key: Set(uploaded.key.clone()),
            url: Set(uploaded.url),
            content_type: Set(uploaded.content_type),
            size: Set(i64::try_from(uploaded.size).unwrap_or(i64::MAX)),
            md5: Set(uploaded.md5),
            created_at: Set(Utc::now().into()),
        };

        match self.attachment_repo.create(model).await {
            Ok(created) => Ok(created),
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&uploaded.key).await {
                    tracing::warn!(storage_key = %uploaded.key, error = %cleanup, "Failed to remove orphaned file");
                }
                Err(e)
            }
        }
    }
}

fn required(field: &str, value: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Required(format!("{field} must not be blank")));
    }
    Ok(trimmed.to_string())
}

/// Anonymous complaints never expose their owner to staff.
fn hide_anonymous_owner(mut complaint: complaint::Model) -> complaint::Model {
    if complaint.is_anonymous {
        complaint.student_id = None;
    }
    complaint
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample(anonymous: bool) -> complaint::Model {
        complaint::Model {
            id: "c1".to_string(),
            title: "Title".to_string(),
            description: "Description".to_string(),
            category: "bullying".to_string(),
            status: ComplaintStatus::Open,
            is_anonymous: anonymous,
            is_false: false,
            student_id: Some("s1".to_string()),
            school_id: "school1".to_string(),
            version: 0,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_required_trims() {
        assert_eq!(required("title", "  Broken door ").unwrap(), "Broken door");
        assert!(matches!(required("title", "   "), Err(AppError::Required(_))));
    }

    #[test]
    fn test_hide_anonymous_owner() {
        assert_eq!(hide_anonymous_owner(sample(true)).student_id, None);
        assert_eq!(
            hide_anonymous_owner(sample(false)).student_id.as_deref(),
            Some("s1")
        );
    }

    #[test]
    fn test_create_input_length_limits() {
        let input = CreateComplaintInput {
            school_id: "school1".to_string(),
            title: "x".repeat(201),
            description: "d".to_string(),
            category: "c".to_string(),
            is_anonymous: false,
            witnesses: Vec::new(),
            attachments: Vec::new(),
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_outcome_partial() {
        let outcome = ComplaintOutcome {
            complaint: sample(false),
            attachments: Vec::new(),
            failed_uploads: vec![UploadFailure {
                file_name: "a.png".to_string(),
                reason: "disk full".to_string(),
            }],
        };
        assert!(outcome.is_partial());
    }
}
