//! Complaint lifecycle scenarios against a migrated in-memory database.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use farol_common::{AppError, AppResult, StorageBackend, UploadedFile};
use farol_core::{
    AnalyticsService, ComplaintService, CreateComplaintInput, EditComplaintInput, NewAttachment,
    NotificationService, Principal, StatusPolicy, WitnessInput,
};
use farol_db::entities::{complaint::ComplaintStatus, staff::Role};
use farol_db::repositories::{
    AttachmentRepository, ComplaintRepository, NotificationRepository, SchoolRepository,
    StaffRepository, StatusLogRepository, StudentRepository,
};
use farol_db::test_utils::TestDatabase;

/// In-memory file store that fails uploads whose file name contains "fail".
#[derive(Default)]
struct MemoryStorage {
    files: Mutex<HashMap<String, Vec<u8>>>,
}

#[async_trait::async_trait]
impl StorageBackend for MemoryStorage {
    async fn upload(&self, key: &str, data: &[u8], content_type: &str) -> AppResult<UploadedFile> {
        if key.contains("fail") {
            return Err(AppError::Storage("simulated write failure".to_string()));
        }
        self.files.lock().unwrap().insert(key.to_string(), data.to_vec());
        Ok(UploadedFile {
            key: key.to_string(),
            url: self.public_url(key),
            size: data.len() as u64,
            content_type: content_type.to_string(),
            md5: "0".repeat(32),
        })
    }

    async fn read(&self, key: &str) -> AppResult<Vec<u8>> {
        self.files
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| AppError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.files.lock().unwrap().remove(key);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("/uploads/{key}")
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.files.lock().unwrap().contains_key(key))
    }
}

struct Harness {
    db: TestDatabase,
    storage: Arc<MemoryStorage>,
    complaints: ComplaintService,
    notifications: NotificationService,
    analytics: AnalyticsService,
    school_id: String,
    staff: Principal,
}

impl Harness {
    async fn new() -> Self {
        let db = TestDatabase::new().await.unwrap();
        let conn = db.connection();
        let storage = Arc::new(MemoryStorage::default());
        let policy = Arc::new(StatusPolicy::default());

        let notifications = NotificationService::new(NotificationRepository::new(conn.clone()));
        let complaints = ComplaintService::new(
            ComplaintRepository::new(conn.clone()),
            AttachmentRepository::new(conn.clone()),
            StudentRepository::new(conn.clone()),
            StaffRepository::new(conn.clone()),
            SchoolRepository::new(conn.clone()),
            notifications.clone(),
            storage.clone(),
            policy.clone(),
        );
        let analytics = AnalyticsService::new(
            ComplaintRepository::new(conn.clone()),
            StatusLogRepository::new(conn),
            policy,
        );

        let school = db.seed_school("Escola Estadual Farol").await.unwrap();
        let staff = db.seed_staff(&school.id, Role::Staff).await.unwrap();

        Self {
            school_id: school.id,
            staff: Principal::staff(staff.id),
            db,
            storage,
            complaints,
            notifications,
            analytics,
        }
    }

    async fn student(&self, name: &str) -> Principal {
        let student = self.db.seed_student(&self.school_id, name).await.unwrap();
        Principal::student(student.id)
    }

    fn input(&self, title: &str) -> CreateComplaintInput {
        CreateComplaintInput {
            school_id: self.school_id.clone(),
            title: title.to_string(),
            description: "Happened during the break".to_string(),
            category: "bullying".to_string(),
            is_anonymous: false,
            witnesses: Vec::new(),
            attachments: Vec::new(),
        }
    }

    async fn file(&self, student: &Principal, title: &str) -> String {
        self.complaints
            .create(student, self.input(title))
            .await
            .unwrap()
            .complaint
            .id
    }

    async fn student_record(&self, principal: &Principal) -> farol_db::entities::student::Model {
        StudentRepository::new(self.db.connection())
            .get_by_id(&principal.id)
            .await
            .unwrap()
    }

    async fn log_len(&self, complaint_id: &str) -> usize {
        StatusLogRepository::new(self.db.connection())
            .find_by_complaint(complaint_id)
            .await
            .unwrap()
            .len()
    }
}

fn attachment(name: &str) -> NewAttachment {
    NewAttachment {
        file_name: name.to_string(),
        content_type: "image/png".to_string(),
        data: vec![1, 2, 3],
    }
}

#[tokio::test]
async fn test_create_logs_initial_open_entry() {
    let h = Harness::new().await;
    let student = h.student("Ana").await;

    let mut input = h.input("Broken window");
    input.witnesses = vec![
        WitnessInput {
            name: "Bruno".to_string(),
            phone: None,
        },
        WitnessInput {
            name: "   ".to_string(),
            phone: Some("123".to_string()),
        },
    ];
    let outcome = h.complaints.create(&student, input).await.unwrap();

    assert_eq!(outcome.complaint.status, ComplaintStatus::Open);
    assert_eq!(outcome.complaint.student_id.as_deref(), Some(student.id.as_str()));
    assert!(!outcome.is_partial());

    let details = h.complaints.get(&outcome.complaint.id, &student).await.unwrap();
    assert_eq!(details.witnesses.len(), 1);
    assert_eq!(details.status_log.len(), 1);
    assert_eq!(details.status_log[0].previous_status, None);
    assert_eq!(details.status_log[0].actor_rank, 1);
}

#[tokio::test]
async fn test_create_requires_fields_and_school() {
    let h = Harness::new().await;
    let student = h.student("Ana").await;

    let blank = h.complaints.create(&student, h.input("  ")).await;
    assert!(matches!(blank, Err(AppError::Required(_))));

    let mut input = h.input("Broken window");
    input.school_id = "nowhere".to_string();
    let missing = h.complaints.create(&student, input).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    let staff = h.complaints.create(&h.staff, h.input("Broken window")).await;
    assert!(matches!(staff, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn test_partial_attachment_failure_still_creates_complaint() {
    let h = Harness::new().await;
    let student = h.student("Ana").await;

    let mut input = h.input("Vandalism");
    input.attachments = vec![
        attachment("one.png"),
        attachment("fail-two.png"),
        attachment("three.png"),
    ];
    let outcome = h.complaints.create(&student, input).await.unwrap();

    assert!(outcome.is_partial());
    assert_eq!(outcome.attachments.len(), 2);
    assert_eq!(outcome.failed_uploads.len(), 1);
    assert_eq!(outcome.failed_uploads[0].file_name, "fail-two.png");

    let details = h.complaints.get(&outcome.complaint.id, &student).await.unwrap();
    let names: Vec<_> = details
        .attachments
        .iter()
        .map(|a| a.original_name.as_str())
        .collect();
    assert_eq!(details.attachments.len(), 2);
    assert!(names.contains(&"one.png"));
    assert!(names.contains(&"three.png"));
    assert_eq!(h.storage.files.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_same_status_is_a_no_op() {
    let h = Harness::new().await;
    let student = h.student("Ana").await;
    let id = h.file(&student, "Noise").await;

    let before = h.log_len(&id).await;
    let complaint = h
        .complaints
        .change_status(&id, &h.staff, ComplaintStatus::Open)
        .await
        .unwrap();

    assert_eq!(complaint.version, 0);
    assert_eq!(h.log_len(&id).await, before);
    assert_eq!(h.notifications.unread_count(&student).await.unwrap(), 0);
}

#[tokio::test]
async fn test_change_status_requires_staff() {
    let h = Harness::new().await;
    let student = h.student("Ana").await;
    let id = h.file(&student, "Noise").await;

    let result = h
        .complaints
        .change_status(&id, &student, ComplaintStatus::Closed)
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));

    let unknown = h
        .complaints
        .change_status(&id, &Principal::admin("ghost"), ComplaintStatus::Closed)
        .await;
    assert!(matches!(unknown, Err(AppError::Forbidden(_))));

    let to_false = h
        .complaints
        .change_status(&id, &h.staff, ComplaintStatus::RejectedFalse)
        .await;
    assert!(matches!(to_false, Err(AppError::InvalidState(_))));
}

#[tokio::test]
async fn test_answer_then_respond_leaves_one_notification() {
    let h = Harness::new().await;
    let student = h.student("Ana").await;
    let id = h.file(&student, "Fight at the gate").await;

    h.complaints
        .change_status(&id, &h.staff, ComplaintStatus::Answered)
        .await
        .unwrap();
    let complaint = h
        .complaints
        .respond(&id, &h.staff, "We talked to both students.")
        .await
        .unwrap();

    assert_eq!(complaint.status, ComplaintStatus::Answered);

    let notifications = h.notifications.list(&student, None, false).await.unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].complaint_id, id);
    assert!(notifications[0].message.contains("received a response"));
    assert_eq!(notifications[0].url, format!("/complaints/{id}"));

    // Responding does not log a transition when the status stays put.
    assert_eq!(h.log_len(&id).await, 2);

    let details = h.complaints.get(&id, &student).await.unwrap();
    assert_eq!(details.responses.len(), 1);
    assert_eq!(h.notifications.unread_count(&student).await.unwrap(), 0);
}

#[tokio::test]
async fn test_respond_advances_open_complaint() {
    let h = Harness::new().await;
    let student = h.student("Ana").await;
    let id = h.file(&student, "Graffiti").await;

    let blank = h.complaints.respond(&id, &h.staff, "   ").await;
    assert!(matches!(blank, Err(AppError::Required(_))));

    let answered = h.complaints.respond(&id, &h.staff, "Cleaning scheduled").await.unwrap();
    assert_eq!(answered.status, ComplaintStatus::Answered);
    assert_eq!(h.log_len(&id).await, 2);

    h.complaints
        .change_status(&id, &h.staff, ComplaintStatus::Resolved)
        .await
        .unwrap();
    let resolved = h.complaints.respond(&id, &h.staff, "Done").await.unwrap();
    assert_eq!(resolved.status, ComplaintStatus::Resolved);
}

#[tokio::test]
async fn test_third_false_report_blocks_student() {
    let h = Harness::new().await;
    let student = h.student("Ana").await;
    let ids = [
        h.file(&student, "First").await,
        h.file(&student, "Second").await,
        h.file(&student, "Third").await,
    ];

    let mut messages = Vec::new();
    for (n, id) in ids.iter().enumerate() {
        let complaint = h.complaints.mark_as_false(id, &h.staff).await.unwrap();
        assert!(complaint.is_false);
        assert_eq!(complaint.status, ComplaintStatus::RejectedFalse);

        let record = h.student_record(&student).await;
        assert_eq!(record.false_report_count, i32::try_from(n + 1).unwrap());
        assert_eq!(record.is_blocked, n == 2);

        let latest = h.notifications.list(&student, Some(1), false).await.unwrap();
        messages.push(latest[0].message.replace(id.as_str(), "#"));
    }

    assert!(messages[0].contains("more false report"));
    assert!(messages[1].contains("more false report"));
    assert!(messages[2].contains("can no longer file complaints"));
    assert_ne!(messages[1], messages[2]);

    let blocked = h.complaints.create(&student, h.input("Fourth")).await;
    assert!(matches!(blocked, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn test_respond_after_false_report_keeps_penalty_notice() {
    let h = Harness::new().await;
    let student = h.student("Ana").await;
    let ids = [
        h.file(&student, "First").await,
        h.file(&student, "Second").await,
        h.file(&student, "Third").await,
    ];
    for id in &ids {
        h.complaints.mark_as_false(id, &h.staff).await.unwrap();
    }

    let third = &ids[2];
    h.complaints
        .respond(third, &h.staff, "Please stop filing fake reports.")
        .await
        .unwrap();

    let notifications: Vec<_> = h
        .notifications
        .list(&student, None, false)
        .await
        .unwrap()
        .into_iter()
        .filter(|n| &n.complaint_id == third)
        .collect();
    assert_eq!(notifications.len(), 2);
    assert!(notifications
        .iter()
        .any(|n| n.message.contains("can no longer file complaints")));
    assert!(notifications
        .iter()
        .any(|n| n.message.contains("received a response")));
}

#[tokio::test]
async fn test_my_complaints_is_for_students_only() {
    let h = Harness::new().await;
    let student = h.student("Ana").await;
    h.file(&student, "Broken locker").await;

    let own = h.complaints.my_complaints(&student).await.unwrap();
    assert_eq!(own.len(), 1);

    let staff = h.complaints.my_complaints(&h.staff).await;
    assert!(matches!(staff, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn test_block_stays_after_more_false_reports() {
    let h = Harness::new().await;
    let student = h.student("Ana").await;
    let mut ids = Vec::new();
    for title in ["A", "B", "C", "D"] {
        ids.push(h.file(&student, title).await);
    }

    for id in &ids {
        h.complaints.mark_as_false(id, &h.staff).await.unwrap();
    }

    let record = h.student_record(&student).await;
    assert_eq!(record.false_report_count, 4);
    assert!(record.is_blocked);
}

#[tokio::test]
async fn test_mark_as_false_twice_is_a_no_op() {
    let h = Harness::new().await;
    let student = h.student("Ana").await;
    let id = h.file(&student, "Dup").await;

    let first = h.complaints.mark_as_false(&id, &h.staff).await.unwrap();
    let second = h.complaints.mark_as_false(&id, &h.staff).await.unwrap();

    assert_eq!(first.version, second.version);
    assert_eq!(h.student_record(&student).await.false_report_count, 1);
}

#[tokio::test]
async fn test_false_complaint_is_locked() {
    let h = Harness::new().await;
    let student = h.student("Ana").await;
    let id = h.file(&student, "Locked").await;
    h.complaints.mark_as_false(&id, &h.staff).await.unwrap();

    let edit = h
        .complaints
        .edit(
            &id,
            &h.staff,
            EditComplaintInput {
                title: Some("New title".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(edit, Err(AppError::InvalidState(_))));

    let reopen = h
        .complaints
        .change_status(&id, &h.staff, ComplaintStatus::Open)
        .await;
    assert!(matches!(reopen, Err(AppError::InvalidState(_))));
}

#[tokio::test]
async fn test_mark_final_complaint_as_false_is_rejected() {
    let h = Harness::new().await;
    let student = h.student("Ana").await;
    let id = h.file(&student, "Closed case").await;
    h.complaints
        .change_status(&id, &h.staff, ComplaintStatus::Closed)
        .await
        .unwrap();

    let result = h.complaints.mark_as_false(&id, &h.staff).await;
    assert!(matches!(result, Err(AppError::InvalidState(_))));
}

#[tokio::test]
async fn test_edit_rules() {
    let h = Harness::new().await;
    let owner = h.student("Ana").await;
    let other = h.student("Bia").await;
    let id = h.file(&owner, "Original").await;

    let foreign = h
        .complaints
        .edit(&id, &other, EditComplaintInput::default())
        .await;
    assert!(matches!(foreign, Err(AppError::Forbidden(_))));

    let escalate = h
        .complaints
        .edit(
            &id,
            &owner,
            EditComplaintInput {
                status: Some(ComplaintStatus::Closed),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(escalate, Err(AppError::Forbidden(_))));

    let edited = h
        .complaints
        .edit(
            &id,
            &owner,
            EditComplaintInput {
                title: Some("Updated".to_string()),
                witnesses: Some(vec![WitnessInput {
                    name: "Carla".to_string(),
                    phone: None,
                }]),
                attachments: vec![attachment("photo.png")],
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(edited.complaint.title, "Updated");
    assert_eq!(edited.attachments.len(), 1);

    h.complaints
        .change_status(&id, &h.staff, ComplaintStatus::UnderInvestigation)
        .await
        .unwrap();
    let late = h
        .complaints
        .edit(
            &id,
            &owner,
            EditComplaintInput {
                title: Some("Too late".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(late, Err(AppError::InvalidState(_))));
}

#[tokio::test]
async fn test_staff_edit_can_reassign_and_set_status() {
    let h = Harness::new().await;
    let owner = h.student("Ana").await;
    let new_owner = h.student("Bia").await;
    let id = h.file(&owner, "Reassign").await;

    let outcome = h
        .complaints
        .edit(
            &id,
            &h.staff,
            EditComplaintInput {
                student_id: Some(Some(new_owner.id.clone())),
                status: Some(ComplaintStatus::UnderInvestigation),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(outcome.complaint.student_id.as_deref(), Some(new_owner.id.as_str()));
    assert_eq!(outcome.complaint.status, ComplaintStatus::UnderInvestigation);
    assert_eq!(h.log_len(&id).await, 2);
    assert_eq!(h.notifications.unread_count(&new_owner).await.unwrap(), 1);
}

#[tokio::test]
async fn test_anonymous_owner_hidden_from_staff() {
    let h = Harness::new().await;
    let student = h.student("Ana").await;
    let mut input = h.input("Anonymous tip");
    input.is_anonymous = true;
    let id = h.complaints.create(&student, input).await.unwrap().complaint.id;

    let staff_view = h.complaints.get(&id, &h.staff).await.unwrap();
    assert_eq!(staff_view.complaint.student_id, None);

    let listed = h
        .complaints
        .list(&h.staff, &Default::default(), None, None)
        .await
        .unwrap();
    assert!(listed.iter().all(|c| c.student_id.is_none()));

    let own_view = h.complaints.get(&id, &student).await.unwrap();
    assert_eq!(own_view.complaint.student_id.as_deref(), Some(student.id.as_str()));

    let other = h.student("Bia").await;
    assert!(matches!(
        h.complaints.get(&id, &other).await,
        Err(AppError::Forbidden(_))
    ));
}

#[tokio::test]
async fn test_delete_removes_files_and_children() {
    let h = Harness::new().await;
    let student = h.student("Ana").await;
    let mut input = h.input("To delete");
    input.attachments = vec![attachment("a.png")];
    let id = h.complaints.create(&student, input).await.unwrap().complaint.id;

    assert!(matches!(
        h.complaints.delete(&id, &student).await,
        Err(AppError::Forbidden(_))
    ));

    h.complaints.delete(&id, &h.staff).await.unwrap();

    assert!(h.storage.files.lock().unwrap().is_empty());
    assert!(matches!(
        h.complaints.get(&id, &h.staff).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_attachment_download_and_removal() {
    let h = Harness::new().await;
    let student = h.student("Ana").await;
    let other = h.student("Bia").await;
    let mut input = h.input("With photo");
    input.attachments = vec![attachment("photo.png")];
    let outcome = h.complaints.create(&student, input).await.unwrap();
    let attachment_id = outcome.attachments[0].id.clone();

    let download = h
        .complaints
        .download_attachment(&attachment_id, &student)
        .await
        .unwrap();
    assert_eq!(download.data, vec![1, 2, 3]);

    assert!(matches!(
        h.complaints.download_attachment(&attachment_id, &other).await,
        Err(AppError::Forbidden(_))
    ));

    h.complaints
        .remove_attachment(&attachment_id, &student)
        .await
        .unwrap();
    assert!(h.storage.files.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_notification_reads_and_deletes() {
    let h = Harness::new().await;
    let student = h.student("Ana").await;
    let first = h.file(&student, "One").await;
    let second = h.file(&student, "Two").await;

    h.complaints
        .change_status(&first, &h.staff, ComplaintStatus::UnderInvestigation)
        .await
        .unwrap();
    h.complaints
        .change_status(&second, &h.staff, ComplaintStatus::UnderInvestigation)
        .await
        .unwrap();
    assert_eq!(h.notifications.unread_count(&student).await.unwrap(), 2);

    let list = h.notifications.list(&student, None, false).await.unwrap();
    assert_eq!(list[0].complaint_id, second);

    h.notifications.mark_read(&student, &list[0].id).await.unwrap();
    assert_eq!(h.notifications.unread_count(&student).await.unwrap(), 1);
    assert_eq!(h.notifications.list(&student, None, true).await.unwrap().len(), 1);

    h.notifications.mark_all_read(&student).await.unwrap();
    assert_eq!(h.notifications.unread_count(&student).await.unwrap(), 0);

    h.notifications.delete(&student, &list[1].id).await.unwrap();
    assert_eq!(h.notifications.list(&student, None, false).await.unwrap().len(), 1);

    assert_eq!(h.notifications.delete_all(&student).await.unwrap(), 1);
    assert!(h.notifications.list(&student, None, false).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_resolved_reopened_resolved_counts_once() {
    let h = Harness::new().await;
    let student = h.student("Ana").await;
    let at = |m, d, hh| Utc.with_ymd_and_hms(2025, m, d, hh, 0, 0).unwrap();

    let c = h
        .db
        .seed_complaint(&h.school_id, Some(&student.id), ComplaintStatus::Resolved, at(1, 5, 8))
        .await
        .unwrap();
    h.db.seed_transition(&c.id, None, ComplaintStatus::Open, at(1, 5, 8)).await.unwrap();
    h.db.seed_transition(&c.id, Some(ComplaintStatus::Open), ComplaintStatus::UnderInvestigation, at(1, 6, 8))
        .await
        .unwrap();
    h.db.seed_transition(&c.id, Some(ComplaintStatus::UnderInvestigation), ComplaintStatus::Resolved, at(2, 1, 8))
        .await
        .unwrap();
    h.db.seed_transition(&c.id, Some(ComplaintStatus::Resolved), ComplaintStatus::UnderInvestigation, at(3, 1, 8))
        .await
        .unwrap();
    h.db.seed_transition(&c.id, Some(ComplaintStatus::UnderInvestigation), ComplaintStatus::Resolved, at(4, 1, 8))
        .await
        .unwrap();

    // Closed once and reopened: not counted as resolved while open, but its
    // closure still counts towards resolution time.
    let reopened = h
        .db
        .seed_complaint(&h.school_id, None, ComplaintStatus::UnderInvestigation, at(1, 10, 8))
        .await
        .unwrap();
    h.db.seed_transition(&reopened.id, None, ComplaintStatus::Open, at(1, 10, 8)).await.unwrap();
    h.db.seed_transition(&reopened.id, Some(ComplaintStatus::Open), ComplaintStatus::UnderInvestigation, at(1, 11, 8))
        .await
        .unwrap();
    h.db.seed_transition(&reopened.id, Some(ComplaintStatus::UnderInvestigation), ComplaintStatus::Closed, at(2, 10, 8))
        .await
        .unwrap();
    h.db.seed_transition(&reopened.id, Some(ComplaintStatus::Closed), ComplaintStatus::UnderInvestigation, at(3, 10, 8))
        .await
        .unwrap();

    let stats = h.analytics.monthly_stats(2025).await.unwrap();

    assert_eq!(stats.created[0], 2);
    assert_eq!(stats.resolved.iter().sum::<u32>(), 1);
    assert_eq!(stats.resolved[3], 1);
    assert_eq!(stats.mean_hours[3], 85.0 * 24.0);
    // February holds both closures: 85 days and 30 days.
    assert_eq!(stats.mean_hours[1], 57.5 * 24.0);

    let summary = h
        .analytics
        .dashboard(2025, Utc.with_ymd_and_hms(2025, 1, 20, 0, 0, 0).unwrap())
        .await
        .unwrap();
    assert_eq!(summary.total, 2);
    assert_eq!(summary.created_this_month, 2);
    assert_eq!(summary.breakdown.resolved, 1);
    assert_eq!(summary.breakdown.in_progress, 1);
    // 85 days for the first complaint, 30 days for the reopened one.
    assert_eq!(summary.mean_resolution_hours, Some(57.5 * 24.0));
    assert_eq!(summary.mean_resolution_display, "57 days and 12 hours");
}

#[tokio::test]
async fn test_reopened_complaint_keeps_its_resolution_time() {
    let h = Harness::new().await;
    let at = |d, hh| Utc.with_ymd_and_hms(2025, 1, d, hh, 0, 0).unwrap();

    let c = h
        .db
        .seed_complaint(&h.school_id, None, ComplaintStatus::Answered, at(10, 8))
        .await
        .unwrap();
    h.db.seed_transition(&c.id, None, ComplaintStatus::Open, at(10, 8)).await.unwrap();
    h.db.seed_transition(&c.id, Some(ComplaintStatus::Open), ComplaintStatus::UnderInvestigation, at(11, 8))
        .await
        .unwrap();
    h.db.seed_transition(&c.id, Some(ComplaintStatus::UnderInvestigation), ComplaintStatus::Closed, at(12, 8))
        .await
        .unwrap();
    h.db.seed_transition(&c.id, Some(ComplaintStatus::Closed), ComplaintStatus::Answered, at(20, 8))
        .await
        .unwrap();

    let stats = h.analytics.monthly_stats(2025).await.unwrap();
    assert_eq!(stats.mean_hours[0], 24.0);
    assert_eq!(stats.resolved[0], 0);

    let overall = h.analytics.overall_mean_hours().await.unwrap();
    assert_eq!(overall, Some(24.0));
}

#[tokio::test]
async fn test_false_reports_per_month() {
    let h = Harness::new().await;
    let student = h.student("Ana").await;
    let id = h.file(&student, "Made up").await;
    h.complaints.mark_as_false(&id, &h.staff).await.unwrap();

    let now = Utc::now();
    let stats = h.analytics.monthly_stats(chrono::Datelike::year(&now)).await.unwrap();
    let month = chrono::Datelike::month0(&now) as usize;

    assert_eq!(stats.false_reports[month], 1);
    assert_eq!(stats.created[month], 1);
    assert_eq!(stats.resolved.iter().sum::<u32>(), 0);
}
