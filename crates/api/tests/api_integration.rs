//! API integration tests.
//!
//! These tests drive the router against a migrated in-memory database and a
//! temporary attachment directory.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use farol_api::{
    middleware::{AppState, PRINCIPAL_ID_HEADER, PRINCIPAL_ROLE_HEADER, principal_middleware},
    router as api_router,
};
use farol_common::LocalStorage;
use farol_core::{AnalyticsService, ComplaintService, NotificationService, StatusPolicy};
use farol_db::entities::staff::Role;
use farol_db::repositories::{
    AttachmentRepository, ComplaintRepository, NotificationRepository, SchoolRepository,
    StaffRepository, StatusLogRepository, StudentRepository,
};
use farol_db::test_utils::TestDatabase;
use serde_json::{Value, json};
use tower::ServiceExt;

const BOUNDARY: &str = "farol-test-boundary";

static DIR_SEQ: AtomicU32 = AtomicU32::new(0);

struct TestApp {
    router: Router,
    db: TestDatabase,
    school_id: String,
    staff_id: String,
    upload_dir: PathBuf,
}

impl TestApp {
    async fn new() -> Self {
        let db = TestDatabase::new().await.unwrap();
        let conn = db.connection();
        let upload_dir = std::env::temp_dir().join(format!(
            "farol-api-{}-{}",
            std::process::id(),
            DIR_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        let storage = Arc::new(LocalStorage::new(upload_dir.clone(), "/uploads".to_string()));
        let policy = Arc::new(StatusPolicy::default());

        let notification_service =
            NotificationService::new(NotificationRepository::new(conn.clone()));
        let complaint_service = ComplaintService::new(
            ComplaintRepository::new(conn.clone()),
            AttachmentRepository::new(conn.clone()),
            StudentRepository::new(conn.clone()),
            StaffRepository::new(conn.clone()),
            SchoolRepository::new(conn.clone()),
            notification_service.clone(),
            storage,
            policy.clone(),
        );
        let analytics_service = AnalyticsService::new(
            ComplaintRepository::new(conn.clone()),
            StatusLogRepository::new(conn),
            policy,
        );

        let state = AppState {
            complaint_service,
            notification_service,
            analytics_service,
        };
        let router = api_router()
            .layer(axum::middleware::from_fn(principal_middleware))
            .with_state(state);

        let school = db.seed_school("Escola Farol").await.unwrap();
        let staff = db.seed_staff(&school.id, Role::Staff).await.unwrap();

        Self {
            router,
            db,
            school_id: school.id,
            staff_id: staff.id,
            upload_dir,
        }
    }

    async fn student(&self) -> String {
        self.db
            .seed_student(&self.school_id, "Ana")
            .await
            .unwrap()
            .id
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn post_json(&self, uri: &str, principal: Option<(&str, &str)>, body: Value) -> Response {
        let mut builder = Request::builder()
            .uri(uri)
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some((id, role)) = principal {
            builder = builder
                .header(PRINCIPAL_ID_HEADER, id)
                .header(PRINCIPAL_ROLE_HEADER, role);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    async fn as_staff(&self, uri: &str, body: Value) -> Response {
        self.post_json(uri, Some((self.staff_id.as_str(), "staff")), body)
            .await
    }

    /// File a complaint through the multipart endpoint and return its id.
    async fn file_complaint(&self, student_id: &str, title: &str) -> String {
        let body = multipart_body(
            &[
                ("schoolId", self.school_id.as_str()),
                ("title", title),
                ("description", "The lockers on the second floor are broken"),
                ("category", "infrastructure"),
            ],
            &[],
        );
        let response = self.send(multipart_request(student_id, body)).await;
        assert_eq!(response.status(), StatusCode::OK);
        json_body(response).await["data"]["id"]
            .as_str()
            .unwrap()
            .to_string()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        std::fs::remove_dir_all(&self.upload_dir).ok();
    }
}

fn multipart_body(fields: &[(&str, &str)], files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for (file_name, data) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: text/plain\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn multipart_request(student_id: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .uri("/complaints/create")
        .method("POST")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(PRINCIPAL_ID_HEADER, student_id)
        .header(PRINCIPAL_ROLE_HEADER, "student")
        .body(Body::from(body))
        .unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn json_body(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

#[tokio::test]
async fn test_missing_principal_is_unauthorized() {
    let app = TestApp::new().await;

    let response = app.post_json("/complaints/mine", None, json!({})).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .post_json("/complaints/mine", Some(("u1", "janitor")), json!({}))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let app = TestApp::new().await;
    let response = app.as_staff("/complaints/nonexistent", json!({})).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_with_attachment_and_download() {
    let app = TestApp::new().await;
    let student_id = app.student().await;

    let body = multipart_body(
        &[
            ("schoolId", app.school_id.as_str()),
            ("title", "Broken lockers"),
            ("description", "The lockers on the second floor are broken"),
            ("category", "infrastructure"),
            ("witnesses", r#"[{"name":"Bruno","phone":"555-0101"},{"name":"  "}]"#),
        ],
        &[("photo.txt", &b"locker picture"[..])],
    );
    let response = app.send(multipart_request(&student_id, body)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let created = json_body(response).await;
    assert!(created.get("warnings").is_none());
    assert_eq!(created["data"]["status"], "open");
    assert_eq!(created["data"]["statusLabel"], "Open");
    let complaint_id = created["data"]["id"].as_str().unwrap().to_string();
    let attachment_id = created["data"]["attachments"][0]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .post_json(
            "/complaints/show",
            Some((student_id.as_str(), "student")),
            json!({ "complaintId": complaint_id }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let details = json_body(response).await;
    assert_eq!(details["data"]["witnesses"].as_array().unwrap().len(), 1);
    assert_eq!(details["data"]["statusLog"][0]["newStatus"], "open");

    let response = app
        .post_json(
            "/complaints/attachments/download",
            Some((student_id.as_str(), "student")),
            json!({ "attachmentId": attachment_id }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"photo.txt\""
    );
    assert_eq!(body_bytes(response).await, b"locker picture");
}

#[tokio::test]
async fn test_create_requires_title() {
    let app = TestApp::new().await;
    let student_id = app.student().await;

    let body = multipart_body(
        &[
            ("schoolId", app.school_id.as_str()),
            ("title", "   "),
            ("description", "Something happened"),
            ("category", "other"),
        ],
        &[],
    );
    let response = app.send(multipart_request(&student_id, body)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"]["code"], "REQUIRED");
}

#[tokio::test]
async fn test_student_cannot_list_or_change_status() {
    let app = TestApp::new().await;
    let student_id = app.student().await;
    let complaint_id = app.file_complaint(&student_id, "Noise").await;

    let response = app
        .post_json("/complaints/list", Some((student_id.as_str(), "student")), json!({}))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .post_json(
            "/complaints/change-status",
            Some((student_id.as_str(), "student")),
            json!({ "complaintId": complaint_id, "status": "resolved" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_status_change_notifies_owner() {
    let app = TestApp::new().await;
    let student_id = app.student().await;
    let complaint_id = app.file_complaint(&student_id, "Noise").await;

    let response = app
        .as_staff(
            "/complaints/change-status",
            json!({ "complaintId": complaint_id, "status": "under_investigation" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["data"]["status"], "under_investigation");

    let student = Some((student_id.as_str(), "student"));
    let response = app
        .post_json("/notifications/unread-count", student, json!({}))
        .await;
    assert_eq!(json_body(response).await["data"]["count"], 1);

    let response = app
        .post_json("/notifications", student, json!({ "withUnreadCount": true }))
        .await;
    let listed = json_body(response).await;
    assert_eq!(listed["data"]["unreadCount"], 1);
    assert_eq!(
        listed["data"]["notifications"][0]["url"],
        format!("/complaints/{complaint_id}")
    );

    // Opening the complaint reads its notifications
    app.post_json(
        "/complaints/show",
        student,
        json!({ "complaintId": complaint_id }),
    )
    .await;
    let response = app
        .post_json("/notifications/unread-count", student, json!({}))
        .await;
    assert_eq!(json_body(response).await["data"]["count"], 0);
}

#[tokio::test]
async fn test_respond_moves_to_answered() {
    let app = TestApp::new().await;
    let student_id = app.student().await;
    let complaint_id = app.file_complaint(&student_id, "Noise").await;

    let response = app
        .as_staff(
            "/complaints/respond",
            json!({ "complaintId": complaint_id, "text": "We are on it" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["data"]["status"], "answered");

    let response = app
        .as_staff(
            "/complaints/respond",
            json!({ "complaintId": complaint_id, "text": "  " }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_third_false_report_blocks_student() {
    let app = TestApp::new().await;
    let student_id = app.student().await;

    for title in ["First", "Second", "Third"] {
        let complaint_id = app.file_complaint(&student_id, title).await;
        let response = app
            .as_staff(
                "/complaints/mark-as-false",
                json!({ "complaintId": complaint_id }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["data"]["isFalse"], true);
        assert_eq!(body["data"]["status"], "rejected_false");
    }

    let body = multipart_body(
        &[
            ("schoolId", app.school_id.as_str()),
            ("title", "Fourth"),
            ("description", "Another one"),
            ("category", "other"),
        ],
        &[],
    );
    let response = app.send(multipart_request(&student_id, body)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_dashboard_requires_staff() {
    let app = TestApp::new().await;
    let student_id = app.student().await;

    let response = app
        .post_json(
            "/dashboard/summary",
            Some((student_id.as_str(), "student")),
            json!({ "year": 2024 }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.as_staff("/dashboard/summary", json!({ "year": 2024 })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let summary = json_body(response).await;
    assert_eq!(summary["data"]["total"], 0);
    assert_eq!(summary["data"]["meanResolutionDisplay"], "N/A");
    assert_eq!(summary["data"]["monthly"]["created"].as_array().unwrap().len(), 12);
}

#[tokio::test]
async fn test_monthly_rejects_out_of_range_year() {
    let app = TestApp::new().await;
    let response = app.as_staff("/dashboard/monthly", json!({ "year": 12000 })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_csv_export() {
    let app = TestApp::new().await;
    let student_id = app.student().await;
    app.file_complaint(&student_id, "Noise").await;

    let response = app.as_staff("/dashboard/export/csv", json!({ "year": 2024 })).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"complaints_2024.csv\""
    );

    let text = String::from_utf8(body_bytes(response).await).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("Month;Created;Resolved;FalseReports;MeanHours")
    );
    assert_eq!(lines.next(), Some("Jan;0;0;0;0.00"));
    assert_eq!(text.lines().count(), 13);
}

#[tokio::test]
async fn test_xlsx_export() {
    let app = TestApp::new().await;

    let response = app.as_staff("/dashboard/export/xlsx", json!({ "year": 2024 })).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );

    // xlsx files are zip archives
    let bytes = body_bytes(response).await;
    assert_eq!(&bytes[..2], b"PK");
}
