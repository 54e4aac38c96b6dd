//! Complaint endpoints.

use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    routing::post,
};
use farol_common::{AppError, AppResult};
use farol_core::{
    ComplaintOutcome, CreateComplaintInput, EditComplaintInput, NewAttachment, StatusPolicy,
    WitnessInput,
};
use farol_db::{
    entities::{
        attachment, complaint, complaint::ComplaintStatus, response, status_log, witness,
    },
    repositories::{ComplaintDetails, ComplaintFilter},
};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

// ========== Responses ==========

/// Complaint response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintResponse {
    pub id: String,
    pub created_at: String,
    pub updated_at: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub status: ComplaintStatus,
    pub status_label: String,
    pub is_anonymous: bool,
    pub is_false: bool,
    pub student_id: Option<String>,
    pub school_id: String,
    pub version: i32,
}

impl ComplaintResponse {
    fn new(c: complaint::Model, policy: &StatusPolicy) -> Self {
        Self {
            status_label: policy.label(c.status).to_string(),
            id: c.id,
            created_at: c.created_at.to_rfc3339(),
            updated_at: c.updated_at.to_rfc3339(),
            title: c.title,
            description: c.description,
            category: c.category,
            status: c.status,
            is_anonymous: c.is_anonymous,
            is_false: c.is_false,
            student_id: c.student_id,
            school_id: c.school_id,
            version: c.version,
        }
    }
}

/// Attachment response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentResponse {
    pub id: String,
    pub created_at: String,
    pub name: String,
    pub url: String,
    pub content_type: String,
    pub size: i64,
    pub md5: String,
}

impl From<attachment::Model> for AttachmentResponse {
    fn from(a: attachment::Model) -> Self {
        Self {
            id: a.id,
            created_at: a.created_at.to_rfc3339(),
            name: a.original_name,
            url: a.url,
            content_type: a.content_type,
            size: a.size,
            md5: a.md5,
        }
    }
}

/// Staff response on a complaint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffReplyResponse {
    pub id: String,
    pub created_at: String,
    pub staff_id: String,
    pub text: String,
}

impl From<response::Model> for StaffReplyResponse {
    fn from(r: response::Model) -> Self {
        Self {
            id: r.id,
            created_at: r.created_at.to_rfc3339(),
            staff_id: r.staff_id,
            text: r.body,
        }
    }
}

/// Witness response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WitnessResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl From<witness::Model> for WitnessResponse {
    fn from(w: witness::Model) -> Self {
        Self {
            id: w.id,
            name: w.name,
            phone: w.phone,
        }
    }
}

/// Status history entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusLogResponse {
    pub created_at: String,
    pub previous_status: Option<ComplaintStatus>,
    pub new_status: ComplaintStatus,
    pub actor_id: String,
    pub actor_role: String,
}

impl From<status_log::Model> for StatusLogResponse {
    fn from(l: status_log::Model) -> Self {
        Self {
            created_at: l.created_at.to_rfc3339(),
            previous_status: l.previous_status,
            new_status: l.new_status,
            actor_id: l.actor_id,
            actor_role: l.actor_role.as_str().to_string(),
        }
    }
}

/// Complaint with its child records.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintDetailsResponse {
    #[serde(flatten)]
    pub complaint: ComplaintResponse,
    pub attachments: Vec<AttachmentResponse>,
    pub responses: Vec<StaffReplyResponse>,
    pub witnesses: Vec<WitnessResponse>,
    pub status_log: Vec<StatusLogResponse>,
}

impl ComplaintDetailsResponse {
    fn new(d: ComplaintDetails, policy: &StatusPolicy) -> Self {
        Self {
            complaint: ComplaintResponse::new(d.complaint, policy),
            attachments: d.attachments.into_iter().map(Into::into).collect(),
            responses: d.responses.into_iter().map(Into::into).collect(),
            witnesses: d.witnesses.into_iter().map(Into::into).collect(),
            status_log: d.status_log.into_iter().map(Into::into).collect(),
        }
    }
}

/// Create or edit result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintWriteResponse {
    #[serde(flatten)]
    pub complaint: ComplaintResponse,
    pub attachments: Vec<AttachmentResponse>,
}

fn write_response(
    outcome: ComplaintOutcome,
    policy: &StatusPolicy,
) -> ApiResponse<ComplaintWriteResponse> {
    let warnings = outcome
        .failed_uploads
        .iter()
        .map(|f| format!("{}: {}", f.file_name, f.reason))
        .collect();
    ApiResponse::with_warnings(
        ComplaintWriteResponse {
            complaint: ComplaintResponse::new(outcome.complaint, policy),
            attachments: outcome.attachments.into_iter().map(Into::into).collect(),
        },
        warnings,
    )
}

// ========== Multipart form ==========

/// Witness as sent in the `witnesses` form field.
#[derive(Debug, Deserialize)]
struct WitnessForm {
    name: String,
    #[serde(default)]
    phone: Option<String>,
}

/// Text fields and files of a complaint form.
#[derive(Debug, Default)]
struct ComplaintForm {
    fields: HashMap<String, String>,
    files: Vec<NewAttachment>,
}

impl ComplaintForm {
    async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let name = field.name().unwrap_or("").to_string();

            if name == "file" || name == "files" {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?
                    .to_vec();
                // Browsers send an empty part when no file was picked
                if data.is_empty() && file_name.is_empty() {
                    continue;
                }
                form.files.push(NewAttachment {
                    file_name: if file_name.is_empty() {
                        "unnamed".to_string()
                    } else {
                        file_name
                    },
                    content_type,
                    data,
                });
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                form.fields.insert(name, text);
            }
        }

        Ok(form)
    }

    fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }

    fn flag(&self, name: &str) -> Option<bool> {
        self.fields
            .get(name)
            .map(|v| matches!(v.trim(), "true" | "1" | "on"))
    }

    fn witnesses(&self) -> AppResult<Option<Vec<WitnessInput>>> {
        let Some(raw) = self.fields.get("witnesses") else {
            return Ok(None);
        };
        if raw.trim().is_empty() {
            return Ok(Some(Vec::new()));
        }
        let parsed: Vec<WitnessForm> = serde_json::from_str(raw)
            .map_err(|e| AppError::BadRequest(format!("Invalid witnesses: {e}")))?;
        Ok(Some(
            parsed
                .into_iter()
                .map(|w| WitnessInput {
                    name: w.name,
                    phone: w.phone,
                })
                .collect(),
        ))
    }

    fn status(&self) -> AppResult<Option<ComplaintStatus>> {
        self.fields
            .get("status")
            .filter(|v| !v.trim().is_empty())
            .map(|v| v.parse::<ComplaintStatus>().map_err(AppError::BadRequest))
            .transpose()
    }
}

// ========== Lifecycle ==========

/// File a complaint (multipart form).
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<ApiResponse<ComplaintWriteResponse>> {
    let form = ComplaintForm::read(multipart).await?;
    let witnesses = form.witnesses()?.unwrap_or_default();

    let input = CreateComplaintInput {
        school_id: form.text("schoolId").unwrap_or_default(),
        title: form.text("title").unwrap_or_default(),
        description: form.text("description").unwrap_or_default(),
        category: form.text("category").unwrap_or_default(),
        is_anonymous: form.flag("isAnonymous").unwrap_or(false),
        witnesses,
        attachments: form.files,
    };

    let outcome = state.complaint_service.create(&user, input).await?;
    Ok(write_response(outcome, state.complaint_service.policy()))
}

/// Edit a complaint (multipart form).
async fn edit(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<ApiResponse<ComplaintWriteResponse>> {
    let form = ComplaintForm::read(multipart).await?;
    let complaint_id = form
        .text("complaintId")
        .ok_or_else(|| AppError::BadRequest("complaintId is required".to_string()))?;

    let input = EditComplaintInput {
        title: form.text("title"),
        description: form.text("description"),
        category: form.text("category"),
        is_anonymous: form.flag("isAnonymous"),
        witnesses: form.witnesses()?,
        // An empty value clears the owner
        student_id: form
            .text("studentId")
            .map(|v| Some(v).filter(|v| !v.trim().is_empty())),
        status: form.status()?,
        attachments: form.files,
    };

    let outcome = state
        .complaint_service
        .edit(&complaint_id, &user, input)
        .await?;
    Ok(write_response(outcome, state.complaint_service.policy()))
}

/// Change status request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeStatusRequest {
    pub complaint_id: String,
    pub status: ComplaintStatus,
}

/// Move a complaint to another status.
async fn change_status(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ChangeStatusRequest>,
) -> AppResult<ApiResponse<ComplaintResponse>> {
    let complaint = state
        .complaint_service
        .change_status(&req.complaint_id, &user, req.status)
        .await?;
    Ok(ApiResponse::ok(ComplaintResponse::new(
        complaint,
        state.complaint_service.policy(),
    )))
}

/// Respond request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondRequest {
    pub complaint_id: String,
    pub text: String,
}

/// Post a staff response.
async fn respond(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<RespondRequest>,
) -> AppResult<ApiResponse<ComplaintResponse>> {
    let complaint = state
        .complaint_service
        .respond(&req.complaint_id, &user, &req.text)
        .await?;
    Ok(ApiResponse::ok(ComplaintResponse::new(
        complaint,
        state.complaint_service.policy(),
    )))
}

/// Request naming a single complaint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintIdRequest {
    pub complaint_id: String,
}

/// Reject a complaint as a false report.
async fn mark_as_false(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ComplaintIdRequest>,
) -> AppResult<ApiResponse<ComplaintResponse>> {
    let complaint = state
        .complaint_service
        .mark_as_false(&req.complaint_id, &user)
        .await?;
    Ok(ApiResponse::ok(ComplaintResponse::new(
        complaint,
        state.complaint_service.policy(),
    )))
}

/// Delete a complaint.
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ComplaintIdRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .complaint_service
        .delete(&req.complaint_id, &user)
        .await?;
    Ok(ApiResponse::ok(()))
}

// ========== Queries ==========

/// List complaints request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListComplaintsRequest {
    pub status: Option<ComplaintStatus>,
    pub category: Option<String>,
    pub school_id: Option<String>,
    pub student_id: Option<String>,
    pub search: Option<String>,
    /// Maximum results (default: 20, max: 100)
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Staff listing of complaints.
async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListComplaintsRequest>,
) -> AppResult<ApiResponse<Vec<ComplaintResponse>>> {
    let filter = ComplaintFilter {
        status: req.status,
        category: req.category,
        school_id: req.school_id,
        student_id: req.student_id,
        search: req.search,
    };
    let complaints = state
        .complaint_service
        .list(&user, &filter, req.limit, req.offset)
        .await?;
    let policy = state.complaint_service.policy();
    Ok(ApiResponse::ok(
        complaints
            .into_iter()
            .map(|c| ComplaintResponse::new(c, policy))
            .collect(),
    ))
}

/// The caller's own complaints.
async fn mine(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<ComplaintResponse>>> {
    let complaints = state.complaint_service.my_complaints(&user).await?;
    let policy = state.complaint_service.policy();
    Ok(ApiResponse::ok(
        complaints
            .into_iter()
            .map(|c| ComplaintResponse::new(c, policy))
            .collect(),
    ))
}

/// Categories in use.
async fn categories(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<String>>> {
    Ok(ApiResponse::ok(state.complaint_service.categories().await?))
}

/// Show a complaint with attachments, responses, witnesses and history.
async fn show(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ComplaintIdRequest>,
) -> AppResult<ApiResponse<ComplaintDetailsResponse>> {
    let details = state
        .complaint_service
        .get(&req.complaint_id, &user)
        .await?;
    Ok(ApiResponse::ok(ComplaintDetailsResponse::new(
        details,
        state.complaint_service.policy(),
    )))
}

// ========== Attachments ==========

/// Request naming a single attachment.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentIdRequest {
    pub attachment_id: String,
}

/// Download an attachment's bytes.
async fn download_attachment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<AttachmentIdRequest>,
) -> AppResult<Response> {
    let download = state
        .complaint_service
        .download_attachment(&req.attachment_id, &user)
        .await?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        download.attachment.original_name.replace('"', "")
    );
    Ok((
        [
            (header::CONTENT_TYPE, download.attachment.content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        download.data,
    )
        .into_response())
}

/// Remove an attachment.
async fn remove_attachment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<AttachmentIdRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .complaint_service
        .remove_attachment(&req.attachment_id, &user)
        .await?;
    Ok(ApiResponse::ok(()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/edit", post(edit))
        .route("/change-status", post(change_status))
        .route("/respond", post(respond))
        .route("/mark-as-false", post(mark_as_false))
        .route("/delete", post(delete))
        .route("/list", post(list))
        .route("/mine", post(mine))
        .route("/categories", post(categories))
        .route("/show", post(show))
        .route("/attachments/download", post(download_attachment))
        .route("/attachments/remove", post(remove_attachment))
}
