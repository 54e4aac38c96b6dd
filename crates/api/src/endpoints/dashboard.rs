//! Dashboard and report export endpoints. Staff only.

use axum::{
    Json, Router,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::{Datelike, Utc};
use farol_common::AppResult;
use farol_core::{
    DashboardSummary, MonthlyStats,
    report_export::{
        CSV_CONTENT_TYPE, XLSX_CONTENT_TYPE, csv_file_name, render_csv, render_xlsx,
        xlsx_file_name,
    },
};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Request selecting a calendar year. Defaults to the current one.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearRequest {
    pub year: Option<i32>,
}

impl YearRequest {
    fn year(&self) -> i32 {
        self.year.unwrap_or_else(|| Utc::now().year())
    }
}

/// Mean resolution time response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeanResolutionResponse {
    pub hours: Option<f64>,
    pub display: String,
}

/// Headline numbers, status breakdown and monthly series.
async fn summary(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<YearRequest>,
) -> AppResult<ApiResponse<DashboardSummary>> {
    user.require_staff()?;
    let summary = state
        .analytics_service
        .dashboard(req.year(), Utc::now())
        .await?;
    Ok(ApiResponse::ok(summary))
}

/// Monthly series for one year.
async fn monthly(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<YearRequest>,
) -> AppResult<ApiResponse<MonthlyStats>> {
    user.require_staff()?;
    let stats = state.analytics_service.monthly_stats(req.year()).await?;
    Ok(ApiResponse::ok(stats))
}

/// Mean resolution time over every closed complaint.
async fn mean_resolution(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<MeanResolutionResponse>> {
    user.require_staff()?;
    let hours = state.analytics_service.overall_mean_hours().await?;
    Ok(ApiResponse::ok(MeanResolutionResponse {
        hours,
        display: farol_core::analytics::format_duration(hours),
    }))
}

fn file_response(content_type: &'static str, file_name: &str, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    )
        .into_response()
}

/// Monthly series as a semicolon-separated file.
async fn export_csv(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<YearRequest>,
) -> AppResult<Response> {
    user.require_staff()?;
    let year = req.year();
    let stats = state.analytics_service.monthly_stats(year).await?;
    Ok(file_response(
        CSV_CONTENT_TYPE,
        &csv_file_name(year),
        render_csv(&stats).into_bytes(),
    ))
}

/// Monthly series as an `.xlsx` workbook.
async fn export_xlsx(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<YearRequest>,
) -> AppResult<Response> {
    user.require_staff()?;
    let year = req.year();
    let stats = state.analytics_service.monthly_stats(year).await?;
    let workbook = render_xlsx(&stats)?;
    tracing::debug!(year, bytes = workbook.len(), "Rendered spreadsheet export");
    Ok(file_response(XLSX_CONTENT_TYPE, &xlsx_file_name(year), workbook))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/summary", post(summary))
        .route("/monthly", post(monthly))
        .route("/mean-resolution", post(mean_resolution))
        .route("/export/csv", post(export_csv))
        .route("/export/xlsx", post(export_xlsx))
}
