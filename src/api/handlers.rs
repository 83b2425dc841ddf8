use crate::export::ExportFormat;
use crate::models::FilterSpec;
use crate::service::AnalyticsService;
use axum::{
    extract::{Json, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Local;
use serde::Serialize;
use std::sync::Arc;

/// Single failure payload shape for every pipeline error. Connectivity and
/// data-shape failures render the same way for the user; the log keeps the
/// distinction.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub success: bool,
    pub row_count: usize,
}

fn failure(err: impl std::fmt::Display) -> Response {
    let response = ErrorResponse {
        success: false,
        message: format!("Error: {}", err),
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response()
}

/// Health check
pub async fn health_check() -> &'static str {
    "OK"
}

/// Sidebar filter values from the current snapshot.
pub async fn filter_options(State(service): State<Arc<AnalyticsService>>) -> Response {
    match service.filter_options().await {
        Ok(options) => (StatusCode::OK, Json(options)).into_response(),
        Err(e) => {
            tracing::error!("filter options failed: {}", e);
            failure(e)
        }
    }
}

/// One filter-and-render cycle. Zero matching rows returns 200 with
/// `row_count: 0`, never an error.
pub async fn dashboard(
    State(service): State<Arc<AnalyticsService>>,
    Json(filter): Json<FilterSpec>,
) -> Response {
    match service.dashboard(&filter).await {
        Ok(data) => (StatusCode::OK, Json(data)).into_response(),
        Err(e) => {
            tracing::error!("dashboard cycle failed: {}", e);
            failure(e)
        }
    }
}

/// Drop the extraction snapshot and pull a fresh one.
pub async fn refresh(State(service): State<Arc<AnalyticsService>>) -> Response {
    match service.refresh().await {
        Ok(row_count) => {
            let response = RefreshResponse {
                success: true,
                row_count,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            tracing::error!("snapshot refresh failed: {}", e);
            failure(e)
        }
    }
}

/// Download the filtered record set as an `.xlsx` workbook.
pub async fn export_xlsx(
    State(service): State<Arc<AnalyticsService>>,
    Json(filter): Json<FilterSpec>,
) -> Response {
    match service.export_xlsx(&filter).await {
        Ok(bytes) => download(ExportFormat::Xlsx, &bytes),
        Err(e) => {
            tracing::error!("xlsx export failed: {}", e);
            failure(e)
        }
    }
}

/// Download the filtered record set as CSV.
pub async fn export_csv(
    State(service): State<Arc<AnalyticsService>>,
    Json(filter): Json<FilterSpec>,
) -> Response {
    match service.export_csv(&filter).await {
        Ok(bytes) => download(ExportFormat::Csv, &bytes),
        Err(e) => {
            tracing::error!("csv export failed: {}", e);
            failure(e)
        }
    }
}

fn download(format: ExportFormat, bytes: &[u8]) -> Response {
    let filename = format!(
        "fiscal_report_{}.{}",
        Local::now().format("%Y%m%d_%H%M"),
        format.tag()
    );
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes.to_vec(),
    )
        .into_response()
}
