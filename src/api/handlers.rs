//! API request handlers
//!
//! Every dashboard handler takes a `multipart/form-data` upload: a `file`
//! part (bytes plus filename) and an optional `filters` part holding a JSON
//! filter selection. The full pipeline runs again on each request.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::core::{pipeline, ColumnMatch, Dashboard, DateRange, FilterChoices};
use crate::error::SalesboardError;
use crate::types::{Binding, FilterSelection};
use crate::writer::{self, FILTERED_DATA_FILENAME};

use super::server::AppState;

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            request_id: Uuid::new_v4().to_string(),
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Failed request: status plus the message placed in the envelope
type ApiError = (StatusCode, String);

fn status_for(err: &SalesboardError) -> StatusCode {
    match err {
        SalesboardError::Io(e) if e.kind() == std::io::ErrorKind::NotFound => StatusCode::NOT_FOUND,
        SalesboardError::Decode(_) => StatusCode::UNPROCESSABLE_ENTITY,
        SalesboardError::Validation(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response((status, message): ApiError) -> Response {
    (status, Json(ApiResponse::<()>::err(message))).into_response()
}

fn bad_request(message: impl Into<String>) -> ApiError {
    (StatusCode::BAD_REQUEST, message.into())
}

/// Uploaded sales file and the filters to apply to it
pub struct Upload {
    pub filename: String,
    pub bytes: Bytes,
    pub filters: FilterSelection,
}

impl Upload {
    /// Collect the `file` and `filters` parts; unknown parts are ignored
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut file = None;
        let mut filters = FilterSelection::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| bad_request(format!("Invalid upload: {}", e)))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => {
                    let filename = field.file_name().unwrap_or_default().to_string();
                    if filename.is_empty() {
                        return Err(bad_request("Uploaded file has no filename"));
                    }
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| bad_request(format!("Invalid upload: {}", e)))?;
                    file = Some((filename, bytes));
                }
                "filters" => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| bad_request(format!("Invalid upload: {}", e)))?;
                    if !text.trim().is_empty() {
                        filters = serde_json::from_str(&text)
                            .map_err(|e| bad_request(format!("Invalid filters: {}", e)))?;
                    }
                }
                _ => {}
            }
        }

        let (filename, bytes) = file.ok_or_else(|| bad_request("Missing 'file' upload part"))?;
        Ok(Self {
            filename,
            bytes,
            filters,
        })
    }
}

/// Run the synchronous pipeline off the async runtime
async fn build_dashboard(upload: Upload) -> Result<Dashboard, ApiError> {
    let result = tokio::task::spawn_blocking(move || {
        pipeline::run(&upload.bytes, &upload.filename, &upload.filters)
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Pipeline task failed: {}", e)))?;

    result.map_err(|e| {
        warn!(error = %e, "pipeline failed");
        (status_for(&e), e.to_string())
    })
}

/// Read the upload, then build its dashboard
async fn dashboard_for(multipart: Multipart) -> Result<(String, Dashboard), ApiError> {
    let upload = Upload::read(multipart).await?;
    let filename = upload.filename.clone();
    debug!(file = %filename, bytes = upload.bytes.len(), "upload received");
    Ok((filename, build_dashboard(upload).await?))
}

/// Root endpoint response
#[derive(Serialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Serialize)]
pub struct EndpointInfo {
    pub path: String,
    pub method: String,
    pub description: String,
}

fn endpoint(path: &str, method: &str, description: &str) -> EndpointInfo {
    EndpointInfo {
        path: path.to_string(),
        method: method.to_string(),
        description: description.to_string(),
    }
}

/// GET / - Root info
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = RootResponse {
        name: "Salesboard API Server".to_string(),
        version: state.version.clone(),
        description: "Sales dashboard over uploaded CSV and spreadsheet files".to_string(),
        endpoints: vec![
            endpoint("/health", "GET", "Health check endpoint"),
            endpoint("/version", "GET", "Get server version"),
            endpoint(
                "/api/v1/columns",
                "POST",
                "Detected columns and filter choices for an uploaded file",
            ),
            endpoint(
                "/api/v1/dashboard",
                "POST",
                "KPIs and charts for an uploaded file",
            ),
            endpoint(
                "/api/v1/export",
                "POST",
                "Filtered rows as Filtered_Data.csv",
            ),
        ],
    };
    Json(ApiResponse::ok(response))
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// GET /health - Health check
pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
    }))
}

/// Version response
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub features: Vec<String>,
}

/// GET /version - Server version
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(VersionResponse {
        version: state.version.clone(),
        features: vec![
            "columns".to_string(),
            "dashboard".to_string(),
            "export".to_string(),
        ],
    }))
}

/// Columns response
#[derive(Serialize)]
pub struct ColumnsResponse {
    pub filename: String,
    pub binding: Binding,
    pub columns: Vec<ColumnMatch>,
    pub choices: FilterChoices,
    pub date_range: Option<DateRange>,
    pub total_rows: usize,
}

/// POST /api/v1/columns - Detected columns and filter choices
pub async fn columns(multipart: Multipart) -> Response {
    match dashboard_for(multipart).await {
        Ok((filename, dashboard)) => Json(ApiResponse::ok(ColumnsResponse {
            filename,
            binding: dashboard.binding,
            columns: dashboard.columns,
            choices: dashboard.choices,
            date_range: dashboard.date_range,
            total_rows: dashboard.total_rows,
        }))
        .into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/v1/dashboard - Full dashboard for the current filters
pub async fn dashboard(multipart: Multipart) -> Response {
    match dashboard_for(multipart).await {
        Ok((_, dashboard)) => Json(ApiResponse::ok(dashboard)).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/v1/export - Filtered rows as a CSV download
pub async fn export(multipart: Multipart) -> Response {
    let dashboard = match dashboard_for(multipart).await {
        Ok((_, dashboard)) => dashboard,
        Err(e) => return error_response(e),
    };

    match writer::csv_bytes(&dashboard.filtered) {
        Ok(body) => (
            [
                (header::CONTENT_TYPE, "text/csv".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", FILTERED_DATA_FILENAME),
                ),
            ],
            body,
        )
            .into_response(),
        Err(e) => error_response((status_for(&e), e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_response_ok() {
        let response = ApiResponse::ok("data");
        assert!(response.success);
        assert_eq!(response.data, Some("data"));
        assert!(response.error.is_none());
        assert!(Uuid::parse_str(&response.request_id).is_ok());
    }

    #[test]
    fn test_api_response_err_serialization() {
        let response = ApiResponse::<()>::err("boom");
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "boom");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_request_ids_are_unique() {
        let a = ApiResponse::ok(1);
        let b = ApiResponse::ok(1);
        assert_ne!(a.request_id, b.request_id);
    }

    #[test]
    fn test_filters_part_deserializes_selection() {
        let filters: FilterSelection =
            serde_json::from_str(r#"{"regions": ["East"], "start": "2023-01-01"}"#).unwrap();
        assert_eq!(filters.regions, ["East"]);
        assert!(filters.cities.is_empty());
        assert_eq!(filters.start, chrono::NaiveDate::from_ymd_opt(2023, 1, 1));
    }

    #[test]
    fn test_status_for_errors() {
        let missing = SalesboardError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "gone",
        ));
        assert_eq!(status_for(&missing), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(&SalesboardError::Decode("undetected delimiter".to_string())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
