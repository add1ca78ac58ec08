//! HTTP API for the Gratuity Engine.
//!
//! This module exposes the engine over a small REST API built with
//! [`axum`](https://crates.io/crates/axum).  Clients may evaluate a
//! single employee, a JSON table of raw rows, or an uploaded CSV file.
//! Per-row problems are returned inside a successful batch response;
//! only input-level failures produce an error status.

use crate::config::ServerConfig;
use crate::engine::{evaluate, evaluate_batch};
use crate::error::{BatchInputError, ValidationError};
use crate::models::{BatchResult, CalculationResult, EmployeeRecord};
use crate::table::{detect_format, parse_csv, RawRow, TableFormat};
use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, JsonRejection};
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

/// Header carrying the uploaded file's name, used for format detection.
pub const FILE_NAME_HEADER: &str = "x-file-name";

/// Body of `POST /api/calculator/bulk`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkRequest {
    pub rows: Vec<RawRow>,
}

/// Build the API router.  The configured upload limit applies to every
/// request body.
pub fn build_router(config: &ServerConfig) -> Router {
    Router::new()
        .route("/api/calculator/individual", post(individual_handler))
        .route("/api/calculator/bulk", post(bulk_handler))
        .route("/api/calculator/bulk/upload", post(upload_handler))
        .route("/api/health", get(health_handler))
        .route("/api/health/version", get(version_handler))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
}

/// Launch the API server on the configured address.  Runs until the
/// server terminates.
pub async fn serve(config: &ServerConfig) -> Result<()> {
    let router = build_router(config);
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "server listening");
    axum::serve(listener, router)
        .await
        .context("server terminated unexpectedly")
}

/// Handler for POST /api/calculator/individual
async fn individual_handler(
    payload: Result<Json<EmployeeRecord>, JsonRejection>,
) -> Result<Json<CalculationResult>, ApiError> {
    let Json(record) = payload?;
    let result = evaluate(&record)?;
    info!(
        eligible = result.is_eligible,
        years = result.years_of_service,
        "individual gratuity evaluated"
    );
    Ok(Json(result))
}

/// Handler for POST /api/calculator/bulk
async fn bulk_handler(
    payload: Result<Json<BulkRequest>, JsonRejection>,
) -> Result<Json<BatchResult>, ApiError> {
    let Json(request) = payload?;
    run_batch(request.rows).await
}

/// Handler for POST /api/calculator/bulk/upload
async fn upload_handler(
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<BatchResult>, ApiError> {
    let file_name = header_text(&headers, FILE_NAME_HEADER);
    let content_type = header_text(&headers, header::CONTENT_TYPE.as_str());
    let body = body?;

    let rows = match detect_format(file_name, content_type)? {
        TableFormat::Csv => parse_csv(&body)?,
    };
    info!(
        file = file_name.unwrap_or("<unnamed>"),
        bytes = body.len(),
        rows = rows.len(),
        "table uploaded"
    );
    run_batch(rows).await
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "success": true, "message": "API is healthy" }))
}

async fn version_handler() -> Json<serde_json::Value> {
    Json(json!({
        "name": "Gratuity Engine",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Statutory gratuity eligibility and payout calculation",
    }))
}

async fn run_batch(rows: Vec<RawRow>) -> Result<Json<BatchResult>, ApiError> {
    let batch = tokio::task::spawn_blocking(move || evaluate_batch(&rows))
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))??;
    Ok(Json(batch))
}

fn header_text<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Errors surfaced to HTTP clients.
#[derive(Debug)]
pub enum ApiError {
    Validation(ValidationError),
    BatchInput(BatchInputError),
    /// The request body could not be read or decoded.
    Payload { status: StatusCode, message: String },
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BatchInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Payload { status, .. } => *status,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::BatchInput(_) => "BATCH_INPUT_ERROR",
            ApiError::Payload { status, .. } if *status == StatusCode::PAYLOAD_TOO_LARGE => {
                "PAYLOAD_TOO_LARGE"
            }
            ApiError::Payload { .. } => "INVALID_PAYLOAD",
            ApiError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Validation(err) => err.to_string(),
            ApiError::BatchInput(err) => err.to_string(),
            ApiError::Payload { message, .. } | ApiError::Internal(message) => message.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();
        warn!(status = status.as_u16(), %message, "request rejected");
        let body = Json(json!({
            "error": {
                "status_code": status.as_u16(),
                "code": self.code(),
                "message": message,
            }
        }));
        (status, body).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<BatchInputError> for ApiError {
    fn from(value: BatchInputError) -> Self {
        Self::BatchInput(value)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::Payload {
            status: value.status(),
            message: value.body_text(),
        }
    }
}

impl From<BytesRejection> for ApiError {
    fn from(value: BytesRejection) -> Self {
        Self::Payload {
            status: value.status(),
            message: value.body_text(),
        }
    }
}
