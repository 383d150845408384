//! Handler for the PDF export endpoint.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use validator::Validate;

use crate::api::dto::export::{ExportPdfRequest, PdfResponse};
use crate::application::services::export_service::MISSING_URL;
use crate::error::AppError;
use crate::state::AppState;

pub const INVALID_BODY: &str = "Invalid request body";

/// Renders the requested page and returns it as a PDF download.
///
/// # Endpoint
///
/// `POST /exportPdf` (also served at `POST /api/exportPdf`)
///
/// # Request Body
///
/// ```json
/// { "url": "https://app.example.com/dashboard" }
/// ```
///
/// # Response
///
/// - **200 OK**: `application/pdf` body with
///   `Content-Disposition: attachment; filename=neonest-data.pdf`
/// - **400 Bad Request**: `Missing URL`, `Invalid URL` or `Invalid request body`
/// - **503 Service Unavailable**: every export slot is busy
/// - **500 Internal Server Error**: `Failed to generate PDF`
///
/// All error bodies are plain text.
pub async fn export_pdf_handler(
    State(state): State<AppState>,
    payload: Result<Json<ExportPdfRequest>, JsonRejection>,
) -> Result<PdfResponse, AppError> {
    let Json(payload) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected export request body");
        AppError::bad_request(INVALID_BODY)
    })?;

    let target_url = payload
        .target_url()
        .ok_or_else(|| AppError::bad_request(MISSING_URL))?;

    payload.validate()?;

    let document = state.export_service.export(Some(target_url)).await?;

    Ok(PdfResponse(document))
}
