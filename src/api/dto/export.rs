//! DTOs for the PDF export endpoint.

use axum::{
    body::Body,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use validator::Validate;

use crate::domain::PdfDocument;

/// Request to export a page as PDF.
///
/// `url` is optional at the JSON level so that `{}` reaches the handler and
/// is reported as a missing URL rather than a body error.
#[derive(Debug, Deserialize, Validate)]
pub struct ExportPdfRequest {
    /// Absolute URL of the page to render.
    #[validate(url(message = "Invalid URL"))]
    pub url: Option<String>,
}

impl ExportPdfRequest {
    /// The requested URL, or `None` when absent or blank.
    pub fn target_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.trim().is_empty())
    }
}

/// Binary PDF download response.
#[derive(Debug)]
pub struct PdfResponse(pub PdfDocument);

impl IntoResponse for PdfResponse {
    fn into_response(self) -> Response {
        let document = self.0;
        let disposition = document.content_disposition();

        (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, document.content_type().to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            Body::from(document.bytes),
        )
            .into_response()
    }
}
