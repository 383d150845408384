//! API route configuration.
//!
//! Export routes are public: the web app calls them from the user's browser
//! without credentials. They are rate limited by the top-level router.

use crate::api::handlers::export_pdf_handler;
use crate::state::AppState;
use axum::{Router, routing::post};
use tower_http::limit::RequestBodyLimitLayer;

/// Largest accepted export request body; the payload is a single URL.
pub const MAX_EXPORT_BODY_BYTES: usize = 16 * 1024;

/// PDF export routes.
///
/// # Endpoints
///
/// - `POST /exportPdf`     - Render a URL to PDF
/// - `POST /api/exportPdf` - Same handler at the web app's route path
pub fn export_routes() -> Router<AppState> {
    Router::new()
        .route("/exportPdf", post(export_pdf_handler))
        .route("/api/exportPdf", post(export_pdf_handler))
        .layer(RequestBodyLimitLayer::new(MAX_EXPORT_BODY_BYTES))
}
