//! # NeoNest PDF Export
//!
//! Server-side "Download PDF" for the NeoNest baby-care web app: a page URL
//! comes in, a headless Chromium renders it once the network has settled,
//! and the PDF goes back as an attachment.
//!
//! ## Architecture
//!
//! - **Domain Layer** ([`domain`]) - Document model, renderer trait, network-idle heuristic
//! - **Application Layer** ([`application`]) - Export service: validation, bounded concurrency, deadlines
//! - **Infrastructure Layer** ([`infrastructure`]) - Chromium renderer and scoped browser sessions
//! - **API Layer** ([`api`]) - HTTP handlers, DTOs, and middleware
//!
//! ## Quick Start
//!
//! ```bash
//! # Use the system Chromium with sandboxing flags
//! export BROWSER_ENV="hosted"
//!
//! cargo run
//!
//! curl -X POST localhost:3000/exportPdf \
//!   -H 'content-type: application/json' \
//!   -d '{"url": "https://example.com"}' -o neonest-data.pdf
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;

pub mod config;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::ExportService;
    pub use crate::config::{BrowserEnvironment, Config, ExportSettings, RendererSettings};
    pub use crate::domain::{PaperFormat, PdfDocument, PdfOptions, PdfRenderer, RenderError};
    pub use crate::error::AppError;
    pub use crate::infrastructure::browser::ChromeRenderer;
    pub use crate::state::AppState;
}
