//! Rendering engine abstraction.

use async_trait::async_trait;
use std::time::Duration;
use url::Url;

use crate::domain::document::PdfOptions;

/// Failures raised while turning a URL into PDF bytes.
///
/// These carry operator-facing detail and are logged, never returned to HTTP
/// callers verbatim.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("failed to open page: {0}")]
    Page(String),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("failed to print page: {0}")]
    Print(String),

    #[error("rendering timed out after {0:?}")]
    Timeout(Duration),

    #[error("renderer returned data without a PDF signature")]
    InvalidOutput,
}

/// Renders a web page into a PDF document.
///
/// Implementations own any OS resources they acquire and must release them
/// before `render` returns, on success and on failure.
///
/// # Implementations
///
/// - [`crate::infrastructure::browser::ChromeRenderer`] - headless Chrome/Chromium
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    /// Loads `url`, waits for the network to settle and prints it.
    async fn render(&self, url: &Url, options: &PdfOptions) -> Result<Vec<u8>, RenderError>;

    /// Reports whether the engine looks usable without rendering anything.
    async fn health_check(&self) -> bool;

    /// Short human-readable description for logs and health output.
    fn describe(&self) -> String;
}
