//! PDF export orchestration.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::time::timeout;
use url::Url;

use crate::config::ExportSettings;
use crate::domain::document::{PdfDocument, PdfOptions, looks_like_pdf};
use crate::domain::renderer::{PdfRenderer, RenderError};
use crate::error::AppError;

pub const MISSING_URL: &str = "Missing URL";
pub const INVALID_URL: &str = "Invalid URL";
pub const EXPORT_FAILED: &str = "Failed to generate PDF";
pub const EXPORT_BUSY: &str = "PDF export is busy, try again later";

/// Service turning page URLs into downloadable PDF documents.
///
/// Bounds the number of concurrent renders with a semaphore and applies an
/// overall deadline to each one. Input is validated before any slot or
/// browser is acquired.
pub struct ExportService {
    renderer: Arc<dyn PdfRenderer>,
    slots: Semaphore,
    settings: ExportSettings,
    options: PdfOptions,
}

impl ExportService {
    /// Creates a new export service.
    pub fn new(renderer: Arc<dyn PdfRenderer>, settings: ExportSettings, options: PdfOptions) -> Self {
        Self {
            renderer,
            slots: Semaphore::new(settings.max_concurrent),
            settings,
            options,
        }
    }

    /// Renders `target_url` into a PDF document.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL is missing, blank, not
    /// absolute or not HTTP(S). No rendering is attempted in that case.
    ///
    /// Returns [`AppError::Unavailable`] if no export slot frees up within the
    /// queue timeout.
    ///
    /// Returns [`AppError::Internal`] for any launch, navigation, print or
    /// timeout failure. Details are logged, not returned.
    pub async fn export(&self, target_url: Option<&str>) -> Result<PdfDocument, AppError> {
        let url = parse_target_url(target_url)?;

        let _permit = match timeout(self.settings.queue_timeout, self.slots.acquire()).await {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) | Err(_) => {
                metrics::counter!("pdf_exports_total", "outcome" => "busy").increment(1);
                tracing::warn!(
                    url = %url,
                    capacity = self.settings.max_concurrent,
                    "No export slot available"
                );
                return Err(AppError::unavailable(EXPORT_BUSY));
            }
        };

        let started = Instant::now();
        let outcome = match timeout(
            self.settings.export_timeout,
            self.renderer.render(&url, &self.options),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(RenderError::Timeout(self.settings.export_timeout)),
        }
        .and_then(|bytes| {
            if looks_like_pdf(&bytes) {
                Ok(bytes)
            } else {
                Err(RenderError::InvalidOutput)
            }
        });

        metrics::histogram!("pdf_export_duration_seconds").record(started.elapsed().as_secs_f64());

        match outcome {
            Ok(bytes) => {
                metrics::counter!("pdf_exports_total", "outcome" => "ok").increment(1);
                tracing::info!(
                    url = %url,
                    bytes = bytes.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "PDF generated"
                );
                Ok(PdfDocument::new(bytes, self.settings.filename.as_str()))
            }
            Err(e) => {
                metrics::counter!("pdf_exports_total", "outcome" => "failed").increment(1);
                tracing::error!(url = %url, error = %e, "PDF generation error");
                Err(AppError::internal(EXPORT_FAILED))
            }
        }
    }

    /// Number of exports that could start right now.
    pub fn available_slots(&self) -> usize {
        self.slots.available_permits()
    }

    pub fn capacity(&self) -> usize {
        self.settings.max_concurrent
    }

    pub fn renderer(&self) -> &Arc<dyn PdfRenderer> {
        &self.renderer
    }
}

/// Validates the requested URL.
///
/// Blank input is reported as missing; anything that is not an absolute
/// HTTP(S) URL with a host is reported as invalid.
pub fn parse_target_url(input: Option<&str>) -> Result<Url, AppError> {
    let raw = input
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::bad_request(MISSING_URL))?;

    let url = Url::parse(raw).map_err(|_| AppError::bad_request(INVALID_URL))?;

    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(AppError::bad_request(INVALID_URL)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BROWSER_EXIT_GRACE, BrowserEnvironment, RendererSettings};
    use crate::domain::renderer::MockPdfRenderer;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    const PDF: &[u8] = b"%PDF-1.7\n1 0 obj\n<<>>\nendobj\n%%EOF";

    fn settings(max_concurrent: usize) -> ExportSettings {
        ExportSettings {
            max_concurrent,
            ..ExportSettings::default()
        }
    }

    fn service(renderer: impl PdfRenderer + 'static, max_concurrent: usize) -> ExportService {
        ExportService::new(
            Arc::new(renderer),
            settings(max_concurrent),
            PdfOptions::default(),
        )
    }

    /// Sleeps before answering and records peak concurrency.
    struct SlowRenderer {
        delay: Duration,
        running: AtomicUsize,
        peak: AtomicUsize,
    }

    impl SlowRenderer {
        fn new(delay: Duration) -> Self {
            Self {
                delay,
                running: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PdfRenderer for SlowRenderer {
        async fn render(&self, _url: &Url, _options: &PdfOptions) -> Result<Vec<u8>, RenderError> {
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.running.fetch_sub(1, Ordering::SeqCst);
            Ok(PDF.to_vec())
        }

        async fn health_check(&self) -> bool {
            true
        }

        fn describe(&self) -> String {
            "slow".to_string()
        }
    }

    #[tokio::test]
    async fn test_missing_url_skips_rendering() {
        let mut renderer = MockPdfRenderer::new();
        renderer.expect_render().times(0);

        let service = service(renderer, 4);

        for input in [None, Some(""), Some("   ")] {
            let err = service.export(input).await.unwrap_err();
            assert!(matches!(err, AppError::Validation { ref message } if message == MISSING_URL));
        }

        assert_eq!(service.available_slots(), 4);
    }

    #[tokio::test]
    async fn test_invalid_url_skips_rendering() {
        let mut renderer = MockPdfRenderer::new();
        renderer.expect_render().times(0);

        let service = service(renderer, 4);

        for input in ["not a url", "/relative/path", "ftp://example.com/file", "file:///etc/passwd"] {
            let err = service.export(Some(input)).await.unwrap_err();
            assert!(
                matches!(err, AppError::Validation { ref message } if message == INVALID_URL),
                "expected invalid URL for {input}"
            );
        }
    }

    #[tokio::test]
    async fn test_export_success() {
        let mut renderer = MockPdfRenderer::new();
        renderer
            .expect_render()
            .withf(|url, options| {
                url.as_str() == "https://example.com/" && options.print_background
            })
            .times(1)
            .returning(|_, _| Ok(PDF.to_vec()));

        let service = service(renderer, 4);

        let document = service.export(Some("https://example.com")).await.unwrap();

        assert_eq!(document.filename, "neonest-data.pdf");
        assert_eq!(document.content_type(), "application/pdf");
        assert!(document.bytes.starts_with(b"%PDF-1."));
        assert_eq!(service.available_slots(), 4);
    }

    #[tokio::test]
    async fn test_render_failure_is_opaque() {
        let mut renderer = MockPdfRenderer::new();
        renderer.expect_render().times(1).returning(|url, _| {
            Err(RenderError::Navigation {
                url: url.to_string(),
                reason: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            })
        });

        let service = service(renderer, 4);

        let err = service
            .export(Some("https://unreachable.invalid"))
            .await
            .unwrap_err();

        match err {
            AppError::Internal { message } => {
                assert_eq!(message, EXPORT_FAILED);
                assert!(!message.contains("ERR_NAME_NOT_RESOLVED"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(service.available_slots(), 4);
    }

    #[tokio::test]
    async fn test_non_pdf_output_is_rejected() {
        let mut renderer = MockPdfRenderer::new();
        renderer
            .expect_render()
            .times(1)
            .returning(|_, _| Ok(b"<html></html>".to_vec()));

        let service = service(renderer, 4);

        let err = service.export(Some("https://example.com")).await.unwrap_err();
        assert!(matches!(err, AppError::Internal { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_export_timeout() {
        let service = ExportService::new(
            Arc::new(SlowRenderer::new(Duration::from_secs(300))),
            settings(2),
            PdfOptions::default(),
        );

        let err = service.export(Some("https://slow.example.com")).await.unwrap_err();

        assert!(matches!(err, AppError::Internal { ref message } if message == EXPORT_FAILED));
        assert_eq!(service.available_slots(), 2);
    }

    /// Mirrors a browser render that uses up every timeout: slow launch, hung
    /// navigation, then a shutdown that needs the full grace periods.
    struct HungPageRenderer {
        settings: RendererSettings,
        shut_down: AtomicBool,
    }

    #[async_trait]
    impl PdfRenderer for HungPageRenderer {
        async fn render(&self, _url: &Url, _options: &PdfOptions) -> Result<Vec<u8>, RenderError> {
            tokio::time::sleep(self.settings.launch_timeout - Duration::from_secs(1)).await;

            let result = tokio::time::timeout(
                self.settings.navigation_timeout,
                std::future::pending::<Result<Vec<u8>, RenderError>>(),
            )
            .await
            .unwrap_or(Err(RenderError::Timeout(self.settings.navigation_timeout)));

            tokio::time::sleep(BROWSER_EXIT_GRACE * 2).await;
            self.shut_down.store(true, Ordering::SeqCst);
            result
        }

        async fn health_check(&self) -> bool {
            true
        }

        fn describe(&self) -> String {
            "hung".to_string()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_deadline_lets_browser_shut_down() {
        let settings = RendererSettings::for_environment(BrowserEnvironment::Local);
        let renderer = Arc::new(HungPageRenderer {
            settings,
            shut_down: AtomicBool::new(false),
        });
        let service = ExportService::new(
            renderer.clone(),
            ExportSettings::default(),
            PdfOptions::default(),
        );

        let err = service
            .export(Some("https://hanging.example.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Internal { ref message } if message == EXPORT_FAILED));
        assert!(renderer.shut_down.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_busy_when_no_slot_frees_up() {
        let service = Arc::new(ExportService::new(
            Arc::new(SlowRenderer::new(Duration::from_secs(30))),
            ExportSettings {
                max_concurrent: 1,
                queue_timeout: Duration::from_secs(1),
                ..ExportSettings::default()
            },
            PdfOptions::default(),
        ));

        let first = {
            let service = service.clone();
            tokio::spawn(async move { service.export(Some("https://example.com/a")).await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(service.available_slots(), 0);

        let err = service
            .export(Some("https://example.com/b"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unavailable { .. }));

        assert!(first.await.unwrap().is_ok());
        assert_eq!(service.available_slots(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrency_is_bounded() {
        let renderer = Arc::new(SlowRenderer::new(Duration::from_millis(100)));
        let service = Arc::new(ExportService::new(
            renderer.clone(),
            settings(2),
            PdfOptions::default(),
        ));

        let tasks: Vec<_> = (0..6)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move {
                    let url = format!("https://example.com/{i}");
                    service.export(Some(url.as_str())).await
                })
            })
            .collect();

        for task in futures::future::join_all(tasks).await {
            assert!(task.unwrap().is_ok());
        }

        assert_eq!(renderer.peak.load(Ordering::SeqCst), 2);
        assert_eq!(renderer.running.load(Ordering::SeqCst), 0);
    }
}
