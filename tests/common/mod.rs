#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use url::Url;

use neonest_pdf_export::application::services::ExportService;
use neonest_pdf_export::config::ExportSettings;
use neonest_pdf_export::domain::{PdfOptions, PdfRenderer, RenderError};
use neonest_pdf_export::state::AppState;

/// Renderer stand-in that counts acquired and released "browsers".
///
/// Successful renders embed the requested URL in the returned bytes so tests
/// can tell responses apart.
pub struct StubRenderer {
    pub launched: AtomicUsize,
    pub released: AtomicUsize,
    fail: bool,
    healthy: bool,
    delay: Duration,
}

impl StubRenderer {
    pub fn ok() -> Self {
        Self {
            launched: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
            fail: false,
            healthy: true,
            delay: Duration::ZERO,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::ok()
        }
    }

    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            ..Self::ok()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn launched(&self) -> usize {
        self.launched.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

/// Marks the fake browser released on every exit path.
struct Release<'a>(&'a AtomicUsize);

impl Drop for Release<'_> {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl PdfRenderer for StubRenderer {
    async fn render(&self, url: &Url, _options: &PdfOptions) -> Result<Vec<u8>, RenderError> {
        self.launched.fetch_add(1, Ordering::SeqCst);
        let _release = Release(&self.released);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.fail {
            return Err(RenderError::Navigation {
                url: url.to_string(),
                reason: "net::ERR_CONNECTION_REFUSED at /internal/stack.rs:42".to_string(),
            });
        }

        Ok(format!("%PDF-1.7\n% source: {url}\n%%EOF\n").into_bytes())
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn describe(&self) -> String {
        "stub".to_string()
    }
}

pub fn create_test_state(renderer: Arc<StubRenderer>, max_concurrent: usize) -> AppState {
    let settings = ExportSettings {
        max_concurrent,
        ..ExportSettings::default()
    };

    let service = ExportService::new(renderer, settings, PdfOptions::default());

    AppState::new(Arc::new(service))
}
