//! Scoped browser process.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chromiumoxide::Browser;
use futures::StreamExt;
use tempfile::TempDir;
use tokio::task::JoinHandle;

use crate::config::{BROWSER_EXIT_GRACE, RendererSettings};
use crate::domain::renderer::RenderError;
use crate::infrastructure::browser::launch::browser_config;

/// One headless browser process with its own throwaway profile.
///
/// Call [`BrowserSession::shutdown`] on every path. A session dropped without
/// it (for example when the caller's future is cancelled) still removes its
/// profile directory, and chromiumoxide kills the child process on drop.
pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    active: Arc<AtomicUsize>,
    _profile: TempDir,
}

impl BrowserSession {
    /// Launches a browser process.
    ///
    /// `active` is incremented for as long as the session lives.
    pub async fn launch(
        settings: &RendererSettings,
        active: Arc<AtomicUsize>,
    ) -> Result<Self, RenderError> {
        let profile = tempfile::Builder::new()
            .prefix("neonest-pdf-")
            .tempdir()
            .map_err(|e| RenderError::Launch(format!("cannot create profile directory: {e}")))?;

        let config = browser_config(settings, profile.path())?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "Browser handler reported an error");
                }
            }
        });

        active.fetch_add(1, Ordering::SeqCst);
        metrics::gauge!("pdf_browser_sessions_active").increment(1.0);
        tracing::debug!(profile = %profile.path().display(), "Browser launched");

        Ok(Self {
            browser,
            handler,
            active,
            _profile: profile,
        })
    }

    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Closes the browser and waits for the process to exit, killing it if
    /// it does not.
    ///
    /// Takes at most twice [`BROWSER_EXIT_GRACE`] plus the kill itself.
    pub async fn shutdown(mut self) {
        match tokio::time::timeout(BROWSER_EXIT_GRACE, self.browser.close()).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "Browser did not accept close command"),
            Err(_) => tracing::warn!("Browser did not answer close command"),
        }

        match tokio::time::timeout(BROWSER_EXIT_GRACE, self.browser.wait()).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "Failed to wait for browser exit"),
            Err(_) => {
                tracing::warn!("Browser still running after close, killing it");
                if let Some(Err(e)) = self.browser.kill().await {
                    tracing::error!(error = %e, "Failed to kill browser process");
                }
            }
        }

        self.handler.abort();
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler.abort();
        self.active.fetch_sub(1, Ordering::SeqCst);
        metrics::gauge!("pdf_browser_sessions_active").decrement(1.0);
    }
}
