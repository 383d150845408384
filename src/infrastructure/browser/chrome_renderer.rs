//! Headless Chrome/Chromium renderer.

use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::cdp::browser_protocol::network::{
    EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
};
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use futures::{Stream, StreamExt, stream};
use url::Url;

use crate::config::RendererSettings;
use crate::domain::document::PdfOptions;
use crate::domain::network_idle::{NetworkActivity, wait_for_idle};
use crate::domain::renderer::{PdfRenderer, RenderError};
use crate::infrastructure::browser::session::BrowserSession;

type ActivityStream = Pin<Box<dyn Stream<Item = NetworkActivity> + Send>>;

/// Renders pages by launching a fresh headless browser per request.
///
/// Every call gets its own process and profile directory, so concurrent
/// renders share nothing. The process is shut down before `render` returns,
/// including when navigation fails or times out.
pub struct ChromeRenderer {
    settings: RendererSettings,
    active: Arc<AtomicUsize>,
}

impl ChromeRenderer {
    pub fn new(settings: RendererSettings) -> Self {
        Self {
            settings,
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    /// Browser processes currently alive.
    pub fn active_sessions(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Launches a browser and closes it again.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Launch`] if the browser cannot be started.
    pub async fn probe(&self) -> Result<String, RenderError> {
        let session = BrowserSession::launch(&self.settings, self.active.clone()).await?;
        let version = session
            .browser()
            .version()
            .await
            .map(|v| v.product)
            .map_err(|e| RenderError::Launch(e.to_string()));
        session.shutdown().await;
        version
    }

    async fn print_page(
        &self,
        session: &BrowserSession,
        url: &Url,
        options: &PdfOptions,
    ) -> Result<Vec<u8>, RenderError> {
        let page = session
            .browser()
            .new_page("about:blank")
            .await
            .map_err(|e| RenderError::Page(e.to_string()))?;

        let activity = network_activity(&page).await?;

        let navigation_error = |reason: String| RenderError::Navigation {
            url: url.to_string(),
            reason,
        };

        page.goto(url.as_str())
            .await
            .map_err(|e| navigation_error(e.to_string()))?;

        if let Some(request) = page
            .wait_for_navigation_response()
            .await
            .map_err(|e| navigation_error(e.to_string()))?
            && let Some(failure) = &request.failure_text
        {
            return Err(navigation_error(failure.clone()));
        }

        wait_for_idle(
            activity,
            self.settings.network_idle_max_inflight,
            self.settings.network_idle_window,
        )
        .await;

        let pdf = page
            .pdf(print_params(options))
            .await
            .map_err(|e| RenderError::Print(e.to_string()))?;

        if let Err(e) = page.close().await {
            tracing::debug!(error = %e, "Failed to close page");
        }

        Ok(pdf)
    }
}

#[async_trait]
impl PdfRenderer for ChromeRenderer {
    async fn render(&self, url: &Url, options: &PdfOptions) -> Result<Vec<u8>, RenderError> {
        let session = BrowserSession::launch(&self.settings, self.active.clone()).await?;

        let result = tokio::time::timeout(
            self.settings.navigation_timeout,
            self.print_page(&session, url, options),
        )
        .await
        .unwrap_or(Err(RenderError::Timeout(self.settings.navigation_timeout)));

        session.shutdown().await;
        result
    }

    async fn health_check(&self) -> bool {
        match self.settings.executable() {
            Some(path) => tokio::fs::metadata(&path).await.is_ok_and(|m| m.is_file()),
            None => true,
        }
    }

    fn describe(&self) -> String {
        match self.settings.executable() {
            Some(path) => format!(
                "chromium ({}, {})",
                self.settings.environment,
                path.display()
            ),
            None => format!("chromium ({}, auto-detect)", self.settings.environment),
        }
    }
}

/// Converts print options into DevTools parameters.
pub fn print_params(options: &PdfOptions) -> PrintToPdfParams {
    let (width, height) = options.paper.dimensions_in();

    PrintToPdfParams {
        print_background: Some(options.print_background),
        paper_width: Some(width),
        paper_height: Some(height),
        ..Default::default()
    }
}

/// Subscribes to the page's request lifecycle events.
///
/// Must run before navigation so no request is missed. WebSocket frames are
/// not observed; an EventSource or long-poll request never settles, so pages
/// holding one open wait until the navigation timeout.
async fn network_activity(page: &Page) -> Result<ActivityStream, RenderError> {
    let listen_error = |e: chromiumoxide::error::CdpError| RenderError::Page(e.to_string());

    let started = page
        .event_listener::<EventRequestWillBeSent>()
        .await
        .map_err(listen_error)?
        .map(|e| NetworkActivity::Started(e.request_id.inner().clone()));

    let finished = page
        .event_listener::<EventLoadingFinished>()
        .await
        .map_err(listen_error)?
        .map(|e| NetworkActivity::Settled(e.request_id.inner().clone()));

    let failed = page
        .event_listener::<EventLoadingFailed>()
        .await
        .map_err(listen_error)?
        .map(|e| NetworkActivity::Settled(e.request_id.inner().clone()));

    Ok(Box::pin(stream::select(
        started,
        stream::select(finished, failed),
    )))
}
