//! HTTP server initialization and runtime setup.
//!
//! Builds the renderer and export service from configuration and runs the
//! Axum server until a shutdown signal arrives.

use crate::application::services::ExportService;
use crate::config::Config;
use crate::domain::{PdfOptions, PdfRenderer};
use crate::infrastructure::browser::ChromeRenderer;
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::Result;
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;

/// Builds the export service used by the server and the CLI.
pub fn build_export_service(config: &Config) -> (Arc<ChromeRenderer>, Arc<ExportService>) {
    let renderer = Arc::new(ChromeRenderer::new(config.renderer.clone()));

    let options = PdfOptions {
        paper: config.renderer.paper_format,
        ..PdfOptions::default()
    };

    let service = Arc::new(ExportService::new(
        renderer.clone(),
        config.export.clone(),
        options,
    ));

    (renderer, service)
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Chromium renderer (executable checked, not launched)
/// - Export service with bounded concurrency
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Router configuration is invalid
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let (renderer, export_service) = build_export_service(&config);

    if renderer.health_check().await {
        tracing::info!("Renderer ready: {}", renderer.describe());
    } else {
        tracing::warn!(
            "Browser executable not found, exports will fail: {}",
            renderer.describe()
        );
    }

    let state = AppState::new(export_service);
    let app = app_router(state, &config)?;

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!(
        active_browsers = renderer.active_sessions(),
        "Server stopped"
    );

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining in-flight exports");
}
