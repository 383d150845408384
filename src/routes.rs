//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `POST /exportPdf`      - Render a page to PDF (rate limited)
//! - `POST /api/exportPdf`  - Alias used by the web app
//! - `GET  /health`         - Renderer and capacity checks
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket on export routes (configurable for proxy deployments)
//! - **Body limit** - Export requests are capped at a few kilobytes
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::health_handler;
use crate::api::middleware::{rate_limit, tracing};
use crate::config::Config;
use crate::state::AppState;
use anyhow::Result;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// When `config.behind_proxy` is set, rate limiting reads the client IP from
/// forwarding headers instead of the peer socket address.
///
/// # Errors
///
/// Returns an error if the rate limit settings are invalid.
pub fn app_router(state: AppState, config: &Config) -> Result<NormalizePath<Router>> {
    let export_routes = api::routes::export_routes();
    let export_routes = if config.behind_proxy {
        export_routes.layer(rate_limit::proxied_layer(
            config.rate_limit_per_second,
            config.rate_limit_burst,
        )?)
    } else {
        export_routes.layer(rate_limit::layer(
            config.rate_limit_per_second,
            config.rate_limit_burst,
        )?)
    };

    let router = Router::new()
        .route("/health", get(health_handler))
        .merge(export_routes)
        .with_state(state)
        .layer(tracing::layer());

    Ok(NormalizePathLayer::trim_trailing_slash().layer(router))
}
