//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: Renderer available
/// - **503 Service Unavailable**: Browser executable missing
///
/// # Components Checked
///
/// 1. **Renderer**: Configured browser executable exists (auto-detection is
///    only verified at launch time)
/// 2. **Capacity**: Free export slots; a full pool reports `busy` but does not
///    degrade the service
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "renderer": {
///       "status": "ok",
///       "message": "chromium (hosted, /usr/bin/chromium)"
///     },
///     "capacity": {
///       "status": "ok",
///       "message": "Available slots: 4/4"
///     }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let renderer_check = check_renderer(&state).await;
    let capacity_check = check_capacity(&state);

    let healthy = renderer_check.status == "ok";

    let response = HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            renderer: renderer_check,
            capacity: capacity_check,
        },
    };

    if healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

/// Checks that the rendering engine can be launched.
async fn check_renderer(state: &AppState) -> CheckStatus {
    let renderer = state.export_service.renderer();

    if renderer.health_check().await {
        CheckStatus {
            status: "ok".to_string(),
            message: Some(renderer.describe()),
        }
    } else {
        CheckStatus {
            status: "error".to_string(),
            message: Some(format!("Browser unavailable: {}", renderer.describe())),
        }
    }
}

/// Reports free export slots.
fn check_capacity(state: &AppState) -> CheckStatus {
    let available = state.export_service.available_slots();
    let capacity = state.export_service.capacity();

    CheckStatus {
        status: if available > 0 { "ok" } else { "busy" }.to_string(),
        message: Some(format!("Available slots: {available}/{capacity}")),
    }
}
