//! Rate limiting middleware using token bucket algorithm.
//!
//! Every export launches a browser process, so the export routes are limited
//! per client IP before requests reach the export queue.

use anyhow::{Context, Result};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{PeerIpKeyExtractor, SmartIpKeyExtractor},
};

/// Creates a rate limiter keyed by the socket peer address.
///
/// # Limits
///
/// - **Rate**: one token replenished every `period_seconds`
/// - **Burst**: `burst` requests
///
/// Requests exceeding the limit receive `429 Too Many Requests`.
///
/// # Errors
///
/// Returns an error if `period_seconds` or `burst` is zero.
///
/// # Example
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/exportPdf", post(export_pdf_handler))
///     .layer(rate_limit::layer(1, 10)?);
/// ```
pub fn layer(
    period_seconds: u64,
    burst: u32,
) -> Result<GovernorLayer<PeerIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>> {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(period_seconds)
            .burst_size(burst)
            .finish()
            .context("Invalid rate limit configuration")?,
    );

    Ok(GovernorLayer::new(governor_conf))
}

/// Creates a rate limiter keyed by the forwarded client address.
///
/// Reads `X-Forwarded-For`, `X-Real-IP` and `Forwarded` before falling back to
/// the peer address. Use only behind a trusted reverse proxy.
///
/// # Errors
///
/// Returns an error if `period_seconds` or `burst` is zero.
pub fn proxied_layer(
    period_seconds: u64,
    burst: u32,
) -> Result<GovernorLayer<SmartIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>>
{
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(period_seconds)
            .burst_size(burst)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .context("Invalid rate limit configuration")?,
    );

    Ok(GovernorLayer::new(governor_conf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_burst_is_rejected() {
        assert!(layer(1, 0).is_err());
        assert!(proxied_layer(1, 0).is_err());
    }

    #[test]
    fn test_valid_limits_build() {
        assert!(layer(1, 10).is_ok());
        assert!(proxied_layer(2, 5).is_ok());
    }
}
