//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod export;
pub mod health;

pub use export::export_pdf_handler;
pub use health::health_handler;
