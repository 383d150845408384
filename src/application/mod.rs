//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations: input validation, export slot
//! accounting, deadlines and logging around a [`crate::domain::PdfRenderer`].
//! HTTP handlers and the CLI both go through it.
//!
//! # Available Services
//!
//! - [`services::export_service::ExportService`] - URL to PDF export

pub mod services;
