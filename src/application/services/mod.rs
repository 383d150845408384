//! Business logic services for the application layer.

pub mod export_service;

pub use export_service::ExportService;
