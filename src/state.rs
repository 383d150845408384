//! Shared application state injected into handlers.

use std::sync::Arc;

use crate::application::services::ExportService;

#[derive(Clone)]
pub struct AppState {
    pub export_service: Arc<ExportService>,
}

impl AppState {
    pub fn new(export_service: Arc<ExportService>) -> Self {
        Self { export_service }
    }
}
