//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer.
//!
//! # Modules
//!
//! - [`browser`] - Headless Chrome/Chromium renderer

pub mod browser;
