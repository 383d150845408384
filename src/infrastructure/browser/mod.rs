//! Headless browser integration.
//!
//! - [`ChromeRenderer`] - [`crate::domain::PdfRenderer`] backed by Chrome/Chromium
//! - [`BrowserSession`] - one scoped browser process
//! - [`launch`] - command-line flags and launch configuration

mod chrome_renderer;
pub mod launch;
mod session;

pub use chrome_renderer::{ChromeRenderer, print_params};
pub use session::BrowserSession;
