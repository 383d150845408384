//! Domain layer: the rendered document model, the renderer seam and the
//! network-idle heuristic.
//!
//! Nothing here talks to a browser or to HTTP directly; concrete engines live
//! in [`crate::infrastructure`].

pub mod document;
pub mod network_idle;
pub mod renderer;

pub use document::{PaperFormat, PdfDocument, PdfOptions};
pub use network_idle::{NetworkActivity, NetworkIdleTracker, wait_for_idle};
pub use renderer::{PdfRenderer, RenderError};

#[cfg(test)]
pub use renderer::MockPdfRenderer;
