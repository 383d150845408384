//! Rendered PDF document and print options.

use std::fmt;
use std::str::FromStr;

/// MIME type of every exported document.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Suggested download name used when none is configured.
pub const DEFAULT_FILENAME: &str = "neonest-data.pdf";

/// Magic bytes every PDF file starts with.
pub const PDF_SIGNATURE: &[u8] = b"%PDF-";

/// Returns `true` when `bytes` begins with the PDF header signature.
pub fn looks_like_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(PDF_SIGNATURE)
}

/// A rendered PDF together with the metadata needed to serve it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfDocument {
    pub bytes: Vec<u8>,
    pub filename: String,
}

impl PdfDocument {
    pub fn new(bytes: Vec<u8>, filename: impl Into<String>) -> Self {
        Self {
            bytes,
            filename: filename.into(),
        }
    }

    pub fn content_type(&self) -> &'static str {
        PDF_CONTENT_TYPE
    }

    /// Value for the `Content-Disposition` response header.
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename={}", self.filename)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Paper sizes understood by the renderer.
///
/// Dimensions follow the DevTools `Page.printToPDF` convention (inches).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaperFormat {
    #[default]
    A4,
    A3,
    Letter,
    Legal,
}

impl PaperFormat {
    /// Returns `(width, height)` in inches.
    pub fn dimensions_in(self) -> (f64, f64) {
        match self {
            PaperFormat::A4 => (8.27, 11.7),
            PaperFormat::A3 => (11.7, 16.54),
            PaperFormat::Letter => (8.5, 11.0),
            PaperFormat::Legal => (8.5, 14.0),
        }
    }
}

impl fmt::Display for PaperFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PaperFormat::A4 => "a4",
            PaperFormat::A3 => "a3",
            PaperFormat::Letter => "letter",
            PaperFormat::Legal => "legal",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown paper format '{0}' (expected a4, a3, letter or legal)")]
pub struct UnknownPaperFormat(pub String);

impl FromStr for PaperFormat {
    type Err = UnknownPaperFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a4" => Ok(PaperFormat::A4),
            "a3" => Ok(PaperFormat::A3),
            "letter" => Ok(PaperFormat::Letter),
            "legal" => Ok(PaperFormat::Legal),
            other => Err(UnknownPaperFormat(other.to_string())),
        }
    }
}

/// Options applied when printing a loaded page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfOptions {
    pub paper: PaperFormat,
    pub print_background: bool,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            paper: PaperFormat::A4,
            print_background: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_signature_detection() {
        assert!(looks_like_pdf(b"%PDF-1.7\n%\xe2\xe3"));
        assert!(!looks_like_pdf(b"<html>"));
        assert!(!looks_like_pdf(b""));
        assert!(!looks_like_pdf(b"%PD"));
    }

    #[test]
    fn test_document_headers() {
        let doc = PdfDocument::new(b"%PDF-1.4".to_vec(), DEFAULT_FILENAME);

        assert_eq!(doc.content_type(), "application/pdf");
        assert_eq!(
            doc.content_disposition(),
            "attachment; filename=neonest-data.pdf"
        );
        assert_eq!(doc.len(), 8);
        assert!(!doc.is_empty());
    }

    #[test]
    fn test_default_options_are_a4_with_background() {
        let options = PdfOptions::default();
        assert_eq!(options.paper, PaperFormat::A4);
        assert!(options.print_background);
        assert_eq!(options.paper.dimensions_in(), (8.27, 11.7));
    }

    #[test]
    fn test_paper_format_parsing() {
        assert_eq!("A4".parse::<PaperFormat>().unwrap(), PaperFormat::A4);
        assert_eq!(" letter ".parse::<PaperFormat>().unwrap(), PaperFormat::Letter);
        assert!("tabloid".parse::<PaperFormat>().is_err());
        assert_eq!(PaperFormat::Legal.to_string(), "legal");
    }
}
