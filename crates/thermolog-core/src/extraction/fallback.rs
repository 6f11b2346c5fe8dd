use crate::error::ThermologError;
use crate::extraction::pdf_extract::PdfExtractCrateExtractor;
use crate::extraction::pdftotext::PdftotextExtractor;
use crate::extraction::{pages_are_blank, PageContent, PdfExtractor};
use tracing::{debug, warn};

/// Ordered chain of extraction backends.
///
/// Each backend is tried in turn and the first result with any text wins. A
/// backend that returns only blank pages counts as failed. When every
/// backend fails the error lists each backend's failure.
pub struct FallbackExtractor {
    backends: Vec<Box<dyn PdfExtractor>>,
}

impl FallbackExtractor {
    pub fn new(backends: Vec<Box<dyn PdfExtractor>>) -> Self {
        FallbackExtractor { backends }
    }

    /// pdftotext first, then the pure-Rust backend.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(PdftotextExtractor::new()),
            Box::new(PdfExtractCrateExtractor::new()),
        ])
    }
}

impl Default for FallbackExtractor {
    fn default() -> Self {
        Self::standard()
    }
}

impl PdfExtractor for FallbackExtractor {
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageContent>, ThermologError> {
        let mut failures = Vec::new();

        for backend in &self.backends {
            match backend.extract_pages(pdf_bytes) {
                Ok(pages) if pages_are_blank(&pages) => {
                    warn!(backend = backend.backend_name(), "text backend returned no text");
                    failures.push(format!("{} (no text)", backend.backend_name()));
                }
                Ok(pages) => {
                    debug!(backend = backend.backend_name(), pages = pages.len(), "text extracted");
                    return Ok(pages);
                }
                Err(e) => {
                    warn!(backend = backend.backend_name(), error = %e, "text backend failed");
                    failures.push(format!("{} ({})", backend.backend_name(), e));
                }
            }
        }

        if failures.is_empty() {
            return Err(ThermologError::ExtractionChainFailed(
                "no text backends configured".into(),
            ));
        }
        Err(ThermologError::ExtractionChainFailed(failures.join(", ")))
    }

    fn backend_name(&self) -> &str {
        "fallback"
    }
}
