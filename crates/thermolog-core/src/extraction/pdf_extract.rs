use crate::error::ThermologError;
use crate::extraction::{PageContent, PdfExtractor};

/// Pure-Rust extraction backend built on the `pdf-extract` crate.
///
/// Used as the secondary backend when pdftotext is missing or chokes on a
/// file. Needs no external binaries.
pub struct PdfExtractCrateExtractor;

impl PdfExtractCrateExtractor {
    pub fn new() -> Self {
        PdfExtractCrateExtractor
    }
}

impl Default for PdfExtractCrateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfExtractor for PdfExtractCrateExtractor {
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageContent>, ThermologError> {
        let pages = ::pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)
            .map_err(|e| ThermologError::Extraction(format!("pdf-extract failed: {e}")))?;

        Ok(pages
            .iter()
            .enumerate()
            .map(|(i, text)| PageContent::from_text(i + 1, text))
            .collect())
    }

    fn backend_name(&self) -> &str {
        "pdf-extract"
    }
}
