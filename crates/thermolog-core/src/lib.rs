pub mod config;
pub mod error;
pub mod extraction;
pub mod locations;
pub mod model;
pub mod parsing;
pub mod registry;

use chrono::{Local, NaiveDate};
use config::schema::ParserConfig;
use error::ThermologError;
use extraction::lines::LineSource;
use extraction::{joined_text, pages_are_blank, PageContent, PdfExtractor};
use model::ParseOutcome;
use tracing::{info, warn};

/// Main API entry point: parse a temperature logger PDF report.
///
/// Never fails: if no backend can read the PDF, or the PDF has no text
/// at all, the outcome has `success = false` and the error message. The daily summary is dated
/// today in local time.
pub fn parse_pdf(
    pdf_bytes: &[u8],
    filename: &str,
    extractor: &dyn PdfExtractor,
    config: &ParserConfig,
) -> ParseOutcome {
    parse_pdf_dated(pdf_bytes, filename, extractor, config, Local::now().date_naive())
}

/// [`parse_pdf`] with an explicit report date.
pub fn parse_pdf_dated(
    pdf_bytes: &[u8],
    filename: &str,
    extractor: &dyn PdfExtractor,
    config: &ParserConfig,
    date: NaiveDate,
) -> ParseOutcome {
    match extractor.extract_pages(pdf_bytes) {
        Ok(pages) if pages_are_blank(&pages) => {
            warn!(source = filename, backend = extractor.backend_name(), "no text extracted");
            ParseOutcome::failed(filename, "no text extracted")
        }
        Ok(pages) => parse_pages(&pages, filename, config, date),
        Err(e) => {
            warn!(source = filename, backend = extractor.backend_name(), error = %e, "text extraction failed");
            ParseOutcome::failed(filename, e.to_string())
        }
    }
}

/// Parse already-extracted pages.
pub fn parse_pages(
    pages: &[PageContent],
    filename: &str,
    config: &ParserConfig,
    date: NaiveDate,
) -> ParseOutcome {
    let lines = LineSource::from_pages(pages);
    let parsed = parsing::parse_lines(&lines, config);
    let daily_summary = parsing::build_daily_summary(&parsed.temperatures, filename, date);

    info!(
        source = filename,
        locations = parsed.locations.len(),
        temperatures = parsed.temperatures.len(),
        text_length = lines.text_length(),
        "parsed report"
    );

    ParseOutcome {
        locations: parsed.locations,
        temperatures: parsed.temperatures,
        daily_summary,
        success: true,
        error: None,
        source: filename.to_string(),
        text_length: lines.text_length(),
    }
}

/// Parse report text held in memory, as a single page.
pub fn parse_text(text: &str, filename: &str, config: &ParserConfig, date: NaiveDate) -> ParseOutcome {
    parse_pages(&[PageContent::from_text(1, text)], filename, config, date)
}

/// Full text of a PDF, pages joined by newlines.
pub fn extract_text(pdf_bytes: &[u8], extractor: &dyn PdfExtractor) -> Result<String, ThermologError> {
    let pages = extractor.extract_pages(pdf_bytes)?;
    Ok(joined_text(&pages))
}
