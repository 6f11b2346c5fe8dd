use chrono::Local;
use std::path::{Path, PathBuf};
use thermolog_core::error::ThermologError;
use thermolog_core::extraction::fallback::FallbackExtractor;
use thermolog_core::extraction::{joined_text, pages_are_blank, PdfExtractor};
use thermolog_core::locations::discover_locations;
use thermolog_core::registry::store::JsonFileStore;
use thermolog_core::registry::{LocationRegistry, Observed};
use tracing::warn;

use crate::commands::resolve_config;

/// Parse each report and record its locations, then save the registry once.
///
/// Reports that cannot be read are skipped with a warning. Reports without
/// structured location blocks go through keyword discovery instead.
pub fn run(
    input_files: &[PathBuf],
    registry_file: &Path,
    profile: &str,
    config_file: Option<PathBuf>,
) -> Result<(), ThermologError> {
    let config = resolve_config(profile, config_file)?;
    let registry = LocationRegistry::open(Box::new(JsonFileStore::new(registry_file)))?;
    let extractor = FallbackExtractor::standard();
    let today = Local::now().date_naive();

    let mut reports = 0;
    let mut new_locations = 0;

    for path in input_files {
        let filename = path.display().to_string();
        let pages = match std::fs::read(path)
            .map_err(ThermologError::from)
            .and_then(|bytes| extractor.extract_pages(&bytes))
        {
            Ok(pages) if pages_are_blank(&pages) => {
                warn!(source = %filename, "skipping report without text");
                eprintln!("  skipped {filename}: no text extracted");
                continue;
            }
            Ok(pages) => pages,
            Err(e) => {
                warn!(source = %filename, error = %e, "skipping unreadable report");
                eprintln!("  skipped {filename}: {e}");
                continue;
            }
        };

        let outcome = thermolog_core::parse_pages(&pages, &filename, &config, today);
        let added = if outcome.locations.is_empty() {
            discover_locations(&joined_text(&pages), &filename, &config)
                .iter()
                .map(|c| registry.observe_candidate(c))
                .filter(|o| *o == Observed::New)
                .count()
        } else {
            registry.ingest(&outcome)
        };

        reports += 1;
        new_locations += added;
    }

    registry.flush()?;

    let summary = registry.discovery_summary();
    eprintln!(
        "Ingested {} report(s): {} new location(s), {} known, {} awaiting review",
        reports, new_locations, summary.total_discovered, summary.total_unconfigured
    );
    Ok(())
}
