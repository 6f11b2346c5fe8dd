use std::path::Path;
use thermolog_core::error::ThermologError;
use thermolog_core::model::{Confidence, LocationType};
use thermolog_core::registry::store::JsonFileStore;
use thermolog_core::registry::{LocationRegistry, NEAR_EXACT_THRESHOLD};

use crate::output;

fn open(registry_file: &Path) -> Result<LocationRegistry, ThermologError> {
    LocationRegistry::open(Box::new(JsonFileStore::new(registry_file)))
}

pub fn list(registry_file: &Path, output_format: &str) -> Result<(), ThermologError> {
    let registry = open(registry_file)?;
    let all: Vec<_> = registry.snapshot().into_values().collect();
    match output_format {
        "json" => output::json::print(&all),
        _ => {
            output::table::print_locations(&all);
            Ok(())
        }
    }
}

pub fn unconfigured(
    registry_file: &Path,
    output_format: &str,
    min_confidence: Option<Confidence>,
) -> Result<(), ThermologError> {
    let registry = open(registry_file)?;
    let mut pending = registry.list_unconfigured();
    if let Some(floor) = min_confidence {
        pending.retain(|l| l.confidence >= floor);
    }
    match output_format {
        "json" => output::json::print(&pending),
        _ => {
            output::table::print_locations(&pending);
            Ok(())
        }
    }
}

pub fn summary(registry_file: &Path) -> Result<(), ThermologError> {
    output::json::print(&open(registry_file)?.discovery_summary())
}

pub fn suggest(registry_file: &Path, name: &str, threshold: f64) -> Result<(), ThermologError> {
    let registry = open(registry_file)?;

    if let Some(key) = registry.find_near_exact(name, NEAR_EXACT_THRESHOLD) {
        println!("'{name}' is already known as '{key}'");
        return Ok(());
    }

    let suggestions = registry.suggest_merges(name, threshold, NEAR_EXACT_THRESHOLD);
    if suggestions.is_empty() {
        println!("No similar locations for '{name}'");
    } else {
        output::table::print_suggestions(name, &suggestions);
    }
    Ok(())
}

pub fn merge(registry_file: &Path, source: &str, target: &str) -> Result<(), ThermologError> {
    let registry = open(registry_file)?;
    registry.merge_strict(source, target)?;
    registry.flush()?;
    println!("Merged '{source}' into '{target}'");
    Ok(())
}

pub fn configure(
    registry_file: &Path,
    key: &str,
    location_type: Option<LocationType>,
    min: Option<f64>,
    max: Option<f64>,
) -> Result<(), ThermologError> {
    let registry = open(registry_file)?;
    if !registry.mark_configured(key, location_type, min, max) {
        return Err(ThermologError::UnknownLocation(key.to_string()));
    }
    registry.flush()?;
    println!("Configured '{key}'");
    Ok(())
}
