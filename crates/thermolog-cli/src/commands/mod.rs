pub mod config;
pub mod ingest;
pub mod locations;
pub mod parse;

use std::path::PathBuf;
use thermolog_core::config::builtin::load_profile;
use thermolog_core::config::load_config;
use thermolog_core::config::schema::ParserConfig;
use thermolog_core::error::ThermologError;

/// A custom config file wins over the named profile.
pub fn resolve_config(profile: &str, config: Option<PathBuf>) -> Result<ParserConfig, ThermologError> {
    match config {
        Some(path) => load_config(&path),
        None => load_profile(profile),
    }
}
