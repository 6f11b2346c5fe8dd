pub mod classify;
pub mod confidence;
pub mod fallback;
pub mod normalize;

use crate::config::schema::ParserConfig;
use crate::extraction::lines::LineSource;
use crate::model::{Confidence, LocationBlock, LocationType};
use crate::parsing::blocks::parse_blocks;
use classify::classify_location;
use fallback::{dedupe_candidates, extract_fallback_locations};
use serde::{Deserialize, Serialize};
use tracing::info;

/// A location found in a report, before it reaches the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredCandidate {
    pub name: String,
    #[serde(rename = "type")]
    pub location_type: LocationType,
    pub confidence: Confidence,
    pub min_temp: Option<f64>,
    pub max_temp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub context: String,
    pub source: String,
    /// 1-based line where the name was found.
    pub line_number: usize,
}

impl DiscoveredCandidate {
    /// Fold a duplicate sighting of the same location into this one.
    ///
    /// Confidence only moves up, missing thresholds are filled, and the
    /// more specific type wins.
    pub fn merge_from(&mut self, other: &DiscoveredCandidate) {
        self.confidence = self.confidence.upgraded(other.confidence);
        if self.min_temp.is_none() {
            self.min_temp = other.min_temp;
        }
        if self.max_temp.is_none() {
            self.max_temp = other.max_temp;
        }
        if self.description.is_none() {
            self.description = other.description.clone();
        }
        if other.location_type.specificity() > self.location_type.specificity() {
            self.location_type = other.location_type;
        }
    }
}

/// Candidates for structured location blocks.
///
/// Structured blocks are trusted: confidence is high and the type comes
/// from the name and description. Thresholds the report stated win over
/// the type's defaults.
pub fn candidates_from_blocks(blocks: &[LocationBlock], source: &str) -> Vec<DiscoveredCandidate> {
    let candidates = blocks
        .iter()
        .map(|block| {
            let location_type = classify_location(&block.name, block.description.as_deref());
            let defaults = location_type.default_thresholds();
            DiscoveredCandidate {
                name: block.name.clone(),
                location_type,
                confidence: Confidence::High,
                min_temp: Some(block.min_threshold.unwrap_or(defaults.min)),
                max_temp: Some(block.max_threshold.unwrap_or(defaults.max)),
                description: block.description.clone(),
                context: block.raw_name.clone(),
                source: source.to_string(),
                line_number: block.header_line + 1,
            }
        })
        .collect();

    dedupe_candidates(candidates)
}

/// Discover locations in report text.
///
/// Structured blocks are used when the text has any; otherwise the
/// keyword fallback scans free text.
pub fn discover_locations(text: &str, source: &str, config: &ParserConfig) -> Vec<DiscoveredCandidate> {
    let lines = LineSource::from_text(text);
    let blocks = parse_blocks(&lines, config);

    if blocks.is_empty() {
        info!(source, "no structured location blocks, using keyword fallback");
        return extract_fallback_locations(text, source, config);
    }

    let candidates = candidates_from_blocks(&blocks, source);
    info!(source, count = candidates.len(), "structured location discovery");
    candidates
}
