pub mod blocks;
pub mod recordings;
pub mod values;

use crate::config::schema::ParserConfig;
use crate::extraction::lines::LineSource;
use crate::model::{DailyLocationSummary, DailySummary, LocationBlock, SampleKind, TemperatureSample};
use blocks::parse_blocks;
use chrono::NaiveDate;
use recordings::{collect_readings, reduce_samples};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use values::has_degree_value;

/// Structured content of one report's line sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLines {
    pub locations: Vec<LocationBlock>,
    pub temperatures: Vec<TemperatureSample>,
}

/// Parse a report's lines into location blocks and daily min/max samples.
///
/// Pure and deterministic: the same lines always produce the same output.
pub fn parse_lines(source: &LineSource, config: &ParserConfig) -> ParsedLines {
    let locations = parse_blocks(source, config);
    let readings = collect_readings(source, &locations, config);
    let temperatures = reduce_samples(&readings);
    ParsedLines {
        locations,
        temperatures,
    }
}

/// Pair up each location's minimum and maximum sample into a daily row.
///
/// Returns `None` when no location has both sides.
pub fn build_daily_summary(
    temperatures: &[TemperatureSample],
    source: &str,
    date: NaiveDate,
) -> Option<DailySummary> {
    // (min, max, readings) per location, in first-seen order
    let mut order: Vec<&str> = Vec::new();
    let mut by_location: HashMap<&str, (Option<f64>, Option<f64>, usize)> = HashMap::new();

    for t in temperatures {
        let entry = by_location.entry(t.location_name.as_str()).or_insert_with(|| {
            order.push(t.location_name.as_str());
            (None, None, 0)
        });
        match t.kind {
            SampleKind::Minimum => {
                entry.0 = Some(entry.0.map_or(t.value, |v| v.min(t.value)));
                entry.2 = t.sample_count;
            }
            SampleKind::Maximum => {
                entry.1 = Some(entry.1.map_or(t.value, |v| v.max(t.value)));
            }
        }
    }

    let locations: Vec<DailyLocationSummary> = order
        .into_iter()
        .filter_map(|name| match by_location.get(name) {
            Some((Some(min), Some(max), count)) => Some(DailyLocationSummary {
                location: name.to_string(),
                min_temp: *min,
                max_temp: *max,
                readings_count: *count,
                date,
            }),
            _ => None,
        })
        .collect();

    if locations.is_empty() {
        None
    } else {
        Some(DailySummary {
            date,
            source: source.to_string(),
            locations,
        })
    }
}

/// Part of the expected report structure that was not found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingSection {
    LocationDetails,
    Recordings,
    TemperatureData,
}

impl std::fmt::Display for MissingSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MissingSection::LocationDetails => write!(f, "location details sections"),
            MissingSection::Recordings => write!(f, "recordings sections"),
            MissingSection::TemperatureData => write!(f, "temperature data"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatCheck {
    pub valid: bool,
    pub missing: Vec<MissingSection>,
}

/// Check whether report text looks like the configured logger layout.
pub fn validate_format(text: &str, config: &ParserConfig) -> FormatCheck {
    let mut missing = Vec::new();
    if !text.contains(config.sentinels.location_header.as_str()) {
        missing.push(MissingSection::LocationDetails);
    }
    if !text.contains(config.sentinels.recordings.as_str()) {
        missing.push(MissingSection::Recordings);
    }
    if !has_degree_value(text) {
        missing.push(MissingSection::TemperatureData);
    }
    FormatCheck {
        valid: missing.is_empty(),
        missing,
    }
}
