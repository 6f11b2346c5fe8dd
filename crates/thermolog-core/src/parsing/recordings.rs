use crate::config::schema::ParserConfig;
use crate::extraction::lines::LineSource;
use crate::model::{LocationBlock, SampleKind, TemperatureSample};
use crate::parsing::values::celsius_pairs;
use std::collections::HashMap;
use tracing::debug;

/// Raw min/max readings collected for one location name.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationReadings {
    pub name: String,
    pub mins: Vec<f64>,
    pub maxs: Vec<f64>,
}

impl LocationReadings {
    fn new(name: &str) -> Self {
        LocationReadings {
            name: name.to_string(),
            mins: Vec::new(),
            maxs: Vec::new(),
        }
    }

    /// Absolute minimum and maximum, only when both lists have data.
    pub fn extremes(&self) -> Option<(f64, f64)> {
        if self.mins.is_empty() || self.maxs.is_empty() {
            return None;
        }
        let min = self.mins.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.maxs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some((min, max))
    }
}

#[derive(Clone, Copy)]
enum RecordingsState {
    /// Outside any named location (before the first header, or under a
    /// header whose block was dropped).
    Idle,
    /// Under a named location, before its Recordings sentinel.
    Located(usize),
    InRecordings(usize),
}

/// Collect the (min, max) readings under each location's Recordings region.
///
/// A location's region runs from its header to the next header. Readings
/// outside the plausibility bounds are dropped whole. Locations sharing a
/// name accumulate into one entry; order follows first appearance.
pub fn collect_readings(
    source: &LineSource,
    blocks: &[LocationBlock],
    config: &ParserConfig,
) -> Vec<LocationReadings> {
    let s = &config.sentinels;
    let names_by_header: HashMap<usize, &str> = blocks
        .iter()
        .map(|b| (b.header_line, b.name.as_str()))
        .collect();

    let mut readings: Vec<LocationReadings> = Vec::new();
    let mut index_by_name: HashMap<String, usize> = HashMap::new();
    let mut state = RecordingsState::Idle;

    for (pos, line) in source.lines().iter().enumerate() {
        let text = line.text.as_str();

        if text == s.location_header {
            state = match names_by_header.get(&pos) {
                Some(name) => {
                    let idx = *index_by_name.entry(name.to_string()).or_insert_with(|| {
                        readings.push(LocationReadings::new(name));
                        readings.len() - 1
                    });
                    RecordingsState::Located(idx)
                }
                None => RecordingsState::Idle,
            };
            continue;
        }

        match state {
            RecordingsState::Located(idx) if text == s.recordings => {
                debug!(location = %readings[idx].name, "recordings region opened");
                state = RecordingsState::InRecordings(idx);
            }
            RecordingsState::InRecordings(idx) => {
                for (min, max) in celsius_pairs(text) {
                    if config.is_plausible(min) && config.is_plausible(max) {
                        readings[idx].mins.push(min);
                        readings[idx].maxs.push(max);
                    } else {
                        debug!(
                            location = %readings[idx].name,
                            min, max, "dropping implausible reading"
                        );
                    }
                }
            }
            _ => {}
        }
    }

    readings
}

/// Reduce readings to one minimum and one maximum sample per location.
///
/// Locations missing either side contribute nothing.
pub fn reduce_samples(readings: &[LocationReadings]) -> Vec<TemperatureSample> {
    let mut samples = Vec::new();

    for r in readings {
        let Some((min, max)) = r.extremes() else {
            debug!(location = %r.name, "no complete min/max readings");
            continue;
        };

        debug!(
            location = %r.name,
            readings = r.mins.len(),
            min, max, "daily extremes"
        );

        samples.push(TemperatureSample {
            value: min,
            kind: SampleKind::Minimum,
            location_name: r.name.clone(),
            sample_count: r.mins.len(),
        });
        samples.push(TemperatureSample {
            value: max,
            kind: SampleKind::Maximum,
            location_name: r.name.clone(),
            sample_count: r.maxs.len(),
        });
    }

    samples
}
