use crate::config::schema::ParserConfig;
use crate::extraction::lines::{LineSource, RawLine};
use crate::model::LocationBlock;
use crate::parsing::values::first_celsius;
use tracing::debug;

/// Fields collected for the location block currently being read.
#[derive(Debug, Default)]
struct BlockBuilder {
    header_line: usize,
    name: Option<String>,
    description: Option<String>,
    device_serial: Option<String>,
    device_model: Option<String>,
    log_interval: Option<String>,
    min_threshold: Option<f64>,
    max_threshold: Option<f64>,
}

impl BlockBuilder {
    fn new(header_line: usize) -> Self {
        BlockBuilder {
            header_line,
            ..Default::default()
        }
    }

    /// A block without a resolved name is unusable and yields nothing.
    fn finish(self) -> Option<LocationBlock> {
        let name = self.name?.trim().to_string();
        if name.is_empty() {
            return None;
        }
        Some(LocationBlock {
            raw_name: name.clone(),
            name,
            description: self.description,
            device_serial: self.device_serial,
            device_model: self.device_model,
            log_interval: self.log_interval,
            min_threshold: self.min_threshold,
            max_threshold: self.max_threshold,
            header_line: self.header_line,
        })
    }
}

enum ScanState {
    Scanning,
    InHeader(BlockBuilder),
}

#[derive(Debug, PartialEq, Eq)]
enum Step {
    Continue,
    Finish,
}

enum ThresholdSide {
    Low,
    High,
}

/// Segment a report's lines into location blocks.
///
/// Each header sentinel opens a fresh block, discarding an unfinished one.
/// A block is emitted when the terminator line is reached with a name
/// already resolved. Layout noise never raises: incomplete blocks are simply
/// dropped.
pub fn parse_blocks(source: &LineSource, config: &ParserConfig) -> Vec<LocationBlock> {
    let lines = source.lines();
    let header = config.sentinels.location_header.as_str();
    let mut blocks = Vec::new();
    let mut state = ScanState::Scanning;

    for (pos, line) in lines.iter().enumerate() {
        if line.text == header {
            if let ScanState::InHeader(unfinished) = &state {
                debug!(
                    header_line = unfinished.header_line,
                    "discarding unfinished location block"
                );
            }
            debug!(pos, page = line.page_index, "location block opened");
            state = ScanState::InHeader(BlockBuilder::new(pos));
            continue;
        }

        let finished = match &mut state {
            ScanState::InHeader(builder) => apply_line(builder, lines, pos, config) == Step::Finish,
            ScanState::Scanning => false,
        };

        if finished {
            if let ScanState::InHeader(done) = std::mem::replace(&mut state, ScanState::Scanning) {
                if let Some(block) = done.finish() {
                    debug!(name = %block.name, "location block completed");
                    blocks.push(block);
                }
            }
        }
    }

    blocks
}

/// Feed one line into the open block.
fn apply_line(
    builder: &mut BlockBuilder,
    lines: &[RawLine],
    pos: usize,
    config: &ParserConfig,
) -> Step {
    let s = &config.sentinels;
    let text = lines[pos].text.as_str();

    if builder.name.is_none() && label_rest(text, &s.name_label).is_some() {
        builder.name = resolve_name(lines, pos, config);
        if let Some(name) = &builder.name {
            debug!(name = %name, "name resolved");
        }
    } else if let Some(rest) = label_rest(text, &s.description_label) {
        if let Some(desc) = field_value(rest, lines, pos, config) {
            builder.description = Some(desc);
        }
    } else if let Some(rest) = label_rest(text, &s.device_model_label) {
        if let Some(model) = field_value(rest, lines, pos, config) {
            builder.device_model = Some(model);
        }
    } else if let Some(rest) = label_rest(text, &s.log_interval_label) {
        if let Some(interval) = field_value(rest, lines, pos, config) {
            builder.log_interval = Some(interval);
        }
    } else if text.contains(s.serial_marker.as_str()) {
        if let Some(serial) = serial_after_marker(text, &s.serial_marker) {
            debug!(serial = %serial, "device serial");
            builder.device_serial = Some(serial);
        }
    } else if text.contains(s.alarm_marker.as_str()) {
        let side = threshold_side(lines, pos, builder.header_line, config);
        match (side, first_celsius(text)) {
            (Some(ThresholdSide::Low), Some(value)) => {
                debug!(value, "low alarm threshold");
                builder.min_threshold = Some(value);
            }
            (Some(ThresholdSide::High), Some(value)) => {
                debug!(value, "high alarm threshold");
                builder.max_threshold = Some(value);
            }
            _ => {}
        }
    } else if text == s.terminator && builder.name.is_some() {
        return Step::Finish;
    }

    Step::Continue
}

/// If `line` starts with `label` as a whole word, return what follows it
/// (colon and whitespace stripped; possibly empty).
fn label_rest<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(label)?;
    match rest.chars().next() {
        None => Some(""),
        Some(c) if c == ':' || c.is_whitespace() => {
            Some(rest.trim_start_matches(|c: char| c == ':' || c.is_whitespace()))
        }
        Some(_) => None,
    }
}

/// A line that bounds a field lookahead.
fn is_boundary(line: &str, config: &ParserConfig) -> bool {
    config.is_field_label(line) || line == config.sentinels.location_header
}

fn acceptable_name(candidate: &str, config: &ParserConfig) -> bool {
    !candidate.is_empty()
        && !config.is_field_label(candidate)
        && !config.is_serial_token(candidate)
        && candidate.chars().count() < config.max_name_len
}

/// Resolve the location name for the Name label at `pos`.
///
/// Same-line content wins. Otherwise up to `name_lookahead` following lines
/// are tried; the search never crosses a field label.
fn resolve_name(lines: &[RawLine], pos: usize, config: &ParserConfig) -> Option<String> {
    let rest = label_rest(&lines[pos].text, &config.sentinels.name_label)?;
    if acceptable_name(rest, config) {
        return Some(rest.to_string());
    }

    for next in lines.iter().skip(pos + 1).take(config.name_lookahead) {
        let candidate = next.text.as_str();
        if is_boundary(candidate, config) {
            debug!(label = candidate, "name lookahead stopped at field label");
            return None;
        }
        if acceptable_name(candidate, config) {
            return Some(candidate.to_string());
        }
    }

    None
}

/// Value of a simple label field: same-line content, else the next line
/// unless that line is itself a label.
fn field_value(rest: &str, lines: &[RawLine], pos: usize, config: &ParserConfig) -> Option<String> {
    if !rest.is_empty() && !config.is_field_label(rest) {
        return Some(rest.to_string());
    }
    let next = lines.get(pos + 1)?.text.as_str();
    if is_boundary(next, config) {
        None
    } else {
        Some(next.to_string())
    }
}

/// Numeric token after the serial marker, e.g. "Device S/N: 102345" -> "102345".
fn serial_after_marker(line: &str, marker: &str) -> Option<String> {
    let idx = line.find(marker)?;
    let after = line[idx + marker.len()..].trim_start();
    let digits: String = after.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        None
    } else {
        Some(digits)
    }
}

/// Decide whether the alarm threshold at `pos` is the low or high one.
///
/// The current line is checked first, then prior lines nearest-first, never
/// reaching back past the block header.
fn threshold_side(
    lines: &[RawLine],
    pos: usize,
    header_line: usize,
    config: &ParserConfig,
) -> Option<ThresholdSide> {
    let s = &config.sentinels;
    let earliest = pos
        .saturating_sub(config.threshold_context_lines)
        .max(header_line);

    for i in (earliest..=pos).rev() {
        let text = lines[i].text.as_str();
        if text.contains(s.low_marker.as_str()) {
            return Some(ThresholdSide::Low);
        }
        if text.contains(s.high_marker.as_str()) {
            return Some(ThresholdSide::High);
        }
    }
    None
}
