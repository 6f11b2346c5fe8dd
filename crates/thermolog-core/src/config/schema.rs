use serde::{Deserialize, Serialize};

/// Sentinel headings and field labels of one vendor's report layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sentinels {
    /// Line that opens a location block, e.g. "Location Details".
    pub location_header: String,
    /// Line that closes a block once a name is known.
    pub terminator: String,
    /// Line that opens the min/max readings table of a location.
    pub recordings: String,
    pub name_label: String,
    pub description_label: String,
    pub device_model_label: String,
    pub log_interval_label: String,
    /// Marker preceding the numeric device serial, e.g. "Device S/N:".
    pub serial_marker: String,
    pub alarm_marker: String,
    pub low_marker: String,
    pub high_marker: String,
}

impl Default for Sentinels {
    fn default() -> Self {
        Sentinels {
            location_header: "Location Details".into(),
            terminator: "Temperature".into(),
            recordings: "Recordings".into(),
            name_label: "Name".into(),
            description_label: "Description".into(),
            device_model_label: "Device Model".into(),
            log_interval_label: "Log Interval".into(),
            serial_marker: "Device S/N:".into(),
            alarm_marker: "Alarm Threshold".into(),
            low_marker: "Low Temperature".into(),
            high_marker: "High Temperature".into(),
        }
    }
}

/// Tuning for the structured report parser.
///
/// The lookahead window and name length cap are heuristics; vendors with
/// different layouts may need them retuned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub sentinels: Sentinels,
    /// Lines that are field labels and never a location name.
    pub field_labels: Vec<String>,
    /// Prefixes of serial/device tokens that are never a location name.
    pub serial_prefixes: Vec<String>,
    /// How many following lines may hold the name when the label stands alone.
    pub name_lookahead: usize,
    /// Same-line and lookahead names must be shorter than this.
    pub max_name_len: usize,
    /// Prior lines inspected for the low/high marker of an alarm threshold.
    pub threshold_context_lines: usize,
    /// Readings outside [plausible_min, plausible_max] are dropped.
    pub plausible_min: f64,
    pub plausible_max: f64,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            name: "clever-logger".into(),
            description: None,
            sentinels: Sentinels::default(),
            field_labels: [
                "Description",
                "Device",
                "Device Model",
                "Log Interval",
                "View Location",
                "Temperature",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            serial_prefixes: ["S/N:", "CLT-", "Device S/N:"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            name_lookahead: 2,
            max_name_len: 50,
            threshold_context_lines: 2,
            plausible_min: -50.0,
            plausible_max: 100.0,
        }
    }
}

impl ParserConfig {
    pub fn is_field_label(&self, line: &str) -> bool {
        self.field_labels.iter().any(|l| l == line)
    }

    pub fn is_serial_token(&self, line: &str) -> bool {
        self.serial_prefixes.iter().any(|p| line.starts_with(p.as_str()))
    }

    pub fn is_plausible(&self, value: f64) -> bool {
        value >= self.plausible_min && value <= self.plausible_max
    }
}
