use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trust rating for how reliably a location name was extracted.
///
/// Variants are declared low to high so the derived ordering ranks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::Low => write!(f, "low"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::High => write!(f, "high"),
        }
    }
}

impl Confidence {
    pub fn from_str_loose(s: &str) -> Option<Confidence> {
        match s.trim().to_lowercase().as_str() {
            "high" => Some(Confidence::High),
            "medium" => Some(Confidence::Medium),
            "low" => Some(Confidence::Low),
            _ => None,
        }
    }

    /// The higher of the two ratings.
    pub fn upgraded(self, other: Confidence) -> Confidence {
        self.max(other)
    }
}

/// Temperature bounds in °C.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub min: f64,
    pub max: f64,
}

/// Semantic kind of a monitored storage location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    Vaccine,
    Insulin,
    Fridge,
    Freezer,
    Room,
    Controlled,
    Custom,
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LocationType::Vaccine => "vaccine",
            LocationType::Insulin => "insulin",
            LocationType::Fridge => "fridge",
            LocationType::Freezer => "freezer",
            LocationType::Room => "room",
            LocationType::Controlled => "controlled",
            LocationType::Custom => "custom",
        };
        write!(f, "{s}")
    }
}

impl LocationType {
    pub fn from_str_loose(s: &str) -> Option<LocationType> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "vaccine" => Some(LocationType::Vaccine),
            "insulin" => Some(LocationType::Insulin),
            "fridge" | "refrigerator" => Some(LocationType::Fridge),
            "freezer" => Some(LocationType::Freezer),
            "room" => Some(LocationType::Room),
            "controlled" => Some(LocationType::Controlled),
            "custom" => Some(LocationType::Custom),
            _ => None,
        }
    }

    /// Thresholds applied when a report carried no explicit alarm limits.
    pub fn default_thresholds(self) -> Thresholds {
        let (min, max) = match self {
            LocationType::Fridge | LocationType::Vaccine | LocationType::Insulin => (2.0, 8.0),
            LocationType::Freezer => (-25.0, -15.0),
            // medicine storage, not comfort
            LocationType::Room | LocationType::Controlled => (0.0, 25.0),
            LocationType::Custom => (0.0, 30.0),
        };
        Thresholds { min, max }
    }

    /// Rank used when two observations disagree on the type; higher wins.
    pub fn specificity(self) -> u8 {
        match self {
            LocationType::Vaccine => 5,
            LocationType::Insulin => 4,
            LocationType::Fridge | LocationType::Freezer => 3,
            LocationType::Room | LocationType::Controlled => 2,
            LocationType::Custom => 1,
        }
    }
}

/// One structured location header region of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationBlock {
    pub name: String,
    pub raw_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub device_serial: Option<String>,
    #[serde(default)]
    pub device_model: Option<String>,
    #[serde(default)]
    pub log_interval: Option<String>,
    #[serde(default)]
    pub min_threshold: Option<f64>,
    #[serde(default)]
    pub max_threshold: Option<f64>,
    /// Position of the header sentinel in the report's line sequence.
    pub header_line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleKind {
    Minimum,
    Maximum,
}

impl fmt::Display for SampleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleKind::Minimum => write!(f, "minimum"),
            SampleKind::Maximum => write!(f, "maximum"),
        }
    }
}

/// Absolute daily minimum or maximum of one location, in °C.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureSample {
    pub value: f64,
    pub kind: SampleKind,
    pub location_name: String,
    /// Raw readings folded into this value.
    pub sample_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyLocationSummary {
    pub location: String,
    pub min_temp: f64,
    pub max_temp: f64,
    pub readings_count: usize,
    pub date: NaiveDate,
}

/// Per-report rollup handed to the spreadsheet/announcement layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub source: String,
    pub locations: Vec<DailyLocationSummary>,
}

/// Result of parsing one report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseOutcome {
    pub locations: Vec<LocationBlock>,
    pub temperatures: Vec<TemperatureSample>,
    pub daily_summary: Option<DailySummary>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub source: String,
    pub text_length: usize,
}

impl ParseOutcome {
    /// Outcome for a report whose text could not be extracted.
    pub fn failed(source: &str, error: impl Into<String>) -> Self {
        ParseOutcome {
            locations: Vec::new(),
            temperatures: Vec::new(),
            daily_summary: None,
            success: false,
            error: Some(error.into()),
            source: source.to_string(),
            text_length: 0,
        }
    }

    /// Names of all locations found, in report order.
    pub fn location_names(&self) -> Vec<&str> {
        self.locations.iter().map(|l| l.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_ordering() {
        assert!(Confidence::High > Confidence::Medium);
        assert!(Confidence::Medium > Confidence::Low);
        assert_eq!(Confidence::Medium.upgraded(Confidence::Low), Confidence::Medium);
        assert_eq!(Confidence::Low.upgraded(Confidence::High), Confidence::High);
    }

    #[test]
    fn test_confidence_from_str_loose() {
        assert_eq!(Confidence::from_str_loose(" HIGH "), Some(Confidence::High));
        assert_eq!(Confidence::from_str_loose("low"), Some(Confidence::Low));
        assert_eq!(Confidence::from_str_loose("certain"), None);
    }

    #[test]
    fn test_default_thresholds() {
        assert_eq!(
            LocationType::Fridge.default_thresholds(),
            Thresholds { min: 2.0, max: 8.0 }
        );
        assert_eq!(LocationType::Freezer.default_thresholds().min, -25.0);
        assert_eq!(LocationType::Custom.default_thresholds().max, 30.0);
    }

    #[test]
    fn test_specificity_order() {
        assert!(LocationType::Vaccine.specificity() > LocationType::Insulin.specificity());
        assert!(LocationType::Insulin.specificity() > LocationType::Fridge.specificity());
        assert_eq!(
            LocationType::Fridge.specificity(),
            LocationType::Freezer.specificity()
        );
        assert!(LocationType::Room.specificity() > LocationType::Custom.specificity());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&LocationType::Freezer).unwrap();
        assert_eq!(json, "\"freezer\"");
        let c: Confidence = serde_json::from_str("\"medium\"").unwrap();
        assert_eq!(c, Confidence::Medium);
    }

    #[test]
    fn test_failed_outcome_is_empty() {
        let outcome = ParseOutcome::failed("report.pdf", "no backend");
        assert!(!outcome.success);
        assert!(outcome.locations.is_empty());
        assert!(outcome.temperatures.is_empty());
        assert!(outcome.daily_summary.is_none());
        assert_eq!(outcome.error.as_deref(), Some("no backend"));
    }
}
