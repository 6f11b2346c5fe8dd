use crate::locations::normalize::is_generic_name;
use crate::model::Confidence;
use regex::Regex;
use std::sync::LazyLock;

const BASE_SCORE: i32 = 30;
const MONITORING_BONUS: i32 = 20;
const EQUIPMENT_BONUS: i32 = 25;
const PHARMACY_BONUS: i32 = 20;
const TEMPERATURE_VALUE_BONUS: i32 = 15;
const REPORT_STRUCTURE_BONUS: i32 = 10;
const QUALIFIER_BONUS: i32 = 15;
const GENERIC_NAME_PENALTY: i32 = 15;
const PDF_SOURCE_BONUS: i32 = 10;

pub const HIGH_CONFIDENCE_SCORE: i32 = 70;
pub const MEDIUM_CONFIDENCE_SCORE: i32 = 45;

const MONITORING_TERMS: &[&str] = &["temperature", "temp", "monitoring"];
const EQUIPMENT_TERMS: &[&str] = &["fridge", "refrigerator", "freezer"];
const PHARMACY_TERMS: &[&str] = &["vaccine", "medicine", "drug", "pharmacy"];
const REPORT_TERMS: &[&str] = &["daily", "report", "summary", "log"];

static TEMPERATURE_VALUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.?\d*\s*°?[cf]").expect("valid temperature regex"));

static QUALIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(main|primary|backup|vaccine|storage)").expect("valid qualifier regex")
});

/// Heuristic score for a location name found in free text.
pub fn confidence_score(line: &str, name: &str, source: &str) -> i32 {
    let line = line.to_lowercase();
    let name_lower = name.to_lowercase();
    let mentions = |terms: &[&str]| terms.iter().any(|t| line.contains(t));

    let mut score = BASE_SCORE;
    if mentions(MONITORING_TERMS) {
        score += MONITORING_BONUS;
    }
    if mentions(EQUIPMENT_TERMS) {
        score += EQUIPMENT_BONUS;
    }
    if mentions(PHARMACY_TERMS) {
        score += PHARMACY_BONUS;
    }
    if TEMPERATURE_VALUE_RE.is_match(&line) {
        score += TEMPERATURE_VALUE_BONUS;
    }
    if mentions(REPORT_TERMS) {
        score += REPORT_STRUCTURE_BONUS;
    }
    if QUALIFIER_RE.is_match(&name_lower) {
        score += QUALIFIER_BONUS;
    }
    if is_generic_name(&name_lower) {
        score -= GENERIC_NAME_PENALTY;
    }
    if source.to_lowercase().ends_with(".pdf") {
        score += PDF_SOURCE_BONUS;
    }
    score
}

pub fn confidence_from_score(score: i32) -> Confidence {
    if score >= HIGH_CONFIDENCE_SCORE {
        Confidence::High
    } else if score >= MEDIUM_CONFIDENCE_SCORE {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

pub fn calculate_confidence(line: &str, name: &str, source: &str) -> Confidence {
    confidence_from_score(confidence_score(line, name, source))
}
