use crate::config::schema::ParserConfig;
use crate::locations::classify::infer_type_from_context;
use crate::locations::confidence::calculate_confidence;
use crate::locations::normalize::normalize_location_name;
use crate::locations::DiscoveredCandidate;
use crate::model::{LocationType, Thresholds};
use crate::parsing::values::parse_number;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::{debug, info};

/// Lines on each side of a match searched for threshold hints.
const CONTEXT_LINES: usize = 3;

/// Characters of the source line kept as context on a candidate.
const CONTEXT_CHARS: usize = 100;

static LOCATION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // fridge / refrigerator
        r"(main|primary|central|pharmacy)\s*(?:fridge|refrigerator|ref)\b",
        r"(vaccine|medicine|drug)\s*(?:fridge|refrigerator|storage)",
        r"(fridge|refrigerator)\s*([a-z0-9]*)",
        r"(?:fridge|refrigerator)\s*(main|primary|central|[a-z0-9]+)",
        // rooms and areas
        r"(storage|pharmacy|medicine|drug)\s*(?:room|area|zone)",
        r"(room|area|zone)\s*([a-z0-9]*)",
        r"(?:room|area)\s*(storage|pharmacy|medicine|[a-z0-9]+)",
        // freezers
        r"(main|primary|backup)\s*freezer",
        r"freezer\s*([a-z0-9]*)",
        // sensors and channels
        r"(?:sensor|probe|channel|monitor)\s*([a-z0-9]+)",
        r"(sensor|probe|channel)\s*([a-z0-9]*)",
        // pharmacy equipment
        r"(vaccine|insulin|medication)\s*(?:storage|fridge|cabinet)",
        r"(controlled|schedule)\s*(?:drug|substance)\s*(?:storage|cabinet)",
    ]
    .iter()
    .map(|p| Regex::new(&format!("(?i){p}")).expect("valid location pattern"))
    .collect()
});

const NUM: &str = r"([+-]?\d+\.?\d*)";

static MIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"min(?:imum)?[:\s]*{NUM}")).expect("valid min regex"));

static MAX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"max(?:imum)?[:\s]*{NUM}")).expect("valid max regex"));

static RANGE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        format!(r"{NUM}\s*°?[cf]?\s*[-–—]\s*{NUM}\s*°?[cf]?"),
        format!(r"between\s+{NUM}\s+and\s+{NUM}"),
        format!(r"from\s+{NUM}\s+to\s+{NUM}"),
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid range regex"))
    .collect()
});

/// Keyword-driven location discovery for text without structured blocks.
pub fn extract_fallback_locations(
    text: &str,
    source: &str,
    config: &ParserConfig,
) -> Vec<DiscoveredCandidate> {
    let lines: Vec<&str> = text.lines().collect();
    let mut found = Vec::new();

    for (line_num, original) in lines.iter().enumerate() {
        let line = original.trim().to_lowercase();
        if line.is_empty() {
            continue;
        }

        for pattern in LOCATION_PATTERNS.iter() {
            for m in pattern.find_iter(&line) {
                // The whole match keeps qualifiers like "main" next to the
                // equipment word they qualify.
                let raw = m.as_str().trim();
                if raw.is_empty() {
                    continue;
                }

                let name = normalize_location_name(raw);
                if name.chars().count() < 2 {
                    continue;
                }

                let location_type = infer_type_from_context(original, &name);
                let confidence = calculate_confidence(original, &name, source);
                let context = line_context(&lines, line_num, CONTEXT_LINES);
                let thresholds = extract_thresholds(&context, location_type, config);

                found.push(DiscoveredCandidate {
                    name,
                    location_type,
                    confidence,
                    min_temp: Some(thresholds.min),
                    max_temp: Some(thresholds.max),
                    description: None,
                    context: original.trim().chars().take(CONTEXT_CHARS).collect(),
                    source: source.to_string(),
                    line_number: line_num + 1,
                });
            }
        }
    }

    let unique = dedupe_candidates(found);
    info!(source, count = unique.len(), "fallback location discovery");
    unique
}

/// Join the trimmed lines within `size` of `line_num`.
fn line_context(lines: &[&str], line_num: usize, size: usize) -> String {
    let start = line_num.saturating_sub(size);
    let end = (line_num + size + 1).min(lines.len());
    lines[start..end]
        .iter()
        .map(|l| l.trim())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Thresholds stated near a match, completed from the type's defaults.
///
/// Explicit "min:"/"max:" values are read first; a range ("2°C - 8°C",
/// "between 2 and 8", "from 2 to 8") overrides both. Values outside the
/// plausibility bounds are ignored.
pub fn extract_thresholds(
    context: &str,
    location_type: LocationType,
    config: &ParserConfig,
) -> Thresholds {
    let lower = context.to_lowercase();
    let capture = |re: &Regex| {
        re.captures(&lower)
            .and_then(|c| c.get(1))
            .and_then(|m| parse_number(m.as_str()))
            .filter(|v| config.is_plausible(*v))
    };

    let mut min = capture(&MIN_RE);
    let mut max = capture(&MAX_RE);

    for re in RANGE_RES.iter() {
        let range = re.captures(&lower).and_then(|c| {
            let a = parse_number(c.get(1)?.as_str())?;
            let b = parse_number(c.get(2)?.as_str())?;
            Some((a, b))
        });
        if let Some((a, b)) = range {
            if config.is_plausible(a) && config.is_plausible(b) {
                min = Some(a.min(b));
                max = Some(a.max(b));
                break;
            }
        }
    }

    let defaults = location_type.default_thresholds();
    Thresholds {
        min: min.unwrap_or(defaults.min),
        max: max.unwrap_or(defaults.max),
    }
}

/// Collapse exact duplicates (same name, same source), merging their data.
pub fn dedupe_candidates(candidates: Vec<DiscoveredCandidate>) -> Vec<DiscoveredCandidate> {
    let mut unique: Vec<DiscoveredCandidate> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for candidate in candidates {
        let key = (candidate.name.clone(), candidate.source.clone());
        match index.get(&key) {
            Some(&i) => {
                debug!(name = %candidate.name, "merging duplicate location");
                unique[i].merge_from(&candidate);
            }
            None => {
                index.insert(key, unique.len());
                unique.push(candidate);
            }
        }
    }

    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Confidence;

    fn candidate(name: &str, confidence: Confidence, ty: LocationType) -> DiscoveredCandidate {
        DiscoveredCandidate {
            name: name.into(),
            location_type: ty,
            confidence,
            min_temp: None,
            max_temp: None,
            description: None,
            context: String::new(),
            source: "mail.txt".into(),
            line_number: 1,
        }
    }

    #[test]
    fn test_finds_main_fridge() {
        let text = "Daily temperature log\nMain fridge reading 4.5°C\n";
        let found = extract_fallback_locations(text, "report.pdf", &ParserConfig::default());
        let main = found.iter().find(|c| c.name == "Main Fridge").unwrap();
        assert_eq!(main.location_type, LocationType::Fridge);
        assert_eq!(main.confidence, Confidence::High);
        assert_eq!(main.line_number, 2);
    }

    #[test]
    fn test_no_matches_in_unrelated_text() {
        let found = extract_fallback_locations("Invoice total 42", "a.txt", &ParserConfig::default());
        assert!(found.is_empty());
    }

    #[test]
    fn test_duplicates_collapsed() {
        let text = "main fridge ok\nmain fridge ok\n";
        let found = extract_fallback_locations(text, "a.txt", &ParserConfig::default());
        let count = found.iter().filter(|c| c.name == "Main Fridge").count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_thresholds_from_range() {
        let t = extract_thresholds("keep between 2 and 8", LocationType::Custom, &ParserConfig::default());
        assert_eq!(t, Thresholds { min: 2.0, max: 8.0 });

        let t = extract_thresholds("range 8°C - 2°C", LocationType::Custom, &ParserConfig::default());
        assert_eq!(t, Thresholds { min: 2.0, max: 8.0 });
    }

    #[test]
    fn test_thresholds_from_min_max_labels() {
        let t = extract_thresholds("min: -22 ", LocationType::Freezer, &ParserConfig::default());
        assert_eq!(t.min, -22.0);
        assert_eq!(t.max, -15.0);
    }

    #[test]
    fn test_thresholds_default_by_type() {
        let t = extract_thresholds("nothing here", LocationType::Room, &ParserConfig::default());
        assert_eq!(t, Thresholds { min: 0.0, max: 25.0 });
    }

    #[test]
    fn test_implausible_range_ignored() {
        let t = extract_thresholds("ticket 1200 - 1500", LocationType::Fridge, &ParserConfig::default());
        assert_eq!(t, Thresholds { min: 2.0, max: 8.0 });
    }

    #[test]
    fn test_dedupe_keeps_higher_confidence_and_specific_type() {
        let mut first = candidate("Main Fridge", Confidence::Low, LocationType::Fridge);
        first.max_temp = Some(8.0);
        let mut second = candidate("Main Fridge", Confidence::Medium, LocationType::Vaccine);
        second.min_temp = Some(2.0);
        second.max_temp = Some(9.0);

        let merged = dedupe_candidates(vec![first, second]);
        assert_eq!(merged.len(), 1);
        let m = &merged[0];
        assert_eq!(m.confidence, Confidence::Medium);
        assert_eq!(m.location_type, LocationType::Vaccine);
        assert_eq!(m.min_temp, Some(2.0));
        assert_eq!(m.max_temp, Some(8.0));
    }

    #[test]
    fn test_dedupe_respects_source() {
        let a = candidate("Room", Confidence::Low, LocationType::Room);
        let mut b = candidate("Room", Confidence::Low, LocationType::Room);
        b.source = "other.txt".into();
        assert_eq!(dedupe_candidates(vec![a, b]).len(), 2);
    }
}
