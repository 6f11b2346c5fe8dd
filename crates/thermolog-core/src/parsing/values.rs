use regex::Regex;
use std::sync::LazyLock;

/// A number followed by a degrees-Celsius unit: "4.0°C", "-18.5 °C", "2ºC".
static CELSIUS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([-−]?\d+(?:[.,]\d+)?)\s*[°º]\s*C").expect("valid celsius regex")
});

/// Two degree-annotated numbers in sequence: one (min, max) reading.
static PAIR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([-−]?\d+(?:[.,]\d+)?)\s*[°º]\s*C\s+([-−]?\d+(?:[.,]\d+)?)\s*[°º]\s*C")
        .expect("valid pair regex")
});

/// Any degree-annotated number (°C or °F), used for format sniffing.
static ANY_DEGREE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:[.,]\d+)?\s*[°º]\s*[CF]").expect("valid degree regex"));

/// Parse a bare numeric token into °C.
///
/// Handles formats like:
/// - "4.0" -> 4.0
/// - "-18,5" -> -18.5 (decimal comma)
/// - "−20" -> -20.0 (unicode minus, common in PDF text)
pub fn parse_number(s: &str) -> Option<f64> {
    let normalized = s.trim().replace('−', "-").replace(',', ".");
    if normalized.is_empty() {
        return None;
    }
    normalized.parse::<f64>().ok()
}

/// First degree-annotated value on a line.
pub fn first_celsius(line: &str) -> Option<f64> {
    CELSIUS_RE
        .captures(line)
        .and_then(|c| c.get(1))
        .and_then(|m| parse_number(m.as_str()))
}

/// All adjacent (min, max) degree pairs on a line, left to right.
pub fn celsius_pairs(line: &str) -> Vec<(f64, f64)> {
    PAIR_RE
        .captures_iter(line)
        .filter_map(|c| {
            let min = parse_number(c.get(1)?.as_str())?;
            let max = parse_number(c.get(2)?.as_str())?;
            Some((min, max))
        })
        .collect()
}

/// Whether the text contains any temperature-looking value.
pub fn has_degree_value(text: &str) -> bool {
    ANY_DEGREE_RE.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number_plain() {
        assert_eq!(parse_number("4.0"), Some(4.0));
        assert_eq!(parse_number("  8  "), Some(8.0));
    }

    #[test]
    fn test_parse_number_decimal_comma() {
        assert_eq!(parse_number("-18,5"), Some(-18.5));
    }

    #[test]
    fn test_parse_number_unicode_minus() {
        assert_eq!(parse_number("−20.0"), Some(-20.0));
    }

    #[test]
    fn test_parse_number_rejects_garbage() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("n/a"), None);
    }

    #[test]
    fn test_first_celsius() {
        assert_eq!(first_celsius("Alarm Threshold 8.0°C (30 min)"), Some(8.0));
        assert_eq!(first_celsius("Alarm Threshold -20 °C"), Some(-20.0));
        assert_eq!(first_celsius("Alarm Threshold none"), None);
    }

    #[test]
    fn test_celsius_pairs_single() {
        assert_eq!(
            celsius_pairs("2025/08/14 05:59PM 4.0°C 4.8°C"),
            vec![(4.0, 4.8)]
        );
    }

    #[test]
    fn test_celsius_pairs_multiple_on_one_line() {
        let pairs = celsius_pairs("05:59PM 4.0°C 4.8°C 06:59PM 3.9°C 5.0°C");
        assert_eq!(pairs, vec![(4.0, 4.8), (3.9, 5.0)]);
    }

    #[test]
    fn test_celsius_pairs_negative() {
        assert_eq!(celsius_pairs("-19.5°C -17.0°C"), vec![(-19.5, -17.0)]);
    }

    #[test]
    fn test_lone_value_is_not_a_pair() {
        assert!(celsius_pairs("Average 4.2°C").is_empty());
    }

    #[test]
    fn test_has_degree_value() {
        assert!(has_degree_value("Max 46.4 °F"));
        assert!(!has_degree_value("Recordings"));
    }
}
