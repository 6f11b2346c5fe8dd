pub mod builtin;
pub mod schema;

use crate::error::ThermologError;
use schema::ParserConfig;
use std::path::Path;

/// Name lookahead window bounds, in lines.
pub const MIN_NAME_LOOKAHEAD: usize = 2;
pub const MAX_NAME_LOOKAHEAD: usize = 4;

/// Load a parser config from a JSON file.
pub fn load_config(path: &Path) -> Result<ParserConfig, ThermologError> {
    let content = std::fs::read_to_string(path).map_err(|e| ThermologError::ConfigLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let config: ParserConfig =
        serde_json::from_str(&content).map_err(|e| ThermologError::ConfigLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate_config(&config)?;
    Ok(config)
}

/// Parse a parser config from a JSON string (no file path context).
pub fn parse_config_str(json: &str) -> Result<ParserConfig, ThermologError> {
    let config: ParserConfig = serde_json::from_str(json)?;
    validate_config(&config)?;
    Ok(config)
}

/// Validate that a parser config is usable.
pub fn validate_config(config: &ParserConfig) -> Result<(), ThermologError> {
    let s = &config.sentinels;
    let required = [
        ("location_header", &s.location_header),
        ("terminator", &s.terminator),
        ("recordings", &s.recordings),
        ("name_label", &s.name_label),
        ("description_label", &s.description_label),
        ("serial_marker", &s.serial_marker),
        ("alarm_marker", &s.alarm_marker),
        ("low_marker", &s.low_marker),
        ("high_marker", &s.high_marker),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(ThermologError::ConfigInvalid(format!(
                "sentinel '{}' must not be empty",
                field
            )));
        }
    }

    if s.location_header == s.terminator {
        return Err(ThermologError::ConfigInvalid(
            "location_header and terminator must differ".into(),
        ));
    }

    if !(MIN_NAME_LOOKAHEAD..=MAX_NAME_LOOKAHEAD).contains(&config.name_lookahead) {
        return Err(ThermologError::ConfigInvalid(format!(
            "name_lookahead must be between {} and {} (got {})",
            MIN_NAME_LOOKAHEAD, MAX_NAME_LOOKAHEAD, config.name_lookahead
        )));
    }

    if config.max_name_len == 0 {
        return Err(ThermologError::ConfigInvalid(
            "max_name_len must be greater than 0".into(),
        ));
    }

    if config.plausible_min.is_nan()
        || config.plausible_max.is_nan()
        || config.plausible_min >= config.plausible_max
    {
        return Err(ThermologError::ConfigInvalid(format!(
            "plausible_min ({}) must be below plausible_max ({})",
            config.plausible_min, config.plausible_max
        )));
    }

    if config.field_labels.iter().any(|l| l.trim().is_empty()) {
        return Err(ThermologError::ConfigInvalid(
            "field labels must not be empty".into(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&ParserConfig::default()).is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg = parse_config_str(r#"{ "name": "tuned", "name_lookahead": 4 }"#).unwrap();
        assert_eq!(cfg.name, "tuned");
        assert_eq!(cfg.name_lookahead, 4);
        assert_eq!(cfg.max_name_len, 50);
        assert_eq!(cfg.sentinels.location_header, "Location Details");
    }

    #[test]
    fn test_lookahead_out_of_range_rejected() {
        assert!(parse_config_str(r#"{ "name_lookahead": 0 }"#).is_err());
        assert!(parse_config_str(r#"{ "name_lookahead": 1 }"#).is_err());
        assert!(parse_config_str(r#"{ "name_lookahead": 2 }"#).is_ok());
        assert!(parse_config_str(r#"{ "name_lookahead": 5 }"#).is_err());
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let json = r#"{ "plausible_min": 20.0, "plausible_max": -20.0 }"#;
        assert!(matches!(
            parse_config_str(json),
            Err(ThermologError::ConfigInvalid(_))
        ));
    }

    #[test]
    fn test_empty_sentinel_rejected() {
        let json = r#"{ "sentinels": { "recordings": "" } }"#;
        assert!(parse_config_str(json).is_err());
    }
}
