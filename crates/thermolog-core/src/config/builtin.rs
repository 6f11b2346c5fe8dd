use crate::config::schema::ParserConfig;
use crate::error::ThermologError;

const CLEVER_LOGGER_JSON: &str = include_str!("../../../../profiles/clever-logger.json");

/// Available built-in parser profiles.
pub const PROFILES: &[&str] = &["clever-logger"];

/// Profile used when none is requested.
pub const DEFAULT_PROFILE: &str = "clever-logger";

/// Load a built-in parser profile by name.
pub fn load_profile(name: &str) -> Result<ParserConfig, ThermologError> {
    match name {
        "clever-logger" => super::parse_config_str(CLEVER_LOGGER_JSON),
        _ => Err(ThermologError::ConfigInvalid(format!(
            "unknown profile '{}'. Available: {}",
            name,
            PROFILES.join(", ")
        ))),
    }
}
