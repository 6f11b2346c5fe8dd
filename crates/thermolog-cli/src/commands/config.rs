use std::path::Path;
use thermolog_core::config::builtin;
use thermolog_core::error::ThermologError;

use crate::output;

pub fn list() -> Result<(), ThermologError> {
    println!("Available parser profiles:\n");
    for name in builtin::PROFILES {
        let cfg = builtin::load_profile(name)?;
        let default_marker = if *name == builtin::DEFAULT_PROFILE { " (default)" } else { "" };
        println!("  {:<16}{}", name, default_marker);
        if let Some(ref desc) = cfg.description {
            println!("                  {}", desc);
        }
        println!();
    }
    Ok(())
}

pub fn show(profile: &str) -> Result<(), ThermologError> {
    output::json::print(&builtin::load_profile(profile)?)
}

pub fn validate(file: &Path) -> Result<(), ThermologError> {
    let cfg = thermolog_core::config::load_config(file)?;

    println!("Parser config '{}' is valid.", cfg.name);
    println!(
        "  Blocks: '{}' ... '{}', readings after '{}'",
        cfg.sentinels.location_header, cfg.sentinels.terminator, cfg.sentinels.recordings
    );
    println!(
        "  Name lookahead: {} line(s), max {} chars",
        cfg.name_lookahead, cfg.max_name_len
    );
    println!(
        "  Plausible readings: {} to {} °C",
        cfg.plausible_min, cfg.plausible_max
    );

    // Suspicious but legal settings
    let mut warnings = Vec::new();
    if !cfg.field_labels.iter().any(|l| l == &cfg.sentinels.description_label) {
        warnings.push(format!(
            "description label '{}' is not a field label, so name lookahead may run past it",
            cfg.sentinels.description_label
        ));
    }
    if cfg.serial_prefixes.is_empty() {
        warnings.push("no serial prefixes: serial numbers may be taken as location names".into());
    }

    if !warnings.is_empty() {
        println!("\nWarnings:");
        for w in &warnings {
            println!("  - {}", w);
        }
    }

    Ok(())
}
