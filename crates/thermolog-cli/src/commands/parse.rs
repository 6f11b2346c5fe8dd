use std::path::PathBuf;
use thermolog_core::error::ThermologError;
use thermolog_core::extraction::fallback::FallbackExtractor;
use thermolog_core::parsing::validate_format;

use crate::commands::resolve_config;
use crate::output;

pub fn run(
    pdf_file: PathBuf,
    output_format: &str,
    output_file: Option<PathBuf>,
    profile: &str,
    config_file: Option<PathBuf>,
) -> Result<(), ThermologError> {
    let config = resolve_config(profile, config_file)?;
    let pdf_bytes = std::fs::read(&pdf_file)?;
    let extractor = FallbackExtractor::standard();
    let filename = pdf_file.display().to_string();
    let parsed = thermolog_core::parse_pdf(&pdf_bytes, &filename, &extractor, &config);

    if !parsed.success {
        return Err(ThermologError::Extraction(
            parsed.error.unwrap_or_else(|| "unknown error".into()),
        ));
    }

    match output_file {
        Some(path) => {
            // Always write JSON when saving to file
            let json = serde_json::to_string_pretty(&parsed)?;
            std::fs::write(&path, json)?;
            eprintln!(
                "Parsed {} location(s), {} sample(s), written to {}",
                parsed.locations.len(),
                parsed.temperatures.len(),
                path.display()
            );
            if parsed.daily_summary.is_none() {
                eprintln!("  no location had both a minimum and a maximum reading");
            }
        }
        None => match output_format {
            "json" => output::json::print(&parsed)?,
            _ => println!("{}", output::table::format_outcome(&parsed)),
        },
    }

    Ok(())
}

pub fn validate(
    pdf_file: PathBuf,
    profile: &str,
    config_file: Option<PathBuf>,
) -> Result<(), ThermologError> {
    let config = resolve_config(profile, config_file)?;
    let pdf_bytes = std::fs::read(&pdf_file)?;
    let text = thermolog_core::extract_text(&pdf_bytes, &FallbackExtractor::standard())?;
    let check = validate_format(&text, &config);

    if check.valid {
        println!("{}: looks like a {} report", pdf_file.display(), config.name);
        return Ok(());
    }

    println!("{}: not a recognised {} report", pdf_file.display(), config.name);
    for section in &check.missing {
        println!("  missing {section}");
    }
    Err(ThermologError::LayoutMismatch(config.name))
}
