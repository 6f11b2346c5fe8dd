mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use thermolog_core::model::{Confidence, LocationType};

#[derive(Parser)]
#[command(
    name = "thermolog",
    version,
    about = "Temperature logger report parser and location registry"
)]
struct Cli {
    /// Log debug detail to stderr (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a logger PDF into locations, daily extremes and a summary
    Parse {
        /// Path to the PDF report
        input_file: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write parsed output to a JSON file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,

        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Check whether a PDF has the expected report layout
    Validate {
        /// Path to the PDF report
        input_file: PathBuf,

        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Parse reports and record their locations in the registry
    Ingest {
        /// One or more PDF reports
        #[arg(required = true)]
        input_files: Vec<PathBuf>,

        /// Registry JSON file
        #[arg(short, long, default_value = "locations.json")]
        registry: PathBuf,

        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Review and manage discovered locations
    Locations {
        /// Registry JSON file
        #[arg(short, long, default_value = "locations.json", global = true)]
        registry: PathBuf,

        #[command(subcommand)]
        action: LocationsAction,
    },
    /// Inspect and validate parser profiles
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Parser profile selection shared by the report commands.
#[derive(clap::Args)]
struct ConfigArgs {
    /// Built-in parser profile
    #[arg(short, long, default_value = "clever-logger")]
    profile: String,

    /// Custom JSON parser config (overrides --profile)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum LocationsAction {
    /// List every known location
    List {
        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Locations awaiting review, most credible first
    Unconfigured {
        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Hide locations rated below this: low, medium or high
        #[arg(long, value_parser = parse_confidence)]
        min_confidence: Option<Confidence>,
    },
    /// Totals plus the review queue
    Summary,
    /// Existing locations a name might be a variant of
    Suggest {
        name: String,

        /// Minimum similarity (0-100)
        #[arg(long, default_value_t = thermolog_core::registry::DEFAULT_SUGGEST_THRESHOLD)]
        threshold: f64,
    },
    /// Fold SOURCE into TARGET and delete SOURCE
    Merge { source: String, target: String },
    /// Mark a location as reviewed, optionally overriding type and limits
    Configure {
        key: String,

        /// fridge, freezer, vaccine, insulin, room, controlled or custom
        #[arg(long = "type", value_parser = parse_location_type)]
        location_type: Option<LocationType>,

        #[arg(long, allow_hyphen_values = true)]
        min: Option<f64>,

        #[arg(long, allow_hyphen_values = true)]
        max: Option<f64>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// List built-in parser profiles
    List,
    /// Print a built-in profile as JSON
    Show {
        #[arg(short, long, default_value = "clever-logger")]
        profile: String,
    },
    /// Validate a custom parser config file
    Validate {
        /// Path to JSON parser config
        file: PathBuf,
    },
}

fn parse_location_type(s: &str) -> Result<LocationType, String> {
    LocationType::from_str_loose(s).ok_or_else(|| format!("unknown location type '{s}'"))
}

fn parse_confidence(s: &str) -> Result<Confidence, String> {
    Confidence::from_str_loose(s).ok_or_else(|| format!("unknown confidence '{s}'"))
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Parse {
            input_file,
            output,
            out,
            config,
        } => commands::parse::run(input_file, &output, out, &config.profile, config.config),
        Commands::Validate { input_file, config } => {
            commands::parse::validate(input_file, &config.profile, config.config)
        }
        Commands::Ingest {
            input_files,
            registry,
            config,
        } => commands::ingest::run(&input_files, &registry, &config.profile, config.config),
        Commands::Locations { registry, action } => match action {
            LocationsAction::List { output } => commands::locations::list(&registry, &output),
            LocationsAction::Unconfigured {
                output,
                min_confidence,
            } => commands::locations::unconfigured(&registry, &output, min_confidence),
            LocationsAction::Summary => commands::locations::summary(&registry),
            LocationsAction::Suggest { name, threshold } => {
                commands::locations::suggest(&registry, &name, threshold)
            }
            LocationsAction::Merge { source, target } => {
                commands::locations::merge(&registry, &source, &target)
            }
            LocationsAction::Configure {
                key,
                location_type,
                min,
                max,
            } => commands::locations::configure(&registry, &key, location_type, min, max),
        },
        Commands::Config { action } => match action {
            ConfigAction::List => commands::config::list(),
            ConfigAction::Show { profile } => commands::config::show(&profile),
            ConfigAction::Validate { file } => commands::config::validate(&file),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_confidence_floor() {
        let cli = Cli::try_parse_from([
            "thermolog",
            "locations",
            "unconfigured",
            "--min-confidence",
            "Medium",
        ])
        .unwrap();
        match cli.command {
            Commands::Locations {
                action: LocationsAction::Unconfigured { min_confidence, .. },
                ..
            } => assert_eq!(min_confidence, Some(Confidence::Medium)),
            _ => panic!("expected locations unconfigured"),
        }
    }

    #[test]
    fn test_unknown_confidence_rejected() {
        assert!(Cli::try_parse_from([
            "thermolog",
            "locations",
            "unconfigured",
            "--min-confidence",
            "certain",
        ])
        .is_err());
    }
}
