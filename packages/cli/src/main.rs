#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the Jerusalem rule map.
//!
//! Renders association rules as a terminal table and optional `GeoJSON`
//! map, lists segments and sites, or starts the API server. Running with no
//! subcommand opens an interactive menu.

mod interactive;
mod pipeline;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rule_map_render::DisplayOptions;
use rule_map_rule_models::{
    DEFAULT_MIN_CONFIDENCE, DEFAULT_MIN_SUPPORT, FilterCriteria, LocationField, SegmentSelection,
};
use rule_map_sites::jerusalem;
use rule_map_store::{RuleStore, available_locations};

use crate::pipeline::RenderRequest;

#[derive(Parser)]
#[command(name = "rule_map_cli", about = "Jerusalem association rule map")]
struct Cli {
    /// Directory holding the rule tables (overrides `RULE_MAP_DATA_DIR`)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// The three mutually exclusive segment dropdowns.
#[derive(Args)]
struct SegmentArgs {
    /// Age group (`young`, `old`)
    #[arg(long)]
    age: Option<String>,
    /// Religion (`jewish`, `christian`)
    #[arg(long)]
    religion: Option<String>,
    /// Continent (`europe`, `america`)
    #[arg(long)]
    continent: Option<String>,
}

impl SegmentArgs {
    fn selection(&self) -> Result<SegmentSelection, rule_map_rule_models::SelectionError> {
        SegmentSelection::parse(
            self.age.as_deref(),
            self.religion.as_deref(),
            self.continent.as_deref(),
        )
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Filter a rule table and print it, optionally writing the map as `GeoJSON`
    Render {
        #[command(flatten)]
        segment: SegmentArgs,
        /// Only keep rules with this exact site on `--field`
        #[arg(long)]
        location: Option<String>,
        /// Rule side `--location` is matched against
        #[arg(long, default_value = "from")]
        field: LocationField,
        /// Minimum support, in range [0,1]
        #[arg(long, default_value_t = DEFAULT_MIN_SUPPORT, value_parser = parse_threshold)]
        min_support: f64,
        /// Minimum confidence, in range [0,1]
        #[arg(long, default_value_t = DEFAULT_MIN_CONFIDENCE, value_parser = parse_threshold)]
        min_confidence: f64,
        /// Drop the lift column from the table
        #[arg(long)]
        no_lift: bool,
        /// Write the map primitives to this `GeoJSON` file
        #[arg(long)]
        geojson: Option<PathBuf>,
        /// Print the full render result as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List the location dropdown values for a segment
    Locations {
        #[command(flatten)]
        segment: SegmentArgs,
        /// Rule side to list
        #[arg(long, default_value = "from")]
        field: LocationField,
    },
    /// List all segments and whether their tables exist
    Segments,
    /// List all known sites and their coordinates
    Sites,
    /// Start the API server
    Serve,
}

/// Parses a threshold and checks it lies in `[0, 1]`.
fn parse_threshold(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{s}: {e}"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not in range [0,1]"))
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let store = cli
        .data_dir
        .map_or_else(RuleStore::from_env, RuleStore::new);

    let Some(command) = cli.command else {
        return interactive::run(&store);
    };

    match command {
        Commands::Render {
            segment,
            location,
            field,
            min_support,
            min_confidence,
            no_lift,
            geojson,
            json,
        } => {
            let request = RenderRequest {
                selection: segment.selection()?,
                criteria: FilterCriteria::new(min_support, min_confidence)
                    .with_location(location.as_deref(), field),
                options: DisplayOptions {
                    include_lift: !no_lift,
                },
                geojson,
            };
            let rendered = pipeline::run(&store, &request)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&rendered)?);
            } else {
                pipeline::write_table(&mut std::io::stdout().lock(), &rendered)?;
            }
        }
        Commands::Locations { segment, field } => {
            let segment = segment.selection()?.resolve()?;
            let rules = store.load(segment)?;
            for location in available_locations(&rules, field) {
                println!("{location}");
            }
        }
        Commands::Segments => {
            println!("{:<12} {:<24} AVAILABLE", "ID", "LABEL");
            println!("{}", "-".repeat(50));
            for (segment, available) in store.available_segments() {
                println!(
                    "{:<12} {:<24} {}",
                    segment.resource_id(),
                    segment.label(),
                    if available { "yes" } else { "no" }
                );
            }
        }
        Commands::Sites => {
            let registry = jerusalem();
            println!("{:<24} {:>10} {:>10}  ENGLISH", "NAME", "LAT", "LON");
            println!("{}", "-".repeat(70));
            for site in registry.sites() {
                println!(
                    "{:<24} {:>10.5} {:>10.5}  {}",
                    site.name,
                    site.latitude,
                    site.longitude,
                    site.english_name.as_deref().unwrap_or("")
                );
            }
        }
        Commands::Serve => {
            // SAFETY: single-threaded before the server starts; read once
            // during server initialisation.
            unsafe {
                std::env::set_var(rule_map_store::paths::DATA_DIR_ENV, store.data_dir());
            }
            actix_web::rt::System::new().block_on(rule_map_server::run_server())?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_accepts_unit_range() {
        assert_eq!(parse_threshold("0"), Ok(0.0));
        assert_eq!(parse_threshold("0.4"), Ok(0.4));
        assert_eq!(parse_threshold("1"), Ok(1.0));
    }

    #[test]
    fn threshold_rejects_out_of_range() {
        assert!(parse_threshold("1.5").is_err());
        assert!(parse_threshold("-0.1").is_err());
        assert!(parse_threshold("abc").is_err());
    }

    #[test]
    fn parses_location_field() {
        let cli =
            Cli::try_parse_from(["rule_map_cli", "locations", "--field", "TO"]).unwrap();
        let Some(Commands::Locations { field, .. }) = cli.command else {
            panic!("expected locations command");
        };
        assert_eq!(field, LocationField::To);

        assert!(Cli::try_parse_from(["rule_map_cli", "locations", "--field", "both"]).is_err());
    }

    #[test]
    fn parses_render_command() {
        let cli = Cli::try_parse_from([
            "rule_map_cli",
            "render",
            "--religion",
            "christian",
            "--field",
            "to",
            "--min-confidence",
            "0.6",
        ])
        .unwrap();

        let Some(Commands::Render {
            segment,
            field,
            min_support,
            min_confidence,
            ..
        }) = cli.command
        else {
            panic!("expected render command");
        };
        assert_eq!(field, LocationField::To);
        assert!((min_support - DEFAULT_MIN_SUPPORT).abs() < f64::EPSILON);
        assert!((min_confidence - 0.6).abs() < f64::EPSILON);
        assert_eq!(
            segment.selection().unwrap().resolve(),
            Ok(rule_map_rule_models::Segment::Christian)
        );
    }
}
