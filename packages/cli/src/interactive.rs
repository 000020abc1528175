#![allow(clippy::module_name_repetitions)]

//! Interactive TUI for the rule map.
//!
//! Mirrors the dashboard dropdowns: pick at most one segment, a location
//! and the two thresholds, then print the filtered table.

use std::path::PathBuf;

use dialoguer::{Confirm, Input, Select};
use rule_map_render::DisplayOptions;
use rule_map_rule_models::{
    ALL_CHOICE, DEFAULT_MIN_CONFIDENCE, DEFAULT_MIN_SUPPORT, FilterCriteria, LocationField,
    SegmentSelection,
};
use rule_map_store::{RuleStore, available_locations};

use crate::pipeline::{self, RenderRequest};

/// Top-level actions available in the interactive menu.
enum MenuAction {
    RenderRules,
    ListSegments,
    ListSites,
    StartServer,
}

impl MenuAction {
    const ALL: &[Self] = &[
        Self::RenderRules,
        Self::ListSegments,
        Self::ListSites,
        Self::StartServer,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::RenderRules => "Render rules",
            Self::ListSegments => "List segments",
            Self::ListSites => "List sites",
            Self::StartServer => "Start API server",
        }
    }
}

/// Runs the interactive menu.
///
/// # Errors
///
/// Returns an error if a prompt fails, the selection is ambiguous, or the
/// chosen operation fails.
pub fn run(store: &RuleStore) -> Result<(), Box<dyn std::error::Error>> {
    let labels: Vec<&str> = MenuAction::ALL.iter().map(MenuAction::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match MenuAction::ALL[idx] {
        MenuAction::RenderRules => render_rules(store)?,
        MenuAction::ListSegments => list_segments(store),
        MenuAction::ListSites => list_sites(),
        MenuAction::StartServer => {
            actix_web::rt::System::new().block_on(rule_map_server::interactive::run())?;
        }
    }

    Ok(())
}

fn render_rules(store: &RuleStore) -> Result<(), Box<dyn std::error::Error>> {
    let age = select_choice("Age", &["young", "old"])?;
    let religion = select_choice("Religion", &["jewish", "christian"])?;
    let continent = select_choice("Continent", &["europe", "america"])?;

    let selection = SegmentSelection::parse(Some(age), Some(religion), Some(continent))?;
    let segment = match selection.resolve() {
        Ok(segment) => segment,
        Err(e) => {
            println!("{e}");
            return Ok(());
        }
    };

    let field_idx = Select::new()
        .with_prompt("Filter location on")
        .items(&["From", "To"])
        .default(0)
        .interact()?;
    let field = if field_idx == 0 {
        LocationField::From
    } else {
        LocationField::To
    };

    // Loaded here only to fill the location list; the render below reloads.
    let mut locations = vec![ALL_CHOICE.to_string()];
    locations.extend(available_locations(&store.load(segment)?, field));
    let location_idx = Select::new()
        .with_prompt("Location")
        .items(&locations)
        .default(0)
        .interact()?;

    let min_support = prompt_threshold("Minimum support", DEFAULT_MIN_SUPPORT)?;
    let min_confidence = prompt_threshold("Minimum confidence", DEFAULT_MIN_CONFIDENCE)?;

    let include_lift = Confirm::new()
        .with_prompt("Show lift column?")
        .default(true)
        .interact()?;

    let geojson = if Confirm::new()
        .with_prompt("Write the map as GeoJSON?")
        .default(false)
        .interact()?
    {
        let path: String = Input::new()
            .with_prompt("Output path")
            .default(format!("rules_{segment}.geojson"))
            .interact_text()?;
        Some(PathBuf::from(path))
    } else {
        None
    };

    let request = RenderRequest {
        selection,
        criteria: FilterCriteria::new(min_support, min_confidence)
            .with_location(Some(locations[location_idx].as_str()), field),
        options: DisplayOptions { include_lift },
        geojson,
    };

    let rendered = pipeline::run(store, &request)?;
    println!();
    pipeline::write_table(&mut std::io::stdout().lock(), &rendered)?;

    Ok(())
}

/// Prompts for one dropdown, returning [`ALL_CHOICE`] or one of `options`.
fn select_choice<'a>(
    prompt: &str,
    options: &[&'a str],
) -> Result<&'a str, Box<dyn std::error::Error>> {
    let mut items = vec![ALL_CHOICE];
    items.extend_from_slice(options);

    let idx = Select::new()
        .with_prompt(prompt)
        .items(&items)
        .default(0)
        .interact()?;

    Ok(items[idx])
}

fn prompt_threshold(prompt: &str, default: f64) -> Result<f64, Box<dyn std::error::Error>> {
    let value: f64 = Input::new()
        .with_prompt(format!("{prompt} (0 to 1)"))
        .default(default)
        .validate_with(|v: &f64| -> Result<(), &str> {
            if (0.0..=1.0).contains(v) {
                Ok(())
            } else {
                Err("Must be between 0 and 1")
            }
        })
        .interact_text()?;

    Ok(value)
}

fn list_segments(store: &RuleStore) {
    for (segment, available) in store.available_segments() {
        let marker = if available { "+" } else { "-" };
        println!(
            "  {marker} {:<10} {}",
            segment.resource_id(),
            segment.label()
        );
    }
}

fn list_sites() {
    for site in rule_map_sites::jerusalem().sites() {
        println!(
            "  {:<24} ({:.5}, {:.5})",
            site.name, site.latitude, site.longitude
        );
    }
}
