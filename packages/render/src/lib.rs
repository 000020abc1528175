#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Rule filtering and rendering for the rule map.
//!
//! [`render`] runs one full cycle over a loaded rule table: filter by
//! [`FilterCriteria`], project the survivors into a sorted display table,
//! and project every rule with two known sites into a [`MapPrimitive`].
//! Everything here is pure; the same input always yields the same output.

pub mod color;
pub mod display;
pub mod export;
pub mod map;

use rule_map_rule_models::{FilterCriteria, Rule};
use rule_map_sites::SiteCoordinates;
use serde::{Deserialize, Serialize};

pub use color::{ConfidenceColor, LegendEntry, color_for_confidence, legend};
pub use display::{DisplayOptions, DisplayRow, format_percent};
pub use export::to_feature_collection;
pub use map::{DirectionMarker, MapPrimitive, stroke_width};

/// Notice shown when nothing survives filtering.
pub const NO_MATCHES_NOTICE: &str = "No rules match the selected filters.";

/// Keeps the rules `criteria` accepts, preserving order.
#[must_use]
pub fn filter_rules(rules: &[Rule], criteria: &FilterCriteria) -> Vec<Rule> {
    rules
        .iter()
        .filter(|rule| criteria.accepts(rule))
        .cloned()
        .collect()
}

/// Row counts from one render cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderSummary {
    /// Rules in the loaded table.
    pub loaded: usize,
    /// Rules that passed the filter.
    pub filtered: usize,
    /// Filtered rules drawn on the map.
    pub mapped: usize,
    /// Filtered rules left off the map for lack of coordinates.
    pub unmapped: usize,
}

impl RenderSummary {
    /// Informational notice for the user, if any.
    #[must_use]
    pub fn notice(&self) -> Option<String> {
        if self.filtered == 0 {
            Some(NO_MATCHES_NOTICE.to_string())
        } else if self.unmapped > 0 {
            Some(format!(
                "{} of {} rules reference sites without coordinates and are not drawn.",
                self.unmapped, self.filtered
            ))
        } else {
            None
        }
    }
}

/// Output of one render cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rendered {
    /// Filtered rules, sorted for display.
    pub display_rows: Vec<DisplayRow>,
    /// Drawable rules, in filter order.
    pub map_primitives: Vec<MapPrimitive>,
    /// Row counts.
    pub summary: RenderSummary,
}

/// Filters `rules` and renders them against the Jerusalem site registry
/// with default display options.
#[must_use]
pub fn render(rules: &[Rule], criteria: &FilterCriteria) -> Rendered {
    render_with(
        rules,
        criteria,
        &DisplayOptions::default(),
        rule_map_sites::jerusalem(),
    )
}

/// Filters `rules` and renders them against `sites`.
///
/// Rules naming a site missing from `sites` still appear in the display
/// table but produce no map primitive.
#[must_use]
pub fn render_with(
    rules: &[Rule],
    criteria: &FilterCriteria,
    options: &DisplayOptions,
    sites: &SiteCoordinates,
) -> Rendered {
    let filtered = filter_rules(rules, criteria);
    let display_rows = display::display_rows(&filtered, options);
    let map_primitives = map::map_primitives(&filtered, sites);

    let summary = RenderSummary {
        loaded: rules.len(),
        filtered: filtered.len(),
        mapped: map_primitives.len(),
        unmapped: filtered.len() - map_primitives.len(),
    };

    log::debug!(
        "Rendered {} of {} rules ({} mapped)",
        summary.filtered,
        summary.loaded,
        summary.mapped
    );

    Rendered {
        display_rows,
        map_primitives,
        summary,
    }
}
