#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the rule map server.
//!
//! Query parameters mirror the dashboard controls: three mutually exclusive
//! segment dropdowns, a location dropdown, and two thresholds.

use rule_map_render::{DisplayOptions, DisplayRow, MapPrimitive, RenderSummary, Rendered};
use rule_map_rule_models::{
    DEFAULT_MIN_CONFIDENCE, DEFAULT_MIN_SUPPORT, FilterCriteria, LocationField, Segment,
    SegmentSelection, SelectionError,
};
use rule_map_sites::{MapView, Site};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// A segment and whether its rule table is on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSegment {
    /// Segment identifier.
    pub segment: Segment,
    /// Identifier of the backing rule table.
    pub resource_id: String,
    /// Human-readable label.
    pub label: String,
    /// Whether the table exists.
    pub available: bool,
}

impl ApiSegment {
    /// Builds the API view of `segment`.
    #[must_use]
    pub fn new(segment: Segment, available: bool) -> Self {
        Self {
            segment,
            resource_id: segment.resource_id().to_string(),
            label: segment.label().to_string(),
            available,
        }
    }
}

/// Site registry response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSites {
    /// City covered by the registry.
    pub city: String,
    /// Default map view.
    pub view: MapView,
    /// Registered sites.
    pub sites: Vec<Site>,
}

/// Query parameters for the locations endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationsQueryParams {
    /// Age dropdown (`young`, `old`, or `ALL`).
    pub age: Option<String>,
    /// Religion dropdown (`jewish`, `christian`, or `ALL`).
    pub religion: Option<String>,
    /// Continent dropdown (`europe`, `america`, or `ALL`).
    pub continent: Option<String>,
    /// Rule side to list (defaults to `from`).
    pub field: Option<LocationField>,
}

impl LocationsQueryParams {
    /// Parses the segment dropdowns.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::UnknownChoice`] for an unrecognized value.
    pub fn selection(&self) -> Result<SegmentSelection, SelectionError> {
        SegmentSelection::parse(
            self.age.as_deref(),
            self.religion.as_deref(),
            self.continent.as_deref(),
        )
    }
}

/// Location dropdown values for one segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLocations {
    /// Segment whose table was read.
    pub segment: Segment,
    /// Rule side the values come from.
    pub field: LocationField,
    /// Sorted distinct site names.
    pub locations: Vec<String>,
}

/// Query parameters for the rules endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesQueryParams {
    /// Age dropdown (`young`, `old`, or `ALL`).
    pub age: Option<String>,
    /// Religion dropdown (`jewish`, `christian`, or `ALL`).
    pub religion: Option<String>,
    /// Continent dropdown (`europe`, `america`, or `ALL`).
    pub continent: Option<String>,
    /// Exact site name to filter on, or `ALL`.
    pub location: Option<String>,
    /// Rule side `location` is matched against (defaults to `from`).
    pub field: Option<LocationField>,
    /// Minimum support (defaults to 0.05).
    pub min_support: Option<f64>,
    /// Minimum confidence (defaults to 0.4).
    pub min_confidence: Option<f64>,
    /// Keep the lift columns in the table (defaults to `true`).
    pub include_lift: Option<bool>,
}

impl RulesQueryParams {
    /// Parses the segment dropdowns.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::UnknownChoice`] for an unrecognized value.
    pub fn selection(&self) -> Result<SegmentSelection, SelectionError> {
        SegmentSelection::parse(
            self.age.as_deref(),
            self.religion.as_deref(),
            self.continent.as_deref(),
        )
    }

    /// Filter criteria with defaults filled in.
    #[must_use]
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria::new(
            self.min_support.unwrap_or(DEFAULT_MIN_SUPPORT),
            self.min_confidence.unwrap_or(DEFAULT_MIN_CONFIDENCE),
        )
        .with_location(self.location.as_deref(), self.field.unwrap_or_default())
    }

    /// Display options with defaults filled in.
    #[must_use]
    pub fn display_options(&self) -> DisplayOptions {
        DisplayOptions {
            include_lift: self.include_lift.unwrap_or(true),
        }
    }
}

/// Response from the rules endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRules {
    /// Segment whose table was read.
    pub segment: Segment,
    /// Criteria that were applied.
    pub criteria: FilterCriteria,
    /// Display table.
    pub rows: Vec<DisplayRow>,
    /// Map primitives.
    pub map_primitives: Vec<MapPrimitive>,
    /// Row counts.
    pub summary: RenderSummary,
    /// Informational notice (e.g. no matches).
    pub notice: Option<String>,
}

impl ApiRules {
    /// Wraps a render result.
    #[must_use]
    pub fn new(segment: Segment, criteria: FilterCriteria, rendered: Rendered) -> Self {
        let notice = rendered.summary.notice();
        Self {
            segment,
            criteria,
            rows: rendered.display_rows,
            map_primitives: rendered.map_primitives,
            summary: rendered.summary,
            notice,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_params_fill_defaults() {
        let params = RulesQueryParams::default();
        let criteria = params.criteria();
        assert!((criteria.min_support - DEFAULT_MIN_SUPPORT).abs() < f64::EPSILON);
        assert!((criteria.min_confidence - DEFAULT_MIN_CONFIDENCE).abs() < f64::EPSILON);
        assert_eq!(criteria.location, None);
        assert_eq!(criteria.location_field, LocationField::From);
        assert!(params.display_options().include_lift);
    }

    #[test]
    fn rules_params_treat_all_location_as_unset() {
        let params = RulesQueryParams {
            location: Some("ALL".to_string()),
            field: Some(LocationField::To),
            ..RulesQueryParams::default()
        };
        let criteria = params.criteria();
        assert_eq!(criteria.location, None);
        assert_eq!(criteria.location_field, LocationField::To);
    }

    #[test]
    fn segment_serializes_with_label() {
        let json = serde_json::to_value(ApiSegment::new(Segment::Old, false)).unwrap();
        assert_eq!(json["segment"], "old");
        assert_eq!(json["resourceId"], "old");
        assert_eq!(json["available"], false);
    }
}
