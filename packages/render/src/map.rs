//! Map primitive projection.
//!
//! Each drawable rule becomes a polyline between its two sites plus a
//! triangular marker at the midpoint pointing from `From` to `To`.

use rule_map_rule_models::Rule;
use rule_map_sites::{Coordinates, SiteCoordinates};
use serde::{Deserialize, Serialize};

use crate::color::{ConfidenceColor, color_for_confidence};

/// Stroke width at zero support.
pub const BASE_STROKE_WIDTH: f64 = 2.0;

/// Extra stroke width per unit of support.
pub const STROKE_WIDTH_PER_SUPPORT: f64 = 15.0;

/// Number of sides of the direction marker polygon.
pub const MARKER_SIDES: u8 = 3;

/// Radius of the direction marker in pixels.
pub const MARKER_RADIUS: u8 = 6;

/// Line weight for a rule with the given support: `2 + support * 15`.
#[must_use]
pub fn stroke_width(support: f64) -> f64 {
    support.mul_add(STROKE_WIDTH_PER_SUPPORT, BASE_STROKE_WIDTH)
}

/// Filled regular polygon marking the direction of a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectionMarker {
    /// Midpoint of the rule's line.
    pub position: Coordinates,
    /// Polygon side count.
    pub sides: u8,
    /// Radius in pixels.
    pub radius: u8,
    /// Bearing from `From` to `To`, degrees clockwise from north.
    pub rotation: f64,
    /// Stroke and fill color.
    pub color: ConfidenceColor,
}

/// Everything the map widget needs to draw one rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapPrimitive {
    /// Antecedent site.
    pub from_site: String,
    /// Consequent site.
    pub to_site: String,
    /// `[from, to]`.
    pub line: [Coordinates; 2],
    /// Line weight.
    pub stroke_width: f64,
    /// Line color.
    pub color: ConfidenceColor,
    /// Direction marker.
    pub marker: DirectionMarker,
    /// HTML popup body.
    pub popup: String,
    /// Plain-text hover label.
    pub tooltip: String,
    /// Exact support.
    pub support: f64,
    /// Exact confidence.
    pub confidence: f64,
    /// Exact lift.
    pub lift: f64,
}

/// HTML popup text for a rule, numbers to two decimals.
#[must_use]
pub fn popup_text(rule: &Rule) -> String {
    format!(
        "<b>{} ➝ {}</b><br>Support: {:.2}<br>Confidence: {:.2}<br>Lift: {:.2}",
        rule.from_site, rule.to_site, rule.support, rule.confidence, rule.lift
    )
}

/// Hover text for a rule, numbers to two decimals.
#[must_use]
pub fn tooltip_text(rule: &Rule) -> String {
    format!(
        "{} → {}\nSupport: {:.2}, Confidence: {:.2}",
        rule.from_site, rule.to_site, rule.support, rule.confidence
    )
}

/// Builds the map primitive for `rule`, or `None` if either site has no
/// coordinates.
#[must_use]
pub fn map_primitive(rule: &Rule, sites: &SiteCoordinates) -> Option<MapPrimitive> {
    let from = sites.coordinates(&rule.from_site)?;
    let to = sites.coordinates(&rule.to_site)?;
    let color = color_for_confidence(rule.confidence);

    Some(MapPrimitive {
        from_site: rule.from_site.clone(),
        to_site: rule.to_site.clone(),
        line: [from, to],
        stroke_width: stroke_width(rule.support),
        color,
        marker: DirectionMarker {
            position: from.midpoint(&to),
            sides: MARKER_SIDES,
            radius: MARKER_RADIUS,
            rotation: from.bearing_to(&to),
            color,
        },
        popup: popup_text(rule),
        tooltip: tooltip_text(rule),
        support: rule.support,
        confidence: rule.confidence,
        lift: rule.lift,
    })
}

/// Builds map primitives for every rule whose sites are both known, in
/// input order. Rules naming an unknown site are skipped.
#[must_use]
pub fn map_primitives(rules: &[Rule], sites: &SiteCoordinates) -> Vec<MapPrimitive> {
    rules
        .iter()
        .filter_map(|rule| {
            let primitive = map_primitive(rule, sites);
            if primitive.is_none() {
                log::debug!(
                    "Not drawing {} -> {}: site without coordinates",
                    rule.from_site,
                    rule.to_site
                );
            }
            primitive
        })
        .collect()
}
