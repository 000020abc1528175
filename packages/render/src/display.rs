//! Display table projection.

use rule_map_rule_models::Rule;
use serde::{Deserialize, Serialize};

/// Which optional columns the display table carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayOptions {
    /// Keep the `Lift` and `Intersection` columns.
    pub include_lift: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self { include_lift: true }
    }
}

/// One row of the rendered rule table.
///
/// `support_pct` / `confidence_pct` are cosmetic; the exact values stay in
/// `support` / `confidence`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayRow {
    /// Antecedent site.
    pub from_site: String,
    /// Consequent site.
    pub to_site: String,
    /// Exact support.
    pub support: f64,
    /// Exact confidence.
    pub confidence: f64,
    /// Support as a percentage, one decimal place.
    pub support_pct: String,
    /// Confidence as a percentage, one decimal place.
    pub confidence_pct: String,
    /// Lift, unless dropped by [`DisplayOptions`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lift: Option<f64>,
    /// Intersection, if present and not dropped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intersection: Option<f64>,
}

/// Formats a fraction as a percentage rounded to one decimal (`0.12` -> `"12.0%"`).
#[must_use]
pub fn format_percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

/// Projects filtered rules into display rows sorted by support, highest
/// first. Rules with equal support keep their input order.
#[must_use]
pub fn display_rows(rules: &[Rule], options: &DisplayOptions) -> Vec<DisplayRow> {
    let mut rows: Vec<DisplayRow> = rules
        .iter()
        .map(|rule| DisplayRow {
            from_site: rule.from_site.clone(),
            to_site: rule.to_site.clone(),
            support: rule.support,
            confidence: rule.confidence,
            support_pct: format_percent(rule.support),
            confidence_pct: format_percent(rule.confidence),
            lift: options.include_lift.then_some(rule.lift),
            intersection: rule.intersection.filter(|_| options.include_lift),
        })
        .collect();

    rows.sort_by(|a, b| b.support.total_cmp(&a.support));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_percentages() {
        assert_eq!(format_percent(0.12), "12.0%");
        assert_eq!(format_percent(0.0), "0.0%");
        assert_eq!(format_percent(1.0), "100.0%");
        assert_eq!(format_percent(0.4567), "45.7%");
    }

    #[test]
    fn sorts_by_support_descending_and_stably() {
        let rules = vec![
            Rule::new("a", "b", 0.1, 0.5, 1.0),
            Rule::new("c", "d", 0.3, 0.5, 1.0),
            Rule::new("e", "f", 0.1, 0.9, 1.0),
        ];
        let rows = display_rows(&rules, &DisplayOptions::default());
        let order: Vec<&str> = rows.iter().map(|r| r.from_site.as_str()).collect();
        assert_eq!(order, vec!["c", "a", "e"]);
    }

    #[test]
    fn keeps_exact_values_next_to_formatted_ones() {
        let rows = display_rows(
            &[Rule::new("a", "b", 0.123_45, 0.75, 1.3)],
            &DisplayOptions::default(),
        );
        assert!((rows[0].support - 0.123_45).abs() < f64::EPSILON);
        assert_eq!(rows[0].support_pct, "12.3%");
        assert_eq!(rows[0].confidence_pct, "75.0%");
        assert_eq!(rows[0].lift, Some(1.3));
    }

    #[test]
    fn drops_lift_columns_on_request() {
        let mut rule = Rule::new("a", "b", 0.1, 0.5, 1.3);
        rule.intersection = Some(7.0);

        let with = display_rows(std::slice::from_ref(&rule), &DisplayOptions::default());
        assert_eq!(with[0].intersection, Some(7.0));

        let without = display_rows(&[rule], &DisplayOptions { include_lift: false });
        assert_eq!(without[0].lift, None);
        assert_eq!(without[0].intersection, None);
    }

    #[test]
    fn empty_input_gives_empty_table() {
        assert!(display_rows(&[], &DisplayOptions::default()).is_empty());
    }
}
