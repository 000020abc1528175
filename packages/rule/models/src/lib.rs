#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Association rule, segment, and filter criteria types.
//!
//! A [`Rule`] is one row of a precomputed rule table. The table to load is
//! picked by exactly one [`Segment`], resolved from the three independent
//! demographic choices in a [`SegmentSelection`]. [`FilterCriteria`] then
//! decides which rules survive.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Value used by the front end for "no choice" in any dropdown.
pub const ALL_CHOICE: &str = "ALL";

/// Default minimum support threshold.
pub const DEFAULT_MIN_SUPPORT: f64 = 0.05;

/// Default minimum confidence threshold.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.4;

/// One association rule `From -> To` with its statistics.
///
/// Values are carried as loaded; nothing here checks that `support` or
/// `confidence` lie in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// Antecedent site name.
    pub from_site: String,
    /// Consequent site name.
    pub to_site: String,
    /// Fraction of trips containing the pair.
    pub support: f64,
    /// Probability of visiting `to_site` given `from_site` was visited.
    pub confidence: f64,
    /// Observed co-occurrence over co-occurrence expected under independence.
    pub lift: f64,
    /// Optional derived column present in some tables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intersection: Option<f64>,
}

impl Rule {
    /// Creates a rule without the optional `intersection` column.
    #[must_use]
    pub fn new(
        from_site: impl Into<String>,
        to_site: impl Into<String>,
        support: f64,
        confidence: f64,
        lift: f64,
    ) -> Self {
        Self {
            from_site: from_site.into(),
            to_site: to_site.into(),
            support,
            confidence,
            lift,
            intersection: None,
        }
    }
}

/// Age group partition.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AgeGroup {
    /// Younger visitors
    Young,
    /// Older visitors
    Old,
}

/// Religion partition.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Religion {
    /// Jewish visitors
    Jewish,
    /// Christian visitors
    Christian,
}

/// Continent-of-origin partition.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Continent {
    /// Visitors from Europe
    Europe,
    /// Visitors from the Americas
    America,
}

/// The single partition whose precomputed rule table gets loaded.
///
/// Each variant maps to exactly one table, so holding a `Segment` means
/// the "only one filter at a time" rule has already been enforced.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Segment {
    /// Every visitor
    All,
    /// [`AgeGroup::Young`]
    Young,
    /// [`AgeGroup::Old`]
    Old,
    /// [`Religion::Jewish`]
    Jewish,
    /// [`Religion::Christian`]
    Christian,
    /// [`Continent::Europe`]
    Europe,
    /// [`Continent::America`]
    America,
}

impl Segment {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::All,
            Self::Young,
            Self::Old,
            Self::Jewish,
            Self::Christian,
            Self::Europe,
            Self::America,
        ]
    }

    /// Identifier of the rule table backing this segment.
    #[must_use]
    pub const fn resource_id(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Young => "young",
            Self::Old => "old",
            Self::Jewish => "jewish",
            Self::Christian => "christian",
            Self::Europe => "europe",
            Self::America => "america",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All visitors",
            Self::Young => "Age: young",
            Self::Old => "Age: old",
            Self::Jewish => "Religion: Jewish",
            Self::Christian => "Religion: Christian",
            Self::Europe => "Continent: Europe",
            Self::America => "Continent: America",
        }
    }
}

impl From<AgeGroup> for Segment {
    fn from(value: AgeGroup) -> Self {
        match value {
            AgeGroup::Young => Self::Young,
            AgeGroup::Old => Self::Old,
        }
    }
}

impl From<Religion> for Segment {
    fn from(value: Religion) -> Self {
        match value {
            Religion::Jewish => Self::Jewish,
            Religion::Christian => Self::Christian,
        }
    }
}

impl From<Continent> for Segment {
    fn from(value: Continent) -> Self {
        match value {
            Continent::Europe => Self::Europe,
            Continent::America => Self::America,
        }
    }
}

/// Errors raised while turning user choices into a [`Segment`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    /// More than one of age, religion and continent was chosen.
    #[error("Please select only one filter (Age OR Religion OR Continent), got: {}", .chosen.join(", "))]
    MultipleSegments {
        /// The dimensions that were set.
        chosen: Vec<&'static str>,
    },

    /// A choice string did not name a known option.
    #[error("Unknown {dimension} option: {value}")]
    UnknownChoice {
        /// Which dropdown the value came from.
        dimension: &'static str,
        /// The rejected value.
        value: String,
    },
}

/// Raw state of the three mutually exclusive segment dropdowns.
///
/// `None` means the dropdown is left at "ALL".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentSelection {
    /// Age dropdown.
    pub age: Option<AgeGroup>,
    /// Religion dropdown.
    pub religion: Option<Religion>,
    /// Continent dropdown.
    pub continent: Option<Continent>,
}

impl SegmentSelection {
    /// Parses the three dropdown values, treating `None`, empty strings and
    /// [`ALL_CHOICE`] as "not chosen".
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::UnknownChoice`] if a value names no option.
    pub fn parse(
        age: Option<&str>,
        religion: Option<&str>,
        continent: Option<&str>,
    ) -> Result<Self, SelectionError> {
        Ok(Self {
            age: parse_choice("age", age)?,
            religion: parse_choice("religion", religion)?,
            continent: parse_choice("continent", continent)?,
        })
    }

    /// Resolves the selection to the one segment it names.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::MultipleSegments`] if more than one
    /// dropdown is set.
    pub fn resolve(&self) -> Result<Segment, SelectionError> {
        let chosen: Vec<(&'static str, Segment)> = [
            self.age.map(|a| ("age", Segment::from(a))),
            self.religion.map(|r| ("religion", Segment::from(r))),
            self.continent.map(|c| ("continent", Segment::from(c))),
        ]
        .into_iter()
        .flatten()
        .collect();

        match chosen.as_slice() {
            [] => Ok(Segment::All),
            [(_, segment)] => Ok(*segment),
            _ => Err(SelectionError::MultipleSegments {
                chosen: chosen.iter().map(|(name, _)| *name).collect(),
            }),
        }
    }
}

fn parse_choice<T: std::str::FromStr>(
    dimension: &'static str,
    value: Option<&str>,
) -> Result<Option<T>, SelectionError> {
    let Some(value) = value.map(str::trim) else {
        return Ok(None);
    };
    if value.is_empty() || value.eq_ignore_ascii_case(ALL_CHOICE) {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| SelectionError::UnknownChoice {
            dimension,
            value: value.to_string(),
        })
}

/// Which end of a rule the location filter is matched against.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LocationField {
    /// Match the antecedent (`From` column).
    #[default]
    From,
    /// Match the consequent (`To` column).
    To,
}

impl LocationField {
    /// Returns the site name of `rule` on this side.
    #[must_use]
    pub fn value_of(self, rule: &Rule) -> &str {
        match self {
            Self::From => &rule.from_site,
            Self::To => &rule.to_site,
        }
    }
}

/// Thresholds and location filter applied to a loaded rule table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    /// Rules with lower support are dropped.
    pub min_support: f64,
    /// Rules with lower confidence are dropped.
    pub min_confidence: f64,
    /// Exact site name the rule must have on `location_field`.
    pub location: Option<String>,
    /// Side of the rule `location` is compared against.
    #[serde(default)]
    pub location_field: LocationField,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            min_support: DEFAULT_MIN_SUPPORT,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            location: None,
            location_field: LocationField::default(),
        }
    }
}

impl FilterCriteria {
    /// Creates criteria with the given thresholds and no location filter.
    #[must_use]
    pub const fn new(min_support: f64, min_confidence: f64) -> Self {
        Self {
            min_support,
            min_confidence,
            location: None,
            location_field: LocationField::From,
        }
    }

    /// Sets the location filter. Empty strings and [`ALL_CHOICE`] clear it.
    #[must_use]
    pub fn with_location(mut self, location: Option<&str>, field: LocationField) -> Self {
        self.location = location
            .map(str::trim)
            .filter(|l| !l.is_empty() && *l != ALL_CHOICE)
            .map(ToString::to_string);
        self.location_field = field;
        self
    }

    /// Whether `rule` passes every threshold and the location filter.
    #[must_use]
    pub fn accepts(&self, rule: &Rule) -> bool {
        rule.support >= self.min_support
            && rule.confidence >= self.min_confidence
            && self
                .location
                .as_deref()
                .is_none_or(|location| self.location_field.value_of(rule) == location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_selection_resolves_to_all() {
        assert_eq!(SegmentSelection::default().resolve(), Ok(Segment::All));
    }

    #[test]
    fn single_choice_resolves_to_its_segment() {
        let selection = SegmentSelection {
            religion: Some(Religion::Christian),
            ..SegmentSelection::default()
        };
        assert_eq!(selection.resolve(), Ok(Segment::Christian));

        let selection = SegmentSelection {
            continent: Some(Continent::America),
            ..SegmentSelection::default()
        };
        assert_eq!(selection.resolve(), Ok(Segment::America));
    }

    #[test]
    fn multiple_choices_are_rejected() {
        let selection = SegmentSelection {
            age: Some(AgeGroup::Young),
            religion: None,
            continent: Some(Continent::Europe),
        };
        assert_eq!(
            selection.resolve(),
            Err(SelectionError::MultipleSegments {
                chosen: vec!["age", "continent"],
            })
        );
    }

    #[test]
    fn parses_dropdown_values() {
        let selection = SegmentSelection::parse(Some("Young"), Some("ALL"), Some("")).unwrap();
        assert_eq!(selection.age, Some(AgeGroup::Young));
        assert_eq!(selection.religion, None);
        assert_eq!(selection.continent, None);
    }

    #[test]
    fn rejects_unknown_dropdown_value() {
        let err = SegmentSelection::parse(None, Some("buddhist"), None).unwrap_err();
        assert_eq!(
            err,
            SelectionError::UnknownChoice {
                dimension: "religion",
                value: "buddhist".to_string(),
            }
        );
    }

    #[test]
    fn resource_ids_are_unique() {
        let mut ids: Vec<&str> = Segment::all().iter().map(|s| s.resource_id()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 7);
    }

    #[test]
    fn segment_round_trips_through_resource_id() {
        for segment in Segment::all() {
            let parsed: Segment = segment.resource_id().parse().unwrap();
            assert_eq!(parsed, *segment);
        }
    }

    #[test]
    fn criteria_thresholds_are_inclusive() {
        let criteria = FilterCriteria::new(0.1, 0.5);
        assert!(criteria.accepts(&Rule::new("a", "b", 0.1, 0.5, 1.0)));
        assert!(!criteria.accepts(&Rule::new("a", "b", 0.099, 0.5, 1.0)));
        assert!(!criteria.accepts(&Rule::new("a", "b", 0.1, 0.49, 1.0)));
    }

    #[test]
    fn criteria_location_matches_chosen_side() {
        let rule = Rule::new("a", "b", 0.5, 0.5, 1.0);

        let from = FilterCriteria::new(0.0, 0.0).with_location(Some("a"), LocationField::From);
        assert!(from.accepts(&rule));

        let to = FilterCriteria::new(0.0, 0.0).with_location(Some("a"), LocationField::To);
        assert!(!to.accepts(&rule));

        let all = FilterCriteria::new(0.0, 0.0).with_location(Some(ALL_CHOICE), LocationField::To);
        assert_eq!(all.location, None);
        assert!(all.accepts(&rule));
    }

    #[test]
    fn nan_values_never_pass() {
        let criteria = FilterCriteria::new(0.0, 0.0);
        assert!(!criteria.accepts(&Rule::new("a", "b", f64::NAN, 0.5, 1.0)));
    }
}
