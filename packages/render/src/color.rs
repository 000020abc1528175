//! Confidence color scale.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Line and marker color for a rule, chosen from its confidence.
///
/// Serializes to the CSS color the map widget draws with.
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
#[strum(serialize_all = "lowercase")]
pub enum ConfidenceColor {
    /// Confidence >= 0.8
    #[serde(rename = "#800000")]
    #[strum(serialize = "#800000")]
    DarkBordeaux,
    /// 0.7 <= confidence < 0.8
    Red,
    /// 0.6 <= confidence < 0.7
    Orange,
    /// 0.5 <= confidence < 0.6
    Yellow,
    /// 0.4 <= confidence < 0.5
    Blue,
    /// Confidence < 0.4
    Gray,
}

impl ConfidenceColor {
    /// Returns all variants, highest band first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::DarkBordeaux,
            Self::Red,
            Self::Orange,
            Self::Yellow,
            Self::Blue,
            Self::Gray,
        ]
    }

    /// Inclusive lower confidence bound of this band. `None` for the
    /// catch-all band.
    #[must_use]
    pub const fn lower_bound(self) -> Option<f64> {
        match self {
            Self::DarkBordeaux => Some(0.8),
            Self::Red => Some(0.7),
            Self::Orange => Some(0.6),
            Self::Yellow => Some(0.5),
            Self::Blue => Some(0.4),
            Self::Gray => None,
        }
    }

    /// Exclusive upper confidence bound of this band. `None` for the top
    /// band.
    #[must_use]
    pub const fn upper_bound(self) -> Option<f64> {
        match self {
            Self::DarkBordeaux => None,
            Self::Red => Some(0.8),
            Self::Orange => Some(0.7),
            Self::Yellow => Some(0.6),
            Self::Blue => Some(0.5),
            Self::Gray => Some(0.4),
        }
    }

    /// Display name for legends.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::DarkBordeaux => "Dark Bordeaux",
            Self::Red => "Red",
            Self::Orange => "Orange",
            Self::Yellow => "Yellow",
            Self::Blue => "Blue",
            Self::Gray => "Gray",
        }
    }

    /// CSS color string.
    #[must_use]
    pub const fn css(self) -> &'static str {
        match self {
            Self::DarkBordeaux => "#800000",
            Self::Red => "red",
            Self::Orange => "orange",
            Self::Yellow => "yellow",
            Self::Blue => "blue",
            Self::Gray => "gray",
        }
    }
}

/// Maps a confidence value to its color band.
///
/// Bands are checked top-down and the first match wins, so a value sitting
/// exactly on a boundary lands in the upper band. Anything below 0.4,
/// including NaN, is gray.
#[must_use]
pub fn color_for_confidence(confidence: f64) -> ConfidenceColor {
    ConfidenceColor::all()
        .iter()
        .copied()
        .find(|color| color.lower_bound().is_some_and(|lower| confidence >= lower))
        .unwrap_or(ConfidenceColor::Gray)
}

/// One row of the color legend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendEntry {
    /// Band color.
    pub color: ConfidenceColor,
    /// Band name.
    pub name: String,
    /// Human-readable confidence range.
    pub range: String,
    /// Inclusive lower bound.
    pub min: Option<f64>,
    /// Exclusive upper bound.
    pub max: Option<f64>,
}

/// The confidence legend, highest band first.
#[must_use]
pub fn legend() -> Vec<LegendEntry> {
    ConfidenceColor::all()
        .iter()
        .map(|&color| {
            let range = match (color.lower_bound(), color.upper_bound()) {
                (Some(min), None) => format!("≥ {min}"),
                (Some(min), Some(max)) => format!("{min}–{max}"),
                (None, Some(max)) => format!("< {max}"),
                (None, None) => String::new(),
            };
            LegendEntry {
                color,
                name: color.name().to_string(),
                range,
                min: color.lower_bound(),
                max: color.upper_bound(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_map_to_upper_band() {
        assert_eq!(color_for_confidence(0.8), ConfidenceColor::DarkBordeaux);
        assert_eq!(color_for_confidence(0.7), ConfidenceColor::Red);
        assert_eq!(color_for_confidence(0.6), ConfidenceColor::Orange);
        assert_eq!(color_for_confidence(0.5), ConfidenceColor::Yellow);
        assert_eq!(color_for_confidence(0.4), ConfidenceColor::Blue);
    }

    #[test]
    fn values_inside_bands() {
        assert_eq!(color_for_confidence(1.0), ConfidenceColor::DarkBordeaux);
        assert_eq!(color_for_confidence(0.79), ConfidenceColor::Red);
        assert_eq!(color_for_confidence(0.75), ConfidenceColor::Red);
        assert_eq!(color_for_confidence(0.65), ConfidenceColor::Orange);
        assert_eq!(color_for_confidence(0.55), ConfidenceColor::Yellow);
        assert_eq!(color_for_confidence(0.45), ConfidenceColor::Blue);
        assert_eq!(color_for_confidence(0.399), ConfidenceColor::Gray);
        assert_eq!(color_for_confidence(0.0), ConfidenceColor::Gray);
    }

    #[test]
    fn out_of_range_values_are_still_colored() {
        assert_eq!(color_for_confidence(-1.0), ConfidenceColor::Gray);
        assert_eq!(color_for_confidence(1.5), ConfidenceColor::DarkBordeaux);
        assert_eq!(color_for_confidence(f64::NAN), ConfidenceColor::Gray);
    }

    #[test]
    fn css_matches_display_and_serde() {
        for color in ConfidenceColor::all() {
            assert_eq!(color.to_string(), color.css());
            assert_eq!(
                serde_json::to_value(color).unwrap(),
                serde_json::Value::String(color.css().to_string())
            );
        }
        assert_eq!(ConfidenceColor::DarkBordeaux.css(), "#800000");
    }

    #[test]
    fn legend_covers_every_band() {
        let legend = legend();
        assert_eq!(legend.len(), 6);
        assert_eq!(legend[0].range, "≥ 0.8");
        assert_eq!(legend[1].range, "0.7–0.8");
        assert_eq!(legend[5].range, "< 0.4");
    }
}
