#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Site coordinate registry for the rule map.
//!
//! The Jerusalem site table lives in `sites/jerusalem.toml` and is baked
//! into the binary at compile time via [`include_str!`]. It is parsed once
//! on first use and never mutated afterwards.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// Site table embedded at compile time.
const JERUSALEM_TOML: &str = include_str!("../sites/jerusalem.toml");

static JERUSALEM: LazyLock<SiteCoordinates> = LazyLock::new(|| {
    parse_registry_toml(JERUSALEM_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse jerusalem.toml: {e}"))
});

/// Returns the process-wide Jerusalem site registry.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed (this is a compile-time
/// guarantee since the file is embedded).
#[must_use]
pub fn jerusalem() -> &'static SiteCoordinates {
    &JERUSALEM
}

/// Errors that can occur while building a site registry.
#[derive(Debug, thiserror::Error)]
pub enum SiteRegistryError {
    /// TOML parsing failed.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A site entry has an empty name.
    #[error("Site #{index} has an empty name")]
    EmptyName {
        /// Position of the entry in the file.
        index: usize,
    },

    /// Two entries share a name.
    #[error("Duplicate site name: {name}")]
    DuplicateSite {
        /// The repeated name.
        name: String,
    },
}

/// A WGS84 position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Coordinates {
    /// Creates a new position.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Arithmetic midpoint of the two positions.
    ///
    /// Sites are a few kilometres apart, so averaging degrees is accurate
    /// enough for marker placement.
    #[must_use]
    pub fn midpoint(&self, other: &Self) -> Self {
        Self {
            latitude: (self.latitude + other.latitude) / 2.0,
            longitude: (self.longitude + other.longitude) / 2.0,
        }
    }

    /// Initial great-circle bearing towards `other`, in degrees clockwise
    /// from north within `[0, 360)`.
    #[must_use]
    pub fn bearing_to(&self, other: &Self) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let delta_lon = (other.longitude - self.longitude).to_radians();

        let y = delta_lon.sin() * lat2.cos();
        let x = lat1.cos().mul_add(lat2.sin(), -(lat1.sin() * lat2.cos() * delta_lon.cos()));

        y.atan2(x).to_degrees().rem_euclid(360.0)
    }

    /// `[longitude, latitude]`, the axis order `GeoJSON` expects.
    #[must_use]
    pub fn to_position(&self) -> Vec<f64> {
        vec![self.longitude, self.latitude]
    }
}

/// A named site on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    /// Name as it appears in the rule tables.
    pub name: String,
    /// English name, if known.
    #[serde(default, alias = "english_name")]
    pub english_name: Option<String>,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Site {
    /// Position of this site.
    #[must_use]
    pub const fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// Initial map view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapView {
    /// Center latitude.
    pub latitude: f64,
    /// Center longitude.
    pub longitude: f64,
    /// Initial zoom level.
    pub zoom: u8,
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    city: String,
    view: MapView,
    sites: Vec<Site>,
}

/// Immutable lookup from site name to coordinates.
#[derive(Debug, Clone)]
pub struct SiteCoordinates {
    city: String,
    view: MapView,
    /// Sites in file order.
    sites: Vec<Site>,
    /// name -> index into `sites`
    by_name: BTreeMap<String, usize>,
}

impl SiteCoordinates {
    /// Name of the city this registry covers.
    #[must_use]
    pub fn city(&self) -> &str {
        &self.city
    }

    /// Default map view for this city.
    #[must_use]
    pub const fn view(&self) -> MapView {
        self.view
    }

    /// All sites in registry order.
    #[must_use]
    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    /// Number of registered sites.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// Whether the registry has no sites.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Looks up a site by its exact name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Site> {
        self.by_name.get(name).map(|&idx| &self.sites[idx])
    }

    /// Looks up the coordinates of a site by its exact name.
    #[must_use]
    pub fn coordinates(&self, name: &str) -> Option<Coordinates> {
        self.get(name).map(Site::coordinates)
    }

    /// Whether `name` is a registered site.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }
}

/// Parses a site registry from TOML.
///
/// # Errors
///
/// Returns [`SiteRegistryError`] if the TOML is malformed, a site name is
/// empty, or a name appears twice.
pub fn parse_registry_toml(toml_str: &str) -> Result<SiteCoordinates, SiteRegistryError> {
    let file: RegistryFile = toml::de::from_str(toml_str)?;

    let mut by_name = BTreeMap::new();
    for (idx, site) in file.sites.iter().enumerate() {
        if site.name.trim().is_empty() {
            return Err(SiteRegistryError::EmptyName { index: idx });
        }
        if by_name.insert(site.name.clone(), idx).is_some() {
            return Err(SiteRegistryError::DuplicateSite {
                name: site.name.clone(),
            });
        }
    }

    log::debug!("Loaded {} sites for {}", file.sites.len(), file.city);

    Ok(SiteCoordinates {
        city: file.city,
        view: file.view,
        sites: file.sites,
        by_name,
    })
}
