#![allow(clippy::module_name_repetitions)]
//! Canonical file locations for rule tables.
//!
//! Tables live in `data/rules/` under the project root unless the
//! `RULE_MAP_DATA_DIR` environment variable points elsewhere.

use std::path::{Path, PathBuf};

use rule_map_rule_models::Segment;

/// Environment variable overriding the rule table directory.
pub const DATA_DIR_ENV: &str = "RULE_MAP_DATA_DIR";

/// Returns the workspace root directory.
///
/// Resolved at compile time from `CARGO_MANIFEST_DIR`.
///
/// # Panics
///
/// Panics if the project root cannot be resolved.
#[must_use]
pub fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .expect("Failed to find project root from CARGO_MANIFEST_DIR")
        .to_path_buf()
}

/// Returns the `data/rules/` directory, or `$RULE_MAP_DATA_DIR` if set.
#[must_use]
pub fn rules_dir() -> PathBuf {
    std::env::var_os(DATA_DIR_ENV)
        .filter(|dir| !dir.is_empty())
        .map_or_else(|| project_root().join("data").join("rules"), PathBuf::from)
}

/// On-disk formats a rule table may be stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableFormat {
    /// Excel workbook; the first sheet holds the table.
    Xlsx,
    /// Comma-separated values with a header row.
    Csv,
}

impl TableFormat {
    /// Formats in lookup order: a workbook wins over a CSV export.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Xlsx, Self::Csv]
    }

    /// File extension without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
        }
    }
}

/// File name of the `format` table backing `segment`.
#[must_use]
pub fn table_file_name(segment: Segment, format: TableFormat) -> String {
    format!(
        "association_rules_jerusalem_{}.{}",
        segment.resource_id(),
        format.extension()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_follow_resource_ids() {
        assert_eq!(
            table_file_name(Segment::All, TableFormat::Xlsx),
            "association_rules_jerusalem_all.xlsx"
        );
        assert_eq!(
            table_file_name(Segment::Christian, TableFormat::Csv),
            "association_rules_jerusalem_christian.csv"
        );
    }

    #[test]
    fn project_root_contains_workspace_manifest() {
        assert!(project_root().join("Cargo.toml").exists());
    }
}
