#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Rule table loading for the rule map.
//!
//! Each [`Segment`] is backed by one precomputed table with the columns
//! `From`, `To`, `Support`, `Confidence`, `Lift` and optionally
//! `Intersection`. A table is an Excel workbook (first sheet) or a CSV
//! export; when both exist the workbook is used. Tables are re-read on
//! every [`RuleStore::load`]; there is no cache.

pub mod paths;

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};

use calamine::{Data, Reader, Xlsx};
use rule_map_rule_models::{LocationField, Rule, Segment};
use serde::Deserialize;

use crate::paths::TableFormat;

/// Columns every rule table must have.
pub const REQUIRED_COLUMNS: &[&str] = &["From", "To", "Support", "Confidence", "Lift"];

/// Errors that can occur while loading a rule table.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The table for a segment does not exist in any supported format.
    #[error("File not found: {}", .path.display())]
    NotFound {
        /// Segment whose table was requested.
        segment: Segment,
        /// Primary path that was tried.
        path: PathBuf,
    },

    /// The table header lacks a required column.
    #[error("Rule table is missing required column `{column}`")]
    MissingColumn {
        /// Name of the missing column.
        column: &'static str,
    },

    /// A workbook cell that must hold a number does not.
    #[error("Row {row}: `{column}` is not a number")]
    InvalidCell {
        /// 1-based sheet row.
        row: usize,
        /// Column name.
        column: &'static str,
    },

    /// The workbook has no sheets.
    #[error("Workbook contains no sheets")]
    EmptyWorkbook,

    /// CSV parsing failed.
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    /// Workbook parsing failed.
    #[error("XLSX parse error: {0}")]
    Xlsx(#[from] calamine::XlsxError),

    /// I/O error (file open/read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One raw table row. `From`/`To` may be blank in exported spreadsheets.
#[derive(Debug, Deserialize)]
struct RuleRecord {
    #[serde(rename = "From")]
    from: Option<String>,
    #[serde(rename = "To")]
    to: Option<String>,
    #[serde(rename = "Support")]
    support: f64,
    #[serde(rename = "Confidence")]
    confidence: f64,
    #[serde(rename = "Lift")]
    lift: f64,
    #[serde(rename = "Intersection", default)]
    intersection: Option<f64>,
}

/// Reads rule tables from a directory.
#[derive(Debug, Clone)]
pub struct RuleStore {
    data_dir: PathBuf,
}

impl RuleStore {
    /// Creates a store reading tables from `data_dir`.
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Creates a store reading from [`paths::rules_dir`].
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(paths::rules_dir())
    }

    /// Directory tables are read from.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Full path of the `format` table backing `segment`.
    #[must_use]
    pub fn table_path(&self, segment: Segment, format: TableFormat) -> PathBuf {
        self.data_dir.join(paths::table_file_name(segment, format))
    }

    /// First existing table for `segment`, in [`TableFormat::all`] order.
    #[must_use]
    pub fn locate(&self, segment: Segment) -> Option<(PathBuf, TableFormat)> {
        TableFormat::all()
            .iter()
            .map(|&format| (self.table_path(segment, format), format))
            .find(|(path, _)| path.is_file())
    }

    /// Whether a table for `segment` is present on disk.
    #[must_use]
    pub fn has_table(&self, segment: Segment) -> bool {
        self.locate(segment).is_some()
    }

    /// Every segment paired with whether its table is present.
    #[must_use]
    pub fn available_segments(&self) -> Vec<(Segment, bool)> {
        Segment::all()
            .iter()
            .map(|&segment| (segment, self.has_table(segment)))
            .collect()
    }

    /// Loads the full rule table for `segment`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no table exists, or another
    /// [`StoreError`] if it cannot be read or parsed.
    pub fn load(&self, segment: Segment) -> Result<Vec<Rule>, StoreError> {
        let Some((path, format)) = self.locate(segment) else {
            let path = self.table_path(segment, TableFormat::Xlsx);
            log::error!(
                "Rule table for segment {segment} not found: {}",
                path.display()
            );
            return Err(StoreError::NotFound { segment, path });
        };

        let reader = BufReader::new(File::open(&path)?);
        let rules = match format {
            TableFormat::Xlsx => load_from_xlsx(reader)?,
            TableFormat::Csv => load_from_reader(reader)?,
        };

        log::info!(
            "Loaded {} rules for segment {segment} from {}",
            rules.len(),
            path.display()
        );
        Ok(rules)
    }
}

/// Fails with the first of [`REQUIRED_COLUMNS`] absent from `headers`.
fn check_columns<'a>(headers: impl IntoIterator<Item = &'a str>) -> Result<(), StoreError> {
    let headers: Vec<&str> = headers.into_iter().collect();
    REQUIRED_COLUMNS
        .iter()
        .copied()
        .find(|column| !headers.contains(column))
        .map_or(Ok(()), |column| Err(StoreError::MissingColumn { column }))
}

/// Turns raw records into rules, skipping rows with a blank `From` or `To`.
fn collect_rules(
    records: impl IntoIterator<Item = Result<RuleRecord, StoreError>>,
) -> Result<Vec<Rule>, StoreError> {
    let mut rules = Vec::new();
    let mut skipped = 0_usize;

    for record in records {
        let record = record?;

        let (Some(from_site), Some(to_site)) = (
            record.from.filter(|s| !s.is_empty()),
            record.to.filter(|s| !s.is_empty()),
        ) else {
            skipped += 1;
            continue;
        };

        rules.push(Rule {
            from_site,
            to_site,
            support: record.support,
            confidence: record.confidence,
            lift: record.lift,
            intersection: record.intersection,
        });
    }

    if skipped > 0 {
        log::warn!("Skipped {skipped} rule rows with a blank From or To");
    }

    Ok(rules)
}

/// Parses a rule table from any CSV reader.
///
/// Rows with a blank `From` or `To` are skipped.
///
/// # Errors
///
/// Returns [`StoreError::MissingColumn`] if a required column is absent, or
/// [`StoreError::Csv`] if a row cannot be parsed.
pub fn load_from_reader<R: Read>(reader: R) -> Result<Vec<Rule>, StoreError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    check_columns(headers.iter())?;

    collect_rules(
        rdr.deserialize::<RuleRecord>()
            .map(|record| record.map_err(StoreError::from)),
    )
}

/// Parses a rule table from the first sheet of an Excel workbook.
///
/// The first row is the header. Same column and blank-row rules as
/// [`load_from_reader`].
///
/// # Errors
///
/// Returns [`StoreError::MissingColumn`] if a required column is absent,
/// [`StoreError::InvalidCell`] if a numeric cell holds something else, or
/// [`StoreError::Xlsx`] / [`StoreError::EmptyWorkbook`] if the workbook
/// cannot be read.
pub fn load_from_xlsx<R: Read + Seek>(reader: R) -> Result<Vec<Rule>, StoreError> {
    let mut workbook: Xlsx<R> = Xlsx::new(reader)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(StoreError::EmptyWorkbook)??;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|row| row.iter().map(|cell| cell.to_string().trim().to_string()).collect())
        .unwrap_or_default();
    check_columns(headers.iter().map(String::as_str))?;

    let position = |name: &'static str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or(StoreError::MissingColumn { column: name })
    };
    let from = position("From")?;
    let to = position("To")?;
    let support = position("Support")?;
    let confidence = position("Confidence")?;
    let lift = position("Lift")?;
    let intersection = position("Intersection").ok();

    // Header is sheet row 1.
    let records = rows
        .enumerate()
        .map(|(i, row)| -> Result<RuleRecord, StoreError> {
            let line = i + 2;
            Ok(RuleRecord {
                from: text_cell(row, from),
                to: text_cell(row, to),
                support: number_cell(row, support, "Support", line)?,
                confidence: number_cell(row, confidence, "Confidence", line)?,
                lift: number_cell(row, lift, "Lift", line)?,
                intersection: match intersection {
                    Some(idx) if text_cell(row, idx).is_some() => {
                        Some(number_cell(row, idx, "Intersection", line)?)
                    }
                    _ => None,
                },
            })
        });

    collect_rules(records)
}

fn text_cell(row: &[Data], idx: usize) -> Option<String> {
    match row.get(idx)? {
        Data::Empty => None,
        Data::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        other => Some(other.to_string()),
    }
}

#[allow(clippy::cast_precision_loss)]
fn number_cell(
    row: &[Data],
    idx: usize,
    column: &'static str,
    line: usize,
) -> Result<f64, StoreError> {
    row.get(idx)
        .and_then(|cell| match cell {
            Data::Float(value) => Some(*value),
            Data::Int(value) => Some(*value as f64),
            Data::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .ok_or(StoreError::InvalidCell { row: line, column })
}

/// Sorted, distinct site names appearing on `field` of `rules`.
///
/// Feeds the location dropdown.
#[must_use]
pub fn available_locations(rules: &[Rule], field: LocationField) -> Vec<String> {
    rules
        .iter()
        .map(|rule| field.value_of(rule))
        .filter(|name| !name.is_empty())
        .collect::<BTreeSet<&str>>()
        .into_iter()
        .map(ToString::to_string)
        .collect()
}
