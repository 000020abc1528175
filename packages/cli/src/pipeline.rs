//! One reload-filter-render cycle plus terminal output.

use std::io::Write;
use std::path::PathBuf;

use rule_map_render::{DisplayOptions, DisplayRow, Rendered, render_with, to_feature_collection};
use rule_map_rule_models::{FilterCriteria, SegmentSelection};
use rule_map_sites::jerusalem;
use rule_map_store::RuleStore;

/// Everything one render cycle needs.
#[derive(Debug, Clone, Default)]
pub struct RenderRequest {
    /// Segment dropdowns.
    pub selection: SegmentSelection,
    /// Thresholds and location filter.
    pub criteria: FilterCriteria,
    /// Display columns.
    pub options: DisplayOptions,
    /// Where to write the map as `GeoJSON`, if anywhere.
    pub geojson: Option<PathBuf>,
}

/// Resolves the segment, loads its table, and renders it.
///
/// Halts before loading anything if more than one segment is selected.
///
/// # Errors
///
/// Returns an error if the selection is ambiguous, the table cannot be
/// loaded, or the `GeoJSON` file cannot be written.
pub fn run(
    store: &RuleStore,
    request: &RenderRequest,
) -> Result<Rendered, Box<dyn std::error::Error>> {
    let segment = request.selection.resolve()?;
    let rules = store.load(segment)?;

    let rendered = render_with(&rules, &request.criteria, &request.options, jerusalem());
    log::info!(
        "Segment {segment}: {} of {} rules passed, {} drawn",
        rendered.summary.filtered,
        rendered.summary.loaded,
        rendered.summary.mapped
    );

    if let Some(path) = &request.geojson {
        let collection = to_feature_collection(&rendered.map_primitives);
        std::fs::write(path, serde_json::to_string_pretty(&collection)?)?;
        log::info!(
            "Wrote {} map features to {}",
            collection.features.len(),
            path.display()
        );
    }

    Ok(rendered)
}

/// Writes the display table and any notice to `out`.
///
/// # Errors
///
/// Returns an I/O error if writing fails.
pub fn write_table(out: &mut impl Write, rendered: &Rendered) -> std::io::Result<()> {
    let with_lift = rendered.display_rows.iter().any(|row| row.lift.is_some());

    write!(out, "{:<24} {:<24} {:>9} {:>11}", "FROM", "TO", "SUPPORT", "CONFIDENCE")?;
    if with_lift {
        write!(out, " {:>6}", "LIFT")?;
    }
    writeln!(out)?;
    writeln!(out, "{}", "-".repeat(if with_lift { 78 } else { 71 }))?;

    for row in &rendered.display_rows {
        write_row(out, row)?;
    }

    if let Some(notice) = rendered.summary.notice() {
        writeln!(out)?;
        writeln!(out, "{notice}")?;
    }

    Ok(())
}

fn write_row(out: &mut impl Write, row: &DisplayRow) -> std::io::Result<()> {
    write!(
        out,
        "{:<24} {:<24} {:>9} {:>11}",
        row.from_site, row.to_site, row.support_pct, row.confidence_pct
    )?;
    if let Some(lift) = row.lift {
        write!(out, " {lift:>6.2}")?;
    }
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use rule_map_render::render;
    use rule_map_rule_models::{AgeGroup, Religion, Rule};

    use super::*;

    #[test]
    fn ambiguous_selection_halts_before_loading() {
        // The directory does not exist; reaching the load would fail with
        // NotFound instead of the selection error.
        let store = RuleStore::new("/nonexistent/rule_map");
        let request = RenderRequest {
            selection: SegmentSelection {
                age: Some(AgeGroup::Old),
                religion: Some(Religion::Jewish),
                continent: None,
            },
            ..RenderRequest::default()
        };

        let err = run(&store, &request).unwrap_err();
        assert!(err.to_string().starts_with("Please select only one filter"));
    }

    #[test]
    fn missing_table_surfaces_file_name() {
        let store = RuleStore::new("/nonexistent/rule_map");
        let err = run(&store, &RenderRequest::default()).unwrap_err();
        assert!(err.to_string().contains("association_rules_jerusalem_all.xlsx"));
    }

    #[test]
    fn table_lists_rows_and_notice() {
        let rendered = render(
            &[Rule::new("Unknown Place", "שער יפו", 0.12, 0.75, 1.3)],
            &FilterCriteria::default(),
        );
        let mut out = Vec::new();
        write_table(&mut out, &rendered).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("12.0%"));
        assert!(text.contains("75.0%"));
        assert!(text.contains("1.30"));
        assert!(text.contains("not drawn"));
    }

    #[test]
    fn empty_table_prints_no_match_notice() {
        let rendered = render(&[], &FilterCriteria::default());
        let mut out = Vec::new();
        write_table(&mut out, &rendered).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(rule_map_render::NO_MATCHES_NOTICE));
    }
}
