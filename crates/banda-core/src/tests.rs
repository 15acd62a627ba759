use polars::prelude::*;

use crate::cleaning::{
    clean_tables, drop_columns, first_occurrence_mask, merge_depth, non_negative_arrival_mask,
};
use crate::config::{CleanerConfig, ColumnConfig, SourceConfig};
use crate::error::CleanerError;
use crate::table::{Table, TableRole};

fn scenario_tables() -> PolarsResult<(Table, Table, Table)> {
    let samples = df!(
        "latitude" => [-4.5, -4.5, -4.9],
        "longitude" => [131.2, 131.2, 130.8],
        "magnitude" => [8.4, 8.4, 8.1],
    )?;
    let params = df!(
        "depth" => [1.0, 1.0, 3.0],
        "depth_offset" => [2.0, 2.0, 0.0],
        "rake" => [5.0, 5.0, 5.0],
    )?;
    let output = df!(
        "Banda Neira arrival" => [10.0, 10.0, -1.0],
        "Banda Neira height" => [1.5, 1.5, 0.2],
        "Banda Neira inundation" => [40.0, 40.0, 0.0],
        "Saparua inundation" => [12.0, 12.0, 0.0],
    )?;
    Ok((
        Table::from_frame(samples),
        Table::from_frame(params),
        Table::from_frame(output),
    ))
}

#[test]
fn table_retain_keeps_surviving_labels() -> PolarsResult<()> {
    let table = Table::from_frame(df!("a" => [1i64, 2, 3, 4])?);
    let kept = table.retain(&[true, false, false, true]).unwrap();

    assert_eq!(kept.index(), &[0, 3]);
    assert_eq!(kept.height(), 2);
    let values: Vec<Option<i64>> = kept.frame().column("a")?.i64()?.into_iter().collect();
    assert_eq!(values, vec![Some(1), Some(4)]);

    let kept_again = kept.retain(&[false, true]).unwrap();
    assert_eq!(kept_again.index(), &[3]);
    Ok(())
}

#[test]
fn table_retain_rejects_wrong_mask_length() -> PolarsResult<()> {
    let table = Table::from_frame(df!("a" => [1i64, 2])?);
    assert!(table.retain(&[true]).is_err());
    Ok(())
}

#[test]
fn indexed_frame_leads_with_labels() -> PolarsResult<()> {
    let table = Table::from_frame(df!("a" => [7i64, 8, 9])?)
        .retain(&[false, true, true])
        .unwrap();
    let frame = table.to_indexed_frame("").unwrap();

    assert_eq!(frame.width(), 2);
    assert_eq!(frame.get_column_names()[0].as_str(), "");
    let labels: Vec<Option<u64>> = frame.get_columns()[0].u64()?.into_iter().collect();
    assert_eq!(labels, vec![Some(1), Some(2)]);
    Ok(())
}

#[test]
fn merge_depth_adds_offset_in_place() -> PolarsResult<()> {
    let params = Table::from_frame(df!(
        "strike" => [10.0, 20.0],
        "depth" => [1.0, 4.5],
        "depth_offset" => [2.0, -0.5],
    )?);

    let merged = merge_depth(params, &ColumnConfig::default()).unwrap();

    assert_eq!(merged.column_names(), vec!["strike", "depth", "depth_offset"]);
    let depth: Vec<Option<f64>> = merged.frame().column("depth")?.f64()?.into_iter().collect();
    assert_eq!(depth, vec![Some(3.0), Some(4.0)]);
    Ok(())
}

#[test]
fn drop_columns_reports_missing_column() -> PolarsResult<()> {
    let params = Table::from_frame(df!("depth" => [1.0])?);
    let err = drop_columns(params, TableRole::Params, &["rake"]).unwrap_err();

    match err {
        CleanerError::MissingColumn { role, column } => {
            assert_eq!(role, TableRole::Params);
            assert_eq!(column, "rake");
        }
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}

#[test]
fn first_occurrence_mask_keeps_first_of_each_group() -> PolarsResult<()> {
    let frame = df!(
        "depth" => [3.0, 3.0, 5.0, 3.0, 5.0],
        "dip" => [10i64, 10, 10, 11, 10],
    )?;

    let mask = first_occurrence_mask(&frame).unwrap();
    assert_eq!(mask, vec![true, false, true, true, false]);
    Ok(())
}

#[test]
fn first_occurrence_mask_treats_nulls_and_nans_as_equal() -> PolarsResult<()> {
    let frame = DataFrame::new(vec![
        Series::new(
            "depth".into(),
            [Some(f64::NAN), Some(f64::NAN), None, None, Some(0.0), Some(-0.0)],
        )
        .into(),
        Series::new("label".into(), ["a", "a", "b", "b", "c", "c"]).into(),
    ])?;

    let mask = first_occurrence_mask(&frame).unwrap();
    assert_eq!(mask, vec![true, false, true, false, true, false]);
    Ok(())
}

#[test]
fn arrival_mask_only_drops_strictly_negative() -> PolarsResult<()> {
    let output = Table::from_frame(DataFrame::new(vec![Series::new(
        "Banda Neira arrival".into(),
        [Some(0.0), Some(-0.5), None, Some(f64::NAN), Some(12.0)],
    )
    .into()])?);

    let mask = non_negative_arrival_mask(&output, "Banda Neira arrival").unwrap();
    assert_eq!(mask, vec![true, false, true, true, true]);
    Ok(())
}

#[test]
fn arrival_mask_accepts_integer_column() -> PolarsResult<()> {
    let output = Table::from_frame(df!("Banda Neira arrival" => [-1i64, 0, 3])?);
    let mask = non_negative_arrival_mask(&output, "Banda Neira arrival").unwrap();
    assert_eq!(mask, vec![false, true, true]);
    Ok(())
}

#[test]
fn clean_tables_matches_worked_scenario() -> PolarsResult<()> {
    let (samples, params, output) = scenario_tables()?;
    let cleaned = clean_tables(samples, params, output, &ColumnConfig::default()).unwrap();

    assert_eq!(cleaned.samples.height(), 1);
    assert_eq!(cleaned.params.height(), 1);
    assert_eq!(cleaned.output.height(), 1);
    assert_eq!(cleaned.params.index(), &[0]);
    assert_eq!(cleaned.samples.index(), cleaned.output.index());

    assert_eq!(cleaned.params.column_names(), vec!["depth"]);
    assert_eq!(
        cleaned.output.column_names(),
        vec!["Banda Neira arrival", "Banda Neira height"]
    );
    assert_eq!(cleaned.params.frame().column("depth")?.f64()?.get(0), Some(3.0));
    Ok(())
}

#[test]
fn clean_tables_counts_each_stage() -> PolarsResult<()> {
    let samples = Table::from_frame(df!("magnitude" => [8.0, 8.0, 8.1, 8.2])?);
    let params = Table::from_frame(df!(
        "strike" => [100.0, 100.0, 110.0, 120.0],
        "depth" => [1.0, 1.0, 3.0, 4.0],
        "depth_offset" => [2.0, 2.0, 0.0, 0.0],
        "rake" => [90.0, 90.0, 90.0, 90.0],
    )?);
    let output = Table::from_frame(df!(
        "Banda Neira arrival" => [10.0, 10.0, -1.0, 25.0],
        "Banda Neira inundation" => [1.0, 1.0, 1.0, 1.0],
        "Saparua inundation" => [1.0, 1.0, 1.0, 1.0],
    )?);

    let cleaned = clean_tables(samples, params, output, &ColumnConfig::default()).unwrap();
    let report = &cleaned.report;

    assert_eq!(report.loaded_rows, 4);
    assert_eq!(report.duplicate_rows_dropped, 1);
    assert_eq!(report.negative_arrival_rows_dropped, 1);
    assert_eq!(report.retained_rows, 2);
    assert_eq!(report.rows_dropped() + report.retained_rows, report.loaded_rows);
    assert_eq!(report.dropped_params_columns, vec!["rake", "depth_offset"]);

    assert_eq!(cleaned.samples.index(), &[0, 3]);
    assert_eq!(cleaned.params.index(), &[0, 3]);
    assert_eq!(cleaned.output.index(), &[0, 3]);
    Ok(())
}

#[test]
fn clean_tables_rejects_misaligned_input() -> PolarsResult<()> {
    let (samples, params, _) = scenario_tables()?;
    let output = Table::from_frame(df!(
        "Banda Neira arrival" => [1.0],
        "Banda Neira inundation" => [1.0],
        "Saparua inundation" => [1.0],
    )?);

    let err = clean_tables(samples, params, output, &ColumnConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        CleanerError::Misaligned {
            samples: 3,
            params: 3,
            output: 1
        }
    ));
    Ok(())
}

#[test]
fn clean_tables_validates_before_transforming() -> PolarsResult<()> {
    let (samples, params, _) = scenario_tables()?;
    let output = Table::from_frame(df!(
        "Banda Neira arrival" => [1.0, 2.0, 3.0],
        "Banda Neira inundation" => [1.0, 1.0, 1.0],
    )?);

    let err = clean_tables(samples, params, output, &ColumnConfig::default()).unwrap_err();
    match err {
        CleanerError::MissingColumn { role, column } => {
            assert_eq!(role, TableRole::Output);
            assert_eq!(column, "Saparua inundation");
        }
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}

#[test]
fn config_defaults_match_workflow_names() {
    let config = CleanerConfig::default();

    assert_eq!(config.sources.samples.to_str(), Some("full_samples.csv"));
    assert_eq!(config.sources.params.to_str(), Some("full_params.csv"));
    assert_eq!(config.sources.output.to_str(), Some("full_output.csv"));
    assert_eq!(config.sources.separator_byte().unwrap(), b',');
    assert_eq!(config.columns.redundant_params(), vec!["rake", "depth_offset"]);
    assert_eq!(config.columns.arrival, "Banda Neira arrival");
}

#[test]
fn config_toml_overrides_are_partial() {
    let config = CleanerConfig::from_toml_str(
        r#"
[sources]
params = "inputs/params.tsv"
separator = "\t"

[columns]
constant_params = ["rake", "slip_angle"]
"#,
    )
    .unwrap();

    assert_eq!(config.sources.params.to_str(), Some("inputs/params.tsv"));
    assert_eq!(config.sources.samples.to_str(), Some("full_samples.csv"));
    assert_eq!(config.sources.separator_byte().unwrap(), b'\t');
    assert_eq!(
        config.columns.redundant_params(),
        vec!["rake", "slip_angle", "depth_offset"]
    );
    assert_eq!(config.columns.depth, "depth");
}

#[test]
fn config_rejects_non_ascii_separator() {
    let err = CleanerConfig::from_toml_str("[sources]\nseparator = \"é\"\n").unwrap_err();
    assert!(matches!(err, CleanerError::Config(_)));
}

#[test]
fn config_survives_toml_round_trip() {
    let config = CleanerConfig::default();
    let rendered = config.to_toml_string().unwrap();
    assert_eq!(CleanerConfig::from_toml_str(&rendered).unwrap(), config);
}

#[test]
fn relative_sources_resolve_against_base() {
    let sources = SourceConfig::new("a.csv", "/abs/b.csv", "sub/c.csv");
    let resolved = sources.resolve_against(std::path::Path::new("/data/run1"));

    assert_eq!(resolved.samples.to_str(), Some("/data/run1/a.csv"));
    assert_eq!(resolved.params.to_str(), Some("/abs/b.csv"));
    assert_eq!(resolved.output.to_str(), Some("/data/run1/sub/c.csv"));
}

#[test]
fn config_rejects_arrival_listed_as_correlated_output() {
    let err = CleanerConfig::from_toml_str(
        r#"
[columns]
correlated_outputs = ["Banda Neira arrival", "Saparua inundation"]
"#,
    )
    .unwrap_err();
    assert!(matches!(err, CleanerError::Config(_)));
}

#[test]
fn config_rejects_depth_offset_listed_as_constant() {
    let err = CleanerConfig::from_toml_str(
        r#"
[columns]
constant_params = ["rake", "depth_offset"]
"#,
    )
    .unwrap_err();
    assert!(matches!(err, CleanerError::Config(_)));
}

#[test]
fn clean_tables_rejects_overlapping_columns_before_transforming() -> PolarsResult<()> {
    let (samples, params, output) = scenario_tables()?;
    let columns = ColumnConfig {
        correlated_outputs: vec!["Banda Neira arrival".to_string()],
        ..ColumnConfig::default()
    };

    let err = clean_tables(samples, params, output, &columns).unwrap_err();
    assert!(matches!(err, CleanerError::Config(_)));
    Ok(())
}
