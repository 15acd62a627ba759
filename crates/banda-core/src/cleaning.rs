use std::collections::HashSet;
use std::path::Path;

use polars::prelude::*;
use tracing::info;

use crate::config::{ColumnConfig, SourceConfig};
use crate::error::Result;
use crate::loading::{check_alignment, load_sources};
use crate::report::CleaningReport;
use crate::table::{Table, TableRole};

/// The three tables after cleaning, still row aligned.
#[derive(Debug, Clone)]
pub struct CleanedTables {
    pub samples: Table,
    pub params: Table,
    pub output: Table,
    pub report: CleaningReport,
}

impl CleanedTables {
    pub fn into_tuple(self) -> (Table, Table, Table) {
        (self.samples, self.params, self.output)
    }
}

/// Loads the samples, model inputs and model outputs and removes duplicated
/// and physically invalid runs, using the default column names.
///
/// Returns `(samples, params, output)`. Row labels of removed runs are left
/// vacant rather than renumbered.
pub fn get_cleaned_data(
    samples_source: impl AsRef<Path>,
    params_source: impl AsRef<Path>,
    output_source: impl AsRef<Path>,
) -> Result<(Table, Table, Table)> {
    let sources = SourceConfig::new(
        samples_source.as_ref(),
        params_source.as_ref(),
        output_source.as_ref(),
    );
    clean_sources(&sources, &ColumnConfig::default()).map(CleanedTables::into_tuple)
}

pub fn clean_sources(sources: &SourceConfig, columns: &ColumnConfig) -> Result<CleanedTables> {
    let (samples, params, output) = load_sources(sources)?;
    clean_tables(samples, params, output, columns)
}

/// Runs every cleaning step on tables that are already in memory.
///
/// Step order matters: duplicates are detected on the merged, trimmed params,
/// and the arrival filter only sees rows that survived deduplication.
pub fn clean_tables(
    samples: Table,
    params: Table,
    output: Table,
    columns: &ColumnConfig,
) -> Result<CleanedTables> {
    check_alignment(&samples, &params, &output)?;
    columns.validate()?;
    validate_columns(&params, &output, columns)?;

    let loaded_rows = samples.height();

    let params = merge_depth(params, columns)?;

    let redundant_params = columns.redundant_params();
    let params = drop_columns(params, TableRole::Params, &redundant_params)?;

    let correlated_outputs: Vec<&str> =
        columns.correlated_outputs.iter().map(String::as_str).collect();
    let output = drop_columns(output, TableRole::Output, &correlated_outputs)?;

    let keep = first_occurrence_mask(params.frame())?;
    let (samples, params, output) = retain_aligned(&samples, &params, &output, &keep)?;
    let duplicate_rows_dropped = loaded_rows - params.height();
    info!(
        dropped = duplicate_rows_dropped,
        remaining = params.height(),
        "Dropped duplicated parameter rows"
    );

    let keep = non_negative_arrival_mask(&output, &columns.arrival)?;
    let before_arrival = output.height();
    let (samples, params, output) = retain_aligned(&samples, &params, &output, &keep)?;
    let negative_arrival_rows_dropped = before_arrival - output.height();
    info!(
        dropped = negative_arrival_rows_dropped,
        remaining = output.height(),
        column = columns.arrival.as_str(),
        "Dropped rows with negative arrival time"
    );

    let report = CleaningReport {
        loaded_rows,
        duplicate_rows_dropped,
        negative_arrival_rows_dropped,
        retained_rows: output.height(),
        dropped_params_columns: redundant_params.iter().map(|name| name.to_string()).collect(),
        dropped_output_columns: columns.correlated_outputs.clone(),
    };

    info!(
        loaded = report.loaded_rows,
        retained = report.retained_rows,
        "Cleaning complete"
    );

    Ok(CleanedTables {
        samples,
        params,
        output,
        report,
    })
}

fn validate_columns(params: &Table, output: &Table, columns: &ColumnConfig) -> Result<()> {
    params.require_column(TableRole::Params, &columns.depth)?;
    for name in columns.redundant_params() {
        params.require_column(TableRole::Params, name)?;
    }
    for name in &columns.correlated_outputs {
        output.require_column(TableRole::Output, name)?;
    }
    output.require_column(TableRole::Output, &columns.arrival)
}

/// Folds the depth offset into depth, keeping the column where it was.
pub fn merge_depth(params: Table, columns: &ColumnConfig) -> Result<Table> {
    params.require_column(TableRole::Params, &columns.depth)?;
    params.require_column(TableRole::Params, &columns.depth_offset)?;

    let depth = columns.depth.as_str();
    let offset = columns.depth_offset.as_str();

    params.map_frame(|frame| {
        let merged = frame
            .lazy()
            .with_column((col(depth) + col(offset)).alias(depth))
            .collect()?;
        Ok(merged)
    })
}

pub fn drop_columns(table: Table, role: TableRole, names: &[&str]) -> Result<Table> {
    for name in names {
        table.require_column(role, name)?;
    }

    table.map_frame(|frame| {
        let mut frame = frame;
        for name in names {
            frame = frame.drop(name)?;
        }
        Ok(frame)
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum RowCell {
    Null,
    Float(u64),
    Text(String),
}

enum KeyColumn {
    Float(Float64Chunked),
    Text(StringChunked),
}

impl KeyColumn {
    fn from_column(column: &Column) -> PolarsResult<Self> {
        if column.dtype().is_float() {
            Ok(KeyColumn::Float(column.cast(&DataType::Float64)?.f64()?.clone()))
        } else {
            Ok(KeyColumn::Text(column.cast(&DataType::String)?.str()?.clone()))
        }
    }

    fn cell(&self, idx: usize) -> RowCell {
        match self {
            KeyColumn::Float(values) => values
                .get(idx)
                .map_or(RowCell::Null, |value| RowCell::Float(float_bits(value))),
            KeyColumn::Text(values) => values
                .get(idx)
                .map_or(RowCell::Null, |value| RowCell::Text(value.to_string())),
        }
    }
}

// 0.0 == -0.0 and all NaNs compare equal for duplicate detection.
fn float_bits(value: f64) -> u64 {
    if value == 0.0 {
        0.0f64.to_bits()
    } else if value.is_nan() {
        f64::NAN.to_bits()
    } else {
        value.to_bits()
    }
}

/// Marks each row `true` unless every column equals some earlier row.
pub fn first_occurrence_mask(frame: &DataFrame) -> Result<Vec<bool>> {
    let key_columns = frame
        .get_columns()
        .iter()
        .map(KeyColumn::from_column)
        .collect::<PolarsResult<Vec<_>>>()?;

    let mut seen: HashSet<Vec<RowCell>> = HashSet::with_capacity(frame.height());
    let mut keep = Vec::with_capacity(frame.height());

    for idx in 0..frame.height() {
        let key: Vec<RowCell> = key_columns.iter().map(|column| column.cell(idx)).collect();
        keep.push(seen.insert(key));
    }

    Ok(keep)
}

/// Marks each row `true` unless its arrival time is strictly negative.
/// Missing and NaN arrivals are kept.
pub fn non_negative_arrival_mask(output: &Table, arrival: &str) -> Result<Vec<bool>> {
    output.require_column(TableRole::Output, arrival)?;

    let arrival = output.frame().column(arrival)?.cast(&DataType::Float64)?;
    let values = arrival.f64()?;

    Ok(values
        .into_iter()
        .map(|value| !matches!(value, Some(v) if v < 0.0))
        .collect())
}

/// Applies one row mask to all three tables.
pub fn retain_aligned(
    samples: &Table,
    params: &Table,
    output: &Table,
    keep: &[bool],
) -> Result<(Table, Table, Table)> {
    Ok((
        samples.retain(keep)?,
        params.retain(keep)?,
        output.retain(keep)?,
    ))
}
