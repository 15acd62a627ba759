use std::path::Path;

use polars::prelude::*;
use tracing::debug;

use crate::config::SourceConfig;
use crate::error::{CleanerError, Result};
use crate::table::{Table, TableRole};

/// Cell contents read as missing, matching the tokens dataframe tools
/// conventionally write for absent values.
pub const MISSING_VALUE_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Reads one delimited table, drops its leading identifier column and
/// attaches a fresh `0..n` index.
pub fn read_table(role: TableRole, path: &Path, separator: u8) -> Result<Table> {
    if !path.exists() {
        return Err(CleanerError::NotFound {
            role,
            path: path.to_path_buf(),
        });
    }

    let parse_options = CsvParseOptions::default()
        .with_separator(separator)
        .with_null_values(Some(NullValues::AllColumns(
            MISSING_VALUE_TOKENS.iter().map(|token| (*token).into()).collect(),
        )));

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .with_parse_options(parse_options)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(|source| match source {
            // No header row means there is no identifier column to drop.
            PolarsError::NoData(_) => CleanerError::MissingIdentifier { role },
            source => CleanerError::Read {
                role,
                path: path.to_path_buf(),
                source,
            },
        })?;

    let identifier = df
        .get_column_names()
        .first()
        .map(|name| name.to_string())
        .ok_or(CleanerError::MissingIdentifier { role })?;
    let frame = df.drop(&identifier)?;

    debug!(
        %role,
        path = %path.display(),
        rows = frame.height(),
        columns = frame.width(),
        "Loaded table"
    );

    Ok(Table::from_frame(frame))
}

/// Loads Samples, Params and Output, in that order, and checks that they
/// describe the same number of simulation runs.
pub fn load_sources(sources: &SourceConfig) -> Result<(Table, Table, Table)> {
    let separator = sources.separator_byte()?;

    let samples = read_table(TableRole::Samples, &sources.samples, separator)?;
    let params = read_table(TableRole::Params, &sources.params, separator)?;
    let output = read_table(TableRole::Output, &sources.output, separator)?;

    check_alignment(&samples, &params, &output)?;

    Ok((samples, params, output))
}

pub fn check_alignment(samples: &Table, params: &Table, output: &Table) -> Result<()> {
    if samples.height() == params.height() && params.height() == output.height() {
        return Ok(());
    }
    Err(CleanerError::Misaligned {
        samples: samples.height(),
        params: params.height(),
        output: output.height(),
    })
}
