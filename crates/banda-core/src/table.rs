use std::fmt;

use polars::prelude::*;

use crate::error::{CleanerError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableRole {
    Samples,
    Params,
    Output,
}

impl TableRole {
    pub fn canonical_name(&self) -> &'static str {
        match self {
            TableRole::Samples => "samples",
            TableRole::Params => "params",
            TableRole::Output => "output",
        }
    }
}

impl fmt::Display for TableRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

/// A DataFrame paired with the row labels it was loaded with.
///
/// Filtering keeps the labels of surviving rows, so a cleaned table still
/// tells you which row of the source file each entry came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    index: Vec<usize>,
    frame: DataFrame,
}

impl Table {
    /// Wraps a frame with a contiguous `0..height` index.
    pub fn from_frame(frame: DataFrame) -> Self {
        let index = (0..frame.height()).collect();
        Self { index, frame }
    }

    pub fn index(&self) -> &[usize] {
        &self.index
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_parts(self) -> (Vec<usize>, DataFrame) {
        (self.index, self.frame)
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.get_column_index(name).is_some()
    }

    pub fn require_column(&self, role: TableRole, name: &str) -> Result<()> {
        if self.has_column(name) {
            Ok(())
        } else {
            Err(CleanerError::MissingColumn {
                role,
                column: name.to_string(),
            })
        }
    }

    /// Keeps the rows whose mask entry is `true`, together with their labels.
    pub fn retain(&self, keep: &[bool]) -> Result<Self> {
        if keep.len() != self.height() {
            return Err(CleanerError::Polars(PolarsError::ShapeMismatch(
                format!(
                    "row mask has length {} but table has {} rows",
                    keep.len(),
                    self.height()
                )
                .into(),
            )));
        }

        let mask = BooleanChunked::from_slice("keep".into(), keep);
        let frame = self.frame.filter(&mask)?;
        let index = self
            .index
            .iter()
            .zip(keep)
            .filter_map(|(label, &kept)| kept.then_some(*label))
            .collect();

        Ok(Self { index, frame })
    }

    /// Applies a column-level transformation. Row count must not change.
    pub fn map_frame<F>(self, f: F) -> Result<Self>
    where
        F: FnOnce(DataFrame) -> Result<DataFrame>,
    {
        let expected = self.height();
        let frame = f(self.frame)?;
        if frame.height() != expected {
            return Err(CleanerError::Polars(PolarsError::ShapeMismatch(
                format!(
                    "column transformation changed row count from {} to {}",
                    expected,
                    frame.height()
                )
                .into(),
            )));
        }
        Ok(Self {
            index: self.index,
            frame,
        })
    }

    /// Returns the frame with the row labels materialised as a leading column.
    pub fn to_indexed_frame(&self, index_name: &str) -> Result<DataFrame> {
        let labels: Vec<u64> = self.index.iter().map(|&label| label as u64).collect();
        let mut frame = self.frame.clone();
        frame.insert_column(0, Series::new(index_name.into(), labels))?;
        Ok(frame)
    }
}
