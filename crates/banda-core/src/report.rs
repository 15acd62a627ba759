use serde::Serialize;

/// What one cleaning run removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleaningReport {
    pub loaded_rows: usize,
    pub duplicate_rows_dropped: usize,
    pub negative_arrival_rows_dropped: usize,
    pub retained_rows: usize,
    pub dropped_params_columns: Vec<String>,
    pub dropped_output_columns: Vec<String>,
}

impl CleaningReport {
    pub fn rows_dropped(&self) -> usize {
        self.duplicate_rows_dropped + self.negative_arrival_rows_dropped
    }
}
