pub mod cleaning;
pub mod config;
pub mod error;
pub mod loading;
pub mod report;
pub mod table;

pub use cleaning::{clean_sources, clean_tables, get_cleaned_data, CleanedTables};
pub use config::{CleanerConfig, ColumnConfig, SourceConfig};
pub use error::{CleanerError, Result};
pub use report::CleaningReport;
pub use table::{Table, TableRole};

#[cfg(test)]
mod tests;
