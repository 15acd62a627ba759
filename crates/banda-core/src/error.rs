// crates/banda-core/src/error.rs

use std::path::PathBuf;

use polars::error::PolarsError;
use thiserror::Error;

use crate::table::TableRole;

#[derive(Error, Debug)]
pub enum CleanerError {
    #[error("{role} source not found: {}", path.display())]
    NotFound { role: TableRole, path: PathBuf },

    #[error("failed to read {role} table from {}: {source}", path.display())]
    Read {
        role: TableRole,
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("{role} table has no leading identifier column")]
    MissingIdentifier { role: TableRole },

    #[error("{role} table is missing required column `{column}`")]
    MissingColumn { role: TableRole, column: String },

    #[error("tables are not row-aligned: samples={samples}, params={params}, output={output}")]
    Misaligned {
        samples: usize,
        params: usize,
        output: usize,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Configuration TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, CleanerError>;
