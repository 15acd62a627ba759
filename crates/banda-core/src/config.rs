use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CleanerError, Result};

pub const DEFAULT_SAMPLES_FILE: &str = "full_samples.csv";
pub const DEFAULT_PARAMS_FILE: &str = "full_params.csv";
pub const DEFAULT_OUTPUT_FILE: &str = "full_output.csv";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanerConfig {
    pub sources: SourceConfig,
    pub columns: ColumnConfig,
}

impl CleanerConfig {
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: CleanerConfig = toml::from_str(toml_str)?;
        config.sources.separator_byte()?;
        config.columns.validate()?;
        Ok(config)
    }

    /// Reads a config file. Relative source paths are taken relative to the
    /// directory holding the file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&contents)?;
        if let Some(base) = path.parent() {
            config.sources = config.sources.resolve_against(base);
        }
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Where the three tables live and how they are delimited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub samples: PathBuf,
    pub params: PathBuf,
    pub output: PathBuf,
    pub separator: char,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            samples: PathBuf::from(DEFAULT_SAMPLES_FILE),
            params: PathBuf::from(DEFAULT_PARAMS_FILE),
            output: PathBuf::from(DEFAULT_OUTPUT_FILE),
            separator: ',',
        }
    }
}

impl SourceConfig {
    pub fn new(
        samples: impl Into<PathBuf>,
        params: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            samples: samples.into(),
            params: params.into(),
            output: output.into(),
            ..Self::default()
        }
    }

    pub fn resolve_against(&self, base: &Path) -> Self {
        let resolve = |path: &PathBuf| {
            if path.is_relative() {
                base.join(path)
            } else {
                path.clone()
            }
        };
        Self {
            samples: resolve(&self.samples),
            params: resolve(&self.params),
            output: resolve(&self.output),
            separator: self.separator,
        }
    }

    pub fn separator_byte(&self) -> Result<u8> {
        if self.separator.is_ascii() {
            Ok(self.separator as u8)
        } else {
            Err(CleanerError::Config(format!(
                "separator {:?} is not a single ASCII character",
                self.separator
            )))
        }
    }
}

/// Names of the columns the cleaning steps operate on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub depth: String,
    pub depth_offset: String,
    /// Params columns that carry no information (constant across samples).
    pub constant_params: Vec<String>,
    /// Output columns redundant with the retained wave heights.
    pub correlated_outputs: Vec<String>,
    pub arrival: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            depth: "depth".to_string(),
            depth_offset: "depth_offset".to_string(),
            constant_params: vec!["rake".to_string()],
            correlated_outputs: vec![
                "Banda Neira inundation".to_string(),
                "Saparua inundation".to_string(),
            ],
            arrival: "Banda Neira arrival".to_string(),
        }
    }
}

impl ColumnConfig {
    /// Params columns removed after the depth merge, in drop order.
    pub fn redundant_params(&self) -> Vec<&str> {
        self.constant_params
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.depth_offset.as_str()))
            .collect()
    }

    /// Rejects column roles that overlap, since a column dropped by one step
    /// could not be read by a later one.
    pub fn validate(&self) -> Result<()> {
        if self.depth == self.depth_offset {
            return Err(CleanerError::Config(format!(
                "depth and depth_offset both name column `{}`",
                self.depth
            )));
        }
        if let Some(name) = self
            .constant_params
            .iter()
            .find(|name| **name == self.depth || **name == self.depth_offset)
        {
            return Err(CleanerError::Config(format!(
                "constant_params must not list depth column `{name}`"
            )));
        }
        if self.correlated_outputs.contains(&self.arrival) {
            return Err(CleanerError::Config(format!(
                "correlated_outputs must not list arrival column `{}`",
                self.arrival
            )));
        }
        Ok(())
    }
}
