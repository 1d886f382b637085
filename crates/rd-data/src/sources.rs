use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use rd_types::Symbol;

use crate::providers::{CsvDataProvider, MarketDataProvider, SampleDataProvider};

/// Selects and configures the market data provider for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DataSourceConfig {
    /// Synthetic random walk; `failing` symbols always fail to fetch.
    Sample {
        #[serde(default)]
        failing: Vec<Symbol>,
    },
    /// One CSV file per symbol and resolution.
    Csv {
        directory: PathBuf,
        #[serde(default)]
        file_pattern: Option<String>,
    },
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        DataSourceConfig::Sample {
            failing: Vec::new(),
        }
    }
}

impl DataSourceConfig {
    pub fn csv(directory: impl Into<PathBuf>) -> Self {
        DataSourceConfig::Csv {
            directory: directory.into(),
            file_pattern: None,
        }
    }

    pub fn build(&self) -> Arc<dyn MarketDataProvider> {
        match self {
            DataSourceConfig::Sample { failing } => {
                Arc::new(SampleDataProvider::new().with_failing(failing.iter().cloned()))
            }
            DataSourceConfig::Csv {
                directory,
                file_pattern,
            } => {
                let provider = CsvDataProvider::new(directory);
                match file_pattern {
                    Some(pattern) => Arc::new(provider.with_pattern(pattern)),
                    None => Arc::new(provider),
                }
            }
        }
    }
}
