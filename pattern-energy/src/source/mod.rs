//! Sources of benchmark execution records.
//!
//! The workload generators that produce these records are opaque to the
//! pipeline; it only needs `(pattern, language, message_count, time)` rows.

use std::path::PathBuf;

use pattern_energy_core::ExecutionRecord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::RecordsConfig;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Failed to open execution records {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse execution records: {0}")]
    Csv(#[from] csv::Error),
    #[error("Failed to query execution records: {0}")]
    Database(#[from] sea_orm::DbErr),
    #[error("Failed to start database runtime: {0}")]
    Runtime(#[source] std::io::Error),
    #[error("Execution records have no '{0}' table")]
    MissingTable(String),
    #[error("Execution records have no '{0}' column")]
    MissingColumn(String),
    #[error("Invalid {column} value '{value}' on line {line}")]
    InvalidValue {
        line: u64,
        column: String,
        value: String,
    },
}

/// Unit of the execution-time column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeUnit {
    #[default]
    #[serde(rename = "ms")]
    Milliseconds,
    #[serde(rename = "s")]
    Seconds,
}

impl TimeUnit {
    pub(crate) fn to_millis(self, value: f64) -> f64 {
        match self {
            TimeUnit::Milliseconds => value,
            TimeUnit::Seconds => value * 1000.0,
        }
    }
}

/// Where execution records are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RecordStoreKind {
    #[default]
    Csv,
    Sqlite,
}

pub trait RecordSource: Send + Sync {
    /// Read every execution record. Any failure is fatal for the run.
    fn load(&self) -> Result<Vec<ExecutionRecord>, RecordError>;
}

/// Records held in memory, e.g. already fetched from a database.
#[derive(Debug, Clone, Default)]
pub struct StaticRecordSource {
    records: Vec<ExecutionRecord>,
}

impl StaticRecordSource {
    pub fn new(records: Vec<ExecutionRecord>) -> Self {
        Self { records }
    }
}

impl RecordSource for StaticRecordSource {
    fn load(&self) -> Result<Vec<ExecutionRecord>, RecordError> {
        Ok(self.records.clone())
    }
}

/// Build the record source selected by `config.kind`.
pub fn from_config(config: &RecordsConfig) -> Box<dyn RecordSource> {
    match config.kind {
        RecordStoreKind::Csv => Box::new(CsvRecordSource::from_config(config)),
        RecordStoreKind::Sqlite => Box::new(SqliteRecordSource::from_config(config)),
    }
}

mod csv_file;
mod sqlite;
pub use csv_file::CsvRecordSource;
pub use sqlite::{SqliteRecordSource, DEFAULT_TABLE};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_unit_to_millis() {
        assert_eq!(TimeUnit::Milliseconds.to_millis(812.5), 812.5);
        assert_eq!(TimeUnit::Seconds.to_millis(1.5), 1500.0);
    }

    #[test]
    fn test_from_config_selects_store() {
        let dir = tempfile::tempdir().unwrap();
        let config = RecordsConfig {
            path: dir.path().join("absent.db"),
            kind: RecordStoreKind::Sqlite,
            ..RecordsConfig::default()
        };

        // Neither store creates the missing file.
        assert!(matches!(
            from_config(&config).load(),
            Err(RecordError::Open { .. })
        ));
        let csv = RecordsConfig {
            kind: RecordStoreKind::Csv,
            ..config
        };
        assert!(matches!(from_config(&csv).load(), Err(RecordError::Open { .. })));
        assert!(!csv.path.exists());
    }

    #[test]
    fn test_static_source() {
        let records = vec![ExecutionRecord::new("strategy", "java", Some(1), 10.0)];
        let source = StaticRecordSource::new(records.clone());
        assert_eq!(source.load().unwrap(), records);
    }
}
