use std::fs::File;
use std::path::PathBuf;

use csv::{ReaderBuilder, StringRecord, Trim};
use pattern_energy_core::ExecutionRecord;
use tracing::{debug, warn};

use super::{RecordError, RecordSource, TimeUnit};
use crate::config::RecordsConfig;

/// Execution records stored in a header-plus-rows CSV file.
#[derive(Debug, Clone)]
pub struct CsvRecordSource {
    path: PathBuf,
    pattern_column: String,
    language_column: String,
    time_column: String,
    time_unit: TimeUnit,
    count_column: Option<String>,
}

impl CsvRecordSource {
    /// A source using the default column names (`pattern`, `language`,
    /// `execution_time_ms`, `messages`).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let defaults = RecordsConfig::default();
        Self {
            path: path.into(),
            ..Self::from_config(&defaults)
        }
    }

    pub fn from_config(config: &RecordsConfig) -> Self {
        Self {
            path: config.path.clone(),
            pattern_column: config.pattern_column.clone(),
            language_column: config.language_column.clone(),
            time_column: config.time_column.clone(),
            time_unit: config.time_unit,
            count_column: config.count_column().map(str::to_string),
        }
    }

    fn column(headers: &StringRecord, name: &str) -> Result<usize, RecordError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| RecordError::MissingColumn(name.to_string()))
    }
}

fn field(row: &StringRecord, idx: usize) -> &str {
    row.get(idx).unwrap_or("")
}

/// Message counts may be written as floats by upstream tooling (`1000.0`).
fn parse_count(raw: &str) -> Option<u64> {
    raw.parse::<u64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|v| *v >= 0.0 && v.fract() == 0.0 && *v <= u64::MAX as f64)
            .map(|v| v as u64)
    })
}

impl RecordSource for CsvRecordSource {
    fn load(&self) -> Result<Vec<ExecutionRecord>, RecordError> {
        let file = File::open(&self.path).map_err(|source| RecordError::Open {
            path: self.path.clone(),
            source,
        })?;
        let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(file);

        let headers = reader.headers()?.clone();
        let pattern_idx = Self::column(&headers, &self.pattern_column)?;
        let language_idx = Self::column(&headers, &self.language_column)?;
        let time_idx = Self::column(&headers, &self.time_column)?;
        let count_idx = match &self.count_column {
            Some(name) => match Self::column(&headers, name) {
                Ok(idx) => Some(idx),
                Err(_) => {
                    warn!(column = %name, "Message count column not found; counts unavailable");
                    None
                }
            },
            None => None,
        };

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            let line = row.position().map(|p| p.line()).unwrap_or(0);
            let raw_time = field(&row, time_idx);
            let time = raw_time
                .parse::<f64>()
                .map_err(|_| RecordError::InvalidValue {
                    line,
                    column: self.time_column.clone(),
                    value: raw_time.to_string(),
                })?;

            records.push(ExecutionRecord::new(
                field(&row, pattern_idx),
                field(&row, language_idx),
                count_idx.and_then(|idx| parse_count(field(&row, idx))),
                self.time_unit.to_millis(time),
            ));
        }

        debug!(
            path = %self.path.display(),
            count = records.len(),
            "Loaded execution records"
        );
        Ok(records)
    }
}
