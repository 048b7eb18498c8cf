use std::path::PathBuf;

use pattern_energy_core::ExecutionRecord;
use sea_orm::{Database, DatabaseConnection, DbBackend, FromQueryResult, Statement, Value};
use tracing::{debug, warn};

use super::{RecordError, RecordSource, TimeUnit};
use crate::config::RecordsConfig;

/// Table written by the benchmark runners.
pub const DEFAULT_TABLE: &str = "benchmark_results";

#[derive(Debug, FromQueryResult)]
struct ColumnName {
    name: String,
}

#[derive(Debug, FromQueryResult)]
struct BenchmarkRow {
    pattern: String,
    language: String,
    execution_time: Option<f64>,
    message_count: Option<i64>,
}

/// Execution records stored in a SQLite table, one row per benchmark run.
#[derive(Debug, Clone)]
pub struct SqliteRecordSource {
    path: PathBuf,
    table: String,
    pattern_column: String,
    language_column: String,
    time_column: String,
    time_unit: TimeUnit,
    count_column: Option<String>,
}

/// Quote an identifier for use in SQL.
fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

impl SqliteRecordSource {
    /// A source reading `benchmark_results` with the default column names.
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
            table: config.table.clone(),
            pattern_column: config.pattern_column.clone(),
            language_column: config.language_column.clone(),
            time_column: config.time_column.clone(),
            time_unit: config.time_unit,
            count_column: config.count_column().map(str::to_string),
        }
    }

    async fn columns(&self, db: &DatabaseConnection) -> Result<Vec<String>, RecordError> {
        let statement = Statement::from_sql_and_values(
            DbBackend::Sqlite,
            "SELECT name FROM pragma_table_info(?)",
            [Value::from(self.table.clone())],
        );
        let columns = ColumnName::find_by_statement(statement).all(db).await?;
        Ok(columns.into_iter().map(|c| c.name).collect())
    }

    fn select(&self, columns: &[String]) -> Result<String, RecordError> {
        let require = |name: &str| {
            if columns.iter().any(|c| c == name) {
                Ok(quote(name))
            } else {
                Err(RecordError::MissingColumn(name.to_string()))
            }
        };
        let pattern = require(&self.pattern_column)?;
        let language = require(&self.language_column)?;
        let time = require(&self.time_column)?;
        let count = match &self.count_column {
            Some(name) if columns.iter().any(|c| c == name) => {
                format!("CAST({} AS INTEGER)", quote(name))
            }
            Some(name) => {
                warn!(column = %name, "Message count column not found; counts unavailable");
                "NULL".to_string()
            }
            None => "NULL".to_string(),
        };

        Ok(format!(
            "SELECT {} AS pattern, {} AS language, CAST({} AS REAL) AS execution_time, \
             {} AS message_count FROM {} ORDER BY rowid",
            pattern,
            language,
            time,
            count,
            quote(&self.table)
        ))
    }

    async fn fetch(&self) -> Result<Vec<ExecutionRecord>, RecordError> {
        // Never create the database as a side effect of reading it.
        std::fs::metadata(&self.path).map_err(|source| RecordError::Open {
            path: self.path.clone(),
            source,
        })?;
        let url = format!("sqlite://{}?mode=ro", self.path.display());
        let db = Database::connect(url).await?;

        let columns = self.columns(&db).await?;
        if columns.is_empty() {
            return Err(RecordError::MissingTable(self.table.clone()));
        }
        let sql = self.select(&columns)?;
        let rows = BenchmarkRow::find_by_statement(Statement::from_string(DbBackend::Sqlite, sql))
            .all(&db)
            .await?;
        db.close().await?;

        rows.into_iter()
            .enumerate()
            .map(|(index, row)| -> Result<ExecutionRecord, RecordError> {
                let time = row.execution_time.ok_or_else(|| RecordError::InvalidValue {
                    line: index as u64 + 1,
                    column: self.time_column.clone(),
                    value: "NULL".to_string(),
                })?;
                Ok(ExecutionRecord::new(
                    row.pattern,
                    row.language,
                    row.message_count.and_then(|c| u64::try_from(c).ok()),
                    self.time_unit.to_millis(time),
                ))
            })
            .collect()
    }
}

impl RecordSource for SqliteRecordSource {
    fn load(&self) -> Result<Vec<ExecutionRecord>, RecordError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(RecordError::Runtime)?;
        let records = runtime.block_on(self.fetch())?;

        debug!(
            path = %self.path.display(),
            table = %self.table,
            count = records.len(),
            "Loaded execution records"
        );
        Ok(records)
    }
}
