use crate::analysis::AnalysisReport;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub trait Reporter: Send + Sync {
    fn report(&self, report: &AnalysisReport) -> Result<(), ReportError>;
}

mod csv_table;
mod json;
mod terminal;
pub use csv_table::CsvReporter;
pub use json::JsonReporter;
pub use terminal::TerminalReporter;
