use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use super::{ReportError, Reporter};
use crate::analysis::AnalysisReport;

/// Writes the full analysis (merged rows and all statistics) as pretty JSON.
///
/// Undefined statistics serialize as `null`.
#[derive(Debug, Clone)]
pub struct JsonReporter {
    path: PathBuf,
}

impl JsonReporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn write_to<W: Write>(mut writer: W, report: &AnalysisReport) -> Result<(), ReportError> {
        serde_json::to_writer_pretty(&mut writer, report)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}

impl Reporter for JsonReporter {
    fn report(&self, report: &AnalysisReport) -> Result<(), ReportError> {
        let file = File::create(&self.path)?;
        Self::write_to(BufWriter::new(file), report)
    }
}
