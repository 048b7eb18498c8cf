use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;

use super::{ReportError, Reporter};
use crate::analysis::AnalysisReport;

/// Column names of the merged table, in `MergedRow` field order.
const COLUMNS: [&str; 11] = [
    "pattern",
    "language",
    "message_count",
    "execution_time_ms",
    "execution_time_s",
    "average_power_w",
    "energy_j",
    "energy_kwh",
    "carbon_kg",
    "energy_per_message_j",
    "energy_diff_vs_reference_pct",
];

/// One line of the merged output table.
#[derive(Debug, Serialize)]
struct MergedRow<'a> {
    pattern: &'a str,
    language: &'a str,
    message_count: Option<u64>,
    execution_time_ms: f64,
    execution_time_s: f64,
    average_power_w: f64,
    energy_j: f64,
    energy_kwh: f64,
    carbon_kg: f64,
    energy_per_message_j: Option<f64>,
    energy_diff_vs_reference_pct: Option<f64>,
}

/// Writes the merged dataset as a comma-separated file.
///
/// Rows keep the order of the merged dataset and the file has no timestamp,
/// so identical inputs produce identical bytes.
#[derive(Debug, Clone)]
pub struct CsvReporter {
    path: PathBuf,
}

impl CsvReporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Write the merged table to any writer. The header is written even
    /// when no rows were merged.
    pub fn write_to<W: Write>(writer: W, report: &AnalysisReport) -> Result<(), ReportError> {
        let mut csv = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        csv.write_record(COLUMNS)?;
        for record in &report.merged {
            csv.serialize(MergedRow {
                pattern: record.pattern(),
                language: record.language(),
                message_count: record.message_count(),
                execution_time_ms: record.execution_time_ms(),
                execution_time_s: record.execution_time_s(),
                average_power_w: record.average_power_w(),
                energy_j: record.energy_j(),
                energy_kwh: record.energy_kwh(),
                carbon_kg: record.carbon_kg(),
                energy_per_message_j: record.energy_per_message_j(),
                energy_diff_vs_reference_pct: report.difference_for(record),
            })?;
        }
        csv.flush()?;
        Ok(())
    }
}

impl Reporter for CsvReporter {
    fn report(&self, report: &AnalysisReport) -> Result<(), ReportError> {
        let file = File::create(&self.path)?;
        Self::write_to(file, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{EnergyModel, ExecutionRecord, PowerAverage};
    use crate::stats::{ComparisonLanguages, WelchTTest};

    fn report() -> AnalysisReport {
        let model = EnergyModel::default();
        let merged = [("java", 50.0, Some(100)), ("python", 40.0, None)]
            .iter()
            .map(|(language, power, count)| {
                let power = PowerAverage {
                    pattern: "strategy".to_string(),
                    language: language.to_string(),
                    average_power_w: *power,
                    sample_count: 3,
                };
                model.derive(&power, &ExecutionRecord::new("strategy", *language, *count, 2000.0))
            })
            .collect();
        AnalysisReport::analyze(
            merged,
            Vec::new(),
            ComparisonLanguages::default(),
            &WelchTTest::default(),
        )
    }

    #[test]
    fn test_header_and_rows() {
        let mut buffer = Vec::new();
        CsvReporter::write_to(&mut buffer, &report()).unwrap();
        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "pattern,language,message_count,execution_time_ms,execution_time_s,\
             average_power_w,energy_j,energy_kwh,carbon_kg,energy_per_message_j,\
             energy_diff_vs_reference_pct"
        );
        assert!(lines[1].starts_with("strategy,java,100,2000.0,2.0,50.0,100.0,"));
        // Reference row has no difference; candidate row has -20%.
        assert!(lines[1].ends_with(",1.0,"));
        assert!(lines[2].starts_with("strategy,python,,2000.0,2.0,40.0,80.0,"));
        assert!(lines[2].ends_with(",,-20.0"));
    }

    #[test]
    fn test_empty_report_has_header() {
        let empty = AnalysisReport::analyze(
            Vec::new(),
            Vec::new(),
            ComparisonLanguages::default(),
            &WelchTTest::default(),
        );

        let mut buffer = Vec::new();
        CsvReporter::write_to(&mut buffer, &empty).unwrap();
        let output = String::from_utf8(buffer).unwrap();

        assert_eq!(output.lines().count(), 1);
        assert!(output.starts_with("pattern,language,"));
        assert_eq!(output.trim_end().split(',').count(), COLUMNS.len());
    }

    #[test]
    fn test_report_to_file_is_repeatable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merged.csv");
        let reporter = CsvReporter::new(&path);

        reporter.report(&report()).unwrap();
        let first = std::fs::read(&path).unwrap();
        reporter.report(&report()).unwrap();
        let second = std::fs::read(&path).unwrap();

        assert_eq!(first, second);
    }
}
