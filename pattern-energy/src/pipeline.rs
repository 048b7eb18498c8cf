//! End-to-end batch: ingest telemetry, load records, join, analyze.
//!
//! The pipeline is single-threaded and synchronous. Each stage receives its
//! settings explicitly, so several differently configured pipelines can run
//! in the same process.

use std::path::PathBuf;

use pattern_energy_core::{AnalysisReport, ComparisonLanguages, EnergyModel, WelchTTest};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;
use crate::ingest::{IngestError, PowerLogIngestor};
use crate::merge::merge;
use crate::source::{RecordError, RecordSource};

/// Errors that abort a pipeline run. No partial report is produced.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Records(#[from] RecordError),
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    telemetry_dir: PathBuf,
    ingestor: PowerLogIngestor,
    model: EnergyModel,
    languages: ComparisonLanguages,
    test: WelchTTest,
}

impl Pipeline {
    pub fn new(
        telemetry_dir: impl Into<PathBuf>,
        ingestor: PowerLogIngestor,
        model: EnergyModel,
        languages: ComparisonLanguages,
        test: WelchTTest,
    ) -> Self {
        Self {
            telemetry_dir: telemetry_dir.into(),
            ingestor,
            model,
            languages,
            test,
        }
    }

    /// Build a pipeline from a validated configuration.
    pub fn from_config(config: &Config) -> Result<Self, PipelineError> {
        config
            .validate()
            .map_err(|e| PipelineError::InvalidConfig(e.to_string()))?;

        Ok(Self::new(
            config.telemetry.directory.clone(),
            PowerLogIngestor::new(config.telemetry.power_column.clone()),
            config.energy_model(),
            config.languages(),
            WelchTTest::new(config.comparison.confidence_level),
        ))
    }

    /// Run the batch against `source`.
    ///
    /// # Errors
    ///
    /// Fails if the telemetry directory is missing or the record source
    /// cannot be read. Skipped telemetry files and undefined statistics are
    /// reported, not errors.
    pub fn run(&self, source: &dyn RecordSource) -> Result<AnalysisReport, PipelineError> {
        info!(dir = %self.telemetry_dir.display(), "Extracting power data from telemetry logs");
        let ingested = self.ingestor.ingest_dir(&self.telemetry_dir)?;

        info!("Loading execution records");
        let executions = source.load()?;

        info!("Merging datasets and computing energy");
        let joined = merge(&ingested.averages, &executions, &self.model);
        for (pattern, language) in &joined.execution_only {
            info!(pattern = %pattern, language = %language, "No telemetry for execution records");
        }
        for (pattern, language) in &joined.power_only {
            info!(pattern = %pattern, language = %language, "No execution records for telemetry");
        }
        info!(rows = joined.merged.len(), "Merged dataset ready");

        let report = AnalysisReport::analyze(
            joined.merged,
            ingested.skipped,
            self.languages.clone(),
            &self.test,
        );
        for statistic in report.undefined_statistics() {
            warn!("Insufficient data for {}", statistic);
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticRecordSource;
    use pattern_energy_core::ExecutionRecord;
    use std::fs;

    #[test]
    fn test_from_config_rejects_invalid() {
        let mut config = Config::default();
        config.comparison.confidence_level = 2.0;
        assert!(matches!(
            Pipeline::from_config(&config),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_missing_telemetry_dir_is_fatal() {
        let mut config = Config::default();
        config.telemetry.directory = PathBuf::from("/nonexistent/hwinfo");
        let pipeline = Pipeline::from_config(&config).unwrap();

        let result = pipeline.run(&StaticRecordSource::default());
        assert!(matches!(result, Err(PipelineError::Ingest(_))));
    }

    #[test]
    fn test_run_with_static_records() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("strategy_java.csv"),
            "CPU Package Power [W]\n50\n50\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("strategy_python.csv"),
            "CPU Package Power [W]\n40\n",
        )
        .unwrap();

        let mut config = Config::default();
        config.telemetry.directory = dir.path().to_path_buf();
        let pipeline = Pipeline::from_config(&config).unwrap();

        let source = StaticRecordSource::new(vec![
            ExecutionRecord::new("strategy", "java", Some(100), 2000.0),
            ExecutionRecord::new("strategy", "python", Some(100), 2000.0),
        ]);
        let report = pipeline.run(&source).unwrap();

        assert_eq!(report.merged.len(), 2);
        assert_eq!(report.merged[0].energy_j(), 100.0);
        assert_eq!(report.merged[1].energy_j(), 80.0);
        assert_eq!(report.differences[0].percent(), Some(-20.0));
    }
}
