//! Configuration loading for pattern-energy.
//!
//! Supports loading configuration from TOML files, with sensible defaults
//! for all settings.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::source::{RecordStoreKind, TimeUnit, DEFAULT_TABLE};
use pattern_energy_core::{ComparisonLanguages, EnergyModel, DEFAULT_EMISSION_FACTOR};

/// Top-level configuration for pattern-energy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the power telemetry logs live and how to read them.
    pub telemetry: TelemetryConfig,
    /// Where the benchmark execution records live and how to read them.
    pub records: RecordsConfig,
    /// Energy and carbon conversion.
    pub energy: EnergyConfig,
    /// Which languages to compare.
    pub comparison: ComparisonConfig,
    /// Output file locations.
    pub output: OutputConfig,
}

/// Configuration for the power telemetry directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Directory containing one `<pattern>_<language>.csv` log per benchmark.
    pub directory: PathBuf,
    /// Header of the column holding package power readings.
    pub power_column: String,
}

/// Configuration for the execution-record CSV.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordsConfig {
    /// `csv` for a CSV file, `sqlite` for a SQLite database.
    pub kind: RecordStoreKind,
    /// CSV file or SQLite database file.
    pub path: PathBuf,
    /// Table holding the records when `kind` is `sqlite`.
    pub table: String,
    pub pattern_column: String,
    pub language_column: String,
    pub time_column: String,
    /// Unit of `time_column`; values are converted to milliseconds on read.
    pub time_unit: TimeUnit,
    /// Optional message count column. Empty disables it.
    pub count_column: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyConfig {
    /// kg CO2e per kWh.
    pub emission_factor: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    pub reference_language: String,
    pub candidate_language: String,
    /// Confidence level for the t-test (e.g., 0.95 for 95% confidence).
    pub confidence_level: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Merged dataset CSV.
    pub merged_path: PathBuf,
    /// Optional JSON dump of the full analysis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_path: Option<PathBuf>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("hwinfo_files"),
            power_column: "CPU Package Power [W]".to_string(),
        }
    }
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            kind: RecordStoreKind::Csv,
            path: PathBuf::from("execution_summary.csv"),
            table: DEFAULT_TABLE.to_string(),
            pattern_column: "pattern".to_string(),
            language_column: "language".to_string(),
            time_column: "execution_time_ms".to_string(),
            time_unit: TimeUnit::Milliseconds,
            count_column: "messages".to_string(),
        }
    }
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            emission_factor: DEFAULT_EMISSION_FACTOR,
        }
    }
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        let languages = ComparisonLanguages::default();
        Self {
            reference_language: languages.reference,
            candidate_language: languages.candidate,
            confidence_level: 0.95,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            merged_path: PathBuf::from("final_research_results.csv"),
            json_path: None,
        }
    }
}

impl RecordsConfig {
    pub fn count_column(&self) -> Option<&str> {
        let column = self.count_column.trim();
        (!column.is_empty()).then_some(column)
    }
}

/// Default configuration file name.
const DEFAULT_CONFIG_FILE: &str = ".pattern-energy.toml";

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load configuration from the default file (`.pattern-energy.toml`) or use defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be parsed.
    pub fn load_or_default() -> Result<Config> {
        let path = Path::new(DEFAULT_CONFIG_FILE);

        if path.exists() {
            Self::load(path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load configuration from the specified path, or try the default location.
    pub fn load_from(path: Option<&Path>) -> Result<Config> {
        match path {
            Some(p) => Self::load(p),
            None => Self::load_or_default(),
        }
    }

    /// Reject values no run could use.
    pub fn validate(&self) -> Result<()> {
        let confidence = self.comparison.confidence_level;
        if !(confidence > 0.0 && confidence < 1.0) {
            bail!(
                "confidence_level must be between 0 and 1 (exclusive), got {}",
                confidence
            );
        }
        if !self.energy.emission_factor.is_finite() {
            bail!("emission_factor must be a finite number");
        }
        if self.telemetry.power_column.trim().is_empty() {
            bail!("power_column must not be empty");
        }
        if self.comparison.reference_language == self.comparison.candidate_language {
            bail!(
                "reference and candidate language are both '{}'",
                self.comparison.reference_language
            );
        }
        Ok(())
    }

    pub fn energy_model(&self) -> EnergyModel {
        EnergyModel::new(self.energy.emission_factor)
    }

    pub fn languages(&self) -> ComparisonLanguages {
        ComparisonLanguages::new(
            self.comparison.reference_language.clone(),
            self.comparison.candidate_language.clone(),
        )
    }
}
