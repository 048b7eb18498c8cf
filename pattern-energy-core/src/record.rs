//! Data model shared by the ingestion, merging and reporting stages.
//!
//! Power telemetry and benchmark execution records are keyed by
//! `(pattern, language)`. A [`MergedRecord`] can only be produced through an
//! [`EnergyModel`], so its derived columns always agree with its inputs.

use std::fmt;

use serde::Serialize;

/// Joules in one kilowatt-hour.
pub const JOULES_PER_KWH: f64 = 3_600_000.0;

/// Default grid emission factor in kg CO2e per kWh.
pub const DEFAULT_EMISSION_FACTOR: f64 = 0.6;

/// Mean CPU power drawn during one benchmark, reduced from a telemetry log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerAverage {
    pub pattern: String,
    pub language: String,
    /// Arithmetic mean of the valid samples, in watts.
    pub average_power_w: f64,
    /// Number of samples that contributed to the mean.
    pub sample_count: usize,
}

impl PowerAverage {
    /// Reduce a set of valid samples to their mean.
    ///
    /// Returns `None` when there are no samples, so an empty log never turns
    /// into a zero-watt reading.
    pub fn from_samples(
        pattern: impl Into<String>,
        language: impl Into<String>,
        samples: &[f64],
    ) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let sum: f64 = samples.iter().sum();
        Some(Self {
            pattern: pattern.into(),
            language: language.into(),
            average_power_w: sum / samples.len() as f64,
            sample_count: samples.len(),
        })
    }

    pub fn key(&self) -> (&str, &str) {
        (&self.pattern, &self.language)
    }
}

/// One benchmark run as reported by the workload generators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionRecord {
    pub pattern: String,
    pub language: String,
    /// Number of messages processed, when the source reports it.
    pub message_count: Option<u64>,
    pub execution_time_ms: f64,
}

impl ExecutionRecord {
    pub fn new(
        pattern: impl Into<String>,
        language: impl Into<String>,
        message_count: Option<u64>,
        execution_time_ms: f64,
    ) -> Self {
        Self {
            pattern: pattern.into(),
            language: language.into(),
            message_count,
            execution_time_ms,
        }
    }

    pub fn key(&self) -> (&str, &str) {
        (&self.pattern, &self.language)
    }

    pub fn execution_time_s(&self) -> f64 {
        self.execution_time_ms / 1000.0
    }
}

/// Converts joined power and time measurements into energy and carbon figures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnergyModel {
    /// kg CO2e emitted per kWh consumed.
    pub emission_factor: f64,
}

impl Default for EnergyModel {
    fn default() -> Self {
        Self {
            emission_factor: DEFAULT_EMISSION_FACTOR,
        }
    }
}

impl EnergyModel {
    pub fn new(emission_factor: f64) -> Self {
        Self { emission_factor }
    }

    /// Join one power average with one execution record.
    ///
    /// The caller is responsible for matching keys; the merged record takes
    /// its key from the execution record. Negative inputs are not clamped.
    pub fn derive(&self, power: &PowerAverage, execution: &ExecutionRecord) -> MergedRecord {
        let execution_time_s = execution.execution_time_s();
        let energy_j = execution_time_s * power.average_power_w;
        let energy_kwh = energy_j / JOULES_PER_KWH;
        let energy_per_message_j = match execution.message_count {
            Some(count) if count > 0 => Some(energy_j / count as f64),
            _ => None,
        };

        MergedRecord {
            pattern: execution.pattern.clone(),
            language: execution.language.clone(),
            message_count: execution.message_count,
            execution_time_ms: execution.execution_time_ms,
            execution_time_s,
            average_power_w: power.average_power_w,
            energy_j,
            energy_kwh,
            carbon_kg: energy_kwh * self.emission_factor,
            energy_per_message_j,
        }
    }
}

/// A benchmark run joined with its power average, plus derived energy metrics.
///
/// Fields are read-only; construct through [`EnergyModel::derive`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedRecord {
    pattern: String,
    language: String,
    message_count: Option<u64>,
    execution_time_ms: f64,
    execution_time_s: f64,
    average_power_w: f64,
    energy_j: f64,
    energy_kwh: f64,
    carbon_kg: f64,
    energy_per_message_j: Option<f64>,
}

impl MergedRecord {
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn message_count(&self) -> Option<u64> {
        self.message_count
    }

    pub fn execution_time_ms(&self) -> f64 {
        self.execution_time_ms
    }

    pub fn execution_time_s(&self) -> f64 {
        self.execution_time_s
    }

    pub fn average_power_w(&self) -> f64 {
        self.average_power_w
    }

    pub fn energy_j(&self) -> f64 {
        self.energy_j
    }

    pub fn energy_kwh(&self) -> f64 {
        self.energy_kwh
    }

    pub fn carbon_kg(&self) -> f64 {
        self.carbon_kg
    }

    pub fn energy_per_message_j(&self) -> Option<f64> {
        self.energy_per_message_j
    }
}

/// Why a telemetry file did not produce a [`PowerAverage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// The file stem is not `<pattern>_<language>`.
    MalformedFilename,
    /// No header matched the configured power column.
    MissingColumn { column: String },
    /// The power column had no parseable readings.
    NoValidSamples,
    /// An earlier file already supplied this `(pattern, language)`.
    DuplicateKey { pattern: String, language: String },
    /// The file could not be read or was not valid CSV.
    Unreadable { message: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MalformedFilename => {
                write!(f, "filename is not <pattern>_<language>.csv")
            }
            SkipReason::MissingColumn { column } => {
                write!(f, "power column '{}' not found", column)
            }
            SkipReason::NoValidSamples => write!(f, "no valid power samples"),
            SkipReason::DuplicateKey { pattern, language } => {
                write!(f, "duplicate telemetry for {}/{}", pattern, language)
            }
            SkipReason::Unreadable { message } => write!(f, "unreadable: {}", message),
        }
    }
}

/// A telemetry file that was skipped, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub file_name: String,
    pub reason: SkipReason,
}
