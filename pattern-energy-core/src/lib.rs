//! Core types and utilities for pattern-energy.
//!
//! This crate holds the energy data model, the comparative statistics run over
//! merged benchmark/telemetry data, and the reporters that present them. It
//! performs no file discovery of its own; see the `pattern-energy` crate for
//! ingestion and the command-line pipeline.

pub mod analysis;
pub mod record;
pub mod report;
pub mod stats;

// Re-export main types for convenience
pub use analysis::AnalysisReport;
pub use record::{
    EnergyModel, ExecutionRecord, MergedRecord, PowerAverage, SkipReason, SkippedFile,
    DEFAULT_EMISSION_FACTOR, JOULES_PER_KWH,
};
pub use report::{CsvReporter, JsonReporter, ReportError, Reporter, TerminalReporter};
pub use stats::{
    pearson, two_way_anova, AnovaTable, AnovaTerm, ComparisonLanguages, DifferenceOutcome,
    PatternDifference, Side, StatisticalTest, TestResult, WelchTTest,
};
