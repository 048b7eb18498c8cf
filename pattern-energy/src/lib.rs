//! pattern-energy: energy comparison of design-pattern benchmarks across languages
//!
//! This library correlates benchmark execution records with hardware power
//! telemetry, derives energy and carbon figures, and compares languages with
//! percentage differences, correlation, a t-test and a two-way ANOVA.

pub mod cli;
pub mod config;
pub mod ingest;
pub mod merge;
pub mod pipeline;
pub mod source;

// Re-export core types for convenience
pub use pattern_energy_core::report::{
    CsvReporter, JsonReporter, ReportError, Reporter, TerminalReporter,
};
pub use pattern_energy_core::stats::{Side, StatisticalTest, TestResult, WelchTTest};
pub use pattern_energy_core::{
    AnalysisReport, EnergyModel, ExecutionRecord, MergedRecord, PowerAverage, SkipReason,
    SkippedFile,
};

// Re-export main types from this crate
pub use cli::Cli;
pub use config::Config;
pub use ingest::{IngestError, IngestSummary, PowerLogIngestor};
pub use merge::{merge, MergeResult};
pub use pipeline::{Pipeline, PipelineError};
pub use source::{
    CsvRecordSource, RecordError, RecordSource, RecordStoreKind, SqliteRecordSource,
    StaticRecordSource, TimeUnit,
};
