//! Command-line interface for pattern-energy.

use crate::config::Config;
use crate::source::RecordStoreKind;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "pattern-energy")]
#[command(about = "Correlate design-pattern benchmarks with power telemetry and compare languages")]
#[command(version)]
pub struct Cli {
    /// Directory of <pattern>_<language>.csv telemetry logs
    #[arg(short, long)]
    pub telemetry_dir: Option<PathBuf>,

    /// Execution records: a CSV file, or a SQLite database with --records-kind sqlite
    #[arg(short, long)]
    pub records: Option<PathBuf>,

    /// Storage of the execution records
    #[arg(long, value_enum)]
    pub records_kind: Option<RecordStoreKind>,

    /// Where to write the merged dataset CSV
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also write the full analysis as JSON to this path
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Header of the power column in the telemetry logs
    #[arg(long)]
    pub power_column: Option<String>,

    /// Emission factor in kg CO2e per kWh
    #[arg(long)]
    pub emission_factor: Option<f64>,

    /// Reference language for comparisons
    #[arg(long)]
    pub reference: Option<String>,

    /// Candidate language compared against the reference
    #[arg(long)]
    pub candidate: Option<String>,

    /// Confidence level for the t-test (0.0-1.0)
    #[arg(long)]
    pub confidence_level: Option<f64>,

    /// Path to config file (defaults to .pattern-energy.toml if present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Disable colored terminal output
    #[arg(long)]
    pub no_color: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Apply CLI overrides to the configuration.
    ///
    /// CLI arguments take precedence over config file values.
    /// Only non-None optional values will override the config.
    pub fn apply_to_config(&self, config: &mut Config) {
        if let Some(dir) = &self.telemetry_dir {
            config.telemetry.directory = dir.clone();
        }

        if let Some(records) = &self.records {
            config.records.path = records.clone();
        }

        if let Some(kind) = self.records_kind {
            config.records.kind = kind;
        }

        if let Some(output) = &self.output {
            config.output.merged_path = output.clone();
        }

        if let Some(json) = &self.json {
            config.output.json_path = Some(json.clone());
        }

        if let Some(column) = &self.power_column {
            config.telemetry.power_column = column.clone();
        }

        if let Some(factor) = self.emission_factor {
            config.energy.emission_factor = factor;
        }

        if let Some(reference) = &self.reference {
            config.comparison.reference_language = reference.clone();
        }

        if let Some(candidate) = &self.candidate {
            config.comparison.candidate_language = candidate.clone();
        }

        if let Some(confidence_level) = self.confidence_level {
            config.comparison.confidence_level = confidence_level;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_to_config_with_overrides() {
        let cli = Cli::parse_from([
            "pattern-energy",
            "--telemetry-dir",
            "logs",
            "--records",
            "summary.csv",
            "--output",
            "merged.csv",
            "--json",
            "report.json",
            "--power-column",
            "CPU Power",
            "--emission-factor",
            "0.25",
            "--reference",
            "go",
            "--candidate",
            "rust",
            "--confidence-level",
            "0.99",
        ]);

        let mut config = Config::default();
        cli.apply_to_config(&mut config);

        assert_eq!(config.telemetry.directory, PathBuf::from("logs"));
        assert_eq!(config.records.path, PathBuf::from("summary.csv"));
        assert_eq!(config.output.merged_path, PathBuf::from("merged.csv"));
        assert_eq!(config.output.json_path, Some(PathBuf::from("report.json")));
        assert_eq!(config.telemetry.power_column, "CPU Power");
        assert_eq!(config.energy.emission_factor, 0.25);
        assert_eq!(config.comparison.reference_language, "go");
        assert_eq!(config.comparison.candidate_language, "rust");
        assert_eq!(config.comparison.confidence_level, 0.99);
    }

    #[test]
    fn test_apply_to_config_without_overrides() {
        let cli = Cli::parse_from(["pattern-energy"]);

        let mut config = Config::default();
        cli.apply_to_config(&mut config);

        // Values should remain unchanged
        let defaults = Config::default();
        assert_eq!(config.telemetry.directory, defaults.telemetry.directory);
        assert_eq!(config.records.path, defaults.records.path);
        assert_eq!(config.energy.emission_factor, defaults.energy.emission_factor);
        assert_eq!(
            config.comparison.candidate_language,
            defaults.comparison.candidate_language
        );
        assert!(config.output.json_path.is_none());
    }

    #[test]
    fn test_apply_to_config_partial_overrides() {
        let cli = Cli::parse_from(["pattern-energy", "-t", "hw", "--candidate", "go"]);

        let mut config = Config::default();
        cli.apply_to_config(&mut config);

        // Only specified values should be overridden
        assert_eq!(config.telemetry.directory, PathBuf::from("hw"));
        assert_eq!(config.comparison.candidate_language, "go");
        assert_eq!(config.comparison.reference_language, "java");
    }

    #[test]
    fn test_records_kind_override() {
        let cli = Cli::parse_from([
            "pattern-energy",
            "--records",
            "telemetry_results.db",
            "--records-kind",
            "sqlite",
        ]);

        let mut config = Config::default();
        cli.apply_to_config(&mut config);

        assert_eq!(config.records.kind, RecordStoreKind::Sqlite);
        assert_eq!(config.records.path, PathBuf::from("telemetry_results.db"));
        assert!(Cli::try_parse_from(["pattern-energy", "--records-kind", "postgres"]).is_err());
    }

    #[test]
    fn test_cli_parse_flags() {
        let cli = Cli::parse_from([
            "pattern-energy",
            "--config",
            "custom.toml",
            "--no-color",
            "-v",
        ]);

        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        assert!(cli.no_color);
        assert!(cli.verbose);
        assert!(cli.telemetry_dir.is_none());
    }

    #[test]
    fn test_cli_rejects_non_numeric_factor() {
        let result = Cli::try_parse_from(["pattern-energy", "--emission-factor", "lots"]);
        assert!(result.is_err());
    }
}
