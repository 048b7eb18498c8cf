use std::io::{self, Write};

use colored::{ColoredString, Colorize};

use super::{ReportError, Reporter};
use crate::analysis::AnalysisReport;
use crate::stats::{AnovaRow, AnovaTerm, DifferenceOutcome, PatternDifference, Side, TestResult};

const RULE_WIDTH: usize = 100;

/// A reporter that prints the merged dataset and statistics to the terminal.
#[derive(Debug, Clone, Default)]
pub struct TerminalReporter {
    /// Whether to use colors in output (defaults to true).
    use_colors: bool,
}

impl TerminalReporter {
    /// Create a new terminal reporter with default settings.
    pub fn new() -> Self {
        Self { use_colors: true }
    }

    /// Create a terminal reporter with color output disabled.
    pub fn without_colors() -> Self {
        Self { use_colors: false }
    }

    fn paint(&self, text: &str, style: impl Fn(&str) -> ColoredString) -> String {
        if self.use_colors {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Format an energy value with a unit that keeps it readable.
    fn format_energy(joules: f64) -> String {
        if joules.abs() >= 1_000.0 {
            format!("{:.3} kJ", joules / 1_000.0)
        } else if joules.abs() >= 1.0 || joules == 0.0 {
            format!("{:.3} J", joules)
        } else {
            format!("{:.3} mJ", joules * 1_000.0)
        }
    }

    /// Format a signed percent change.
    fn format_change(percent: f64) -> String {
        if percent > 0.0 {
            format!("+{:.2}%", percent)
        } else if percent < 0.0 {
            format!("-{:.2}%", percent.abs())
        } else {
            "0.00%".to_string()
        }
    }

    fn format_optional(value: Option<f64>, precision: usize) -> String {
        match value {
            Some(v) => format!("{:.*}", precision, v),
            None => "-".to_string(),
        }
    }

    fn print_title(&self, writer: &mut impl Write, title: &str) -> io::Result<()> {
        writeln!(writer)?;
        writeln!(writer, "{}", self.paint(title, |t| t.bold()))?;
        writeln!(writer, "{}", "-".repeat(RULE_WIDTH))?;
        Ok(())
    }

    fn print_merged(&self, writer: &mut impl Write, report: &AnalysisReport) -> io::Result<()> {
        self.print_title(writer, "Merged dataset")?;
        writeln!(
            writer,
            "{:<14} {:<10} {:>10} {:>14} {:>12} {:>14} {:>16}",
            "Pattern", "Language", "Messages", "Time (ms)", "Power (W)", "Energy", "Carbon (kg)"
        )?;

        for record in &report.merged {
            let messages = record
                .message_count()
                .map(|m| m.to_string())
                .unwrap_or_else(|| "-".to_string());
            writeln!(
                writer,
                "{:<14} {:<10} {:>10} {:>14.3} {:>12.3} {:>14} {:>16.3e}",
                record.pattern(),
                record.language(),
                messages,
                record.execution_time_ms(),
                record.average_power_w(),
                Self::format_energy(record.energy_j()),
                record.carbon_kg(),
            )?;
        }

        if report.merged.is_empty() {
            writeln!(writer, "{}", self.paint("no matching records", |t| t.yellow()))?;
        }
        Ok(())
    }

    fn print_difference(
        &self,
        writer: &mut impl Write,
        difference: &PatternDifference,
    ) -> io::Result<()> {
        match &difference.outcome {
            DifferenceOutcome::Computed {
                reference_energy_j,
                candidate_energy_j,
                percent,
            } => {
                let change = Self::format_change(*percent);
                // Pad before coloring; ANSI codes would break the width.
                let padded = format!("{:>12}", change);
                let colored = if *percent < 0.0 {
                    self.paint(&padded, |t| t.green())
                } else if *percent > 0.0 {
                    self.paint(&padded, |t| t.red())
                } else {
                    padded
                };
                writeln!(
                    writer,
                    "{:<14} {:>16} {:>16} {}",
                    difference.pattern,
                    Self::format_energy(*reference_energy_j),
                    Self::format_energy(*candidate_energy_j),
                    colored,
                )
            }
            DifferenceOutcome::NotApplicable { reason } => {
                let text = format!("n/a ({})", reason);
                writeln!(
                    writer,
                    "{:<14} {:>16} {:>16} {}",
                    difference.pattern,
                    "-",
                    "-",
                    self.paint(&text, |t| t.yellow()),
                )
            }
        }
    }

    fn print_differences(&self, writer: &mut impl Write, report: &AnalysisReport) -> io::Result<()> {
        let title = format!(
            "Energy difference ({} vs {})",
            report.languages.candidate, report.languages.reference
        );
        self.print_title(writer, &title)?;
        writeln!(
            writer,
            "{:<14} {:>16} {:>16} {:>12}",
            "Pattern", report.languages.reference, report.languages.candidate, "Change"
        )?;
        for difference in &report.differences {
            self.print_difference(writer, difference)?;
        }
        Ok(())
    }

    fn print_correlation(&self, writer: &mut impl Write, report: &AnalysisReport) -> io::Result<()> {
        self.print_title(writer, "Correlation (energy vs execution time)")?;
        match report.correlation {
            Some(r) => writeln!(writer, "Pearson r = {:.3}", r),
            None => writeln!(
                writer,
                "Pearson r = {}",
                self.paint("undefined (insufficient data)", |t| t.yellow())
            ),
        }
    }

    /// Format the t-test verdict with appropriate coloring.
    fn format_result(&self, result: &TestResult, report: &AnalysisReport) -> String {
        if result.p_value.is_none() {
            return self.paint("insufficient data", |t| t.yellow());
        }
        match result.winner {
            Some(Side::Candidate) => {
                let text = format!("{} uses less energy", report.languages.candidate);
                self.paint(&text, |t| t.green().bold())
            }
            Some(Side::Reference) => {
                let text = format!("{} uses less energy", report.languages.reference);
                self.paint(&text, |t| t.red().bold())
            }
            None => self.paint("inconclusive", |t| t.yellow()),
        }
    }

    fn print_significance(&self, writer: &mut impl Write, report: &AnalysisReport) -> io::Result<()> {
        let result = &report.significance;
        self.print_title(writer, "Welch's t-test (energy)")?;
        writeln!(
            writer,
            "{:>20} {:>20} {:>12} {:>10} {:>10}",
            format!("{} (n={})", report.languages.reference, result.reference_count),
            format!("{} (n={})", report.languages.candidate, result.candidate_count),
            "Change",
            "t",
            "p-value"
        )?;
        let mean = |m: f64| {
            if m.is_finite() {
                Self::format_energy(m)
            } else {
                "-".to_string()
            }
        };
        writeln!(
            writer,
            "{:>20} {:>20} {:>12} {:>10} {:>10}",
            mean(result.reference_mean),
            mean(result.candidate_mean),
            Self::format_change(result.effect_size),
            Self::format_optional(result.t_statistic, 3),
            Self::format_optional(result.p_value, 4),
        )?;
        writeln!(
            writer,
            "Result: {} (confidence {:.0}%)",
            self.format_result(result, report),
            result.confidence_level * 100.0
        )?;
        Ok(())
    }

    fn print_anova_row(&self, writer: &mut impl Write, row: &AnovaRow) -> io::Result<()> {
        let verdict = if row.term == AnovaTerm::Residual || row.is_estimable() {
            String::new()
        } else {
            self.paint("insufficient data", |t| t.yellow())
        };
        writeln!(
            writer,
            "{:<20} {:>6} {:>16.4} {:>12} {:>12} {}",
            row.term.to_string(),
            row.df,
            row.sum_sq,
            Self::format_optional(row.f_statistic, 4),
            Self::format_optional(row.p_value, 6),
            verdict,
        )
    }

    fn print_anova(&self, writer: &mut impl Write, report: &AnalysisReport) -> io::Result<()> {
        self.print_title(writer, "Two-way ANOVA (energy ~ pattern * language, Type II)")?;
        writeln!(
            writer,
            "{:<20} {:>6} {:>16} {:>12} {:>12}",
            "Term", "df", "sum_sq", "F", "PR(>F)"
        )?;
        for row in &report.anova.rows {
            self.print_anova_row(writer, row)?;
        }
        Ok(())
    }

    /// Print the summary footer.
    fn print_summary(&self, writer: &mut impl Write, report: &AnalysisReport) -> io::Result<()> {
        writeln!(writer)?;
        writeln!(writer, "{}", "-".repeat(RULE_WIDTH))?;

        let summary = format!(
            "{} merged rows, {} skipped telemetry files",
            report.merged.len(),
            report.skipped.len()
        );
        writeln!(writer, "{} {}", self.paint("Summary:", |t| t.bold()), summary)?;

        for skipped in &report.skipped {
            let line = format!("  skipped file {}: {}", skipped.file_name, skipped.reason);
            writeln!(writer, "{}", self.paint(&line, |t| t.yellow()))?;
        }
        for statistic in report.undefined_statistics() {
            let line = format!("  insufficient data for {}", statistic);
            writeln!(writer, "{}", self.paint(&line, |t| t.yellow()))?;
        }

        writeln!(writer)?;
        Ok(())
    }

    /// Write the complete report to `writer`.
    pub fn write_report(&self, writer: &mut impl Write, report: &AnalysisReport) -> io::Result<()> {
        self.print_merged(writer, report)?;
        self.print_differences(writer, report)?;
        self.print_correlation(writer, report)?;
        self.print_significance(writer, report)?;
        self.print_anova(writer, report)?;
        self.print_summary(writer, report)?;
        Ok(())
    }
}

impl Reporter for TerminalReporter {
    fn report(&self, report: &AnalysisReport) -> Result<(), ReportError> {
        let stdout = io::stdout();
        let mut writer = stdout.lock();
        self.write_report(&mut writer, report)?;
        Ok(())
    }
}
