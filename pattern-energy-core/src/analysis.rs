//! Runs every comparative statistic over a merged dataset.

use serde::Serialize;

use crate::record::{MergedRecord, SkippedFile};
use crate::stats::{
    compare_languages, pearson, two_way_anova, AnovaTable, ComparisonLanguages,
    PatternDifference, StatisticalTest, TestResult,
};

/// Everything a reporter needs: the merged table and the statistics over it.
///
/// Each statistic is computed independently, so one that is undefined for
/// the data at hand does not prevent the others from being reported.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub languages: ComparisonLanguages,
    pub merged: Vec<MergedRecord>,
    /// Telemetry files that did not contribute a power average.
    pub skipped: Vec<SkippedFile>,
    pub differences: Vec<PatternDifference>,
    /// Pearson r between `energy_j` and `execution_time_ms`; `None` if undefined.
    pub correlation: Option<f64>,
    /// Reference vs candidate energy, pooled over patterns.
    pub significance: TestResult,
    pub anova: AnovaTable,
}

impl AnalysisReport {
    pub fn analyze(
        merged: Vec<MergedRecord>,
        skipped: Vec<SkippedFile>,
        languages: ComparisonLanguages,
        test: &dyn StatisticalTest,
    ) -> Self {
        let differences = compare_languages(&merged, &languages);

        let energy: Vec<f64> = merged.iter().map(MergedRecord::energy_j).collect();
        let time: Vec<f64> = merged.iter().map(MergedRecord::execution_time_ms).collect();
        let correlation = pearson(&energy, &time);

        let energy_of = |language: &str| -> Vec<f64> {
            merged
                .iter()
                .filter(|r| r.language() == language)
                .map(MergedRecord::energy_j)
                .collect()
        };
        let significance = test.analyze(
            &energy_of(&languages.reference),
            &energy_of(&languages.candidate),
        );

        let anova = two_way_anova(
            merged
                .iter()
                .map(|r| (r.pattern(), r.language(), r.energy_j())),
        );

        Self {
            languages,
            merged,
            skipped,
            differences,
            correlation,
            significance,
            anova,
        }
    }

    /// The percent difference to show on a merged row: only the candidate
    /// row of a pattern with a computed comparison carries one.
    pub fn difference_for(&self, record: &MergedRecord) -> Option<f64> {
        if record.language() != self.languages.candidate {
            return None;
        }
        self.differences
            .iter()
            .find(|d| d.pattern == record.pattern())
            .and_then(PatternDifference::percent)
    }

    /// Names of the statistics that could not be computed.
    pub fn undefined_statistics(&self) -> Vec<String> {
        let mut undefined = Vec::new();
        if self.correlation.is_none() {
            undefined.push("correlation".to_string());
        }
        if self.significance.p_value.is_none() {
            undefined.push("t-test".to_string());
        }
        undefined.extend(
            self.anova
                .unestimable_terms()
                .map(|term| format!("ANOVA term {}", term)),
        );
        undefined
    }
}
