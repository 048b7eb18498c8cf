use serde::Serialize;

/// Identifies which side of a language comparison (reference or candidate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    Reference,
    Candidate,
}

/// The two languages compared against each other for every pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonLanguages {
    pub reference: String,
    pub candidate: String,
}

impl Default for ComparisonLanguages {
    fn default() -> Self {
        Self {
            reference: "java".to_string(),
            candidate: "python".to_string(),
        }
    }
}

impl ComparisonLanguages {
    pub fn new(reference: impl Into<String>, candidate: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            candidate: candidate.into(),
        }
    }
}

/// The result of a two-sample significance test on energy measurements.
#[derive(Debug, Clone, Serialize)]
pub struct TestResult {
    /// Two-tailed p-value, or `None` when there is not enough data.
    pub p_value: Option<f64>,
    /// The t statistic, when defined.
    pub t_statistic: Option<f64>,
    /// Degrees of freedom used for the p-value, when defined.
    pub degrees_of_freedom: Option<f64>,
    /// Whether the difference is statistically significant at the configured confidence level.
    pub statistically_significant: bool,
    /// Percent change of the candidate mean relative to the reference mean
    /// (negative = candidate uses less energy).
    pub effect_size: f64,
    /// The confidence level used for the test (e.g., 0.95 for 95% confidence).
    pub confidence_level: f64,
    /// The lower-energy side if statistically significant, None otherwise.
    pub winner: Option<Side>,
    pub reference_mean: f64,
    pub candidate_mean: f64,
    pub reference_count: usize,
    pub candidate_count: usize,
}

/// Trait for statistical tests that compare two sets of measurements.
pub trait StatisticalTest: Send + Sync {
    /// Analyze reference and candidate measurements and return a statistical test result.
    fn analyze(&self, reference: &[f64], candidate: &[f64]) -> TestResult;
}

mod anova;
mod correlation;
mod difference;
mod ttest;

pub use anova::{two_way_anova, AnovaRow, AnovaTable, AnovaTerm};
pub use correlation::pearson;
pub use difference::{
    compare_languages, percent_difference, DifferenceOutcome, NotApplicable, PatternDifference,
};
pub use ttest::WelchTTest;
