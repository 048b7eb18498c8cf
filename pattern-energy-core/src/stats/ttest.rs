use statrs::distribution::{ContinuousCDF, StudentsT};

use super::{Side, StatisticalTest, TestResult};

/// Welch's t-test for comparing two independent samples with potentially unequal variances.
///
/// Used to compare the reference and candidate languages' energy samples, pooled
/// over patterns. Lower energy is better.
#[derive(Debug, Clone)]
pub struct WelchTTest {
    /// The confidence level for determining statistical significance (default: 0.95).
    pub confidence_level: f64,
}

impl Default for WelchTTest {
    fn default() -> Self {
        Self {
            confidence_level: 0.95,
        }
    }
}

impl WelchTTest {
    /// Create a new Welch's t-test with the specified confidence level.
    ///
    /// # Panics
    /// Panics if confidence_level is not in the range (0, 1).
    pub fn new(confidence_level: f64) -> Self {
        assert!(
            confidence_level > 0.0 && confidence_level < 1.0,
            "confidence_level must be between 0 and 1 (exclusive)"
        );
        Self { confidence_level }
    }

    fn mean(samples: &[f64]) -> f64 {
        if samples.is_empty() {
            return f64::NAN;
        }
        samples.iter().sum::<f64>() / samples.len() as f64
    }

    /// Sample variance with Bessel's correction (n-1 denominator).
    fn variance(samples: &[f64], mean: f64) -> f64 {
        if samples.len() < 2 {
            return 0.0;
        }
        let sum_sq_diff: f64 = samples.iter().map(|x| (x - mean).powi(2)).sum();
        sum_sq_diff / (samples.len() - 1) as f64
    }

    /// Calculate degrees of freedom using the Welch-Satterthwaite equation.
    ///
    /// df = (var1/n1 + var2/n2)^2 / ((var1/n1)^2/(n1-1) + (var2/n2)^2/(n2-1))
    fn welch_satterthwaite_df(var1: f64, n1: usize, var2: f64, n2: usize) -> f64 {
        let s1 = var1 / n1 as f64;
        let s2 = var2 / n2 as f64;
        let numerator = (s1 + s2).powi(2);
        let denominator = (s1.powi(2) / (n1 - 1) as f64) + (s2.powi(2) / (n2 - 1) as f64);

        if denominator == 0.0 {
            // Fallback to minimum df when variances are zero
            return (n1.min(n2) - 1) as f64;
        }

        numerator / denominator
    }

    fn effect_size(reference_mean: f64, candidate_mean: f64) -> f64 {
        if reference_mean != 0.0 && reference_mean.is_finite() && candidate_mean.is_finite() {
            ((candidate_mean - reference_mean) / reference_mean) * 100.0
        } else {
            0.0
        }
    }

    fn lower(reference_mean: f64, candidate_mean: f64) -> Option<Side> {
        if candidate_mean < reference_mean {
            Some(Side::Candidate)
        } else if reference_mean < candidate_mean {
            Some(Side::Reference)
        } else {
            None
        }
    }
}

impl StatisticalTest for WelchTTest {
    fn analyze(&self, reference: &[f64], candidate: &[f64]) -> TestResult {
        let n1 = reference.len();
        let n2 = candidate.len();

        let mean1 = Self::mean(reference);
        let mean2 = Self::mean(candidate);

        let inconclusive = TestResult {
            p_value: None,
            t_statistic: None,
            degrees_of_freedom: None,
            statistically_significant: false,
            effect_size: Self::effect_size(mean1, mean2),
            confidence_level: self.confidence_level,
            winner: None,
            reference_mean: mean1,
            candidate_mean: mean2,
            reference_count: n1,
            candidate_count: n2,
        };

        if n1 < 2 || n2 < 2 {
            return inconclusive;
        }

        let var1 = Self::variance(reference, mean1);
        let var2 = Self::variance(candidate, mean2);

        let se = (var1 / n1 as f64 + var2 / n2 as f64).sqrt();

        // Both samples constant: any difference in means is exact.
        if se == 0.0 {
            let differ = mean1 != mean2;
            return TestResult {
                p_value: Some(if differ { 0.0 } else { 1.0 }),
                statistically_significant: differ,
                winner: Self::lower(mean1, mean2),
                ..inconclusive
            };
        }

        // t = (mean1 - mean2) / sqrt(var1/n1 + var2/n2)
        let t_statistic = (mean1 - mean2) / se;
        let df = Self::welch_satterthwaite_df(var1, n1, var2, n2);

        let p_value = match StudentsT::new(0.0, 1.0, df) {
            // Two-tailed test: p = 2 * P(T > |t|)
            Ok(t_dist) => Some(2.0 * (1.0 - t_dist.cdf(t_statistic.abs()))),
            Err(_) => None,
        };

        let alpha = 1.0 - self.confidence_level;
        let statistically_significant = p_value.is_some_and(|p| p < alpha);

        let winner = if statistically_significant {
            Self::lower(mean1, mean2)
        } else {
            None
        };

        TestResult {
            p_value,
            t_statistic: Some(t_statistic),
            degrees_of_freedom: Some(df),
            statistically_significant,
            winner,
            ..inconclusive
        }
    }
}
