use std::fmt;

use serde::Serialize;

use super::ComparisonLanguages;
use crate::record::MergedRecord;

/// Signed percent difference of `candidate` relative to `reference`, rounded to 2 decimals.
pub fn percent_difference(reference: f64, candidate: f64) -> f64 {
    let diff = ((candidate - reference) / reference) * 100.0;
    (diff * 100.0).round() / 100.0
}

/// Why a pattern has no percentage difference.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotApplicable {
    /// One of the languages does not have exactly one merged row for the pattern.
    RowCount {
        reference_rows: usize,
        candidate_rows: usize,
    },
    /// The reference energy is zero, so no relative difference exists.
    ZeroReference,
}

impl fmt::Display for NotApplicable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotApplicable::RowCount {
                reference_rows,
                candidate_rows,
            } => write!(
                f,
                "{} reference / {} candidate rows",
                reference_rows, candidate_rows
            ),
            NotApplicable::ZeroReference => write!(f, "reference energy is zero"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DifferenceOutcome {
    Computed {
        reference_energy_j: f64,
        candidate_energy_j: f64,
        percent: f64,
    },
    NotApplicable { reason: NotApplicable },
}

/// Per-pattern energy comparison between the two configured languages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternDifference {
    pub pattern: String,
    pub outcome: DifferenceOutcome,
}

impl PatternDifference {
    /// The rounded percent difference, if it could be computed.
    pub fn percent(&self) -> Option<f64> {
        match self.outcome {
            DifferenceOutcome::Computed { percent, .. } => Some(percent),
            DifferenceOutcome::NotApplicable { .. } => None,
        }
    }
}

/// Compare candidate against reference energy for every pattern in `records`.
///
/// Patterns are reported in order of first appearance. A pattern only gets a
/// number when each language has exactly one row for it.
pub fn compare_languages(
    records: &[MergedRecord],
    languages: &ComparisonLanguages,
) -> Vec<PatternDifference> {
    let mut patterns: Vec<&str> = Vec::new();
    for record in records {
        if !patterns.contains(&record.pattern()) {
            patterns.push(record.pattern());
        }
    }

    patterns
        .into_iter()
        .map(|pattern| {
            let energies = |language: &str| -> Vec<f64> {
                records
                    .iter()
                    .filter(|r| r.pattern() == pattern && r.language() == language)
                    .map(MergedRecord::energy_j)
                    .collect()
            };
            let reference = energies(&languages.reference);
            let candidate = energies(&languages.candidate);

            let outcome = match (reference.as_slice(), candidate.as_slice()) {
                ([reference], [_]) if *reference == 0.0 => DifferenceOutcome::NotApplicable {
                    reason: NotApplicable::ZeroReference,
                },
                ([reference], [candidate]) => DifferenceOutcome::Computed {
                    reference_energy_j: *reference,
                    candidate_energy_j: *candidate,
                    percent: percent_difference(*reference, *candidate),
                },
                _ => DifferenceOutcome::NotApplicable {
                    reason: NotApplicable::RowCount {
                        reference_rows: reference.len(),
                        candidate_rows: candidate.len(),
                    },
                },
            };

            PatternDifference {
                pattern: pattern.to_string(),
                outcome,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{EnergyModel, ExecutionRecord, PowerAverage};

    /// One-second run, so energy equals the power value.
    fn merged(pattern: &str, language: &str, energy_j: f64) -> MergedRecord {
        let power = PowerAverage {
            pattern: pattern.to_string(),
            language: language.to_string(),
            average_power_w: energy_j,
            sample_count: 1,
        };
        let exec = ExecutionRecord::new(pattern, language, Some(100), 1000.0);
        EnergyModel::default().derive(&power, &exec)
    }

    #[test]
    fn test_percent_difference_rounds() {
        assert_eq!(percent_difference(100.0, 80.0), -20.0);
        assert_eq!(percent_difference(3.0, 4.0), 33.33);
        assert_eq!(percent_difference(3.0, 2.0), -33.33);
    }

    #[test]
    fn test_strategy_difference() {
        let records = vec![merged("strategy", "java", 100.0), merged("strategy", "python", 80.0)];
        let diffs = compare_languages(&records, &ComparisonLanguages::default());

        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].pattern, "strategy");
        assert_eq!(diffs[0].percent(), Some(-20.0));
    }

    #[test]
    fn test_missing_candidate_not_applicable() {
        let records = vec![
            merged("observer", "java", 50.0),
            merged("strategy", "java", 100.0),
            merged("strategy", "python", 150.0),
        ];
        let diffs = compare_languages(&records, &ComparisonLanguages::default());

        assert_eq!(diffs.len(), 2);
        assert_eq!(diffs[0].pattern, "observer");
        assert_eq!(diffs[0].percent(), None);
        assert_eq!(
            diffs[0].outcome,
            DifferenceOutcome::NotApplicable {
                reason: NotApplicable::RowCount {
                    reference_rows: 1,
                    candidate_rows: 0
                }
            }
        );
        assert_eq!(diffs[1].percent(), Some(50.0));
    }

    #[test]
    fn test_duplicate_rows_not_applicable() {
        let records = vec![
            merged("decorator", "java", 10.0),
            merged("decorator", "java", 12.0),
            merged("decorator", "python", 20.0),
        ];
        let diffs = compare_languages(&records, &ComparisonLanguages::default());
        assert_eq!(diffs[0].percent(), None);
    }

    #[test]
    fn test_zero_reference_not_applicable() {
        let records = vec![merged("decorator", "java", 0.0), merged("decorator", "python", 20.0)];
        let diffs = compare_languages(&records, &ComparisonLanguages::default());
        assert_eq!(
            diffs[0].outcome,
            DifferenceOutcome::NotApplicable {
                reason: NotApplicable::ZeroReference
            }
        );
    }

    #[test]
    fn test_custom_languages() {
        let records = vec![merged("observer", "rust", 40.0), merged("observer", "go", 50.0)];
        let languages = ComparisonLanguages::new("rust", "go");
        let diffs = compare_languages(&records, &languages);
        assert_eq!(diffs[0].percent(), Some(25.0));
    }
}
