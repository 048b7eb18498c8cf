//! Two-way analysis of variance with interaction, Type II sums of squares.
//!
//! Both factors are treated as nominal and dummy coded against their first
//! (alphabetical) level. Each term's sum of squares is the drop in residual
//! sum of squares between two nested least-squares fits:
//!
//! | term        | reduced model | full model            |
//! |-------------|---------------|-----------------------|
//! | pattern     | language      | pattern + language    |
//! | language    | pattern       | pattern + language    |
//! | interaction | p + l         | p + l + p:l           |
//!
//! Degrees of freedom are rank differences between the same fits, so empty
//! cells in an unbalanced design shrink a term's df rather than breaking the
//! fit. Terms without df (or a model without residual df) have no F or p.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, FisherSnedecor};

/// Relative norm below which a design column counts as linearly dependent.
const RANK_TOLERANCE: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnovaTerm {
    Pattern,
    Language,
    Interaction,
    Residual,
}

impl fmt::Display for AnovaTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnovaTerm::Pattern => "pattern",
            AnovaTerm::Language => "language",
            AnovaTerm::Interaction => "pattern:language",
            AnovaTerm::Residual => "Residual",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnovaRow {
    pub term: AnovaTerm,
    pub sum_sq: f64,
    pub df: usize,
    /// `None` when the term is not estimable from the data.
    pub f_statistic: Option<f64>,
    pub p_value: Option<f64>,
}

impl AnovaRow {
    pub fn is_estimable(&self) -> bool {
        self.f_statistic.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnovaTable {
    /// Pattern, language, interaction and residual, in that order.
    pub rows: Vec<AnovaRow>,
    pub observations: usize,
    pub pattern_levels: usize,
    pub language_levels: usize,
}

impl AnovaTable {
    pub fn row(&self, term: AnovaTerm) -> Option<&AnovaRow> {
        self.rows.iter().find(|row| row.term == term)
    }

    /// Effect terms that could not be estimated.
    pub fn unestimable_terms(&self) -> impl Iterator<Item = AnovaTerm> + '_ {
        self.rows
            .iter()
            .filter(|row| row.term != AnovaTerm::Residual && !row.is_estimable())
            .map(|row| row.term)
    }
}

/// Result of one least-squares fit.
#[derive(Debug, Clone, Copy)]
struct Fit {
    rss: f64,
    rank: usize,
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn subtract_projection(v: &mut [f64], q: &[f64]) {
    let p = dot(q, v);
    for (vi, qi) in v.iter_mut().zip(q) {
        *vi -= p * qi;
    }
}

/// Ordinary least squares by Gram-Schmidt with dependent columns dropped.
fn least_squares(columns: &[&[f64]], y: &[f64]) -> Fit {
    let mut basis: Vec<Vec<f64>> = Vec::with_capacity(columns.len());

    for column in columns {
        let original_norm = dot(column, column).sqrt();
        if original_norm == 0.0 {
            continue;
        }

        let mut v = column.to_vec();
        // Two passes keep the basis orthogonal to working precision.
        for _ in 0..2 {
            for q in &basis {
                subtract_projection(&mut v, q);
            }
        }

        let norm = dot(&v, &v).sqrt();
        if norm <= RANK_TOLERANCE * original_norm {
            continue;
        }
        v.iter_mut().for_each(|x| *x /= norm);
        basis.push(v);
    }

    let mut residual = y.to_vec();
    for q in &basis {
        subtract_projection(&mut residual, q);
    }

    Fit {
        rss: dot(&residual, &residual),
        rank: basis.len(),
    }
}

/// Sorted distinct levels and one dummy column per non-baseline level.
fn dummy_columns(values: &[&str]) -> (usize, Vec<Vec<f64>>) {
    let levels: BTreeSet<&str> = values.iter().copied().collect();
    let columns: Vec<Vec<f64>> = levels
        .iter()
        .skip(1)
        .map(|level| {
            values
                .iter()
                .map(|v| if v == level { 1.0 } else { 0.0 })
                .collect::<Vec<f64>>()
        })
        .collect();
    (levels.len(), columns)
}

/// Intercept followed by every column of each block.
fn design<'a>(intercept: &'a [f64], blocks: &[&'a [Vec<f64>]]) -> Vec<&'a [f64]> {
    let mut columns = vec![intercept];
    for block in blocks {
        columns.extend(block.iter().map(Vec::as_slice));
    }
    columns
}

fn f_test(
    sum_sq: f64,
    df: usize,
    residual_ms: Option<f64>,
    residual_df: usize,
) -> (Option<f64>, Option<f64>) {
    let residual_ms = match residual_ms {
        Some(ms) if df > 0 => ms,
        _ => return (None, None),
    };

    let f = (sum_sq / df as f64) / residual_ms;
    let p = FisherSnedecor::new(df as f64, residual_df as f64)
        .ok()
        .map(|dist| dist.sf(f));
    (Some(f), p)
}

/// Fit `response ~ C(pattern) + C(language) + C(pattern):C(language)`.
///
/// Each observation is `(pattern, language, response)`. Never fails: terms
/// that the data cannot support come back with `df == 0` and no F or p.
pub fn two_way_anova<'a, I>(observations: I) -> AnovaTable
where
    I: IntoIterator<Item = (&'a str, &'a str, f64)>,
{
    let mut patterns = Vec::new();
    let mut languages = Vec::new();
    let mut y = Vec::new();
    for (pattern, language, response) in observations {
        patterns.push(pattern);
        languages.push(language);
        y.push(response);
    }
    let n = y.len();

    let intercept = vec![1.0; n];
    let (pattern_levels, pattern_cols) = dummy_columns(&patterns);
    let (language_levels, language_cols) = dummy_columns(&languages);
    let interaction_cols: Vec<Vec<f64>> = pattern_cols
        .iter()
        .flat_map(|p| {
            language_cols
                .iter()
                .map(move |l| p.iter().zip(l).map(|(a, b)| a * b).collect::<Vec<f64>>())
        })
        .collect();

    let (p, l, pl) = (
        pattern_cols.as_slice(),
        language_cols.as_slice(),
        interaction_cols.as_slice(),
    );

    let fit_pattern = least_squares(&design(&intercept, &[p]), &y);
    let fit_language = least_squares(&design(&intercept, &[l]), &y);
    let fit_additive = least_squares(&design(&intercept, &[p, l]), &y);
    let fit_full = least_squares(&design(&intercept, &[p, l, pl]), &y);

    let residual_df = n.saturating_sub(fit_full.rank);
    let residual_ss = fit_full.rss;
    let residual_ms = if residual_df > 0 && residual_ss > 0.0 {
        Some(residual_ss / residual_df as f64)
    } else {
        None
    };

    let effect = |term: AnovaTerm, reduced: Fit, full: Fit| -> AnovaRow {
        let df = full.rank.saturating_sub(reduced.rank);
        let sum_sq = if df > 0 {
            (reduced.rss - full.rss).max(0.0)
        } else {
            0.0
        };
        let (f_statistic, p_value) = f_test(sum_sq, df, residual_ms, residual_df);
        AnovaRow {
            term,
            sum_sq,
            df,
            f_statistic,
            p_value,
        }
    };

    let rows = vec![
        effect(AnovaTerm::Pattern, fit_language, fit_additive),
        effect(AnovaTerm::Language, fit_pattern, fit_additive),
        effect(AnovaTerm::Interaction, fit_additive, fit_full),
        AnovaRow {
            term: AnovaTerm::Residual,
            sum_sq: residual_ss,
            df: residual_df,
            f_statistic: None,
            p_value: None,
        },
    ];

    AnovaTable {
        rows,
        observations: n,
        pattern_levels,
        language_levels,
    }
}
