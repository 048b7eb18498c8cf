//! Inner join of power averages with execution records.

use std::collections::{HashMap, HashSet};

use pattern_energy_core::{EnergyModel, ExecutionRecord, MergedRecord, PowerAverage};

/// Result of joining the two sources on `(pattern, language)`.
#[derive(Debug, Clone, Default)]
pub struct MergeResult {
    /// One row per execution record that found a power average, in
    /// execution-record order.
    pub merged: Vec<MergedRecord>,
    /// Keys with execution records but no telemetry.
    pub execution_only: Vec<(String, String)>,
    /// Keys with telemetry but no execution records.
    pub power_only: Vec<(String, String)>,
}

/// Join `power` and `executions` on exact, case-sensitive `(pattern, language)`
/// equality and derive the energy columns.
///
/// Unmatched keys on either side are dropped from `merged` and listed in the
/// result. If `power` repeats a key, its first entry is used.
pub fn merge(
    power: &[PowerAverage],
    executions: &[ExecutionRecord],
    model: &EnergyModel,
) -> MergeResult {
    let mut by_key: HashMap<(&str, &str), &PowerAverage> = HashMap::new();
    for average in power {
        by_key.entry(average.key()).or_insert(average);
    }

    let mut result = MergeResult::default();
    let mut matched: HashSet<(&str, &str)> = HashSet::new();
    let mut missing: HashSet<(&str, &str)> = HashSet::new();

    for execution in executions {
        match by_key.get(&execution.key()) {
            Some(average) => {
                matched.insert(execution.key());
                result.merged.push(model.derive(average, execution));
            }
            None => {
                if missing.insert(execution.key()) {
                    let (pattern, language) = execution.key();
                    result
                        .execution_only
                        .push((pattern.to_string(), language.to_string()));
                }
            }
        }
    }

    let mut reported: HashSet<(&str, &str)> = HashSet::new();
    result.power_only = power
        .iter()
        .map(PowerAverage::key)
        .filter(|key| !matched.contains(key) && reported.insert(*key))
        .map(|(pattern, language)| (pattern.to_string(), language.to_string()))
        .collect();

    result
}
