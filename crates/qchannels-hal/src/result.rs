//! Measurement results returned by backends.
//!
//! A job runs a batch of circuits, so an [`ExecutionResult`] holds one
//! [`ExperimentResult`] per submitted circuit, in submission order. Each
//! experiment's [`Counts`] map bitstrings to occurrences. Character `j` of a
//! bitstring is the value of classical bit `j`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Outcome histogram of one experiment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts(BTreeMap<String, u64>);

impl Counts {
    /// Create an empty histogram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` occurrences of `bitstring`.
    pub fn insert(&mut self, bitstring: impl Into<String>, count: u64) {
        *self.0.entry(bitstring.into()).or_insert(0) += count;
    }

    /// Occurrences of `bitstring`, zero when never observed.
    pub fn get(&self, bitstring: &str) -> u64 {
        self.0.get(bitstring).copied().unwrap_or(0)
    }

    /// Total number of recorded shots.
    pub fn total_shots(&self) -> u64 {
        self.0.values().sum()
    }

    /// The most frequent outcome, ties broken by the smaller bitstring.
    pub fn most_frequent(&self) -> Option<(&str, u64)> {
        self.0
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(k, v)| (k.as_str(), *v))
    }

    /// Observed bitstrings in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of distinct outcomes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Histogram over the classical bits `clbits` only, in that order.
    ///
    /// Returns `None` if an outcome is too short to contain one of them.
    pub fn marginal(&self, clbits: &[usize]) -> Option<Counts> {
        let mut out = Counts::new();
        for (outcome, n) in &self.0 {
            let bits = outcome.as_bytes();
            let kept: Option<String> = clbits
                .iter()
                .map(|&c| bits.get(c).map(|&b| char::from(b)))
                .collect();
            out.insert(kept?, *n);
        }
        Some(out)
    }

    /// Relative frequency of each outcome.
    pub fn probabilities(&self) -> BTreeMap<String, f64> {
        let total = self.total_shots();
        if total == 0 {
            return BTreeMap::new();
        }
        self.0
            .iter()
            .map(|(k, v)| (k.clone(), *v as f64 / total as f64))
            .collect()
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for Counts {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut counts = Counts::new();
        for (bits, n) in iter {
            counts.insert(bits, n);
        }
        counts
    }
}

/// Counts of a single circuit in a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentResult {
    /// Name of the circuit that produced these counts.
    pub name: String,
    /// Outcome histogram.
    pub counts: Counts,
    /// Shots requested for the experiment.
    pub shots: u32,
}

impl ExperimentResult {
    pub fn new(name: impl Into<String>, counts: Counts, shots: u32) -> Self {
        Self {
            name: name.into(),
            counts,
            shots,
        }
    }
}

/// Result of a completed job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Per-circuit results in submission order.
    pub experiments: Vec<ExperimentResult>,
    /// Wall-clock execution time in milliseconds, when the backend reports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
}

impl ExecutionResult {
    pub fn new(experiments: Vec<ExperimentResult>) -> Self {
        Self {
            experiments,
            execution_time_ms: None,
        }
    }

    /// Set the execution time.
    pub fn with_execution_time(mut self, ms: u64) -> Self {
        self.execution_time_ms = Some(ms);
        self
    }

    /// Look up an experiment by circuit name.
    pub fn experiment(&self, name: &str) -> Option<&ExperimentResult> {
        self.experiments.iter().find(|e| e.name == name)
    }

    /// Number of experiments.
    pub fn len(&self) -> usize {
        self.experiments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.experiments.is_empty()
    }

    /// Append the experiments of a later job, keeping dispatch order.
    pub fn extend(&mut self, other: ExecutionResult) {
        self.experiments.extend(other.experiments);
        self.execution_time_ms = match (self.execution_time_ms, other.execution_time_ms) {
            (Some(a), Some(b)) => Some(a + b),
            (a, b) => a.or(b),
        };
    }
}
