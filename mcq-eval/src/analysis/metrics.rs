//! Accuracy aggregation

use serde::{Deserialize, Serialize};

use super::scoring::Verdict;

/// Running counts over a stream of verdicts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregate {
    pub total: usize,
    pub correct: usize,
    /// Records whose gold letter could not be recovered
    pub unparsable_gold: usize,
    /// Records whose predicted letter could not be recovered
    pub unparsable_pred: usize,
    /// Lines skipped because they were not valid JSON; not part of `total`
    pub malformed: usize,
    /// Records carrying `"is_correct": true` from the generating harness
    pub self_reported_correct: usize,
}

impl Aggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold verdicts into a fresh aggregate
    pub fn from_verdicts<'a>(verdicts: impl IntoIterator<Item = &'a Verdict>) -> Self {
        let mut aggregate = Self::new();
        for verdict in verdicts {
            aggregate.record(verdict);
        }
        aggregate
    }

    pub fn record(&mut self, verdict: &Verdict) {
        self.total += 1;
        if verdict.is_correct() {
            self.correct += 1;
        }
        if verdict.gold().is_none() {
            self.unparsable_gold += 1;
        }
        if verdict.predicted().is_none() {
            self.unparsable_pred += 1;
        }
    }

    pub fn record_malformed(&mut self) {
        self.malformed += 1;
    }

    pub fn record_self_reported(&mut self) {
        self.self_reported_correct += 1;
    }

    /// Add another aggregate's counts to this one
    pub fn merge(&mut self, other: &Aggregate) {
        self.total += other.total;
        self.correct += other.correct;
        self.unparsable_gold += other.unparsable_gold;
        self.unparsable_pred += other.unparsable_pred;
        self.malformed += other.malformed;
        self.self_reported_correct += other.self_reported_correct;
    }

    /// `correct / total`, or 0.0 for an empty aggregate
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }

    pub fn accuracy_percent(&self) -> f64 {
        self.accuracy() * 100.0
    }

    pub fn summary(&self, source: impl Into<String>) -> AccuracySummary {
        AccuracySummary {
            source: source.into(),
            total: self.total,
            correct: self.correct,
            accuracy: self.accuracy(),
            unparsable_gold: self.unparsable_gold,
            unparsable_pred: self.unparsable_pred,
            malformed: self.malformed,
            self_reported_correct: self.self_reported_correct,
        }
    }
}

/// Serializable accuracy summary for one source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracySummary {
    pub source: String,
    pub total: usize,
    pub correct: usize,
    pub accuracy: f64,
    pub unparsable_gold: usize,
    pub unparsable_pred: usize,
    pub malformed: usize,
    pub self_reported_correct: usize,
}

impl AccuracySummary {
    /// Accuracy as a percentage with two decimals, e.g. `33.33%`
    pub fn accuracy_label(&self) -> String {
        format!("{:.2}%", self.accuracy * 100.0)
    }
}
