//! Verdicts and accuracy aggregation

pub mod metrics;
pub mod scoring;

pub use metrics::{AccuracySummary, Aggregate};
pub use scoring::{substring_match, MatchMode, RecordScore, Scorer, Verdict};
