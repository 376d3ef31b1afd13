//! Evaluation engine

pub mod evaluator;

pub use evaluator::{Evaluator, FileEvaluation, ScoredItem};
