//! Multiple-choice answer scoring for JSONL result files
//!
//! Each line of a result file is a JSON record holding a gold `target` such as
//! `"(C)"` and the model's free-form output in one of several fields. This
//! crate recovers an option letter from both sides, compares them, and
//! aggregates accuracy along with counts of records whose letters could not
//! be recovered.
//!
//! # Features
//!
//! - Prioritized letter extraction: `<answer>` span, then `(X)`, then a bare `X`
//! - Configurable letter set, candidate fields and nested containers
//! - Strict letter matching or a looser substring mode
//! - Per-file summaries, batch scoring of directories, CSV and text reports
//!
//! # Example
//!
//! ```
//! use mcq_eval::{config::Config, runner::Evaluator};
//! use std::io::Cursor;
//!
//! let input = r#"{"target": "(B)", "final_answer": "<answer>(B)</answer> not (A)"}
//! {"target": "(C)", "output": "D"}
//! "#;
//!
//! let evaluator = Evaluator::new(Config::default()).unwrap();
//! let evaluation = evaluator.evaluate_reader("inline.jsonl", Cursor::new(input)).unwrap();
//!
//! assert_eq!(evaluation.aggregate.total, 2);
//! assert_eq!(evaluation.aggregate.correct, 1);
//! assert_eq!(evaluation.summary().accuracy_label(), "50.00%");
//! ```

pub mod analysis;
pub mod config;
pub mod extraction;
pub mod records;
pub mod reporting;
pub mod runner;

pub use config::{Config, LetterSet, MalformedPolicy};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::analysis::{AccuracySummary, Aggregate, MatchMode, RecordScore, Scorer, Verdict};
    pub use crate::config::{Config, ExtractionConfig, LetterSet, MalformedPolicy, ReportConfig, ScoringConfig};
    pub use crate::extraction::{norm, CandidateAnswer, FieldSelector, LetterExtractor, MatchRule};
    pub use crate::records::{JsonlRecords, LineError, LineOutcome, LoadError, Record};
    pub use crate::reporting::{JsonSummary, ReportError, ReportPaths};
    pub use crate::runner::{Evaluator, FileEvaluation, ScoredItem};
}
