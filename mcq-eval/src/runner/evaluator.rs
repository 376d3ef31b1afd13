//! Sequential evaluation of JSONL result files

use std::io::BufRead;
use std::path::{Path, PathBuf};

use crate::analysis::{AccuracySummary, Aggregate, Scorer, Verdict};
use crate::config::{Config, MalformedPolicy};
use crate::extraction::{preview, MatchRule};
use crate::records::{discover_jsonl_files, open_jsonl, JsonlRecords, LineOutcome, LoadError, Record};

/// One scored line, with the diagnostics a report needs
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredItem {
    /// 1-based physical line number
    pub line: usize,
    pub verdict: Verdict,
    pub answer_field: String,
    pub answer_preview: String,
    pub question_preview: String,
    pub rule: Option<MatchRule>,
}

/// Everything learned from one input source
#[derive(Debug, Clone)]
pub struct FileEvaluation {
    pub source: PathBuf,
    pub items: Vec<ScoredItem>,
    pub aggregate: Aggregate,
}

impl FileEvaluation {
    pub fn summary(&self) -> AccuracySummary {
        self.aggregate.summary(self.source.display().to_string())
    }

    /// Items where both letters were recovered but disagree, in input order
    pub fn mismatches(&self) -> impl Iterator<Item = &ScoredItem> {
        self.items.iter().filter(|item| item.verdict.is_mismatch())
    }
}

/// Scores records one at a time and keeps the running aggregate
#[derive(Debug, Clone)]
pub struct Evaluator {
    config: Config,
    scorer: Scorer,
}

impl Evaluator {
    pub fn new(config: Config) -> Result<Self, regex::Error> {
        let scorer = Scorer::new(&config)?;
        Ok(Self { config, scorer })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    /// Score a single record
    pub fn score_record(&self, line: usize, record: &Record) -> ScoredItem {
        let width = self.config.report.preview_width;
        let scored = self.scorer.score(record);

        tracing::trace!(
            line,
            gold = ?scored.verdict.gold(),
            pred = ?scored.verdict.predicted(),
            field = %scored.answer.field,
            rule = ?scored.rule,
            "scored record"
        );

        ScoredItem {
            line,
            verdict: scored.verdict,
            answer_preview: preview(&scored.answer.text, width),
            answer_field: scored.answer.field,
            question_preview: preview(self.scorer.selector().question_text(record), width),
            rule: scored.rule,
        }
    }

    /// Score every record of a JSONL stream.
    ///
    /// Malformed lines are counted and skipped, or abort the evaluation,
    /// depending on the configured policy.
    pub fn evaluate_reader<R: BufRead>(
        &self,
        source: impl Into<PathBuf>,
        reader: R,
    ) -> Result<FileEvaluation, LoadError> {
        self.evaluate_lines(source.into(), JsonlRecords::new(reader))
    }

    /// Score a JSONL file
    pub fn evaluate_file(&self, path: impl AsRef<Path>) -> Result<FileEvaluation, LoadError> {
        let path = path.as_ref();
        tracing::debug!("Scoring {}", path.display());
        let records = open_jsonl(path)?;
        self.evaluate_lines(path.to_path_buf(), records)
    }

    /// Score every JSONL file directly inside `dir`, in file name order
    pub fn evaluate_directory(&self, dir: impl AsRef<Path>) -> Result<Vec<FileEvaluation>, LoadError> {
        let dir = dir.as_ref();
        let files = discover_jsonl_files(dir, &self.config)?;
        if files.is_empty() {
            tracing::warn!("No JSONL files found in {}", dir.display());
        }

        files.iter().map(|path| self.evaluate_file(path)).collect()
    }

    fn evaluate_lines<R: BufRead>(
        &self,
        source: PathBuf,
        records: JsonlRecords<R>,
    ) -> Result<FileEvaluation, LoadError> {
        let mut items = Vec::new();
        let mut aggregate = Aggregate::new();

        for outcome in records {
            match outcome? {
                LineOutcome::Record { line, record } => {
                    let item = self.score_record(line, &record);
                    aggregate.record(&item.verdict);
                    if record.self_reported_correct() {
                        aggregate.record_self_reported();
                    }
                    items.push(item);
                }
                LineOutcome::Malformed { line, error } => match self.config.scoring.on_malformed {
                    MalformedPolicy::Abort => return Err(LoadError::Malformed { line, source: error }),
                    MalformedPolicy::Skip => {
                        tracing::warn!("{}:{}: skipping malformed line: {}", source.display(), line, error);
                        aggregate.record_malformed();
                    }
                },
            }
        }

        tracing::debug!(
            "{}: {} records, {} correct, {} malformed",
            source.display(),
            aggregate.total,
            aggregate.correct,
            aggregate.malformed
        );

        Ok(FileEvaluation {
            source,
            items,
            aggregate,
        })
    }
}
