//! Results reporting

pub mod csv_writer;
pub mod text_writer;

pub use csv_writer::CsvWriter;
pub use text_writer::{format_item_line, letter_or_placeholder, TextWriter};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::analysis::AccuracySummary;
use crate::config::ReportConfig;
use crate::runner::FileEvaluation;

/// Error type for report output
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// JSON summary export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonSummary {
    pub timestamp: String,
    pub match_mode: String,
    pub letters: String,
    pub summary: AccuracySummary,
    pub mismatches: Vec<MismatchEntry>,
}

/// A record where both letters were recovered but differ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MismatchEntry {
    pub line: usize,
    pub gold: char,
    pub pred: char,
    pub question_preview: String,
}

impl JsonSummary {
    pub fn from_evaluation(
        evaluation: &FileEvaluation,
        match_mode: impl Into<String>,
        letters: impl Into<String>,
        mismatch_limit: usize,
    ) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            match_mode: match_mode.into(),
            letters: letters.into(),
            summary: evaluation.summary(),
            mismatches: mismatch_entries(evaluation, mismatch_limit),
        }
    }

    /// Write to JSON file
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), ReportError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// The first `limit` mismatches of an evaluation
pub fn mismatch_entries(evaluation: &FileEvaluation, limit: usize) -> Vec<MismatchEntry> {
    evaluation
        .mismatches()
        .take(limit)
        .filter_map(|item| {
            Some(MismatchEntry {
                line: item.line,
                gold: item.verdict.gold()?,
                pred: item.verdict.predicted()?,
                question_preview: item.question_preview.clone(),
            })
        })
        .collect()
}

/// Output locations for the detailed report of one input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub csv: PathBuf,
    pub text: PathBuf,
    pub json: PathBuf,
}

impl ReportPaths {
    /// `<stem>_scored.csv`, `<stem>_per_item_report.txt` and `<stem>_summary.json`,
    /// placed in `output_dir` or next to the input
    pub fn for_input(input: &Path, output_dir: Option<&Path>) -> Self {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "results".to_string());
        let dir = output_dir
            .map(Path::to_path_buf)
            .or_else(|| input.parent().map(Path::to_path_buf))
            .unwrap_or_default();

        Self {
            csv: dir.join(format!("{}_scored.csv", stem)),
            text: dir.join(format!("{}_per_item_report.txt", stem)),
            json: dir.join(format!("{}_summary.json", stem)),
        }
    }
}

/// Write the enabled report files; returns the paths that were written.
///
/// Each file is first written next to its target with a `.partial` suffix and
/// only renamed into place once every enabled report was written. On failure
/// the partial files are removed and existing reports are left untouched.
pub fn write_reports(
    evaluation: &FileEvaluation,
    summary: &JsonSummary,
    paths: &ReportPaths,
    config: &ReportConfig,
) -> Result<Vec<PathBuf>, ReportError> {
    if let Some(parent) = paths.csv.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut staged: Vec<(PathBuf, PathBuf)> = Vec::new();
    if let Err(e) = stage_reports(evaluation, summary, paths, config, &mut staged) {
        discard_partials(&staged);
        return Err(e);
    }

    for (partial, target) in &staged {
        if let Err(e) = std::fs::rename(partial, target) {
            discard_partials(&staged);
            return Err(e.into());
        }
    }

    Ok(staged.into_iter().map(|(_, target)| target).collect())
}

fn stage_reports(
    evaluation: &FileEvaluation,
    summary: &JsonSummary,
    paths: &ReportPaths,
    config: &ReportConfig,
    staged: &mut Vec<(PathBuf, PathBuf)>,
) -> Result<(), ReportError> {
    if config.write_csv {
        let partial = partial_path(&paths.csv);
        staged.push((partial.clone(), paths.csv.clone()));
        CsvWriter::write_items(&partial, &evaluation.items)?;
    }
    if config.write_text {
        let partial = partial_path(&paths.text);
        staged.push((partial.clone(), paths.text.clone()));
        TextWriter::write_items(&partial, &evaluation.items)?;
    }
    if config.write_json {
        let partial = partial_path(&paths.json);
        staged.push((partial.clone(), paths.json.clone()));
        summary.write_to_file(&partial)?;
    }
    Ok(())
}

fn partial_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_os_string();
    name.push(".partial");
    PathBuf::from(name)
}

fn discard_partials(staged: &[(PathBuf, PathBuf)]) {
    for (partial, _) in staged {
        match std::fs::remove_file(partial) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Could not remove {}: {}", partial.display(), e),
        }
    }
}

/// Aggregate-mode console report for one source
pub fn print_console_report(summary: &AccuracySummary) {
    println!("File: {}", summary.source);
    println!("Total: {}", summary.total);
    println!("Correct: {}", summary.correct);
    println!("Accuracy: {}", summary.accuracy_label());
}

/// Detailed console report: optional per-item lines, full summary, first mismatches
pub fn print_detailed_report(evaluation: &FileEvaluation, mismatch_limit: usize, show_items: bool) {
    if show_items {
        println!("Per-item results:");
        for item in &evaluation.items {
            println!("{}", format_item_line(item));
        }
        println!();
    }

    let summary = evaluation.summary();
    print_console_report(&summary);
    println!("Unparsable gold labels: {}", summary.unparsable_gold);
    println!("Unparsable predictions: {}", summary.unparsable_pred);
    if summary.malformed > 0 {
        println!("Malformed lines skipped: {}", summary.malformed);
    }
    if summary.self_reported_correct > 0 {
        println!("Self-reported correct: {}", summary.self_reported_correct);
    }

    let mismatches = mismatch_entries(evaluation, mismatch_limit);
    if !mismatches.is_empty() {
        println!("\nFirst {} mismatches (gold vs pred):", mismatch_limit);
        for m in &mismatches {
            let question: String = m.question_preview.chars().take(120).collect();
            println!("  line {}: gold={} pred={} | {}", m.line, m.gold, m.pred, question);
        }
    }
}
