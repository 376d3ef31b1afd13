//! Scored CSV output

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::runner::ScoredItem;

use super::ReportError;

const HEADER: [&str; 7] = [
    "index",
    "gold",
    "pred",
    "correct",
    "answer_field",
    "answer_text_preview",
    "question_preview",
];

/// One CSV row; absent letters are written as empty cells
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    index: usize,
    gold: String,
    pred: String,
    correct: &'static str,
    answer_field: &'a str,
    answer_text_preview: &'a str,
    question_preview: &'a str,
}

impl<'a> From<&'a ScoredItem> for CsvRow<'a> {
    fn from(item: &'a ScoredItem) -> Self {
        Self {
            index: item.line,
            gold: item.verdict.gold().map(String::from).unwrap_or_default(),
            pred: item.verdict.predicted().map(String::from).unwrap_or_default(),
            correct: if item.verdict.is_correct() { "1" } else { "0" },
            answer_field: &item.answer_field,
            answer_text_preview: &item.answer_preview,
            question_preview: &item.question_preview,
        }
    }
}

/// Writes one row per scored item, header always included
pub struct CsvWriter;

impl CsvWriter {
    pub fn write_items(path: impl AsRef<Path>, items: &[ScoredItem]) -> Result<(), ReportError> {
        let file = std::fs::File::create(path)?;
        Self::write_to(file, items)
    }

    pub fn write_to<W: Write>(out: W, items: &[ScoredItem]) -> Result<(), ReportError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(out);

        writer.write_record(HEADER)?;
        for item in items {
            writer.serialize(CsvRow::from(item))?;
        }
        writer.flush()?;
        Ok(())
    }
}
