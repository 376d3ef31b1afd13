//! Plain-text per-item report

use std::io::Write;
use std::path::Path;

use crate::runner::ScoredItem;

/// Writes one line per scored item
pub struct TextWriter;

impl TextWriter {
    /// Write the per-item report to a file
    pub fn write_items(path: impl AsRef<Path>, items: &[ScoredItem]) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        let mut out = std::io::BufWriter::new(file);
        Self::write_to(&mut out, items)?;
        out.flush()
    }

    /// Write the per-item report to any writer
    pub fn write_to<W: Write>(out: &mut W, items: &[ScoredItem]) -> std::io::Result<()> {
        for item in items {
            writeln!(out, "{}", format_item_line(item))?;
        }
        Ok(())
    }
}

/// `line   3 | gold=B | pred=? | correct=0 | question preview`
pub fn format_item_line(item: &ScoredItem) -> String {
    format!(
        "line {:>3} | gold={} | pred={} | correct={} | {}",
        item.line,
        letter_or_placeholder(item.verdict.gold()),
        letter_or_placeholder(item.verdict.predicted()),
        if item.verdict.is_correct() { 1 } else { 0 },
        item.question_preview
    )
}

/// The letter itself, or `?` when it could not be recovered
pub fn letter_or_placeholder(letter: Option<char>) -> char {
    letter.unwrap_or('?')
}
