//! Record loading from line-delimited JSON files

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use super::Record;
use crate::config::Config;

/// Error type for record loading
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input on line {line}: {source}")]
    Malformed {
        line: usize,
        #[source]
        source: LineError,
    },

    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Not a file: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}

/// Why a single line could not be turned into a record
#[derive(Debug, thiserror::Error)]
pub enum LineError {
    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// What a single non-blank input line turned into
#[derive(Debug)]
pub enum LineOutcome {
    Record { line: usize, record: Record },
    Malformed { line: usize, error: LineError },
}

impl LineOutcome {
    /// 1-based physical line number in the source
    pub fn line(&self) -> usize {
        match self {
            LineOutcome::Record { line, .. } | LineOutcome::Malformed { line, .. } => *line,
        }
    }
}

/// Iterator over the records of a JSONL stream.
///
/// Blank lines are skipped without producing an item; line numbers still
/// count them so diagnostics point at the physical line. A line that is not
/// valid UTF-8 is reported as malformed like any other unparsable line.
pub struct JsonlRecords<R> {
    reader: R,
    buf: Vec<u8>,
    line_no: usize,
}

impl<R: BufRead> JsonlRecords<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line_no: 0,
        }
    }

    fn parse_line(bytes: Vec<u8>) -> Result<Option<Record>, LineError> {
        let text = String::from_utf8(bytes)?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        Ok(Some(Record::parse(trimmed)?))
    }
}

impl<R: BufRead> Iterator for JsonlRecords<R> {
    type Item = Result<LineOutcome, LoadError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }
            self.line_no += 1;

            let line = self.line_no;
            let outcome = match Self::parse_line(std::mem::take(&mut self.buf)) {
                Ok(None) => continue,
                Ok(Some(record)) => LineOutcome::Record { line, record },
                Err(error) => LineOutcome::Malformed { line, error },
            };
            return Some(Ok(outcome));
        }
    }
}

/// Open a JSONL file for reading.
///
/// The path must exist and be a regular file.
pub fn open_jsonl(path: impl AsRef<Path>) -> Result<JsonlRecords<BufReader<File>>, LoadError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(LoadError::NotAFile(path.to_path_buf()));
    }

    let file = File::open(path)?;
    Ok(JsonlRecords::new(BufReader::new(file)))
}

/// List the JSONL files directly inside `dir`, sorted by file name.
///
/// Subdirectories are not descended into.
pub fn discover_jsonl_files(dir: impl AsRef<Path>, config: &Config) -> Result<Vec<PathBuf>, LoadError> {
    let dir = dir.as_ref();
    if !dir.exists() {
        return Err(LoadError::NotFound(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(LoadError::NotADirectory(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                tracing::warn!("Skipping unreadable entry in {:?}: {}", dir, e);
                continue;
            }
        };

        if path.is_file() && config.is_jsonl_path(&path) {
            files.push(path);
        }
    }

    files.sort();
    tracing::debug!("Found {} JSONL files in {:?}", files.len(), dir);
    Ok(files)
}
