//! Configuration management for the scorer
//!
//! Loads extraction, scoring and report settings from TOML files. Every field
//! carries a serde default, so a partial file only overrides what it names.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::analysis::MatchMode;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Where answer letters come from and which letters count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Option letters recognized in gold labels and predictions
    #[serde(default)]
    pub letters: LetterSet,
    /// Candidate answer fields, highest priority first
    #[serde(default = "default_answer_fields")]
    pub answer_fields: Vec<String>,
    /// Containers searched one level deep when no top-level field matches
    #[serde(default = "default_nested_containers")]
    pub nested_containers: Vec<String>,
    /// Fields used for the question preview
    #[serde(default = "default_question_fields")]
    pub question_fields: Vec<String>,
    /// Tag name of the delimited answer span, e.g. `answer` for `<answer>...</answer>`
    #[serde(default = "default_answer_tag")]
    pub answer_tag: String,
    /// Fall back to the first capital letter of the target when nothing else matches.
    /// Can pick up capitalized words in prose, so it stays off unless asked for.
    #[serde(default)]
    pub gold_first_capital_fallback: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            letters: LetterSet::default(),
            answer_fields: default_answer_fields(),
            nested_containers: default_nested_containers(),
            question_fields: default_question_fields(),
            answer_tag: default_answer_tag(),
            gold_first_capital_fallback: false,
        }
    }
}

/// How verdicts are decided and how bad input is treated
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub mode: MatchMode,
    #[serde(default)]
    pub on_malformed: MalformedPolicy,
}

/// Report output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Maximum characters in answer and question previews
    #[serde(default = "default_preview_width")]
    pub preview_width: usize,
    /// Number of mismatches listed after a detailed report
    #[serde(default = "default_mismatch_limit")]
    pub mismatch_limit: usize,
    /// File extensions picked up when scoring a directory
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default = "default_true")]
    pub write_csv: bool,
    #[serde(default = "default_true")]
    pub write_text: bool,
    #[serde(default = "default_true")]
    pub write_json: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            preview_width: default_preview_width(),
            mismatch_limit: default_mismatch_limit(),
            extensions: default_extensions(),
            write_csv: true,
            write_text: true,
            write_json: true,
        }
    }
}

/// What to do with a line that is not valid JSON
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Count the line and keep going
    #[default]
    Skip,
    /// Stop at the first malformed line
    Abort,
}

impl std::str::FromStr for MalformedPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "skip" | "continue" => Ok(MalformedPolicy::Skip),
            "abort" | "strict" => Ok(MalformedPolicy::Abort),
            _ => Err(format!("Unknown malformed-line policy: {}", s)),
        }
    }
}

// Default value functions
fn default_true() -> bool { true }
fn default_answer_tag() -> String { "answer".to_string() }
fn default_preview_width() -> usize { 200 }
fn default_mismatch_limit() -> usize { 10 }
fn default_extensions() -> Vec<String> { vec!["jsonl".to_string()] }

fn default_answer_fields() -> Vec<String> {
    [
        "final_answer",
        "model_output",
        "output",
        "response",
        "prediction",
        "generated_text",
        "answer",
        "completion",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_nested_containers() -> Vec<String> {
    ["result", "data", "meta"].iter().map(|s| s.to_string()).collect()
}

fn default_question_fields() -> Vec<String> {
    ["raw_input", "input", "question"].iter().map(|s| s.to_string()).collect()
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.as_ref().display(), e)))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load from an explicit path, or fall back to defaults when none is given.
    ///
    /// An explicit path that cannot be read is an error; there is no search
    /// through well-known locations.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                let config = Self::from_file(path)?;
                tracing::info!("Loaded configuration from {}", path.display());
                Ok(config)
            }
            None => {
                tracing::debug!("Using default configuration");
                Ok(Self::default())
            }
        }
    }

    /// Save configuration to a TOML file
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        fs::write(path, content)
            .map_err(|e| ConfigError::Io(e.to_string()))?;
        Ok(())
    }

    /// Whether `path` has one of the configured JSONL extensions
    pub fn is_jsonl_path(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.report.extensions.iter().any(|x| x.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }
}

/// Configuration errors
#[derive(Debug, Clone)]
pub enum ConfigError {
    Io(String),
    Parse(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

/// The ordered set of option letters a question can be answered with.
///
/// Always uppercase ASCII, sorted and free of duplicates. Written as a plain
/// string (`"ABCD"`) or a range (`"A-D"`, `"A-Z"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LetterSet {
    letters: Vec<char>,
}

impl LetterSet {
    /// Four-option multiple choice
    pub fn four_choice() -> Self {
        Self { letters: vec!['A', 'B', 'C', 'D'] }
    }

    /// Every uppercase ASCII letter
    pub fn alphabet() -> Self {
        Self { letters: ('A'..='Z').collect() }
    }

    pub fn contains(&self, letter: char) -> bool {
        self.letters.binary_search(&letter).is_ok()
    }

    pub fn letters(&self) -> &[char] {
        &self.letters
    }

    pub fn len(&self) -> usize {
        self.letters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    /// Body of a regex character class matching exactly these letters
    pub fn char_class(&self) -> String {
        self.letters.iter().collect()
    }
}

impl Default for LetterSet {
    fn default() -> Self {
        Self::four_choice()
    }
}

impl std::fmt::Display for LetterSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.char_class())
    }
}

impl std::str::FromStr for LetterSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != ',')
            .map(|c| c.to_ascii_uppercase())
            .collect();

        let mut letters = Vec::new();
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            if !c.is_ascii_uppercase() {
                return Err(format!("Invalid option letter '{}' in \"{}\"", c, s));
            }
            if chars.get(i + 1) == Some(&'-') {
                let end = *chars
                    .get(i + 2)
                    .ok_or_else(|| format!("Unterminated letter range in \"{}\"", s))?;
                if !end.is_ascii_uppercase() || end < c {
                    return Err(format!("Invalid letter range {}-{} in \"{}\"", c, end, s));
                }
                letters.extend(c..=end);
                i += 3;
            } else {
                letters.push(c);
                i += 1;
            }
        }

        if letters.is_empty() {
            return Err("Letter set must not be empty".to_string());
        }

        letters.sort_unstable();
        letters.dedup();
        Ok(Self { letters })
    }
}

impl TryFrom<String> for LetterSet {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LetterSet> for String {
    fn from(set: LetterSet) -> Self {
        set.char_class()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::MatchMode;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.extraction.letters, LetterSet::four_choice());
        assert_eq!(config.extraction.answer_fields[0], "final_answer");
        assert_eq!(config.extraction.answer_fields.len(), 8);
        assert_eq!(config.extraction.nested_containers, vec!["result", "data", "meta"]);
        assert!(!config.extraction.gold_first_capital_fallback);
        assert_eq!(config.scoring.mode, MatchMode::Extract);
        assert_eq!(config.scoring.on_malformed, MalformedPolicy::Skip);
        assert_eq!(config.report.preview_width, 200);
    }

    #[test]
    fn test_parse_partial_toml_config() {
        let toml = r#"
[extraction]
letters = "A-Z"
answer_fields = ["output", "final_answer"]

[scoring]
mode = "substring"
on_malformed = "abort"
"#;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.extraction.letters, LetterSet::alphabet());
        assert_eq!(config.extraction.answer_fields, vec!["output", "final_answer"]);
        // Untouched sections keep their defaults
        assert_eq!(config.extraction.answer_tag, "answer");
        assert_eq!(config.scoring.mode, MatchMode::Substring);
        assert_eq!(config.scoring.on_malformed, MalformedPolicy::Abort);
        assert_eq!(config.report.mismatch_limit, 10);
    }

    #[test]
    fn test_invalid_letters_rejected() {
        let toml = r#"
[extraction]
letters = "A1"
"#;
        assert!(matches!(Config::from_toml(toml), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mcq-eval.toml");

        let mut config = Config::default();
        config.extraction.letters = "ABCDE".parse().unwrap();
        config.report.extensions.push("ndjson".to_string());
        config.save_toml(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_or_default_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            Config::load_or_default(Some(&missing)),
            Err(ConfigError::Io(_))
        ));
        assert_eq!(Config::load_or_default(None).unwrap(), Config::default());
    }

    #[test]
    fn test_letter_set_parsing() {
        assert_eq!("abcd".parse::<LetterSet>().unwrap(), LetterSet::four_choice());
        assert_eq!("A-D".parse::<LetterSet>().unwrap(), LetterSet::four_choice());
        assert_eq!("D, C, B, A, A".parse::<LetterSet>().unwrap(), LetterSet::four_choice());
        assert_eq!("A-Z".parse::<LetterSet>().unwrap().len(), 26);
        assert_eq!("A-CE".parse::<LetterSet>().unwrap().char_class(), "ABCE");
        assert!("".parse::<LetterSet>().is_err());
        assert!("D-A".parse::<LetterSet>().is_err());
        assert!("A-".parse::<LetterSet>().is_err());
        assert!("A?".parse::<LetterSet>().is_err());
    }

    #[test]
    fn test_jsonl_extension_match() {
        let config = Config::default();
        assert!(config.is_jsonl_path(Path::new("runs/gpqa.jsonl")));
        assert!(config.is_jsonl_path(Path::new("runs/GPQA.JSONL")));
        assert!(!config.is_jsonl_path(Path::new("runs/gpqa.json")));
        assert!(!config.is_jsonl_path(Path::new("runs/jsonl")));
    }
}
