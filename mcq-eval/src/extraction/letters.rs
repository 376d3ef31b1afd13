//! Option-letter extraction from gold targets and model output

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::{ExtractionConfig, LetterSet};
use crate::records::Record;

use super::normalize::collapse_whitespace;

/// Which heuristic produced a letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
    /// Inside the delimited answer span
    AnswerSpan,
    /// `(X)` anywhere in the text
    Parenthesized,
    /// `X` as a standalone token
    BareToken,
    /// First capital letter of the target (opt-in)
    FirstCapital,
}

/// Compiled letter patterns for one letter set
#[derive(Debug, Clone)]
pub struct LetterExtractor {
    letters: LetterSet,
    parenthesized: Regex,
    bare: Regex,
    answer_span: Regex,
    first_capital_fallback: bool,
}

impl LetterExtractor {
    pub fn new(config: &ExtractionConfig) -> Result<Self, regex::Error> {
        let class = config.letters.char_class();
        let tag = regex::escape(&config.answer_tag);

        Ok(Self {
            letters: config.letters.clone(),
            parenthesized: Regex::new(&format!(r"\(([{}])\)", class))?,
            bare: Regex::new(&format!(r"\b([{}])\b", class))?,
            answer_span: Regex::new(&format!(r"(?is)<{tag}>\s*(.*?)\s*</{tag}>", tag = tag))?,
            first_capital_fallback: config.gold_first_capital_fallback,
        })
    }

    pub fn letters(&self) -> &LetterSet {
        &self.letters
    }

    /// Gold letter from a record's `target` field
    pub fn extract_target_letter(&self, record: &Record) -> Option<char> {
        self.gold_letter(&record.target_text())
    }

    /// Gold letter from target text: `(X)` first, then a standalone `X`,
    /// then (only if enabled) the first capital letter of the target, provided
    /// it belongs to the set.
    pub fn gold_letter(&self, target: &str) -> Option<char> {
        self.explain_gold_letter(target).map(|(letter, _)| letter)
    }

    pub fn explain_gold_letter(&self, target: &str) -> Option<(char, MatchRule)> {
        let target = target.trim();
        if target.is_empty() {
            return None;
        }

        if let Some(letter) = first_capture(&self.parenthesized, target) {
            return Some((letter, MatchRule::Parenthesized));
        }
        if let Some(letter) = first_capture(&self.bare, target) {
            return Some((letter, MatchRule::BareToken));
        }

        if self.first_capital_fallback {
            return target
                .chars()
                .find(char::is_ascii_uppercase)
                .filter(|c| self.letters.contains(*c))
                .map(|letter| (letter, MatchRule::FirstCapital));
        }

        None
    }

    /// Predicted letter from free-form model output
    pub fn extract_letter_from_text(&self, text: &str) -> Option<char> {
        self.explain_letter(text).map(|(letter, _)| letter)
    }

    /// Like [`extract_letter_from_text`](Self::extract_letter_from_text), also
    /// reporting which rule matched.
    ///
    /// The answer span is searched before the rest of the text so that
    /// distractor letters mentioned during reasoning do not win.
    pub fn explain_letter(&self, text: &str) -> Option<(char, MatchRule)> {
        if text.is_empty() {
            return None;
        }

        if let Some(inside) = self.answer_span_contents(text) {
            let inside = collapse_whitespace(inside);
            if let Some(letter) = first_capture(&self.parenthesized, &inside)
                .or_else(|| first_capture(&self.bare, &inside))
            {
                return Some((letter, MatchRule::AnswerSpan));
            }
        }

        if let Some(letter) = first_capture(&self.parenthesized, text) {
            return Some((letter, MatchRule::Parenthesized));
        }
        if let Some(letter) = first_capture(&self.bare, text) {
            return Some((letter, MatchRule::BareToken));
        }

        None
    }

    /// Trimmed contents of the first delimited answer span, if any
    pub fn answer_span_contents<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.answer_span
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

fn first_capture(re: &Regex, text: &str) -> Option<char> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().chars().next())
}
