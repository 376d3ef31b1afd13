//! Per-record verdicts

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::extraction::{norm, CandidateAnswer, FieldSelector, LetterExtractor, MatchRule};
use crate::records::Record;

/// How a candidate answer is compared with the gold letter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Extract a single letter from the answer and compare it with the gold letter
    #[default]
    Extract,
    /// Accept the answer when its normalized text is the gold letter or
    /// contains the parenthesized gold letter; otherwise fall back to extraction
    Substring,
}

impl MatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::Extract => "extract",
            MatchMode::Substring => "substring",
        }
    }
}

impl std::fmt::Display for MatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "extract" | "token" | "letter" => Ok(MatchMode::Extract),
            "substring" | "contains" => Ok(MatchMode::Substring),
            _ => Err(format!("Unknown match mode: {}", s)),
        }
    }
}

/// Outcome for one record.
///
/// `correct` is derived from the two letters and can never be true while
/// either of them is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Verdict {
    gold: Option<char>,
    predicted: Option<char>,
    correct: bool,
}

impl Verdict {
    pub fn new(gold: Option<char>, predicted: Option<char>) -> Self {
        let correct = matches!((gold, predicted), (Some(g), Some(p)) if g == p);
        Self {
            gold,
            predicted,
            correct,
        }
    }

    pub fn gold(&self) -> Option<char> {
        self.gold
    }

    pub fn predicted(&self) -> Option<char> {
        self.predicted
    }

    pub fn is_correct(&self) -> bool {
        self.correct
    }

    /// Both letters recovered but different
    pub fn is_mismatch(&self) -> bool {
        self.gold.is_some() && self.predicted.is_some() && !self.correct
    }
}

/// A verdict together with the answer text it was based on
#[derive(Debug, Clone, PartialEq)]
pub struct RecordScore {
    pub verdict: Verdict,
    pub answer: CandidateAnswer,
    /// Rule that produced the predicted letter, `None` when it came from the
    /// substring check or nothing matched
    pub rule: Option<MatchRule>,
}

/// Turns records into verdicts
#[derive(Debug, Clone)]
pub struct Scorer {
    extractor: LetterExtractor,
    selector: FieldSelector,
    mode: MatchMode,
}

impl Scorer {
    pub fn new(config: &Config) -> Result<Self, regex::Error> {
        Ok(Self {
            extractor: LetterExtractor::new(&config.extraction)?,
            selector: FieldSelector::new(&config.extraction),
            mode: config.scoring.mode,
        })
    }

    pub fn extractor(&self) -> &LetterExtractor {
        &self.extractor
    }

    pub fn selector(&self) -> &FieldSelector {
        &self.selector
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Score one record
    pub fn score(&self, record: &Record) -> RecordScore {
        let gold = self.extractor.extract_target_letter(record);
        let answer = self.selector.candidate_answer(record);
        let (verdict, rule) = self.judge(gold, &answer.text);

        RecordScore {
            verdict,
            answer,
            rule,
        }
    }

    /// Compare answer text with an already extracted gold letter
    pub fn judge(&self, gold: Option<char>, answer_text: &str) -> (Verdict, Option<MatchRule>) {
        if self.mode == MatchMode::Substring {
            if let Some(g) = gold {
                if substring_match(g, answer_text) {
                    return (Verdict::new(gold, Some(g)), None);
                }
            }
        }

        match self.extractor.explain_letter(answer_text) {
            Some((letter, rule)) => (Verdict::new(gold, Some(letter)), Some(rule)),
            None => (Verdict::new(gold, None), None),
        }
    }
}

/// Normalized answer equals the bare gold letter, or contains `(gold)`
pub fn substring_match(gold: char, answer_text: &str) -> bool {
    let answer = norm(answer_text);
    if answer.is_empty() {
        return false;
    }
    answer == norm(&gold.to_string()) || answer.contains(&norm(&format!("({})", gold)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scorer(mode: MatchMode) -> Scorer {
        let mut config = Config::default();
        config.scoring.mode = mode;
        Scorer::new(&config).unwrap()
    }

    #[test]
    fn test_verdict_invariant() {
        assert!(Verdict::new(Some('A'), Some('A')).is_correct());
        assert!(!Verdict::new(Some('A'), Some('B')).is_correct());
        assert!(!Verdict::new(None, Some('A')).is_correct());
        assert!(!Verdict::new(Some('A'), None).is_correct());
        assert!(!Verdict::new(None, None).is_correct());

        assert!(Verdict::new(Some('A'), Some('B')).is_mismatch());
        assert!(!Verdict::new(None, Some('B')).is_mismatch());
    }

    #[test]
    fn test_score_extract_mode() {
        let s = scorer(MatchMode::Extract);
        let record = Record::from(json!({
            "target": "(C)",
            "final_answer": "Between (A) and (C), <answer>(C)</answer>"
        }));

        let scored = s.score(&record);
        assert!(scored.verdict.is_correct());
        assert_eq!(scored.verdict.gold(), Some('C'));
        assert_eq!(scored.answer.field, "final_answer");
        assert_eq!(scored.rule, Some(MatchRule::AnswerSpan));
    }

    #[test]
    fn test_score_missing_everything() {
        let s = scorer(MatchMode::Extract);
        let scored = s.score(&Record::from(json!({"unrelated": 1})));

        assert_eq!(scored.verdict, Verdict::new(None, None));
        assert!(scored.answer.is_empty());
        assert_eq!(scored.rule, None);
    }

    #[test]
    fn test_substring_match() {
        assert!(substring_match('C', "( c )"));
        assert!(substring_match('C', " c "));
        assert!(substring_match('B', "The answer is (B) because"));
        assert!(!substring_match('B', "B because"));
        assert!(!substring_match('B', ""));
    }

    #[test]
    fn test_substring_mode_accepts_lowercase() {
        let extract = scorer(MatchMode::Extract);
        let substring = scorer(MatchMode::Substring);

        let (verdict, _) = extract.judge(Some('C'), "my answer: (c)");
        assert!(!verdict.is_correct());
        assert_eq!(verdict.predicted(), None);

        let (verdict, rule) = substring.judge(Some('C'), "my answer: (c)");
        assert!(verdict.is_correct());
        assert_eq!(verdict.predicted(), Some('C'));
        assert_eq!(rule, None);
    }

    #[test]
    fn test_substring_mode_falls_back_to_extraction() {
        let s = scorer(MatchMode::Substring);

        let (verdict, rule) = s.judge(Some('A'), "I pick (D)");
        assert!(!verdict.is_correct());
        assert_eq!(verdict.predicted(), Some('D'));
        assert_eq!(rule, Some(MatchRule::Parenthesized));

        // No gold letter means nothing to look for
        let (verdict, _) = s.judge(None, "(A)");
        assert!(!verdict.is_correct());
        assert_eq!(verdict.predicted(), Some('A'));
    }

    #[test]
    fn test_match_mode_parse() {
        assert_eq!("extract".parse::<MatchMode>().unwrap(), MatchMode::Extract);
        assert_eq!("Substring".parse::<MatchMode>().unwrap(), MatchMode::Substring);
        assert!("fuzzy".parse::<MatchMode>().is_err());
        assert_eq!(MatchMode::Substring.to_string(), "substring");
    }
}
