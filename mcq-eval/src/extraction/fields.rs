//! Candidate answer field selection

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::ExtractionConfig;
use crate::records::Record;

/// The text chosen as the model's answer, with where it came from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CandidateAnswer {
    /// Dotted field path such as `final_answer` or `result.output`; empty when nothing matched
    pub field: String,
    pub text: String,
}

impl CandidateAnswer {
    pub fn is_empty(&self) -> bool {
        self.field.is_empty()
    }
}

/// Picks the answer field out of differently shaped result records.
///
/// Field order encodes format priority: the earliest listed field that holds
/// a non-blank string always wins.
#[derive(Debug, Clone)]
pub struct FieldSelector {
    answer_fields: Vec<String>,
    nested_containers: Vec<String>,
    question_fields: Vec<String>,
}

impl FieldSelector {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            answer_fields: config.answer_fields.clone(),
            nested_containers: config.nested_containers.clone(),
            question_fields: config.question_fields.clone(),
        }
    }

    /// Top-level fields first, then the same list inside each nested container
    pub fn candidate_answer(&self, record: &Record) -> CandidateAnswer {
        if let Some((field, text)) = first_text_field(record.fields(), &self.answer_fields) {
            return CandidateAnswer {
                field: field.to_string(),
                text: text.to_string(),
            };
        }

        for container in &self.nested_containers {
            let Some(Value::Object(inner)) = record.get(container) else {
                continue;
            };
            if let Some((field, text)) = first_text_field(inner, &self.answer_fields) {
                return CandidateAnswer {
                    field: format!("{}.{}", container, field),
                    text: text.to_string(),
                };
            }
        }

        CandidateAnswer::default()
    }

    /// Raw question text for diagnostics, empty when no preview field is present
    pub fn question_text<'r>(&self, record: &'r Record) -> &'r str {
        first_text_field(record.fields(), &self.question_fields)
            .map(|(_, text)| text)
            .unwrap_or("")
    }
}

impl Default for FieldSelector {
    fn default() -> Self {
        Self::new(&ExtractionConfig::default())
    }
}

fn first_text_field<'a, 'm>(
    fields: &'m Map<String, Value>,
    names: &'a [String],
) -> Option<(&'a str, &'m str)> {
    names.iter().find_map(|name| match fields.get(name) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some((name.as_str(), s.as_str())),
        _ => None,
    })
}
