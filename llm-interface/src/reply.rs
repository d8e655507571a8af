//! Tolerant parser for `LABEL: value` scorer replies.

use std::collections::HashMap;
use trendscout_core::ScoreResult;

pub const MAX_SCORE: u8 = 10;

/// Label → value map extracted from a free-text reply.
///
/// Labels are upper-cased; a later line with the same label replaces an
/// earlier one. Lines without a recognisable label are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabeledFields {
    fields: HashMap<String, String>,
}

impl LabeledFields {
    pub fn parse(text: &str) -> Self {
        let mut fields = HashMap::new();

        for line in text.lines() {
            let line = line
                .trim()
                .trim_start_matches(|c: char| matches!(c, '-' | '*' | '#' | ' '));
            let Some((label, value)) = line.split_once(':') else {
                continue;
            };
            let label = label.trim().trim_matches('*').trim();
            if label.is_empty()
                || !label
                    .chars()
                    .all(|c| c.is_ascii_alphabetic() || c == '_' || c == ' ')
            {
                continue;
            }
            if value.starts_with("//") {
                continue;
            }
            let value = value.trim().trim_start_matches('*').trim();
            fields.insert(label.to_ascii_uppercase(), value.to_string());
        }

        Self { fields }
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.fields.get(label).map(String::as_str)
    }

    /// First label present out of `labels`.
    pub fn first_of(&self, labels: &[&str]) -> Option<&str> {
        labels.iter().find_map(|label| self.get(label))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Reads the leading integer of a score value such as `9`, `[8]` or `7/10`.
/// Anything else is treated as no score.
pub fn parse_score(value: &str) -> Option<u8> {
    let digits: String = value
        .trim()
        .trim_start_matches('[')
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    let score = digits.parse::<u32>().ok()?;
    Some(score.min(MAX_SCORE as u32) as u8)
}

pub fn parse_reply(text: &str) -> ScoreResult {
    let fields = LabeledFields::parse(text);
    let text_field = |labels: &[&str]| fields.first_of(labels).unwrap_or_default().to_string();

    ScoreResult {
        score: fields.get("SCORE").and_then(parse_score).unwrap_or(0),
        rationale: text_field(&["ANALYSIS", "REASON"]),
        variations: text_field(&["VARIATIONS"]),
        target: text_field(&["TARGET"]),
        angle: text_field(&["ANGLE"]),
    }
}
