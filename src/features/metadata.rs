//! Structural and linguistic metadata features.
//!
//! Exactly twelve named scalar features per email, independent of the
//! learned vocabulary. Keyword sets come from configuration so tests and
//! deployments can swap them without touching the extractor.

use lazy_static::lazy_static;
use regex::Regex;

use crate::config::KeywordConfig;
use crate::models::EmailRecord;
use crate::text::normalize;

/// Width of the metadata feature block.
pub const METADATA_WIDTH: usize = 12;

/// Metadata feature names in column order. The order is part of the model
/// contract: training and inference both append these columns after the
/// text block in exactly this sequence.
pub const METADATA_FEATURE_NAMES: [&str; METADATA_WIDTH] = [
    "email_length",
    "subject_length",
    "word_count",
    "num_recipients",
    "has_cc",
    "has_attachment",
    "is_reply",
    "has_urgency_words",
    "has_action_words",
    "has_time_indicators",
    "is_formal",
    "is_casual",
];

lazy_static! {
    /// English contractions mark informal register.
    static ref CONTRACTION_RE: Regex = Regex::new(r"[a-z]+'(?:t|s|re|ve|ll|d|m)\b")
        .expect("Failed to compile contraction pattern");
}

/// Computes the fixed metadata feature block for an email.
#[derive(Debug, Clone)]
pub struct MetadataExtractor {
    keywords: KeywordConfig,
}

impl MetadataExtractor {
    pub fn new(keywords: KeywordConfig) -> Self {
        Self { keywords }
    }

    /// Compute the twelve features for one record, in
    /// [`METADATA_FEATURE_NAMES`] order. Deterministic and side-effect-free.
    pub fn extract(&self, email: &EmailRecord) -> [f64; METADATA_WIDTH] {
        let subject = normalize(&email.subject);
        let body = normalize(&email.body);
        let combined = if subject.is_empty() {
            body.clone()
        } else if body.is_empty() {
            subject.clone()
        } else {
            format!("{} {}", subject, body)
        };

        [
            email.body.chars().count() as f64,
            email.subject.chars().count() as f64,
            body.split_whitespace().count() as f64,
            email.recipients.len() as f64,
            flag(!email.cc.is_empty()),
            flag(contains_any(&body, &self.keywords.attachment)),
            flag(starts_with_any(&subject, &self.keywords.reply_prefixes)),
            flag(contains_any(&combined, &self.keywords.urgency)),
            flag(contains_any(&combined, &self.keywords.action)),
            flag(contains_any(&combined, &self.keywords.time)),
            flag(self.is_formal(&body)),
            flag(self.is_casual(&body)),
        ]
    }

    pub fn keywords(&self) -> &KeywordConfig {
        &self.keywords
    }

    fn is_formal(&self, body: &str) -> bool {
        starts_with_any(body, &self.keywords.formal_salutations) && !CONTRACTION_RE.is_match(body)
    }

    fn is_casual(&self, body: &str) -> bool {
        CONTRACTION_RE.is_match(body) || starts_with_any(body, &self.keywords.casual_greetings)
    }
}

fn flag(condition: bool) -> f64 {
    if condition {
        1.0
    } else {
        0.0
    }
}

fn contains_any(text: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|keyword| text.contains(keyword.as_str()))
}

fn starts_with_any(text: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|prefix| text.starts_with(prefix.as_str()))
}
