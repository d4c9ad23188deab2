use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Email priority levels
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Priority {
    High,   // needs attention now
    Medium, // normal correspondence
    Low,    // bulk, automated, promotional
}

impl Priority {
    /// All classes in label-encoding order.
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    /// Number of priority classes.
    pub const COUNT: usize = 3;

    /// Stable integer encoding used as the classifier target.
    pub fn as_index(self) -> usize {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }

    /// Inverse of [`Priority::as_index`].
    pub fn from_index(index: usize) -> Option<Priority> {
        Priority::ALL.get(index).copied()
    }
}

/// A structured email record, the input unit of the pipeline.
///
/// Subject and body are always defined; sources with missing values decode
/// them as empty strings, never null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmailRecord {
    /// Subject line.
    #[serde(default)]
    pub subject: String,

    /// Body text.
    #[serde(default)]
    pub body: String,

    /// Sender address, when the source provides one.
    #[serde(default)]
    pub sender: Option<String>,

    /// Ordered recipient addresses.
    #[serde(default)]
    pub recipients: Vec<String>,

    /// Ordered CC addresses.
    #[serde(default)]
    pub cc: Vec<String>,

    /// Send time, when known.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl EmailRecord {
    /// Create a record from subject and body.
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            ..Default::default()
        }
    }

    /// Set the sender address.
    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    /// Set the recipient list.
    pub fn with_recipients(mut self, recipients: Vec<String>) -> Self {
        self.recipients = recipients;
        self
    }

    /// Set the CC list.
    pub fn with_cc(mut self, cc: Vec<String>) -> Self {
        self.cc = cc;
        self
    }

    /// Set the send time.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// An email paired with its priority label. Consumed once by training,
/// never mutated afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledExample {
    /// The email record.
    pub email: EmailRecord,

    /// Its priority label.
    pub priority: Priority,
}

impl LabeledExample {
    pub fn new(email: EmailRecord, priority: Priority) -> Self {
        Self { email, priority }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_priority_index_round_trip() {
        for priority in Priority::ALL {
            assert_eq!(Priority::from_index(priority.as_index()), Some(priority));
        }
        assert_eq!(Priority::from_index(3), None);
    }

    #[test]
    fn test_priority_string_forms() {
        assert_eq!(Priority::High.to_string(), "HIGH");
        assert_eq!(Priority::from_str("LOW").ok(), Some(Priority::Low));
        assert_eq!(Priority::from_str("medium").ok(), Some(Priority::Medium));
        assert!(Priority::from_str("P0").is_err());
    }

    #[test]
    fn test_email_record_decodes_missing_fields_as_defaults() {
        let record: EmailRecord =
            serde_json::from_str(r#"{"subject": "Status update"}"#).expect("valid json");
        assert_eq!(record.subject, "Status update");
        assert_eq!(record.body, "");
        assert!(record.recipients.is_empty());
        assert!(record.timestamp.is_none());
    }

    #[test]
    fn test_email_record_builders() {
        let record = EmailRecord::new("Quarterly report", "Numbers attached.")
            .with_sender("cfo@example.com")
            .with_recipients(vec!["team@example.com".to_string()]);
        assert_eq!(record.sender.as_deref(), Some("cfo@example.com"));
        assert_eq!(record.recipients.len(), 1);
    }
}
