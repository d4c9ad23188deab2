//! Rule-based bootstrap labeling.
//!
//! Produces training labels for raw mailboxes that have none. Keyword hits
//! are scored per class with subject matches weighted above body matches,
//! structural signals (recipient fan-out, reply and forward prefixes,
//! automated senders) adjust the totals, and the decision falls back to a
//! low-confidence guess when the scores are not clear-cut. Matching is
//! plain substring containment over lowercased text.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::info;

use crate::models::{EmailRecord, LabeledExample, Priority};

/// Body text beyond this many characters does not affect scoring.
const BODY_SCAN_LIMIT: usize = 1500;
/// Concise, direct emails tend to be requests.
const CONCISE_BODY_BONUS: f64 = 1.5;
const CONCISE_BODY_MAX: usize = 300;
const CONCISE_BODY_MIN: usize = 10;
const CONCISE_SUBJECT_MAX: usize = 50;
/// Replies usually need attention, forwards usually do not.
const REPLY_BONUS: f64 = 1.0;
const FORWARD_PENALTY: f64 = 2.0;
const FORWARD_PREFIXES: [&str; 3] = ["fw:", "fwd:", "fwd fwd"];
/// Recipient fan-out tiers for mass mail.
const MASS_RECIPIENTS: usize = 15;
const MASS_RECIPIENT_PENALTY: f64 = 4.0;
const BULK_RECIPIENTS: usize = 8;
const BULK_RECIPIENT_PENALTY: f64 = 2.0;
const AUTOMATED_SENDER_PENALTY: f64 = 3.0;
const EXECUTIVE_BONUS: f64 = 1.5;

/// Tunable keyword tables and thresholds for the rule labeler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelRuleConfig {
    /// Keywords that pull an email toward HIGH.
    #[serde(default = "default_high_keywords")]
    pub high_keywords: Vec<String>,

    /// Keywords that pull an email toward LOW.
    #[serde(default = "default_low_keywords")]
    pub low_keywords: Vec<String>,

    /// Sender substrings that mark machine-generated mail.
    #[serde(default = "default_automated_senders")]
    pub automated_senders: Vec<String>,

    /// Sender or body substrings that mark executive involvement.
    #[serde(default = "default_executive_markers")]
    pub executive_markers: Vec<String>,

    /// Score added per keyword hit in the subject.
    #[serde(default = "default_subject_weight")]
    pub subject_weight: f64,

    /// Score added per keyword hit in the body.
    #[serde(default = "default_body_weight")]
    pub body_weight: f64,

    /// Minimum class score for a confident rule decision.
    #[serde(default = "default_decision_threshold")]
    pub high_threshold: f64,

    #[serde(default = "default_decision_threshold")]
    pub low_threshold: f64,

    /// Minimum confidence for a confident rule decision.
    #[serde(default = "default_confident_threshold")]
    pub confident_threshold: f64,

    /// Minimum winning score for a fallback HIGH or LOW guess.
    #[serde(default = "default_fallback_margin")]
    pub fallback_margin: f64,

    /// Confidence floor reported for fallback decisions.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
}

fn default_high_keywords() -> Vec<String> {
    to_strings(&[
        "urgent",
        "asap",
        "immediately",
        "critical",
        "emergency",
        "deadline",
        "important",
        "priority",
        "action required",
        "time sensitive",
        "escalation",
        "ceo",
        "president",
        "director",
        "crisis",
        "breach",
        "outage",
        "down",
        "broken",
        "failed",
        "failure",
        "issue",
        "approve",
        "signature",
        "sign",
        "contract",
        "today",
        "now",
        "meeting today",
        "call now",
        "respond immediately",
    ])
}

fn default_low_keywords() -> Vec<String> {
    to_strings(&[
        "newsletter",
        "unsubscribe",
        "webinar",
        "invitation",
        "register",
        "fyi only",
        "no action",
        "automated",
        "notification",
        "noreply",
        "no-reply",
        "spam",
        "promotional",
        "advertisement",
        "marketing",
        "social event",
        "happy hour",
        "congratulations",
        "winner",
        "prize",
        "click here",
        "act now",
        "free",
        "offer expires",
        "backup completed",
    ])
}

fn default_automated_senders() -> Vec<String> {
    to_strings(&[
        "noreply",
        "no-reply",
        "system",
        "automated",
        "notification",
        "donotreply",
    ])
}

fn default_executive_markers() -> Vec<String> {
    to_strings(&["ceo", "president", "director", "vp", "vice president", "manager"])
}

fn default_subject_weight() -> f64 {
    3.0
}

fn default_body_weight() -> f64 {
    1.0
}

fn default_decision_threshold() -> f64 {
    5.0
}

fn default_confident_threshold() -> f64 {
    0.7
}

fn default_fallback_margin() -> f64 {
    2.0
}

fn default_min_confidence() -> f64 {
    0.3
}

fn to_strings(words: &[&str]) -> Vec<String> {
    words.iter().map(|word| word.to_string()).collect()
}

impl Default for LabelRuleConfig {
    fn default() -> Self {
        Self {
            high_keywords: default_high_keywords(),
            low_keywords: default_low_keywords(),
            automated_senders: default_automated_senders(),
            executive_markers: default_executive_markers(),
            subject_weight: default_subject_weight(),
            body_weight: default_body_weight(),
            high_threshold: default_decision_threshold(),
            low_threshold: default_decision_threshold(),
            confident_threshold: default_confident_threshold(),
            fallback_margin: default_fallback_margin(),
            min_confidence: default_min_confidence(),
        }
    }
}

/// How a rule label was decided.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LabelMethod {
    /// Scores cleared the thresholds with confident separation.
    Rules,
    /// Best guess from weak scores.
    RulesFallback,
}

/// A rule decision with its supporting scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleLabel {
    pub priority: Priority,
    pub confidence: f64,
    pub method: LabelMethod,
    pub high_score: f64,
    pub low_score: f64,
}

/// Scores emails against keyword and structural rules.
#[derive(Debug, Clone, Default)]
pub struct RuleLabeler {
    rules: LabelRuleConfig,
}

impl RuleLabeler {
    pub fn new(rules: LabelRuleConfig) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &LabelRuleConfig {
        &self.rules
    }

    /// Labels one email.
    pub fn label(&self, email: &EmailRecord) -> RuleLabel {
        let (high_score, low_score, confidence) = self.rule_scores(email);

        if high_score >= self.rules.high_threshold && confidence > self.rules.confident_threshold {
            return RuleLabel {
                priority: Priority::High,
                confidence,
                method: LabelMethod::Rules,
                high_score,
                low_score,
            };
        }
        if low_score >= self.rules.low_threshold && confidence > self.rules.confident_threshold {
            return RuleLabel {
                priority: Priority::Low,
                confidence,
                method: LabelMethod::Rules,
                high_score,
                low_score,
            };
        }

        let priority = if high_score > low_score && high_score >= self.rules.fallback_margin {
            Priority::High
        } else if low_score > high_score && low_score >= self.rules.fallback_margin {
            Priority::Low
        } else {
            Priority::Medium
        };
        RuleLabel {
            priority,
            confidence: confidence.max(self.rules.min_confidence),
            method: LabelMethod::RulesFallback,
            high_score,
            low_score,
        }
    }

    /// Labels a whole mailbox into training examples, preserving order.
    pub fn bootstrap_examples(&self, emails: &[EmailRecord]) -> Vec<LabeledExample> {
        let examples: Vec<LabeledExample> = emails
            .iter()
            .map(|email| LabeledExample::new(email.clone(), self.label(email).priority))
            .collect();
        let mut counts = [0usize; Priority::COUNT];
        for example in &examples {
            counts[example.priority.as_index()] += 1;
        }
        info!(
            "🏷️ labeled {} emails ({} high, {} medium, {} low)",
            examples.len(),
            counts[0],
            counts[1],
            counts[2]
        );
        examples
    }

    fn rule_scores(&self, email: &EmailRecord) -> (f64, f64, f64) {
        let subject = email.subject.to_lowercase();
        let body: String = email
            .body
            .chars()
            .take(BODY_SCAN_LIMIT)
            .collect::<String>()
            .to_lowercase();
        let sender = email
            .sender
            .as_deref()
            .unwrap_or_default()
            .to_lowercase();

        let mut high_score = 0.0;
        let mut low_score = 0.0;

        for keyword in &self.rules.high_keywords {
            if subject.contains(keyword.as_str()) {
                high_score += self.rules.subject_weight;
            }
            if body.contains(keyword.as_str()) {
                high_score += self.rules.body_weight;
            }
        }
        for keyword in &self.rules.low_keywords {
            if subject.contains(keyword.as_str()) {
                low_score += self.rules.subject_weight;
            }
            if body.contains(keyword.as_str()) {
                low_score += self.rules.body_weight;
            }
        }

        if email.recipients.len() > MASS_RECIPIENTS {
            low_score += MASS_RECIPIENT_PENALTY;
        } else if email.recipients.len() > BULK_RECIPIENTS {
            low_score += BULK_RECIPIENT_PENALTY;
        }

        let body_len = body.chars().count();
        if body_len > CONCISE_BODY_MIN
            && body_len < CONCISE_BODY_MAX
            && subject.chars().count() < CONCISE_SUBJECT_MAX
        {
            high_score += CONCISE_BODY_BONUS;
        }

        if subject.starts_with("re:") {
            high_score += REPLY_BONUS;
        } else if FORWARD_PREFIXES.iter().any(|prefix| subject.starts_with(prefix)) {
            low_score += FORWARD_PENALTY;
        }

        if self
            .rules
            .automated_senders
            .iter()
            .any(|marker| sender.contains(marker.as_str()))
        {
            low_score += AUTOMATED_SENDER_PENALTY;
        }

        if self
            .rules
            .executive_markers
            .iter()
            .any(|marker| sender.contains(marker.as_str()) || body.contains(marker.as_str()))
        {
            high_score += EXECUTIVE_BONUS;
        }

        let max_score = high_score.max(low_score);
        let confidence = max_score / (high_score + low_score + 1.0);
        (high_score, low_score, confidence)
    }
}

/// Curated seed mailbox with unambiguous priorities. Useful as a starter
/// training set and for smoke-testing a trained model.
pub fn reference_examples() -> Vec<LabeledExample> {
    let mut examples = Vec::new();
    let mut push = |subject: &str, body: &str, priority: Priority| {
        examples.push(LabeledExample::new(EmailRecord::new(subject, body), priority));
    };

    push(
        "URGENT: Server outage affecting production",
        "We have a critical server outage that is impacting all production systems. Need immediate response from the infrastructure team. This is affecting customer transactions.",
        Priority::High,
    );
    push(
        "Meeting with CEO tomorrow at 9am",
        "Please confirm your attendance for tomorrow's meeting with the CEO at 9am. We need to discuss Q4 strategy and your input is crucial.",
        Priority::High,
    );
    push(
        "Contract deadline TODAY - need signature",
        "The vendor contract must be signed by end of day today. Please review and sign ASAP. Legal has approved all terms.",
        Priority::High,
    );
    push(
        "Client escalation - they are threatening to cancel",
        "Our largest client just called and they are very unhappy with the recent service issues. They mentioned canceling their contract. Can you call them immediately?",
        Priority::High,
    );
    push(
        "Action required: Approve budget request by EOD",
        "I need your approval on the $50K budget request by end of day so we can process it this quarter. Please review attached proposal.",
        Priority::High,
    );
    push(
        "Emergency: Data breach detected",
        "Security team has detected unauthorized access to customer database. We need to convene emergency response team NOW.",
        Priority::High,
    );

    push(
        "Project status update for Q2",
        "Here is the monthly status update for the infrastructure project. We are on track for Q2 delivery. Please review and let me know if you have any questions.",
        Priority::Medium,
    );
    push(
        "Meeting request: Planning session next week",
        "I would like to schedule a planning session for next week to discuss the roadmap. Please let me know your availability on Tuesday or Wednesday.",
        Priority::Medium,
    );
    push(
        "Question about the new process",
        "I have a question about the new approval process we discussed last week. When you get a chance, can you clarify the escalation path?",
        Priority::Medium,
    );
    push(
        "FYI: Updated guidelines document",
        "Attached are the updated guidelines for the project. Please review when you have time. No immediate action needed, but please read before our next team meeting.",
        Priority::Medium,
    );
    push(
        "Feedback on proposal draft",
        "I have reviewed the proposal draft you sent. Overall looks good, I have a few suggestions. Let's discuss when you have time.",
        Priority::Medium,
    );
    push(
        "Team lunch next Friday?",
        "Hey team, I was thinking we could do a team lunch next Friday to celebrate the project completion. Let me know if you are interested.",
        Priority::Medium,
    );

    push(
        "Newsletter: Weekly Tech Digest",
        "Welcome to this week's tech newsletter! Featured articles: 10 productivity tips, new cloud services, and industry trends. Click here to read more.",
        Priority::Low,
    );
    push(
        "Invitation: Webinar on Cloud Computing",
        "You are invited to our upcoming webinar on cloud computing best practices. Register now! This email was sent to you because you subscribed to our mailing list.",
        Priority::Low,
    );
    push(
        "SPAM: Congratulations! You have won!",
        "Click here to claim your prize! You have been selected as a winner in our monthly drawing. Act now before this offer expires!",
        Priority::Low,
    );
    push(
        "Automatic notification: Backup completed",
        "This is an automated message. Your scheduled backup completed successfully at 2:00 AM. No action required.",
        Priority::Low,
    );
    push(
        "Social event: Happy hour this Friday",
        "Join us for happy hour this Friday at 5pm! It will be at the usual spot. Hope to see you there! RSVP optional.",
        Priority::Low,
    );
    push(
        "FWD: FWD: FWD: Funny cat video",
        "Check out this hilarious video! Thought you might enjoy it.",
        Priority::Low,
    );
    push(
        "Unsubscribe confirmation",
        "You have successfully unsubscribed from our mailing list. You will no longer receive promotional emails from us.",
        Priority::Low,
    );

    examples
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labeler() -> RuleLabeler {
        RuleLabeler::default()
    }

    #[test]
    fn test_urgent_outage_is_confident_high() {
        let email = EmailRecord::new(
            "URGENT: Server outage affecting production",
            "We have a critical server outage that is impacting all production systems. Need immediate response from the infrastructure team. This is affecting customer transactions.",
        );
        let label = labeler().label(&email);
        assert_eq!(label.priority, Priority::High);
        assert_eq!(label.method, LabelMethod::Rules);
        assert!(label.confidence > 0.7);
        assert!(label.high_score >= 5.0);
    }

    #[test]
    fn test_automated_notification_is_confident_low() {
        let email = EmailRecord::new(
            "Automatic notification: Backup completed",
            "This is an automated message. Your scheduled backup completed successfully at 2:00 AM. No action required.",
        )
        .with_sender("noreply@corp.example");
        let label = labeler().label(&email);
        assert_eq!(label.priority, Priority::Low);
        assert_eq!(label.method, LabelMethod::Rules);
        assert!(label.low_score >= 5.0);
    }

    #[test]
    fn test_neutral_email_falls_back_to_medium() {
        let email = EmailRecord::new(
            "Quarterly planning recap",
            "The quarterly planning session went well. We walked through the roadmap for the \
             next two quarters and collected feedback from each team. The notes are shared in \
             the usual folder. There is no rush on this, but it would help to have your \
             comments before the next session so we can fold them into the final plan. We \
             will revisit all open items at the start of next month.",
        );
        let label = labeler().label(&email);
        assert_eq!(label.priority, Priority::Medium);
        assert_eq!(label.method, LabelMethod::RulesFallback);
        assert_eq!(label.confidence, 0.3);
        assert_eq!(label.high_score, 0.0);
        assert_eq!(label.low_score, 0.0);
    }

    #[test]
    fn test_subject_hits_outweigh_body_hits() {
        let in_subject = labeler().label(&EmailRecord::new("urgent", ""));
        let in_body = labeler().label(&EmailRecord::new("", "this is urgent"));
        assert!(in_subject.high_score > in_body.high_score);
    }

    #[test]
    fn test_mass_recipients_push_low() {
        let recipients: Vec<String> = (0..16).map(|i| format!("user{i}@corp.example")).collect();
        let base = EmailRecord::new("team announcement", "a".repeat(400));
        let massive = base.clone().with_recipients(recipients);
        let few = labeler().label(&base);
        let many = labeler().label(&massive);
        assert_eq!(many.low_score, few.low_score + 4.0);
    }

    #[test]
    fn test_forward_chain_is_penalized() {
        let email = EmailRecord::new(
            "FWD: FWD: FWD: Funny cat video",
            "Check out this hilarious video! Thought you might enjoy it.",
        );
        let label = labeler().label(&email);
        assert_eq!(label.priority, Priority::Low);
    }

    #[test]
    fn test_executive_sender_boosts_high() {
        let plain = EmailRecord::new("schedule sync", "a".repeat(400));
        let from_exec = plain.clone().with_sender("office.of.the.ceo@corp.example");
        let without = labeler().label(&plain);
        let with = labeler().label(&from_exec);
        assert_eq!(with.high_score, without.high_score + 1.5);
    }

    #[test]
    fn test_bootstrap_preserves_order_and_length() {
        let emails = vec![
            EmailRecord::new("URGENT: outage today", "Critical outage, respond immediately."),
            EmailRecord::new("Newsletter: Weekly Tech Digest", "Click here to unsubscribe."),
        ];
        let examples = labeler().bootstrap_examples(&emails);
        assert_eq!(examples.len(), 2);
        assert_eq!(examples[0].email.subject, emails[0].subject);
        assert_eq!(examples[0].priority, Priority::High);
        assert_eq!(examples[1].priority, Priority::Low);
    }

    #[test]
    fn test_reference_examples_cover_all_classes() {
        let examples = reference_examples();
        assert_eq!(examples.len(), 19);
        let count = |priority: Priority| {
            examples
                .iter()
                .filter(|example| example.priority == priority)
                .count()
        };
        assert_eq!(count(Priority::High), 6);
        assert_eq!(count(Priority::Medium), 6);
        assert_eq!(count(Priority::Low), 7);
    }

    #[test]
    fn test_label_method_names() {
        assert_eq!(LabelMethod::Rules.to_string(), "rules");
        assert_eq!(LabelMethod::RulesFallback.to_string(), "rules_fallback");
    }
}
