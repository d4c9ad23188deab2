use serde::{Deserialize, Serialize};

use crate::classifier::{ForestParams, LinearParams, ModelKind};
use crate::error::{PipelineError, Result};

/// Text vectorizer settings. Recorded verbatim in the trained artifact so
/// inference reproduces training-time tokenization exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerConfig {
    /// Vocabulary cap. Terms beyond this are dropped by document frequency.
    #[serde(default = "default_max_features")]
    pub max_features: usize,

    /// Inclusive n-gram span, e.g. (1, 2) for unigrams and bigrams.
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),

    /// Minimum number of documents a term must appear in.
    #[serde(default = "default_min_df")]
    pub min_df: usize,
}

fn default_max_features() -> usize {
    5000
}

fn default_ngram_range() -> (usize, usize) {
    (1, 2)
}

fn default_min_df() -> usize {
    2
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: default_max_features(),
            ngram_range: default_ngram_range(),
            min_df: default_min_df(),
        }
    }
}

/// Keyword sets behind the boolean metadata features. Fixed configuration,
/// not learned; stored in the artifact so feature extraction is reproducible
/// at inference time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordConfig {
    /// Urgency markers matched anywhere in subject+body.
    #[serde(default = "default_urgency_words")]
    pub urgency: Vec<String>,

    /// Action-required markers matched anywhere in subject+body.
    #[serde(default = "default_action_words")]
    pub action: Vec<String>,

    /// Time-sensitive phrasing matched anywhere in subject+body.
    #[serde(default = "default_time_indicators")]
    pub time: Vec<String>,

    /// Attachment markers matched in the body.
    #[serde(default = "default_attachment_markers")]
    pub attachment: Vec<String>,

    /// Reply/forward prefixes matched at the start of the subject.
    #[serde(default = "default_reply_prefixes")]
    pub reply_prefixes: Vec<String>,

    /// Formal salutations matched at the start of the body.
    #[serde(default = "default_formal_salutations")]
    pub formal_salutations: Vec<String>,

    /// Informal greetings matched at the start of the body.
    #[serde(default = "default_casual_greetings")]
    pub casual_greetings: Vec<String>,
}

fn default_urgency_words() -> Vec<String> {
    // Bare "immediate" is excluded: routine mail reads "no immediate
    // action needed" while genuinely urgent mail says "immediately".
    to_strings(&[
        "urgent",
        "asap",
        "critical",
        "crucial",
        "immediately",
        "emergency",
        "crisis",
        "deadline",
        "end of day",
        "right away",
        "time sensitive",
    ])
}

fn default_action_words() -> Vec<String> {
    to_strings(&[
        "action required",
        "please review",
        "please respond",
        "please approve",
        "approval needed",
        "need your",
        "respond by",
        "sign off",
        "signature required",
        "confirm receipt",
    ])
}

fn default_time_indicators() -> Vec<String> {
    to_strings(&[
        "today",
        "tomorrow",
        "tonight",
        "eod",
        "end of day",
        "cob",
        "close of business",
        "this morning",
        "this afternoon",
        "by monday",
        "by tuesday",
        "by wednesday",
        "by thursday",
        "by friday",
    ])
}

fn default_attachment_markers() -> Vec<String> {
    to_strings(&["attached", "attachment", "enclosed"])
}

fn default_reply_prefixes() -> Vec<String> {
    to_strings(&["re:", "fw:", "fwd:"])
}

fn default_formal_salutations() -> Vec<String> {
    to_strings(&[
        "dear ",
        "to whom it may concern",
        "good morning",
        "good afternoon",
        "good evening",
    ])
}

fn default_casual_greetings() -> Vec<String> {
    to_strings(&["hey", "hi there", "what's up", "yo "])
}

fn to_strings(words: &[&str]) -> Vec<String> {
    words.iter().map(|s| s.to_string()).collect()
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            urgency: default_urgency_words(),
            action: default_action_words(),
            time: default_time_indicators(),
            attachment: default_attachment_markers(),
            reply_prefixes: default_reply_prefixes(),
            formal_salutations: default_formal_salutations(),
            casual_greetings: default_casual_greetings(),
        }
    }
}

/// Training configuration. Validated before any computation begins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Which classifier family to fit.
    #[serde(default)]
    pub model_type: ModelKind,

    /// Text vectorizer settings.
    #[serde(default)]
    pub vectorizer: VectorizerConfig,

    /// Held-out fraction for the final evaluation split.
    #[serde(default = "default_test_size")]
    pub test_size: f64,

    /// Number of stratified cross-validation folds.
    #[serde(default = "default_cv_folds")]
    pub cv_folds: usize,

    /// Downsample majority classes to the minority count before fitting.
    #[serde(default)]
    pub balance_dataset: bool,

    /// Seed for every randomized step: balancing, splits, bagging.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Tree-ensemble hyperparameters.
    #[serde(default)]
    pub forest: ForestParams,

    /// Linear-model hyperparameters.
    #[serde(default)]
    pub linear: LinearParams,

    /// Keyword sets for the metadata features.
    #[serde(default)]
    pub keywords: KeywordConfig,

    /// How many ranked features to keep in the training summary.
    #[serde(default = "default_top_features")]
    pub top_features: usize,
}

fn default_test_size() -> f64 {
    0.2
}

fn default_cv_folds() -> usize {
    5
}

fn default_seed() -> u64 {
    42
}

fn default_top_features() -> usize {
    20
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            model_type: ModelKind::default(),
            vectorizer: VectorizerConfig::default(),
            test_size: default_test_size(),
            cv_folds: default_cv_folds(),
            balance_dataset: false,
            seed: default_seed(),
            forest: ForestParams::default(),
            linear: LinearParams::default(),
            keywords: KeywordConfig::default(),
            top_features: default_top_features(),
        }
    }
}

impl TrainConfig {
    /// Set the classifier family from a configuration string, as collaborators
    /// pass it (config file entry, CLI flag).
    pub fn with_model_type(mut self, value: &str) -> Result<Self> {
        self.model_type = ModelKind::parse(value)?;
        Ok(self)
    }

    /// Reject invalid settings before any data is touched.
    pub fn validate(&self) -> Result<()> {
        if !self.test_size.is_finite() || self.test_size <= 0.0 || self.test_size >= 1.0 {
            return Err(PipelineError::Config(format!(
                "test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }
        if self.cv_folds < 2 {
            return Err(PipelineError::Config(format!(
                "cv_folds must be at least 2, got {}",
                self.cv_folds
            )));
        }
        if self.vectorizer.max_features == 0 {
            return Err(PipelineError::Config(
                "max_features must be positive, got 0".to_string(),
            ));
        }
        if self.vectorizer.min_df == 0 {
            return Err(PipelineError::Config(
                "min_df must be at least 1, got 0".to_string(),
            ));
        }
        let (lo, hi) = self.vectorizer.ngram_range;
        if lo == 0 || lo > hi {
            return Err(PipelineError::Config(format!(
                "ngram_range must satisfy 1 <= low <= high, got ({}, {})",
                lo, hi
            )));
        }
        if self.forest.n_estimators == 0 {
            return Err(PipelineError::Config(
                "forest.n_estimators must be positive, got 0".to_string(),
            ));
        }
        if self.forest.max_depth == 0 {
            return Err(PipelineError::Config(
                "forest.max_depth must be positive, got 0".to_string(),
            ));
        }
        if self.forest.min_samples_split < 2 {
            return Err(PipelineError::Config(format!(
                "forest.min_samples_split must be at least 2, got {}",
                self.forest.min_samples_split
            )));
        }
        if self.forest.min_samples_leaf == 0 {
            return Err(PipelineError::Config(
                "forest.min_samples_leaf must be at least 1, got 0".to_string(),
            ));
        }
        if self.linear.max_iterations == 0 {
            return Err(PipelineError::Config(
                "linear.max_iterations must be positive, got 0".to_string(),
            ));
        }
        if self.top_features == 0 {
            return Err(PipelineError::Config(
                "top_features must be positive, got 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = TrainConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.vectorizer.max_features, 5000);
        assert_eq!(config.vectorizer.ngram_range, (1, 2));
        assert_eq!(config.vectorizer.min_df, 2);
        assert_eq!(config.cv_folds, 5);
        assert!((config.test_size - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_test_size_rejected() {
        let mut config = TrainConfig::default();
        config.test_size = 1.0;
        let err = config.validate().unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
        assert!(err.to_string().contains("test_size"));
    }

    #[test]
    fn test_invalid_cv_folds_rejected() {
        let mut config = TrainConfig::default();
        config.cv_folds = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_ngram_range_rejected() {
        let mut config = TrainConfig::default();
        config.vectorizer.ngram_range = (2, 1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_model_type_parses_from_config_strings() {
        let config: TrainConfig =
            serde_json::from_str(r#"{"model_type": "linear"}"#).expect("valid config json");
        assert_eq!(config.model_type, ModelKind::Linear);
        assert!(serde_json::from_str::<TrainConfig>(r#"{"model_type": "svm"}"#).is_err());
    }

    #[test]
    fn test_unknown_model_type_string_is_a_config_error() {
        let config = TrainConfig::default()
            .with_model_type("linear")
            .expect("known model type");
        assert_eq!(config.model_type, ModelKind::Linear);

        let err = TrainConfig::default().with_model_type("svm").unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
        assert!(err.to_string().contains("svm"));
    }
}
