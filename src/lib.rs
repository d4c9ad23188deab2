//! Email priority classification pipeline.
//!
//! Turns raw emails into HIGH / MEDIUM / LOW priority predictions. Text is
//! vectorized with TF-IDF over word n-grams, combined with structural
//! metadata features, and scored by a bagged tree ensemble or a multinomial
//! logistic model. Trained models ship as self-verifying artifacts that
//! prediction loads, fingerprint-checks and reuses across batches.
//!
//! Typical flow:
//!
//! ```no_run
//! use mailtriage::{reference_examples, Predictor, TrainConfig, Trainer};
//! use mailtriage::models::EmailRecord;
//!
//! # fn main() -> mailtriage::Result<()> {
//! let artifact = Trainer::new(TrainConfig::default())?.train(&reference_examples())?;
//! artifact.save("priority.model")?;
//!
//! let predictor = Predictor::load("priority.model")?;
//! let result = predictor.predict(&EmailRecord::new(
//!     "URGENT: need sign-off today",
//!     "The contract deadline is end of day. Please review and approve.",
//! ))?;
//! println!("{} ({:.2})", result.priority, result.confidence);
//! # Ok(())
//! # }
//! ```

pub mod artifact;
pub mod classifier;
pub mod config;
pub mod error;
pub mod features;
pub mod labeler;
pub mod models;
pub mod predict;
pub mod text;
pub mod train;

pub use artifact::{ModelArtifact, SCHEMA_VERSION};
pub use classifier::{ClassifierStrategy, ModelKind, PriorityClassifier};
pub use config::{KeywordConfig, TrainConfig, VectorizerConfig};
pub use error::{PipelineError, Result};
pub use labeler::{reference_examples, LabelMethod, LabelRuleConfig, RuleLabel, RuleLabeler};
pub use models::{EmailRecord, LabeledExample, PredictionResult, Priority};
pub use predict::Predictor;
pub use train::{Trainer, TrainingSummary};

/// Trains a model in one call. Equivalent to building a [`Trainer`] and
/// running it over the examples.
pub fn train(examples: &[LabeledExample], config: TrainConfig) -> Result<ModelArtifact> {
    Trainer::new(config)?.train(examples)
}
