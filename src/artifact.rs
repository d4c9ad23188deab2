//! Persisted model artifacts.
//!
//! An artifact bundles everything prediction needs: the fitted vocabulary,
//! the fitted classifier, the keyword tables used for metadata features and
//! the training summary. A fingerprint over the feature schema is checked on
//! load so a model can never be applied to a feature layout it was not
//! trained on.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::classifier::{ClassifierStrategy, PriorityClassifier};
use crate::config::KeywordConfig;
use crate::error::{PipelineError, Result};
use crate::features::METADATA_FEATURE_NAMES;
use crate::models::Priority;
use crate::text::TfidfVectorizer;
use crate::train::TrainingSummary;

/// Bumped whenever the serialized layout changes incompatibly.
pub const SCHEMA_VERSION: u32 = 1;

/// A trained model plus everything needed to reproduce its feature space.
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub schema_version: u32,
    pub model_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub vectorizer: TfidfVectorizer,
    pub classifier: PriorityClassifier,
    /// Metadata feature names in matrix column order.
    pub metadata_features: Vec<String>,
    pub keywords: KeywordConfig,
    pub summary: TrainingSummary,
    /// Hash of the feature schema, verified on load.
    pub fingerprint: String,
}

impl ModelArtifact {
    pub fn new(
        vectorizer: TfidfVectorizer,
        classifier: PriorityClassifier,
        keywords: KeywordConfig,
        summary: TrainingSummary,
    ) -> Self {
        let metadata_features: Vec<String> = METADATA_FEATURE_NAMES
            .iter()
            .map(|name| name.to_string())
            .collect();
        let mut artifact = Self {
            schema_version: SCHEMA_VERSION,
            model_id: Uuid::new_v4(),
            created_at: Utc::now(),
            vectorizer,
            classifier,
            metadata_features,
            keywords,
            summary,
            fingerprint: String::new(),
        };
        artifact.fingerprint = artifact.compute_fingerprint();
        artifact
    }

    /// Total feature matrix width this model expects.
    pub fn feature_width(&self) -> usize {
        self.vectorizer.vocabulary_size() + self.metadata_features.len()
    }

    /// Hashes the feature schema: versions, model kind, vocabulary terms in
    /// column order, metadata feature names and the class set.
    pub fn compute_fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        hasher.update(self.schema_version.to_le_bytes());
        hasher.update(self.classifier.kind().to_string().as_bytes());
        hasher.update((self.vectorizer.vocabulary_size() as u64).to_le_bytes());
        for term in self.vectorizer.terms() {
            hasher.update(term.as_bytes());
            hasher.update([0u8]);
        }
        for name in &self.metadata_features {
            hasher.update(name.as_bytes());
            hasher.update([0u8]);
        }
        hasher.update((self.feature_width() as u64).to_le_bytes());
        for priority in Priority::ALL {
            hasher.update(priority.to_string().as_bytes());
            hasher.update([0u8]);
        }
        format!("{:x}", hasher.finalize())
    }

    /// Checks internal consistency. Called on every load and before every
    /// save so a broken artifact is caught at the boundary, not mid-predict.
    pub fn verify(&self) -> Result<()> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(PipelineError::ArtifactCorrupt(format!(
                "schema version {} is not supported (expected {})",
                self.schema_version, SCHEMA_VERSION
            )));
        }
        if self.metadata_features != METADATA_FEATURE_NAMES {
            return Err(PipelineError::ModelIntegrity(
                "metadata feature names do not match this build".to_string(),
            ));
        }
        if !self.vectorizer.is_fitted() {
            return Err(PipelineError::ModelIntegrity(
                "artifact vectorizer is not fitted".to_string(),
            ));
        }
        if !self.classifier.is_fitted() {
            return Err(PipelineError::ModelIntegrity(
                "artifact classifier is not fitted".to_string(),
            ));
        }
        if let Some(width) = self.classifier.n_features() {
            if width != self.feature_width() {
                return Err(PipelineError::ModelIntegrity(format!(
                    "classifier expects {} features but the artifact provides {}",
                    width,
                    self.feature_width()
                )));
            }
        }
        let expected = self.compute_fingerprint();
        if self.fingerprint != expected {
            return Err(PipelineError::ModelIntegrity(format!(
                "fingerprint mismatch: stored {} but schema hashes to {}",
                self.fingerprint, expected
            )));
        }
        Ok(())
    }

    /// Writes the artifact atomically: serialize to a sibling temp file,
    /// then rename over the destination.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.verify()?;

        let bytes = bincode::serialize(self).map_err(|e| {
            PipelineError::Internal(format!("artifact serialization failed: {e}"))
        })?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                PipelineError::Config(format!(
                    "artifact path {} has no file name",
                    path.display()
                ))
            })?;
        let tmp = path.with_file_name(format!(".{}.{}.tmp", file_name, self.model_id.simple()));
        fs::write(&tmp, &bytes)?;
        if let Err(e) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        info!(
            "💾 saved model {} ({} bytes) to {}",
            self.model_id,
            bytes.len(),
            path.display()
        );
        Ok(())
    }

    /// Reads, decodes and verifies an artifact.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PipelineError::ArtifactNotFound(
                path.display().to_string(),
            ));
        }
        let bytes = fs::read(path).map_err(|e| {
            PipelineError::ArtifactCorrupt(format!(
                "failed to read {}: {e}",
                path.display()
            ))
        })?;
        let mut artifact: ModelArtifact = bincode::deserialize(&bytes).map_err(|e| {
            PipelineError::ArtifactCorrupt(format!(
                "failed to decode {}: {e}",
                path.display()
            ))
        })?;
        artifact.vectorizer.rebuild_index();
        artifact.verify()?;
        info!(
            "📦 loaded model {} ({} features, trained {})",
            artifact.model_id,
            artifact.feature_width(),
            artifact.summary.trained_at
        );
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::linear::{LinearModel, LinearParams};
    use crate::classifier::{ClassifierStrategy, ModelKind};
    use crate::config::VectorizerConfig;
    use crate::train::{CrossValidationScores, EvaluationReport, TrainingSummary};
    use ndarray::{Array1, Array2};
    use std::collections::HashMap;

    fn fitted_artifact() -> ModelArtifact {
        let config = VectorizerConfig {
            max_features: 50,
            ngram_range: (1, 1),
            min_df: 1,
        };
        let mut vectorizer = TfidfVectorizer::new(config.clone());
        vectorizer
            .fit(&[
                "alpha beta".to_string(),
                "alpha gamma".to_string(),
                "beta gamma".to_string(),
            ])
            .unwrap();
        let width = vectorizer.vocabulary_size() + METADATA_FEATURE_NAMES.len();

        let mut features = Array2::<f64>::zeros((6, width));
        for row in 0..6 {
            features[[row, row % 3]] = 1.0;
        }
        let labels = Array1::from_vec(vec![0usize, 1, 2, 0, 1, 2]);
        let mut model = LinearModel::new(LinearParams { max_iterations: 50 });
        model.fit(&features, &labels).unwrap();

        let summary = TrainingSummary {
            model_type: ModelKind::Linear,
            trained_at: Utc::now(),
            n_examples: 6,
            class_counts: [2, 2, 2],
            balance_applied: false,
            seed: 42,
            vectorizer: config,
            hyperparameters: HashMap::new(),
            cross_validation: CrossValidationScores::from_accuracies(vec![1.0]),
            holdout: EvaluationReport::compute(&[0, 1, 2], &[0, 1, 2]),
            top_features: Vec::new(),
        };
        ModelArtifact::new(
            vectorizer,
            PriorityClassifier::Linear(model),
            KeywordConfig::default(),
            summary,
        )
    }

    #[test]
    fn test_fresh_artifact_verifies() {
        let artifact = fitted_artifact();
        artifact.verify().unwrap();
        assert_eq!(artifact.fingerprint, artifact.compute_fingerprint());
    }

    #[test]
    fn test_feature_width_includes_metadata_block() {
        let artifact = fitted_artifact();
        assert_eq!(
            artifact.feature_width(),
            artifact.vectorizer.vocabulary_size() + 12
        );
    }

    #[test]
    fn test_tampered_fingerprint_is_rejected() {
        let mut artifact = fitted_artifact();
        artifact.fingerprint = "deadbeef".to_string();
        assert!(matches!(
            artifact.verify(),
            Err(PipelineError::ModelIntegrity(_))
        ));
    }

    #[test]
    fn test_unknown_schema_version_is_rejected() {
        let mut artifact = fitted_artifact();
        artifact.schema_version = SCHEMA_VERSION + 1;
        assert!(matches!(
            artifact.verify(),
            Err(PipelineError::ArtifactCorrupt(_))
        ));
    }

    #[test]
    fn test_renamed_metadata_feature_is_rejected() {
        let mut artifact = fitted_artifact();
        artifact.metadata_features[0] = "email_size".to_string();
        assert!(matches!(
            artifact.verify(),
            Err(PipelineError::ModelIntegrity(_))
        ));
    }

    #[test]
    fn test_fingerprint_tracks_vocabulary() {
        let a = fitted_artifact();
        let mut b = fitted_artifact();
        assert_eq!(a.fingerprint, b.fingerprint);

        let mut vectorizer = TfidfVectorizer::new(VectorizerConfig {
            max_features: 50,
            ngram_range: (1, 1),
            min_df: 1,
        });
        vectorizer
            .fit(&["delta epsilon".to_string(), "delta zeta".to_string()])
            .unwrap();
        b.vectorizer = vectorizer;
        assert_ne!(a.fingerprint, b.compute_fingerprint());
    }
}
