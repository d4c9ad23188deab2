//! Prediction over a loaded model artifact.
//!
//! A [`Predictor`] can only be constructed from an artifact that passed
//! verification, so every prediction path starts from a consistent model.
//! Feature preparation is per-email and embarrassingly parallel; batches
//! large enough to be worth the fan-out are prepared with rayon.

use std::path::Path;

use rayon::prelude::*;

use crate::artifact::ModelArtifact;
use crate::classifier::ClassifierStrategy;
use crate::error::{PipelineError, Result};
use crate::features::{FeatureAssembler, MetadataExtractor, METADATA_WIDTH};
use crate::models::{EmailRecord, PredictionResult};
use crate::text::{normalize_email, SparseRow};

/// Batches smaller than this are prepared serially.
const PARALLEL_BATCH_THRESHOLD: usize = 32;

/// Classifies emails with a trained, verified model.
pub struct Predictor {
    artifact: ModelArtifact,
    extractor: MetadataExtractor,
    assembler: FeatureAssembler,
}

impl Predictor {
    /// Loads and verifies an artifact from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_artifact(ModelArtifact::load(path)?)
    }

    /// Wraps an in-memory artifact, verifying it first.
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self> {
        artifact.verify()?;
        let extractor = MetadataExtractor::new(artifact.keywords.clone());
        let assembler = FeatureAssembler::new(artifact.vectorizer.vocabulary_size());
        Ok(Self {
            artifact,
            extractor,
            assembler,
        })
    }

    /// Classifies one email.
    pub fn predict(&self, email: &EmailRecord) -> Result<PredictionResult> {
        let mut results = self.predict_batch(std::slice::from_ref(email))?;
        results
            .pop()
            .ok_or_else(|| PipelineError::Internal("prediction batch came back empty".to_string()))
    }

    /// Classifies a batch, preserving input order.
    pub fn predict_batch(&self, emails: &[EmailRecord]) -> Result<Vec<PredictionResult>> {
        if emails.is_empty() {
            return Ok(Vec::new());
        }

        let prepared: Vec<(SparseRow, [f64; METADATA_WIDTH])> =
            if emails.len() >= PARALLEL_BATCH_THRESHOLD {
                emails
                    .par_iter()
                    .map(|email| self.prepare_row(email))
                    .collect::<Result<Vec<_>>>()?
            } else {
                emails
                    .iter()
                    .map(|email| self.prepare_row(email))
                    .collect::<Result<Vec<_>>>()?
            };
        let (sparse, metadata): (Vec<_>, Vec<_>) = prepared.into_iter().unzip();

        let features = self.assembler.assemble(&sparse, &metadata)?;
        let probabilities = self.artifact.classifier.predict_proba(&features)?;
        Ok(probabilities
            .rows()
            .into_iter()
            .map(|row| PredictionResult::from_distribution(&row.to_vec()))
            .collect())
    }

    fn prepare_row(&self, email: &EmailRecord) -> Result<(SparseRow, [f64; METADATA_WIDTH])> {
        let document = normalize_email(&email.subject, &email.body);
        let sparse = self.artifact.vectorizer.transform_one(&document)?;
        Ok((sparse, self.extractor.extract(email)))
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }
}
