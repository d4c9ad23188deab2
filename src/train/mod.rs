//! Model training: cross-validation, holdout evaluation and artifact
//! assembly.
//!
//! The trainer owns the full fitting sequence. Text is normalized and the
//! vocabulary fitted once over the whole corpus, then the classifier is
//! refitted per cross-validation fold and once more on the holdout train
//! side. The model that ships in the artifact is the holdout-trained one,
//! so the reported holdout metrics describe the exact model being saved.

pub mod metrics;
pub mod split;

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use ndarray::{Array1, Array2, Axis};
use ndarray_stats::QuantileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::artifact::ModelArtifact;
use crate::classifier::{ClassifierStrategy, ModelKind, PriorityClassifier};
use crate::config::{TrainConfig, VectorizerConfig};
use crate::error::{PipelineError, Result};
use crate::features::{FeatureAssembler, MetadataExtractor, METADATA_WIDTH};
use crate::models::{LabeledExample, Priority};
use crate::text::{normalize_email, TfidfVectorizer};

pub use metrics::{
    ClassReport, CrossValidationScores, EvaluationReport, RankedFeature,
};

/// Provenance and quality record embedded in every artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub model_type: ModelKind,
    pub trained_at: DateTime<Utc>,
    /// Rows actually used for fitting, after any balancing.
    pub n_examples: usize,
    /// Per-class row counts in class-index order, after any balancing.
    pub class_counts: [usize; Priority::COUNT],
    pub balance_applied: bool,
    pub seed: u64,
    pub vectorizer: VectorizerConfig,
    pub hyperparameters: HashMap<String, String>,
    pub cross_validation: CrossValidationScores,
    pub holdout: EvaluationReport,
    pub top_features: Vec<RankedFeature>,
}

impl TrainingSummary {
    /// Render the summary as pretty JSON for reports and audit logs.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Fits a classifier over labeled emails and packages it as an artifact.
pub struct Trainer {
    config: TrainConfig,
}

impl Trainer {
    pub fn new(config: TrainConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    /// Runs the full training sequence and returns the finished artifact.
    pub fn train(&self, examples: &[LabeledExample]) -> Result<ModelArtifact> {
        if examples.is_empty() {
            return Err(PipelineError::Data(
                "no training examples provided".to_string(),
            ));
        }
        info!(
            "🧮 training {} model on {} labeled emails",
            self.config.model_type,
            examples.len()
        );

        let labels: Vec<usize> = examples
            .iter()
            .map(|example| example.priority.as_index())
            .collect();
        check_class_coverage(&labels)?;

        // Optional downsampling to the smallest class.
        let working: Vec<&LabeledExample> = if self.config.balance_dataset {
            let kept = split::balance_downsample(&labels, Priority::COUNT, self.config.seed);
            info!(
                "⚖️ balanced dataset from {} to {} examples",
                examples.len(),
                kept.len()
            );
            kept.into_iter().map(|row| &examples[row]).collect()
        } else {
            examples.iter().collect()
        };

        let labels: Vec<usize> = working
            .iter()
            .map(|example| example.priority.as_index())
            .collect();
        let class_counts = count_classes(&labels);
        let min_required = self.config.cv_folds.max(2);
        for (class, &count) in class_counts.iter().enumerate() {
            if count < min_required {
                return Err(PipelineError::Data(format!(
                    "class {} has {} examples but at least {} are required (cv_folds={})",
                    Priority::ALL[class],
                    count,
                    min_required,
                    self.config.cv_folds
                )));
            }
        }

        // One pass over the corpus builds both feature blocks.
        let extractor = MetadataExtractor::new(self.config.keywords.clone());
        let docs: Vec<String> = working
            .iter()
            .map(|example| normalize_email(&example.email.subject, &example.email.body))
            .collect();
        let blank = docs.iter().filter(|doc| doc.is_empty()).count();
        if blank > 0 {
            warn!(
                "{} of {} emails have no usable text; they train on metadata features only",
                blank,
                docs.len()
            );
        }
        let metadata: Vec<[f64; METADATA_WIDTH]> = working
            .iter()
            .map(|example| extractor.extract(&example.email))
            .collect();

        let mut vectorizer = TfidfVectorizer::new(self.config.vectorizer.clone());
        vectorizer.fit(&docs)?;
        debug!(
            "vocabulary fitted: {} terms from {} documents",
            vectorizer.vocabulary_size(),
            docs.len()
        );

        let sparse = vectorizer.transform(&docs)?;
        let assembler = FeatureAssembler::new(vectorizer.vocabulary_size());
        let features = assembler.assemble(&sparse, &metadata)?;
        let label_array = Array1::from_vec(labels.clone());

        let cross_validation = self.cross_validate(&features, &label_array, &labels)?;
        info!(
            "📊 cross-validation accuracy {:.3} ± {:.3} over {} folds",
            cross_validation.mean_accuracy,
            cross_validation.std_accuracy,
            cross_validation.folds
        );

        // Final fit on the holdout train side; its evaluation describes the
        // exact model that ships.
        let (train_idx, test_idx) = split::stratified_split(
            &labels,
            Priority::COUNT,
            self.config.test_size,
            self.config.seed,
        );
        let mut classifier = PriorityClassifier::new(&self.config);
        classifier.fit(
            &features.select(Axis(0), &train_idx),
            &label_array.select(Axis(0), &train_idx),
        )?;
        let probabilities =
            classifier.predict_proba(&features.select(Axis(0), &test_idx))?;
        let predicted = argmax_rows(&probabilities)?;
        let actual: Vec<usize> = test_idx.iter().map(|&row| labels[row]).collect();
        let holdout = EvaluationReport::compute(&actual, &predicted);
        info!(
            "✅ holdout accuracy {:.3} on {} emails",
            holdout.accuracy,
            test_idx.len()
        );

        let importances = classifier.feature_importances()?;
        let top_features = metrics::rank_features(
            &importances,
            vectorizer.terms(),
            self.config.top_features,
        );

        let summary = TrainingSummary {
            model_type: self.config.model_type,
            trained_at: Utc::now(),
            n_examples: working.len(),
            class_counts,
            balance_applied: self.config.balance_dataset,
            seed: self.config.seed,
            vectorizer: self.config.vectorizer.clone(),
            hyperparameters: self.hyperparameters(),
            cross_validation,
            holdout,
            top_features,
        };

        Ok(ModelArtifact::new(
            vectorizer,
            classifier,
            self.config.keywords.clone(),
            summary,
        ))
    }

    /// Stratified k-fold accuracy. The vocabulary stays fixed; only the
    /// classifier is refitted per fold.
    fn cross_validate(
        &self,
        features: &Array2<f64>,
        label_array: &Array1<usize>,
        labels: &[usize],
    ) -> Result<CrossValidationScores> {
        let folds = split::stratified_folds(
            labels,
            Priority::COUNT,
            self.config.cv_folds,
            self.config.seed,
        );
        let mut accuracies = Vec::with_capacity(folds.len());
        for (fold_no, test_idx) in folds.iter().enumerate() {
            let in_fold: HashSet<usize> = test_idx.iter().copied().collect();
            let train_idx: Vec<usize> =
                (0..labels.len()).filter(|row| !in_fold.contains(row)).collect();

            let mut classifier = PriorityClassifier::new(&self.config);
            classifier.fit(
                &features.select(Axis(0), &train_idx),
                &label_array.select(Axis(0), &train_idx),
            )?;
            let probabilities =
                classifier.predict_proba(&features.select(Axis(0), test_idx))?;
            let predicted = argmax_rows(&probabilities)?;
            let correct = test_idx
                .iter()
                .zip(&predicted)
                .filter(|(&row, &guess)| labels[row] == guess)
                .count();
            let accuracy = correct as f64 / test_idx.len().max(1) as f64;
            debug!("fold {} accuracy {:.3}", fold_no + 1, accuracy);
            accuracies.push(accuracy);
        }
        Ok(CrossValidationScores::from_accuracies(accuracies))
    }

    fn hyperparameters(&self) -> HashMap<String, String> {
        let mut params = HashMap::new();
        match self.config.model_type {
            ModelKind::TreeEnsemble => {
                params.insert(
                    "n_estimators".to_string(),
                    self.config.forest.n_estimators.to_string(),
                );
                params.insert(
                    "max_depth".to_string(),
                    self.config.forest.max_depth.to_string(),
                );
                params.insert(
                    "min_samples_split".to_string(),
                    self.config.forest.min_samples_split.to_string(),
                );
                params.insert(
                    "min_samples_leaf".to_string(),
                    self.config.forest.min_samples_leaf.to_string(),
                );
            }
            ModelKind::Linear => {
                params.insert(
                    "max_iterations".to_string(),
                    self.config.linear.max_iterations.to_string(),
                );
            }
        }
        params
    }
}

fn check_class_coverage(labels: &[usize]) -> Result<()> {
    let counts = count_classes(labels);
    for (class, &count) in counts.iter().enumerate() {
        if count == 0 {
            return Err(PipelineError::Data(format!(
                "class coverage incomplete: no {} examples in training data",
                Priority::ALL[class]
            )));
        }
    }
    Ok(())
}

fn count_classes(labels: &[usize]) -> [usize; Priority::COUNT] {
    let mut counts = [0usize; Priority::COUNT];
    for &label in labels {
        if label < Priority::COUNT {
            counts[label] += 1;
        }
    }
    counts
}

fn argmax_rows(probabilities: &Array2<f64>) -> Result<Vec<usize>> {
    probabilities
        .rows()
        .into_iter()
        .map(|row| {
            row.argmax().map_err(|e| {
                PipelineError::Internal(format!("probability row has no maximum: {}", e))
            })
        })
        .collect()
}
