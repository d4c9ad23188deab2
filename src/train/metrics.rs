//! Evaluation reports produced during training.

use serde::{Deserialize, Serialize};

use crate::features::METADATA_FEATURE_NAMES;
use crate::models::Priority;

/// Precision, recall and F1 for one priority class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassReport {
    pub priority: Priority,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Number of holdout rows whose true label is this class.
    pub support: usize,
}

/// Holdout evaluation: accuracy, per-class scores and the confusion matrix.
///
/// The confusion matrix is indexed `[actual][predicted]` in class-index
/// order, so `confusion[0][2]` counts HIGH emails predicted LOW.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub accuracy: f64,
    pub per_class: Vec<ClassReport>,
    pub confusion: [[usize; Priority::COUNT]; Priority::COUNT],
}

impl EvaluationReport {
    /// Computes the report from parallel actual/predicted class indices.
    pub fn compute(actual: &[usize], predicted: &[usize]) -> Self {
        debug_assert_eq!(actual.len(), predicted.len());

        let mut confusion = [[0usize; Priority::COUNT]; Priority::COUNT];
        let mut correct = 0usize;
        for (&truth, &guess) in actual.iter().zip(predicted) {
            if truth < Priority::COUNT && guess < Priority::COUNT {
                confusion[truth][guess] += 1;
                if truth == guess {
                    correct += 1;
                }
            }
        }

        let accuracy = if actual.is_empty() {
            0.0
        } else {
            correct as f64 / actual.len() as f64
        };

        let per_class = Priority::ALL
            .iter()
            .enumerate()
            .map(|(class, &priority)| {
                let support: usize = confusion[class].iter().sum();
                let predicted_as: usize = confusion.iter().map(|row| row[class]).sum();
                let hits = confusion[class][class];
                let precision = ratio(hits, predicted_as);
                let recall = ratio(hits, support);
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };
                ClassReport {
                    priority,
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect();

        Self {
            accuracy,
            per_class,
            confusion,
        }
    }

    /// Report for a single class, if present.
    pub fn class(&self, priority: Priority) -> Option<&ClassReport> {
        self.per_class.iter().find(|report| report.priority == priority)
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Per-fold accuracies from cross-validation plus their mean and spread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossValidationScores {
    pub folds: usize,
    pub accuracies: Vec<f64>,
    pub mean_accuracy: f64,
    pub std_accuracy: f64,
}

impl CrossValidationScores {
    pub fn from_accuracies(accuracies: Vec<f64>) -> Self {
        let folds = accuracies.len();
        let mean = if folds == 0 {
            0.0
        } else {
            accuracies.iter().sum::<f64>() / folds as f64
        };
        let variance = if folds == 0 {
            0.0
        } else {
            accuracies
                .iter()
                .map(|accuracy| (accuracy - mean).powi(2))
                .sum::<f64>()
                / folds as f64
        };
        Self {
            folds,
            accuracies,
            mean_accuracy: mean,
            std_accuracy: variance.sqrt(),
        }
    }
}

/// One feature in the model's importance ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedFeature {
    /// Column index in the assembled feature matrix.
    pub index: usize,
    /// Vocabulary term for text columns, metadata feature name otherwise.
    pub name: String,
    pub weight: f64,
}

/// Maps raw importances back to feature names and keeps the top `top_n`,
/// heaviest first. Text columns come before the metadata block, matching
/// the assembled matrix layout.
pub fn rank_features(importances: &[f64], terms: &[String], top_n: usize) -> Vec<RankedFeature> {
    let mut ranked: Vec<RankedFeature> = importances
        .iter()
        .enumerate()
        .map(|(index, &weight)| {
            let name = if index < terms.len() {
                terms[index].clone()
            } else {
                METADATA_FEATURE_NAMES
                    .get(index - terms.len())
                    .map(|name| name.to_string())
                    .unwrap_or_else(|| format!("feature_{index}"))
            };
            RankedFeature {
                index,
                name,
                weight,
            }
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.weight
            .partial_cmp(&a.weight)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.index.cmp(&b.index))
    });
    ranked.truncate(top_n);
    ranked
}
