//! Multinomial logistic regression.
//!
//! The solver's weight matrix and intercept are copied out of the fitted
//! model, so the persisted state is plain arrays and probabilities round-trip
//! bit-exactly through the artifact. Columns follow the sorted label
//! encoding (HIGH=0, MEDIUM=1, LOW=2), which the trainer guarantees is fully
//! populated before fitting.

use linfa::traits::Fit;
use linfa::Dataset;
use linfa_logistic::MultiLogisticRegression;
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::classifier::{ClassifierStrategy, ModelKind};
use crate::error::{PipelineError, Result};

/// Linear-model hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearParams {
    /// Solver iteration cap.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u64,
}

fn default_max_iterations() -> u64 {
    100
}

impl Default for LinearParams {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
        }
    }
}

/// Multinomial logistic regression over the assembled feature space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    params: LinearParams,
    /// Weight matrix of shape (n_features, n_classes).
    weights: Option<Array2<f64>>,
    /// Per-class intercept.
    intercept: Option<Array1<f64>>,
}

impl LinearModel {
    pub fn new(params: LinearParams) -> Self {
        Self {
            params,
            weights: None,
            intercept: None,
        }
    }

    pub fn params(&self) -> &LinearParams {
        &self.params
    }

    fn fitted(&self) -> Result<(&Array2<f64>, &Array1<f64>)> {
        match (&self.weights, &self.intercept) {
            (Some(weights), Some(intercept)) => Ok((weights, intercept)),
            _ => Err(PipelineError::Data(
                "classifier has not been fitted".to_string(),
            )),
        }
    }
}

impl ClassifierStrategy for LinearModel {
    fn fit(&mut self, features: &Array2<f64>, labels: &Array1<usize>) -> Result<()> {
        if features.nrows() != labels.len() {
            return Err(PipelineError::Internal(format!(
                "feature rows ({}) and labels ({}) are misaligned",
                features.nrows(),
                labels.len()
            )));
        }
        if features.nrows() == 0 {
            return Err(PipelineError::Data(
                "cannot fit on an empty training set".to_string(),
            ));
        }

        let dataset = Dataset::new(features.to_owned(), labels.to_owned());
        let fitted = MultiLogisticRegression::default()
            .max_iterations(self.params.max_iterations)
            .fit(&dataset)
            .map_err(|e| {
                PipelineError::Internal(format!("logistic regression fit failed: {}", e))
            })?;

        self.weights = Some(fitted.params().to_owned());
        self.intercept = Some(fitted.intercept().to_owned());
        Ok(())
    }

    fn predict_proba(&self, features: &Array2<f64>) -> Result<Array2<f64>> {
        let (weights, intercept) = self.fitted()?;
        if features.ncols() != weights.nrows() {
            return Err(PipelineError::Internal(format!(
                "feature width mismatch: got {}, fitted with {}",
                features.ncols(),
                weights.nrows()
            )));
        }

        let mut scores = features.dot(weights);
        scores += intercept;
        for mut row in scores.rows_mut() {
            let max = row.fold(f64::NEG_INFINITY, |a, &b| a.max(b));
            row.mapv_inplace(|v| (v - max).exp());
            let sum = row.sum();
            if sum > 0.0 {
                row.mapv_inplace(|v| v / sum);
            }
        }
        Ok(scores)
    }

    fn feature_importances(&self) -> Result<Vec<f64>> {
        let (weights, _) = self.fitted()?;
        let importances = weights
            .mapv(f64::abs)
            .mean_axis(Axis(1))
            .ok_or_else(|| PipelineError::Internal("weight matrix has no columns".to_string()))?;
        Ok(importances.to_vec())
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Linear
    }

    fn is_fitted(&self) -> bool {
        self.weights.is_some()
    }

    fn n_features(&self) -> Option<usize> {
        self.weights.as_ref().map(|w| w.nrows())
    }
}
