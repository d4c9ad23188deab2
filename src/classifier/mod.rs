//! Classifier strategies.
//!
//! Two interchangeable model families sit behind one interface: a bagged
//! decision-tree ensemble and a multinomial logistic regression. The trainer
//! and predictor depend only on [`ClassifierStrategy`]; the serializable
//! [`PriorityClassifier`] enum carries whichever model was fitted inside the
//! artifact.

pub mod forest;
pub mod linear;

use std::str::FromStr;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::config::TrainConfig;
use crate::error::{PipelineError, Result};

pub use forest::{ForestParams, TreeEnsembleModel};
pub use linear::{LinearModel, LinearParams};

/// Which classifier family to fit.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    EnumString,
    Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ModelKind {
    #[default]
    TreeEnsemble,
    Linear,
}

impl ModelKind {
    /// Parse a configuration string. An unrecognized name is a configuration
    /// error, surfaced before any training work begins.
    pub fn parse(value: &str) -> Result<Self> {
        Self::from_str(value).map_err(|_| {
            PipelineError::Config(format!(
                "unrecognized model_type: {:?} (expected tree_ensemble or linear)",
                value
            ))
        })
    }
}

/// Common interface over the classifier families.
pub trait ClassifierStrategy: Send + Sync {
    /// Fit on an assembled feature matrix and integer class labels.
    fn fit(&mut self, features: &Array2<f64>, labels: &Array1<usize>) -> Result<()>;

    /// Per-row class probabilities. Columns follow the label encoding;
    /// each row sums to 1.
    fn predict_proba(&self, features: &Array2<f64>) -> Result<Array2<f64>>;

    /// Per-column importance scores over the assembled feature space.
    fn feature_importances(&self) -> Result<Vec<f64>>;

    /// Which family this model belongs to.
    fn kind(&self) -> ModelKind;

    /// Whether `fit` has completed successfully.
    fn is_fitted(&self) -> bool;

    /// Feature width the model was fitted with, once fitted.
    fn n_features(&self) -> Option<usize>;
}

/// Serializable classifier, selected by [`ModelKind`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PriorityClassifier {
    TreeEnsemble(TreeEnsembleModel),
    Linear(LinearModel),
}

impl PriorityClassifier {
    /// Build an unfitted classifier for the configured model type.
    pub fn new(config: &TrainConfig) -> Self {
        match config.model_type {
            ModelKind::TreeEnsemble => {
                Self::TreeEnsemble(TreeEnsembleModel::new(config.forest.clone(), config.seed))
            }
            ModelKind::Linear => Self::Linear(LinearModel::new(config.linear.clone())),
        }
    }

    fn inner(&self) -> &dyn ClassifierStrategy {
        match self {
            Self::TreeEnsemble(model) => model,
            Self::Linear(model) => model,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn ClassifierStrategy {
        match self {
            Self::TreeEnsemble(model) => model,
            Self::Linear(model) => model,
        }
    }
}

impl ClassifierStrategy for PriorityClassifier {
    fn fit(&mut self, features: &Array2<f64>, labels: &Array1<usize>) -> Result<()> {
        self.inner_mut().fit(features, labels)
    }

    fn predict_proba(&self, features: &Array2<f64>) -> Result<Array2<f64>> {
        self.inner().predict_proba(features)
    }

    fn feature_importances(&self) -> Result<Vec<f64>> {
        self.inner().feature_importances()
    }

    fn kind(&self) -> ModelKind {
        self.inner().kind()
    }

    fn is_fitted(&self) -> bool {
        self.inner().is_fitted()
    }

    fn n_features(&self) -> Option<usize> {
        self.inner().n_features()
    }
}
