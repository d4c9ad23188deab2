//! Bagged decision-tree ensemble.
//!
//! Trains Gini decision trees on seeded bootstrap samples of the training
//! set. Class probabilities are the fraction of trees voting for each class;
//! feature importances are the per-tree impurity importances averaged across
//! the ensemble. The same seed always reproduces the same forest.

use linfa::traits::{Fit, Predict};
use linfa::Dataset;
use linfa_trees::{DecisionTree, SplitQuality};
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::classifier::{ClassifierStrategy, ModelKind};
use crate::error::{PipelineError, Result};
use crate::models::Priority;

/// Tree-ensemble hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    /// Number of bagged trees.
    #[serde(default = "default_n_estimators")]
    pub n_estimators: usize,

    /// Maximum tree depth.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Minimum samples required to split a node.
    #[serde(default = "default_min_samples_split")]
    pub min_samples_split: usize,

    /// Minimum samples required at a leaf.
    #[serde(default = "default_min_samples_leaf")]
    pub min_samples_leaf: usize,
}

fn default_n_estimators() -> usize {
    100
}

fn default_max_depth() -> usize {
    20
}

fn default_min_samples_split() -> usize {
    5
}

fn default_min_samples_leaf() -> usize {
    2
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: default_n_estimators(),
            max_depth: default_max_depth(),
            min_samples_split: default_min_samples_split(),
            min_samples_leaf: default_min_samples_leaf(),
        }
    }
}

/// Bagged forest of Gini decision trees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeEnsembleModel {
    params: ForestParams,
    seed: u64,
    trees: Vec<DecisionTree<f64, usize>>,
    n_features: Option<usize>,
}

impl TreeEnsembleModel {
    pub fn new(params: ForestParams, seed: u64) -> Self {
        Self {
            params,
            seed,
            trees: Vec::new(),
            n_features: None,
        }
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl ClassifierStrategy for TreeEnsembleModel {
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
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut trees = Vec::with_capacity(self.params.n_estimators);
        for sample in dataset
            .bootstrap_samples(features.nrows(), &mut rng)
            .take(self.params.n_estimators)
        {
            let tree = DecisionTree::params()
                .split_quality(SplitQuality::Gini)
                .max_depth(Some(self.params.max_depth))
                .min_weight_split(self.params.min_samples_split as f32)
                .min_weight_leaf(self.params.min_samples_leaf as f32)
                .fit(&sample)
                .map_err(|e| {
                    PipelineError::Internal(format!("decision tree fit failed: {}", e))
                })?;
            trees.push(tree);
        }

        self.trees = trees;
        self.n_features = Some(features.ncols());
        Ok(())
    }

    fn predict_proba(&self, features: &Array2<f64>) -> Result<Array2<f64>> {
        if self.trees.is_empty() {
            return Err(PipelineError::Data(
                "classifier has not been fitted".to_string(),
            ));
        }
        if let Some(width) = self.n_features {
            if features.ncols() != width {
                return Err(PipelineError::Internal(format!(
                    "feature width mismatch: got {}, fitted with {}",
                    features.ncols(),
                    width
                )));
            }
        }

        let mut proba = Array2::<f64>::zeros((features.nrows(), Priority::COUNT));
        for tree in &self.trees {
            let votes = tree.predict(features);
            for (row, &class) in votes.iter().enumerate() {
                proba[[row, class]] += 1.0;
            }
        }
        let n_trees = self.trees.len() as f64;
        proba.mapv_inplace(|v| v / n_trees);
        Ok(proba)
    }

    fn feature_importances(&self) -> Result<Vec<f64>> {
        if self.trees.is_empty() {
            return Err(PipelineError::Data(
                "classifier has not been fitted".to_string(),
            ));
        }
        let width = self.n_features.unwrap_or(0);
        let mut totals = vec![0.0; width];
        for tree in &self.trees {
            for (column, value) in tree.feature_importance().into_iter().enumerate() {
                if column < width {
                    totals[column] += value;
                }
            }
        }
        let n_trees = self.trees.len() as f64;
        for total in &mut totals {
            *total /= n_trees;
        }
        Ok(totals)
    }

    fn kind(&self) -> ModelKind {
        ModelKind::TreeEnsemble
    }

    fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    fn n_features(&self) -> Option<usize> {
        self.n_features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn small_forest() -> TreeEnsembleModel {
        let params = ForestParams {
            n_estimators: 15,
            max_depth: 5,
            min_samples_split: 2,
            min_samples_leaf: 1,
        };
        TreeEnsembleModel::new(params, 7)
    }

    fn separable_data() -> (Array2<f64>, Array1<usize>) {
        // three clusters on one axis
        let features = array![
            [0.0, 1.0],
            [0.1, 0.9],
            [0.2, 1.1],
            [0.1, 1.0],
            [5.0, 0.0],
            [5.1, 0.2],
            [5.2, 0.1],
            [4.9, 0.0],
            [10.0, 1.0],
            [10.1, 0.8],
            [10.2, 1.1],
            [9.9, 0.9],
        ];
        let labels = array![0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2];
        (features, labels)
    }

    #[test]
    fn test_fit_and_predict_separable_clusters() {
        let (features, labels) = separable_data();
        let mut model = small_forest();
        model.fit(&features, &labels).expect("fit");
        assert!(model.is_fitted());
        assert_eq!(model.n_features(), Some(2));
        assert_eq!(model.n_trees(), 15);

        let proba = model.predict_proba(&features).expect("predict");
        assert_eq!(proba.shape(), &[12, 3]);
        for row in 0..12 {
            let sum: f64 = (0..3).map(|c| proba[[row, c]]).sum();
            assert!((sum - 1.0).abs() < 1e-9);
        }
        // the first cluster should vote class 0 overwhelmingly
        assert!(proba[[0, 0]] > 0.5);
        assert!(proba[[5, 1]] > 0.5);
        assert!(proba[[10, 2]] > 0.5);
    }

    #[test]
    fn test_same_seed_reproduces_probabilities() {
        let (features, labels) = separable_data();
        let mut a = small_forest();
        let mut b = small_forest();
        a.fit(&features, &labels).expect("fit");
        b.fit(&features, &labels).expect("fit");
        let pa = a.predict_proba(&features).expect("predict");
        let pb = b.predict_proba(&features).expect("predict");
        assert_eq!(pa, pb);
    }

    #[test]
    fn test_unfitted_predict_is_a_data_error() {
        let model = small_forest();
        let err = model
            .predict_proba(&Array2::zeros((1, 2)))
            .unwrap_err();
        assert_eq!(err.error_code(), "DATA_ERROR");
    }

    #[test]
    fn test_importances_cover_every_column() {
        let (features, labels) = separable_data();
        let mut model = small_forest();
        model.fit(&features, &labels).expect("fit");
        let importances = model.feature_importances().expect("importances");
        assert_eq!(importances.len(), 2);
        // the separating axis should dominate
        assert!(importances[0] > importances[1]);
    }
}
