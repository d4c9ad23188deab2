use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::Priority;

/// Outcome of classifying one email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Predicted priority class.
    pub priority: Priority,

    /// Probability of the predicted class, in [0, 1].
    pub confidence: f64,

    /// Full class-probability distribution keyed by class name.
    pub probabilities: HashMap<String, f64>,
}

impl PredictionResult {
    /// Build a result from one row of class probabilities in
    /// [`Priority::ALL`] column order. The predicted class is the argmax and
    /// its probability becomes the confidence.
    pub fn from_distribution(row: &[f64]) -> Self {
        debug_assert_eq!(row.len(), Priority::COUNT);
        let mut best = 0;
        for (index, &p) in row.iter().enumerate() {
            if p > row[best] {
                best = index;
            }
        }
        let priority = Priority::from_index(best).unwrap_or(Priority::Medium);
        let probabilities = Priority::ALL
            .iter()
            .zip(row.iter())
            .map(|(class, &p)| (class.to_string(), p))
            .collect();
        Self {
            priority,
            confidence: row[best],
            probabilities,
        }
    }

    /// Probability assigned to a given class.
    pub fn probability_of(&self, priority: Priority) -> f64 {
        self.probabilities
            .get(&priority.to_string())
            .copied()
            .unwrap_or(0.0)
    }
}
