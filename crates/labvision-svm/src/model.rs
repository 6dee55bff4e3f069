use serde::{Deserialize, Serialize};

use crate::{PredictError, SvcParams};

/// Immutable result of [`crate::LinearSvc::fit`].
///
/// Holds one weight row and intercept per hyperplane: a single row for two
/// classes, one row per class otherwise.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    classes: Vec<String>,
    weights: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
    n_features: usize,
    params: SvcParams,
}

impl TrainedModel {
    pub(crate) fn from_parts(
        classes: Vec<String>,
        weights: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
        n_features: usize,
        params: SvcParams,
    ) -> Self {
        Self {
            classes,
            weights,
            intercepts,
            n_features,
            params,
        }
    }

    /// Sorted class labels.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn weights(&self) -> &[Vec<f64>] {
        &self.weights
    }

    pub fn intercepts(&self) -> &[f64] {
        &self.intercepts
    }

    /// Parameters the model was trained with.
    pub fn params(&self) -> &SvcParams {
        &self.params
    }

    fn check_dim(&self, index: usize, x: &[f64]) -> Result<(), PredictError> {
        if x.len() != self.n_features {
            return Err(PredictError::DimensionMismatch {
                index,
                expected: self.n_features,
                got: x.len(),
            });
        }
        Ok(())
    }

    fn scores(&self, x: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.intercepts)
            .map(|(w, b)| w.iter().zip(x).map(|(a, v)| a * v).sum::<f64>() + b)
            .collect()
    }

    /// Signed distance-like score per hyperplane.
    pub fn decision_function(&self, x: &[f64]) -> Result<Vec<f64>, PredictError> {
        self.check_dim(0, x)?;
        Ok(self.scores(x))
    }

    fn assign(&self, scores: &[f64]) -> &str {
        if let [score] = scores {
            let idx = usize::from(*score > 0.0);
            return &self.classes[idx];
        }
        let mut best = 0;
        for (k, s) in scores.iter().enumerate().skip(1) {
            if *s > scores[best] {
                best = k;
            }
        }
        &self.classes[best]
    }

    pub fn predict_one(&self, x: &[f64]) -> Result<String, PredictError> {
        self.check_dim(0, x)?;
        Ok(self.assign(&self.scores(x)).to_owned())
    }

    /// Predict one label per vector. Any mismatched length fails the whole
    /// call.
    pub fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<String>, PredictError> {
        for (index, x) in features.iter().enumerate() {
            self.check_dim(index, x)?;
        }
        Ok(features
            .iter()
            .map(|x| self.assign(&self.scores(x)).to_owned())
            .collect())
    }

    /// Structural consistency, used when a model comes from outside.
    pub(crate) fn check_consistency(&self) -> Result<(), String> {
        if self.classes.len() < 2 {
            return Err(format!("need >= 2 classes, got {}", self.classes.len()));
        }
        let expected_rows = if self.classes.len() == 2 {
            1
        } else {
            self.classes.len()
        };
        if self.weights.len() != expected_rows || self.intercepts.len() != expected_rows {
            return Err(format!(
                "expected {expected_rows} hyperplane(s), got {} weight rows and {} intercepts",
                self.weights.len(),
                self.intercepts.len()
            ));
        }
        if let Some(row) = self.weights.iter().position(|w| w.len() != self.n_features) {
            return Err(format!(
                "weight row {row} has length {}, expected {}",
                self.weights[row].len(),
                self.n_features
            ));
        }
        Ok(())
    }
}
