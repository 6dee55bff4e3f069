use serde::{Deserialize, Serialize};

use crate::TrainError;

/// Per-sample loss of the primal problem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Loss {
    /// `max(0, 1 - y wᵀx)`.
    Hinge,
    /// `max(0, 1 - y wᵀx)²`.
    #[default]
    SquaredHinge,
}

/// Parameters of the L2-regularized linear SVC.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvcParams {
    /// Inverse regularization strength.
    pub c: f64,
    pub loss: Loss,
    /// Stop once the projected-gradient gap falls below this value.
    pub tol: f64,
    /// Maximum outer passes over the data per hyperplane.
    pub max_iter: usize,
    /// Learn an intercept through an augmented constant feature.
    pub fit_intercept: bool,
    /// Value of the augmented feature. The intercept is regularized like
    /// any other weight, so larger values weaken that regularization.
    pub intercept_scaling: f64,
    /// Seed for the per-pass coordinate shuffle.
    pub seed: u64,
}

impl Default for SvcParams {
    fn default() -> Self {
        Self {
            c: 0.5,
            loss: Loss::SquaredHinge,
            tol: 1e-4,
            max_iter: 1000,
            fit_intercept: true,
            intercept_scaling: 1.0,
            seed: 0,
        }
    }
}

impl SvcParams {
    pub fn validate(&self) -> Result<(), TrainError> {
        if !(self.c.is_finite() && self.c > 0.0) {
            return Err(TrainError::InvalidParams("c must be finite and > 0"));
        }
        if !(self.tol.is_finite() && self.tol > 0.0) {
            return Err(TrainError::InvalidParams("tol must be finite and > 0"));
        }
        if self.max_iter == 0 {
            return Err(TrainError::InvalidParams("max_iter must be > 0"));
        }
        if self.fit_intercept && !self.intercept_scaling.is_finite() {
            return Err(TrainError::InvalidParams("intercept_scaling must be finite"));
        }
        Ok(())
    }
}
