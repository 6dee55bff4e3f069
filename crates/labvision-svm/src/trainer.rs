use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::info;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::solver::{solve_binary, BinaryProblem, SolverStop};
use crate::{SvcParams, TrainError, TrainedModel};

/// Cooperative cancellation flag shared between a trainer and its caller.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Caller-side limits on a training run.
#[derive(Clone, Debug, Default)]
pub struct TrainOptions {
    /// Wall-clock budget for the whole fit.
    pub deadline: Option<Duration>,
    pub cancel: Option<CancelToken>,
}

/// Untrained linear SVC: parameters only.
#[derive(Clone, Debug, Default)]
pub struct LinearSvc {
    params: SvcParams,
}

impl LinearSvc {
    pub fn new(params: SvcParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &SvcParams {
        &self.params
    }

    /// Fit one hyperplane (two classes) or one per class (one-vs-rest).
    ///
    /// Classes are the sorted distinct labels. Fewer than two classes is an
    /// error; no constant model is produced.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip_all, fields(samples = features.len()))
    )]
    pub fn fit(
        &self,
        features: &[Vec<f64>],
        labels: &[String],
        options: &TrainOptions,
    ) -> Result<TrainedModel, TrainError> {
        self.params.validate()?;
        let n_features = validate_inputs(features, labels)?;

        let classes: Vec<String> = labels
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if classes.len() < 2 {
            return Err(TrainError::SingleClass {
                label: classes.into_iter().next().unwrap_or_default(),
            });
        }

        let started = Instant::now();
        let interrupt = || {
            if options.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                return Some(TrainError::Cancelled);
            }
            match options.deadline {
                Some(limit) if started.elapsed() >= limit => Some(TrainError::Timeout(limit)),
                _ => None,
            }
        };

        // Two classes share one hyperplane whose positive side is classes[1].
        let positives: Vec<&String> = if classes.len() == 2 {
            vec![&classes[1]]
        } else {
            classes.iter().collect()
        };

        let mut weights = Vec::with_capacity(positives.len());
        let mut intercepts = Vec::with_capacity(positives.len());
        for (k, positive) in positives.into_iter().enumerate() {
            let y: Vec<f64> = labels
                .iter()
                .map(|l| if l == positive { 1.0 } else { -1.0 })
                .collect();
            let problem = BinaryProblem {
                x: features,
                y: &y,
                n_features,
            };
            let seed = self.params.seed.wrapping_add(k as u64);
            let solution =
                solve_binary(&problem, &self.params, seed, &interrupt).map_err(|stop| match stop {
                    SolverStop::MaxIter => TrainError::Convergence {
                        class: positive.clone(),
                        iterations: self.params.max_iter,
                    },
                    SolverStop::Interrupted(err) => err,
                })?;
            info!(
                "class {positive:?}: converged after {} passes",
                solution.iterations
            );
            weights.push(solution.weights);
            intercepts.push(solution.intercept);
        }

        info!(
            "trained {} hyperplane(s) over {} samples x {} features in {:.3}s",
            weights.len(),
            features.len(),
            n_features,
            started.elapsed().as_secs_f64()
        );

        Ok(TrainedModel::from_parts(
            classes,
            weights,
            intercepts,
            n_features,
            self.params.clone(),
        ))
    }
}

fn validate_inputs(features: &[Vec<f64>], labels: &[String]) -> Result<usize, TrainError> {
    if features.len() != labels.len() {
        return Err(TrainError::LengthMismatch {
            features: features.len(),
            labels: labels.len(),
        });
    }
    let first = features.first().ok_or(TrainError::EmptyTrainingSet)?;
    let n = first.len();
    if n == 0 {
        return Err(TrainError::EmptyFeatureVector);
    }
    for (index, x) in features.iter().enumerate() {
        if x.len() != n {
            return Err(TrainError::DimensionMismatch {
                index,
                expected: n,
                got: x.len(),
            });
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(TrainError::NonFinite { index });
        }
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Loss;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    /// Three well separated clusters in 3D.
    fn three_blobs() -> (Vec<Vec<f64>>, Vec<String>) {
        let centers = [
            ("drone", [4.0, 0.0, 0.0]),
            ("order", [0.0, 4.0, 0.0]),
            ("none", [0.0, 0.0, 4.0]),
        ];
        let offsets = [
            [0.3, -0.2, 0.1],
            [-0.25, 0.15, 0.2],
            [0.1, 0.3, -0.3],
            [-0.1, -0.3, -0.1],
        ];
        let mut x = Vec::new();
        let mut y = Vec::new();
        for (label, c) in centers {
            for o in offsets {
                x.push(vec![c[0] + o[0], c[1] + o[1], c[2] + o[2]]);
                y.push(label.to_string());
            }
        }
        (x, y)
    }

    #[test]
    fn one_vs_rest_recovers_training_labels() {
        let (x, y) = three_blobs();
        let model = LinearSvc::default()
            .fit(&x, &y, &TrainOptions::default())
            .expect("fit");
        assert_eq!(model.classes(), &labels(&["drone", "none", "order"])[..]);
        assert_eq!(model.weights().len(), 3);
        assert_eq!(model.predict(&x).unwrap(), y);
    }

    #[test]
    fn binary_problem_uses_single_hyperplane() {
        let x = vec![vec![-1.0], vec![-2.0], vec![1.0], vec![2.0]];
        let y = labels(&["left", "left", "right", "right"]);
        for loss in [Loss::Hinge, Loss::SquaredHinge] {
            let svc = LinearSvc::new(SvcParams {
                loss,
                ..SvcParams::default()
            });
            let model = svc.fit(&x, &y, &TrainOptions::default()).unwrap();
            assert_eq!(model.weights().len(), 1);
            // positive side is the second class in sorted order
            assert!(model.weights()[0][0] > 0.0);
            assert_eq!(model.predict(&x).unwrap(), y);
        }
    }

    #[test]
    fn single_class_is_an_error() {
        let x = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let y = labels(&["none", "none"]);
        let err = LinearSvc::default()
            .fit(&x, &y, &TrainOptions::default())
            .unwrap_err();
        assert_eq!(
            err,
            TrainError::SingleClass {
                label: "none".into()
            }
        );
    }

    #[test]
    fn input_validation() {
        let svc = LinearSvc::default();
        let opts = TrainOptions::default();

        assert_eq!(
            svc.fit(&[], &[], &opts).unwrap_err(),
            TrainError::EmptyTrainingSet
        );
        assert_eq!(
            svc.fit(&[vec![1.0]], &labels(&["a", "b"]), &opts)
                .unwrap_err(),
            TrainError::LengthMismatch {
                features: 1,
                labels: 2
            }
        );
        assert_eq!(
            svc.fit(&[vec![1.0, 2.0], vec![1.0]], &labels(&["a", "b"]), &opts)
                .unwrap_err(),
            TrainError::DimensionMismatch {
                index: 1,
                expected: 2,
                got: 1
            }
        );
        assert_eq!(
            svc.fit(&[vec![1.0], vec![f64::NAN]], &labels(&["a", "b"]), &opts)
                .unwrap_err(),
            TrainError::NonFinite { index: 1 }
        );
    }

    #[test]
    fn exhausted_iterations_discard_the_model() {
        let (x, y) = three_blobs();
        let svc = LinearSvc::new(SvcParams {
            max_iter: 1,
            tol: 1e-300,
            ..SvcParams::default()
        });
        let err = svc.fit(&x, &y, &TrainOptions::default()).unwrap_err();
        assert!(matches!(err, TrainError::Convergence { iterations: 1, .. }));
    }

    #[test]
    fn cancelled_token_stops_training() {
        let (x, y) = three_blobs();
        let token = CancelToken::new();
        token.cancel();
        let opts = TrainOptions {
            cancel: Some(token),
            ..TrainOptions::default()
        };
        assert_eq!(
            LinearSvc::default().fit(&x, &y, &opts).unwrap_err(),
            TrainError::Cancelled
        );
    }

    #[test]
    fn zero_deadline_times_out() {
        let (x, y) = three_blobs();
        let opts = TrainOptions {
            deadline: Some(Duration::ZERO),
            ..TrainOptions::default()
        };
        let err = LinearSvc::default().fit(&x, &y, &opts).unwrap_err();
        assert!(matches!(err, TrainError::Timeout(_)), "{err:?}");
    }
}
