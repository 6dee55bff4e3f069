//! Dual coordinate descent for one binary L2-regularized SVC problem
//! (Hsieh et al., 2008), with shrinking.
//!
//! Dual: `min ½αᵀQ̄α − eᵀα`, `0 ≤ αᵢ ≤ U`, where `Q̄ = Q + D`,
//! `Qᵢⱼ = yᵢyⱼxᵢᵀxⱼ`. Hinge loss: `U = C`, `D = 0`.
//! Squared hinge: `U = ∞`, `Dᵢᵢ = 1 / (2C)`.

use log::debug;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_pcg::Pcg64;

use crate::{Loss, SvcParams, TrainError};

/// Solution of one binary problem.
#[derive(Clone, Debug)]
pub(crate) struct BinarySolution {
    /// Weights over the original features.
    pub weights: Vec<f64>,
    /// Final intercept (`w_bias * intercept_scaling`).
    pub intercept: f64,
    pub iterations: usize,
}

/// Why the solver stopped without converging.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum SolverStop {
    MaxIter,
    Interrupted(TrainError),
}

pub(crate) struct BinaryProblem<'a> {
    pub x: &'a [Vec<f64>],
    /// `+1.0` or `-1.0` per sample.
    pub y: &'a [f64],
    pub n_features: usize,
}

#[inline]
fn dot(w: &[f64], x: &[f64]) -> f64 {
    w.iter().zip(x).map(|(a, b)| a * b).sum()
}

/// Run the solver. `interrupt` is polled once per outer pass; returning
/// `Some` aborts with that error.
pub(crate) fn solve_binary(
    problem: &BinaryProblem<'_>,
    params: &SvcParams,
    seed: u64,
    interrupt: &dyn Fn() -> Option<TrainError>,
) -> Result<BinarySolution, SolverStop> {
    let l = problem.x.len();
    let n = problem.n_features;
    let bias = if params.fit_intercept {
        params.intercept_scaling
    } else {
        0.0
    };

    let (upper, diag) = match params.loss {
        Loss::Hinge => (params.c, 0.0),
        Loss::SquaredHinge => (f64::INFINITY, 0.5 / params.c),
    };

    let qd: Vec<f64> = problem
        .x
        .iter()
        .map(|xi| diag + dot(xi, xi) + bias * bias)
        .collect();

    let mut w = vec![0.0; n];
    let mut w_bias = 0.0;
    let mut alpha = vec![0.0; l];
    let mut index: Vec<usize> = (0..l).collect();
    let mut active = l;
    let mut pg_max_old = f64::INFINITY;
    let mut pg_min_old = f64::NEG_INFINITY;
    let mut rng = Pcg64::seed_from_u64(seed);

    let mut iter = 0;
    while iter < params.max_iter {
        if let Some(err) = interrupt() {
            return Err(SolverStop::Interrupted(err));
        }

        let mut pg_max_new = f64::NEG_INFINITY;
        let mut pg_min_new = f64::INFINITY;
        index[..active].shuffle(&mut rng);

        let mut s = 0;
        while s < active {
            let i = index[s];
            let yi = problem.y[i];
            let xi = &problem.x[i];

            let g = yi * (dot(&w, xi) + w_bias * bias) - 1.0 + alpha[i] * diag;

            let mut pg = 0.0;
            if alpha[i] == 0.0 {
                if g > pg_max_old {
                    active -= 1;
                    index.swap(s, active);
                    continue;
                }
                if g < 0.0 {
                    pg = g;
                }
            } else if alpha[i] == upper {
                if g < pg_min_old {
                    active -= 1;
                    index.swap(s, active);
                    continue;
                }
                if g > 0.0 {
                    pg = g;
                }
            } else {
                pg = g;
            }

            pg_max_new = pg_max_new.max(pg);
            pg_min_new = pg_min_new.min(pg);

            if pg.abs() > 1e-12 && qd[i] > 0.0 {
                let old = alpha[i];
                alpha[i] = (alpha[i] - g / qd[i]).max(0.0).min(upper);
                let d = (alpha[i] - old) * yi;
                for (wj, xj) in w.iter_mut().zip(xi) {
                    *wj += d * xj;
                }
                w_bias += d * bias;
            }
            s += 1;
        }

        iter += 1;
        let gap = pg_max_new - pg_min_new;
        debug!("dcd pass {iter}: gap {gap:.3e}, active {active}/{l}");

        if gap <= params.tol {
            if active == l {
                return Ok(BinarySolution {
                    weights: w,
                    intercept: w_bias * bias,
                    iterations: iter,
                });
            }
            // Shrunk set converged; re-check on the full set.
            active = l;
            pg_max_old = f64::INFINITY;
            pg_min_old = f64::NEG_INFINITY;
            continue;
        }

        pg_max_old = if pg_max_new <= 0.0 {
            f64::INFINITY
        } else {
            pg_max_new
        };
        pg_min_old = if pg_min_new >= 0.0 {
            f64::NEG_INFINITY
        } else {
            pg_min_new
        };
    }

    Err(SolverStop::MaxIter)
}
