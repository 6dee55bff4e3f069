//! Linear multi-class support vector classifier.
//!
//! Training is modelled as a type-state transition: an untrained
//! [`LinearSvc`] only holds parameters, and [`LinearSvc::fit`] consumes
//! labeled feature vectors to produce an immutable [`TrainedModel`]. There is
//! no way to predict before training.
//!
//! ```
//! use labvision_svm::{LinearSvc, SvcParams, TrainOptions};
//!
//! let x = vec![vec![0.0, 1.0], vec![0.1, 0.9], vec![1.0, 0.0], vec![0.9, 0.2]];
//! let y = ["up", "up", "right", "right"].map(String::from).to_vec();
//!
//! let model = LinearSvc::new(SvcParams::default())
//!     .fit(&x, &y, &TrainOptions::default())
//!     .unwrap();
//! assert_eq!(model.predict_one(&[0.0, 0.8]).unwrap(), "up");
//! ```
//!
//! Binary problems train one hyperplane (positive class = the second class
//! in sorted order); more classes use one-vs-rest with arg-max assignment.

mod error;
mod io;
pub mod metrics;
mod model;
mod params;
mod shared;
mod solver;
mod trainer;

pub use error::{MetricsError, ModelIoError, PredictError, TrainError};
pub use metrics::ClassificationReport;
pub use model::TrainedModel;
pub use params::{Loss, SvcParams};
pub use shared::SharedModel;
pub use trainer::{CancelToken, LinearSvc, TrainOptions};
