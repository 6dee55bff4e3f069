//! High-level facade crate for the `labvision-*` workspace.
//!
//! This crate provides:
//! - re-exports of the HOG extractor, the linear SVC and the pose algebra
//! - (feature-gated) a folder-based dataset loader and an end-to-end
//!   train/classify/evaluate pipeline on top of the `image` codecs
//! - a small frame-vote aggregator for turning per-frame predictions into
//!   decisions
//!
//! ## Quickstart
//!
//! ```no_run
//! use labvision::pipeline::{ImageClassifier, TrainedClassifier};
//! use labvision::{hog::HogParams, svm::SvcParams};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let clf = ImageClassifier::new(HogParams::default(), SvcParams::default())?;
//! let trained = clf.train_from_dir("train/")?;
//! trained.write_json("model.json")?;
//!
//! let report = TrainedClassifier::load_json("model.json")?.evaluate_dir("test/")?;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `labvision::core`: image containers and logger setup.
//! - `labvision::hog`: HOG descriptor extraction.
//! - `labvision::svm`: linear SVC training, prediction, metrics, model files.
//! - `labvision::pose`: relative pose and goal composition.
//! - `labvision::dataset` (feature `image`): labeled image folders.
//! - `labvision::pipeline` (feature `image`): HOG + SVC end to end.
//! - `labvision::vote`: majority vote over frame predictions.

pub use labvision_core as core;
pub use labvision_hog as hog;
pub use labvision_pose as pose;
pub use labvision_svm as svm;

pub use labvision_hog::{HogExtractor, HogParams};
pub use labvision_pose::{compose_goal_zyx, relative_pose_zxy, Pose, RelativePose};
pub use labvision_svm::{LinearSvc, SvcParams, TrainedModel};

#[cfg(feature = "image")]
pub mod dataset;
#[cfg(feature = "image")]
pub mod pipeline;
pub mod vote;
