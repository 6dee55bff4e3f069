//! Histogram-of-oriented-gradients (HOG) descriptor.
//!
//! ## Quickstart
//!
//! ```
//! use labvision_core::Image;
//! use labvision_hog::{HogExtractor, HogParams};
//!
//! let img = Image::from_fn(64, 64, 1, |x, y, _| ((x * 3 + y) % 256) as u8).unwrap();
//! let hog = HogExtractor::new(HogParams::default()).unwrap();
//! let features = hog.extract(&img.view()).unwrap();
//! assert_eq!(features.len(), hog.feature_len(64, 64).unwrap());
//! ```
//!
//! Pipeline, per image:
//! 1. Min-max normalize all samples into `[0, 1]`.
//! 2. Optional square-root contrast correction.
//! 3. Central-difference gradients per channel; per pixel, keep the channel
//!    with the strongest gradient.
//! 4. Unsigned orientation histograms (`[0°, 180°)`) per cell, weighted by
//!    gradient magnitude and averaged over the cell area.
//! 5. Overlapping blocks of cells (stride one cell), block-normalized.
//! 6. Flatten in block-row, block-col, cell-row, cell-col, bin order.

mod error;
mod extractor;
mod gradient;
mod histogram;
mod params;

pub use error::HogError;
pub use extractor::{FeatureVector, HogExtractor};
pub use params::{BlockNorm, HogParams};
