//! Core types shared by the labvision crates.
//!
//! This crate is intentionally small. It owns the interleaved image
//! containers consumed by the feature extractor and the logger setup used by
//! the binaries. It does *not* depend on any image codec.

mod image;
mod logger;

pub use image::{Image, ImageError, ImageF32, ImageView};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
