//! Synthetic labeled image folders for the integration tests.

use std::path::Path;

use image::{GrayImage, Luma};

/// Vertical stripes (`stripes_*`) and horizontal bars (`bars_*`), `per_class`
/// of each, written as BMP files.
pub fn write_dataset(dir: &Path, per_class: usize, phase: u32) {
    write_dataset_as(dir, per_class, phase, "bmp");
}

/// [`write_dataset`] with the codec picked from `ext`.
pub fn write_dataset_as(dir: &Path, per_class: usize, phase: u32, ext: &str) {
    for k in 0..per_class as u32 {
        let period = 5 + k % 4;
        let shift = k + phase;
        let stripes = GrayImage::from_fn(64, 64, |x, _| {
            Luma([if (x + shift) % (2 * period) < period { 210 } else { 35 }])
        });
        let bars = GrayImage::from_fn(64, 64, |_, y| {
            Luma([if (y + shift) % (2 * period) < period { 190 } else { 50 }])
        });
        stripes
            .save(dir.join(format!("stripes_{k}.{ext}")))
            .expect("write stripes");
        bars.save(dir.join(format!("bars_{k}.{ext}")))
            .expect("write bars");
    }
}
