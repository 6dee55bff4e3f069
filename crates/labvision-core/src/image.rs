use serde::{Deserialize, Serialize};

/// Errors raised when wrapping a raw sample buffer.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("invalid image dimensions (width={width}, height={height}, channels={channels})")]
    InvalidDimensions {
        width: usize,
        height: usize,
        channels: usize,
    },
    #[error("invalid image buffer length (expected {expected} samples, got {got})")]
    InvalidBuffer { expected: usize, got: usize },
}

fn expected_len(width: usize, height: usize, channels: usize) -> Result<usize, ImageError> {
    if width == 0 || height == 0 || !(channels == 1 || channels == 3) {
        return Err(ImageError::InvalidDimensions {
            width,
            height,
            channels,
        });
    }
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(channels))
        .ok_or(ImageError::InvalidDimensions {
            width,
            height,
            channels,
        })
}

/// Borrowed 8-bit image, row-major with interleaved channels.
#[derive(Clone, Copy, Debug)]
pub struct ImageView<'a> {
    pub width: usize,
    pub height: usize,
    /// 1 (gray) or 3 (RGB).
    pub channels: usize,
    pub data: &'a [u8], // len = w*h*c
}

impl<'a> ImageView<'a> {
    pub fn new(
        width: usize,
        height: usize,
        channels: usize,
        data: &'a [u8],
    ) -> Result<Self, ImageError> {
        let expected = expected_len(width, height, channels)?;
        if data.len() != expected {
            return Err(ImageError::InvalidBuffer {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, c: usize) -> u8 {
        self.data[(y * self.width + x) * self.channels + c]
    }

    /// `(width, height, channels)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.width, self.height, self.channels)
    }

    /// Min-max normalize every sample (all channels together) into `[0, 1]`.
    ///
    /// A constant image maps to all zeros.
    pub fn normalize_min_max(&self) -> ImageF32 {
        let (lo, hi) = self
            .data
            .iter()
            .fold((u8::MAX, u8::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let lo = f64::from(lo);
        let range = f64::from(hi) - lo;
        let scale = if range > f64::EPSILON { 1.0 / range } else { 0.0 };

        let data = self
            .data
            .iter()
            .map(|&v| ((f64::from(v) - lo) * scale) as f32)
            .collect();

        ImageF32 {
            width: self.width,
            height: self.height,
            channels: self.channels,
            data,
        }
    }
}

/// Owned 8-bit image.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub data: Vec<u8>,
}

impl Image {
    pub fn new(
        width: usize,
        height: usize,
        channels: usize,
        data: Vec<u8>,
    ) -> Result<Self, ImageError> {
        ImageView::new(width, height, channels, &data)?;
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Build an image by evaluating `f(x, y, c)` for every sample.
    pub fn from_fn(
        width: usize,
        height: usize,
        channels: usize,
        mut f: impl FnMut(usize, usize, usize) -> u8,
    ) -> Result<Self, ImageError> {
        let len = expected_len(width, height, channels)?;
        let mut data = Vec::with_capacity(len);
        for y in 0..height {
            for x in 0..width {
                for c in 0..channels {
                    data.push(f(x, y, c));
                }
            }
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn view(&self) -> ImageView<'_> {
        ImageView {
            width: self.width,
            height: self.height,
            channels: self.channels,
            data: &self.data,
        }
    }
}

/// Floating point image produced by normalization.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageF32 {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub data: Vec<f32>,
}

impl ImageF32 {
    #[inline]
    pub fn get(&self, x: usize, y: usize, c: usize) -> f32 {
        self.data[(y * self.width + x) * self.channels + c]
    }

    /// Copy one channel out as a dense row-major plane.
    pub fn channel(&self, c: usize) -> Vec<f32> {
        self.data
            .iter()
            .skip(c)
            .step_by(self.channels)
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_buffer_length() {
        let err = ImageView::new(4, 4, 1, &[0u8; 15]).unwrap_err();
        assert_eq!(
            err,
            ImageError::InvalidBuffer {
                expected: 16,
                got: 15
            }
        );
    }

    #[test]
    fn rejects_unsupported_channel_count() {
        assert!(matches!(
            Image::new(2, 2, 2, vec![0; 8]),
            Err(ImageError::InvalidDimensions { channels: 2, .. })
        ));
    }

    #[test]
    fn min_max_spans_unit_range_across_channels() {
        let img = Image::from_fn(2, 1, 3, |x, _, c| (10 + 20 * x + 5 * c) as u8).unwrap();
        let norm = img.view().normalize_min_max();
        let lo = norm.data.iter().cloned().fold(f32::INFINITY, f32::min);
        let hi = norm.data.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        assert_eq!(lo, 0.0);
        assert!((hi - 1.0).abs() < 1e-6);
        // channels share one range: (20 - 10) / (40 - 10)
        assert!((norm.get(0, 0, 2) - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn constant_image_normalizes_to_zero() {
        let img = Image::new(3, 3, 1, vec![77; 9]).unwrap();
        let norm = img.view().normalize_min_max();
        assert!(norm.data.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn channel_extracts_plane() {
        let img = Image::from_fn(2, 2, 3, |x, y, c| (x + 2 * y + 10 * c) as u8).unwrap();
        let norm = ImageF32 {
            width: 2,
            height: 2,
            channels: 3,
            data: img.data.iter().map(|&v| v as f32).collect(),
        };
        assert_eq!(norm.channel(1), vec![10.0, 11.0, 12.0, 13.0]);
    }
}
