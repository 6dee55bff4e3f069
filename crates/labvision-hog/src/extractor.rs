use labvision_core::{ImageF32, ImageView};
use log::debug;

#[cfg(feature = "rayon")]
use rayon::prelude::*;
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::gradient::dominant_gradient;
use crate::histogram::{cell_histograms, normalized_blocks};
use crate::{HogError, HogParams};

/// One descriptor per image.
pub type FeatureVector = Vec<f64>;

/// Stateless HOG extractor. Cheap to clone and safe to share across threads.
#[derive(Clone, Debug)]
pub struct HogExtractor {
    params: HogParams,
}

impl Default for HogExtractor {
    fn default() -> Self {
        Self {
            params: HogParams::default(),
        }
    }
}

impl HogExtractor {
    pub fn new(params: HogParams) -> Result<Self, HogError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &HogParams {
        &self.params
    }

    /// Descriptor length for an image of the given size; pixels are not read.
    pub fn feature_len(&self, width: usize, height: usize) -> Result<usize, HogError> {
        let (rows, cols) = self.block_grid(width, height)?;
        Ok(rows * cols * self.params.block_len())
    }

    fn block_grid(&self, width: usize, height: usize) -> Result<(usize, usize), HogError> {
        let [cell_h, cell_w] = self.params.pixels_per_cell;
        let [b_rows, b_cols] = self.params.cells_per_block;
        let cells_rows = height / cell_h;
        let cells_cols = width / cell_w;
        if cells_rows < b_rows || cells_cols < b_cols {
            return Err(HogError::ImageTooSmall {
                width,
                height,
                cells_rows,
                cells_cols,
            });
        }
        Ok((cells_rows + 1 - b_rows, cells_cols + 1 - b_cols))
    }

    /// Extract the descriptor of one 8-bit image.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, img), fields(width = img.width, height = img.height))
    )]
    pub fn extract(&self, img: &ImageView<'_>) -> Result<FeatureVector, HogError> {
        ImageView::new(img.width, img.height, img.channels, img.data)?;
        let samples = if self.params.normalize {
            img.normalize_min_max()
        } else {
            ImageF32 {
                width: img.width,
                height: img.height,
                channels: img.channels,
                data: img.data.iter().map(|&v| f32::from(v)).collect(),
            }
        };
        self.extract_f32(&samples)
    }

    /// Extract from an already scaled floating point image. Normalization is
    /// not applied again; square-root correction still is.
    pub fn extract_f32(&self, img: &ImageF32) -> Result<FeatureVector, HogError> {
        self.block_grid(img.width, img.height)?;
        let field = dominant_gradient(img, self.params.transform_sqrt);
        let cells = cell_histograms(&field, &self.params);
        let features = normalized_blocks(&cells, &self.params);
        debug!(
            "hog {}x{}x{} -> {} cells, {} features",
            img.width,
            img.height,
            img.channels,
            cells.rows * cells.cols,
            features.len()
        );
        Ok(features)
    }

    /// Extract descriptors for a batch, preserving input order.
    ///
    /// Every image must share width, height and channel count. Either all
    /// descriptors are returned or none.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, images), fields(count = images.len()))
    )]
    pub fn extract_batch(&self, images: &[ImageView<'_>]) -> Result<Vec<FeatureVector>, HogError> {
        if let Some(first) = images.first() {
            let expected = first.shape();
            if let Some((index, img)) = images
                .iter()
                .enumerate()
                .find(|(_, img)| img.shape() != expected)
            {
                return Err(HogError::ShapeMismatch {
                    index,
                    expected,
                    got: img.shape(),
                });
            }
        }

        #[cfg(not(feature = "rayon"))]
        {
            images.iter().map(|img| self.extract(img)).collect()
        }
        #[cfg(feature = "rayon")]
        {
            images.par_iter().map(|img| self.extract(img)).collect()
        }
    }
}
