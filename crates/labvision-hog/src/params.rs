use serde::{Deserialize, Serialize};

use crate::HogError;

/// Block normalization scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockNorm {
    /// `v / (‖v‖₁ + ε)`.
    #[default]
    L1,
    /// `sqrt(v / (‖v‖₁ + ε))`.
    L1Sqrt,
    /// `v / sqrt(‖v‖₂² + ε²)`.
    L2,
    /// L2, clip at 0.2, L2 again.
    L2Hys,
}

/// Parameters for HOG extraction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HogParams {
    /// Number of unsigned orientation bins over `[0°, 180°)`.
    pub orientations: usize,
    /// Cell size in pixels, `[rows, cols]`.
    pub pixels_per_cell: [usize; 2],
    /// Block size in cells, `[rows, cols]`.
    pub cells_per_block: [usize; 2],
    pub block_norm: BlockNorm,
    /// Square-root contrast correction before taking gradients.
    pub transform_sqrt: bool,
    /// Min-max normalize samples into `[0, 1]` first.
    pub normalize: bool,
}

impl Default for HogParams {
    fn default() -> Self {
        Self {
            orientations: 9,
            pixels_per_cell: [16, 16],
            cells_per_block: [4, 4],
            block_norm: BlockNorm::L1,
            transform_sqrt: true,
            normalize: true,
        }
    }
}

impl HogParams {
    pub fn validate(&self) -> Result<(), HogError> {
        if self.orientations == 0 {
            return Err(HogError::InvalidParams("orientations must be > 0"));
        }
        if self.pixels_per_cell.contains(&0) {
            return Err(HogError::InvalidParams("pixels_per_cell must be > 0"));
        }
        if self.cells_per_block.contains(&0) {
            return Err(HogError::InvalidParams("cells_per_block must be > 0"));
        }
        Ok(())
    }

    /// Values per block: `cells_per_block[0] * cells_per_block[1] * orientations`.
    pub fn block_len(&self) -> usize {
        self.cells_per_block[0] * self.cells_per_block[1] * self.orientations
    }
}
