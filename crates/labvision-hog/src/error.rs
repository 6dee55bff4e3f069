use labvision_core::ImageError;

/// Errors returned by the HOG extractor.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum HogError {
    #[error("invalid HOG parameters: {0}")]
    InvalidParams(&'static str),
    #[error(
        "image {width}x{height} is too small for one block ({cells_rows}x{cells_cols} cells available)"
    )]
    ImageTooSmall {
        width: usize,
        height: usize,
        cells_rows: usize,
        cells_cols: usize,
    },
    #[error(transparent)]
    InvalidBuffer(#[from] ImageError),
    #[error("image {index} has shape {got:?}, expected {expected:?} (width, height, channels)")]
    ShapeMismatch {
        index: usize,
        expected: (usize, usize, usize),
        got: (usize, usize, usize),
    },
}
