/// Errors from pose construction and checked transforms.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PoseError {
    #[error(
        "rotation is not a proper rotation: orthogonality error {orthogonality:.3e}, \
         determinant {determinant:.6}"
    )]
    InvalidRotation {
        /// Largest absolute entry of `RᵀR − I`.
        orthogonality: f64,
        determinant: f64,
    },
    #[error("quaternion has zero or non-finite norm")]
    DegenerateQuaternion,
    #[error("pose contains a non-finite value")]
    NonFinite,
}
