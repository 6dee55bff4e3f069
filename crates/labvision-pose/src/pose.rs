use nalgebra::{Matrix3, Matrix4, Quaternion, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::PoseError;

/// Rigid transform mapping points from a local frame into its parent frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub rotation: Matrix3<f64>,
    pub translation: Vector3<f64>,
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl Pose {
    pub fn new(rotation: Matrix3<f64>, translation: Vector3<f64>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    pub fn identity() -> Self {
        Self::new(Matrix3::identity(), Vector3::zeros())
    }

    /// Pose at `(x, y, z)` rotated by `yaw_deg` about +Z.
    pub fn from_planar(x: f64, y: f64, z: f64, yaw_deg: f64) -> Self {
        let (s, c) = yaw_deg.to_radians().sin_cos();
        let rotation = Matrix3::new(c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0);
        Self::new(rotation, Vector3::new(x, y, z))
    }

    /// Pose from a translation and a quaternion given as `[w, x, y, z]`.
    /// The quaternion is normalized first.
    pub fn from_quaternion(translation: Vector3<f64>, q: [f64; 4]) -> Result<Self, PoseError> {
        let raw = Quaternion::new(q[0], q[1], q[2], q[3]);
        let norm = raw.norm();
        if !norm.is_finite() || norm < f64::EPSILON {
            return Err(PoseError::DegenerateQuaternion);
        }
        let unit = UnitQuaternion::from_quaternion(raw);
        Ok(Self::new(unit.to_rotation_matrix().into_inner(), translation))
    }

    /// Build from a homogeneous matrix. The bottom row is not inspected.
    pub fn from_homogeneous(m: &Matrix4<f64>) -> Self {
        Self::new(
            m.fixed_view::<3, 3>(0, 0).into_owned(),
            m.fixed_view::<3, 1>(0, 3).into_owned(),
        )
    }

    pub fn to_homogeneous(&self) -> Matrix4<f64> {
        let mut m = Matrix4::identity();
        m.fixed_view_mut::<3, 3>(0, 0).copy_from(&self.rotation);
        m.fixed_view_mut::<3, 1>(0, 3).copy_from(&self.translation);
        m
    }

    /// `self · other`: apply `other` first, then `self`.
    pub fn compose(&self, other: &Pose) -> Pose {
        Pose::new(
            self.rotation * other.rotation,
            self.rotation * other.translation + self.translation,
        )
    }

    /// Rigid inverse using `Rᵀ`. Only meaningful for a valid rotation.
    pub fn inverse(&self) -> Pose {
        let rt = self.rotation.transpose();
        Pose::new(rt, -(rt * self.translation))
    }

    pub fn transform_point(&self, p: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * p + self.translation
    }

    /// Check that the rotation is orthonormal with determinant +1 within
    /// `tol`, and that every entry is finite.
    pub fn validate(&self, tol: f64) -> Result<(), PoseError> {
        let mut entries = self.rotation.iter().chain(self.translation.iter());
        if entries.any(|v| !v.is_finite()) {
            return Err(PoseError::NonFinite);
        }
        let gram = self.rotation.transpose() * self.rotation;
        let orthogonality = (gram - Matrix3::identity()).amax();
        let determinant = self.rotation.determinant();
        if orthogonality > tol || (determinant - 1.0).abs() > tol {
            return Err(PoseError::InvalidRotation {
                orthogonality,
                determinant,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn planar_pose_rotates_about_z() {
        let p = Pose::from_planar(1.0, 2.0, 0.5, 90.0);
        let moved = p.transform_point(&Vector3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(moved, Vector3::new(1.0, 3.0, 0.5), epsilon = 1e-12);
        assert!(p.validate(1e-9).is_ok());
    }

    #[test]
    fn homogeneous_round_trip() {
        let p = Pose::from_planar(-0.3, 4.0, 1.0, 37.0);
        let m = p.to_homogeneous();
        assert_eq!(m[(3, 3)], 1.0);
        assert_eq!(m[(3, 0)], 0.0);
        assert_eq!(m[(0, 3)], -0.3);
        assert_eq!(Pose::from_homogeneous(&m), p);
    }

    #[test]
    fn compose_matches_matrix_product() {
        let a = Pose::from_planar(1.0, 0.0, 0.0, 30.0);
        let b =
            Pose::from_quaternion(Vector3::new(0.0, 2.0, 1.0), [0.9, 0.1, 0.3, -0.2]).unwrap();
        let ab = a.compose(&b);
        assert_relative_eq!(
            ab.to_homogeneous(),
            a.to_homogeneous() * b.to_homogeneous(),
            epsilon = 1e-12
        );
        let back = ab.compose(&b.inverse());
        assert_relative_eq!(back.rotation, a.rotation, epsilon = 1e-12);
        assert_relative_eq!(back.translation, a.translation, epsilon = 1e-12);
    }

    #[test]
    fn quaternion_is_normalized() {
        // 90 degrees about +Z, scaled by 2
        let h = std::f64::consts::FRAC_1_SQRT_2 * 2.0;
        let p = Pose::from_quaternion(Vector3::zeros(), [h, 0.0, 0.0, h]).unwrap();
        assert_relative_eq!(
            p.rotation,
            Pose::from_planar(0.0, 0.0, 0.0, 90.0).rotation,
            epsilon = 1e-12
        );
        assert_eq!(
            Pose::from_quaternion(Vector3::zeros(), [0.0; 4]).unwrap_err(),
            PoseError::DegenerateQuaternion
        );
    }

    #[test]
    fn validate_rejects_scale_and_reflection() {
        let mut scaled = Pose::identity();
        scaled.rotation *= 1.1;
        assert!(matches!(
            scaled.validate(1e-6),
            Err(PoseError::InvalidRotation { .. })
        ));

        let mut mirrored = Pose::identity();
        mirrored.rotation[(2, 2)] = -1.0;
        let err = mirrored.validate(1e-6).unwrap_err();
        match err {
            PoseError::InvalidRotation {
                orthogonality,
                determinant,
            } => {
                assert_eq!(orthogonality, 0.0);
                assert_eq!(determinant, -1.0);
            }
            other => panic!("unexpected {other:?}"),
        }

        let mut nan = Pose::identity();
        nan.translation.x = f64::NAN;
        assert_eq!(nan.validate(1e-6).unwrap_err(), PoseError::NonFinite);
    }
}
