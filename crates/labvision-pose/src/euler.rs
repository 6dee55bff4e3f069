//! Euler-angle extraction from rotation matrices.
//!
//! Angles are returned in radians in the order the sequence names them, so
//! the first angle is always the rotation about Z for the sequences here.
//!
//! Intrinsic sequences rotate about the moving axes
//! (`R = Rz(a)·Rx(b)·Ry(c)` for Z-X-Y), extrinsic ones about the fixed axes
//! (`R = Ry(c)·Rx(b)·Rz(a)` for z-x-y).

use log::warn;
use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

/// `|cos(second angle)|` below this is treated as gimbal lock.
pub const GIMBAL_LOCK_EPS: f64 = 1e-9;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EulerSequence {
    IntrinsicZxy,
    IntrinsicZyx,
    ExtrinsicZxy,
    ExtrinsicZyx,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EulerAngles {
    /// Radians, in sequence order.
    pub angles: [f64; 3],
    pub sequence: EulerSequence,
    /// The first and third axes aligned; the third angle was pinned to zero.
    pub gimbal_lock: bool,
}

impl EulerAngles {
    pub fn degrees(&self) -> [f64; 3] {
        self.angles.map(f64::to_degrees)
    }
}

#[inline]
fn r(m: &Matrix3<f64>, row: usize, col: usize) -> f64 {
    m[(row, col)]
}

/// Sine of the middle angle.
fn second_sin(m: &Matrix3<f64>, sequence: EulerSequence) -> f64 {
    match sequence {
        EulerSequence::IntrinsicZxy => r(m, 2, 1),
        EulerSequence::IntrinsicZyx => -r(m, 2, 0),
        EulerSequence::ExtrinsicZxy => -r(m, 1, 2),
        EulerSequence::ExtrinsicZyx => r(m, 0, 2),
    }
}

/// First and third angles away from gimbal lock.
fn outer_angles(m: &Matrix3<f64>, sequence: EulerSequence) -> (f64, f64) {
    match sequence {
        EulerSequence::IntrinsicZxy => (
            f64::atan2(-r(m, 0, 1), r(m, 1, 1)),
            f64::atan2(-r(m, 2, 0), r(m, 2, 2)),
        ),
        EulerSequence::IntrinsicZyx => (
            f64::atan2(r(m, 1, 0), r(m, 0, 0)),
            f64::atan2(r(m, 2, 1), r(m, 2, 2)),
        ),
        EulerSequence::ExtrinsicZxy => (
            f64::atan2(r(m, 1, 0), r(m, 1, 1)),
            f64::atan2(r(m, 0, 2), r(m, 2, 2)),
        ),
        EulerSequence::ExtrinsicZyx => (
            f64::atan2(-r(m, 0, 1), r(m, 0, 0)),
            f64::atan2(-r(m, 1, 2), r(m, 2, 2)),
        ),
    }
}

/// First angle at gimbal lock, with the third pinned to zero.
fn locked_first(m: &Matrix3<f64>, sequence: EulerSequence) -> f64 {
    match sequence {
        EulerSequence::IntrinsicZxy => f64::atan2(r(m, 1, 0), r(m, 0, 0)),
        EulerSequence::IntrinsicZyx => f64::atan2(-r(m, 0, 1), r(m, 1, 1)),
        EulerSequence::ExtrinsicZxy => f64::atan2(-r(m, 0, 1), r(m, 0, 0)),
        EulerSequence::ExtrinsicZyx => f64::atan2(r(m, 1, 0), r(m, 1, 1)),
    }
}

/// Decompose `rotation` into three angles for `sequence`.
///
/// At gimbal lock only the sum (or difference) of the first and third angles
/// is defined. The third angle is then set to zero, the first absorbs the
/// whole rotation, and a warning is logged.
pub fn euler_angles(rotation: &Matrix3<f64>, sequence: EulerSequence) -> EulerAngles {
    let second = second_sin(rotation, sequence).clamp(-1.0, 1.0).asin();

    if second.cos().abs() < GIMBAL_LOCK_EPS {
        warn!(
            "gimbal lock in {sequence:?} decomposition (second angle {:.3} deg); \
             third angle pinned to 0",
            second.to_degrees()
        );
        return EulerAngles {
            angles: [locked_first(rotation, sequence), second, 0.0],
            sequence,
            gimbal_lock: true,
        };
    }

    let (first, third) = outer_angles(rotation, sequence);
    EulerAngles {
        angles: [first, second, third],
        sequence,
        gimbal_lock: false,
    }
}
