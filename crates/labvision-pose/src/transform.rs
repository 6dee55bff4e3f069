use log::debug;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{euler_angles, EulerSequence, Pose, PoseError};

/// The `(x, y, yaw)` triple a planar navigation primitive consumes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanarGoal {
    pub x: f64,
    pub y: f64,
    pub yaw_deg: f64,
}

/// Result of a frame change: the full pose plus its extracted yaw.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RelativePose {
    pub pose: Pose,
    /// Rotation about Z in degrees, from the decomposition the producing
    /// operation names.
    pub yaw_deg: f64,
    /// The Euler decomposition hit gimbal lock; `yaw_deg` then carries the
    /// combined first and third rotation.
    pub gimbal_lock: bool,
}

impl RelativePose {
    fn from_pose(pose: Pose, sequence: EulerSequence) -> Self {
        let angles = euler_angles(&pose.rotation, sequence);
        Self {
            pose,
            yaw_deg: angles.degrees()[0],
            gimbal_lock: angles.gimbal_lock,
        }
    }

    pub fn planar(&self) -> PlanarGoal {
        PlanarGoal {
            x: self.pose.translation.x,
            y: self.pose.translation.y,
            yaw_deg: self.yaw_deg,
        }
    }
}

/// Pose of `object` expressed in the local frame of `reference`, both given
/// in a common world frame.
///
/// `R = R_refᵀ·R_obj`, `t = R_refᵀ·(t_obj − t_ref)`. The transpose stands in
/// for the inverse, so `reference` must carry a proper rotation; nothing is
/// re-orthonormalized. Use [`relative_pose_zxy_checked`] to validate first.
#[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
pub fn relative_pose_zxy(object: &Pose, reference: &Pose) -> RelativePose {
    let rt = reference.rotation.transpose();
    let pose = Pose::new(
        rt * object.rotation,
        rt * (object.translation - reference.translation),
    );
    let rel = RelativePose::from_pose(pose, EulerSequence::IntrinsicZxy);
    debug!(
        "relative pose: t = ({:.4}, {:.4}, {:.4}), yaw {:.3} deg",
        pose.translation.x, pose.translation.y, pose.translation.z, rel.yaw_deg
    );
    rel
}

/// [`relative_pose_zxy`] after checking that `reference` has a proper
/// rotation within `tol`.
pub fn relative_pose_zxy_checked(
    object: &Pose,
    reference: &Pose,
    tol: f64,
) -> Result<RelativePose, PoseError> {
    reference.validate(tol)?;
    Ok(relative_pose_zxy(object, reference))
}

/// Push a goal defined in a reference frame into robot/world coordinates:
/// `T = T_reference_in_robot · T_goal_in_reference`. Yaw comes from an
/// intrinsic Z-Y-X decomposition.
#[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
pub fn compose_goal_zyx(goal_in_reference: &Pose, reference_in_robot: &Pose) -> RelativePose {
    let pose = reference_in_robot.compose(goal_in_reference);
    let rel = RelativePose::from_pose(pose, EulerSequence::IntrinsicZyx);
    debug!(
        "composed goal: t = ({:.4}, {:.4}, {:.4}), yaw {:.3} deg",
        pose.translation.x, pose.translation.y, pose.translation.z, rel.yaw_deg
    );
    rel
}
