//! Rigid-body pose algebra for handing goals to a navigation primitive.
//!
//! Poses are 4×4 homogeneous transforms `[[R, t], [0, 1]]` stored as a
//! rotation matrix and a translation vector. Two operations cover the
//! common robot-lab cases:
//!
//! - [`relative_pose_zxy`]: express an object pose in a reference frame's
//!   local coordinates, reporting yaw from an intrinsic Z-X-Y decomposition.
//! - [`compose_goal_zyx`]: push a goal defined relative to a reference frame
//!   into robot/world coordinates, reporting yaw from an intrinsic Z-Y-X
//!   decomposition.
//!
//! The two use different Euler orders on purpose; each keeps its own name.
//!
//! ```
//! use labvision_pose::{relative_pose_zxy, Pose};
//!
//! let cube = Pose::from_planar(1.0, 1.0, 0.0, 90.0);
//! let robot = Pose::from_planar(1.0, 0.0, 0.0, 90.0);
//! let rel = relative_pose_zxy(&cube, &robot);
//! let goal = rel.planar();
//! assert!((goal.x - 1.0).abs() < 1e-12 && goal.y.abs() < 1e-12);
//! assert!(goal.yaw_deg.abs() < 1e-9);
//! ```

mod error;
mod euler;
mod pose;
mod transform;

pub use error::PoseError;
pub use euler::{euler_angles, EulerAngles, EulerSequence, GIMBAL_LOCK_EPS};
pub use pose::Pose;
pub use transform::{
    compose_goal_zyx, relative_pose_zxy, relative_pose_zxy_checked, PlanarGoal, RelativePose,
};
