//! Skeleton traversal and what gets done with the result

pub mod draw;
pub mod pose_log;
mod walker;

pub use draw::{Color, DebugDraw, DrawCommand, DrawList, JointPose, SkeletonStyle, Vec3, draw_skeleton};
pub use pose_log::{LoggedPose, PoseComparison, PoseLog, Tolerance, compare_poses};
pub use walker::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_NODES, Skeleton, SkeletonNode, WalkLimits, walk};
