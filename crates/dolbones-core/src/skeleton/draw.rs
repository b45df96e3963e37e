//! Debug-draw output for skeletons
//!
//! Rendering lives outside this crate. Anything that can draw coloured lines
//! and points implements `DebugDraw`; `DrawList` records the calls so they can
//! be handed to an external renderer as JSON.

use serde::{Deserialize, Serialize};

use crate::game::JObjFlags;
use crate::memory::GuestAddr;
use crate::skeleton::walker::Skeleton;

pub type Vec3 = [f32; 3];

/// Linear RGB, each channel 0.0..=1.0
pub type Color = [f32; 3];

pub trait DebugDraw {
    fn draw_line(&mut self, p0: Vec3, p1: Vec3, color: Color);
    fn draw_point(&mut self, p: Vec3, color: Color, size: f32);
}

/// World-space pose of one joint
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JointPose {
    pub index: usize,
    pub address: GuestAddr,
    /// `None` while the joint's matrix is dirty
    pub position: Option<Vec3>,
    pub rotation: [f32; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkeletonStyle {
    pub root_color: Color,
    pub joint_color: Color,
    pub bone_color: Color,
    pub point_size: f32,
    pub show_hidden: bool,
}

impl Default for SkeletonStyle {
    fn default() -> Self {
        Self {
            root_color: [1.0, 0.2, 0.2],
            joint_color: [1.0, 1.0, 0.0],
            bone_color: [0.2, 0.8, 1.0],
            point_size: 4.0,
            show_hidden: false,
        }
    }
}

/// Draw a point per joint and a line from each joint to its parent.
/// Joints without a world position are skipped, along with their bones.
pub fn draw_skeleton<D: DebugDraw + ?Sized>(skeleton: &Skeleton, out: &mut D, style: &SkeletonStyle) {
    let visible = |i: usize| {
        let node = &skeleton.nodes[i];
        if !style.show_hidden && node.jobj.flags.contains(JObjFlags::HIDDEN) {
            return None;
        }
        node.jobj.world_position()
    };

    for (i, node) in skeleton.nodes.iter().enumerate() {
        let Some(position) = visible(i) else {
            continue;
        };

        let color = if node.jobj.is_skeleton_root() {
            style.root_color
        } else {
            style.joint_color
        };
        out.draw_point(position, color, style.point_size);

        if let Some(parent) = node.parent.and_then(visible) {
            out.draw_line(parent, position, style.bone_color);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DrawCommand {
    Line { p0: Vec3, p1: Vec3, color: Color },
    Point { p: Vec3, color: Color, size: f32 },
}

/// `DebugDraw` that records every call
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DrawList {
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
    }

    pub fn points(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Point { .. }))
    }
}

impl DebugDraw for DrawList {
    fn draw_line(&mut self, p0: Vec3, p1: Vec3, color: Color) {
        self.commands.push(DrawCommand::Line { p0, p1, color });
    }

    fn draw_point(&mut self, p: Vec3, color: Color, size: f32) {
        self.commands.push(DrawCommand::Point { p, color, size });
    }
}
