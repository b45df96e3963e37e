//! # dolbones-core
//!
//! Live inspection of Super Smash Bros. Melee running in Slippi Dolphin.
//!
//! This crate provides:
//! - Read-only access to the emulator's guest RAM (Windows process memory)
//! - Big-endian struct decoding
//! - Typed views of fighters, bone tables and joint (`JObj`) trees
//! - Guarded skeleton traversal, debug-draw output and bone-log validation
//! - A reader for replay (`.slp`) command streams

pub mod config;
pub mod decode;
pub mod error;
pub mod game;
pub mod memory;
pub mod replay;
pub mod skeleton;

pub use config::{InspectConfig, InspectConfigBuilder};
pub use decode::{FloatArray, Layout, Scalar, Value};
pub use error::{Error, Result};
pub use game::{
    Fighter, FighterBone, FighterKind, FighterPart, FighterSummary, JObj, JObjFlags, JointType,
    Melee,
};
pub use memory::{
    DEFAULT_PROCESS_NAMES, GuestAddr, HostAddr, MemoryReader, MemoryRegion, ProcessHandle,
    ProcessMemory, ReadMemory,
};
pub use replay::{CommandId, Packet, ReplayReader};
pub use skeleton::{
    DebugDraw, DrawCommand, DrawList, JointPose, LoggedPose, PoseComparison, PoseLog, Skeleton,
    SkeletonNode, SkeletonStyle, Tolerance, WalkLimits, compare_poses, draw_skeleton, walk,
};
