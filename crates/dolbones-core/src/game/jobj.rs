//! HSD joint objects
//!
//! A skeleton is a first-child/next-sibling tree of `JObj` nodes. Each node
//! carries its local SRT transform and, once the game has assembled it, a
//! world matrix.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::decode::FloatArray;
use crate::error::{Error, Result};
use crate::memory::layout::jobj;
use crate::memory::{GuestAddr, ReadMemory};

bitflags! {
    /// Joint semantics bits. Bits with no name are kept as read.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct JObjFlags: u32 {
        const SKELETON = 1 << 0;
        const SKELETON_ROOT = 1 << 1;
        const ENVELOPE_MODEL = 1 << 2;
        const CLASSICAL_SCALE = 1 << 3;
        const HIDDEN = 1 << 4;
        const PTCL = 1 << 5;
        const MTX_DIRTY = 1 << 6;
        const LIGHTING = 1 << 7;
        const TEXGEN = 1 << 8;
        const INSTANCE = 1 << 12;
        const SPLINE = 1 << 14;
        const FLIP_IK = 1 << 15;
        const SPECULAR = 1 << 16;
        const USE_QUATERNION = 1 << 17;
        /// Two-bit joint type field, see `JointType`
        const JOINT_TYPE = 3 << 21;
        const USER_DEF_MTX = 1 << 23;
        const MTX_INDEP_PARENT = 1 << 24;
        const MTX_INDEP_SRT = 1 << 25;
        const ROOT_OPA = 1 << 28;
        const ROOT_XLU = 1 << 29;
        const ROOT_TEXEDGE = 1 << 30;
    }
}

/// Value of the `JOINT_TYPE` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JointType {
    Null,
    Joint1,
    Joint2,
    Effector,
}

impl JObjFlags {
    pub fn joint_type(self) -> JointType {
        match (self.bits() >> 21) & 0b11 {
            0 => JointType::Null,
            1 => JointType::Joint1,
            2 => JointType::Joint2,
            _ => JointType::Effector,
        }
    }
}

/// Snapshot of one joint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JObj {
    pub address: GuestAddr,
    pub flags: JObjFlags,
    /// Quaternion (x, y, z, w)
    pub rotate: [f32; 4],
    pub scale: [f32; 3],
    pub translate: [f32; 3],
    /// 3x4 world matrix, valid only when `MTX_DIRTY` is clear
    pub mtx: [[f32; 4]; 3],

    pub next: GuestAddr,
    pub parent: GuestAddr,
    pub child: GuestAddr,
}

fn vector<const N: usize>(array: FloatArray, field: &str) -> Result<[f32; N]> {
    array
        .to_array()
        .ok_or_else(|| Error::InvalidStructure(format!("JObj {} is not {} floats", field, N)))
}

impl JObj {
    /// Decode the joint at `address`. Linked joints are not followed.
    pub fn from_mem<R: ReadMemory + ?Sized>(reader: &R, address: GuestAddr) -> Result<Self> {
        let flags = JObjFlags::from_bits_retain(reader.read_u32(address.offset(jobj::FLAGS))?);

        let rotate = vector(reader.read_float_array(address.offset(jobj::ROTATE), &[4])?, "rotate")?;
        let scale = vector(reader.read_float_array(address.offset(jobj::SCALE), &[3])?, "scale")?;
        let translate = vector(
            reader.read_float_array(address.offset(jobj::TRANSLATE), &[3])?,
            "translate",
        )?;
        let mtx = reader
            .read_float_array(address.offset(jobj::MTX), &[3, 4])?
            .to_rows()
            .ok_or_else(|| Error::InvalidStructure("JObj mtx is not 3x4".to_string()))?;

        Ok(Self {
            address,
            flags,
            rotate,
            scale,
            translate,
            mtx,
            next: reader.read_ptr(address.offset(jobj::NEXT))?,
            parent: reader.read_ptr(address.offset(jobj::PARENT))?,
            child: reader.read_ptr(address.offset(jobj::CHILD))?,
        })
    }

    pub fn is_skeleton_root(&self) -> bool {
        self.flags.contains(JObjFlags::SKELETON_ROOT)
    }

    /// Translation column of the world matrix, if the game has computed it
    pub fn world_position(&self) -> Option<[f32; 3]> {
        if self.flags.contains(JObjFlags::MTX_DIRTY) {
            return None;
        }
        Some([self.mtx[0][3], self.mtx[1][3], self.mtx[2][3]])
    }
}
