//! Player slots and fighters
//!
//! Nothing here is cached. Every call walks the pointer chain again because
//! the game can swap a fighter's kind (Zelda/Sheik, Ice Climbers) at any frame.

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::game::bone::FighterBone;
use crate::game::enums::FighterKind;
use crate::game::jobj::JObj;
use crate::memory::layout::{bone, fighter, ft_parts, gobj, player};
use crate::memory::{GuestAddr, ReadMemory};
use crate::skeleton::{Skeleton, WalkLimits, walk};

/// Entry point to the game's global player state
pub struct Melee<'r, R: ReadMemory + ?Sized> {
    reader: &'r R,
}

impl<'r, R: ReadMemory + ?Sized> Melee<'r, R> {
    pub fn new(reader: &'r R) -> Self {
        Self { reader }
    }

    pub fn reader(&self) -> &'r R {
        self.reader
    }

    /// Address of a static player slot
    pub fn slot_address(slot: u32) -> Result<GuestAddr> {
        if slot >= player::SLOT_COUNT {
            return Err(Error::OutOfRange {
                address: u64::from(slot),
                size: player::SLOT_SIZE as usize,
            });
        }
        Ok(GuestAddr::new(player::SLOTS).index(slot, player::SLOT_SIZE))
    }

    /// Fighter in `slot`. An empty slot gives a fighter with a null base;
    /// check `is_present()` before using it.
    pub fn get_fighter(&self, slot: u32) -> Result<Fighter> {
        let slot_addr = Self::slot_address(slot)?;

        let p_gobj = self.reader.read_ptr(slot_addr.offset(player::FIGHTER_GOBJ))?;
        if p_gobj.is_null() {
            debug!("Slot {} has no fighter GObj", slot);
            return Ok(Fighter::new(GuestAddr::NULL));
        }

        let base = self.reader.read_ptr(p_gobj.offset(gobj::USER_DATA))?;
        debug!("Slot {}: gobj {} fighter {}", slot, p_gobj, base);
        Ok(Fighter::new(base))
    }

    /// Fighters in every slot that has one
    pub fn fighters(&self) -> Result<Vec<(u32, Fighter)>> {
        let mut found = Vec::new();
        for slot in 0..player::SLOT_COUNT {
            let fighter = self.get_fighter(slot)?;
            if fighter.is_present() {
                found.push((slot, fighter));
            }
        }
        Ok(found)
    }
}

/// One character instance, identified by its fighter data block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Fighter {
    pub base: GuestAddr,
}

impl Fighter {
    pub fn new(base: GuestAddr) -> Self {
        Self { base }
    }

    pub fn is_present(&self) -> bool {
        !self.base.is_null()
    }

    /// Raw `ftKind` value
    pub fn kind_id<R: ReadMemory + ?Sized>(&self, reader: &R) -> Result<u32> {
        reader.read_u32(self.base.offset(fighter::KIND))
    }

    /// `None` when the kind id is not a known character
    pub fn kind<R: ReadMemory + ?Sized>(&self, reader: &R) -> Result<Option<FighterKind>> {
        self.kind_id(reader).map(FighterKind::from_u32)
    }

    /// Length of this fighter's bone table, via the per-kind parts table
    pub fn parts_count<R: ReadMemory + ?Sized>(&self, reader: &R) -> Result<u32> {
        let kind = self.kind_id(reader)?;
        let table = reader.read_ptr(GuestAddr::new(ft_parts::TABLE_PTR))?;
        let parts = reader.read_ptr(table.index(kind, ft_parts::ENTRY_SIZE))?;
        reader.read_u32(parts.offset(ft_parts::PARTS_NUM))
    }

    pub fn bone_table<R: ReadMemory + ?Sized>(&self, reader: &R) -> Result<GuestAddr> {
        reader.read_ptr(self.base.offset(fighter::BONE_TABLE))
    }

    /// Read the whole bone table
    pub fn get_fighterbones<R: ReadMemory + ?Sized>(&self, reader: &R) -> Result<Vec<FighterBone>> {
        let parts_num = self.parts_count(reader)?;
        let table = self.bone_table(reader)?;

        let size = usize::try_from(parts_num)
            .ok()
            .and_then(|n| n.checked_mul(bone::SIZE))
            .ok_or(Error::OutOfRange {
                address: u64::from(table.get()),
                size: usize::MAX,
            })?;

        let buffer = reader.read_bytes(table, size)?;
        buffer
            .chunks_exact(bone::SIZE)
            .map(FighterBone::from_bytes)
            .collect()
    }

    /// Walk the skeleton hanging off bone 0
    pub fn skeleton<R: ReadMemory + ?Sized>(&self, reader: &R, limits: &WalkLimits) -> Result<Skeleton> {
        let bones = self.get_fighterbones(reader)?;
        let first = bones
            .first()
            .ok_or_else(|| Error::InvalidStructure(format!("fighter {} has no bones", self.base)))?;

        let root = JObj::from_mem(reader, first.p_joint)?;
        if !root.is_skeleton_root() {
            return Err(Error::InvalidStructure(format!(
                "joint {} of bone 0 is not a skeleton root (flags {:#010x})",
                first.p_joint,
                root.flags.bits()
            )));
        }

        walk(reader, first.p_joint, limits)
    }

    /// Joints referenced by each bone, in bone order
    pub fn bone_jobjs<R: ReadMemory + ?Sized>(&self, reader: &R) -> Result<Vec<JObj>> {
        self.get_fighterbones(reader)?
            .iter()
            .map(|b| JObj::from_mem(reader, b.p_joint))
            .collect()
    }

    pub fn summary<R: ReadMemory + ?Sized>(&self, reader: &R, slot: u32) -> Result<FighterSummary> {
        let kind_id = self.kind_id(reader)?;
        Ok(FighterSummary {
            slot,
            base: self.base,
            kind_id,
            kind: FighterKind::from_u32(kind_id),
            bone_table: self.bone_table(reader)?,
            bones: self.get_fighterbones(reader)?,
        })
    }
}

/// Printable snapshot of a fighter
#[derive(Debug, Clone, Serialize)]
pub struct FighterSummary {
    pub slot: u32,
    pub base: GuestAddr,
    pub kind_id: u32,
    pub kind: Option<FighterKind>,
    pub bone_table: GuestAddr,
    pub bones: Vec<FighterBone>,
}
