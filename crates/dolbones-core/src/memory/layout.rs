//! Memory layout constants for Melee (NTSC 1.02) data structures
//!
//! This module centralizes all guest addresses and field offsets used for
//! reading game data. Constants are organized by structure type.

/// Static player slot table
pub mod player {
    /// First entry of the static player table
    pub const SLOTS: u32 = 0x8045_3080;
    /// Size of one static player entry
    pub const SLOT_SIZE: u32 = 0xE90;
    /// Number of static player entries
    pub const SLOT_COUNT: u32 = 6;
    /// Pointer to the player's fighter GObj
    pub const FIGHTER_GOBJ: u32 = 0xB0;
}

/// HSD_GObj wrapping a fighter
pub mod gobj {
    /// Pointer to the fighter data block (`user_data`)
    pub const USER_DATA: u32 = 0x2C;
}

/// Fighter data block
pub mod fighter {
    /// Character kind (u32)
    pub const KIND: u32 = 0x04;
    /// Pointer to the FighterBone table
    pub const BONE_TABLE: u32 = 0x5E8;
}

/// Per-kind skeleton metadata
pub mod ft_parts {
    /// Global pointer to the per-kind parts table
    pub const TABLE_PTR: u32 = 0x804D_6544;
    /// Size of one parts table entry (a pointer)
    pub const ENTRY_SIZE: u32 = 4;
    /// Number of skeleton parts for the kind (u32)
    pub const PARTS_NUM: u32 = 0x08;
}

/// FighterBone record
pub mod bone {
    /// Size of one FighterBone record
    pub const SIZE: usize = 0x10;
    /// Record format: two joint pointers, a flag byte, padding
    pub const FORMAT: &str = ">IIB7x";
}

/// HSD_JObj
pub mod jobj {
    pub const NEXT: u32 = 0x08;
    pub const PARENT: u32 = 0x0C;
    pub const CHILD: u32 = 0x10;
    pub const FLAGS: u32 = 0x14;
    /// Quaternion (4 x f32)
    pub const ROTATE: u32 = 0x1C;
    /// Vec3 (3 x f32)
    pub const SCALE: u32 = 0x2C;
    /// Vec3 (3 x f32)
    pub const TRANSLATE: u32 = 0x38;
    /// 3x4 matrix (12 x f32)
    pub const MTX: u32 = 0x44;
    /// Bytes covered by the fields above
    pub const SIZE: usize = 0x74;
}
