use serde::Serialize;

use crate::error::{Error, Result};
use crate::memory::GuestAddr;
use crate::memory::layout::bone;

/// One entry of a fighter's bone table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FighterBone {
    /// Primary joint for this part
    pub p_joint: GuestAddr,
    pub p_jobj2: GuestAddr,
    pub flags: u8,
}

impl FighterBone {
    /// Decode a `>IIB7x` record; the trailing padding is ignored
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != bone::SIZE {
            return Err(Error::DecodeMismatch {
                expected: format!("{} byte bone record", bone::SIZE),
                actual: format!("{} bytes", bytes.len()),
            });
        }

        Ok(Self {
            p_joint: GuestAddr::new(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])),
            p_jobj2: GuestAddr::new(u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]])),
            flags: bytes[8],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{Layout, Scalar};

    #[test]
    fn test_from_bytes_ignores_padding() {
        let mut record = [0xAAu8; 16];
        record[..4].copy_from_slice(&0x8123_0000u32.to_be_bytes());
        record[4..8].copy_from_slice(&0x8123_0100u32.to_be_bytes());
        record[8] = 0x05;

        let bone = FighterBone::from_bytes(&record).unwrap();
        assert_eq!(bone.p_joint, GuestAddr::new(0x8123_0000));
        assert_eq!(bone.p_jobj2, GuestAddr::new(0x8123_0100));
        assert_eq!(bone.flags, 5);
    }

    #[test]
    fn test_matches_layout_string() {
        let layout = Layout::parse(bone::FORMAT).unwrap();
        assert_eq!(layout.size(), bone::SIZE);

        let record: Vec<u8> = (0u8..16).collect();
        let fields = layout.unpack(&record).unwrap();
        let decoded = FighterBone::from_bytes(&record).unwrap();
        assert_eq!(fields[0], Scalar::UInt(u64::from(decoded.p_joint.get())));
        assert_eq!(fields[2], Scalar::UInt(u64::from(decoded.flags)));
    }

    #[test]
    fn test_wrong_length() {
        assert!(FighterBone::from_bytes(&[0u8; 15]).is_err());
    }
}
