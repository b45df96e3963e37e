//! Struct-format layout strings (`">IIB7x"` and friends)
//!
//! Only the big-endian (`>` or `!`) byte order is accepted; a layout with no
//! prefix is also read as big-endian since every guest value is. There is no
//! alignment padding between fields. `p` (Pascal string) is not supported.

use std::fmt;
use std::str::FromStr;

use crate::decode::value::{Scalar, Value};
use crate::error::{Error, Result};
use crate::memory::GC_RAM_SIZE;

/// Largest layout that could ever be read from guest RAM
pub const MAX_LAYOUT_SIZE: usize = GC_RAM_SIZE as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    /// `Ns`: one N-byte string field
    Bytes(usize),
}

impl FieldKind {
    pub fn size(self) -> usize {
        match self {
            Self::Bool | Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 => 4,
            Self::I64 | Self::U64 | Self::F64 => 8,
            Self::Bytes(n) => n,
        }
    }

    fn decode(self, bytes: &[u8]) -> Scalar {
        fn arr<const N: usize>(bytes: &[u8]) -> [u8; N] {
            let mut out = [0u8; N];
            out.copy_from_slice(&bytes[..N]);
            out
        }

        match self {
            Self::Bool => Scalar::Bool(bytes[0] != 0),
            Self::I8 => Scalar::Int(i64::from(bytes[0] as i8)),
            Self::U8 => Scalar::UInt(u64::from(bytes[0])),
            Self::I16 => Scalar::Int(i64::from(i16::from_be_bytes(arr(bytes)))),
            Self::U16 => Scalar::UInt(u64::from(u16::from_be_bytes(arr(bytes)))),
            Self::I32 => Scalar::Int(i64::from(i32::from_be_bytes(arr(bytes)))),
            Self::U32 => Scalar::UInt(u64::from(u32::from_be_bytes(arr(bytes)))),
            Self::I64 => Scalar::Int(i64::from_be_bytes(arr(bytes))),
            Self::U64 => Scalar::UInt(u64::from_be_bytes(arr(bytes))),
            Self::F32 => Scalar::Float(f64::from(f32::from_be_bytes(arr(bytes)))),
            Self::F64 => Scalar::Float(f64::from_be_bytes(arr(bytes))),
            Self::Bytes(n) => Scalar::Bytes(bytes[..n].to_vec()),
        }
    }
}

/// One decoded field and its byte offset within the layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub kind: FieldKind,
    pub offset: usize,
}

/// A parsed struct layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    source: String,
    fields: Vec<Field>,
    size: usize,
}

impl Layout {
    pub fn parse(format: &str) -> Result<Self> {
        let mut chars = format.chars().filter(|c| !c.is_whitespace()).peekable();

        match chars.peek() {
            Some('>') | Some('!') => {
                chars.next();
            }
            Some(c @ ('<' | '=' | '@')) => {
                return Err(Error::InvalidLayout(format!(
                    "'{}': byte order '{}' is not supported, guest data is big-endian",
                    format, c
                )));
            }
            _ => {}
        }

        let mut fields = Vec::new();
        let mut size = 0usize;

        while let Some(c) = chars.next() {
            let mut count: Option<usize> = None;
            let mut code = c;
            while let Some(digit) = code.to_digit(10) {
                let current = count.unwrap_or(0);
                count = Some(
                    current
                        .checked_mul(10)
                        .and_then(|n| n.checked_add(digit as usize))
                        .ok_or_else(|| {
                            Error::InvalidLayout(format!("'{}': repeat count overflows", format))
                        })?,
                );
                code = chars.next().ok_or_else(|| {
                    Error::InvalidLayout(format!("'{}': repeat count without a type", format))
                })?;
            }
            let count = count.unwrap_or(1);

            // Bounds-check the total before the field list grows
            let mut grow = |span: Option<usize>| -> Result<usize> {
                let start = size;
                size = span
                    .and_then(|n| size.checked_add(n))
                    .filter(|&total| total <= MAX_LAYOUT_SIZE)
                    .ok_or_else(|| {
                        Error::InvalidLayout(format!(
                            "'{}': larger than guest RAM ({:#x} bytes)",
                            format, MAX_LAYOUT_SIZE
                        ))
                    })?;
                Ok(start)
            };

            let kind = match code {
                'x' => {
                    grow(Some(count))?;
                    continue;
                }
                's' => {
                    let offset = grow(Some(count))?;
                    fields.push(Field {
                        kind: FieldKind::Bytes(count),
                        offset,
                    });
                    continue;
                }
                'p' => {
                    return Err(Error::InvalidLayout(format!(
                        "'{}': Pascal strings ('p') are not supported",
                        format
                    )));
                }
                'c' => FieldKind::Bytes(1),
                '?' => FieldKind::Bool,
                'b' => FieldKind::I8,
                'B' => FieldKind::U8,
                'h' => FieldKind::I16,
                'H' => FieldKind::U16,
                'i' | 'l' => FieldKind::I32,
                'I' | 'L' => FieldKind::U32,
                'q' => FieldKind::I64,
                'Q' => FieldKind::U64,
                'f' => FieldKind::F32,
                'd' => FieldKind::F64,
                other => {
                    return Err(Error::InvalidLayout(format!(
                        "'{}': unknown format character '{}'",
                        format, other
                    )));
                }
            };

            let start = grow(count.checked_mul(kind.size()))?;
            fields.extend((0..count).map(|i| Field {
                kind,
                offset: start + i * kind.size(),
            }));
        }

        Ok(Self {
            source: format.to_string(),
            fields,
            size,
        })
    }

    /// Total size in bytes, padding included
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of values produced by `unpack` (padding produces none)
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Decode every field of `bytes`, which must be exactly `size()` long
    pub fn unpack(&self, bytes: &[u8]) -> Result<Vec<Scalar>> {
        if bytes.len() != self.size {
            return Err(Error::DecodeMismatch {
                expected: format!("{} bytes for '{}'", self.size, self.source),
                actual: format!("{} bytes", bytes.len()),
            });
        }

        Ok(self
            .fields
            .iter()
            .map(|field| field.kind.decode(&bytes[field.offset..]))
            .collect())
    }

    /// `unpack`, collapsing a single field to a bare scalar
    pub fn unpack_value(&self, bytes: &[u8]) -> Result<Value> {
        Ok(Value::from_fields(self.unpack(bytes)?))
    }
}

impl FromStr for Layout {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bone_layout() {
        let layout = Layout::parse(">IIB7x").unwrap();
        assert_eq!(layout.size(), 16);
        assert_eq!(layout.field_count(), 3);
        assert_eq!(layout.fields()[2].offset, 8);
    }

    #[test]
    fn test_repeat_counts() {
        let layout: Layout = ">3f2H".parse().unwrap();
        assert_eq!(layout.size(), 16);
        assert_eq!(layout.field_count(), 5);

        let wide = Layout::parse(">12f").unwrap();
        assert_eq!(wide.size(), 48);
        assert_eq!(wide.field_count(), 12);
    }

    #[test]
    fn test_string_field_is_one_value() {
        let layout = Layout::parse(">4sB").unwrap();
        assert_eq!(layout.size(), 5);
        assert_eq!(layout.field_count(), 2);
        let values = layout.unpack(b"ABCD\x09").unwrap();
        assert_eq!(values[0], Scalar::Bytes(b"ABCD".to_vec()));
        assert_eq!(values[1], Scalar::UInt(9));
    }

    #[test]
    fn test_unpack_signed_and_float() {
        let layout = Layout::parse(">bhif").unwrap();
        let mut bytes = vec![0xFF];
        bytes.extend_from_slice(&(-300i16).to_be_bytes());
        bytes.extend_from_slice(&(-70000i32).to_be_bytes());
        bytes.extend_from_slice(&0.25f32.to_be_bytes());

        let values = layout.unpack(&bytes).unwrap();
        assert_eq!(
            values,
            vec![
                Scalar::Int(-1),
                Scalar::Int(-300),
                Scalar::Int(-70000),
                Scalar::Float(0.25)
            ]
        );
    }

    #[test]
    fn test_no_prefix_is_big_endian() {
        let layout = Layout::parse("H").unwrap();
        assert_eq!(layout.unpack(&[0x12, 0x34]).unwrap(), vec![Scalar::UInt(0x1234)]);
    }

    #[test]
    fn test_rejects_bad_layouts() {
        assert!(matches!(Layout::parse("<I"), Err(Error::InvalidLayout(_))));
        assert!(matches!(Layout::parse(">Iz"), Err(Error::InvalidLayout(_))));
        assert!(matches!(Layout::parse(">3"), Err(Error::InvalidLayout(_))));
    }

    #[test]
    fn test_size_overflow_is_invalid_layout() {
        assert!(matches!(
            Layout::parse(">18446744073709551615x1x"),
            Err(Error::InvalidLayout(_))
        ));
        assert!(matches!(
            Layout::parse(">4611686018427387904I"),
            Err(Error::InvalidLayout(_))
        ));
    }

    #[test]
    fn test_layout_larger_than_ram() {
        assert!(matches!(
            Layout::parse(">20000000I"),
            Err(Error::InvalidLayout(_))
        ));
        assert!(matches!(
            Layout::parse(">33554432xB"),
            Err(Error::InvalidLayout(_))
        ));

        let whole_ram = Layout::parse(">33554432x").unwrap();
        assert_eq!(whole_ram.size(), MAX_LAYOUT_SIZE);
        assert_eq!(whole_ram.field_count(), 0);
    }

    #[test]
    fn test_pascal_string_rejected() {
        assert!(matches!(Layout::parse(">4p"), Err(Error::InvalidLayout(_))));
    }

    #[test]
    fn test_field_offsets_after_padding() {
        let layout = Layout::parse(">B3x2H4s").unwrap();
        let offsets: Vec<usize> = layout.fields().iter().map(|f| f.offset).collect();
        assert_eq!(offsets, vec![0, 4, 6, 8]);
        assert_eq!(layout.size(), 12);
    }

    #[test]
    fn test_unpack_wrong_length() {
        let layout = Layout::parse(">I").unwrap();
        assert!(matches!(
            layout.unpack(&[0, 0]),
            Err(Error::DecodeMismatch { .. })
        ));
    }
}
