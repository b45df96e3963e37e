use serde::Serialize;

use crate::error::{Error, Result};

/// One unpacked field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bytes(Vec<u8>),
}

impl Scalar {
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Self::UInt(v) => Some(v),
            Self::Int(v) => u64::try_from(v).ok(),
            Self::Bool(v) => Some(u64::from(v)),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Float(v) => Some(v),
            Self::Int(v) => Some(v as f64),
            Self::UInt(v) => Some(v as f64),
            _ => None,
        }
    }
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::UInt(v) => write!(f, "{:#x}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Bytes(v) => write!(f, "{:02x?}", v),
        }
    }
}

/// Result of unpacking a layout
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// The layout had exactly one field
    Scalar(Scalar),
    List(Vec<Scalar>),
}

impl Value {
    pub fn from_fields(mut fields: Vec<Scalar>) -> Self {
        if fields.len() == 1 {
            if let Some(only) = fields.pop() {
                return Self::Scalar(only);
            }
        }
        Self::List(fields)
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Scalar(_) => 1,
            Self::List(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::List(_) => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scalar(s) => write!(f, "{}", s),
            Self::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Row-major array of f32 with a fixed shape
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FloatArray {
    shape: Vec<usize>,
    data: Vec<f32>,
}

impl FloatArray {
    /// Number of elements in `shape`, which must be non-empty
    pub fn element_count(shape: &[usize]) -> Result<usize> {
        if shape.is_empty() {
            return Err(Error::InvalidLayout("empty float array shape".to_string()));
        }
        shape
            .iter()
            .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
            .filter(|n| n.checked_mul(4).is_some())
            .ok_or_else(|| Error::InvalidLayout(format!("float array shape {:?} too large", shape)))
    }

    /// Decode contiguous big-endian f32s with no padding
    pub fn from_be_bytes(bytes: &[u8], shape: &[usize]) -> Result<Self> {
        let count = Self::element_count(shape)?;
        if bytes.len() != count * 4 {
            return Err(Error::DecodeMismatch {
                expected: format!("{} bytes for shape {:?}", count * 4, shape),
                actual: format!("{} bytes", bytes.len()),
            });
        }

        let data = bytes
            .chunks_exact(4)
            .map(|c| f32::from_be_bytes([c[0], c[1], c[2], c[3]]))
            .collect();

        Ok(Self {
            shape: shape.to_vec(),
            data,
        })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Element at a multi-dimensional index
    pub fn get(&self, index: &[usize]) -> Option<f32> {
        if index.len() != self.shape.len() {
            return None;
        }
        let mut flat = 0usize;
        for (&i, &dim) in index.iter().zip(&self.shape) {
            if i >= dim {
                return None;
            }
            flat = flat * dim + i;
        }
        self.data.get(flat).copied()
    }

    /// The whole array as a fixed-size vector
    pub fn to_array<const N: usize>(&self) -> Option<[f32; N]> {
        self.data.as_slice().try_into().ok()
    }

    /// A 2-D array as fixed-size rows
    pub fn to_rows<const R: usize, const C: usize>(&self) -> Option<[[f32; C]; R]> {
        if self.shape != [R, C] {
            return None;
        }
        let mut rows = [[0.0f32; C]; R];
        for (row, chunk) in rows.iter_mut().zip(self.data.chunks_exact(C)) {
            row.copy_from_slice(chunk);
        }
        Some(rows)
    }
}
