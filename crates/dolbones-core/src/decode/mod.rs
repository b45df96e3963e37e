//! Big-endian value decoding for guest memory

mod format;
mod value;

pub use format::{Field, FieldKind, Layout};
pub use value::{FloatArray, Scalar, Value};
