mod bone;
mod enums;
mod fighter;
mod jobj;

pub use bone::*;
pub use enums::*;
pub use fighter::*;
pub use jobj::*;

#[cfg(test)]
pub(crate) use jobj::tests::write_jobj;
