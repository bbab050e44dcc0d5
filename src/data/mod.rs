//! Data module: masks, fields, spaces and sparse storage

pub mod bitset;
pub mod level_set;
pub mod space;
pub mod sparse;

pub use bitset::BitSet;
pub use level_set::{FieldStamp, LevelSetField};
pub use space::{DofMapSpace, FeSpace};
pub use sparse::{CsrMatrix, SparsityPattern};
