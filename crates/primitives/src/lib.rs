
pub type Name = &'static str;

pub type EpochNumber = u64;

pub type BlockHeight = u64;


mod range;


pub use range::{EpochRange, Pagination};
