//! Chapter ordering and read-state resolution

pub mod order;
pub mod resolve;

pub use order::sorted_newest_first;
pub use resolve::{progress, resolve_bookmark, Resolution};
