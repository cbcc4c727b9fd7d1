//! Region container: up to 1024 compressed NBT chunks in one file.
//!
//! A region covers a 32x32 grid of chunks. Each slot has a location entry
//! pointing at a run of 4096-byte sectors and an opaque timestamp. Records
//! are `[u32 length][u8 compression id][payload]`, zero-padded to whole
//! sectors.
//!
//! # Allocation
//!
//! - A record that still fits its current sectors is rewritten in place.
//! - Otherwise it is appended at the end of the file and the old sectors are
//!   abandoned. Nothing is ever compacted.
//! - Clearing a slot zeroes its location entry and leaves the bytes behind.
//!
//! All backends implement the [`Region`] trait; [`FileRegion`] is the
//! on-disk one.

pub mod chunk;
pub mod config;
pub mod error;
pub mod file;
pub mod location;
pub mod traits;

pub use chunk::Chunk;
pub use config::RegionConfig;
pub use error::{RegionError, RegionResult};
pub use file::{FileRegion, SlotInfo};
pub use location::{slot_index, Location, HEADER_SIZE, SECTOR_SIZE};
pub use traits::Region;
