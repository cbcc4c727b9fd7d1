//! Access to a world directory on disk.
//!
//! ```text
//! <world>/level.dat           gzip-compressed root Compound
//! <world>/session.lock        millisecond timestamp of the current holder
//! <world>/region/r.X.Z.mca    overworld regions
//! <world>/DIM-1/region/...    nether regions
//! <world>/DIM1/region/...     end regions
//! ```
//!
//! The session lock is a value held by the caller, not process state:
//! [`World::lock`] returns a [`SessionLock`] and every guarded operation takes
//! it back as an argument.

pub mod config;
pub mod error;
pub mod session;
pub mod world;

pub use config::WorldConfig;
pub use error::{WorldError, WorldResult};
pub use session::SessionLock;
pub use world::{region_coord, Dimension, LockedRegion, World};
