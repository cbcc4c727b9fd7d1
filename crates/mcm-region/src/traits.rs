use crate::chunk::Chunk;
use crate::error::RegionError;

/// A 32x32 grid of chunk slots with per-slot timestamps.
///
/// Coordinates wrap modulo 32 (Euclidean, so `-1` is slot 31), and callers
/// may pass world chunk coordinates directly. Out-of-range coordinates are
/// never rejected; picking the right region file for a world coordinate is
/// the caller's job (see `mcm_world::World::region`).
///
/// Implementations must satisfy:
/// - An empty slot reads as `Ok(None)`, never as an error.
/// - Writing `None` empties a slot; writing `Some` then reading returns an
///   equal chunk.
/// - Timestamps are stored and returned as-is.
/// - All I/O errors are propagated, never silently ignored.
///
/// Wrappers that add their own failure modes (such as a lock check) use
/// their own error type; it must be able to carry a [`RegionError`].
pub trait Region {
    type Error: From<RegionError>;

    /// Read the chunk in slot `(x, z)`, if any.
    fn get_chunk(&self, x: i32, z: i32) -> Result<Option<Chunk>, Self::Error>;

    /// Store `chunk` in slot `(x, z)`, or empty the slot for `None`.
    fn set_chunk(&self, x: i32, z: i32, chunk: Option<&Chunk>) -> Result<(), Self::Error>;

    fn get_timestamp(&self, x: i32, z: i32) -> Result<i32, Self::Error>;

    fn set_timestamp(&self, x: i32, z: i32, timestamp: i32) -> Result<(), Self::Error>;

    /// Whether slot `(x, z)` holds a chunk.
    ///
    /// Default implementation reads the chunk. Backends may override with a
    /// cheaper header check.
    fn chunk_exists(&self, x: i32, z: i32) -> Result<bool, Self::Error> {
        Ok(self.get_chunk(x, z)?.is_some())
    }
}
