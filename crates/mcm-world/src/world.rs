use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use mcm_nbt::{codec, Tag};
use mcm_region::{Chunk, FileRegion, Region};
use tracing::debug;

use crate::config::WorldConfig;
use crate::error::{WorldError, WorldResult};
use crate::session::{self, SessionLock};

/// A world's region directories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dimension {
    Overworld,
    Nether,
    End,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Self::Overworld, Self::Nether, Self::End];

    /// Numeric id used in the `DIM<id>` folder name.
    pub fn id(self) -> i32 {
        match self {
            Self::Overworld => 0,
            Self::Nether => -1,
            Self::End => 1,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.id() == id)
    }

    /// Directory holding this dimension's region files, relative to the
    /// world directory.
    pub fn region_dir(self) -> PathBuf {
        match self {
            Self::Overworld => PathBuf::from("region"),
            other => Path::new(&format!("DIM{}", other.id())).join("region"),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Overworld => "overworld",
            Self::Nether => "nether",
            Self::End => "end",
        })
    }
}

impl FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "overworld" | "0" => Ok(Self::Overworld),
            "nether" | "-1" => Ok(Self::Nether),
            "end" | "1" => Ok(Self::End),
            other => Err(format!("unknown dimension: {other}")),
        }
    }
}

/// Region file coordinate containing chunk coordinate `chunk`.
pub fn region_coord(chunk: i32) -> i32 {
    chunk.div_euclid(32)
}

/// A world directory: `level.dat`, the session lock, and region files.
///
/// Opening a world touches nothing on disk. Reads of `level.dat` need no
/// lock; anything that writes, and every region access, requires a
/// [`SessionLock`] that is still held.
#[derive(Clone, Debug)]
pub struct World {
    dir: PathBuf,
    config: WorldConfig,
}

impl World {
    /// Open a world given its directory or its level file.
    pub fn open(path: impl AsRef<Path>) -> WorldResult<Self> {
        Self::open_with(path, WorldConfig::default())
    }

    /// Neither the directory nor the level file has to exist yet. A path
    /// naming an existing file other than the level file is rejected.
    pub fn open_with(path: impl AsRef<Path>, config: WorldConfig) -> WorldResult<Self> {
        let path = path.as_ref();
        let names_level_file = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.eq_ignore_ascii_case(&config.level_file));

        let dir = if path.is_dir() {
            path.to_path_buf()
        } else if names_level_file {
            path.parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."))
        } else if !path.exists() {
            path.to_path_buf()
        } else {
            return Err(WorldError::NotAWorld(path.to_path_buf()));
        };
        Ok(Self { dir, config })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn level_path(&self) -> PathBuf {
        self.dir.join(&self.config.level_file)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.dir.join(&self.config.lock_file)
    }

    /// Whether the world has a level file.
    pub fn exists(&self) -> bool {
        self.level_path().is_file()
    }

    /// Take the session lock, revoking any previous holder.
    pub fn lock(&self) -> WorldResult<SessionLock> {
        session::acquire(&self.lock_path())
    }

    /// Whether `lock` is still the current holder.
    pub fn is_held(&self, lock: &SessionLock) -> bool {
        session::is_held(&self.lock_path(), lock)
    }

    pub fn ensure_held(&self, lock: &SessionLock) -> WorldResult<()> {
        if self.is_held(lock) {
            Ok(())
        } else {
            Err(WorldError::NotLocked)
        }
    }

    /// Decode the gzip-compressed level file.
    pub fn read_level(&self) -> WorldResult<Tag> {
        let file = File::open(self.level_path())?;
        Ok(codec::decode_compressed(BufReader::new(file))?)
    }

    /// Replace the level file with `level`, gzip-compressed.
    pub fn write_level(&self, lock: &SessionLock, level: &Tag) -> WorldResult<()> {
        self.ensure_held(lock)?;
        fs::create_dir_all(&self.dir)?;
        let mut out = BufWriter::new(File::create(self.level_path())?);
        codec::encode_compressed(level, &mut out)?;
        out.flush()?;
        debug!(path = %self.level_path().display(), "wrote level file");
        Ok(())
    }

    /// Path of the region file holding chunk `(chunk_x, chunk_z)`.
    pub fn region_path(&self, dimension: Dimension, chunk_x: i32, chunk_z: i32) -> PathBuf {
        self.dir.join(dimension.region_dir()).join(format!(
            "r.{}.{}.mca",
            region_coord(chunk_x),
            region_coord(chunk_z)
        ))
    }

    /// Open the region file holding chunk `(chunk_x, chunk_z)`, creating it
    /// if needed. Every operation on the result re-checks `lock`.
    pub fn region(
        &self,
        lock: &SessionLock,
        dimension: Dimension,
        chunk_x: i32,
        chunk_z: i32,
    ) -> WorldResult<LockedRegion<'_>> {
        self.ensure_held(lock)?;
        let path = self.region_path(dimension, chunk_x, chunk_z);
        let inner = FileRegion::open_with(&path, self.config.region.clone())?;
        Ok(LockedRegion {
            world: self,
            lock: *lock,
            inner,
        })
    }
}

/// A region file of a [`World`] that refuses to operate once the session
/// lock it was opened under has been taken over.
#[derive(Debug)]
pub struct LockedRegion<'w> {
    world: &'w World,
    lock: SessionLock,
    inner: FileRegion,
}

impl LockedRegion<'_> {
    pub fn path(&self) -> &Path {
        self.inner.path()
    }

    fn check(&self) -> WorldResult<()> {
        self.world.ensure_held(&self.lock)
    }
}

impl Region for LockedRegion<'_> {
    type Error = WorldError;

    fn get_chunk(&self, x: i32, z: i32) -> WorldResult<Option<Chunk>> {
        self.check()?;
        Ok(self.inner.get_chunk(x, z)?)
    }

    fn set_chunk(&self, x: i32, z: i32, chunk: Option<&Chunk>) -> WorldResult<()> {
        self.check()?;
        Ok(self.inner.set_chunk(x, z, chunk)?)
    }

    fn get_timestamp(&self, x: i32, z: i32) -> WorldResult<i32> {
        self.check()?;
        Ok(self.inner.get_timestamp(x, z)?)
    }

    fn set_timestamp(&self, x: i32, z: i32, timestamp: i32) -> WorldResult<()> {
        self.check()?;
        Ok(self.inner.set_timestamp(x, z, timestamp)?)
    }

    fn chunk_exists(&self, x: i32, z: i32) -> WorldResult<bool> {
        self.check()?;
        Ok(self.inner.chunk_exists(x, z)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcm_nbt::Compound;

    fn level(time: i64) -> Tag {
        let mut data = Compound::new();
        data.insert("Time", time).unwrap();
        data.insert("LevelName", "test").unwrap();
        let mut root = Compound::new();
        root.insert("Data", data).unwrap();
        Tag::named("", root)
    }

    #[test]
    fn open_directory_or_level_file() {
        let dir = tempfile::tempdir().unwrap();
        let by_dir = World::open(dir.path()).unwrap();
        assert_eq!(by_dir.dir(), dir.path());

        let by_file = World::open(dir.path().join("LEVEL.DAT")).unwrap();
        assert_eq!(by_file.dir(), dir.path());
        assert_eq!(by_file.level_path(), dir.path().join("level.dat"));
    }

    #[test]
    fn open_rejects_other_files() {
        let dir = tempfile::tempdir().unwrap();
        let other = dir.path().join("notes.txt");
        fs::write(&other, "hi").unwrap();
        assert!(matches!(World::open(&other), Err(WorldError::NotAWorld(_))));
    }

    #[test]
    fn level_round_trip_requires_lock() {
        let dir = tempfile::tempdir().unwrap();
        let world = World::open(dir.path().join("w")).unwrap();
        assert!(!world.exists());

        let lock = world.lock().unwrap();
        world.write_level(&lock, &level(6000)).unwrap();
        assert!(world.exists());
        assert_eq!(world.read_level().unwrap(), level(6000));

        let _other = world.lock().unwrap();
        let err = world.write_level(&lock, &level(0)).unwrap_err();
        assert!(matches!(err, WorldError::NotLocked));
        assert_eq!(world.read_level().unwrap(), level(6000));
    }

    #[test]
    fn dimension_folders() {
        assert_eq!(Dimension::Overworld.region_dir(), PathBuf::from("region"));
        assert_eq!(Dimension::Nether.region_dir(), Path::new("DIM-1").join("region"));
        assert_eq!(Dimension::End.region_dir(), Path::new("DIM1").join("region"));
        assert_eq!("Nether".parse::<Dimension>().unwrap(), Dimension::Nether);
        assert_eq!(Dimension::from_id(1), Some(Dimension::End));
        assert!("moon".parse::<Dimension>().is_err());
    }

    #[test]
    fn region_files_are_routed_by_floor_division() {
        let world = World::open("/nonexistent/world").unwrap();
        assert_eq!(
            world.region_path(Dimension::Overworld, 31, 32),
            Path::new("/nonexistent/world/region/r.0.1.mca")
        );
        assert_eq!(
            world.region_path(Dimension::Nether, -1, -33),
            Path::new("/nonexistent/world/DIM-1/region/r.-1.-2.mca")
        );
    }

    #[test]
    fn locked_region_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let world = World::open(dir.path()).unwrap();
        let lock = world.lock().unwrap();

        let region = world.region(&lock, Dimension::End, -5, 40).unwrap();
        assert!(region.path().ends_with("DIM1/region/r.-1.1.mca"));

        let mut data = Compound::new();
        data.insert("xPos", -5i32).unwrap();
        let chunk = Chunk::new(data);
        region.set_chunk(-5, 40, Some(&chunk)).unwrap();
        region.set_timestamp(-5, 40, 42).unwrap();
        assert_eq!(region.get_chunk(-5, 40).unwrap(), Some(chunk));
        assert_eq!(region.get_timestamp(-5, 40).unwrap(), 42);
        assert!(region.chunk_exists(-5, 40).unwrap());
    }

    #[test]
    fn locked_region_stops_after_takeover() {
        let dir = tempfile::tempdir().unwrap();
        let world = World::open(dir.path()).unwrap();
        let lock = world.lock().unwrap();
        let region = world.region(&lock, Dimension::Overworld, 0, 0).unwrap();
        assert_eq!(region.get_chunk(0, 0).unwrap(), None);

        let newer = world.lock().unwrap();
        assert!(matches!(region.get_chunk(0, 0), Err(WorldError::NotLocked)));
        assert!(matches!(region.set_timestamp(0, 0, 1), Err(WorldError::NotLocked)));
        assert!(matches!(
            world.region(&lock, Dimension::Overworld, 0, 0),
            Err(WorldError::NotLocked)
        ));
        assert!(world.region(&newer, Dimension::Overworld, 0, 0).is_ok());
    }
}
