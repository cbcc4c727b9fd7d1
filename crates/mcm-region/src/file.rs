use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use mcm_nbt::{codec, CompressionScheme, NbtMapped};
use tracing::{debug, warn};

use crate::chunk::Chunk;
use crate::config::RegionConfig;
use crate::error::{RegionError, RegionResult};
use crate::location::{
    location_offset, sectors_needed, slot_coords, slot_index, timestamp_offset, Location,
    HEADER_SIZE, RECORD_HEADER_SIZE, SECTOR_SIZE, SLOT_COUNT,
};
use crate::traits::Region;

/// Largest sector count a location entry can hold.
const MAX_RECORD_SECTORS: u64 = u8::MAX as u64;

/// One occupied slot, as reported by [`FileRegion::occupied`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotInfo {
    pub index: usize,
    /// Local chunk x within the region, `0..32`.
    pub x: i32,
    /// Local chunk z within the region, `0..32`.
    pub z: i32,
    pub location: Location,
    pub timestamp: i32,
}

/// A region stored in a single file.
///
/// No header state is cached: every operation opens the file and reads the
/// entries it needs, so several `FileRegion`s (or other programs) may share a
/// file as long as writes do not overlap. A record is always written before
/// the location entry that points at it. Sectors abandoned by a relocation or
/// a cleared slot are never reused, so the file only grows.
#[derive(Clone, Debug)]
pub struct FileRegion {
    path: PathBuf,
    config: RegionConfig,
}

impl FileRegion {
    /// Open the region at `path` with the default configuration, creating an
    /// empty file if it does not exist.
    pub fn open(path: impl AsRef<Path>) -> RegionResult<Self> {
        Self::open_with(path, RegionConfig::default())
    }

    pub fn open_with(path: impl AsRef<Path>, config: RegionConfig) -> RegionResult<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut file = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)?;
            file.write_all(&[0u8; HEADER_SIZE as usize])?;
            file.sync_all()?;
            debug!(path = %path.display(), "created empty region file");
        }
        Ok(Self { path, config })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &RegionConfig {
        &self.config
    }

    /// Where slot `(x, z)`'s record lives, if the slot is occupied.
    pub fn location(&self, x: i32, z: i32) -> RegionResult<Option<Location>> {
        let mut file = self.open_read()?;
        read_location(&mut file, slot_index(x, z))
    }

    /// Every occupied slot with its location and timestamp, in slot order.
    pub fn occupied(&self) -> RegionResult<Vec<SlotInfo>> {
        let mut file = self.open_read()?;
        let mut header = vec![0u8; HEADER_SIZE as usize];
        read_header(&mut file, &mut header)?;

        let (locations, timestamps) = header.split_at(SECTOR_SIZE as usize);
        let mut slots = Vec::new();
        for index in 0..SLOT_COUNT {
            let raw = entry(locations, index);
            let Some(location) = decode_entry(raw, index) else {
                continue;
            };
            let (x, z) = slot_coords(index);
            slots.push(SlotInfo {
                index,
                x,
                z,
                location,
                timestamp: i32::from_be_bytes(entry(timestamps, index)),
            });
        }
        Ok(slots)
    }

    /// Current length of the file in bytes.
    pub fn file_len(&self) -> RegionResult<u64> {
        Ok(fs::metadata(&self.path)?.len())
    }

    fn open_read(&self) -> io::Result<File> {
        File::open(&self.path)
    }

    fn open_write(&self) -> io::Result<File> {
        OpenOptions::new().read(true).write(true).open(&self.path)
    }

    fn encode_record(&self, chunk: &Chunk) -> RegionResult<Vec<u8>> {
        let scheme = self.config.compression;
        let mut payload = Vec::new();
        codec::encode_with(
            scheme,
            self.config.compression_level,
            &chunk.to_nbt(chunk.name())?,
            &mut payload,
        )?;

        let length = payload.len() as u64 + 1;
        let sectors = sectors_needed(length);
        if sectors > MAX_RECORD_SECTORS {
            return Err(RegionError::RecordTooLarge {
                sectors: sectors as usize,
            });
        }

        let mut record = Vec::with_capacity((sectors * SECTOR_SIZE) as usize);
        record.extend_from_slice(&(length as u32).to_be_bytes());
        record.push(scheme.id());
        record.extend_from_slice(&payload);
        record.resize((sectors * SECTOR_SIZE) as usize, 0);
        Ok(record)
    }
}

impl Region for FileRegion {
    type Error = RegionError;

    fn get_chunk(&self, x: i32, z: i32) -> RegionResult<Option<Chunk>> {
        let index = slot_index(x, z);
        let mut file = self.open_read()?;
        let Some(location) = read_location(&mut file, index)? else {
            return Ok(None);
        };

        let corrupt = |reason: String| RegionError::CorruptRecord { index, reason };

        file.seek(SeekFrom::Start(location.byte_offset()))?;
        let mut header = [0u8; RECORD_HEADER_SIZE as usize];
        read_record(&mut file, &mut header, index, "record header")?;

        let length = u64::from(u32::from_be_bytes([
            header[0], header[1], header[2], header[3],
        ]));
        if length == 0 {
            return Err(corrupt("record length is zero".into()));
        }
        if length + 4 > location.byte_len() {
            return Err(corrupt(format!(
                "record length {length} overruns its {} reserved sectors",
                location.sectors
            )));
        }
        let scheme = CompressionScheme::from_id(header[4])
            .ok_or(RegionError::UnknownCompression(header[4]))?;

        let mut payload = vec![0u8; (length - 1) as usize];
        read_record(&mut file, &mut payload, index, "record payload")?;

        let tag = codec::decode_with(scheme, payload.as_slice())?;
        Ok(Some(Chunk::from_nbt(&tag)?))
    }

    fn set_chunk(&self, x: i32, z: i32, chunk: Option<&Chunk>) -> RegionResult<()> {
        let index = slot_index(x, z);
        let Some(chunk) = chunk else {
            let mut file = self.open_write()?;
            write_location(&mut file, index, None)?;
            debug!(x, z, index, "cleared region slot");
            return Ok(());
        };

        let record = self.encode_record(chunk)?;
        let sectors = record.len() as u64 / SECTOR_SIZE;

        let mut file = self.open_write()?;
        let offset = match read_location(&mut file, index)? {
            Some(current) if u64::from(current.sectors) >= sectors => {
                debug!(x, z, index, offset = current.offset, sectors, "rewriting record in place");
                u64::from(current.offset)
            }
            current => {
                let data_len = file.metadata()?.len().saturating_sub(HEADER_SIZE);
                let offset = data_len.div_ceil(SECTOR_SIZE);
                if !Location::fits(offset) {
                    return Err(RegionError::OffsetOverflow { offset });
                }
                debug!(
                    x,
                    z,
                    index,
                    from = ?current.map(|l| l.offset),
                    to = offset,
                    sectors,
                    "appending record at end of file"
                );
                offset
            }
        };

        let location = Location {
            offset: offset as u32,
            sectors: sectors as u8,
        };
        file.seek(SeekFrom::Start(location.byte_offset()))?;
        file.write_all(&record)?;
        write_location(&mut file, index, Some(location))?;
        Ok(())
    }

    fn get_timestamp(&self, x: i32, z: i32) -> RegionResult<i32> {
        let mut file = self.open_read()?;
        file.seek(SeekFrom::Start(timestamp_offset(slot_index(x, z))))?;
        let mut raw = [0u8; 4];
        read_header(&mut file, &mut raw)?;
        Ok(i32::from_be_bytes(raw))
    }

    fn set_timestamp(&self, x: i32, z: i32, timestamp: i32) -> RegionResult<()> {
        let mut file = self.open_write()?;
        file.seek(SeekFrom::Start(timestamp_offset(slot_index(x, z))))?;
        file.write_all(&timestamp.to_be_bytes())?;
        Ok(())
    }

    fn chunk_exists(&self, x: i32, z: i32) -> RegionResult<bool> {
        Ok(self.location(x, z)?.is_some())
    }
}

fn entry(table: &[u8], index: usize) -> [u8; 4] {
    let at = 4 * index;
    [table[at], table[at + 1], table[at + 2], table[at + 3]]
}

fn decode_entry(raw: [u8; 4], index: usize) -> Option<Location> {
    let location = Location::decode(raw);
    if location.is_none() && raw != [0; 4] {
        warn!(index, entry = ?raw, "ignoring location entry that points into the header");
    }
    location
}

fn read_location(file: &mut File, index: usize) -> RegionResult<Option<Location>> {
    file.seek(SeekFrom::Start(location_offset(index)))?;
    let mut raw = [0u8; 4];
    read_header(file, &mut raw)?;
    Ok(decode_entry(raw, index))
}

/// Reads from the 8192-byte header at the current position. A file too short
/// to hold the header is malformed, not an I/O failure.
fn read_header(file: &mut File, buf: &mut [u8]) -> RegionResult<()> {
    match file.read_exact(buf) {
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(RegionError::TruncatedHeader {
            len: file.metadata()?.len(),
        }),
        other => Ok(other?),
    }
}

fn write_location(file: &mut File, index: usize, location: Option<Location>) -> io::Result<()> {
    file.seek(SeekFrom::Start(location_offset(index)))?;
    file.write_all(&Location::encode(location))
}

fn read_record(file: &mut File, buf: &mut [u8], index: usize, what: &str) -> RegionResult<()> {
    file.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => RegionError::CorruptRecord {
            index,
            reason: format!("{what} runs past end of file"),
        },
        _ => e.into(),
    })
}
