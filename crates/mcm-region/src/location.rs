//! Header layout of a region file.
//!
//! ```text
//! [0    .. 4096)  1024 location entries: [3 bytes: sector BE][1 byte: sector count]
//! [4096 .. 8192)  1024 timestamps (big-endian i32)
//! [8192 ..)       data area, in 4096-byte sectors
//! ```
//!
//! Location entries count sectors from the start of the file, so the first
//! data-area sector is stored as 2. An all-zero entry marks an empty slot.

/// Bytes per sector.
pub const SECTOR_SIZE: u64 = 4096;

/// Bytes before the first data sector (location table + timestamp table).
pub const HEADER_SIZE: u64 = 2 * SECTOR_SIZE;

/// Chunks per region side.
pub const REGION_WIDTH: i32 = 32;

/// Slots per region file.
pub const SLOT_COUNT: usize = 1024;

/// Sectors occupied by the header, as counted in location entries.
const HEADER_SECTORS: u32 = 2;

/// Largest value a 3-byte sector field can hold.
pub const MAX_STORED_SECTOR: u32 = 0x00FF_FFFF;

/// Size of the `[length][compression id]` record prefix.
pub const RECORD_HEADER_SIZE: u64 = 5;

/// Slot for chunk `(x, z)`. Coordinates outside `0..32` wrap, so world chunk
/// coordinates (including negative ones) can be passed directly.
pub fn slot_index(x: i32, z: i32) -> usize {
    let lx = x.rem_euclid(REGION_WIDTH) as usize;
    let lz = z.rem_euclid(REGION_WIDTH) as usize;
    lx + lz * REGION_WIDTH as usize
}

/// Local `(x, z)` of a slot index.
pub fn slot_coords(index: usize) -> (i32, i32) {
    let width = REGION_WIDTH as usize;
    ((index % width) as i32, (index / width) as i32)
}

/// Sectors needed for a record whose length field is `length`
/// (the 4-byte length prefix itself is not included in `length`).
pub fn sectors_needed(length: u64) -> u64 {
    (length + 4).div_ceil(SECTOR_SIZE)
}

/// Byte offset of a slot's location entry.
pub fn location_offset(index: usize) -> u64 {
    4 * index as u64
}

/// Byte offset of a slot's timestamp.
pub fn timestamp_offset(index: usize) -> u64 {
    SECTOR_SIZE + 4 * index as u64
}

/// Where a slot's record lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    /// First sector of the record, counted from the start of the data area.
    pub offset: u32,
    /// Sectors reserved for the record.
    pub sectors: u8,
}

impl Location {
    /// Byte position of the record in the file.
    pub fn byte_offset(&self) -> u64 {
        HEADER_SIZE + u64::from(self.offset) * SECTOR_SIZE
    }

    /// Bytes reserved for the record.
    pub fn byte_len(&self) -> u64 {
        u64::from(self.sectors) * SECTOR_SIZE
    }

    /// Parse an on-disk entry. Entries with a zero count or a sector inside
    /// the header describe no record.
    pub fn decode(raw: [u8; 4]) -> Option<Location> {
        let stored = u32::from_be_bytes([0, raw[0], raw[1], raw[2]]);
        let sectors = raw[3];
        if sectors == 0 || stored < HEADER_SECTORS {
            return None;
        }
        Some(Location {
            offset: stored - HEADER_SECTORS,
            sectors,
        })
    }

    /// On-disk entry for `location`, or the all-zero entry for an empty slot.
    ///
    /// Callers must have checked the offset with [`Location::fits`].
    pub fn encode(location: Option<Location>) -> [u8; 4] {
        match location {
            None => [0; 4],
            Some(loc) => {
                let stored = (loc.offset + HEADER_SECTORS).to_be_bytes();
                [stored[1], stored[2], stored[3], loc.sectors]
            }
        }
    }

    /// Whether a record starting at data-area sector `offset` can be
    /// addressed by a location entry.
    pub fn fits(offset: u64) -> bool {
        offset + u64::from(HEADER_SECTORS) <= u64::from(MAX_STORED_SECTOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_index_basic() {
        assert_eq!(slot_index(0, 0), 0);
        assert_eq!(slot_index(31, 0), 31);
        assert_eq!(slot_index(0, 1), 32);
        assert_eq!(slot_index(31, 31), 1023);
    }

    #[test]
    fn slot_index_wraps_world_coordinates() {
        assert_eq!(slot_index(32, 0), 0);
        assert_eq!(slot_index(-1, 0), 31);
        assert_eq!(slot_index(-1, -1), 1023);
        assert_eq!(slot_index(-33, 65), 31 + 32);
    }

    #[test]
    fn coords_invert_index() {
        for index in [0, 1, 31, 32, 517, 1023] {
            let (x, z) = slot_coords(index);
            assert_eq!(slot_index(x, z), index);
        }
    }

    #[test]
    fn sector_rounding() {
        assert_eq!(sectors_needed(1), 1);
        assert_eq!(sectors_needed(4092), 1);
        assert_eq!(sectors_needed(4093), 2);
        assert_eq!(sectors_needed(601), 1);
        assert_eq!(sectors_needed(5001), 2);
    }

    #[test]
    fn entries_count_from_file_start() {
        let loc = Location {
            offset: 0,
            sectors: 1,
        };
        assert_eq!(Location::encode(Some(loc)), [0, 0, 2, 1]);
        assert_eq!(Location::decode([0, 0, 2, 1]), Some(loc));
        assert_eq!(loc.byte_offset(), 8192);

        let far = Location {
            offset: 0x0001_0203,
            sectors: 255,
        };
        assert_eq!(Location::decode(Location::encode(Some(far))), Some(far));
    }

    #[test]
    fn empty_entries() {
        assert_eq!(Location::encode(None), [0; 4]);
        assert_eq!(Location::decode([0; 4]), None);
        assert_eq!(Location::decode([0, 0, 5, 0]), None);
        assert_eq!(Location::decode([0, 0, 1, 3]), None);
    }

    #[test]
    fn offset_limit() {
        assert!(Location::fits(0));
        assert!(Location::fits(u64::from(MAX_STORED_SECTOR) - 2));
        assert!(!Location::fits(u64::from(MAX_STORED_SECTOR) - 1));
    }

    #[test]
    fn table_offsets() {
        assert_eq!(location_offset(1023), 4092);
        assert_eq!(timestamp_offset(0), 4096);
        assert_eq!(timestamp_offset(1023), 8188);
    }
}
