use mcm_nbt::NbtError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegionError {
    #[error("unknown compression scheme id {0}")]
    UnknownCompression(u8),

    #[error("region header is truncated: file is {len} bytes, header needs 8192")]
    TruncatedHeader { len: u64 },

    #[error("corrupt record in slot {index}: {reason}")]
    CorruptRecord { index: usize, reason: String },

    #[error("record needs {sectors} sectors, more than the 255 a slot can address")]
    RecordTooLarge { sectors: usize },

    #[error("sector offset {offset} does not fit in a 24-bit location entry")]
    OffsetOverflow { offset: u64 },

    #[error(transparent)]
    Nbt(#[from] NbtError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RegionError {
    /// Whether the file (or a record in it) holds malformed data.
    pub fn is_format_error(&self) -> bool {
        match self {
            Self::UnknownCompression(_)
            | Self::TruncatedHeader { .. }
            | Self::CorruptRecord { .. } => true,
            Self::Nbt(e) => e.is_format_error(),
            _ => false,
        }
    }
}

impl From<mcm_nbt::FormatError> for RegionError {
    fn from(err: mcm_nbt::FormatError) -> Self {
        Self::Nbt(err.into())
    }
}

pub type RegionResult<T> = Result<T, RegionError>;
