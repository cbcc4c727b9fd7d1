use std::path::PathBuf;

use mcm_nbt::NbtError;
use mcm_region::RegionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorldError {
    #[error("world is no longer locked by this session")]
    NotLocked,

    #[error("not a world directory or level.dat file: {0}")]
    NotAWorld(PathBuf),

    #[error("invalid configuration in {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error(transparent)]
    Region(#[from] RegionError),

    #[error(transparent)]
    Nbt(#[from] NbtError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type WorldResult<T> = Result<T, WorldError>;
