use std::io::{Read, Write};

use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;
use serde::{Deserialize, Serialize};

/// Compression wrapped around an encoded tag stream.
///
/// The ids are the ones stored in region record headers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionScheme {
    #[default]
    GZip,
    Zlib,
    None,
}

impl CompressionScheme {
    /// flate2 level used when none is configured.
    pub const DEFAULT_LEVEL: u32 = 6;

    pub fn id(self) -> u8 {
        match self {
            Self::GZip => 1,
            Self::Zlib => 2,
            Self::None => 3,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Self::GZip),
            2 => Some(Self::Zlib),
            3 => Some(Self::None),
            _ => None,
        }
    }

    pub fn compress(self, data: &[u8]) -> std::io::Result<Vec<u8>> {
        self.compress_with(data, Self::DEFAULT_LEVEL)
    }

    /// Compress `data` at `level` (0-9; clamped).
    pub fn compress_with(self, data: &[u8], level: u32) -> std::io::Result<Vec<u8>> {
        let level = Compression::new(level.min(9));
        match self {
            Self::GZip => {
                let mut encoder = GzEncoder::new(Vec::new(), level);
                encoder.write_all(data)?;
                encoder.finish()
            }
            Self::Zlib => {
                let mut encoder = ZlibEncoder::new(Vec::new(), level);
                encoder.write_all(data)?;
                encoder.finish()
            }
            Self::None => Ok(data.to_vec()),
        }
    }

    pub fn decompress(self, data: &[u8]) -> std::io::Result<Vec<u8>> {
        let mut out = Vec::new();
        match self {
            Self::GZip => {
                GzDecoder::new(data).read_to_end(&mut out)?;
            }
            Self::Zlib => {
                ZlibDecoder::new(data).read_to_end(&mut out)?;
            }
            Self::None => out.extend_from_slice(data),
        }
        Ok(out)
    }

    /// Wrap a sink so bytes written to it are compressed.
    pub(crate) fn writer<'a, W: Write + 'a>(self, sink: W, level: u32) -> Box<dyn FinishWrite + 'a> {
        let level = Compression::new(level.min(9));
        match self {
            Self::GZip => Box::new(GzEncoder::new(sink, level)),
            Self::Zlib => Box::new(ZlibEncoder::new(sink, level)),
            Self::None => Box::new(Passthrough(sink)),
        }
    }

    /// Wrap a source so bytes read from it are decompressed.
    pub(crate) fn reader<'a, R: Read + 'a>(self, source: R) -> Box<dyn Read + 'a> {
        match self {
            Self::GZip => Box::new(GzDecoder::new(source)),
            Self::Zlib => Box::new(ZlibDecoder::new(source)),
            Self::None => Box::new(source),
        }
    }
}

impl std::fmt::Display for CompressionScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::GZip => "gzip",
            Self::Zlib => "zlib",
            Self::None => "none",
        })
    }
}

/// A writer that must be told when the stream is complete.
pub(crate) trait FinishWrite: Write {
    fn finish_stream(self: Box<Self>) -> std::io::Result<()>;
}

impl<W: Write> FinishWrite for GzEncoder<W> {
    fn finish_stream(self: Box<Self>) -> std::io::Result<()> {
        let mut inner = (*self).finish()?;
        inner.flush()
    }
}

impl<W: Write> FinishWrite for ZlibEncoder<W> {
    fn finish_stream(self: Box<Self>) -> std::io::Result<()> {
        let mut inner = (*self).finish()?;
        inner.flush()
    }
}

struct Passthrough<W>(W);

impl<W: Write> Write for Passthrough<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0.flush()
    }
}

impl<W: Write> FinishWrite for Passthrough<W> {
    fn finish_stream(mut self: Box<Self>) -> std::io::Result<()> {
        self.0.flush()
    }
}
