use mcm_nbt::CompressionScheme;
use serde::{Deserialize, Serialize};

/// How chunks are compressed when written to a region file.
///
/// Reading always honours the scheme recorded in each record header.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    /// Scheme for newly written records (default: gzip).
    pub compression: CompressionScheme,
    /// flate2 level, 0-9 (default: 6).
    pub compression_level: u32,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            compression: CompressionScheme::GZip,
            compression_level: CompressionScheme::DEFAULT_LEVEL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = RegionConfig::default();
        assert_eq!(c.compression, CompressionScheme::GZip);
        assert_eq!(c.compression_level, 6);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let c: RegionConfig = toml::from_str("compression = \"zlib\"").unwrap();
        assert_eq!(c.compression, CompressionScheme::Zlib);
        assert_eq!(c.compression_level, 6);
    }
}
