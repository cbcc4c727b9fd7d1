use std::fs;
use std::path::Path;

use mcm_region::RegionConfig;
use serde::{Deserialize, Serialize};

use crate::error::{WorldError, WorldResult};

/// File names and write settings for a world directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub level_file: String,
    pub lock_file: String,
    pub region: RegionConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            level_file: "level.dat".into(),
            lock_file: "session.lock".into(),
            region: RegionConfig::default(),
        }
    }
}

impl WorldConfig {
    /// Load from a TOML file. Missing keys take their defaults.
    pub fn load(path: &Path) -> WorldResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml(&text).map_err(|reason| WorldError::Config {
            path: path.to_path_buf(),
            reason,
        })
    }

    pub fn from_toml(text: &str) -> Result<Self, String> {
        toml::from_str(text).map_err(|e| e.to_string())
    }

    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcm_nbt::CompressionScheme;

    #[test]
    fn default_config() {
        let c = WorldConfig::default();
        assert_eq!(c.level_file, "level.dat");
        assert_eq!(c.lock_file, "session.lock");
        assert_eq!(c.region, RegionConfig::default());
    }

    #[test]
    fn nested_region_table() {
        let c = WorldConfig::from_toml(
            "lock_file = \"other.lock\"\n[region]\ncompression = \"none\"\n",
        )
        .unwrap();
        assert_eq!(c.lock_file, "other.lock");
        assert_eq!(c.level_file, "level.dat");
        assert_eq!(c.region.compression, CompressionScheme::None);
    }

    #[test]
    fn toml_round_trip() {
        let mut c = WorldConfig::default();
        c.region.compression_level = 9;
        let text = c.to_toml().unwrap();
        assert_eq!(WorldConfig::from_toml(&text).unwrap(), c);
    }

    #[test]
    fn load_reports_path_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("world.toml");
        fs::write(&path, "level_file = 5").unwrap();
        let err = WorldConfig::load(&path).unwrap_err();
        assert!(matches!(err, WorldError::Config { .. }));
        assert!(err.to_string().contains("world.toml"));
    }
}
