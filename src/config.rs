use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};
use tracing::warn;
use voxgen_core::ContentTable;
use voxgen_world::GeneratorConfig;

pub const DEFAULT_CONFIG_PATH: &str = "voxgen.toml";

/// Contents of `voxgen.toml`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct VoxgenConfig {
    pub generator: GeneratorConfig,
    /// JSON `{ "name": id }` registry; the sequential default table when unset.
    pub content_table: Option<PathBuf>,
}

impl VoxgenConfig {
    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<VoxgenConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    VoxgenConfig::default()
                }
            },
            Err(err) => {
                if path != Path::new(DEFAULT_CONFIG_PATH)
                    || err.kind() != std::io::ErrorKind::NotFound
                {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                }
                VoxgenConfig::default()
            }
        }
    }

    /// The content registry named by the config.
    pub fn content_table(&self) -> Result<ContentTable> {
        match &self.content_table {
            None => Ok(ContentTable::default_table()),
            Some(path) => {
                let json = fs::read_to_string(path)
                    .with_context(|| format!("reading content table {}", path.display()))?;
                ContentTable::from_json(&json)
                    .with_context(|| format!("parsing content table {}", path.display()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxgen_core::RealmKind;

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = VoxgenConfig::load_from_path(Path::new("does/not/exist/voxgen.toml"));
        assert_eq!(cfg.generator, GeneratorConfig::default());
        assert!(cfg.content_table.is_none());
    }

    #[test]
    fn nested_generator_table_parses() {
        let cfg: VoxgenConfig = toml::from_str(
            "[generator]\nseed = 9\nrealm = \"flat\"\ncaves = false\n",
        )
        .unwrap();
        assert_eq!(cfg.generator.seed, 9);
        assert_eq!(cfg.generator.realm, RealmKind::Flat);
        assert!(!cfg.generator.caves);
        assert!(cfg.generator.decorations);
    }

    #[test]
    fn malformed_file_falls_back() {
        let path = std::env::temp_dir().join("voxgen-malformed.toml");
        fs::write(&path, "generator = [").unwrap();
        let cfg = VoxgenConfig::load_from_path(&path);
        assert_eq!(cfg.generator.seed, 0);
        fs::remove_file(&path).ok();
    }
}
