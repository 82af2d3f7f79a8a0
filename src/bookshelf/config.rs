//! # Configuration
//!
//! Settings are stored as `bookshelf.json` in the data directory. Every key is
//! optional; [`CatalogPaths::resolve`] fills in the defaults.
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `app-root` | current directory | Base for relative cover paths given on save |
//! | `documents-dir` | `<data>/books` | Root of the metadata namespace |
//! | `covers-dir` | `<data>/covers` | Root of the cover image namespace |
//!
//! Relative values are taken relative to the data directory.

use crate::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "bookshelf.json";
const DEFAULT_DOCUMENTS_DIR: &str = "books";
const DEFAULT_COVERS_DIR: &str = "covers";

pub const CONFIG_KEYS: &[&str] = &["app-root", "documents-dir", "covers-dir"];

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct CatalogConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_root: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub covers_dir: Option<PathBuf>,
}

impl CatalogConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(CatalogError::Io)?;
        let config: CatalogConfig =
            serde_json::from_str(&content).map_err(CatalogError::Serialization)?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(CatalogError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(CatalogError::Serialization)?;
        fs::write(config_path, content).map_err(CatalogError::Io)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<&Path>> {
        Ok(self.slot(key)?.as_deref())
    }

    pub fn set(&mut self, key: &str, value: impl Into<PathBuf>) -> Result<()> {
        *self.slot_mut(key)? = Some(value.into());
        Ok(())
    }

    pub fn unset(&mut self, key: &str) -> Result<()> {
        *self.slot_mut(key)? = None;
        Ok(())
    }

    fn slot(&self, key: &str) -> Result<&Option<PathBuf>> {
        match key {
            "app-root" => Ok(&self.app_root),
            "documents-dir" => Ok(&self.documents_dir),
            "covers-dir" => Ok(&self.covers_dir),
            other => Err(unknown_key(other)),
        }
    }

    fn slot_mut(&mut self, key: &str) -> Result<&mut Option<PathBuf>> {
        match key {
            "app-root" => Ok(&mut self.app_root),
            "documents-dir" => Ok(&mut self.documents_dir),
            "covers-dir" => Ok(&mut self.covers_dir),
            other => Err(unknown_key(other)),
        }
    }
}

fn unknown_key(key: &str) -> CatalogError {
    CatalogError::Store(format!(
        "Unknown config key: {} (expected one of {})",
        key,
        CONFIG_KEYS.join(", ")
    ))
}

/// Effective locations used to build the stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPaths {
    pub data_dir: PathBuf,
    pub app_root: PathBuf,
    pub documents: PathBuf,
    pub covers: PathBuf,
}

impl CatalogPaths {
    pub fn resolve(config: &CatalogConfig, data_dir: &Path, cwd: &Path) -> Self {
        let under_data = |configured: &Option<PathBuf>, default: &str| match configured {
            Some(path) => data_dir.join(path),
            None => data_dir.join(default),
        };

        Self {
            data_dir: data_dir.to_path_buf(),
            app_root: config
                .app_root
                .as_ref()
                .map(|p| data_dir.join(p))
                .unwrap_or_else(|| cwd.to_path_buf()),
            documents: under_data(&config.documents_dir, DEFAULT_DOCUMENTS_DIR),
            covers: under_data(&config.covers_dir, DEFAULT_COVERS_DIR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_config() {
        let dir = TempDir::new().unwrap();
        let config = CatalogConfig::load(dir.path()).unwrap();
        assert_eq!(config, CatalogConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("not/yet/there");

        let mut config = CatalogConfig::default();
        config.set("covers-dir", "/srv/covers").unwrap();
        config.save(&nested).unwrap();

        let loaded = CatalogConfig::load(&nested).unwrap();
        assert_eq!(loaded.covers_dir, Some(PathBuf::from("/srv/covers")));
        assert_eq!(loaded.documents_dir, None);
    }

    #[test]
    fn test_unset_keys_are_not_written() {
        let json = serde_json::to_string(&CatalogConfig::default()).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn test_file_keys_match_cli_keys() {
        let mut config = CatalogConfig::default();
        config.set("documents-dir", "records").unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"documents-dir":"records"}"#);
    }

    #[test]
    fn test_unknown_key() {
        let mut config = CatalogConfig::default();
        assert!(matches!(
            config.set("file-ext", ".md"),
            Err(CatalogError::Store(_))
        ));
        assert!(config.get("nope").is_err());
    }

    #[test]
    fn test_get_and_unset() {
        let mut config = CatalogConfig::default();
        config.set("app-root", "assets").unwrap();
        assert_eq!(config.get("app-root").unwrap(), Some(Path::new("assets")));
        config.unset("app-root").unwrap();
        assert_eq!(config.get("app-root").unwrap(), None);
    }

    #[test]
    fn test_resolve_defaults() {
        let paths = CatalogPaths::resolve(
            &CatalogConfig::default(),
            Path::new("/data"),
            Path::new("/work"),
        );
        assert_eq!(paths.app_root, PathBuf::from("/work"));
        assert_eq!(paths.documents, PathBuf::from("/data/books"));
        assert_eq!(paths.covers, PathBuf::from("/data/covers"));
    }

    #[test]
    fn test_resolve_relative_and_absolute_overrides() {
        let config = CatalogConfig {
            app_root: Some(PathBuf::from("assets")),
            documents_dir: Some(PathBuf::from("/elsewhere/books")),
            covers_dir: None,
        };
        let paths = CatalogPaths::resolve(&config, Path::new("/data"), Path::new("/work"));
        assert_eq!(paths.app_root, PathBuf::from("/data/assets"));
        assert_eq!(paths.documents, PathBuf::from("/elsewhere/books"));
    }
}
