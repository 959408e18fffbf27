//! Preset files in the settings folder, one pretty-printed JSON file per name.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use crate::settings::LayoutSettings;

/// Preset loaded at startup and by `GET /api/v1/settings/default`.
pub const DEFAULT_PRESET: &str = "default";

#[derive(Debug, Clone)]
pub struct SettingsStore {
    dir: PathBuf,
}

impl SettingsStore {
    /// Opens the settings folder, creating it when missing.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create settings folder {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Preset names (file stems of `*.json`), sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to list {}", self.dir.display()))?
        {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if is_valid_name(stem) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Reads a preset. `Ok(None)` when no such preset exists.
    pub fn load(&self, name: &str) -> Result<Option<LayoutSettings>> {
        let path = self.path_for(name)?;
        if !path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read preset {}", path.display()))?;
        let settings = serde_json::from_str(&raw)
            .with_context(|| format!("Preset {} is not valid settings JSON", path.display()))?;
        Ok(Some(settings))
    }

    /// Writes a preset, replacing any existing file of that name.
    pub fn save(&self, name: &str, settings: &LayoutSettings) -> Result<()> {
        let path = self.path_for(name)?;
        let body = serde_json::to_string_pretty(settings)?;
        std::fs::write(&path, body)
            .with_context(|| format!("Failed to write preset {}", path.display()))?;
        info!(preset = %name, "Settings preset saved");
        Ok(())
    }

    /// The startup preset. A missing file gives the documented defaults; a
    /// file that exists but cannot be used gives a blank record.
    pub fn load_default(&self) -> LayoutSettings {
        match self.load(DEFAULT_PRESET) {
            Ok(Some(settings)) => settings,
            Ok(None) => LayoutSettings::default(),
            Err(e) => {
                warn!("Failed to load default settings: {e:#}");
                LayoutSettings::blank()
            }
        }
    }

    fn path_for(&self, name: &str) -> Result<PathBuf> {
        if !is_valid_name(name) {
            bail!("Invalid preset name {name:?}");
        }
        Ok(self.dir.join(format!("{name}.json")))
    }
}

/// Preset names are limited to `[A-Za-z0-9_-]`, at most 64 characters, so
/// every path stays inside the settings folder.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 64
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, SettingsStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::open(dir.path().join("config")).unwrap();
        (dir, store)
    }

    fn sample() -> LayoutSettings {
        LayoutSettings {
            start_x: "10.0".to_string(),
            grid_columns: "12".to_string(),
            grid_rows: "16".to_string(),
            font_size: "40".to_string(),
            ..LayoutSettings::default()
        }
    }

    #[test]
    fn test_open_creates_folder() {
        let (_tmp, store) = store();
        assert!(store.dir().is_dir());
    }

    #[test]
    fn test_save_then_load_preset() {
        let (_tmp, store) = store();
        store.save("kaishu", &sample()).unwrap();
        assert_eq!(store.load("kaishu").unwrap(), Some(sample()));
    }

    #[test]
    fn test_load_missing_preset_is_none() {
        let (_tmp, store) = store();
        assert_eq!(store.load("absent").unwrap(), None);
    }

    #[test]
    fn test_list_returns_sorted_json_stems() {
        let (_tmp, store) = store();
        store.save("zeta", &sample()).unwrap();
        store.save("alpha", &sample()).unwrap();
        std::fs::write(store.dir().join("readme.txt"), "x").unwrap();
        assert_eq!(store.list().unwrap(), vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_saved_file_is_flat_string_record() {
        let (_tmp, store) = store();
        store.save("flat", &sample()).unwrap();
        let raw = std::fs::read_to_string(store.dir().join("flat.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["grid_columns"], "12");
        assert_eq!(value["offset_y"], "-1");
    }

    #[test]
    fn test_path_traversal_names_rejected() {
        let (_tmp, store) = store();
        assert!(store.save("../escape", &sample()).is_err());
        assert!(store.load("a/b").is_err());
        assert!(!is_valid_name(""));
        assert!(is_valid_name("A4_sheet-2"));
    }

    #[test]
    fn test_load_default_without_file_uses_defaults() {
        let (_tmp, store) = store();
        assert_eq!(store.load_default(), LayoutSettings::default());
    }

    #[test]
    fn test_load_default_reads_partial_file() {
        let (_tmp, store) = store();
        std::fs::write(
            store.dir().join("default.json"),
            r#"{"grid_columns": "9", "grid_rows": "9"}"#,
        )
        .unwrap();
        let settings = store.load_default();
        assert_eq!(settings.grid_columns, "9");
        assert_eq!(settings.offset_x, "1");
    }

    #[test]
    fn test_load_default_corrupt_file_gives_blank() {
        let (_tmp, store) = store();
        std::fs::write(store.dir().join("default.json"), "{not json").unwrap();
        assert_eq!(store.load_default(), LayoutSettings::blank());
    }
}
