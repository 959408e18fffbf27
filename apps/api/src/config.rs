use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable has a default, so a bare `gridprint` starts in the current folder.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Folder scanned for `.ttf` / `.otf` files at startup.
    pub fonts_dir: PathBuf,
    /// Folder holding settings presets (`<name>.json`).
    pub settings_dir: PathBuf,
    /// Font file name to select when a request names none.
    pub default_font: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            fonts_dir: env_path("FONTS_DIR", "fonts"),
            settings_dir: env_path("SETTINGS_DIR", "config"),
            default_font: std::env::var("DEFAULT_FONT")
                .ok()
                .filter(|name| !name.trim().is_empty()),
        })
    }
}

fn env_path(key: &str, default: &str) -> PathBuf {
    std::env::var(key)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}
