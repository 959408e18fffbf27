//! Glyph measurement: the capability the layout engine centers characters with.
//!
//! The engine only ever asks for a character's visual bounding box at a point
//! size. `FontdueMetrics` answers that from a parsed TrueType/OpenType font;
//! `FontRegistry` owns every font found in the fonts folder.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use fontdue::{Font, FontSettings};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::LayoutError;

// ────────────────────────────────────────────────────────────────────────────
// Bounding box
// ────────────────────────────────────────────────────────────────────────────

/// Visual bounding box of one glyph, in pixels, y growing downward.
///
/// Coordinates are relative to the pen position on the baseline, so `min_y`
/// is usually negative (above the baseline).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlyphBounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl GlyphBounds {
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Measures single characters for the layout engine.
///
/// Implementations must fail with `LayoutError::FontMeasurement` for a
/// character they cannot render rather than returning a substitute box.
pub trait FontMetrics: Send + Sync {
    fn glyph_bounds(&self, ch: char, point_size: f32) -> Result<GlyphBounds, LayoutError>;
}

// ────────────────────────────────────────────────────────────────────────────
// fontdue backend
// ────────────────────────────────────────────────────────────────────────────

/// `FontMetrics` over a parsed font file.
pub struct FontdueMetrics {
    font: Font,
}

impl FontdueMetrics {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| anyhow::anyhow!("Failed to parse font: {e}"))?;
        Ok(Self { font })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read font file {}", path.display()))?;
        Self::from_bytes(&bytes).with_context(|| format!("Invalid font file {}", path.display()))
    }
}

impl FontMetrics for FontdueMetrics {
    fn glyph_bounds(&self, ch: char, point_size: f32) -> Result<GlyphBounds, LayoutError> {
        if !(point_size.is_finite() && point_size > 0.0) {
            return Err(LayoutError::configuration(
                "font_size",
                format!("must be positive, got {point_size}"),
            ));
        }
        // Index 0 is .notdef: the font would draw a tofu box for this character.
        // Whitespace at index 0 is still measured, and gets the .notdef box.
        if self.font.lookup_glyph_index(ch) == 0 && !ch.is_whitespace() {
            return Err(LayoutError::font_measurement(ch, "glyph missing from font"));
        }

        // fontdue reports outline bounds with y growing upward from the baseline.
        let outline = self.font.metrics(ch, point_size).bounds;
        Ok(GlyphBounds {
            min_x: outline.xmin,
            min_y: -(outline.ymin + outline.height),
            max_x: outline.xmin + outline.width,
            max_y: -outline.ymin,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Registry
// ────────────────────────────────────────────────────────────────────────────

/// Every usable font in the fonts folder, keyed by file name.
#[derive(Default)]
pub struct FontRegistry {
    fonts: BTreeMap<String, Arc<dyn FontMetrics>>,
    default_name: Option<String>,
}

impl FontRegistry {
    /// Loads all `.ttf` / `.otf` files in `dir`. Files that fail to parse are
    /// skipped with a warning; an empty folder yields an empty registry.
    pub fn load_dir(dir: &Path, preferred_default: Option<&str>) -> Result<Self> {
        let mut registry = FontRegistry::default();

        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to list fonts folder {}", dir.display()))?;

        for entry in entries {
            let path = entry?.path();
            let Some(name) = font_file_name(&path) else {
                continue;
            };
            match FontdueMetrics::from_path(&path) {
                Ok(metrics) => {
                    registry.insert(name, Arc::new(metrics));
                }
                Err(e) => warn!(font = %name, "Skipping unreadable font: {e:#}"),
            }
        }

        registry.set_default(preferred_default);
        info!(
            count = registry.fonts.len(),
            default = registry.default_name.as_deref().unwrap_or("none"),
            "Font registry loaded"
        );
        Ok(registry)
    }

    pub fn insert(&mut self, name: String, metrics: Arc<dyn FontMetrics>) {
        self.fonts.insert(name, metrics);
        if self.default_name.is_none() {
            self.set_default(None);
        }
    }

    /// Picks `preferred` when it is loaded, otherwise the first name alphabetically.
    pub fn set_default(&mut self, preferred: Option<&str>) {
        self.default_name = match preferred {
            Some(name) if self.fonts.contains_key(name) => Some(name.to_string()),
            Some(name) => {
                warn!(font = %name, "Preferred default font is not loaded");
                self.fonts.keys().next().cloned()
            }
            None => self.fonts.keys().next().cloned(),
        };
    }

    pub fn names(&self) -> Vec<String> {
        self.fonts.keys().cloned().collect()
    }

    pub fn default_name(&self) -> Option<&str> {
        self.default_name.as_deref()
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn FontMetrics>> {
        self.fonts.get(name).cloned()
    }
}

fn font_file_name(path: &Path) -> Option<String> {
    if !path.is_file() {
        return None;
    }
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    if ext != "ttf" && ext != "otf" {
        return None;
    }
    path.file_name()?.to_str().map(str::to_string)
}

// ────────────────────────────────────────────────────────────────────────────
// Test fixture
// ────────────────────────────────────────────────────────────────────────────

/// Deterministic metrics for tests: every glyph is a box of the given size,
/// except the listed characters which fail to measure.
#[cfg(test)]
pub(crate) struct FixedMetrics {
    pub width: f32,
    pub height: f32,
    pub missing: Vec<char>,
}

#[cfg(test)]
impl FixedMetrics {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            missing: vec![],
        }
    }
}

#[cfg(test)]
impl FontMetrics for FixedMetrics {
    fn glyph_bounds(&self, ch: char, _point_size: f32) -> Result<GlyphBounds, LayoutError> {
        if self.missing.contains(&ch) {
            return Err(LayoutError::font_measurement(ch, "glyph missing from font"));
        }
        Ok(GlyphBounds {
            min_x: 0.0,
            min_y: -self.height,
            max_x: self.width,
            max_y: 0.0,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
