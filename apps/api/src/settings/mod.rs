//! Layout settings: the flat record the UI edits and saves as presets.
//!
//! Values are kept as text exactly as the user typed them. They only become
//! typed numbers through `resolve` (export) or `resolve_preview` (live
//! preview), which is where every ConfigurationError originates.

pub mod handlers;
pub mod store;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::errors::LayoutError;
use crate::layout::{GridGeometry, TextFormatOptions};

pub use store::SettingsStore;

// ────────────────────────────────────────────────────────────────────────────
// Settings record
// ────────────────────────────────────────────────────────────────────────────

/// One settings preset. Keys missing from a saved file take the `Default` value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    #[serde(deserialize_with = "text_or_number")]
    pub start_x: String,
    #[serde(deserialize_with = "text_or_number")]
    pub start_y: String,
    #[serde(deserialize_with = "text_or_number")]
    pub cell_width: String,
    #[serde(deserialize_with = "text_or_number")]
    pub cell_height: String,
    #[serde(deserialize_with = "text_or_number")]
    pub font_size: String,
    #[serde(deserialize_with = "text_or_number")]
    pub offset_x: String,
    #[serde(deserialize_with = "text_or_number")]
    pub offset_y: String,
    #[serde(deserialize_with = "text_or_number")]
    pub grid_columns: String,
    #[serde(deserialize_with = "text_or_number")]
    pub grid_rows: String,
    #[serde(deserialize_with = "text_or_number")]
    pub grid_line_thickness: String,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            start_x: "0.0".to_string(),
            start_y: "0.0".to_string(),
            cell_width: "0.0".to_string(),
            cell_height: "0.0".to_string(),
            font_size: String::new(),
            offset_x: "1".to_string(),
            offset_y: "-1".to_string(),
            grid_columns: String::new(),
            grid_rows: String::new(),
            grid_line_thickness: "1.0".to_string(),
        }
    }
}

/// Typed, validated parameters for one layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    pub grid: GridGeometry,
    pub font_size: u32,
    pub offset_x: i32,
    pub offset_y: i32,
}

impl LayoutParams {
    pub fn format_options(&self, first_line_indent: bool, first_line_newline: bool) -> TextFormatOptions {
        TextFormatOptions {
            first_line_indent,
            first_line_newline,
            offset_x: self.offset_x,
            offset_y: self.offset_y,
        }
    }
}

/// Values substituted for blank fields while previewing.
struct PreviewFallbacks;

impl PreviewFallbacks {
    const START: f32 = 0.0;
    const CELL: f32 = 50.0;
    const GRID_SIZE: i64 = 10;
    const FONT_SIZE: i64 = 30;
    const OFFSET: i64 = 0;
    const LINE_THICKNESS: f32 = 1.0;
}

impl LayoutSettings {
    /// The record used when a default preset exists but cannot be read:
    /// geometry left blank for the user to fill in.
    pub fn blank() -> Self {
        Self {
            start_x: String::new(),
            start_y: String::new(),
            cell_width: String::new(),
            cell_height: String::new(),
            ..Self::default()
        }
    }

    /// Strict conversion used for final output: every field must be present.
    pub fn resolve(&self) -> Result<LayoutParams, LayoutError> {
        let grid = GridGeometry::new(
            parse_float("start_x", &self.start_x, None)?,
            parse_float("start_y", &self.start_y, None)?,
            parse_float("cell_width", &self.cell_width, None)?,
            parse_float("cell_height", &self.cell_height, None)?,
            parse_float("grid_line_thickness", &self.grid_line_thickness, None)?,
            parse_count("grid_columns", &self.grid_columns, None)?,
            parse_count("grid_rows", &self.grid_rows, None)?,
        )?;

        Ok(LayoutParams {
            grid,
            font_size: parse_count("font_size", &self.font_size, None)?,
            offset_x: parse_offset("offset_x", &self.offset_x, None)?,
            offset_y: parse_offset("offset_y", &self.offset_y, None)?,
        })
    }

    /// Lenient conversion for live preview: blank fields take preview
    /// fallbacks, but text that is present must still parse.
    pub fn resolve_preview(&self) -> Result<LayoutParams, LayoutError> {
        let start = Some(PreviewFallbacks::START);
        let cell = Some(PreviewFallbacks::CELL);
        let grid = GridGeometry::new(
            parse_float("start_x", &self.start_x, start)?,
            parse_float("start_y", &self.start_y, start)?,
            parse_float("cell_width", &self.cell_width, cell)?,
            parse_float("cell_height", &self.cell_height, cell)?,
            parse_float(
                "grid_line_thickness",
                &self.grid_line_thickness,
                Some(PreviewFallbacks::LINE_THICKNESS),
            )?,
            parse_count("grid_columns", &self.grid_columns, Some(PreviewFallbacks::GRID_SIZE))?,
            parse_count("grid_rows", &self.grid_rows, Some(PreviewFallbacks::GRID_SIZE))?,
        )?;

        Ok(LayoutParams {
            grid,
            font_size: parse_count("font_size", &self.font_size, Some(PreviewFallbacks::FONT_SIZE))?,
            offset_x: parse_offset("offset_x", &self.offset_x, Some(PreviewFallbacks::OFFSET))?,
            offset_y: parse_offset("offset_y", &self.offset_y, Some(PreviewFallbacks::OFFSET))?,
        })
    }

    /// Copy prepared for saving: positional fields rewritten with one decimal
    /// place (`"12"` → `"12.0"`), everything else kept as entered.
    pub fn normalized(&self) -> Result<Self, LayoutError> {
        let one_decimal = |field: &'static str, raw: &str| -> Result<String, LayoutError> {
            parse_float(field, raw, None).map(|v| format!("{v:.1}"))
        };

        Ok(Self {
            start_x: one_decimal("start_x", &self.start_x)?,
            start_y: one_decimal("start_y", &self.start_y)?,
            cell_width: one_decimal("cell_width", &self.cell_width)?,
            cell_height: one_decimal("cell_height", &self.cell_height)?,
            grid_line_thickness: one_decimal("grid_line_thickness", &self.grid_line_thickness)?,
            ..self.clone()
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Parameter suggestion
// ────────────────────────────────────────────────────────────────────────────

/// Smallest font size `suggest` will propose.
const MIN_SUGGESTED_FONT_SIZE: u32 = 1;

/// Derives a starting preset from a sheet's pixel size and its grid shape:
/// cells split the image evenly and the font sits slightly inside a cell.
pub fn suggest(
    image_width: u32,
    image_height: u32,
    columns: u32,
    rows: u32,
) -> Result<LayoutSettings, LayoutError> {
    if columns == 0 {
        return Err(LayoutError::configuration(
            "grid_columns",
            "must be a positive integer",
        ));
    }
    if rows == 0 {
        return Err(LayoutError::configuration(
            "grid_rows",
            "must be a positive integer",
        ));
    }

    let cell_width = image_width / columns;
    let cell_height = image_height / rows;
    let font_size = cell_width
        .min(cell_height)
        .saturating_sub(4)
        .max(MIN_SUGGESTED_FONT_SIZE);

    Ok(LayoutSettings {
        start_x: "0".to_string(),
        start_y: "0".to_string(),
        cell_width: cell_width.to_string(),
        cell_height: cell_height.to_string(),
        font_size: font_size.to_string(),
        grid_columns: columns.to_string(),
        grid_rows: rows.to_string(),
        ..LayoutSettings::default()
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Field parsing
// ────────────────────────────────────────────────────────────────────────────

fn parse_float(field: &'static str, raw: &str, fallback: Option<f32>) -> Result<f32, LayoutError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return fallback.ok_or_else(|| LayoutError::configuration(field, "is required"));
    }
    let value: f32 = raw
        .parse()
        .map_err(|_| LayoutError::configuration(field, format!("expected a number, got {raw:?}")))?;
    if !value.is_finite() {
        return Err(LayoutError::configuration(
            field,
            format!("must be a finite number, got {raw:?}"),
        ));
    }
    Ok(value)
}

fn parse_integer(field: &'static str, raw: &str, fallback: Option<i64>) -> Result<i64, LayoutError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return fallback.ok_or_else(|| LayoutError::configuration(field, "is required"));
    }
    raw.parse()
        .map_err(|_| LayoutError::configuration(field, format!("expected an integer, got {raw:?}")))
}

/// Positive integer (grid dimensions, font size).
fn parse_count(field: &'static str, raw: &str, fallback: Option<i64>) -> Result<u32, LayoutError> {
    let value = parse_integer(field, raw, fallback)?;
    match u32::try_from(value) {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(LayoutError::configuration(
            field,
            format!("must be a positive integer, got {value}"),
        )),
    }
}

fn parse_offset(field: &'static str, raw: &str, fallback: Option<i64>) -> Result<i32, LayoutError> {
    let value = parse_integer(field, raw, fallback)?;
    i32::try_from(value)
        .map_err(|_| LayoutError::configuration(field, format!("out of range: {value}")))
}

/// Accepts `"12.5"`, `12.5` or `null` (blank) for any settings key.
fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number, got {other}"
        ))),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
