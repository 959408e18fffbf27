//! Axum route handlers for the Layout API.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::layout::fill::GridFillVerdict;
use crate::layout::{
    analyze_grid_fill, layout, FontMetrics, GridFillAnalysis, LineSegment, Placement,
};
use crate::settings::{LayoutParams, LayoutSettings};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Which settings conversion to apply before laying out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Final output: every setting must be filled in.
    #[default]
    Export,
    /// Live preview: blank settings take preview fallbacks.
    Preview,
}

#[derive(Debug, Deserialize)]
pub struct LayoutRequest {
    pub text: String,
    /// Settings to lay out with; the default preset when omitted.
    #[serde(default)]
    pub settings: Option<LayoutSettings>,
    /// Font file name; the registry default when omitted.
    #[serde(default)]
    pub font: Option<String>,
    #[serde(default)]
    pub mode: RenderMode,
    #[serde(default = "default_first_line_indent")]
    pub first_line_indent: bool,
    #[serde(default)]
    pub first_line_newline: bool,
}

fn default_first_line_indent() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct LayoutResponse {
    pub font: String,
    pub font_size: u32,
    pub placements: Vec<Placement>,
    pub grid_lines: Vec<LineSegment>,
    pub fill: GridFillAnalysis,
}

#[derive(Debug, Deserialize)]
pub struct GridRequest {
    #[serde(default)]
    pub settings: Option<LayoutSettings>,
    #[serde(default)]
    pub mode: RenderMode,
}

#[derive(Debug, Serialize)]
pub struct GridResponse {
    pub grid_lines: Vec<LineSegment>,
}

#[derive(Debug, Serialize)]
pub struct FontsResponse {
    pub fonts: Vec<String>,
    pub default_font: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/fonts
pub async fn handle_list_fonts(State(state): State<AppState>) -> Json<FontsResponse> {
    Json(FontsResponse {
        fonts: state.fonts.names(),
        default_font: state.fonts.default_name().map(str::to_string),
    })
}

/// POST /api/v1/layout
///
/// Resolves settings (failing fast on bad geometry), picks the font, and runs
/// one layout pass. Returns the placements together with the grid overlay and
/// a fill report, so a renderer can draw the whole sheet from one response.
pub async fn handle_layout(
    State(state): State<AppState>,
    Json(mut request): Json<LayoutRequest>,
) -> Result<Json<LayoutResponse>, AppError> {
    let params = resolve_params(&state, request.settings.take(), request.mode).await?;
    let (font_name, font) = select_font(&state, request.font.as_deref())?;
    let options = params.format_options(request.first_line_indent, request.first_line_newline);

    // CPU-bound pass, kept off the async executor.
    let text = request.text;
    let grid = params.grid;
    let font_size = params.font_size;
    let placements = tokio::task::spawn_blocking(move || {
        layout(&text, &grid, font.as_ref(), font_size as f32, &options)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in layout: {e}")))??;

    let fill = analyze_grid_fill(&placements, &grid);
    if fill.verdict == GridFillVerdict::Overflow {
        warn!(
            overflow_rows = fill.overflow_rows,
            overflow_chars = fill.overflow_chars,
            "Text runs past the last grid row"
        );
    }
    info!(
        font = %font_name,
        placements = placements.len(),
        rows_used = fill.rows_used,
        mode = ?request.mode,
        "Layout complete"
    );

    Ok(Json(LayoutResponse {
        font: font_name,
        font_size,
        placements,
        grid_lines: grid.grid_lines(),
        fill,
    }))
}

/// POST /api/v1/grid
///
/// Grid overlay only. Lets a caller draw a degraded preview when text layout
/// failed or no font is installed.
pub async fn handle_grid(
    State(state): State<AppState>,
    Json(request): Json<GridRequest>,
) -> Result<Json<GridResponse>, AppError> {
    let params = resolve_params(&state, request.settings, request.mode).await?;
    Ok(Json(GridResponse {
        grid_lines: params.grid.grid_lines(),
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

async fn resolve_params(
    state: &AppState,
    settings: Option<LayoutSettings>,
    mode: RenderMode,
) -> Result<LayoutParams, AppError> {
    let settings = match settings {
        Some(s) => s,
        None => {
            let store = state.settings.clone();
            tokio::task::spawn_blocking(move || store.load_default())
                .await
                .map_err(|e| {
                    AppError::Internal(anyhow::anyhow!("spawn_blocking failed loading default preset: {e}"))
                })?
        }
    };
    let params = match mode {
        RenderMode::Export => settings.resolve(),
        RenderMode::Preview => settings.resolve_preview(),
    }?;
    Ok(params)
}

fn select_font(
    state: &AppState,
    requested: Option<&str>,
) -> Result<(String, Arc<dyn FontMetrics>), AppError> {
    let name = match requested {
        Some(name) => name.to_string(),
        None => state.fonts.default_name().map(str::to_string).ok_or_else(|| {
            AppError::UnprocessableEntity(format!(
                "No fonts installed in {}",
                state.config.fonts_dir.display()
            ))
        })?,
    };
    let font = state
        .fonts
        .get(&name)
        .ok_or_else(|| AppError::NotFound(format!("Font {name} not found")))?;
    Ok((name, font))
}
