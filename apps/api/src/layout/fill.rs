//! Grid fill analysis: how much of the sheet a layout pass used.
//!
//! The engine never clips: text longer than the sheet keeps flowing into rows
//! below the last grid row. This module tells the caller when that happened.

use serde::{Deserialize, Serialize};

use crate::layout::engine::Placement;
use crate::layout::grid::GridGeometry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridFillVerdict {
    /// Nothing was placed.
    Empty,
    /// Every placement lies inside the grid.
    Fits,
    /// At least one placement lies below the last grid row.
    Overflow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridFillAnalysis {
    pub rows_used: u32,
    pub rows_available: u32,
    pub cells_used: u32,
    pub cells_available: u32,
    /// Rows beyond `rows_available` that hold at least one character.
    pub overflow_rows: u32,
    /// Characters placed outside the grid.
    pub overflow_chars: u32,
    pub verdict: GridFillVerdict,
}

/// Summarizes a placement list against the grid it was laid out on.
///
/// `rows_used` counts from the grid's first row to the last row holding a
/// character, so a leading blank row from `first_line_newline` is included.
pub fn analyze_grid_fill(placements: &[Placement], grid: &GridGeometry) -> GridFillAnalysis {
    let rows_available = grid.rows();
    let cells_available = grid.rows().saturating_mul(grid.columns());

    let rows_used = placements.iter().map(|p| p.row + 1).max().unwrap_or(0);
    let overflow_chars = placements.iter().filter(|p| p.row >= rows_available).count() as u32;
    let overflow_rows = rows_used.saturating_sub(rows_available);

    let verdict = if placements.is_empty() {
        GridFillVerdict::Empty
    } else if overflow_chars > 0 {
        GridFillVerdict::Overflow
    } else {
        GridFillVerdict::Fits
    };

    GridFillAnalysis {
        rows_used,
        rows_available,
        cells_used: placements.len() as u32,
        cells_available,
        overflow_rows,
        overflow_chars,
        verdict,
    }
}
