//! Grid geometry of a practice sheet and the grid-line overlay drawn over it.

use serde::{Deserialize, Serialize};

use crate::errors::LayoutError;

/// Largest accepted column or row count. The overlay holds one line per grid
/// boundary, so this also caps what `grid_lines` allocates.
pub const MAX_GRID_SIDE: u32 = 1_000;

/// Validated grid placement in image coordinates.
///
/// Construct through `GridGeometry::new`; every instance satisfies
/// `0 < columns <= MAX_GRID_SIDE`, `0 < rows <= MAX_GRID_SIDE` and a positive
/// cell pitch on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridGeometry {
    start_x: f32,
    start_y: f32,
    cell_width: f32,
    cell_height: f32,
    line_thickness: f32,
    columns: u32,
    rows: u32,
}

/// One straight grid line, integer pixel endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSegment {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    pub width: u32,
}

impl GridGeometry {
    pub fn new(
        start_x: f32,
        start_y: f32,
        cell_width: f32,
        cell_height: f32,
        line_thickness: f32,
        columns: u32,
        rows: u32,
    ) -> Result<Self, LayoutError> {
        for (field, value) in [
            ("start_x", start_x),
            ("start_y", start_y),
            ("cell_width", cell_width),
            ("cell_height", cell_height),
            ("grid_line_thickness", line_thickness),
        ] {
            if !value.is_finite() {
                return Err(LayoutError::configuration(
                    field,
                    format!("must be a finite number, got {value}"),
                ));
            }
        }
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
        for (field, count) in [("grid_columns", columns), ("grid_rows", rows)] {
            if count > MAX_GRID_SIDE {
                return Err(LayoutError::configuration(
                    field,
                    format!("must be at most {MAX_GRID_SIDE}, got {count}"),
                ));
            }
        }
        if cell_width + line_thickness <= 0.0 {
            return Err(LayoutError::configuration(
                "cell_width",
                "cell width plus line thickness must be positive",
            ));
        }
        if cell_height + line_thickness <= 0.0 {
            return Err(LayoutError::configuration(
                "cell_height",
                "cell height plus line thickness must be positive",
            ));
        }

        Ok(Self {
            start_x,
            start_y,
            cell_width,
            cell_height,
            line_thickness,
            columns,
            rows,
        })
    }

    pub fn start_x(&self) -> f32 {
        self.start_x
    }

    pub fn start_y(&self) -> f32 {
        self.start_y
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Horizontal distance between successive cell origins.
    pub fn actual_cell_width(&self) -> f32 {
        self.cell_width + self.line_thickness
    }

    /// Vertical distance between successive cell origins.
    pub fn actual_cell_height(&self) -> f32 {
        self.cell_height + self.line_thickness
    }

    /// Top-left corner of the cell at `(row, column)`. Rows past `rows` are
    /// still addressable; the grid does not clip.
    pub fn cell_origin(&self, row: u32, column: u32) -> (f32, f32) {
        (
            self.start_x + column as f32 * self.actual_cell_width(),
            self.start_y + row as f32 * self.actual_cell_height(),
        )
    }

    /// Vertical then horizontal grid lines, `columns + 1` and `rows + 1` of them.
    pub fn grid_lines(&self) -> Vec<LineSegment> {
        let width = self.line_thickness.max(0.0).round() as u32;
        let (left, top) = round_point(self.cell_origin(0, 0));
        let (right, bottom) = round_point(self.cell_origin(self.rows, self.columns));

        let verticals = (0..=self.columns).map(|i| {
            let (x, _) = round_point(self.cell_origin(0, i));
            LineSegment {
                x1: x,
                y1: top,
                x2: x,
                y2: bottom,
                width,
            }
        });
        let horizontals = (0..=self.rows).map(|i| {
            let (_, y) = round_point(self.cell_origin(i, 0));
            LineSegment {
                x1: left,
                y1: y,
                x2: right,
                y2: y,
                width,
            }
        });

        verticals.chain(horizontals).collect()
    }
}

fn round_point((x, y): (f32, f32)) -> (i32, i32) {
    (x.round() as i32, y.round() as i32)
}
