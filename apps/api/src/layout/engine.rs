//! Grid text layout engine. Places one character per grid cell.
//!
//! # Rules
//! - Paragraphs are separated by a blank line (`"\n\n"`). Single newlines inside
//!   a paragraph are dropped; they never break a row.
//! - A row wraps when it already holds `columns` cells.
//! - Paragraph 0 may start one row down (`first_line_newline`) and/or indented
//!   two cells (`first_line_indent`).
//! - Every later paragraph starts on a fresh row, indented two cells.
//! - Each glyph is centered in its cell by its visual bounding box, then
//!   nudged by the integer offsets.
//!
//! `layout` is a pure function of its inputs. All mutable state lives in a
//! `Cursor` local to one call, so concurrent callers need no locking.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::LayoutError;
use crate::layout::font_metrics::FontMetrics;
use crate::layout::grid::GridGeometry;

/// Cells reserved in front of an indented paragraph.
const INDENT_CELLS: u32 = 2;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextFormatOptions {
    /// Indent paragraph 0 by two cells.
    pub first_line_indent: bool,
    /// Start paragraph 0 one row below the grid origin.
    pub first_line_newline: bool,
    /// Pixel nudge applied to every glyph after centering.
    pub offset_x: i32,
    pub offset_y: i32,
}

impl Default for TextFormatOptions {
    fn default() -> Self {
        Self {
            first_line_indent: true,
            first_line_newline: false,
            offset_x: 1,
            offset_y: -1,
        }
    }
}

/// One character resolved to its drawing position.
///
/// `row` and `column` are the grid cell the character occupies; rows may exceed
/// the grid's row count when the text is longer than the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub character: char,
    pub pixel_x: f32,
    pub pixel_y: f32,
    pub row: u32,
    pub column: u32,
}

/// Scratch state for one layout pass.
#[derive(Debug)]
struct Cursor<'g> {
    grid: &'g GridGeometry,
    current_x: f32,
    current_y: f32,
    row: u32,
    line_char_count: u32,
}

impl<'g> Cursor<'g> {
    fn new(grid: &'g GridGeometry) -> Self {
        Self {
            grid,
            current_x: grid.start_x(),
            current_y: grid.start_y(),
            row: 0,
            line_char_count: 0,
        }
    }

    fn new_row(&mut self) {
        self.current_x = self.grid.start_x();
        self.current_y += self.grid.actual_cell_height();
        self.row += 1;
        self.line_char_count = 0;
    }

    fn indent(&mut self) {
        self.current_x += self.grid.actual_cell_width() * INDENT_CELLS as f32;
        self.line_char_count = INDENT_CELLS;
    }

    fn advance(&mut self) {
        self.current_x += self.grid.actual_cell_width();
        self.line_char_count += 1;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Public entry point
// ────────────────────────────────────────────────────────────────────────────

/// Lays `text` out on `grid`, one character per cell, in reading order.
///
/// Fails with `LayoutError::FontMeasurement` on the first character `font`
/// cannot measure; no partial result is returned.
pub fn layout(
    text: &str,
    grid: &GridGeometry,
    font: &dyn FontMetrics,
    font_size: f32,
    options: &TextFormatOptions,
) -> Result<Vec<Placement>, LayoutError> {
    if !(font_size.is_finite() && font_size > 0.0) {
        return Err(LayoutError::configuration(
            "font_size",
            format!("must be positive, got {font_size}"),
        ));
    }

    let cell_w = grid.actual_cell_width();
    let cell_h = grid.actual_cell_height();
    let mut cursor = Cursor::new(grid);
    let mut placements = Vec::new();

    for (i, paragraph) in split_paragraphs(text).iter().enumerate() {
        if i == 0 {
            if options.first_line_newline {
                cursor.new_row();
            }
            if options.first_line_indent {
                cursor.indent();
            }
        } else {
            if cursor.line_char_count > 0 {
                cursor.new_row();
            }
            cursor.indent();
        }

        for character in paragraph.chars() {
            if cursor.line_char_count >= grid.columns() {
                cursor.new_row();
            }

            let bounds = font.glyph_bounds(character, font_size)?;
            let pixel_x =
                cursor.current_x + (cell_w - bounds.width()) / 2.0 + options.offset_x as f32;
            let pixel_y =
                cursor.current_y + (cell_h - bounds.height()) / 2.0 + options.offset_y as f32;

            placements.push(Placement {
                character,
                pixel_x,
                pixel_y,
                row: cursor.row,
                column: cursor.line_char_count,
            });
            cursor.advance();
        }
    }

    debug!(
        placements = placements.len(),
        rows = cursor.row + 1,
        columns = grid.columns(),
        "Layout pass complete"
    );
    Ok(placements)
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

/// Splits text into paragraphs on blank lines.
///
/// The whole text is trimmed first, then each paragraph is trimmed and loses
/// its interior line breaks. Paragraphs that end up empty are kept: they still
/// claim a fresh, indented row.
pub(crate) fn split_paragraphs(text: &str) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n");
    normalized
        .trim()
        .split("\n\n")
        .map(|para| {
            para.trim()
                .chars()
                .filter(|c| *c != '\n' && *c != '\r')
                .collect()
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::font_metrics::FixedMetrics;

    const GLYPH_W: f32 = 20.0;
    const GLYPH_H: f32 = 30.0;

    fn plain() -> TextFormatOptions {
        TextFormatOptions {
            first_line_indent: false,
            first_line_newline: false,
            offset_x: 0,
            offset_y: 0,
        }
    }

    fn grid(columns: u32) -> GridGeometry {
        GridGeometry::new(0.0, 0.0, 40.0, 40.0, 0.0, columns, 10).unwrap()
    }

    fn run(text: &str, g: &GridGeometry, options: &TextFormatOptions) -> Vec<Placement> {
        layout(text, g, &FixedMetrics::new(GLYPH_W, GLYPH_H), 30.0, options).unwrap()
    }

    fn cells(placements: &[Placement]) -> Vec<(char, u32, u32)> {
        placements
            .iter()
            .map(|p| (p.character, p.row, p.column))
            .collect()
    }

    // ── paragraph splitting ─────────────────────────────────────────────────

    #[test]
    fn test_split_paragraphs_strips_boundaries_and_inner_newlines() {
        let paras = split_paragraphs("  first\nline \n\n second  \n\n\n");
        assert_eq!(paras, vec!["firstline".to_string(), "second".to_string()]);
    }

    #[test]
    fn test_split_paragraphs_keeps_interior_spaces() {
        let paras = split_paragraphs("a b\tc");
        assert_eq!(paras, vec!["a b\tc".to_string()]);
    }

    #[test]
    fn test_split_paragraphs_normalizes_crlf() {
        let paras = split_paragraphs("AB\r\n\r\nCD");
        assert_eq!(paras, vec!["AB".to_string(), "CD".to_string()]);
    }

    // ── scenarios ───────────────────────────────────────────────────────────

    #[test]
    fn test_empty_text_produces_no_placements() {
        let mut opts = plain();
        opts.first_line_indent = true;
        opts.first_line_newline = true;
        assert!(run("", &grid(5), &opts).is_empty());
        assert!(run("   \n\n  ", &grid(5), &opts).is_empty());
    }

    #[test]
    fn test_two_characters_centered_in_first_cells() {
        let placements = run("AB", &grid(5), &plain());
        assert_eq!(cells(&placements), vec![('A', 0, 0), ('B', 0, 1)]);

        assert_eq!(placements[0].pixel_x, (40.0 - GLYPH_W) / 2.0);
        assert_eq!(placements[0].pixel_y, (40.0 - GLYPH_H) / 2.0);
        assert_eq!(placements[1].pixel_x, 40.0 + (40.0 - GLYPH_W) / 2.0);
        assert_eq!(placements[1].pixel_y, (40.0 - GLYPH_H) / 2.0);
    }

    #[test]
    fn test_second_paragraph_starts_new_indented_row() {
        let placements = run("AB\n\nCD", &grid(5), &plain());
        assert_eq!(
            cells(&placements),
            vec![('A', 0, 0), ('B', 0, 1), ('C', 1, 2), ('D', 1, 3)]
        );
        assert_eq!(placements[2].pixel_x, 80.0 + (40.0 - GLYPH_W) / 2.0);
        assert_eq!(placements[2].pixel_y, 40.0 + (40.0 - GLYPH_H) / 2.0);
    }

    #[test]
    fn test_overflow_wraps_to_start_of_next_row() {
        let placements = run("ABC", &grid(2), &plain());
        assert_eq!(cells(&placements), vec![('A', 0, 0), ('B', 0, 1), ('C', 1, 0)]);
        assert_eq!(placements[2].pixel_x, (40.0 - GLYPH_W) / 2.0);
    }

    // ── first-paragraph flags ───────────────────────────────────────────────

    #[test]
    fn test_first_line_indent_skips_two_cells() {
        let mut opts = plain();
        opts.first_line_indent = true;
        let placements = run("ABCD", &grid(5), &opts);
        assert_eq!(
            cells(&placements),
            vec![('A', 0, 2), ('B', 0, 3), ('C', 0, 4), ('D', 1, 0)]
        );
    }

    #[test]
    fn test_first_line_newline_moves_down_one_row() {
        let mut opts = plain();
        opts.first_line_newline = true;
        let placements = run("A", &grid(5), &opts);
        assert_eq!(cells(&placements), vec![('A', 1, 0)]);
        assert_eq!(placements[0].pixel_y, 40.0 + (40.0 - GLYPH_H) / 2.0);
    }

    #[test]
    fn test_newline_and_indent_combine() {
        let mut opts = plain();
        opts.first_line_newline = true;
        opts.first_line_indent = true;
        let placements = run("A", &grid(5), &opts);
        assert_eq!(cells(&placements), vec![('A', 1, 2)]);
    }

    #[test]
    fn test_later_paragraphs_indent_regardless_of_flag() {
        for indent in [false, true] {
            let mut opts = plain();
            opts.first_line_indent = indent;
            let placements = run("A\n\nB\n\nC", &grid(5), &opts);
            let later: Vec<_> = cells(&placements)[1..].to_vec();
            assert_eq!(later, vec![('B', 1, 2), ('C', 2, 2)], "indent={indent}");
        }
    }

    #[test]
    fn test_paragraph_after_exact_row_fill_does_not_skip_row() {
        // "ABCDE" wraps nothing but fills row 0; the next character would wrap,
        // so the paragraph break still only advances one row.
        let placements = run("ABCDE\n\nF", &grid(5), &plain());
        assert_eq!(placements[5].character, 'F');
        assert_eq!((placements[5].row, placements[5].column), (1, 2));
    }

    #[test]
    fn test_indent_wider_than_grid_wraps_before_first_glyph() {
        let mut opts = plain();
        opts.first_line_indent = true;
        let placements = run("AB", &grid(2), &opts);
        assert_eq!(cells(&placements), vec![('A', 1, 0), ('B', 1, 1)]);
    }

    #[test]
    fn test_empty_middle_paragraph_still_claims_a_row() {
        let placements = run("A\n\n \n\nB", &grid(5), &plain());
        assert_eq!(cells(&placements), vec![('A', 0, 0), ('B', 2, 2)]);
    }

    #[test]
    fn test_interior_whitespace_consumes_a_cell() {
        let placements = run("A B", &grid(5), &plain());
        assert_eq!(cells(&placements), vec![('A', 0, 0), (' ', 0, 1), ('B', 0, 2)]);
    }

    #[test]
    fn test_single_newline_does_not_break_row() {
        let placements = run("AB\nCD", &grid(5), &plain());
        assert!(placements.iter().all(|p| p.row == 0));
        assert_eq!(placements.len(), 4);
    }

    // ── geometry ────────────────────────────────────────────────────────────

    #[test]
    fn test_offsets_and_line_thickness_shift_positions() {
        let g = GridGeometry::new(100.0, 50.0, 40.0, 40.0, 2.0, 5, 5).unwrap();
        let opts = TextFormatOptions {
            first_line_indent: false,
            first_line_newline: false,
            offset_x: 1,
            offset_y: -1,
        };
        let placements = run("AB\n\nC", &g, &opts);

        let cell = 42.0;
        assert_eq!(placements[0].pixel_x, 100.0 + (cell - GLYPH_W) / 2.0 + 1.0);
        assert_eq!(placements[0].pixel_y, 50.0 + (cell - GLYPH_H) / 2.0 - 1.0);
        assert_eq!(placements[1].pixel_x, 100.0 + cell + (cell - GLYPH_W) / 2.0 + 1.0);
        assert_eq!(placements[2].pixel_x, 100.0 + 2.0 * cell + (cell - GLYPH_W) / 2.0 + 1.0);
        assert_eq!(placements[2].pixel_y, 50.0 + cell + (cell - GLYPH_H) / 2.0 - 1.0);
    }

    #[test]
    fn test_placement_matches_cell_origin() {
        let g = GridGeometry::new(7.5, 3.25, 30.0, 36.0, 1.0, 4, 4).unwrap();
        let placements = run("一二三四五六七\n\n八九", &g, &TextFormatOptions::default());
        for p in &placements {
            let (x, y) = g.cell_origin(p.row, p.column);
            let expected_x = x + (g.actual_cell_width() - GLYPH_W) / 2.0 + 1.0;
            let expected_y = y + (g.actual_cell_height() - GLYPH_H) / 2.0 - 1.0;
            assert!((p.pixel_x - expected_x).abs() < 1e-3, "{p:?}");
            assert!((p.pixel_y - expected_y).abs() < 1e-3, "{p:?}");
        }
    }

    // ── invariants ──────────────────────────────────────────────────────────

    #[test]
    fn test_placement_count_matches_visible_characters() {
        let text = "  春眠不觉晓，\n处处闻啼鸟。 \n\n夜来 风雨声，\n\n花落知多少。\n";
        let expected: usize = split_paragraphs(text)
            .iter()
            .map(|p| p.chars().count())
            .sum();
        let placements = run(text, &grid(4), &TextFormatOptions::default());
        assert_eq!(placements.len(), expected);
        assert_eq!(expected, 12 + 7 + 6);
    }

    #[test]
    fn test_columns_never_exceed_grid_width() {
        let text = "abcdefghijklmnopqrstuvwxyz\n\nABCDEFGHIJ\n\n0123456789";
        for columns in 1..=7 {
            let placements = run(text, &grid(columns), &TextFormatOptions::default());
            assert!(
                placements.iter().all(|p| p.column < columns),
                "columns={columns}"
            );
        }
    }

    #[test]
    fn test_layout_is_deterministic() {
        let g = grid(6);
        let opts = TextFormatOptions::default();
        let text = "重复调用\n\n结果相同";
        assert_eq!(run(text, &g, &opts), run(text, &g, &opts));
    }

    // ── errors ──────────────────────────────────────────────────────────────

    #[test]
    fn test_unmeasurable_character_aborts_layout() {
        let mut font = FixedMetrics::new(GLYPH_W, GLYPH_H);
        font.missing.push('☃');
        let err = layout("AB☃C", &grid(5), &font, 30.0, &plain()).unwrap_err();
        assert!(matches!(
            err,
            LayoutError::FontMeasurement { character: '☃', .. }
        ));
    }

    #[test]
    fn test_non_positive_font_size_rejected() {
        let err = layout("A", &grid(5), &FixedMetrics::new(1.0, 1.0), 0.0, &plain()).unwrap_err();
        assert!(matches!(
            err,
            LayoutError::Configuration {
                field: "font_size",
                ..
            }
        ));
    }
}
