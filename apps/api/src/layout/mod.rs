// Grid text layout: geometry, glyph measurement, the placement engine, and
// the fill report returned alongside each pass.
// Layout is CPU-bound and runs inside tokio::task::spawn_blocking.

pub mod engine;
pub mod fill;
pub mod font_metrics;
pub mod grid;
pub mod handlers;

// Re-export the public API consumed by other modules (settings, handlers).
pub use engine::{layout, Placement, TextFormatOptions};
pub use fill::{analyze_grid_fill, GridFillAnalysis};
pub use font_metrics::{FontMetrics, FontRegistry};
pub use grid::{GridGeometry, LineSegment};
