use crate::rows::{Row, RowId, Rows};

/// Column widths in character cells: indicator, gauge, max label.
pub const COLUMN_CELLS: [u16; 3] = [3, 32, 6];

/// Pixel size of one character cell and the gaps around cells, derived
/// from the font size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellMetrics {
    pub char_width: f32,
    pub line_height: f32,
    pub padding: f32,
    pub spacing: f32,
}

impl CellMetrics {
    pub fn for_font_size(size: f32) -> Self {
        Self {
            char_width: size * 0.6,
            line_height: (size * 1.6).ceil(),
            padding: (size * 0.5).round(),
            spacing: (size * 0.25).round(),
        }
    }

    pub fn width_of(&self, cells: u16) -> f32 {
        f32::from(cells) * self.char_width
    }
}

/// Where one row sits in the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub row: RowId,
    /// Columns taken by the gauge, starting at column 1.
    pub gauge_span: u16,
    pub max_label: bool,
}

/// The gauge grid: one line per configured row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    columns: u16,
    placements: Vec<Placement>,
}

impl Grid {
    /// Lay out the configured rows. A third column exists only when at
    /// least one row shows its max label.
    pub fn build(rows: &Rows, show_max: bool) -> Self {
        let with_max = |row: &Row| show_max && row.spec.supports_max;
        let configured: Vec<(RowId, &Row)> =
            rows.iter().filter(|(_, row)| row.is_configured()).collect();
        let columns = if configured.iter().any(|(_, row)| with_max(row)) { 3 } else { 2 };

        let placements = configured
            .into_iter()
            .map(|(id, row)| Placement {
                row: id,
                gauge_span: if with_max(row) { 1 } else { columns - 1 },
                max_label: with_max(row),
            })
            .collect();

        Self { columns, placements }
    }

    pub fn columns(&self) -> u16 {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.placements.len()
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Per-column widths in cells. Without a max-label column the gauge
    /// column keeps the room the label would have had.
    pub fn column_cells(&self) -> Vec<u16> {
        let [indicator, gauge, max] = COLUMN_CELLS;
        if self.columns == 3 {
            vec![indicator, gauge, max]
        } else {
            vec![indicator, gauge + max]
        }
    }

    /// A merged gauge column also covers the gap before the label column,
    /// so the width is the same with or without max labels.
    pub fn min_pixel_width(&self, cell: &CellMetrics) -> u32 {
        let cells: u16 = self.column_cells().iter().sum();
        let gaps = (COLUMN_CELLS.len() - 1) as f32 * cell.spacing;
        (2.0 * cell.padding + cell.width_of(cells) + gaps).ceil() as u32
    }

    pub fn min_pixel_height(&self, cell: &CellMetrics) -> u32 {
        let lines = self.rows() as f32;
        let gaps = self.rows().saturating_sub(1) as f32 * cell.spacing;
        (2.0 * cell.padding + lines * cell.line_height + gaps).ceil() as u32
    }
}

/// Verbose report printed after each resize, with the grid's minimum size.
pub fn resize_report(min_width: u32, min_height: u32) -> String {
    format!("window size updated\nwidth  = {min_width}\nheight = {min_height}\n")
}

/// Final window size: the forced width wins only when it is wider.
pub fn window_size(forced_width: u16, min_width: u32, min_height: u32) -> (u32, u32) {
    (min_width.max(u32::from(forced_width)), min_height)
}
