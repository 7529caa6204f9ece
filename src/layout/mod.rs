pub mod resize;

pub use resize::{ResizeEdge, apply_resize, edge_at, render_resize_outline};

use ratatui::prelude::Rect;

use crate::constants::{CELL_HEIGHT_PX, CELL_WIDTH_PX};
use crate::window::{FloatRect, Geometry};

/// Pixel size of one terminal cell. Window geometry is kept in pixels and
/// mapped onto the cell grid through this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellMetrics {
    pub cell_width: u16,
    pub cell_height: u16,
}

impl Default for CellMetrics {
    fn default() -> Self {
        Self::new(CELL_WIDTH_PX, CELL_HEIGHT_PX)
    }
}

impl CellMetrics {
    pub fn new(cell_width: u16, cell_height: u16) -> Self {
        Self {
            cell_width: cell_width.max(1),
            cell_height: cell_height.max(1),
        }
    }

    /// Cells covered by `geometry`, placed relative to the desktop `origin`.
    pub fn to_cells(&self, geometry: Geometry, origin: Rect) -> FloatRect {
        let cw = self.cell_width as i32;
        let ch = self.cell_height as i32;
        let width = geometry.width.div_ceil(self.cell_width as u32);
        let height = geometry.height.div_ceil(self.cell_height as u32);
        FloatRect {
            x: origin.x as i32 + geometry.x.div_euclid(cw),
            y: origin.y as i32 + geometry.y.div_euclid(ch),
            width: width.min(u16::MAX as u32) as u16,
            height: height.min(u16::MAX as u32) as u16,
        }
    }

    /// Pixel position of a terminal cell, relative to the desktop `origin`.
    pub fn to_pixels(&self, column: u16, row: u16, origin: Rect) -> (i32, i32) {
        (
            (column as i32 - origin.x as i32) * self.cell_width as i32,
            (row as i32 - origin.y as i32) * self.cell_height as i32,
        )
    }

    /// Pixel viewport spanned by a cell area.
    pub fn viewport(&self, area: Rect) -> Geometry {
        Geometry::new(
            0,
            0,
            area.width as u32 * self.cell_width as u32,
            area.height as u32 * self.cell_height as u32,
        )
    }
}

pub fn rect_contains(rect: Rect, column: u16, row: u16) -> bool {
    if rect.width == 0 || rect.height == 0 {
        return false;
    }
    let max_x = rect.x.saturating_add(rect.width);
    let max_y = rect.y.saturating_add(rect.height);
    column >= rect.x && column < max_x && row >= rect.y && row < max_y
}
