use ratatui::style::Style;

use crate::ui::UiFrame;
use crate::window::{FloatRect, Geometry, Size};

/// One of the eight resize handles around a window border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeEdge {
    N,
    S,
    E,
    W,
    NE,
    NW,
    SE,
    SW,
}

impl ResizeEdge {
    pub const ALL: [ResizeEdge; 8] = [
        ResizeEdge::N,
        ResizeEdge::S,
        ResizeEdge::E,
        ResizeEdge::W,
        ResizeEdge::NE,
        ResizeEdge::NW,
        ResizeEdge::SE,
        ResizeEdge::SW,
    ];

    /// West-facing handles move `x` and keep the right edge anchored.
    pub fn moves_left(self) -> bool {
        matches!(self, ResizeEdge::W | ResizeEdge::NW | ResizeEdge::SW)
    }

    /// North-facing handles move `y` and keep the bottom edge anchored.
    pub fn moves_top(self) -> bool {
        matches!(self, ResizeEdge::N | ResizeEdge::NW | ResizeEdge::NE)
    }

    pub fn moves_right(self) -> bool {
        matches!(self, ResizeEdge::E | ResizeEdge::NE | ResizeEdge::SE)
    }

    pub fn moves_bottom(self) -> bool {
        matches!(self, ResizeEdge::S | ResizeEdge::SW | ResizeEdge::SE)
    }

    pub fn label(self) -> &'static str {
        match self {
            ResizeEdge::N => "n",
            ResizeEdge::S => "s",
            ResizeEdge::E => "e",
            ResizeEdge::W => "w",
            ResizeEdge::NE => "ne",
            ResizeEdge::NW => "nw",
            ResizeEdge::SE => "se",
            ResizeEdge::SW => "sw",
        }
    }
}

/// Geometry after dragging `edge` of `start` by `(dx, dy)` pixels.
///
/// Width and height never drop below `min`. When a west or north handle runs
/// into the minimum, the origin is pulled back so the opposite edge stays put.
pub fn apply_resize(start: Geometry, edge: ResizeEdge, dx: i32, dy: i32, min: Size) -> Geometry {
    let dx = dx as i64;
    let dy = dy as i64;
    let mut x = start.x as i64;
    let mut y = start.y as i64;
    let mut width = start.width as i64;
    let mut height = start.height as i64;

    if edge.moves_left() {
        x += dx;
        width -= dx;
    } else if edge.moves_right() {
        width += dx;
    }
    if edge.moves_top() {
        y += dy;
        height -= dy;
    } else if edge.moves_bottom() {
        height += dy;
    }

    let min_w = min.width as i64;
    let min_h = min.height as i64;
    if width < min_w {
        if edge.moves_left() {
            x -= min_w - width;
        }
        width = min_w;
    }
    if height < min_h {
        if edge.moves_top() {
            y -= min_h - height;
        }
        height = min_h;
    }

    Geometry {
        x: x.clamp(i32::MIN as i64, i32::MAX as i64) as i32,
        y: y.clamp(i32::MIN as i64, i32::MAX as i64) as i32,
        width: width.min(u32::MAX as i64) as u32,
        height: height.min(u32::MAX as i64) as u32,
    }
}

/// Handle under a cell of the window's border, if any.
pub fn edge_at(rect: FloatRect, column: u16, row: u16) -> Option<ResizeEdge> {
    if rect.width < 2 || rect.height < 2 || !rect.contains(column, row) {
        return None;
    }
    let column = column as i32;
    let row = row as i32;
    let left = column == rect.x;
    let right = column == rect.right();
    let top = row == rect.y;
    let bottom = row == rect.bottom();
    match (top, bottom, left, right) {
        (true, _, true, _) => Some(ResizeEdge::NW),
        (true, _, _, true) => Some(ResizeEdge::NE),
        (_, true, true, _) => Some(ResizeEdge::SW),
        (_, true, _, true) => Some(ResizeEdge::SE),
        (true, _, _, _) => Some(ResizeEdge::N),
        (_, true, _, _) => Some(ResizeEdge::S),
        (_, _, true, _) => Some(ResizeEdge::W),
        (_, _, _, true) => Some(ResizeEdge::E),
        _ => None,
    }
}

/// Double-line outline drawn over a window while it is being resized.
pub fn render_resize_outline(frame: &mut UiFrame<'_>, rect: FloatRect, style: Style) {
    if rect.width < 2 || rect.height < 2 {
        return;
    }
    let right = rect.right();
    let bottom = rect.bottom();
    for x in rect.x + 1..right {
        frame.put_signed(x, rect.y, "═", style);
        frame.put_signed(x, bottom, "═", style);
    }
    for y in rect.y + 1..bottom {
        frame.put_signed(rect.x, y, "║", style);
        frame.put_signed(right, y, "║", style);
    }
    frame.put_signed(rect.x, rect.y, "╔", style);
    frame.put_signed(right, rect.y, "╗", style);
    frame.put_signed(rect.x, bottom, "╚", style);
    frame.put_signed(right, bottom, "╝", style);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> Geometry {
        Geometry::new(100, 100, 400, 300)
    }

    #[test]
    fn nw_moves_origin_and_shrinks() {
        let g = apply_resize(start(), ResizeEdge::NW, 30, 20, Size::default());
        assert_eq!(g, Geometry::new(130, 120, 370, 280));
    }

    #[test]
    fn nw_clamps_to_minimum_with_right_edge_anchored() {
        let g = apply_resize(start(), ResizeEdge::NW, 350, 290, Size::default());
        assert_eq!(g.width, 200);
        assert_eq!(g.height, 150);
        // opposite corner stays where it was
        assert_eq!(g.x + g.width as i32, 500);
        assert_eq!(g.y + g.height as i32, 400);
    }

    #[test]
    fn se_changes_only_size() {
        let g = apply_resize(start(), ResizeEdge::SE, 15, -25, Size::default());
        assert_eq!(g, Geometry::new(100, 100, 415, 275));
    }

    #[test]
    fn s_clamps_without_moving_origin() {
        let g = apply_resize(start(), ResizeEdge::S, 0, -1000, Size::default());
        assert_eq!(g, Geometry::new(100, 100, 400, 150));
    }

    #[test]
    fn ne_moves_top_and_grows_right() {
        let g = apply_resize(start(), ResizeEdge::NE, 10, -10, Size::default());
        assert_eq!(g, Geometry::new(100, 90, 410, 310));
    }

    #[test]
    fn sw_moves_left_and_grows_down() {
        let g = apply_resize(start(), ResizeEdge::SW, -10, 10, Size::default());
        assert_eq!(g, Geometry::new(90, 100, 410, 310));
    }

    #[test]
    fn every_edge_respects_minimum() {
        let tiny = Size::default();
        for edge in ResizeEdge::ALL {
            let g = apply_resize(start(), edge, 5000, 5000, tiny);
            assert!(g.width >= tiny.width, "{} width", edge.label());
            assert!(g.height >= tiny.height, "{} height", edge.label());
            let g = apply_resize(start(), edge, -5000, -5000, tiny);
            assert!(g.width >= tiny.width, "{} width", edge.label());
            assert!(g.height >= tiny.height, "{} height", edge.label());
        }
    }

    #[test]
    fn edge_at_maps_border_cells() {
        let r = FloatRect {
            x: 2,
            y: 1,
            width: 6,
            height: 4,
        };
        assert_eq!(edge_at(r, 2, 1), Some(ResizeEdge::NW));
        assert_eq!(edge_at(r, 7, 1), Some(ResizeEdge::NE));
        assert_eq!(edge_at(r, 2, 4), Some(ResizeEdge::SW));
        assert_eq!(edge_at(r, 7, 4), Some(ResizeEdge::SE));
        assert_eq!(edge_at(r, 4, 1), Some(ResizeEdge::N));
        assert_eq!(edge_at(r, 4, 4), Some(ResizeEdge::S));
        assert_eq!(edge_at(r, 2, 2), Some(ResizeEdge::W));
        assert_eq!(edge_at(r, 7, 3), Some(ResizeEdge::E));
        assert_eq!(edge_at(r, 4, 2), None);
        assert_eq!(edge_at(r, 9, 2), None);
    }
}
