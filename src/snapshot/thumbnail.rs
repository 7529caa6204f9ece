use std::time::Instant;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};

use super::SnapshotError;
use crate::ui::UiFrame;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailCell {
    pub symbol: String,
    pub fg: Color,
    pub bg: Color,
}

/// Scaled-down copy of a window's rendered content, shown by the launcher.
#[derive(Debug, Clone, PartialEq)]
pub struct Thumbnail {
    width: u16,
    height: u16,
    cells: Vec<ThumbnailCell>,
    captured_at: Instant,
}

impl Thumbnail {
    /// Nearest-neighbour downsample of `surface` into at most
    /// `width` x `height` cells. Never upscales.
    pub fn encode(surface: &Buffer, width: u16, height: u16) -> Result<Self, SnapshotError> {
        let source = surface.area;
        if source.width == 0 || source.height == 0 || width == 0 || height == 0 {
            return Err(SnapshotError::EmptySurface);
        }
        let out_w = width.min(source.width);
        let out_h = height.min(source.height);
        let mut cells = Vec::with_capacity(out_w as usize * out_h as usize);
        for ty in 0..out_h {
            let sy = source.y + (ty as u32 * source.height as u32 / out_h as u32) as u16;
            for tx in 0..out_w {
                let sx = source.x + (tx as u32 * source.width as u32 / out_w as u32) as u16;
                let cell = match surface.cell((sx, sy)) {
                    Some(cell) => ThumbnailCell {
                        symbol: cell.symbol().to_string(),
                        fg: cell.fg,
                        bg: cell.bg,
                    },
                    None => ThumbnailCell {
                        symbol: " ".to_string(),
                        fg: Color::Reset,
                        bg: Color::Reset,
                    },
                };
                cells.push(cell);
            }
        }
        Ok(Self {
            width: out_w,
            height: out_h,
            cells,
            captured_at: Instant::now(),
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn captured_at(&self) -> Instant {
        self.captured_at
    }

    pub fn cell(&self, x: u16, y: u16) -> Option<&ThumbnailCell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get(y as usize * self.width as usize + x as usize)
    }

    /// Draw the thumbnail at the top-left of `area`, clipped to it.
    pub fn render_into(&self, frame: &mut UiFrame<'_>, area: Rect) {
        let w = self.width.min(area.width);
        let h = self.height.min(area.height);
        for y in 0..h {
            for x in 0..w {
                if let Some(cell) = self.cell(x, y) {
                    frame.put_signed(
                        area.x as i32 + x as i32,
                        area.y as i32 + y as i32,
                        &cell.symbol,
                        Style::default().fg(cell.fg).bg(cell.bg),
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn striped(width: u16, height: u16) -> Buffer {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        for y in 0..height {
            for x in 0..width {
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.set_symbol(if x % 2 == 0 { "a" } else { "b" });
                }
            }
        }
        buf
    }

    #[test]
    fn encode_downsamples_to_requested_size() {
        let thumb = Thumbnail::encode(&striped(48, 16), 24, 8).unwrap();
        assert_eq!((thumb.width(), thumb.height()), (24, 8));
        // every second source column is picked, all of them "a"
        assert_eq!(thumb.cell(3, 2).unwrap().symbol, "a");
    }

    #[test]
    fn encode_never_upscales() {
        let thumb = Thumbnail::encode(&striped(4, 2), 24, 8).unwrap();
        assert_eq!((thumb.width(), thumb.height()), (4, 2));
        assert_eq!(thumb.cell(1, 0).unwrap().symbol, "b");
        assert!(thumb.cell(4, 0).is_none());
    }

    #[test]
    fn empty_surface_is_an_error() {
        let buf = Buffer::empty(Rect::new(0, 0, 0, 3));
        assert!(matches!(
            Thumbnail::encode(&buf, 24, 8),
            Err(SnapshotError::EmptySurface)
        ));
    }

    #[test]
    fn render_into_clips_to_area() {
        let thumb = Thumbnail::encode(&striped(6, 2), 6, 2).unwrap();
        let area = Rect::new(0, 0, 3, 1);
        let mut buf = Buffer::empty(area);
        {
            let mut frame = UiFrame::from_parts(area, &mut buf);
            thumb.render_into(&mut frame, area);
        }
        assert_eq!(buf.cell((0, 0)).unwrap().symbol(), "a");
        assert_eq!(buf.cell((1, 0)).unwrap().symbol(), "b");
    }
}
