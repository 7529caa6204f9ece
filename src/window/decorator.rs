use ratatui::style::{Color, Modifier, Style};

use super::{FloatRect, RiskLevel};
use crate::theme;
use crate::ui::UiFrame;

/// Result of hit-testing the window header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderAction {
    Minimize,
    Maximize,
    Close,
    Drag,
    None,
}

/// What the decorator needs to know to draw a window's chrome.
#[derive(Debug, Clone, Copy)]
pub struct HeaderView<'a> {
    pub title: &'a str,
    pub focused: bool,
    pub maximized: bool,
    pub badge_count: u32,
    pub risk_level: RiskLevel,
}

/// Draws window chrome and answers which part of it sits under a cell.
///
/// Row 0 and the outer columns form the border (and the resize handles);
/// row 1 is the header. Everything inside is content.
pub trait WindowDecorator: std::fmt::Debug {
    fn content_area(&self, rect: FloatRect) -> FloatRect {
        FloatRect {
            x: rect.x + 1,
            y: rect.y + 2,
            width: rect.width.saturating_sub(2),
            height: rect.height.saturating_sub(3),
        }
    }

    fn hit_test(&self, rect: FloatRect, column: u16, row: u16) -> HeaderAction;

    fn render_window(&self, frame: &mut UiFrame<'_>, rect: FloatRect, view: HeaderView<'_>);
}

const CONTROL_WIDTH: i32 = 3;
const CONTROLS: [(HeaderAction, &str); 3] = [
    (HeaderAction::Minimize, "[_]"),
    (HeaderAction::Maximize, "[□]"),
    (HeaderAction::Close, "[x]"),
];

#[derive(Debug, Default)]
pub struct DefaultDecorator;

impl DefaultDecorator {
    /// Leftmost column of the control strip, when the header is wide enough
    /// to carry it.
    fn controls_start(rect: FloatRect) -> Option<i32> {
        let inner = rect.width as i32 - 2;
        let needed = CONTROL_WIDTH * CONTROLS.len() as i32;
        (inner >= needed).then_some(rect.right() - needed)
    }
}

impl WindowDecorator for DefaultDecorator {
    fn hit_test(&self, rect: FloatRect, column: u16, row: u16) -> HeaderAction {
        let column = column as i32;
        let row = row as i32;
        if rect.height < 3 || row != rect.y + 1 || column <= rect.x || column >= rect.right() {
            return HeaderAction::None;
        }
        if let Some(start) = Self::controls_start(rect)
            && column >= start
        {
            let slot = ((column - start) / CONTROL_WIDTH) as usize;
            if let Some((action, _)) = CONTROLS.get(slot) {
                return *action;
            }
        }
        HeaderAction::Drag
    }

    fn render_window(&self, frame: &mut UiFrame<'_>, rect: FloatRect, view: HeaderView<'_>) {
        if rect.width < 2 || rect.height < 3 {
            return;
        }
        let header_style = if view.focused {
            Style::default()
                .bg(theme::decorator_header_bg())
                .fg(theme::decorator_header_fg())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
                .bg(theme::decorator_header_inactive_bg())
                .fg(theme::decorator_header_fg())
        };
        let border_style = Style::default()
            .fg(theme::decorator_border())
            .bg(Color::Reset);

        let left = rect.x;
        let right = rect.right();
        let top = rect.y;
        let bottom = rect.bottom();
        let header_y = top + 1;

        // Header background
        for x in left + 1..right {
            frame.put_signed(x, header_y, " ", header_style);
        }

        let controls_start = Self::controls_start(rect);
        let title_end = controls_start.unwrap_or(right);

        // Risk marker and title
        let mut x = left + 2;
        let marker_style = header_style.fg(theme::risk_color(view.risk_level));
        if x < title_end {
            frame.put_signed(x, header_y, "●", marker_style);
            x += 2;
        }
        let mut label = view.title.to_string();
        if view.badge_count > 0 {
            label.push_str(&format!(" ({})", view.badge_count));
        }
        for ch in label.chars() {
            if x >= title_end - 1 {
                break;
            }
            frame.put_signed(x, header_y, &ch.to_string(), header_style);
            x += 1;
        }

        if let Some(start) = controls_start {
            for (slot, (action, glyph)) in CONTROLS.iter().enumerate() {
                let glyph = match action {
                    HeaderAction::Maximize if view.maximized => "[◫]",
                    _ => glyph,
                };
                let cx = start + slot as i32 * CONTROL_WIDTH;
                for (offset, ch) in glyph.chars().enumerate() {
                    frame.put_signed(cx + offset as i32, header_y, &ch.to_string(), header_style);
                }
            }
        }

        // Borders
        for x in left..=right {
            let top_symbol = if x == left {
                "┌"
            } else if x == right {
                "┐"
            } else {
                "─"
            };
            let bottom_symbol = if x == left {
                "└"
            } else if x == right {
                "┘"
            } else {
                "─"
            };
            frame.put_signed(x, top, top_symbol, border_style);
            frame.put_signed(x, bottom, bottom_symbol, border_style);
        }
        for y in top + 1..bottom {
            frame.put_signed(left, y, "│", border_style);
            frame.put_signed(right, y, "│", border_style);
        }
    }
}
