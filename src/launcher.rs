use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
};

use crate::layout::rect_contains;
use crate::theme;
use crate::ui::{UiFrame, safe_set_string, truncate_to_width};
use crate::window::{RiskLevel, WindowId, WindowRegistry};

/// One minimized window as the launcher lists it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherEntry {
    pub id: WindowId,
    pub title: String,
    pub risk_level: RiskLevel,
    pub badge_count: u32,
    pub has_thumbnail: bool,
}

impl LauncherEntry {
    fn label(&self) -> String {
        if self.badge_count > 0 {
            format!("{} ({})", self.title, self.badge_count)
        } else {
            self.title.clone()
        }
    }
}

/// Minimized windows, in creation order.
pub fn entries(registry: &WindowRegistry) -> Vec<LauncherEntry> {
    registry
        .windows()
        .filter(|window| window.is_minimized())
        .map(|window| LauncherEntry {
            id: window.id(),
            title: window.title().to_string(),
            risk_level: window.risk_level(),
            badge_count: window.badge_count(),
            has_thumbnail: window.snapshot_thumbnail().is_some(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
struct LauncherHit {
    id: WindowId,
    rect: Rect,
}

/// Bottom bar listing minimized windows. Clicking an entry restores and
/// focuses its window; hovering shows the last captured thumbnail.
#[derive(Debug, Default)]
pub struct Launcher {
    area: Rect,
    hits: Vec<LauncherHit>,
    hover: Option<WindowId>,
}

impl Launcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn hovered(&self) -> Option<WindowId> {
        self.hover
    }

    /// Split `area` into the managed desktop and the one-row launcher below it.
    pub fn split_area(&mut self, area: Rect) -> (Rect, Rect) {
        let bar_h = 1u16.min(area.height);
        let bar = Rect {
            x: area.x,
            y: area.y.saturating_add(area.height).saturating_sub(bar_h),
            width: area.width,
            height: bar_h,
        };
        let managed = Rect {
            height: area.height.saturating_sub(bar_h),
            ..area
        };
        self.area = bar;
        (managed, bar)
    }

    pub fn begin_frame(&mut self) {
        self.hits.clear();
    }

    pub fn hit_test(&self, column: u16, row: u16) -> Option<WindowId> {
        self.hits
            .iter()
            .find(|hit| rect_contains(hit.rect, column, row))
            .map(|hit| hit.id)
    }

    /// Restore `id` and bring it to the front.
    pub fn activate(&mut self, registry: &mut WindowRegistry, id: WindowId) -> bool {
        if !registry.restore_window(id) {
            return false;
        }
        registry.focus_window(id);
        if self.hover == Some(id) {
            self.hover = None;
        }
        tracing::debug!(window_id = %id, "restored from launcher");
        true
    }

    /// Returns `true` when the event was consumed or changed the hover state.
    pub fn handle_mouse(&mut self, mouse: &MouseEvent, registry: &mut WindowRegistry) -> bool {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                match self.hit_test(mouse.column, mouse.row) {
                    Some(id) => {
                        self.activate(registry, id);
                        true
                    }
                    None => rect_contains(self.area, mouse.column, mouse.row),
                }
            }
            MouseEventKind::Moved => {
                let next = self.hit_test(mouse.column, mouse.row);
                let changed = next != self.hover;
                self.hover = next;
                changed
            }
            _ => false,
        }
    }

    /// Draw the bar, and the hover preview inside `desktop` when one applies.
    pub fn render(&mut self, frame: &mut UiFrame<'_>, registry: &WindowRegistry, desktop: Rect) {
        self.begin_frame();
        let area = self.area;
        if area.width == 0 || area.height == 0 {
            return;
        }
        let bar_style = Style::default()
            .bg(theme::launcher_bg())
            .fg(theme::launcher_fg());
        frame.fill(area, bar_style);

        let buffer_area = frame.area();
        let bounds = area.intersection(buffer_area);
        let mut x = area.x;
        let y = area.y;
        let max_x = area.x.saturating_add(area.width);
        let heading = "▤ ";
        safe_set_string(frame.buffer_mut(), bounds, x, y, heading, bar_style);
        x = x.saturating_add(heading.chars().count() as u16);

        let listed = entries(registry);
        if listed.is_empty() {
            safe_set_string(
                frame.buffer_mut(),
                bounds,
                x,
                y,
                "no minimized windows",
                bar_style.add_modifier(Modifier::DIM),
            );
        }
        for entry in &listed {
            let max_label = max_x.saturating_sub(x).saturating_sub(6) as usize;
            let label = truncate_to_width(&entry.label(), max_label);
            let chunk_width = label.chars().count() as u16 + 6;
            if max_label == 0 || x.saturating_add(chunk_width) > max_x {
                break;
            }
            let item_style = if self.hover == Some(entry.id) {
                bar_style
                    .bg(theme::launcher_hover_bg())
                    .add_modifier(Modifier::BOLD)
            } else {
                bar_style
            };
            let marker_style = item_style.fg(theme::risk_color(entry.risk_level));
            let buffer = frame.buffer_mut();
            safe_set_string(buffer, bounds, x, y, " ", item_style);
            safe_set_string(buffer, bounds, x + 1, y, "●", marker_style);
            let glyph = if entry.has_thumbnail { "▣" } else { "□" };
            safe_set_string(
                buffer,
                bounds,
                x + 2,
                y,
                &format!(" {label} {glyph} "),
                item_style,
            );
            self.hits.push(LauncherHit {
                id: entry.id,
                rect: Rect {
                    x,
                    y,
                    width: chunk_width,
                    height: 1,
                },
            });
            x = x.saturating_add(chunk_width);
        }

        if let Some(id) = self.hover {
            self.render_preview(frame, registry, id, desktop);
        }
    }

    fn render_preview(
        &self,
        frame: &mut UiFrame<'_>,
        registry: &WindowRegistry,
        id: WindowId,
        desktop: Rect,
    ) {
        let (Some(window), Some(hit)) = (
            registry.window(id),
            self.hits.iter().find(|hit| hit.id == id),
        ) else {
            return;
        };
        if !window.is_minimized() {
            return;
        }
        let (inner_w, inner_h) = window
            .snapshot_thumbnail()
            .map(|thumb| (thumb.width(), thumb.height()))
            .unwrap_or((14, 1));
        let width = (inner_w + 2).min(desktop.width);
        let height = (inner_h + 2).min(desktop.height);
        if width < 3 || height < 3 {
            return;
        }
        let desktop_right = desktop.x.saturating_add(desktop.width);
        let x = hit.rect.x.min(desktop_right.saturating_sub(width));
        let y = desktop
            .y
            .saturating_add(desktop.height)
            .saturating_sub(height);
        let popup = Rect {
            x,
            y,
            width,
            height,
        };
        let border = Style::default()
            .fg(theme::preview_border())
            .bg(theme::preview_bg());
        frame.fill(popup, Style::default().bg(theme::preview_bg()));
        let right = popup.x + popup.width - 1;
        let bottom = popup.y + popup.height - 1;
        for cx in popup.x..=right {
            let top_glyph = if cx == popup.x {
                "┌"
            } else if cx == right {
                "┐"
            } else {
                "─"
            };
            let bottom_glyph = if cx == popup.x {
                "└"
            } else if cx == right {
                "┘"
            } else {
                "─"
            };
            frame.put_signed(cx as i32, popup.y as i32, top_glyph, border);
            frame.put_signed(cx as i32, bottom as i32, bottom_glyph, border);
        }
        for cy in popup.y + 1..bottom {
            frame.put_signed(popup.x as i32, cy as i32, "│", border);
            frame.put_signed(right as i32, cy as i32, "│", border);
        }
        let inner = Rect {
            x: popup.x + 1,
            y: popup.y + 1,
            width: popup.width - 2,
            height: popup.height - 2,
        };
        match window.snapshot_thumbnail() {
            Some(thumb) => thumb.render_into(frame, inner),
            None => safe_set_string(
                frame.buffer_mut(),
                inner,
                inner.x,
                inner.y,
                "no preview yet",
                Style::default()
                    .fg(theme::launcher_fg())
                    .bg(theme::preview_bg())
                    .add_modifier(Modifier::DIM),
            ),
        }
    }
}
