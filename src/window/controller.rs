//! Interactive wrapper around one window.
//!
//! Pointer input drives a small state machine. Pointer-down on the header or
//! a border handle opens a session; moves only update a transient visual
//! geometry; release (or cancel) commits the session with one
//! [`WindowRegistry::update_window`] call. A session that never moved
//! commits nothing.

use std::time::{Duration, Instant};

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};

use super::decorator::{HeaderAction, HeaderView, WindowDecorator};
use super::signal::{WindowChange, WindowSignal};
use super::{FloatRect, Geometry, GeometryPatch, WindowId, WindowRegistry};
use crate::constants::{DOUBLE_CLICK_WINDOW, MIN_VISIBLE_MARGIN};
use crate::content::{ContentError, RenderContext, render_guarded};
use crate::layout::{CellMetrics, ResizeEdge, apply_resize, edge_at, render_resize_outline};
use crate::snapshot::SnapshotService;
use crate::theme;
use crate::ui::{UiFrame, safe_set_string};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowMode {
    Normal,
    Maximized,
    Minimized,
    /// The entity is gone; nothing further applies.
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractionConfig {
    pub double_click_window: Duration,
    /// Pixels of a dragged window that must stay inside the viewport.
    pub min_visible_margin: u32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            double_click_window: DOUBLE_CLICK_WINDOW,
            min_visible_margin: MIN_VISIBLE_MARGIN,
        }
    }
}

/// Part of a window under a terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowHit {
    Control(HeaderAction),
    Header,
    Resize(ResizeEdge),
    Body,
}

/// Desktop-wide rendering and hit-testing inputs shared by every controller.
#[derive(Clone, Copy)]
pub struct Chrome<'a> {
    pub decorator: &'a dyn WindowDecorator,
    pub metrics: CellMetrics,
    /// Cell area the desktop occupies; pixel `(0, 0)` maps to its top-left.
    pub area: Rect,
}

impl<'a> Chrome<'a> {
    pub fn new(decorator: &'a dyn WindowDecorator, metrics: CellMetrics, area: Rect) -> Self {
        Self {
            decorator,
            metrics,
            area,
        }
    }

    pub fn cells(&self, geometry: Geometry) -> FloatRect {
        self.metrics.to_cells(geometry, self.area)
    }

    pub fn pixels(&self, column: u16, row: u16) -> (i32, i32) {
        self.metrics.to_pixels(column, row, self.area)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PointerSession {
    Drag {
        grab: (i32, i32),
        origin: Geometry,
        current: Geometry,
    },
    Resize {
        edge: ResizeEdge,
        grab: (i32, i32),
        origin: Geometry,
        current: Geometry,
    },
}

impl PointerSession {
    fn current(&self) -> Geometry {
        match self {
            PointerSession::Drag { current, .. } | PointerSession::Resize { current, .. } => {
                *current
            }
        }
    }

    fn origin(&self) -> Geometry {
        match self {
            PointerSession::Drag { origin, .. } | PointerSession::Resize { origin, .. } => *origin,
        }
    }
}

#[derive(Debug)]
pub struct WindowController {
    id: WindowId,
    signal: WindowSignal,
    session: Option<PointerSession>,
    last_header_click: Option<Instant>,
    content_error: Option<ContentError>,
    dirty: bool,
    config: InteractionConfig,
}

impl WindowController {
    pub fn new(id: WindowId, config: InteractionConfig) -> Self {
        Self {
            id,
            signal: WindowSignal::new(id),
            session: None,
            last_header_click: None,
            content_error: None,
            dirty: true,
            config,
        }
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn mode(&self, registry: &WindowRegistry) -> WindowMode {
        registry
            .window(self.id)
            .map(|window| window.mode())
            .unwrap_or(WindowMode::Closed)
    }

    pub fn is_interacting(&self) -> bool {
        self.session.is_some()
    }

    pub fn content_error(&self) -> Option<&ContentError> {
        self.content_error.as_ref()
    }

    /// Forget a recorded content failure so the next frame retries it.
    pub fn reset_content_error(&mut self) {
        if self.content_error.take().is_some() {
            self.dirty = true;
        }
    }

    /// Pull this window's changes from the registry. Returns `Some` only when
    /// something about this window (or its focus) changed.
    pub fn observe(&mut self, registry: &WindowRegistry) -> Option<WindowChange> {
        let change = self.signal.take_change(registry);
        if let Some(change) = change {
            if change.closed {
                self.session = None;
            }
            self.dirty = true;
        }
        change
    }

    /// Whether the controller needs a redraw. Clears the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Geometry to draw: the live session preview while one is open,
    /// otherwise the committed geometry.
    pub fn visual_geometry(&self, registry: &WindowRegistry) -> Option<Geometry> {
        let window = registry.window(self.id)?;
        Some(
            self.session
                .map(|session| session.current())
                .unwrap_or_else(|| window.geometry()),
        )
    }

    pub fn rect(&self, registry: &WindowRegistry, chrome: &Chrome<'_>) -> Option<FloatRect> {
        self.visual_geometry(registry)
            .map(|geometry| chrome.cells(geometry))
    }

    pub fn hit_test(
        &self,
        registry: &WindowRegistry,
        chrome: &Chrome<'_>,
        column: u16,
        row: u16,
    ) -> Option<WindowHit> {
        let window = registry.window(self.id)?;
        if window.is_minimized() {
            return None;
        }
        let rect = self.rect(registry, chrome)?;
        if !rect.contains(column, row) {
            return None;
        }
        match chrome.decorator.hit_test(rect, column, row) {
            HeaderAction::Drag => return Some(WindowHit::Header),
            HeaderAction::None => {}
            action => return Some(WindowHit::Control(action)),
        }
        if !window.is_maximized()
            && let Some(edge) = edge_at(rect, column, row)
        {
            return Some(WindowHit::Resize(edge));
        }
        Some(WindowHit::Body)
    }

    /// Feed one mouse event. Returns `true` when the event was consumed.
    pub fn handle_mouse(
        &mut self,
        mouse: &MouseEvent,
        registry: &mut WindowRegistry,
        snapshots: &mut SnapshotService,
        chrome: &Chrome<'_>,
        now: Instant,
    ) -> bool {
        if !registry.contains(self.id) {
            // Queued input for a window closed by another path.
            self.session = None;
            return false;
        }
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let Some(hit) = self.hit_test(registry, chrome, mouse.column, mouse.row) else {
                    return false;
                };
                registry.focus_window(self.id);
                self.pointer_down(hit, mouse, registry, snapshots, chrome, now);
                true
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if self.session.is_none() {
                    return false;
                }
                let pointer = chrome.pixels(mouse.column, mouse.row);
                self.pointer_move(pointer, registry);
                true
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if self.session.is_none() {
                    return false;
                }
                let pointer = chrome.pixels(mouse.column, mouse.row);
                self.pointer_move(pointer, registry);
                self.commit(registry);
                true
            }
            _ => false,
        }
    }

    fn pointer_down(
        &mut self,
        hit: WindowHit,
        mouse: &MouseEvent,
        registry: &mut WindowRegistry,
        snapshots: &mut SnapshotService,
        chrome: &Chrome<'_>,
        now: Instant,
    ) {
        let Some(window) = registry.window(self.id) else {
            return;
        };
        let origin = window.geometry();
        let maximized = window.is_maximized();
        let grab = chrome.pixels(mouse.column, mouse.row);
        match hit {
            WindowHit::Control(HeaderAction::Minimize) => {
                self.last_header_click = None;
                // Capture first so the launcher shows what was on screen.
                snapshots.capture(registry, chrome.decorator, self.id);
                registry.minimize_window(self.id);
            }
            WindowHit::Control(HeaderAction::Maximize) => {
                self.last_header_click = None;
                registry.toggle_maximize(self.id);
            }
            WindowHit::Control(HeaderAction::Close) => {
                self.last_header_click = None;
                registry.close_window(self.id);
            }
            WindowHit::Control(HeaderAction::Drag | HeaderAction::None) | WindowHit::Header => {
                if let Some(previous) = self.last_header_click
                    && now.saturating_duration_since(previous) <= self.config.double_click_window
                {
                    self.last_header_click = None;
                    registry.toggle_maximize(self.id);
                    return;
                }
                self.last_header_click = Some(now);
                if !maximized {
                    tracing::trace!(window_id = %self.id, "drag started");
                    self.session = Some(PointerSession::Drag {
                        grab,
                        origin,
                        current: origin,
                    });
                }
            }
            WindowHit::Resize(edge) => {
                self.last_header_click = None;
                tracing::trace!(window_id = %self.id, edge = edge.label(), "resize started");
                self.session = Some(PointerSession::Resize {
                    edge,
                    grab,
                    origin,
                    current: origin,
                });
            }
            WindowHit::Body => {
                self.last_header_click = None;
            }
        }
    }

    fn pointer_move(&mut self, pointer: (i32, i32), registry: &WindowRegistry) {
        let min = registry.min_size();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let next = match *session {
            PointerSession::Drag { grab, origin, .. } => {
                origin.translate(pointer.0 - grab.0, pointer.1 - grab.1)
            }
            PointerSession::Resize {
                edge, grab, origin, ..
            } => apply_resize(origin, edge, pointer.0 - grab.0, pointer.1 - grab.1, min),
        };
        match session {
            PointerSession::Drag { current, .. } | PointerSession::Resize { current, .. } => {
                if *current != next {
                    *current = next;
                    self.dirty = true;
                }
            }
        }
    }

    /// End any open session, committing what it has so far. Used when the
    /// pointer leaves the desktop.
    pub fn cancel(&mut self, registry: &mut WindowRegistry) {
        self.commit(registry);
    }

    fn commit(&mut self, registry: &mut WindowRegistry) {
        let Some(session) = self.session.take() else {
            return;
        };
        self.dirty = true;
        if session.current() == session.origin() {
            return;
        }
        let patch = match session {
            PointerSession::Drag { current, .. } => {
                let (x, y) = self.keep_reachable(current, registry.viewport());
                GeometryPatch::position(x, y)
            }
            PointerSession::Resize { current, .. } => GeometryPatch::from(current),
        };
        tracing::debug!(window_id = %self.id, ?patch, "committing pointer session");
        registry.update_window(self.id, patch);
    }

    /// Clamp a dragged position so at least the configured margin of the
    /// window, and all of its header, stays inside the viewport.
    fn keep_reachable(&self, geometry: Geometry, viewport: Geometry) -> (i32, i32) {
        let margin = self.config.min_visible_margin as i64;
        let width = geometry.width as i64;
        let vx = viewport.x as i64;
        let vy = viewport.y as i64;
        let min_x = vx - (width - margin.min(width));
        let max_x = (vx + viewport.width as i64 - margin).max(min_x);
        let min_y = vy;
        let max_y = (vy + viewport.height as i64 - margin).max(min_y);
        let x = (geometry.x as i64).clamp(min_x, max_x);
        let y = (geometry.y as i64).clamp(min_y, max_y);
        (x as i32, y as i32)
    }

    /// Draw chrome and content. Content failures are logged once and replaced
    /// by a placeholder; the window itself keeps working.
    pub fn render(
        &mut self,
        frame: &mut UiFrame<'_>,
        registry: &WindowRegistry,
        chrome: &Chrome<'_>,
    ) {
        let Some(window) = registry.window(self.id) else {
            return;
        };
        if window.is_minimized() {
            return;
        }
        let Some(rect) = self.rect(registry, chrome) else {
            return;
        };
        let focused = registry.is_focused(self.id);
        chrome.decorator.render_window(
            frame,
            rect,
            HeaderView {
                title: window.title(),
                focused,
                maximized: window.is_maximized(),
                badge_count: window.badge_count(),
                risk_level: window.risk_level(),
            },
        );

        let inner = chrome.decorator.content_area(rect);
        if inner.width > 0 && inner.height > 0 {
            let area = Rect::new(0, 0, inner.width, inner.height);
            let mut surface = Buffer::empty(area);
            {
                let mut offscreen = UiFrame::from_parts(area, &mut surface);
                if self.content_error.is_none()
                    && let Err(err) = render_guarded(
                        window.content(),
                        &mut offscreen,
                        area,
                        &RenderContext::new(focused),
                    )
                {
                    tracing::warn!(window_id = %self.id, error = %err, "window content failed to render");
                    self.content_error = Some(err);
                }
                if let Some(err) = &self.content_error {
                    offscreen.fill(area, Style::default());
                    render_placeholder(&mut offscreen, area, err);
                }
            }
            frame.blit_from_signed(&surface, inner);
        }

        if matches!(self.session, Some(PointerSession::Resize { .. })) {
            render_resize_outline(
                frame,
                rect,
                Style::default()
                    .fg(theme::resize_outline())
                    .add_modifier(Modifier::BOLD),
            );
        }
    }
}

fn render_placeholder(frame: &mut UiFrame<'_>, area: Rect, err: &ContentError) {
    let style = Style::default().fg(theme::placeholder_fg());
    let lines = ["content unavailable".to_string(), err.to_string()];
    let top = area.y + area.height.saturating_sub(lines.len() as u16) / 2;
    for (offset, line) in lines.iter().enumerate() {
        let y = top + offset as u16;
        let len = line.chars().count() as u16;
        let x = area.x + area.width.saturating_sub(len) / 2;
        safe_set_string(frame.buffer_mut(), area, x, y, line, style);
    }
}
