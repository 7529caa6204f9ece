//! The single authoritative store of window entities.
//!
//! Every mutation is one synchronous call that applies fully or not at all.
//! Operations naming an id return `true` when applied; an unknown id is a
//! logged no-op, never an error.

use std::collections::BTreeMap;

use super::{
    Geometry, GeometryPatch, Size, Window, WindowId, WindowRecord, WindowSpec,
};
use crate::constants::{
    DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH, DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH,
    DEFAULT_WINDOW_X, DEFAULT_WINDOW_Y,
};
use crate::content::Content;
use crate::snapshot::Thumbnail;

#[derive(Debug)]
pub struct WindowRegistry {
    windows: BTreeMap<WindowId, Window>,
    next_id: u64,
    z_counter: u64,
    focused: Option<WindowId>,
    viewport: Geometry,
    min_size: Size,
    default_geometry: Geometry,
}

impl Default for WindowRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self {
            windows: BTreeMap::new(),
            next_id: 1,
            z_counter: 0,
            focused: None,
            viewport: Geometry::new(0, 0, DEFAULT_VIEWPORT_WIDTH, DEFAULT_VIEWPORT_HEIGHT),
            min_size: Size::default(),
            default_geometry: Geometry::new(
                DEFAULT_WINDOW_X,
                DEFAULT_WINDOW_Y,
                DEFAULT_WINDOW_WIDTH,
                DEFAULT_WINDOW_HEIGHT,
            ),
        }
    }

    pub fn with_min_size(mut self, min_size: Size) -> Self {
        self.min_size = min_size;
        self
    }

    pub fn with_default_geometry(mut self, geometry: Geometry) -> Self {
        self.default_geometry = geometry;
        self
    }

    pub fn min_size(&self) -> Size {
        self.min_size
    }

    pub fn viewport(&self) -> Geometry {
        self.viewport
    }

    /// Record the desktop viewport. Maximized windows follow it.
    pub fn set_viewport(&mut self, viewport: Geometry) {
        if self.viewport == viewport {
            return;
        }
        self.viewport = viewport;
        let fitted = viewport.clamp_size(self.min_size);
        for window in self.windows.values_mut() {
            if window.is_maximized && window.geometry != fitted {
                window.geometry = fitted;
                window.revision += 1;
            }
        }
    }

    pub fn add_window(&mut self, spec: WindowSpec) -> WindowId {
        let id = WindowId(self.next_id);
        self.next_id += 1;
        self.z_counter += 1;
        let geometry = spec
            .geometry
            .unwrap_or(self.default_geometry)
            .clamp_size(self.min_size);
        let window = Window {
            id,
            title: spec.title,
            content: spec.content,
            geometry,
            z_index: self.z_counter,
            is_minimized: spec.minimized,
            is_maximized: false,
            pre_maximize_geometry: None,
            risk_level: spec.risk_level,
            badge_count: spec.badge_count,
            snapshot_thumbnail: None,
            revision: 1,
        };
        tracing::debug!(
            window_id = %id,
            title = %window.title,
            z_index = window.z_index,
            minimized = window.is_minimized,
            "opened window"
        );
        self.windows.insert(id, window);
        self.refresh_focus();
        id
    }

    /// Replay a persisted record: reopen it, then re-apply maximize.
    pub fn restore_record(&mut self, record: &WindowRecord, content: Content) -> WindowId {
        let id = self.add_window(WindowSpec::from_record(record, content));
        if record.is_maximized {
            self.toggle_maximize(id);
        }
        id
    }

    pub fn focus_window(&mut self, id: WindowId) -> bool {
        let Some(window) = self.windows.get_mut(&id) else {
            tracing::debug!(window_id = %id, "focus ignored for unknown window");
            return false;
        };
        self.z_counter += 1;
        window.z_index = self.z_counter;
        window.revision += 1;
        self.refresh_focus();
        true
    }

    /// Merge `patch` into the window's geometry. Size is clamped to the
    /// minimum; callers commit the end of a drag or resize session here.
    /// A maximized window follows the viewport and ignores patches.
    pub fn update_window(&mut self, id: WindowId, patch: GeometryPatch) -> bool {
        let min_size = self.min_size;
        let Some(window) = self.windows.get_mut(&id) else {
            tracing::debug!(window_id = %id, "update ignored for unknown window");
            return false;
        };
        if window.is_maximized {
            tracing::debug!(window_id = %id, "update ignored for maximized window");
            return false;
        }
        let next = patch.apply(window.geometry).clamp_size(min_size);
        if next != window.geometry {
            window.geometry = next;
            window.revision += 1;
        }
        true
    }

    pub fn minimize_window(&mut self, id: WindowId) -> bool {
        self.set_minimized(id, true)
    }

    /// Bring a minimized window back in whichever mode it was minimized from.
    pub fn restore_window(&mut self, id: WindowId) -> bool {
        self.set_minimized(id, false)
    }

    fn set_minimized(&mut self, id: WindowId, minimized: bool) -> bool {
        let Some(window) = self.windows.get_mut(&id) else {
            tracing::debug!(window_id = %id, minimized, "minimize state ignored for unknown window");
            return false;
        };
        if window.is_minimized != minimized {
            window.is_minimized = minimized;
            window.revision += 1;
            tracing::debug!(window_id = %id, minimized, "window minimize state changed");
            self.refresh_focus();
        }
        true
    }

    pub fn toggle_maximize(&mut self, id: WindowId) -> bool {
        let fitted = self.viewport.clamp_size(self.min_size);
        let Some(window) = self.windows.get_mut(&id) else {
            tracing::debug!(window_id = %id, "maximize ignored for unknown window");
            return false;
        };
        if window.is_maximized {
            if let Some(previous) = window.pre_maximize_geometry.take() {
                window.geometry = previous;
            }
            window.is_maximized = false;
        } else {
            window.pre_maximize_geometry = Some(window.geometry);
            window.geometry = fitted;
            window.is_maximized = true;
        }
        window.revision += 1;
        tracing::debug!(window_id = %id, maximized = window.is_maximized, "toggled maximize");
        true
    }

    pub fn close_window(&mut self, id: WindowId) -> bool {
        if self.windows.remove(&id).is_none() {
            tracing::debug!(window_id = %id, "close ignored for unknown window");
            return false;
        }
        tracing::debug!(window_id = %id, "closed window");
        self.refresh_focus();
        true
    }

    /// Write path for the snapshot service. Latest capture wins.
    pub fn store_thumbnail(&mut self, id: WindowId, thumbnail: Thumbnail) -> bool {
        let Some(window) = self.windows.get_mut(&id) else {
            return false;
        };
        window.snapshot_thumbnail = Some(thumbnail);
        window.revision += 1;
        true
    }

    fn refresh_focus(&mut self) {
        let next = self
            .windows
            .values()
            .filter(|window| !window.is_minimized)
            .max_by_key(|window| window.z_index)
            .map(|window| window.id);
        if next != self.focused {
            tracing::debug!(
                from = ?self.focused.map(|id| id.to_string()),
                to = ?next.map(|id| id.to_string()),
                "focus moved"
            );
            self.focused = next;
        }
    }

    pub fn window(&self, id: WindowId) -> Option<&Window> {
        self.windows.get(&id)
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.windows.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// All windows, ordered by id (creation order).
    pub fn windows(&self) -> impl Iterator<Item = &Window> {
        self.windows.values()
    }

    pub fn ids(&self) -> Vec<WindowId> {
        self.windows.keys().copied().collect()
    }

    /// Non-minimized windows from bottom to top of the stack.
    pub fn render_order(&self) -> Vec<WindowId> {
        let mut visible: Vec<&Window> = self
            .windows
            .values()
            .filter(|window| !window.is_minimized)
            .collect();
        visible.sort_by_key(|window| window.z_index);
        visible.into_iter().map(|window| window.id).collect()
    }

    /// Minimized windows, ordered by id.
    pub fn minimized(&self) -> Vec<WindowId> {
        self.windows
            .values()
            .filter(|window| window.is_minimized)
            .map(|window| window.id)
            .collect()
    }

    /// The non-minimized window holding the highest z-index.
    pub fn focused_id(&self) -> Option<WindowId> {
        self.focused
    }

    pub fn is_focused(&self, id: WindowId) -> bool {
        self.focused == Some(id)
    }

    pub fn revision_of(&self, id: WindowId) -> Option<u64> {
        self.windows.get(&id).map(|window| window.revision)
    }

    /// Content-free copies of every window, for external persistence.
    pub fn records(&self) -> Vec<WindowRecord> {
        self.windows.values().map(Window::record).collect()
    }
}
