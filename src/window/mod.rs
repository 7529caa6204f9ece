pub mod controller;
pub mod decorator;
pub mod registry;
mod signal;

use std::fmt;

use crate::constants::{MIN_WINDOW_HEIGHT, MIN_WINDOW_WIDTH};
use crate::content::Content;
use crate::snapshot::Thumbnail;

pub use controller::{Chrome, InteractionConfig, WindowController, WindowHit, WindowMode};
pub use decorator::{DefaultDecorator, HeaderAction, HeaderView, WindowDecorator};
pub use registry::WindowRegistry;
pub use signal::{WindowChange, WindowSignal};

/// Signed cell rectangle origin with unsigned size.
///
/// Windows may be dragged partly past the left or top edge of the desktop, so
/// their on-screen rectangle can start at a negative cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FloatRect {
    pub x: i32,
    pub y: i32,
    pub width: u16,
    pub height: u16,
}

impl FloatRect {
    pub fn contains(&self, column: u16, row: u16) -> bool {
        let column = column as i32;
        let row = row as i32;
        column >= self.x
            && column < self.x + self.width as i32
            && row >= self.y
            && row < self.y + self.height as i32
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32 - 1
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32 - 1
    }
}

/// Identifier handed out by [`WindowRegistry::add_window`]. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowId(u64);

impl WindowId {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}", self.0)
    }
}

/// Minimum dimensions, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::new(MIN_WINDOW_WIDTH, MIN_WINDOW_HEIGHT)
    }
}

/// Top-left position and size of a window, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Grow either dimension to `min` when it falls short.
    pub fn clamp_size(self, min: Size) -> Self {
        Self {
            width: self.width.max(min.width),
            height: self.height.max(min.height),
            ..self
        }
    }

    pub fn translate(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
            ..self
        }
    }
}

/// Partial geometry merged by [`WindowRegistry::update_window`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GeometryPatch {
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl GeometryPatch {
    pub const fn position(x: i32, y: i32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            width: None,
            height: None,
        }
    }

    pub const fn size(width: u32, height: u32) -> Self {
        Self {
            x: None,
            y: None,
            width: Some(width),
            height: Some(height),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.width.is_none() && self.height.is_none()
    }

    pub fn apply(self, geometry: Geometry) -> Geometry {
        Geometry {
            x: self.x.unwrap_or(geometry.x),
            y: self.y.unwrap_or(geometry.y),
            width: self.width.unwrap_or(geometry.width),
            height: self.height.unwrap_or(geometry.height),
        }
    }
}

impl From<Geometry> for GeometryPatch {
    fn from(geometry: Geometry) -> Self {
        Self {
            x: Some(geometry.x),
            y: Some(geometry.y),
            width: Some(geometry.width),
            height: Some(geometry.height),
        }
    }
}

/// Cosmetic risk classification shown by the launcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

/// Everything a caller supplies to open a window.
pub struct WindowSpec {
    pub title: String,
    pub geometry: Option<Geometry>,
    pub minimized: bool,
    pub risk_level: RiskLevel,
    pub badge_count: u32,
    pub content: Content,
}

impl WindowSpec {
    pub fn new(title: impl Into<String>, content: Content) -> Self {
        Self {
            title: title.into(),
            geometry: None,
            minimized: false,
            risk_level: RiskLevel::default(),
            badge_count: 0,
            content,
        }
    }

    pub fn geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Seed the window straight into the launcher.
    pub fn minimized(mut self, minimized: bool) -> Self {
        self.minimized = minimized;
        self
    }

    pub fn risk_level(mut self, risk_level: RiskLevel) -> Self {
        self.risk_level = risk_level;
        self
    }

    pub fn badge_count(mut self, badge_count: u32) -> Self {
        self.badge_count = badge_count;
        self
    }

    /// Rebuild a spec from a persisted record. A maximized record reopens at
    /// its pre-maximize geometry; the caller re-applies the maximize.
    pub fn from_record(record: &WindowRecord, content: Content) -> Self {
        let geometry = record.pre_maximize_geometry.unwrap_or(record.geometry);
        Self::new(record.title.clone(), content)
            .geometry(geometry)
            .minimized(record.is_minimized)
            .risk_level(record.risk_level)
            .badge_count(record.badge_count)
    }
}

impl fmt::Debug for WindowSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowSpec")
            .field("title", &self.title)
            .field("geometry", &self.geometry)
            .field("minimized", &self.minimized)
            .field("risk_level", &self.risk_level)
            .field("badge_count", &self.badge_count)
            .finish_non_exhaustive()
    }
}

/// Content-free copy of a window's state, for callers that persist layouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowRecord {
    pub id: WindowId,
    pub title: String,
    pub geometry: Geometry,
    pub z_index: u64,
    pub is_minimized: bool,
    pub is_maximized: bool,
    pub pre_maximize_geometry: Option<Geometry>,
    pub risk_level: RiskLevel,
    pub badge_count: u32,
}

/// A floating window entity. Only [`WindowRegistry`] mutates it.
pub struct Window {
    id: WindowId,
    title: String,
    content: Content,
    geometry: Geometry,
    z_index: u64,
    is_minimized: bool,
    is_maximized: bool,
    pre_maximize_geometry: Option<Geometry>,
    risk_level: RiskLevel,
    badge_count: u32,
    snapshot_thumbnail: Option<Thumbnail>,
    revision: u64,
}

impl Window {
    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn z_index(&self) -> u64 {
        self.z_index
    }

    pub fn is_minimized(&self) -> bool {
        self.is_minimized
    }

    pub fn is_maximized(&self) -> bool {
        self.is_maximized
    }

    pub fn pre_maximize_geometry(&self) -> Option<Geometry> {
        self.pre_maximize_geometry
    }

    pub fn risk_level(&self) -> RiskLevel {
        self.risk_level
    }

    pub fn badge_count(&self) -> u32 {
        self.badge_count
    }

    pub fn snapshot_thumbnail(&self) -> Option<&Thumbnail> {
        self.snapshot_thumbnail.as_ref()
    }

    /// Bumped on every change to this entity.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn mode(&self) -> WindowMode {
        if self.is_minimized {
            WindowMode::Minimized
        } else if self.is_maximized {
            WindowMode::Maximized
        } else {
            WindowMode::Normal
        }
    }

    pub fn record(&self) -> WindowRecord {
        WindowRecord {
            id: self.id,
            title: self.title.clone(),
            geometry: self.geometry,
            z_index: self.z_index,
            is_minimized: self.is_minimized,
            is_maximized: self.is_maximized,
            pre_maximize_geometry: self.pre_maximize_geometry,
            risk_level: self.risk_level,
            badge_count: self.badge_count,
        }
    }
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("geometry", &self.geometry)
            .field("z_index", &self.z_index)
            .field("is_minimized", &self.is_minimized)
            .field("is_maximized", &self.is_maximized)
            .field("has_thumbnail", &self.snapshot_thumbnail.is_some())
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_merges_only_given_fields() {
        let base = Geometry::new(10, 20, 300, 200);
        let moved = GeometryPatch::position(-5, 7).apply(base);
        assert_eq!(moved, Geometry::new(-5, 7, 300, 200));
        let sized = GeometryPatch::size(640, 480).apply(base);
        assert_eq!(sized, Geometry::new(10, 20, 640, 480));
        assert!(GeometryPatch::default().is_empty());
    }

    #[test]
    fn clamp_size_keeps_origin() {
        let g = Geometry::new(4, 4, 10, 500).clamp_size(Size::default());
        assert_eq!(g, Geometry::new(4, 4, MIN_WINDOW_WIDTH, 500));
    }

    #[test]
    fn float_rect_contains_negative_origin() {
        let r = FloatRect {
            x: -3,
            y: 1,
            width: 5,
            height: 2,
        };
        assert!(r.contains(0, 1));
        assert!(r.contains(1, 2));
        assert!(!r.contains(2, 1));
        assert!(!r.contains(0, 3));
        assert_eq!(r.right(), 1);
        assert_eq!(r.bottom(), 2);
    }
}
