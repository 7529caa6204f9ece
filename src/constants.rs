//! Shared crate-wide constants.
//!
//! Geometry values are logical pixels. The terminal renderer maps them onto
//! cells through [`crate::layout::CellMetrics`].

use std::time::Duration;

/// Smallest width a window may be committed with.
pub const MIN_WINDOW_WIDTH: u32 = 200;

/// Smallest height a window may be committed with.
pub const MIN_WINDOW_HEIGHT: u32 = 150;

/// Geometry assigned to windows whose spec does not carry one.
pub const DEFAULT_WINDOW_X: i32 = 48;
pub const DEFAULT_WINDOW_Y: i32 = 32;
pub const DEFAULT_WINDOW_WIDTH: u32 = 480;
pub const DEFAULT_WINDOW_HEIGHT: u32 = 320;

/// Viewport assumed until the first frame reports the real one.
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1280;
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 720;

/// Period of the background capture for the focused window.
pub const SNAPSHOT_INTERVAL: Duration = Duration::from_secs(60);

/// Launcher preview size, in terminal cells.
pub const THUMBNAIL_WIDTH: u16 = 24;
pub const THUMBNAIL_HEIGHT: u16 = 8;

/// Two header clicks closer than this toggle maximize.
pub const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(500);

/// Minimum number of pixels a dragged window must keep within the viewport
/// so the user can grab its chrome again.
pub const MIN_VISIBLE_MARGIN: u32 = 32;

/// Pixel size of one terminal cell.
pub const CELL_WIDTH_PX: u16 = 8;
pub const CELL_HEIGHT_PX: u16 = 16;
