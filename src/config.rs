use std::time::Duration;

use crate::constants::{
    DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH, DEFAULT_WINDOW_X, DEFAULT_WINDOW_Y,
};
use crate::layout::CellMetrics;
use crate::snapshot::SnapshotConfig;
use crate::window::{Geometry, InteractionConfig, Size};

/// Everything tunable about a desktop. `Default` gives the stock setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DesktopConfig {
    pub min_size: Size,
    /// Geometry for windows opened without one.
    pub default_geometry: Geometry,
    pub metrics: CellMetrics,
    pub snapshot_interval: Duration,
    pub thumbnail_width: u16,
    pub thumbnail_height: u16,
    pub interaction: InteractionConfig,
}

impl Default for DesktopConfig {
    fn default() -> Self {
        let snapshot = SnapshotConfig::default();
        Self {
            min_size: Size::default(),
            default_geometry: Geometry::new(
                DEFAULT_WINDOW_X,
                DEFAULT_WINDOW_Y,
                DEFAULT_WINDOW_WIDTH,
                DEFAULT_WINDOW_HEIGHT,
            ),
            metrics: CellMetrics::default(),
            snapshot_interval: snapshot.interval,
            thumbnail_width: snapshot.thumbnail_width,
            thumbnail_height: snapshot.thumbnail_height,
            interaction: InteractionConfig::default(),
        }
    }
}

impl DesktopConfig {
    pub fn snapshot(&self) -> SnapshotConfig {
        SnapshotConfig {
            interval: self.snapshot_interval,
            thumbnail_width: self.thumbnail_width,
            thumbnail_height: self.thumbnail_height,
            metrics: self.metrics,
        }
    }

    /// Check the invariants the rest of the crate relies on.
    pub fn validate(&self) -> Result<(), String> {
        if self.min_size.width == 0 || self.min_size.height == 0 {
            return Err("minimum window size must be non-zero".to_string());
        }
        if self.snapshot_interval.is_zero() {
            return Err("snapshot interval must be non-zero".to_string());
        }
        if self.thumbnail_width == 0 || self.thumbnail_height == 0 {
            return Err("thumbnail size must be non-zero".to_string());
        }
        Ok(())
    }
}
