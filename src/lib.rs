pub mod config;
pub mod constants;
pub mod content;
pub mod desktop;
pub mod drivers;
pub mod event_loop;
pub mod launcher;
pub mod layout;
pub mod log_buffer;
pub mod panes;
pub mod snapshot;
pub mod theme;
pub mod tracing_sub;
pub mod ui;
pub mod window;

pub use config::DesktopConfig;
pub use content::{Content, ContentError, RenderContext, Renderable, content};
pub use desktop::Desktop;
pub use window::{Geometry, RiskLevel, Size, WindowId, WindowSpec};
