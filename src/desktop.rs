//! The desktop: registry, per-window controllers, snapshot service and
//! launcher wired together behind one event/tick/render surface.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use crossterm::event::{Event, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::style::Style;

use crate::config::DesktopConfig;
use crate::launcher::Launcher;
use crate::layout::rect_contains;
use crate::snapshot::SnapshotService;
use crate::theme;
use crate::ui::UiFrame;
use crate::window::{
    Chrome, DefaultDecorator, WindowController, WindowDecorator, WindowId, WindowRegistry,
    WindowSpec,
};

#[derive(Debug)]
pub struct Desktop {
    registry: WindowRegistry,
    controllers: BTreeMap<WindowId, WindowController>,
    snapshots: SnapshotService,
    launcher: Launcher,
    decorator: Arc<dyn WindowDecorator>,
    config: DesktopConfig,
    managed_area: Rect,
    /// Window holding the pointer between press and release.
    captured: Option<WindowId>,
    redraw: bool,
}

impl Default for Desktop {
    fn default() -> Self {
        Self::new(DesktopConfig::default())
    }
}

impl Desktop {
    pub fn new(config: DesktopConfig) -> Self {
        Self::with_decorator(config, Arc::new(DefaultDecorator))
    }

    pub fn with_decorator(config: DesktopConfig, decorator: Arc<dyn WindowDecorator>) -> Self {
        let registry = WindowRegistry::new()
            .with_min_size(config.min_size)
            .with_default_geometry(config.default_geometry);
        Self {
            registry,
            controllers: BTreeMap::new(),
            snapshots: SnapshotService::new(config.snapshot()),
            launcher: Launcher::new(),
            decorator,
            config,
            managed_area: Rect::default(),
            captured: None,
            redraw: true,
        }
    }

    pub fn config(&self) -> &DesktopConfig {
        &self.config
    }

    pub fn registry(&self) -> &WindowRegistry {
        &self.registry
    }

    /// Direct registry access for callers driving lifecycle operations.
    /// Controllers pick the changes up on the next [`Self::sync_controllers`].
    pub fn registry_mut(&mut self) -> &mut WindowRegistry {
        &mut self.registry
    }

    pub fn snapshots(&self) -> &SnapshotService {
        &self.snapshots
    }

    pub fn launcher(&self) -> &Launcher {
        &self.launcher
    }

    pub fn controller(&self, id: WindowId) -> Option<&WindowController> {
        self.controllers.get(&id)
    }

    pub fn decorator(&self) -> Arc<dyn WindowDecorator> {
        Arc::clone(&self.decorator)
    }

    pub fn managed_area(&self) -> Rect {
        self.managed_area
    }

    pub fn add_window(&mut self, spec: WindowSpec) -> WindowId {
        let id = self.registry.add_window(spec);
        self.sync_controllers();
        id
    }

    /// Capture a preview, then minimize.
    pub fn minimize_window(&mut self, id: WindowId) -> bool {
        if !self.registry.contains(id) {
            return false;
        }
        self.snapshots
            .capture(&self.registry, self.decorator.as_ref(), id);
        let applied = self.registry.minimize_window(id);
        self.sync_controllers();
        applied
    }

    pub fn restore_window(&mut self, id: WindowId) -> bool {
        let applied = self.launcher.activate(&mut self.registry, id);
        self.sync_controllers();
        applied
    }

    pub fn close_window(&mut self, id: WindowId) -> bool {
        let applied = self.registry.close_window(id);
        self.sync_controllers();
        applied
    }

    /// Give a window whose content failed another chance to render.
    pub fn retry_content(&mut self, id: WindowId) -> bool {
        let Some(controller) = self.controllers.get_mut(&id) else {
            return false;
        };
        if controller.content_error().is_none() {
            return false;
        }
        controller.reset_content_error();
        self.redraw = true;
        true
    }

    /// Attach controllers to new windows, drop those of closed windows, and
    /// let each controller observe its own window. Returns how many
    /// controllers saw a change.
    pub fn sync_controllers(&mut self) -> usize {
        let interaction = self.config.interaction;
        for window in self.registry.windows() {
            self.controllers
                .entry(window.id())
                .or_insert_with(|| WindowController::new(window.id(), interaction));
        }
        let mut changed = 0;
        let mut closed = Vec::new();
        for (id, controller) in self.controllers.iter_mut() {
            if let Some(change) = controller.observe(&self.registry) {
                changed += 1;
                if change.closed {
                    closed.push(*id);
                }
            }
        }
        for id in closed {
            self.controllers.remove(&id);
            if self.captured == Some(id) {
                self.captured = None;
            }
        }
        if changed > 0 {
            self.redraw = true;
        }
        changed
    }

    /// Split `area` into desktop and launcher and publish the viewport.
    pub fn layout(&mut self, area: Rect) {
        let (managed, _) = self.launcher.split_area(area);
        if managed != self.managed_area {
            self.managed_area = managed;
            self.registry
                .set_viewport(self.config.metrics.viewport(managed));
            self.redraw = true;
        }
    }

    pub fn handle_event(&mut self, event: &Event, now: Instant) -> bool {
        let handled = match event {
            Event::FocusLost => {
                self.cancel_pointer();
                true
            }
            Event::Resize(width, height) => {
                self.layout(Rect::new(0, 0, *width, *height));
                true
            }
            Event::Mouse(mouse) => self.handle_mouse(mouse, now),
            _ => false,
        };
        self.sync_controllers();
        if handled {
            self.redraw = true;
        }
        handled
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent, now: Instant) -> bool {
        let chrome = Chrome::new(
            self.decorator.as_ref(),
            self.config.metrics,
            self.managed_area,
        );

        if let Some(id) = self.captured {
            if let Some(controller) = self.controllers.get_mut(&id) {
                let consumed = controller.handle_mouse(
                    mouse,
                    &mut self.registry,
                    &mut self.snapshots,
                    &chrome,
                    now,
                );
                if !consumed && matches!(mouse.kind, MouseEventKind::Down(_)) {
                    // The release was lost; settle the open session where it stands.
                    controller.cancel(&mut self.registry);
                }
                if !controller.is_interacting() {
                    self.captured = None;
                }
                if consumed {
                    return true;
                }
            } else {
                self.captured = None;
            }
        }

        match mouse.kind {
            MouseEventKind::Down(_) => {
                if rect_contains(self.launcher.area(), mouse.column, mouse.row) {
                    return self.launcher.handle_mouse(mouse, &mut self.registry);
                }
                for id in self.registry.render_order().into_iter().rev() {
                    let Some(controller) = self.controllers.get_mut(&id) else {
                        continue;
                    };
                    if controller.handle_mouse(
                        mouse,
                        &mut self.registry,
                        &mut self.snapshots,
                        &chrome,
                        now,
                    ) {
                        if controller.is_interacting() {
                            self.captured = Some(id);
                        }
                        return true;
                    }
                }
                false
            }
            MouseEventKind::Moved => self.launcher.handle_mouse(mouse, &mut self.registry),
            _ => false,
        }
    }

    /// Commit any open drag or resize, as if the pointer had been released.
    pub fn cancel_pointer(&mut self) {
        if let Some(id) = self.captured.take()
            && let Some(controller) = self.controllers.get_mut(&id)
        {
            controller.cancel(&mut self.registry);
        }
    }

    /// Periodic work: snapshot timer and delivery of finished captures.
    pub fn tick(&mut self, now: Instant) -> usize {
        let stored = self
            .snapshots
            .tick(&mut self.registry, self.decorator.as_ref(), now);
        self.sync_controllers();
        stored
    }

    /// Whether anything changed since the last call. Clears the flag.
    pub fn take_redraw(&mut self) -> bool {
        let mut redraw = std::mem::take(&mut self.redraw);
        for controller in self.controllers.values_mut() {
            redraw |= controller.take_dirty();
        }
        redraw
    }

    pub fn render(&mut self, frame: &mut UiFrame<'_>) {
        self.layout(frame.area());
        let managed = self.managed_area;
        frame.fill(managed, Style::default().bg(theme::desktop_bg()));
        let chrome = Chrome::new(self.decorator.as_ref(), self.config.metrics, managed);
        // Windows are clipped to the desktop so they never paint over the launcher.
        let clip = managed.intersection(frame.area());
        let mut desktop_frame = UiFrame::from_parts(clip, frame.buffer_mut());
        for id in self.registry.render_order() {
            if let Some(controller) = self.controllers.get_mut(&id) {
                controller.render(&mut desktop_frame, &self.registry, &chrome);
            }
        }
        self.launcher.render(frame, &self.registry, managed);
    }

    /// Block until queued captures land. Tests and the benchmark use this.
    pub fn wait_for_snapshots(&mut self, timeout: std::time::Duration) -> usize {
        let stored = self.snapshots.wait_idle(&mut self.registry, timeout);
        self.sync_controllers();
        stored
    }
}
