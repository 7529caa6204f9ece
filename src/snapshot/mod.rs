//! Thumbnail capture for the launcher.
//!
//! Content is rendered offscreen on the UI thread (it is not `Send`), then the
//! rendered buffer is handed to a background encoder. Results are applied by
//! [`SnapshotService::pump`], which drops anything for a window that has been
//! closed in the meantime and anything older than a result already applied.

mod thumbnail;

pub use thumbnail::{Thumbnail, ThumbnailCell};

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use thiserror::Error;

use crate::constants::{SNAPSHOT_INTERVAL, THUMBNAIL_HEIGHT, THUMBNAIL_WIDTH};
use crate::content::{ContentError, RenderContext, render_guarded};
use crate::layout::CellMetrics;
use crate::ui::UiFrame;
use crate::window::{WindowDecorator, WindowId, WindowRegistry};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("window {0} is not registered")]
    UnknownWindow(WindowId),
    #[error(transparent)]
    Render(#[from] ContentError),
    #[error("nothing to capture: rendered surface is empty")]
    EmptySurface,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotConfig {
    /// Period of the capture of the focused window.
    pub interval: Duration,
    pub thumbnail_width: u16,
    pub thumbnail_height: u16,
    pub metrics: CellMetrics,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            interval: SNAPSHOT_INTERVAL,
            thumbnail_width: THUMBNAIL_WIDTH,
            thumbnail_height: THUMBNAIL_HEIGHT,
            metrics: CellMetrics::default(),
        }
    }
}

struct EncodeJob {
    id: WindowId,
    ticket: u64,
    surface: Buffer,
    width: u16,
    height: u16,
}

impl EncodeJob {
    fn run(self) -> EncodeOutcome {
        EncodeOutcome {
            id: self.id,
            ticket: self.ticket,
            result: Thumbnail::encode(&self.surface, self.width, self.height),
        }
    }
}

struct EncodeOutcome {
    id: WindowId,
    ticket: u64,
    result: Result<Thumbnail, SnapshotError>,
}

pub struct SnapshotService {
    config: SnapshotConfig,
    jobs: Option<Sender<EncodeJob>>,
    results_tx: Sender<EncodeOutcome>,
    results: Receiver<EncodeOutcome>,
    worker: Option<JoinHandle<()>>,
    next_ticket: u64,
    in_flight: usize,
    applied: HashMap<WindowId, u64>,
    timer: Option<(WindowId, Instant)>,
}

impl std::fmt::Debug for SnapshotService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotService")
            .field("config", &self.config)
            .field("threaded", &self.jobs.is_some())
            .field("in_flight", &self.in_flight)
            .field("timer", &self.timer)
            .finish_non_exhaustive()
    }
}

impl Default for SnapshotService {
    fn default() -> Self {
        Self::new(SnapshotConfig::default())
    }
}

impl SnapshotService {
    pub fn new(config: SnapshotConfig) -> Self {
        let (results_tx, results) = mpsc::channel();
        let (jobs_tx, jobs_rx) = mpsc::channel::<EncodeJob>();
        let worker_results = results_tx.clone();
        let spawned = thread::Builder::new()
            .name("snapshot-encoder".to_string())
            .spawn(move || encode_loop(jobs_rx, worker_results));
        let (jobs, worker) = match spawned {
            Ok(handle) => (Some(jobs_tx), Some(handle)),
            Err(err) => {
                tracing::warn!(error = %err, "snapshot encoder thread unavailable; encoding inline");
                (None, None)
            }
        };
        Self {
            config,
            jobs,
            results_tx,
            results,
            worker,
            next_ticket: 1,
            in_flight: 0,
            applied: HashMap::new(),
            timer: None,
        }
    }

    pub fn config(&self) -> &SnapshotConfig {
        &self.config
    }

    /// Number of captures whose encoded result has not been applied yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Window and deadline of the next periodic capture.
    pub fn next_capture(&self) -> Option<(WindowId, Instant)> {
        self.timer
    }

    /// Render `id` offscreen and queue it for encoding. Returns the capture
    /// ticket; a later ticket for the same window supersedes this one.
    pub fn capture_now(
        &mut self,
        registry: &WindowRegistry,
        decorator: &dyn WindowDecorator,
        id: WindowId,
    ) -> Result<u64, SnapshotError> {
        let window = registry
            .window(id)
            .ok_or(SnapshotError::UnknownWindow(id))?;
        let outer = self
            .config
            .metrics
            .to_cells(window.geometry(), Rect::default());
        let inner = decorator.content_area(outer);
        if inner.width == 0 || inner.height == 0 {
            return Err(SnapshotError::EmptySurface);
        }
        let area = Rect::new(0, 0, inner.width, inner.height);
        let mut surface = Buffer::empty(area);
        {
            let mut frame = UiFrame::from_parts(area, &mut surface);
            render_guarded(window.content(), &mut frame, area, &RenderContext::offscreen())?;
        }

        let ticket = self.next_ticket;
        self.next_ticket += 1;
        let job = EncodeJob {
            id,
            ticket,
            surface,
            width: self.config.thumbnail_width,
            height: self.config.thumbnail_height,
        };
        self.dispatch(job);
        self.in_flight += 1;
        tracing::debug!(window_id = %id, ticket, "snapshot queued");
        Ok(ticket)
    }

    /// Like [`Self::capture_now`], but a failure is logged and swallowed.
    /// The window keeps whatever thumbnail it had before.
    pub fn capture(
        &mut self,
        registry: &WindowRegistry,
        decorator: &dyn WindowDecorator,
        id: WindowId,
    ) -> Option<u64> {
        match self.capture_now(registry, decorator, id) {
            Ok(ticket) => Some(ticket),
            Err(err) => {
                tracing::warn!(window_id = %id, error = %err, "snapshot capture failed");
                None
            }
        }
    }

    fn dispatch(&mut self, job: EncodeJob) {
        let job = match self.jobs.as_ref() {
            Some(jobs) => match jobs.send(job) {
                Ok(()) => return,
                Err(mpsc::SendError(job)) => {
                    tracing::warn!("snapshot encoder stopped; encoding inline");
                    self.jobs = None;
                    job
                }
            },
            None => job,
        };
        // The receiver lives in `self`, so this cannot fail.
        let _ = self.results_tx.send(job.run());
    }

    /// Apply every finished capture. Returns how many thumbnails were stored.
    pub fn pump(&mut self, registry: &mut WindowRegistry) -> usize {
        let mut stored = 0;
        while let Ok(outcome) = self.results.try_recv() {
            if self.apply(registry, outcome) {
                stored += 1;
            }
        }
        self.forget_closed(registry);
        stored
    }

    /// Block until every queued capture has been applied or `timeout` passes.
    pub fn wait_idle(&mut self, registry: &mut WindowRegistry, timeout: Duration) -> usize {
        let deadline = Instant::now() + timeout;
        let mut stored = 0;
        while self.in_flight > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.results.recv_timeout(remaining) {
                Ok(outcome) => {
                    if self.apply(registry, outcome) {
                        stored += 1;
                    }
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        self.forget_closed(registry);
        stored
    }

    /// Drop stale-result bookkeeping for windows that no longer exist.
    fn forget_closed(&mut self, registry: &WindowRegistry) {
        self.applied.retain(|id, _| registry.contains(*id));
    }

    fn apply(&mut self, registry: &mut WindowRegistry, outcome: EncodeOutcome) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);
        let EncodeOutcome { id, ticket, result } = outcome;
        if !registry.contains(id) {
            self.applied.remove(&id);
            tracing::debug!(window_id = %id, ticket, "dropping snapshot for closed window");
            return false;
        }
        if self.applied.get(&id).is_some_and(|latest| *latest >= ticket) {
            tracing::debug!(window_id = %id, ticket, "dropping superseded snapshot");
            return false;
        }
        match result {
            Ok(thumbnail) => {
                self.applied.insert(id, ticket);
                registry.store_thumbnail(id, thumbnail)
            }
            Err(err) => {
                tracing::warn!(
                    window_id = %id,
                    ticket,
                    error = %err,
                    "snapshot encode failed; keeping previous thumbnail"
                );
                false
            }
        }
    }

    /// Drive the periodic capture and apply finished results.
    ///
    /// The timer follows focus: it is armed one interval out whenever a new
    /// window takes focus, cleared when nothing is focused, and re-armed
    /// after each capture.
    pub fn tick(
        &mut self,
        registry: &mut WindowRegistry,
        decorator: &dyn WindowDecorator,
        now: Instant,
    ) -> usize {
        let stored = self.pump(registry);
        match (self.timer, registry.focused_id()) {
            (Some((armed, _)), Some(focused)) if armed == focused => {}
            (_, Some(focused)) => self.timer = Some((focused, now + self.config.interval)),
            (_, None) => self.timer = None,
        }
        if let Some((id, deadline)) = self.timer
            && now >= deadline
        {
            self.capture(registry, decorator, id);
            self.timer = Some((id, now + self.config.interval));
        }
        stored
    }
}

impl Drop for SnapshotService {
    fn drop(&mut self) {
        self.jobs.take();
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            tracing::warn!("snapshot encoder thread panicked");
        }
    }
}

fn encode_loop(jobs: Receiver<EncodeJob>, results: Sender<EncodeOutcome>) {
    while let Ok(job) = jobs.recv() {
        if results.send(job.run()).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Content, Renderable, content};
    use crate::window::{DefaultDecorator, Geometry, WindowSpec};
    use ratatui::style::Style;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Ticker {
        frame: Rc<Cell<u32>>,
    }

    impl Renderable for Ticker {
        fn render(
            &mut self,
            frame: &mut UiFrame<'_>,
            area: Rect,
            _ctx: &RenderContext,
        ) -> Result<(), ContentError> {
            let text = format!("{}", self.frame.get());
            frame
                .buffer_mut()
                .set_string(area.x, area.y, text, Style::default());
            Ok(())
        }
    }

    struct Broken;

    impl Renderable for Broken {
        fn render(
            &mut self,
            _frame: &mut UiFrame<'_>,
            _area: Rect,
            _ctx: &RenderContext,
        ) -> Result<(), ContentError> {
            Err(ContentError::failed("no data"))
        }
    }

    fn ticker(counter: &Rc<Cell<u32>>) -> Content {
        content(Ticker {
            frame: Rc::clone(counter),
        })
    }

    fn fast_config() -> SnapshotConfig {
        SnapshotConfig {
            interval: Duration::from_secs(60),
            ..SnapshotConfig::default()
        }
    }

    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn capture_stores_thumbnail_after_pump() {
        let counter = Rc::new(Cell::new(7));
        let mut reg = WindowRegistry::new();
        let id = reg.add_window(
            WindowSpec::new("T", ticker(&counter)).geometry(Geometry::new(0, 0, 400, 300)),
        );
        let mut snaps = SnapshotService::new(fast_config());
        assert!(snaps.capture(&reg, &DefaultDecorator, id).is_some());
        assert_eq!(snaps.wait_idle(&mut reg, WAIT), 1);
        let thumb = reg.window(id).unwrap().snapshot_thumbnail().unwrap();
        assert_eq!(thumb.cell(0, 0).unwrap().symbol, "7");
        assert_eq!(snaps.in_flight(), 0);
    }

    #[test]
    fn result_for_closed_window_is_discarded() {
        let counter = Rc::new(Cell::new(1));
        let mut reg = WindowRegistry::new();
        let id = reg.add_window(WindowSpec::new("T", ticker(&counter)));
        let mut snaps = SnapshotService::new(fast_config());
        snaps.capture(&reg, &DefaultDecorator, id);
        reg.close_window(id);
        assert_eq!(snaps.wait_idle(&mut reg, WAIT), 0);
        assert!(reg.window(id).is_none());
    }

    #[test]
    fn render_failure_keeps_previous_thumbnail() {
        let counter = Rc::new(Cell::new(3));
        let mut reg = WindowRegistry::new();
        let good = reg.add_window(WindowSpec::new("T", ticker(&counter)));
        let mut snaps = SnapshotService::new(fast_config());
        snaps.capture(&reg, &DefaultDecorator, good);
        snaps.wait_idle(&mut reg, WAIT);

        let bad = reg.add_window(WindowSpec::new("B", content(Broken)));
        assert!(matches!(
            snaps.capture_now(&reg, &DefaultDecorator, bad),
            Err(SnapshotError::Render(_))
        ));
        assert!(reg.window(bad).unwrap().snapshot_thumbnail().is_none());
        assert!(reg.window(good).unwrap().snapshot_thumbnail().is_some());
    }

    #[test]
    fn unknown_window_is_an_error() {
        let mut reg = WindowRegistry::new();
        let mut snaps = SnapshotService::new(fast_config());
        let ghost = WindowId::from_raw(42);
        assert!(matches!(
            snaps.capture_now(&reg, &DefaultDecorator, ghost),
            Err(SnapshotError::UnknownWindow(_))
        ));
        assert_eq!(snaps.pump(&mut reg), 0);
    }

    #[test]
    fn latest_capture_wins() {
        let counter = Rc::new(Cell::new(1));
        let mut reg = WindowRegistry::new();
        let id = reg.add_window(WindowSpec::new("T", ticker(&counter)));
        let mut snaps = SnapshotService::new(fast_config());
        snaps.capture(&reg, &DefaultDecorator, id);
        counter.set(2);
        snaps.capture(&reg, &DefaultDecorator, id);
        snaps.wait_idle(&mut reg, WAIT);
        let thumb = reg.window(id).unwrap().snapshot_thumbnail().unwrap();
        assert_eq!(thumb.cell(0, 0).unwrap().symbol, "2");
    }

    #[test]
    fn timer_follows_focus_and_rearms() {
        let counter = Rc::new(Cell::new(5));
        let mut reg = WindowRegistry::new();
        let a = reg.add_window(WindowSpec::new("A", ticker(&counter)));
        let mut snaps = SnapshotService::new(fast_config());
        let t0 = Instant::now();

        snaps.tick(&mut reg, &DefaultDecorator, t0);
        assert_eq!(snaps.next_capture(), Some((a, t0 + Duration::from_secs(60))));

        // not due yet
        snaps.tick(&mut reg, &DefaultDecorator, t0 + Duration::from_secs(30));
        assert_eq!(snaps.in_flight(), 0);

        let due = t0 + Duration::from_secs(60);
        snaps.tick(&mut reg, &DefaultDecorator, due);
        assert_eq!(snaps.in_flight(), 1);
        assert_eq!(snaps.next_capture(), Some((a, due + Duration::from_secs(60))));
        snaps.wait_idle(&mut reg, WAIT);
        assert!(reg.window(a).unwrap().snapshot_thumbnail().is_some());

        let b = reg.add_window(WindowSpec::new("B", ticker(&counter)));
        snaps.tick(&mut reg, &DefaultDecorator, due);
        assert_eq!(snaps.next_capture(), Some((b, due + Duration::from_secs(60))));

        // Closing the target drops its deadline; focus falls back to A.
        let later = due + Duration::from_secs(10);
        reg.close_window(b);
        snaps.tick(&mut reg, &DefaultDecorator, later);
        assert_eq!(snaps.next_capture(), Some((a, later + Duration::from_secs(60))));

        reg.close_window(a);
        snaps.tick(&mut reg, &DefaultDecorator, later);
        assert_eq!(snaps.next_capture(), None);
    }

    #[test]
    fn minimizing_everything_clears_the_timer() {
        let counter = Rc::new(Cell::new(5));
        let mut reg = WindowRegistry::new();
        let a = reg.add_window(WindowSpec::new("A", ticker(&counter)));
        let mut snaps = SnapshotService::new(fast_config());
        let t0 = Instant::now();
        snaps.tick(&mut reg, &DefaultDecorator, t0);
        assert!(snaps.next_capture().is_some());

        reg.minimize_window(a);
        snaps.tick(&mut reg, &DefaultDecorator, t0);
        assert_eq!(snaps.next_capture(), None);
    }

    #[test]
    fn closed_windows_leave_no_bookkeeping_behind() {
        let counter = Rc::new(Cell::new(1));
        let mut reg = WindowRegistry::new();
        let mut snaps = SnapshotService::new(fast_config());
        for _ in 0..50 {
            let id = reg.add_window(WindowSpec::new("T", ticker(&counter)));
            snaps.capture(&reg, &DefaultDecorator, id);
            snaps.wait_idle(&mut reg, WAIT);
            reg.close_window(id);
        }
        snaps.pump(&mut reg);
        assert!(reg.is_empty());
        assert!(snaps.applied.is_empty());
    }
}
