use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::Level;

use desk_wm::content::Content;
use desk_wm::desktop::Desktop;
use desk_wm::drivers::{ConsoleInputDriver, ConsoleOutputDriver, OutputDriver};
use desk_wm::event_loop::{ControlFlow, EventLoop, LoopEvent};
use desk_wm::layout::CellMetrics;
use desk_wm::log_buffer::{self, LogHandle, LogView};
use desk_wm::panes::{About, Blotter, FlakyChart, RiskMonitor};
use desk_wm::window::{Geometry, RiskLevel, Size, WindowSpec};
use desk_wm::{DesktopConfig, content};

/// How often the demo feeds move.
const FEED_PERIOD: Duration = Duration::from_millis(500);

#[derive(Parser, Debug)]
#[command(
    name = "desk-wm",
    version = env!("CARGO_PKG_VERSION"),
    about = "Floating dashboard windows with a minimized-window launcher"
)]
struct Cli {
    /// Seconds between background captures of the focused window.
    #[arg(long = "snapshot-secs", value_name = "SECONDS", default_value_t = 60)]
    snapshot_secs: u64,

    /// Logical pixels per terminal column.
    #[arg(long = "cell-width", value_name = "PX", default_value_t = 8)]
    cell_width: u16,

    /// Logical pixels per terminal row.
    #[arg(long = "cell-height", value_name = "PX", default_value_t = 16)]
    cell_height: u16,

    /// Smallest window width, in logical pixels.
    #[arg(long = "min-width", value_name = "PX", default_value_t = 200)]
    min_width: u32,

    /// Smallest window height, in logical pixels.
    #[arg(long = "min-height", value_name = "PX", default_value_t = 150)]
    min_height: u32,

    /// Event loop tick, in milliseconds.
    #[arg(long = "tick-ms", value_name = "MS", default_value_t = 16)]
    tick_ms: u64,

    /// Log debug events into the log window.
    #[arg(short, long)]
    verbose: bool,
}

impl TryFrom<&Cli> for DesktopConfig {
    type Error = String;

    fn try_from(cli: &Cli) -> Result<Self, Self::Error> {
        if cli.cell_width == 0 || cli.cell_height == 0 {
            return Err("cell size must be non-zero".to_string());
        }
        let config = DesktopConfig {
            min_size: Size::new(cli.min_width, cli.min_height),
            metrics: CellMetrics::new(cli.cell_width, cli.cell_height),
            snapshot_interval: Duration::from_secs(cli.snapshot_secs),
            ..DesktopConfig::default()
        };
        config.validate()?;
        Ok(config)
    }
}

/// Feeds the demo keeps a handle on so it can move them between frames.
#[derive(Default)]
struct Feeds {
    blotters: Vec<Rc<RefCell<Blotter>>>,
    monitors: Vec<Rc<RefCell<RiskMonitor>>>,
    last_advance: Option<Instant>,
}

impl Feeds {
    fn blotter(&mut self, seed: u64) -> Content {
        let blotter = Rc::new(RefCell::new(Blotter::new(seed)));
        self.blotters.push(Rc::clone(&blotter));
        blotter
    }

    fn monitor(&mut self, seed: u64) -> Content {
        let monitor = Rc::new(RefCell::new(RiskMonitor::new(seed)));
        self.monitors.push(Rc::clone(&monitor));
        monitor
    }

    /// Returns `true` when the feeds moved.
    fn advance(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_advance
            && now.duration_since(last) < FEED_PERIOD
        {
            return false;
        }
        self.last_advance = Some(now);
        // A pane mid-render keeps its old numbers this round.
        for blotter in &self.blotters {
            if let Ok(mut blotter) = blotter.try_borrow_mut() {
                blotter.advance();
            }
        }
        for monitor in &self.monitors {
            if let Ok(mut monitor) = monitor.try_borrow_mut() {
                monitor.advance();
            }
        }
        true
    }
}

fn seed_windows(desktop: &mut Desktop, feeds: &mut Feeds, log: &LogHandle) {
    desktop.add_window(
        WindowSpec::new("Blotter", feeds.blotter(1))
            .geometry(Geometry::new(16, 16, 400, 320))
            .badge_count(3),
    );
    desktop.add_window(
        WindowSpec::new("Risk", feeds.monitor(2))
            .geometry(Geometry::new(440, 16, 320, 160))
            .risk_level(RiskLevel::High),
    );
    desktop.add_window(
        WindowSpec::new("Chart", content(FlakyChart::new(3, 900)))
            .geometry(Geometry::new(440, 192, 320, 160))
            .risk_level(RiskLevel::Medium),
    );
    desktop.add_window(
        WindowSpec::new("Log", content(LogView::new(log.clone())))
            .geometry(Geometry::new(16, 352, 744, 192)),
    );
    desktop.add_window(WindowSpec::new("About", content(About)).minimized(true));
}

/// Desktop-level shortcuts. Returns `None` for keys the desktop should see.
fn handle_shortcut(
    key: &KeyEvent,
    desktop: &mut Desktop,
    feeds: &mut Feeds,
) -> Option<ControlFlow> {
    if key.kind != KeyEventKind::Press || !key.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }
    let focused = desktop.registry().focused_id();
    match key.code {
        KeyCode::Char('q') => Some(ControlFlow::Quit),
        KeyCode::Char('n') => {
            let seed = feeds.blotters.len() as u64 + 100;
            desktop.add_window(WindowSpec::new("Blotter", feeds.blotter(seed)));
            Some(ControlFlow::Continue)
        }
        KeyCode::Char('w') => {
            if let Some(id) = focused {
                desktop.close_window(id);
            }
            Some(ControlFlow::Continue)
        }
        KeyCode::Char('r') => {
            if let Some(id) = focused {
                desktop.retry_content(id);
            }
            Some(ControlFlow::Continue)
        }
        KeyCode::Char('d') => {
            if let Some(id) = focused {
                desktop.minimize_window(id);
            }
            Some(ControlFlow::Continue)
        }
        _ => None,
    }
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let config = DesktopConfig::try_from(&cli)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;

    let log = LogHandle::default();
    log_buffer::set_global_log(log.clone());
    log_buffer::install_panic_hook();
    desk_wm::tracing_sub::init(if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    });

    let mut desktop = Desktop::new(config);
    let mut feeds = Feeds::default();
    seed_windows(&mut desktop, &mut feeds, &log);
    tracing::info!(windows = desktop.registry().len(), "desktop ready");

    let mut output = ConsoleOutputDriver::new()?;
    output.enter()?;
    let mut event_loop = EventLoop::new(
        ConsoleInputDriver::new(),
        Duration::from_millis(cli.tick_ms.max(1)),
    );
    let mut first_frame = true;

    let result = event_loop.run(|_, event| {
        match event {
            LoopEvent::Input(Event::Key(key)) => {
                if let Some(flow) = handle_shortcut(&key, &mut desktop, &mut feeds) {
                    return Ok(flow);
                }
            }
            LoopEvent::Input(event) => {
                desktop.handle_event(&event, Instant::now());
            }
            LoopEvent::Tick(now) => {
                let moved = feeds.advance(now);
                desktop.tick(now);
                if log_buffer::take_panic_pending() {
                    tracing::warn!("a panic was captured; see the log window");
                }
                if std::mem::take(&mut first_frame) | desktop.take_redraw() | moved {
                    output.draw(|mut frame| desktop.render(&mut frame))?;
                }
            }
        }
        Ok(ControlFlow::Continue)
    });

    output.exit()?;
    result
}
