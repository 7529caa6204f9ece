use std::io;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::event::{Event, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use desk_wm::desktop::Desktop;
use desk_wm::panes::{Blotter, RiskMonitor};
use desk_wm::ui::UiFrame;
use desk_wm::window::{Geometry, WindowSpec};
use desk_wm::{DesktopConfig, content};

#[derive(Parser, Debug)]
#[command(
    name = "desk-bench",
    version = env!("CARGO_PKG_VERSION"),
    about = "Headless benchmark dragging windows across an offscreen desktop"
)]
struct BenchCli {
    /// Number of windows on the desktop.
    #[arg(short = 'w', long = "windows", value_name = "COUNT", default_value_t = 12)]
    windows: usize,

    /// Drag sessions to run.
    #[arg(short = 'r', long = "rounds", value_name = "COUNT", default_value_t = 200)]
    rounds: usize,

    /// Pointer moves per drag session.
    #[arg(short = 's', long = "steps", value_name = "COUNT", default_value_t = 30)]
    steps: usize,

    /// Offscreen terminal width, in cells.
    #[arg(long = "cols", default_value_t = 200)]
    cols: u16,

    /// Offscreen terminal height, in cells.
    #[arg(long = "rows", default_value_t = 60)]
    rows: u16,
}

struct BenchConfig {
    windows: usize,
    rounds: usize,
    steps: usize,
    area: Rect,
}

impl TryFrom<&BenchCli> for BenchConfig {
    type Error = String;

    fn try_from(cli: &BenchCli) -> Result<Self, Self::Error> {
        if !(1..=64).contains(&cli.windows) {
            return Err("windows must be between 1 and 64".to_string());
        }
        if cli.rounds == 0 || cli.steps == 0 {
            return Err("rounds and steps must be non-zero".to_string());
        }
        if cli.cols < 40 || cli.rows < 20 {
            return Err("offscreen area must be at least 40x20".to_string());
        }
        Ok(Self {
            windows: cli.windows,
            rounds: cli.rounds,
            steps: cli.steps,
            area: Rect::new(0, 0, cli.cols, cli.rows),
        })
    }
}

fn main() -> io::Result<()> {
    let args = BenchCli::parse();
    let config = BenchConfig::try_from(&args)
        .map_err(|msg| io::Error::new(io::ErrorKind::InvalidInput, msg))?;

    let stats = run_benchmark(&config);
    println!("{}", stats.final_report(&config));
    Ok(())
}

fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
    Event::Mouse(MouseEvent {
        kind,
        column,
        row,
        modifiers: KeyModifiers::NONE,
    })
}

/// Cascade the windows so every header stays clickable.
fn populate(desktop: &mut Desktop, count: usize) {
    for index in 0..count {
        let offset = index as i32;
        let geometry = Geometry::new(16 + offset * 16, 16 + offset * 32, 360, 240);
        let spec = if index % 2 == 0 {
            WindowSpec::new(format!("Blotter {index}"), content(Blotter::new(index as u64)))
        } else {
            WindowSpec::new(format!("Risk {index}"), content(RiskMonitor::new(index as u64)))
        };
        desktop.add_window(spec.geometry(geometry));
    }
}

fn render(desktop: &mut Desktop, buffer: &mut Buffer, stats: &mut BenchStats) {
    let started = Instant::now();
    let area = buffer.area;
    {
        let mut frame = UiFrame::from_parts(area, buffer);
        desktop.render(&mut frame);
    }
    stats.record_frame(started.elapsed());
}

fn run_benchmark(config: &BenchConfig) -> BenchStats {
    let mut desktop = Desktop::new(DesktopConfig::default());
    desktop.layout(config.area);
    populate(&mut desktop, config.windows);
    let metrics = desktop.config().metrics;
    let ids = desktop.registry().ids();
    let mut buffer = Buffer::empty(config.area);
    let mut stats = BenchStats::new();
    let mut now = Instant::now();

    for round in 0..config.rounds {
        let id = ids[round % ids.len()];
        let Some(window) = desktop.registry().window(id) else {
            continue;
        };
        let rect = metrics.to_cells(window.geometry(), desktop.managed_area());
        let (Ok(column), Ok(row)) = (u16::try_from(rect.x + 2), u16::try_from(rect.y + 1)) else {
            continue;
        };
        let before = window.revision();

        // Spaced past the double-click window so each press is a fresh click.
        now += Duration::from_secs(1);
        desktop.handle_event(&mouse(MouseEventKind::Down(MouseButton::Left), column, row), now);
        for step in 0..config.steps {
            let dx = if step % 2 == 0 { 1 } else { 0 };
            desktop.handle_event(
                &mouse(MouseEventKind::Drag(MouseButton::Left), column + dx, row),
                now,
            );
            render(&mut desktop, &mut buffer, &mut stats);
        }
        desktop.handle_event(
            &mouse(MouseEventKind::Up(MouseButton::Left), column + 1, row),
            now,
        );
        render(&mut desktop, &mut buffer, &mut stats);
        stats.drags += 1;
        if desktop.registry().revision_of(id).is_some_and(|rev| rev != before) {
            stats.commits += 1;
        }

        if round % 10 == 9 {
            desktop.minimize_window(id);
            desktop.restore_window(id);
        }
        stats.thumbnails += desktop.tick(now);
    }
    stats.thumbnails += desktop.wait_for_snapshots(Duration::from_secs(2));
    stats.mark_completed();
    stats
}

struct BenchStats {
    start: Instant,
    completed_at: Option<Instant>,
    frame_count: u64,
    drags: u64,
    commits: u64,
    thumbnails: usize,
    total_draw_time: Duration,
    fastest_frame: Duration,
    slowest_frame: Duration,
}

impl BenchStats {
    fn new() -> Self {
        Self {
            start: Instant::now(),
            completed_at: None,
            frame_count: 0,
            drags: 0,
            commits: 0,
            thumbnails: 0,
            total_draw_time: Duration::ZERO,
            fastest_frame: Duration::MAX,
            slowest_frame: Duration::ZERO,
        }
    }

    fn elapsed(&self) -> Duration {
        match self.completed_at {
            Some(done) => done.duration_since(self.start),
            None => self.start.elapsed(),
        }
    }

    fn mark_completed(&mut self) {
        self.completed_at = Some(Instant::now());
    }

    fn record_frame(&mut self, draw_time: Duration) {
        self.frame_count = self.frame_count.saturating_add(1);
        self.total_draw_time += draw_time;
        self.fastest_frame = self.fastest_frame.min(draw_time);
        self.slowest_frame = self.slowest_frame.max(draw_time);
    }

    fn frame_ms(&self, value: Duration) -> f64 {
        if self.frame_count == 0 {
            return 0.0;
        }
        value.as_secs_f64() * 1_000.0
    }

    fn final_report(&self, config: &BenchConfig) -> String {
        let elapsed = self.elapsed().as_secs_f64();
        let fps = if elapsed > 0.0 {
            self.frame_count as f64 / elapsed
        } else {
            0.0
        };
        let average = if self.frame_count == 0 {
            Duration::ZERO
        } else {
            self.total_draw_time / self.frame_count as u32
        };

        indoc::formatdoc!(
            r#"
            Desk bench completed.
            Desktop: {cols}x{rows} cells, {windows} windows
            Drags: {drags} ({commits} committed) | Thumbnails stored: {thumbs}
            Frames: {frames} in {elapsed:.2}s (~{fps:.1}/s)
            Avg frame: {avg:.3} ms | Best: {best:.3} ms | Worst: {worst:.3} ms
            "#,
            cols = config.area.width,
            rows = config.area.height,
            windows = config.windows,
            drags = self.drags,
            commits = self.commits,
            thumbs = self.thumbnails,
            frames = self.frame_count,
            elapsed = elapsed,
            fps = fps,
            avg = self.frame_ms(average),
            best = self.frame_ms(self.fastest_frame),
            worst = self.frame_ms(self.slowest_frame),
        )
    }
}
