//! Demo window content for the binary and the benchmark.
//!
//! Data is synthetic and deterministic: every pane derives its numbers from a
//! step counter the host advances on each tick.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Text};
use ratatui::widgets::{Gauge, Paragraph, Row, Sparkline, Table, Wrap};

use crate::content::{ContentError, RenderContext, Renderable};
use crate::theme;
use crate::ui::UiFrame;

const SYMBOLS: [&str; 6] = ["ACME", "GLOBX", "INITE", "UMBR", "WAYNE", "STARK"];

/// Cheap deterministic mixer, enough to make the numbers move.
fn mix(seed: u64, step: u64) -> u64 {
    let mut x = seed ^ step.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    x ^= x >> 33;
    x = x.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    x ^= x >> 33;
    x
}

/// Scrolling list of fills.
#[derive(Debug, Clone)]
pub struct Blotter {
    seed: u64,
    step: u64,
}

impl Blotter {
    pub fn new(seed: u64) -> Self {
        Self { seed, step: 0 }
    }

    pub fn advance(&mut self) {
        self.step += 1;
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    fn fill(&self, step: u64) -> [String; 4] {
        let r = mix(self.seed, step);
        let symbol = SYMBOLS[(r % SYMBOLS.len() as u64) as usize];
        let side = if r & 0x100 == 0 { "BUY" } else { "SELL" };
        let qty = 100 * (1 + (r >> 12) % 50);
        let px = 50.0 + ((r >> 24) % 10_000) as f64 / 100.0;
        [
            format!("#{step:05}"),
            symbol.to_string(),
            side.to_string(),
            format!("{qty} @ {px:.2}"),
        ]
    }
}

impl Renderable for Blotter {
    fn render(
        &mut self,
        frame: &mut UiFrame<'_>,
        area: Rect,
        _ctx: &RenderContext,
    ) -> Result<(), ContentError> {
        if area.height < 2 {
            return Ok(());
        }
        let visible = (area.height - 1) as u64;
        let first = self.step.saturating_sub(visible.saturating_sub(1));
        let rows = (first..=self.step).rev().map(|step| Row::new(self.fill(step)));
        let table = Table::new(
            rows,
            [
                Constraint::Length(7),
                Constraint::Length(6),
                Constraint::Length(5),
                Constraint::Min(8),
            ],
        )
        .header(
            Row::new(["seq", "sym", "side", "fill"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        );
        frame.render_widget(table, area);
        Ok(())
    }
}

/// Exposure gauges per symbol.
#[derive(Debug, Clone)]
pub struct RiskMonitor {
    seed: u64,
    step: u64,
}

impl RiskMonitor {
    pub fn new(seed: u64) -> Self {
        Self { seed, step: 0 }
    }

    pub fn advance(&mut self) {
        self.step += 1;
    }

    /// Utilisation of the limit for the symbol at `index`, in percent.
    pub fn utilisation(&self, index: usize) -> u16 {
        (mix(self.seed.wrapping_add(index as u64), self.step / 4) % 101) as u16
    }
}

impl Renderable for RiskMonitor {
    fn render(
        &mut self,
        frame: &mut UiFrame<'_>,
        area: Rect,
        _ctx: &RenderContext,
    ) -> Result<(), ContentError> {
        for (index, symbol) in SYMBOLS.iter().enumerate().take(area.height as usize) {
            let percent = self.utilisation(index);
            let style = if percent >= 80 {
                Style::default().fg(theme::accent_alt())
            } else {
                Style::default().fg(theme::accent())
            };
            let row = Rect::new(area.x, area.y + index as u16, area.width, 1);
            frame.render_widget(
                Gauge::default()
                    .gauge_style(style)
                    .percent(percent)
                    .label(format!("{symbol} {percent}%")),
                row,
            );
        }
        Ok(())
    }
}

/// A price chart wired to a feed that drops after a while. Once the feed is
/// gone every render fails, which the desktop shows as a placeholder.
#[derive(Debug, Clone)]
pub struct FlakyChart {
    history: Vec<u64>,
    seed: u64,
    frames_left: u32,
}

impl FlakyChart {
    pub fn new(seed: u64, frames_before_failure: u32) -> Self {
        Self {
            history: Vec::new(),
            seed,
            frames_left: frames_before_failure,
        }
    }
}

impl Renderable for FlakyChart {
    fn render(
        &mut self,
        frame: &mut UiFrame<'_>,
        area: Rect,
        ctx: &RenderContext,
    ) -> Result<(), ContentError> {
        if self.frames_left == 0 {
            return Err(ContentError::failed("price feed disconnected"));
        }
        if !ctx.is_offscreen() {
            self.frames_left -= 1;
            let next = mix(self.seed, self.history.len() as u64) % 64;
            self.history.push(next);
        }
        let width = area.width as usize;
        let start = self.history.len().saturating_sub(width);
        frame.render_widget(
            Sparkline::default()
                .data(self.history[start..].iter().copied())
                .style(Style::default().fg(theme::accent())),
            area,
        );
        Ok(())
    }
}

/// Static help text.
#[derive(Debug, Clone, Copy, Default)]
pub struct About;

const ABOUT_TEXT: &str = indoc::indoc! {"
    desk-wm

    Drag a header to move a window, drag a border to resize it.
    Double-click a header to maximize or restore.
    [_] minimizes into the launcher at the bottom; hover there for a preview.

    Ctrl+N  new blotter
    Ctrl+W  close focused window
    Ctrl+D  minimize focused window
    Ctrl+R  retry a failed window
    Ctrl+Q  quit
"};

impl Renderable for About {
    fn render(
        &mut self,
        frame: &mut UiFrame<'_>,
        area: Rect,
        _ctx: &RenderContext,
    ) -> Result<(), ContentError> {
        let text = Text::from(ABOUT_TEXT.lines().map(Line::from).collect::<Vec<_>>());
        frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: false }), area);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::buffer::Buffer;

    fn draw(renderable: &mut dyn Renderable, area: Rect, ctx: RenderContext) -> Buffer {
        let mut buf = Buffer::empty(area);
        {
            let mut frame = UiFrame::from_parts(area, &mut buf);
            renderable.render(&mut frame, area, &ctx).unwrap();
        }
        buf
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf.cell((x, y)).unwrap().symbol().to_string())
            .collect()
    }

    #[test]
    fn blotter_lists_newest_fill_first() {
        let mut blotter = Blotter::new(7);
        for _ in 0..12 {
            blotter.advance();
        }
        let buf = draw(&mut blotter, Rect::new(0, 0, 40, 4), RenderContext::new(true));
        assert!(row_text(&buf, 0).starts_with("seq"));
        assert!(row_text(&buf, 1).starts_with("#00012"));
        assert!(row_text(&buf, 3).starts_with("#00010"));
    }

    #[test]
    fn blotter_is_deterministic() {
        let a = Blotter::new(3);
        let b = Blotter::new(3);
        assert_eq!(a.fill(5), b.fill(5));
    }

    #[test]
    fn risk_monitor_percentages_are_bounded() {
        let mut monitor = RiskMonitor::new(11);
        for _ in 0..40 {
            monitor.advance();
            for index in 0..SYMBOLS.len() {
                assert!(monitor.utilisation(index) <= 100);
            }
        }
    }

    #[test]
    fn flaky_chart_fails_after_budget_but_not_offscreen() {
        let mut chart = FlakyChart::new(1, 2);
        let area = Rect::new(0, 0, 10, 3);
        draw(&mut chart, area, RenderContext::offscreen());
        draw(&mut chart, area, RenderContext::new(false));
        draw(&mut chart, area, RenderContext::new(false));
        let mut buf = Buffer::empty(area);
        let mut frame = UiFrame::from_parts(area, &mut buf);
        let err = chart
            .render(&mut frame, area, &RenderContext::new(false))
            .unwrap_err();
        assert_eq!(err, ContentError::failed("price feed disconnected"));
    }

    #[test]
    fn about_starts_with_name() {
        let buf = draw(&mut About, Rect::new(0, 0, 30, 4), RenderContext::new(false));
        assert!(row_text(&buf, 0).starts_with("desk-wm"));
    }
}
