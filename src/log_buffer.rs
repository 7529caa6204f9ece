//! In-memory log sink.
//!
//! While the desktop owns the terminal, tracing output and panic reports go
//! into a bounded line buffer instead of stderr. [`LogView`] renders the tail
//! of that buffer as ordinary window content.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Text};
use ratatui::widgets::Paragraph;

use crate::content::{ContentError, RenderContext, Renderable};
use crate::theme;
use crate::ui::UiFrame;

pub const DEFAULT_MAX_LINES: usize = 2000;
static GLOBAL_LOG: OnceLock<LogHandle> = OnceLock::new();
static PANIC_HOOK_INSTALLED: OnceLock<()> = OnceLock::new();
static PANIC_PENDING: AtomicBool = AtomicBool::new(false);

pub fn set_global_log(handle: LogHandle) -> bool {
    GLOBAL_LOG.set(handle).is_ok()
}

pub fn global_log() -> Option<LogHandle> {
    GLOBAL_LOG.get().cloned()
}

/// Route panic reports into the global log. The previous hook only runs when
/// no log is installed, so a panicking window cannot scribble over the
/// terminal.
pub fn install_panic_hook() {
    if PANIC_HOOK_INSTALLED.get().is_some() {
        return;
    }
    let _ = PANIC_HOOK_INSTALLED.set(());
    let prev = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        PANIC_PENDING.store(true, Ordering::SeqCst);
        let Some(handle) = GLOBAL_LOG.get() else {
            prev(info);
            return;
        };
        handle.push("=== PANIC ===");
        if let Some(location) = info.location() {
            handle.push(format!(
                "{}:{}:{}",
                location.file(),
                location.line(),
                location.column()
            ));
        }
        let message = crate::content::panic_message(info.payload());
        handle.push(format!("message: {message}"));
        handle.push("============");
    }));
}

pub fn take_panic_pending() -> bool {
    PANIC_PENDING.swap(false, Ordering::SeqCst)
}

#[derive(Debug)]
struct LineBuffer {
    lines: VecDeque<String>,
    max_lines: usize,
}

impl LineBuffer {
    fn new(max_lines: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            max_lines: max_lines.max(1),
        }
    }

    fn push_line(&mut self, line: String) {
        self.lines.push_back(line);
        while self.lines.len() > self.max_lines {
            self.lines.pop_front();
        }
    }
}

#[derive(Clone, Debug)]
pub struct LogHandle {
    inner: Arc<Mutex<LineBuffer>>,
}

impl Default for LogHandle {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINES)
    }
}

impl LogHandle {
    pub fn new(max_lines: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(LineBuffer::new(max_lines))),
        }
    }

    pub fn push(&self, line: impl Into<String>) {
        if let Ok(mut buffer) = self.inner.lock() {
            buffer.push_line(line.into());
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|buffer| buffer.lines.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The last `count` lines, oldest first.
    pub fn tail(&self, count: usize) -> Vec<String> {
        let Ok(buffer) = self.inner.lock() else {
            return Vec::new();
        };
        let skip = buffer.lines.len().saturating_sub(count);
        buffer.lines.iter().skip(skip).cloned().collect()
    }

    pub fn writer(&self) -> LogWriter {
        LogWriter::new(self.clone())
    }
}

/// Line-buffered `io::Write` adapter feeding a [`LogHandle`].
#[derive(Debug)]
pub struct LogWriter {
    handle: LogHandle,
    pending: Vec<u8>,
}

impl LogWriter {
    pub fn new(handle: LogHandle) -> Self {
        Self {
            handle,
            pending: Vec::new(),
        }
    }

    fn flush_pending(&mut self, force: bool) {
        if self.pending.is_empty() {
            return;
        }
        let end = if force {
            self.pending.len()
        } else {
            match self.pending.iter().rposition(|b| *b == b'\n') {
                Some(pos) => pos + 1,
                None => return,
            }
        };
        let drained: Vec<u8> = self.pending.drain(..end).collect();
        let text = String::from_utf8_lossy(&drained);
        for line in text.split('\n') {
            if !line.is_empty() {
                self.handle.push(line.to_string());
            }
        }
    }
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        self.flush_pending(false);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_pending(true);
        Ok(())
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        self.flush_pending(true);
    }
}

/// Window content showing the newest log lines, bottom-aligned.
#[derive(Debug, Clone)]
pub struct LogView {
    handle: LogHandle,
}

impl LogView {
    pub fn new(handle: LogHandle) -> Self {
        Self { handle }
    }
}

impl Renderable for LogView {
    fn render(
        &mut self,
        frame: &mut UiFrame<'_>,
        area: Rect,
        ctx: &RenderContext,
    ) -> Result<(), ContentError> {
        if area.width == 0 || area.height == 0 {
            return Ok(());
        }
        let lines = self.handle.tail(area.height as usize);
        let newest = lines.len().saturating_sub(1);
        let text = Text::from(
            lines
                .into_iter()
                .enumerate()
                .map(|(idx, line)| {
                    if idx == newest && ctx.focused() {
                        Line::styled(line, Style::default().fg(theme::log_highlight()))
                    } else {
                        Line::from(line)
                    }
                })
                .collect::<Vec<_>>(),
        );
        frame.render_widget(Paragraph::new(text), area);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::buffer::Buffer;

    #[test]
    fn handle_caps_line_count() {
        let handle = LogHandle::new(3);
        for line in ["one", "two", "three", "four"] {
            handle.push(line);
        }
        assert_eq!(handle.len(), 3);
        assert_eq!(handle.tail(1), vec!["four".to_string()]);
        assert_eq!(handle.tail(10)[0], "two");
    }

    #[test]
    fn writer_flushes_complete_lines_and_forced_partials() {
        let handle = LogHandle::new(10);
        let mut writer = handle.writer();
        let _ = writer.write(b"first line\nsecond line\npartial");
        assert_eq!(handle.len(), 2);
        writer.flush().unwrap();
        assert_eq!(
            handle.tail(3),
            vec![
                "first line".to_string(),
                "second line".to_string(),
                "partial".to_string()
            ]
        );
    }

    #[test]
    fn log_view_shows_newest_lines() {
        let handle = LogHandle::new(50);
        for i in 0..20 {
            handle.push(format!("line{i}"));
        }
        let mut view = LogView::new(handle);
        let area = Rect::new(0, 0, 10, 3);
        let mut buf = Buffer::empty(area);
        {
            let mut frame = UiFrame::from_parts(area, &mut buf);
            view.render(&mut frame, area, &RenderContext::new(false))
                .unwrap();
        }
        assert_eq!(buf.cell((0u16, 0u16)).unwrap().symbol(), "l");
        assert_eq!(buf.cell((5u16, 2u16)).unwrap().symbol(), "9");
    }
}
