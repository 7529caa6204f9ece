use std::io;
use std::time::{Duration, Instant};

use crossterm::event::Event;

use crate::drivers::InputDriver;

pub enum ControlFlow {
    Continue,
    Quit,
}

/// What the loop hands to its handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopEvent {
    Input(Event),
    /// Fired once per tick interval, and whenever input goes quiet. Drives
    /// redraws, snapshot timers and result delivery.
    Tick(Instant),
}

/// The single UI thread loop.
///
/// It is the only place that polls the input driver. Input bursts (mouse
/// drags in particular) are drained completely before the next tick so the
/// desktop never falls behind the pointer.
pub struct EventLoop<D> {
    driver: D,
    tick_interval: Duration,
}

impl<D: InputDriver> EventLoop<D> {
    pub fn new(driver: D, tick_interval: Duration) -> Self {
        Self {
            driver,
            tick_interval,
        }
    }

    pub fn run<F>(&mut self, mut handler: F) -> io::Result<()>
    where
        F: FnMut(&mut D, LoopEvent) -> io::Result<ControlFlow>,
    {
        loop {
            let started = Instant::now();
            if let ControlFlow::Quit = handler(&mut self.driver, LoopEvent::Tick(started))? {
                return Ok(());
            }

            if self.driver.poll(self.tick_interval)? {
                loop {
                    let event = self.driver.read()?;
                    if let ControlFlow::Quit = handler(&mut self.driver, LoopEvent::Input(event))? {
                        return Ok(());
                    }
                    if started.elapsed() >= self.tick_interval
                        || !self.driver.poll(Duration::from_millis(0))?
                    {
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::collections::VecDeque;

    struct Scripted {
        events: VecDeque<Event>,
    }

    impl InputDriver for Scripted {
        fn poll(&mut self, _timeout: Duration) -> io::Result<bool> {
            Ok(!self.events.is_empty())
        }

        fn read(&mut self) -> io::Result<Event> {
            self.events
                .pop_front()
                .ok_or_else(|| io::Error::other("script exhausted"))
        }
    }

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    #[test]
    fn ticks_then_drains_input_until_quit() {
        let driver = Scripted {
            events: VecDeque::from(vec![key('a'), key('b'), key('q')]),
        };
        let mut event_loop = EventLoop::new(driver, Duration::from_secs(1));
        let mut seen = Vec::new();
        event_loop
            .run(|_, event| {
                let flow = match &event {
                    LoopEvent::Input(Event::Key(k)) if k.code == KeyCode::Char('q') => {
                        ControlFlow::Quit
                    }
                    _ => ControlFlow::Continue,
                };
                seen.push(match event {
                    LoopEvent::Tick(_) => "tick".to_string(),
                    LoopEvent::Input(Event::Key(KeyEvent {
                        code: KeyCode::Char(c),
                        ..
                    })) => c.to_string(),
                    LoopEvent::Input(_) => "other".to_string(),
                });
                Ok(flow)
            })
            .unwrap();
        assert_eq!(seen, vec!["tick", "a", "b", "q"]);
    }

    #[test]
    fn quit_on_tick_stops_immediately() {
        let driver = Scripted {
            events: VecDeque::from(vec![key('a')]),
        };
        let mut event_loop = EventLoop::new(driver, Duration::from_millis(10));
        let mut calls = 0;
        event_loop
            .run(|_, _| {
                calls += 1;
                Ok(ControlFlow::Quit)
            })
            .unwrap();
        assert_eq!(calls, 1);
        assert_eq!(event_loop.driver.events.len(), 1);
    }
}
