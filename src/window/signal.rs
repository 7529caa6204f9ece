use super::{WindowId, WindowRegistry};

/// What changed for one window since the last [`WindowSignal::take_change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowChange {
    pub entity_changed: bool,
    pub focus_changed: bool,
    pub closed: bool,
}

/// Per-window observation of the registry.
///
/// A subscriber only learns about changes to the window it watches (its own
/// revision, or its focus flag flipping), so unrelated mutations never make
/// it redraw.
#[derive(Debug, Clone)]
pub struct WindowSignal {
    id: WindowId,
    seen_revision: Option<u64>,
    seen_focused: bool,
    closed: bool,
}

impl WindowSignal {
    pub fn new(id: WindowId) -> Self {
        Self {
            id,
            seen_revision: None,
            seen_focused: false,
            closed: false,
        }
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn take_change(&mut self, registry: &WindowRegistry) -> Option<WindowChange> {
        if self.closed {
            return None;
        }
        let Some(revision) = registry.revision_of(self.id) else {
            self.closed = true;
            return Some(WindowChange {
                closed: true,
                ..WindowChange::default()
            });
        };
        let focused = registry.is_focused(self.id);
        let change = WindowChange {
            entity_changed: self.seen_revision != Some(revision),
            focus_changed: self.seen_revision.is_some() && self.seen_focused != focused,
            closed: false,
        };
        self.seen_revision = Some(revision);
        self.seen_focused = focused;
        (change.entity_changed || change.focus_changed).then_some(change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Content, ContentError, RenderContext, Renderable, content};
    use crate::ui::UiFrame;
    use crate::window::{GeometryPatch, WindowSpec};
    use ratatui::layout::Rect;

    struct Blank;

    impl Renderable for Blank {
        fn render(
            &mut self,
            _frame: &mut UiFrame<'_>,
            _area: Rect,
            _ctx: &RenderContext,
        ) -> Result<(), ContentError> {
            Ok(())
        }
    }

    fn blank() -> Content {
        content(Blank)
    }

    #[test]
    fn first_observation_reports_entity() {
        let mut reg = WindowRegistry::new();
        let a = reg.add_window(WindowSpec::new("A", blank()));
        let mut sig = WindowSignal::new(a);
        let change = sig.take_change(&reg).unwrap();
        assert!(change.entity_changed);
        assert!(sig.take_change(&reg).is_none());
    }

    #[test]
    fn unrelated_mutation_is_silent() {
        let mut reg = WindowRegistry::new();
        let a = reg.add_window(WindowSpec::new("A", blank()));
        let b = reg.add_window(WindowSpec::new("B", blank()));
        reg.focus_window(a);
        let mut sig_b = WindowSignal::new(b);
        sig_b.take_change(&reg);
        reg.update_window(a, GeometryPatch::position(9, 9));
        assert!(sig_b.take_change(&reg).is_none());
    }

    #[test]
    fn focus_loss_is_reported_without_entity_change() {
        let mut reg = WindowRegistry::new();
        let a = reg.add_window(WindowSpec::new("A", blank()));
        let b = reg.add_window(WindowSpec::new("B", blank()));
        let mut sig_b = WindowSignal::new(b);
        sig_b.take_change(&reg);
        reg.focus_window(a);
        let change = sig_b.take_change(&reg).unwrap();
        assert!(change.focus_changed);
        assert!(!change.entity_changed);
    }

    #[test]
    fn close_reported_once() {
        let mut reg = WindowRegistry::new();
        let a = reg.add_window(WindowSpec::new("A", blank()));
        let mut sig = WindowSignal::new(a);
        sig.take_change(&reg);
        reg.close_window(a);
        assert!(sig.take_change(&reg).unwrap().closed);
        assert!(sig.take_change(&reg).is_none());
    }
}
