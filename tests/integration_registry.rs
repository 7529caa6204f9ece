use desk_wm::content::{ContentError, RenderContext, Renderable, content};
use desk_wm::launcher;
use desk_wm::ui::UiFrame;
use desk_wm::window::{
    Geometry, GeometryPatch, WindowId, WindowMode, WindowRegistry, WindowSpec,
};
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

fn spec(title: &str) -> WindowSpec {
    WindowSpec::new(title, content(Blank))
}

fn registry() -> WindowRegistry {
    let mut registry = WindowRegistry::new();
    registry.set_viewport(Geometry::new(0, 0, 1280, 720));
    registry
}

#[test]
fn size_tracks_adds_minus_effective_closes() {
    let mut registry = registry();
    let mut live: Vec<WindowId> = Vec::new();
    let mut expected = 0usize;
    // Deterministic interleaving of opens, closes and repeated closes.
    for round in 0..40u32 {
        if round % 3 == 2 && !live.is_empty() {
            let id = live.remove((round as usize) % live.len());
            assert!(registry.close_window(id));
            expected -= 1;
            assert!(!registry.close_window(id));
        } else {
            live.push(registry.add_window(spec(&format!("w{round}"))));
            expected += 1;
        }
        assert_eq!(registry.len(), expected);
    }
}

#[test]
fn focus_puts_window_strictly_on_top() {
    let mut registry = registry();
    let ids: Vec<_> = (0..5).map(|i| registry.add_window(spec(&format!("{i}")))).collect();
    for &id in ids.iter().rev() {
        registry.focus_window(id);
        let z = registry.window(id).unwrap().z_index();
        for other in ids.iter().filter(|other| **other != id) {
            assert!(z > registry.window(*other).unwrap().z_index());
        }
        assert_eq!(registry.focused_id(), Some(id));
    }
}

#[test]
fn double_toggle_maximize_round_trips_geometry() {
    let mut registry = registry();
    let original = Geometry::new(-40, 90, 333, 211);
    let id = registry.add_window(spec("W").geometry(original));
    registry.toggle_maximize(id);
    assert_eq!(registry.window(id).unwrap().geometry(), Geometry::new(0, 0, 1280, 720));
    registry.toggle_maximize(id);
    let window = registry.window(id).unwrap();
    assert_eq!(window.geometry(), original);
    assert_eq!(window.pre_maximize_geometry(), None);
}

#[test]
fn minimize_restore_returns_to_prior_mode() {
    let mut registry = registry();
    let normal = registry.add_window(spec("Normal"));
    let maximized = registry.add_window(spec("Max"));
    registry.toggle_maximize(maximized);

    for (id, mode) in [(normal, WindowMode::Normal), (maximized, WindowMode::Maximized)] {
        registry.minimize_window(id);
        assert_eq!(registry.window(id).unwrap().mode(), WindowMode::Minimized);
        registry.restore_window(id);
        let window = registry.window(id).unwrap();
        assert!(!window.is_minimized());
        assert_eq!(window.mode(), mode);
    }
}

#[test]
fn scenario_focus_close_minimize() {
    let mut registry = registry();
    let a = registry.add_window(spec("A"));
    let b = registry.add_window(spec("B"));
    registry.focus_window(a);
    assert!(registry.window(a).unwrap().z_index() > registry.window(b).unwrap().z_index());

    registry.close_window(b);
    assert_eq!(registry.ids(), vec![a]);

    registry.minimize_window(a);
    assert!(registry.window(a).unwrap().is_minimized());
    assert!(registry.render_order().is_empty());
    let listed: Vec<_> = launcher::entries(&registry).iter().map(|e| e.id).collect();
    assert_eq!(listed, vec![a]);
    assert_eq!(registry.focused_id(), None);
}

#[test]
fn second_close_leaves_everything_else_alone() {
    let mut registry = registry();
    let a = registry.add_window(spec("A"));
    let b = registry.add_window(spec("B"));
    let before = registry.window(b).unwrap().record();
    let revision = registry.revision_of(b);
    assert!(registry.close_window(a));
    assert!(!registry.close_window(a));
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.window(b).unwrap().record(), before);
    assert_eq!(registry.revision_of(b), revision);
}

#[test]
fn unknown_ids_degrade_to_no_ops() {
    let mut registry = registry();
    let id = registry.add_window(spec("A"));
    registry.close_window(id);
    assert!(!registry.focus_window(id));
    assert!(!registry.update_window(id, GeometryPatch::position(1, 1)));
    assert!(!registry.minimize_window(id));
    assert!(!registry.restore_window(id));
    assert!(!registry.toggle_maximize(id));
    assert!(registry.is_empty());
}

#[test]
fn records_replay_into_an_equivalent_layout() {
    let mut registry = registry();
    let a = registry.add_window(spec("A").geometry(Geometry::new(10, 20, 300, 200)));
    let b = registry.add_window(spec("B"));
    registry.toggle_maximize(b);
    registry.minimize_window(a);

    let mut replayed = self::registry();
    for record in registry.records() {
        replayed.restore_record(&record, content(Blank));
    }
    let titles = |r: &WindowRegistry| {
        r.records()
            .into_iter()
            .map(|rec| (rec.title, rec.geometry, rec.is_minimized, rec.is_maximized))
            .collect::<Vec<_>>()
    };
    assert_eq!(titles(&replayed), titles(&registry));
}
