//! Core-only integration tests.
//!
//! These tests drive lintel-core through `Core::handle_event` WITHOUT any
//! backend. Every scenario uses one or two 400×300 clients with the stock
//! decoration, so a frame mapped at (100, 100) spans 408×332 with normal
//! borders: 4 px sides and bottom, a 28 px top with the titlebar at
//! y = 104..128.

use lintel_core::config::Config;
use lintel_core::cursor::CursorShape;
use lintel_core::decoration::BorderSize;
use lintel_core::event::{CoreAction, CoreEvent};
use lintel_core::geometry::{Geometry, Size};
use lintel_core::input::{AxisOrientation, BTN_LEFT};
use lintel_core::window::{InteractiveMode, StateFlag};
use lintel_core::{Core, WindowId};
use proptest::prelude::*;

/// Helper: create a core with default config.
fn test_core() -> Core {
    Core::new(Config::default())
}

/// Helper: core whose decorations have no visible side or bottom borders.
fn borderless_core() -> Core {
    let mut config = Config::default();
    config.decoration.border_size = BorderSize::None;
    Core::new(config)
}

/// Helper: map a decorated 400×300 client with its frame at `(x, 100)`.
fn map_window(core: &mut Core, x: i32) -> WindowId {
    let id = core.next_window_id();
    core.handle_event(CoreEvent::WindowMapped {
        id,
        title: format!("window {x}"),
        x,
        y: 100,
        client_size: Size::new(400, 300),
        decorated: true,
        no_border: false,
        min_client_size: None,
    });
    id
}

fn motion(core: &mut Core, x: f64, y: f64, time: u32) -> Vec<CoreAction> {
    core.handle_event(CoreEvent::PointerMotion { x, y, time })
}

fn button(core: &mut Core, pressed: bool, time: u32) -> Vec<CoreAction> {
    core.handle_event(CoreEvent::PointerButton {
        button: BTN_LEFT,
        pressed,
        time,
    })
}

fn count_started(actions: &[CoreAction]) -> usize {
    actions
        .iter()
        .filter(|a| matches!(a, CoreAction::OperationStarted { .. }))
        .count()
}

fn count_finished(actions: &[CoreAction]) -> usize {
    actions
        .iter()
        .filter(|a| matches!(a, CoreAction::OperationFinished { .. }))
        .count()
}

fn flag(core: &Core, id: WindowId, flag: StateFlag) -> bool {
    core.window(id).unwrap().has(flag)
}

// ── Test 1: titlebar drag moves the window ───────────────────────

#[test]
fn titlebar_drag_moves_by_pointer_delta() {
    let mut core = test_core();
    let id = map_window(&mut core, 100);

    let mut actions = motion(&mut core, 304.0, 116.0, 0);
    actions.extend(button(&mut core, true, 10));
    actions.extend(motion(&mut core, 334.0, 116.0, 20));
    actions.extend(button(&mut core, false, 30));

    assert_eq!(count_started(&actions), 1, "Expected one start, got: {actions:?}");
    assert_eq!(count_finished(&actions), 1);
    assert!(actions.contains(&CoreAction::OperationStarted {
        id,
        mode: InteractiveMode::Move,
    }));
    assert_eq!(core.window(id).unwrap().geometry(), Geometry::new(130, 100, 408, 332));
}

// ── Test 2: hover cursor shapes around the frame ─────────────────

#[test]
fn hovering_around_the_frame_sets_resize_cursors() {
    let mut core = test_core();
    map_window(&mut core, 100);

    let points = [
        (100.0, 266.0), // left edge midpoint
        (100.0, 100.0), // top-left corner
        (304.0, 100.0), // top edge
        (507.0, 100.0), // top-right corner
        (507.0, 266.0), // right edge midpoint
    ];
    let shapes: Vec<_> = points
        .iter()
        .zip(0..)
        .flat_map(|(&(x, y), time)| motion(&mut core, x, y, time))
        .filter_map(|a| match a {
            CoreAction::SetCursor { shape } => Some(shape),
            _ => None,
        })
        .collect();

    assert_eq!(
        shapes,
        vec![
            CursorShape::SizeHor,
            CursorShape::SizeFDiag,
            CursorShape::SizeVer,
            CursorShape::SizeBDiag,
            CursorShape::SizeHor,
        ]
    );
}

// ── Test 3: titlebar wheel steps through neutral ─────────────────

#[test]
fn titlebar_wheel_keeps_above_and_below_exclusive() {
    let mut core = test_core();
    let id = map_window(&mut core, 100);
    motion(&mut core, 304.0, 116.0, 0);

    let mut below = Vec::new();
    let mut above = Vec::new();
    for delta in [5.0, -5.0, -5.0] {
        core.handle_event(CoreEvent::PointerAxis {
            orientation: Default::default(),
            delta,
            time: 0,
        });
        below.push(flag(&core, id, StateFlag::KeepBelow));
        above.push(flag(&core, id, StateFlag::KeepAbove));
    }

    assert_eq!(below, vec![true, false, false]);
    assert_eq!(above, vec![false, false, true]);
}

// ── Test 4: double-click toggles on-all-desktops ─────────────────

#[test]
fn four_quick_clicks_restore_on_all_desktops() {
    let mut core = test_core();
    let id = map_window(&mut core, 100);
    motion(&mut core, 304.0, 116.0, 0);

    let mut seen = Vec::new();
    for time in [0, 100, 200, 300] {
        button(&mut core, true, time);
        button(&mut core, false, time + 20);
        seen.push(flag(&core, id, StateFlag::OnAllDesktops));
    }
    assert_eq!(seen, vec![false, true, true, false]);
}

#[test]
fn slow_clicks_do_not_double_click() {
    let mut core = test_core();
    let id = map_window(&mut core, 100);
    motion(&mut core, 304.0, 116.0, 0);

    button(&mut core, true, 0);
    button(&mut core, false, 10);
    button(&mut core, true, 600);
    button(&mut core, false, 610);
    assert!(!flag(&core, id, StateFlag::OnAllDesktops));
}

// ── Test 5: double-tap, two windows interleaved ──────────────────

#[test]
fn double_tap_is_tracked_per_window() {
    let mut core = test_core();
    let a = map_window(&mut core, 100);
    let b = map_window(&mut core, 700);

    let taps = [(0, 304.0, 0), (1, 904.0, 50), (0, 304.0, 100), (1, 904.0, 150)];
    for (id, x, time) in taps {
        core.handle_event(CoreEvent::TouchDown { id, x, y: 116.0, time });
        core.handle_event(CoreEvent::TouchUp { id, time: time + 10 });
    }

    assert!(flag(&core, a, StateFlag::OnAllDesktops));
    assert!(flag(&core, b, StateFlag::OnAllDesktops));
    assert!(core.touch().is_empty());
}

// ── Test 6: touch drag with an unrelated second contact ──────────

#[test]
fn second_contact_does_not_disturb_touch_move() {
    let mut core = test_core();
    let a = map_window(&mut core, 100);
    let b = map_window(&mut core, 700);

    core.handle_event(CoreEvent::TouchDown { id: 0, x: 304.0, y: 116.0, time: 0 });
    let started = core.handle_event(CoreEvent::TouchMotion { id: 0, x: 304.0, y: 156.0, time: 10 });
    assert_eq!(count_started(&started), 1);

    // Contact 1 lands in B's client area and wanders around.
    core.handle_event(CoreEvent::TouchDown { id: 1, x: 900.0, y: 300.0, time: 20 });
    let actions = core.handle_event(CoreEvent::TouchMotion { id: 1, x: 950.0, y: 350.0, time: 30 });
    assert!(actions.is_empty(), "Passive contact produced: {actions:?}");
    let actions = core.handle_event(CoreEvent::TouchUp { id: 1, time: 40 });
    assert!(actions.is_empty());

    core.handle_event(CoreEvent::TouchMotion { id: 0, x: 314.0, y: 166.0, time: 50 });
    let finished = core.handle_event(CoreEvent::TouchUp { id: 0, time: 60 });
    assert_eq!(finished, vec![CoreAction::OperationFinished { id: a }]);
    assert_eq!(core.window(a).unwrap().geometry(), Geometry::new(110, 150, 408, 332));
    assert_eq!(core.window(b).unwrap().geometry(), Geometry::new(700, 100, 408, 332));
}

// ── Test 7: borderless frame still resizes from outside ──────────

#[test]
fn borderless_press_outside_edge_resizes() {
    let mut core = borderless_core();
    let id = map_window(&mut core, 100);
    let window = core.window(id).unwrap();
    assert_eq!(window.geometry(), Geometry::new(100, 100, 400, 328));
    assert!(window.input_geometry().contains_rect(window.geometry()));
    assert_ne!(window.input_geometry(), window.geometry());

    // One pixel right of the visible edge (x = 100..=499).
    motion(&mut core, 500.0, 266.0, 0);
    button(&mut core, true, 1000);
    let actions = core.handle_event(CoreEvent::Tick { time: 1500 });
    assert!(
        actions.contains(&CoreAction::OperationStarted {
            id,
            mode: InteractiveMode::Resize(lintel_core::decoration::ResizeEdges::RIGHT),
        }),
        "Expected resize start, got: {actions:?}"
    );

    motion(&mut core, 520.0, 266.0, 1510);
    assert_eq!(core.window(id).unwrap().geometry().width, 420);
}

// ── Test 8: unmapping a window mid-operation ─────────────────────

#[test]
fn unmap_during_touch_resize_forces_finish() {
    let mut core = test_core();
    let id = map_window(&mut core, 100);

    // Bottom edge.
    core.handle_event(CoreEvent::TouchDown { id: 3, x: 304.0, y: 430.0, time: 0 });
    let actions = core.handle_event(CoreEvent::TouchMotion { id: 3, x: 304.0, y: 460.0, time: 10 });
    assert_eq!(count_started(&actions), 1);

    let actions = core.handle_event(CoreEvent::WindowUnmapped { id });
    assert_eq!(actions, vec![CoreAction::OperationFinished { id }]);
    assert!(core.touch().is_empty());

    // Late events for the dead contact are dropped.
    assert!(core
        .handle_event(CoreEvent::TouchMotion { id: 3, x: 0.0, y: 0.0, time: 20 })
        .is_empty());
    assert!(core.handle_event(CoreEvent::TouchUp { id: 3, time: 30 }).is_empty());
    assert_eq!(core.validate_invariants(), Ok(()));
}

// ── Test 9: reconfiguration during a resize ──────────────────────

#[test]
fn border_change_waits_for_the_gesture() {
    let mut core = test_core();
    let id = map_window(&mut core, 100);

    motion(&mut core, 505.0, 266.0, 0);
    button(&mut core, true, 10);
    motion(&mut core, 525.0, 266.0, 20);
    assert_eq!(core.window(id).unwrap().geometry().width, 428);

    let mut config = Config::default();
    config.decoration.border_size = BorderSize::None;
    let actions = core.handle_event(CoreEvent::Reconfigure {
        config: Box::new(config),
    });
    assert!(actions.is_empty(), "Reconfigure leaked into the gesture: {actions:?}");
    assert!(core.window(id).unwrap().has_pending_settings());

    motion(&mut core, 535.0, 266.0, 30);
    assert_eq!(core.window(id).unwrap().geometry(), Geometry::new(100, 100, 438, 332));

    let actions = button(&mut core, false, 40);
    assert_eq!(
        actions,
        vec![
            CoreAction::OperationFinished { id },
            CoreAction::SetWindowGeometry {
                id,
                x: 100,
                y: 100,
                w: 430,
                h: 328,
            },
        ]
    );
    assert!(!core.window(id).unwrap().has_pending_settings());
}

// ── Test 10: resize clamps to the minimum size ───────────────────

#[test]
fn resize_clamps_at_minimum() {
    let mut core = test_core();
    let id = core.next_window_id();
    core.handle_event(CoreEvent::WindowMapped {
        id,
        title: String::new(),
        x: 100,
        y: 100,
        client_size: Size::new(400, 300),
        decorated: true,
        no_border: false,
        min_client_size: Some(Size::new(200, 150)),
    });

    motion(&mut core, 100.0, 266.0, 0);
    button(&mut core, true, 10);
    motion(&mut core, 1000.0, 266.0, 20);
    let g = core.window(id).unwrap().geometry();
    assert_eq!(g, Geometry::new(300, 100, 208, 332));
    assert_eq!(g.right(), 508, "opposite edge must stay put");
    button(&mut core, false, 30);
}

// ── Test 11: start/finish pairing ────────────────────────────────

#[test]
fn each_drag_starts_and_finishes_exactly_once() {
    let mut core = test_core();
    let mut id = map_window(&mut core, 100);

    for round in 0..3u32 {
        let t = round * 1000;
        let mut actions = motion(&mut core, 304.0, 116.0, t);
        actions.extend(button(&mut core, true, t + 10));
        for step in 1..=10 {
            actions.extend(motion(&mut core, 304.0 + f64::from(step) * 5.0, 116.0, t + 10 + step));
        }
        assert_eq!(count_started(&actions), 1, "round {round}");
        assert_eq!(count_finished(&actions), 0, "round {round}");

        let actions = button(&mut core, false, t + 100);
        assert_eq!(count_finished(&actions), 1, "round {round}");
        // Start over from the same spot.
        core.handle_event(CoreEvent::WindowUnmapped { id });
        id = map_window(&mut core, 100);
    }
}

// ── Test 12: titlebar button click ───────────────────────────────

#[test]
fn close_button_requests_close() {
    let mut core = test_core();
    let id = map_window(&mut core, 100);

    motion(&mut core, 492.0, 116.0, 0);
    button(&mut core, true, 10);
    let actions = button(&mut core, false, 20);
    assert!(actions.contains(&CoreAction::RequestClose { id }));
    assert_eq!(count_started(&actions), 0);
}

// ── Test 13: windows changing under a resting pointer ────────────

#[test]
fn touch_minimize_clears_pointer_hover() {
    let mut core = test_core();
    let id = map_window(&mut core, 100);
    motion(&mut core, 304.0, 116.0, 0);
    assert_eq!(core.cursor().shape(), CursorShape::Arrow);

    // Tap the minimize button (global x = 432..456).
    core.handle_event(CoreEvent::TouchDown { id: 0, x: 444.0, y: 116.0, time: 10 });
    core.handle_event(CoreEvent::TouchUp { id: 0, time: 20 });
    assert!(flag(&core, id, StateFlag::Minimized));

    core.handle_event(CoreEvent::PointerAxis {
        orientation: AxisOrientation::Vertical,
        delta: 5.0,
        time: 30,
    });
    assert!(!flag(&core, id, StateFlag::KeepBelow));

    button(&mut core, true, 40);
    let actions = motion(&mut core, 340.0, 116.0, 50);
    assert_eq!(count_started(&actions), 0, "Minimized window moved: {actions:?}");
    button(&mut core, false, 60);
    assert_eq!(core.window(id).unwrap().geometry(), Geometry::new(100, 100, 408, 332));
}

#[test]
fn touch_move_away_clears_pointer_hover() {
    let mut core = test_core();
    let id = map_window(&mut core, 100);
    // Left border, so the pointer sees a resize cursor.
    motion(&mut core, 101.0, 266.0, 0);
    assert_eq!(core.cursor().shape(), CursorShape::SizeHor);

    core.handle_event(CoreEvent::TouchDown { id: 0, x: 304.0, y: 116.0, time: 10 });
    core.handle_event(CoreEvent::TouchMotion { id: 0, x: 304.0, y: 416.0, time: 20 });
    let actions = core.handle_event(CoreEvent::TouchUp { id: 0, time: 30 });
    assert!(actions.contains(&CoreAction::OperationFinished { id }));
    assert_eq!(core.window(id).unwrap().geometry(), Geometry::new(100, 400, 408, 332));
    // The frame left the pointer behind.
    assert_eq!(core.cursor().shape(), CursorShape::Arrow);

    motion(&mut core, 304.0, 116.0, 40);
    core.handle_event(CoreEvent::PointerAxis {
        orientation: AxisOrientation::Vertical,
        delta: 5.0,
        time: 50,
    });
    assert!(!flag(&core, id, StateFlag::KeepBelow));
}

#[test]
fn press_during_touch_move_does_not_restack() {
    let mut core = test_core();
    let a = map_window(&mut core, 100);
    let b = map_window(&mut core, 700);

    core.handle_event(CoreEvent::TouchDown { id: 0, x: 304.0, y: 116.0, time: 0 });
    let started = core.handle_event(CoreEvent::TouchMotion { id: 0, x: 304.0, y: 136.0, time: 10 });
    assert_eq!(count_started(&started), 1);
    core.handle_event(CoreEvent::ActivateRequested { id: b });
    assert_eq!(core.windows().stacking_order(), &[a, b]);

    // A's titlebar now spans y = 124..148.
    motion(&mut core, 250.0, 136.0, 20);
    let actions = button(&mut core, true, 30);
    assert!(
        !actions.iter().any(|a| matches!(a, CoreAction::StackingChanged { .. })),
        "Busy window restacked: {actions:?}"
    );
    assert_eq!(core.windows().stacking_order(), &[a, b]);
    button(&mut core, false, 40);
    core.handle_event(CoreEvent::TouchUp { id: 0, time: 50 });
}

// ── Properties ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn input_margin_never_resolves_to_client(side in 0u8..3, along in 0i32..336, depth in 0i32..8) {
        let mut core = borderless_core();
        let id = map_window(&mut core, 100);
        let window = core.window(id).unwrap();
        let (frame, input) = (window.geometry(), window.input_geometry());
        // Input margins: 8 px left of x = 100, right of x = 499, below y = 427.
        let (x, y) = match side {
            0 => (92 + depth, 100 + along),
            1 => (500 + depth, 100 + along),
            _ => (92 + along, 428 + depth),
        };
        prop_assert!(input.contains(x, y) && !frame.contains(x, y));

        let point = lintel_core::Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
        prop_assert!(window.section_at(point).is_decoration());
    }

    #[test]
    fn input_geometry_contains_frame_for_every_border_size(size in 0usize..9) {
        let sizes = [
            BorderSize::None,
            BorderSize::NoSides,
            BorderSize::Tiny,
            BorderSize::Normal,
            BorderSize::Large,
            BorderSize::VeryLarge,
            BorderSize::Huge,
            BorderSize::VeryHuge,
            BorderSize::Oversized,
        ];
        let mut core = test_core();
        let id = map_window(&mut core, 100);
        let mut config = Config::default();
        config.decoration.border_size = sizes[size];
        core.handle_event(CoreEvent::Reconfigure { config: Box::new(config) });

        let window = core.window(id).unwrap();
        prop_assert!(window.input_geometry().contains_rect(window.geometry()));
    }
}
