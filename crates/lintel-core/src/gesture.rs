//! Double-click / double-tap recognition and press arming.

use std::collections::HashMap;

use tracing::trace;

use crate::config::InputConfig;
use crate::decoration::{DecorationButton, Section};
use crate::geometry::Point;
use crate::input::elapsed_ms;
use crate::window::WindowId;

/// Outcome of registering a press with a [`ClickTracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Click {
    /// Starts a new potential double-click.
    First,
    /// Completes a double-click. The tracker is reset, so the next press
    /// is a [`Click::First`] again.
    Double,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ClickRecord {
    time: u32,
    position: Point,
}

/// Last qualifying click per window.
///
/// Keyed by window so presses on one window never disturb the gesture in
/// progress on another.
#[derive(Debug, Default)]
pub struct ClickTracker {
    records: HashMap<WindowId, ClickRecord>,
}

impl ClickTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, window: WindowId, position: Point, time: u32, input: &InputConfig) -> Click {
        if let Some(last) = self.records.remove(&window) {
            let interval = elapsed_ms(last.time, time);
            let distance = last.position.manhattan_distance(position);
            if interval <= input.double_click_interval_ms
                && distance <= f64::from(input.double_click_distance)
            {
                trace!("double click on {} after {}ms", window, interval);
                return Click::Double;
            }
            trace!("click on {} expired after {}ms, {:.0}px", window, interval, distance);
        }
        self.records.insert(window, ClickRecord { time, position });
        Click::First
    }

    /// Forget a pending first click.
    pub fn invalidate(&mut self, window: WindowId) {
        self.records.remove(&window);
    }

    pub fn is_pending(&self, window: WindowId) -> bool {
        self.records.contains_key(&window)
    }
}

/// What a press on a decoration is allowed to turn into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressTarget {
    /// May become a move or resize once the drag threshold is crossed.
    Drag,
    /// Accepted by a titlebar button; fires on release over the same button.
    Button(DecorationButton),
    /// Consumed (double-click, or the window is busy). Release is a no-op.
    Inert,
}

/// A press on a decoration waiting for its release or for the drag
/// threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmedPress {
    pub window: WindowId,
    pub section: Section,
    pub origin: Point,
    pub time: u32,
    pub target: PressTarget,
}

impl ArmedPress {
    /// Whether the press at `origin` should start an operation now, with
    /// the pointer at `pos` at `time`.
    pub fn crosses_threshold(&self, pos: Point, time: u32, input: &InputConfig) -> bool {
        if self.target != PressTarget::Drag {
            return false;
        }
        self.origin.manhattan_distance(pos) >= f64::from(input.drag_start_distance)
            || elapsed_ms(self.time, time) >= input.drag_start_time_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: WindowId = WindowId(1);
    const B: WindowId = WindowId(2);

    fn at(x: f64) -> Point {
        Point::new(x, 10.0)
    }

    #[test]
    fn four_quick_clicks_are_two_doubles() {
        let cfg = InputConfig::default();
        let mut t = ClickTracker::new();
        let kinds: Vec<_> = [0, 100, 200, 300]
            .into_iter()
            .map(|time| t.press(A, at(0.0), time, &cfg))
            .collect();
        assert_eq!(kinds, vec![Click::First, Click::Double, Click::First, Click::Double]);
    }

    #[test]
    fn slow_second_click_starts_over() {
        let cfg = InputConfig::default();
        let mut t = ClickTracker::new();
        assert_eq!(t.press(A, at(0.0), 0, &cfg), Click::First);
        assert_eq!(t.press(A, at(0.0), 501, &cfg), Click::First);
        assert_eq!(t.press(A, at(0.0), 600, &cfg), Click::Double);
    }

    #[test]
    fn distant_second_click_starts_over() {
        let cfg = InputConfig::default();
        let mut t = ClickTracker::new();
        t.press(A, at(0.0), 0, &cfg);
        assert_eq!(t.press(A, at(20.0), 50, &cfg), Click::First);
    }

    #[test]
    fn windows_do_not_interfere() {
        let cfg = InputConfig::default();
        let mut t = ClickTracker::new();
        t.press(A, at(0.0), 0, &cfg);
        t.press(B, at(300.0), 10, &cfg);
        assert_eq!(t.press(A, at(0.0), 20, &cfg), Click::Double);
        assert_eq!(t.press(B, at(300.0), 30, &cfg), Click::Double);
    }

    #[test]
    fn invalidate_drops_first_click() {
        let cfg = InputConfig::default();
        let mut t = ClickTracker::new();
        t.press(A, at(0.0), 0, &cfg);
        assert!(t.is_pending(A));
        t.invalidate(A);
        assert_eq!(t.press(A, at(0.0), 10, &cfg), Click::First);
    }

    #[test]
    fn clock_wrap_is_handled() {
        let cfg = InputConfig::default();
        let mut t = ClickTracker::new();
        t.press(A, at(0.0), u32::MAX - 50, &cfg);
        assert_eq!(t.press(A, at(0.0), 50, &cfg), Click::Double);
    }

    #[test]
    fn drag_threshold_by_distance_or_time() {
        let cfg = InputConfig::default();
        let press = ArmedPress {
            window: A,
            section: Section::TitleBar,
            origin: Point::new(0.0, 0.0),
            time: 1000,
            target: PressTarget::Drag,
        };
        assert!(!press.crosses_threshold(Point::new(4.0, 5.0), 1100, &cfg));
        assert!(press.crosses_threshold(Point::new(5.0, 5.0), 1100, &cfg));
        assert!(press.crosses_threshold(Point::new(0.0, 0.0), 1500, &cfg));

        let inert = ArmedPress {
            target: PressTarget::Inert,
            ..press
        };
        assert!(!inert.crosses_threshold(Point::new(50.0, 0.0), 5000, &cfg));
    }
}
