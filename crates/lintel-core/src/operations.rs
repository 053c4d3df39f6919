//! Window operations triggered from the decoration: double-click actions,
//! titlebar button clicks, per-button titlebar commands and the wheel.

use tracing::debug;

use crate::config::{TitlebarCommand, WheelAction, WindowOperation};
use crate::context::InputContext;
use crate::decoration::DecorationButton;
use crate::event::CoreAction;
use crate::geometry::Point;
use crate::window::{StateFlag, Window, WindowId};

impl InputContext<'_> {
    /// Mutate a window's state and report every flag, geometry and stacking
    /// change that resulted.
    fn change_state(&mut self, id: WindowId, change: impl FnOnce(&mut Window, crate::geometry::Geometry)) {
        let work_area = self.work_area;
        let Some(window) = self.windows.get_mut(id) else {
            return;
        };
        let (state, layer, geometry) = (window.state, window.layer(), window.geometry());
        change(window, work_area);
        let (new_state, new_layer, new_geometry) = (window.state, window.layer(), window.geometry());

        for flag in StateFlag::ALL {
            let before = state.contains(flag.bits());
            let after = new_state.contains(flag.bits());
            if before != after {
                self.actions.push(CoreAction::WindowStateChanged {
                    id,
                    flag,
                    enabled: after,
                });
            }
        }
        if new_geometry != geometry {
            self.actions.push(CoreAction::geometry(id, new_geometry));
        }
        if new_layer != layer && self.windows.restack(id) {
            self.push_stacking();
        }
    }

    fn push_stacking(&mut self) {
        self.actions.push(CoreAction::StackingChanged {
            order: self.windows.stacking_order().to_vec(),
        });
    }

    /// Run a configurable window operation.
    pub fn perform(&mut self, id: WindowId, operation: WindowOperation) {
        debug!("{:?} on {}", operation, id);
        match operation {
            WindowOperation::OnAllDesktops => self.change_state(id, |w, _| w.toggle(StateFlag::OnAllDesktops)),
            WindowOperation::Maximize => self.change_state(id, |w, area| {
                let maximize = !w.has(StateFlag::Maximized);
                w.set_maximized(maximize, area);
            }),
            WindowOperation::Minimize => {
                self.change_state(id, |w, _| w.state.insert(StateFlag::Minimized.bits()));
            }
            WindowOperation::Shade => self.change_state(id, |w, _| w.toggle(StateFlag::Shaded)),
            WindowOperation::KeepAbove => self.change_state(id, |w, _| w.toggle(StateFlag::KeepAbove)),
            WindowOperation::KeepBelow => self.change_state(id, |w, _| w.toggle(StateFlag::KeepBelow)),
            WindowOperation::Close => self.actions.push(CoreAction::RequestClose { id }),
            WindowOperation::Nothing => {}
        }
    }

    /// Run the command bound to a titlebar press.
    pub fn run_command(&mut self, id: WindowId, command: TitlebarCommand, pos: Point) {
        match command {
            TitlebarCommand::Raise => {
                if self.windows.raise(id) {
                    self.push_stacking();
                }
            }
            TitlebarCommand::Lower => {
                if self.windows.lower(id) {
                    self.push_stacking();
                }
            }
            TitlebarCommand::OperationsMenu => {
                let (x, y) = pos.to_pixel();
                self.actions.push(CoreAction::ShowWindowMenu { id, x, y });
            }
            TitlebarCommand::Minimize => self.perform(id, WindowOperation::Minimize),
            TitlebarCommand::Nothing => {}
        }
    }

    /// A titlebar button was pressed and released without leaving it.
    pub fn click_button(&mut self, id: WindowId, button: DecorationButton, pos: Point) {
        self.actions.push(CoreAction::DecorationButtonClicked { id, button });
        match button {
            DecorationButton::Close => self.perform(id, WindowOperation::Close),
            DecorationButton::Maximize => self.perform(id, WindowOperation::Maximize),
            DecorationButton::Minimize => self.perform(id, WindowOperation::Minimize),
            DecorationButton::OnAllDesktops => self.perform(id, WindowOperation::OnAllDesktops),
            DecorationButton::KeepAbove => self.perform(id, WindowOperation::KeepAbove),
            DecorationButton::KeepBelow => self.perform(id, WindowOperation::KeepBelow),
            DecorationButton::Menu => self.run_command(id, TitlebarCommand::OperationsMenu, pos),
        }
    }

    /// Vertical wheel over the titlebar area. Positive deltas scroll down.
    pub fn wheel(&mut self, id: WindowId, delta: f64) {
        if delta == 0.0 {
            return;
        }
        let down = (delta > 0.0) != self.config.mouse.invert_wheel;
        let action = self.config.mouse.titlebar_wheel;
        match action {
            WheelAction::AboveBelow => self.change_state(id, |w, _| {
                // Opposite step from either extreme lands on neither.
                if down {
                    if w.has(StateFlag::KeepAbove) {
                        w.set_keep_above(false);
                    } else {
                        w.set_keep_below(true);
                    }
                } else if w.has(StateFlag::KeepBelow) {
                    w.set_keep_below(false);
                } else {
                    w.set_keep_above(true);
                }
            }),
            WheelAction::MaximizeRestore => self.change_state(id, |w, area| w.set_maximized(!down, area)),
            WheelAction::Nothing => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::cursor::{Cursor, CursorTheme, InputCursor};
    use crate::geometry::{Geometry, Size};
    use crate::registry::WindowRegistry;
    use pretty_assertions::assert_eq;

    struct Fixture {
        windows: WindowRegistry,
        cursor: Cursor,
        config: Config,
        actions: Vec<CoreAction>,
    }

    impl Fixture {
        fn new() -> Self {
            let mut windows = WindowRegistry::new();
            for id in 1..=2 {
                windows.add(Window::new(WindowId(id), String::new(), (0, 0), Size::new(100, 100), None));
            }
            Self {
                windows,
                cursor: Cursor::new(Box::new(InputCursor), &CursorTheme::default()),
                config: Config::default(),
                actions: Vec::new(),
            }
        }

        fn run(&mut self, f: impl FnOnce(&mut InputContext<'_>)) -> Vec<CoreAction> {
            let mut ctx = InputContext {
                windows: &mut self.windows,
                cursor: &mut self.cursor,
                config: &self.config,
                work_area: Geometry::new(0, 0, 800, 600),
                actions: &mut self.actions,
            };
            f(&mut ctx);
            std::mem::take(&mut self.actions)
        }

        fn flags(&self, id: u64) -> (bool, bool) {
            let w = self.windows.get(WindowId(id)).unwrap();
            (w.has(StateFlag::KeepAbove), w.has(StateFlag::KeepBelow))
        }
    }

    #[test]
    fn wheel_steps_through_neutral() {
        let mut fx = Fixture::new();
        let id = WindowId(1);
        fx.run(|ctx| ctx.wheel(id, 5.0));
        assert_eq!(fx.flags(1), (false, true));
        fx.run(|ctx| ctx.wheel(id, -5.0));
        assert_eq!(fx.flags(1), (false, false));
        let actions = fx.run(|ctx| ctx.wheel(id, -5.0));
        assert_eq!(fx.flags(1), (true, false));
        assert!(actions.contains(&CoreAction::WindowStateChanged {
            id,
            flag: StateFlag::KeepAbove,
            enabled: true,
        }));
        assert_eq!(fx.windows.stacking_order(), &[WindowId(2), WindowId(1)]);
    }

    #[test]
    fn inverted_wheel_swaps_direction() {
        let mut fx = Fixture::new();
        fx.config.mouse.invert_wheel = true;
        fx.run(|ctx| ctx.wheel(WindowId(1), 5.0));
        assert_eq!(fx.flags(1), (true, false));
    }

    #[test]
    fn maximize_toggles_and_reports_geometry() {
        let mut fx = Fixture::new();
        let id = WindowId(1);
        let actions = fx.run(|ctx| ctx.perform(id, WindowOperation::Maximize));
        assert!(actions.contains(&CoreAction::SetWindowGeometry {
            id,
            x: 0,
            y: 0,
            w: 800,
            h: 600,
        }));
        fx.run(|ctx| ctx.perform(id, WindowOperation::Maximize));
        assert_eq!(fx.windows.get(id).unwrap().geometry(), Geometry::new(0, 0, 100, 100));
    }

    #[test]
    fn button_clicks_map_to_operations() {
        let mut fx = Fixture::new();
        let id = WindowId(2);
        let actions = fx.run(|ctx| ctx.click_button(id, DecorationButton::Close, Point::default()));
        assert_eq!(
            actions,
            vec![
                CoreAction::DecorationButtonClicked {
                    id,
                    button: DecorationButton::Close,
                },
                CoreAction::RequestClose { id },
            ]
        );
    }

    #[test]
    fn lower_command_restacks() {
        let mut fx = Fixture::new();
        let actions = fx.run(|ctx| ctx.run_command(WindowId(2), TitlebarCommand::Lower, Point::default()));
        assert_eq!(
            actions,
            vec![CoreAction::StackingChanged {
                order: vec![WindowId(2), WindowId(1)],
            }]
        );
        let actions = fx.run(|ctx| ctx.run_command(WindowId(2), TitlebarCommand::Lower, Point::default()));
        assert!(actions.is_empty());
    }
}
