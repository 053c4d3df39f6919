//! Per-event context handed to the input redirectors.
//!
//! The redirectors own only their own state machines. Everything they
//! touch besides that (windows, cursor, configuration, the action list) is
//! borrowed from [`Core`](crate::Core) for the duration of one event.

use tracing::{debug, trace, warn};

use crate::config::Config;
use crate::cursor::{Cursor, CursorShape};
use crate::decoration::Section;
use crate::event::CoreAction;
use crate::geometry::{Geometry, Point};
use crate::gesture::{ArmedPress, Click, ClickTracker, PressTarget};
use crate::moveresize;
use crate::registry::WindowRegistry;
use crate::window::{InteractiveMode, WindowId};

pub struct InputContext<'a> {
    pub windows: &'a mut WindowRegistry,
    pub cursor: &'a mut Cursor,
    pub config: &'a Config,
    /// Maximize target.
    pub work_area: Geometry,
    pub actions: &'a mut Vec<CoreAction>,
}

/// Result of hit-testing a global point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub window: WindowId,
    /// [`Section::None`] when the point is over the client area.
    pub section: Section,
}

impl InputContext<'_> {
    /// Topmost window whose input geometry contains `pos`, and the section
    /// of its decoration there.
    pub fn hit_test(&self, pos: Point) -> Option<Hit> {
        let window = self.windows.window_at_input(pos)?;
        let section = self.windows.get(window)?.section_at(pos);
        Some(Hit { window, section })
    }

    /// Request a cursor shape, emitting [`CoreAction::SetCursor`] on change.
    pub fn set_cursor(&mut self, shape: CursorShape) {
        if self.cursor.set_shape(shape) {
            self.actions.push(CoreAction::SetCursor { shape });
        }
    }

    pub fn push_geometry(&mut self, id: WindowId) {
        if let Some(window) = self.windows.get(id) {
            self.actions.push(CoreAction::geometry(id, window.geometry()));
        }
    }

    /// Whether `id` is gone or already being moved or resized.
    pub fn is_busy(&self, id: WindowId) -> bool {
        self.windows.get(id).map_or(true, |w| w.interactive.is_active())
    }

    /// Decide what a primary press on `hit` may turn into.
    ///
    /// Titlebar buttons take precedence, then double-clicks in the titlebar
    /// area. Anything else is a potential drag.
    pub fn arm_press(&mut self, clicks: &mut ClickTracker, hit: Hit, pos: Point, time: u32) -> ArmedPress {
        let Hit { window, section } = hit;
        let config = self.config;
        let (busy, button) = match self.windows.get(window) {
            Some(w) => (w.interactive.is_active(), w.button_at(pos)),
            None => (true, None),
        };
        let target = if busy {
            warn!("press on {} while it is being moved or resized", window);
            PressTarget::Inert
        } else if let Some(button) = button {
            clicks.invalidate(window);
            PressTarget::Button(button)
        } else if section.is_titlebar_area() {
            match clicks.press(window, pos, time, &config.input) {
                Click::Double => {
                    self.perform(window, config.mouse.titlebar_double_click);
                    PressTarget::Inert
                }
                Click::First => PressTarget::Drag,
            }
        } else {
            clicks.invalidate(window);
            PressTarget::Drag
        };
        trace!("armed {:?} press on {} {:?}", target, window, section);
        ArmedPress {
            window,
            section,
            origin: pos,
            time,
            target,
        }
    }

    // ── Interactive operations ───────────────────────────────────────

    /// Start the operation `press` was armed for and apply the motion that
    /// triggered it. Returns the mode, or `None` if nothing started.
    pub fn begin_operation(&mut self, press: &ArmedPress, pos: Point) -> Option<InteractiveMode> {
        let mode = match press.section {
            Section::TitleBar => InteractiveMode::Move,
            section if !section.to_edges().is_empty() => InteractiveMode::Resize(section.to_edges()),
            _ => return None,
        };
        let window = self.windows.get_mut(press.window)?;
        if let Err(e) = moveresize::start(window, mode, press.origin) {
            debug!("not starting operation: {}", e);
            return None;
        }
        self.actions.push(CoreAction::OperationStarted {
            id: press.window,
            mode,
        });
        self.update_operation(press.window, pos);
        Some(mode)
    }

    pub fn update_operation(&mut self, id: WindowId, pos: Point) {
        let Some(window) = self.windows.get_mut(id) else {
            trace!("operation update for missing {}", id);
            return;
        };
        if let Some(geometry) = moveresize::update(window, pos) {
            self.actions.push(CoreAction::geometry(id, geometry));
        }
    }

    /// Finish the operation on `id`, then apply any decoration settings that
    /// arrived while it ran. Returns `true` if an operation was finished.
    pub fn end_operation(&mut self, id: WindowId) -> bool {
        let Some(window) = self.windows.get_mut(id) else {
            return false;
        };
        if moveresize::finish(window).is_err() {
            return false;
        }
        let relaid = window.apply_pending_settings();
        self.actions.push(CoreAction::OperationFinished { id });
        if relaid {
            self.push_geometry(id);
        }
        true
    }
}
