//! Pointer input redirector.
//!
//! Routes pointer events that land on window decorations: hover feedback
//! through the cursor shape, presses that turn into moves and resizes once
//! the drag threshold is crossed, titlebar clicks, double-clicks and the
//! titlebar wheel. Events over client areas pass through untouched.

use tracing::{debug, trace};

use crate::context::{Hit, InputContext};
use crate::cursor::CursorShape;
use crate::decoration::{ResizeEdges, Section};
use crate::geometry::Point;
use crate::gesture::{ArmedPress, ClickTracker, PressTarget};
use crate::input::{AxisOrientation, MouseButton};
use crate::window::{InteractiveMode, WindowId};

/// Where the pointer state machine currently is.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PointerState {
    #[default]
    Idle,
    HoveringDecoration {
        window: WindowId,
        section: Section,
    },
    /// A button went down on a decoration and has not crossed the drag
    /// threshold yet.
    PressedOnDecoration {
        press: ArmedPress,
        button: u32,
    },
    Moving {
        window: WindowId,
    },
    Resizing {
        window: WindowId,
        edges: ResizeEdges,
    },
}

impl PointerState {
    /// Window whose interactive operation this pointer drives.
    pub const fn operation_window(&self) -> Option<WindowId> {
        match *self {
            Self::Moving { window } | Self::Resizing { window, .. } => Some(window),
            _ => None,
        }
    }

    fn window(&self) -> Option<WindowId> {
        match *self {
            Self::Idle => None,
            Self::HoveringDecoration { window, .. }
            | Self::Moving { window }
            | Self::Resizing { window, .. } => Some(window),
            Self::PressedOnDecoration { press, .. } => Some(press.window),
        }
    }
}

#[derive(Debug, Default)]
pub struct PointerRedirector {
    state: PointerState,
    /// Decoration under the pointer at the last hover update.
    focus: Option<Hit>,
    clicks: ClickTracker,
}

impl PointerRedirector {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn state(&self) -> &PointerState {
        &self.state
    }

    pub const fn focus(&self) -> Option<Hit> {
        self.focus
    }

    pub fn owns_operation(&self, window: WindowId) -> bool {
        self.state.operation_window() == Some(window)
    }

    // ── Event handlers ───────────────────────────────────────────────

    pub fn on_motion(&mut self, ctx: &mut InputContext<'_>, pos: Point, time: u32) {
        ctx.cursor.update_pos(pos);
        match self.state {
            PointerState::Moving { window } | PointerState::Resizing { window, .. } => {
                ctx.update_operation(window, pos);
            }
            PointerState::PressedOnDecoration { press, button } => {
                if press.crosses_threshold(pos, time, &ctx.config.input) {
                    self.promote(ctx, press, button, pos);
                }
            }
            PointerState::Idle | PointerState::HoveringDecoration { .. } => self.hover(ctx, pos),
        }
    }

    pub fn on_button(&mut self, ctx: &mut InputContext<'_>, button: u32, pressed: bool, time: u32) {
        if let Some(mb) = MouseButton::from_code(button) {
            let mut held = ctx.cursor.buttons();
            held.set(mb.flag(), pressed);
            let modifiers = ctx.cursor.modifiers();
            ctx.cursor.update_state(held, modifiers);
        }
        if pressed {
            self.press(ctx, button, time);
        } else {
            self.release(ctx, button, time);
        }
    }

    pub fn on_axis(&mut self, ctx: &mut InputContext<'_>, orientation: AxisOrientation, delta: f64) {
        if orientation != AxisOrientation::Vertical || delta == 0.0 {
            return;
        }
        self.refresh(ctx);
        if let PointerState::HoveringDecoration { window, section } = self.state {
            if section.is_titlebar_area() {
                ctx.wheel(window, delta);
            }
        }
    }

    /// Start a held press once it has been down long enough.
    pub fn on_tick(&mut self, ctx: &mut InputContext<'_>, time: u32) {
        if let PointerState::PressedOnDecoration { press, button } = self.state {
            let pos = ctx.cursor.last_pos();
            if press.crosses_threshold(pos, time, &ctx.config.input) {
                self.promote(ctx, press, button, pos);
            }
        }
    }

    /// Re-evaluate the hover target at the resting pointer position.
    ///
    /// Windows can move, restack or disappear without pointer motion, so
    /// this runs before acting on the hover state and after such changes.
    pub fn refresh(&mut self, ctx: &mut InputContext<'_>) {
        if matches!(
            self.state,
            PointerState::Idle | PointerState::HoveringDecoration { .. }
        ) {
            let pos = ctx.cursor.last_pos();
            self.hover(ctx, pos);
        }
    }

    /// Drop every reference to a window that is about to disappear,
    /// finishing its operation if this pointer owns one.
    pub fn forget_window(&mut self, ctx: &mut InputContext<'_>, id: WindowId) {
        if self.owns_operation(id) {
            debug!("{} removed during pointer operation", id);
            ctx.end_operation(id);
        }
        if self.state.window() == Some(id) {
            self.state = PointerState::Idle;
        }
        if self.focus.is_some_and(|hit| hit.window == id) {
            self.focus = None;
            ctx.set_cursor(CursorShape::Arrow);
        }
        self.clicks.invalidate(id);
    }

    // ── Internals ────────────────────────────────────────────────────

    fn hover(&mut self, ctx: &mut InputContext<'_>, pos: Point) {
        let hit = ctx.hit_test(pos).filter(|hit| hit.section.is_decoration());
        if hit != self.focus {
            if let Some(old) = self.focus {
                if let Some(window) = ctx.windows.get_mut(old.window) {
                    window.cursor_shape = CursorShape::Arrow;
                }
            }
            let shape = hit.map_or(CursorShape::Arrow, |hit| CursorShape::for_section(hit.section));
            if let Some(hit) = hit {
                if let Some(window) = ctx.windows.get_mut(hit.window) {
                    window.cursor_shape = shape;
                }
            }
            trace!("pointer focus {:?} -> {:?}", self.focus, hit);
            ctx.set_cursor(shape);
            self.focus = hit;
        }
        self.state = match hit {
            Some(Hit { window, section }) => PointerState::HoveringDecoration { window, section },
            None => PointerState::Idle,
        };
    }

    fn press(&mut self, ctx: &mut InputContext<'_>, button: u32, time: u32) {
        self.refresh(ctx);
        let PointerState::HoveringDecoration { window, section } = self.state else {
            trace!("button {:#x} outside decorations", button);
            return;
        };
        let config = ctx.config;
        let pos = ctx.cursor.last_pos();
        // A window under an interactive operation is not restacked.
        if let Some(mb) = MouseButton::from_code(button).filter(|_| !ctx.is_busy(window)) {
            ctx.run_command(window, config.mouse.command_for(mb), pos);
        }
        if button != config.input.primary_button {
            return;
        }
        let press = ctx.arm_press(&mut self.clicks, Hit { window, section }, pos, time);
        self.state = PointerState::PressedOnDecoration { press, button };
    }

    fn release(&mut self, ctx: &mut InputContext<'_>, button: u32, time: u32) {
        let pos = ctx.cursor.last_pos();
        match self.state {
            PointerState::Moving { window } | PointerState::Resizing { window, .. } => {
                if !ctx.cursor.buttons().is_empty() {
                    return;
                }
                ctx.end_operation(window);
            }
            PointerState::PressedOnDecoration { press, button: held } if held == button => {
                match press.target {
                    PressTarget::Button(target) => {
                        let over = ctx.windows.get(press.window).and_then(|w| w.button_at(pos));
                        if over == Some(target) {
                            ctx.click_button(press.window, target, pos);
                        }
                    }
                    // Held past the drag time with no event in between.
                    PressTarget::Drag if press.crosses_threshold(pos, time, &ctx.config.input) => {
                        self.clicks.invalidate(press.window);
                        if ctx.begin_operation(&press, pos).is_some() {
                            ctx.end_operation(press.window);
                        }
                    }
                    PressTarget::Drag | PressTarget::Inert => {}
                }
            }
            _ => return,
        }
        self.state = PointerState::Idle;
        self.hover(ctx, pos);
    }

    fn promote(&mut self, ctx: &mut InputContext<'_>, press: ArmedPress, button: u32, pos: Point) {
        self.clicks.invalidate(press.window);
        self.state = match ctx.begin_operation(&press, pos) {
            Some(InteractiveMode::Move) => PointerState::Moving {
                window: press.window,
            },
            Some(InteractiveMode::Resize(edges)) => PointerState::Resizing {
                window: press.window,
                edges,
            },
            None => PointerState::PressedOnDecoration {
                press: ArmedPress {
                    target: PressTarget::Inert,
                    ..press
                },
                button,
            },
        };
    }
}
