//! Touch input redirector.
//!
//! Every contact is hit-tested on its own. The first contact to land on a
//! decoration while no other contact holds one becomes the decoration
//! press: it can tap titlebar buttons, double-tap, and drag the window.
//! Other contacts are tracked but never touch window state.

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::context::InputContext;
use crate::decoration::{ResizeEdges, Section};
use crate::geometry::Point;
use crate::gesture::{ArmedPress, ClickTracker, PressTarget};
use crate::window::{InteractiveMode, WindowId};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContactRole {
    /// Landed on a client area, on nothing, or on a decoration while
    /// another contact already held the decoration press.
    Passive,
    Pressed(ArmedPress),
    Moving,
    Resizing(ResizeEdges),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TouchContact {
    pub id: i32,
    pub window: Option<WindowId>,
    pub press_section: Section,
    pub start_position: Point,
    pub last_position: Point,
    pub down_time: u32,
    pub role: ContactRole,
}

impl TouchContact {
    pub const fn owns_operation(&self) -> bool {
        matches!(self.role, ContactRole::Moving | ContactRole::Resizing(_))
    }
}

#[derive(Debug, Default)]
pub struct TouchRedirector {
    contacts: IndexMap<i32, TouchContact>,
    decoration_press_id: Option<i32>,
    taps: ClickTracker,
}

impl TouchRedirector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contact(&self, id: i32) -> Option<&TouchContact> {
        self.contacts.get(&id)
    }

    /// Active contacts in the order they went down.
    pub fn contacts(&self) -> impl Iterator<Item = &TouchContact> {
        self.contacts.values()
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub const fn decoration_press_id(&self) -> Option<i32> {
        self.decoration_press_id
    }

    pub fn owns_operation(&self, window: WindowId) -> bool {
        self.contacts
            .values()
            .any(|c| c.window == Some(window) && c.owns_operation())
    }

    // ── Event handlers ───────────────────────────────────────────────

    pub fn down(&mut self, ctx: &mut InputContext<'_>, id: i32, pos: Point, time: u32) {
        if self.contacts.contains_key(&id) {
            warn!("Touch down for active contact {}, cancelling the old one", id);
            self.cancel_contact(ctx, id);
        }
        let hit = ctx.hit_test(pos);
        let section = hit.map_or(Section::None, |hit| hit.section);
        let role = match hit {
            Some(hit) if section.is_decoration() && self.decoration_press_id.is_none() => {
                let config = ctx.config;
                // A tap on the titlebar behaves like a left click.
                if !ctx.is_busy(hit.window) {
                    ctx.run_command(hit.window, config.mouse.titlebar_left, pos);
                }
                self.decoration_press_id = Some(id);
                ContactRole::Pressed(ctx.arm_press(&mut self.taps, hit, pos, time))
            }
            _ => ContactRole::Passive,
        };
        trace!("touch {} down on {:?} {:?}", id, hit.map(|h| h.window), section);
        self.contacts.insert(
            id,
            TouchContact {
                id,
                window: hit.map(|hit| hit.window),
                press_section: section,
                start_position: pos,
                last_position: pos,
                down_time: time,
                role,
            },
        );
    }

    pub fn motion(&mut self, ctx: &mut InputContext<'_>, id: i32, pos: Point, time: u32) {
        let Some(contact) = self.contacts.get_mut(&id) else {
            trace!("motion for unknown touch {}", id);
            return;
        };
        contact.last_position = pos;
        let (window, role) = (contact.window, contact.role);
        match role {
            ContactRole::Moving | ContactRole::Resizing(_) => {
                if let Some(window) = window {
                    ctx.update_operation(window, pos);
                }
            }
            ContactRole::Pressed(press) if press.crosses_threshold(pos, time, &ctx.config.input) => {
                self.promote(ctx, id, press, pos);
            }
            ContactRole::Pressed(_) | ContactRole::Passive => {}
        }
    }

    pub fn up(&mut self, ctx: &mut InputContext<'_>, id: i32, time: u32) {
        let Some(contact) = self.release(id) else {
            trace!("up for unknown touch {}", id);
            return;
        };
        let pos = contact.last_position;
        match contact.role {
            ContactRole::Moving | ContactRole::Resizing(_) => {
                if let Some(window) = contact.window {
                    ctx.end_operation(window);
                }
            }
            ContactRole::Pressed(press) => match press.target {
                PressTarget::Button(target) => {
                    let over = ctx.windows.get(press.window).and_then(|w| w.button_at(pos));
                    if over == Some(target) {
                        ctx.click_button(press.window, target, pos);
                    }
                }
                PressTarget::Drag if press.crosses_threshold(pos, time, &ctx.config.input) => {
                    self.taps.invalidate(press.window);
                    if ctx.begin_operation(&press, pos).is_some() {
                        ctx.end_operation(press.window);
                    }
                }
                PressTarget::Drag | PressTarget::Inert => {}
            },
            ContactRole::Passive => {}
        }
    }

    /// Start held decoration presses that have been down long enough.
    pub fn on_tick(&mut self, ctx: &mut InputContext<'_>, time: u32) {
        let due: Vec<_> = self
            .contacts
            .values()
            .filter_map(|c| match c.role {
                ContactRole::Pressed(press)
                    if press.crosses_threshold(c.last_position, time, &ctx.config.input) =>
                {
                    Some((c.id, press, c.last_position))
                }
                _ => None,
            })
            .collect();
        for (id, press, pos) in due {
            self.promote(ctx, id, press, pos);
        }
    }

    /// End a contact without treating it as a tap. Returns `false` for
    /// unknown ids.
    pub fn cancel_contact(&mut self, ctx: &mut InputContext<'_>, id: i32) -> bool {
        let Some(contact) = self.release(id) else {
            return false;
        };
        debug!("touch {} cancelled", id);
        if contact.owns_operation() {
            if let Some(window) = contact.window {
                ctx.end_operation(window);
            }
        }
        true
    }

    pub fn cancel_all(&mut self, ctx: &mut InputContext<'_>) {
        let ids: Vec<_> = self.contacts.keys().copied().collect();
        for id in ids {
            self.cancel_contact(ctx, id);
        }
    }

    /// Cancel every contact on a window that is about to disappear.
    pub fn forget_window(&mut self, ctx: &mut InputContext<'_>, window: WindowId) {
        let ids: Vec<_> = self
            .contacts
            .values()
            .filter(|c| c.window == Some(window))
            .map(|c| c.id)
            .collect();
        for id in ids {
            self.cancel_contact(ctx, id);
        }
        self.taps.invalidate(window);
    }

    // ── Internals ────────────────────────────────────────────────────

    fn release(&mut self, id: i32) -> Option<TouchContact> {
        let contact = self.contacts.shift_remove(&id)?;
        if self.decoration_press_id == Some(id) {
            self.decoration_press_id = None;
        }
        Some(contact)
    }

    fn promote(&mut self, ctx: &mut InputContext<'_>, id: i32, press: ArmedPress, pos: Point) {
        self.taps.invalidate(press.window);
        let role = match ctx.begin_operation(&press, pos) {
            Some(InteractiveMode::Move) => ContactRole::Moving,
            Some(InteractiveMode::Resize(edges)) => ContactRole::Resizing(edges),
            None => ContactRole::Pressed(ArmedPress {
                target: PressTarget::Inert,
                ..press
            }),
        };
        if let Some(contact) = self.contacts.get_mut(&id) {
            contact.role = role;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::Config;
    use crate::cursor::{Cursor, CursorTheme, InputCursor};
    use crate::decoration::{DecorationAdapter, DecorationSettings, StandardRenderer};
    use crate::event::CoreAction;
    use crate::geometry::{Geometry, Size};
    use crate::registry::WindowRegistry;
    use crate::window::{StateFlag, Window};
    use pretty_assertions::assert_eq;

    const A: WindowId = WindowId(1);
    const B: WindowId = WindowId(2);
    /// Titlebar centres of A at (100, 100) and B at (700, 100).
    const TITLE_A: Point = Point { x: 304.0, y: 116.0 };
    const TITLE_B: Point = Point { x: 904.0, y: 116.0 };

    struct Fixture {
        touch: TouchRedirector,
        windows: WindowRegistry,
        cursor: Cursor,
        config: Config,
    }

    impl Fixture {
        fn new() -> Self {
            let mut windows = WindowRegistry::new();
            for (id, x) in [(A, 100), (B, 700)] {
                let decoration = DecorationAdapter::new(Arc::new(StandardRenderer), DecorationSettings::default());
                windows.add(Window::new(id, String::new(), (x, 100), Size::new(400, 300), Some(decoration)));
            }
            Self {
                touch: TouchRedirector::new(),
                windows,
                cursor: Cursor::new(Box::new(InputCursor), &CursorTheme::default()),
                config: Config::default(),
            }
        }

        fn run(&mut self, f: impl FnOnce(&mut TouchRedirector, &mut InputContext<'_>)) -> Vec<CoreAction> {
            let mut actions = Vec::new();
            let mut ctx = InputContext {
                windows: &mut self.windows,
                cursor: &mut self.cursor,
                config: &self.config,
                work_area: Geometry::new(0, 0, 1920, 1080),
                actions: &mut actions,
            };
            f(&mut self.touch, &mut ctx);
            actions
        }

        fn tap(&mut self, id: i32, pos: Point, time: u32) {
            self.run(|t, ctx| {
                t.down(ctx, id, pos, time);
                t.up(ctx, id, time + 10);
            });
        }

        fn on_all_desktops(&self, id: WindowId) -> bool {
            self.windows.get(id).unwrap().has(StateFlag::OnAllDesktops)
        }
    }

    #[test]
    fn double_tap_toggles() {
        let mut fx = Fixture::new();
        fx.tap(0, TITLE_A, 0);
        assert!(!fx.on_all_desktops(A));
        fx.tap(0, TITLE_A, 100);
        assert!(fx.on_all_desktops(A));
        assert!(fx.touch.is_empty());
    }

    #[test]
    fn interleaved_windows_keep_separate_taps() {
        let mut fx = Fixture::new();
        fx.tap(0, TITLE_A, 0);
        fx.tap(1, TITLE_B, 50);
        fx.tap(0, TITLE_A, 100);
        fx.tap(1, TITLE_B, 150);
        assert!(fx.on_all_desktops(A));
        assert!(fx.on_all_desktops(B));
    }

    #[test]
    fn only_first_decoration_contact_presses() {
        let mut fx = Fixture::new();
        fx.run(|t, ctx| {
            t.down(ctx, 0, TITLE_A, 0);
            t.down(ctx, 1, TITLE_B, 5);
        });
        assert_eq!(fx.touch.decoration_press_id(), Some(0));
        assert_eq!(fx.touch.contact(1).unwrap().role, ContactRole::Passive);

        let actions = fx.run(|t, ctx| {
            t.motion(ctx, 1, TITLE_B.offset(50.0, 0.0), 10);
            t.motion(ctx, 0, TITLE_A.offset(30.0, 0.0), 10);
        });
        assert_eq!(
            actions,
            vec![
                CoreAction::OperationStarted {
                    id: A,
                    mode: InteractiveMode::Move,
                },
                CoreAction::SetWindowGeometry {
                    id: A,
                    x: 130,
                    y: 100,
                    w: 408,
                    h: 332,
                },
            ]
        );

        let actions = fx.run(|t, ctx| t.up(ctx, 1, 20));
        assert!(actions.is_empty());
        assert!(fx.touch.owns_operation(A));
        let actions = fx.run(|t, ctx| t.up(ctx, 0, 30));
        assert_eq!(actions, vec![CoreAction::OperationFinished { id: A }]);
        assert_eq!(fx.touch.decoration_press_id(), None);
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut fx = Fixture::new();
        let actions = fx.run(|t, ctx| {
            t.motion(ctx, 9, TITLE_A, 0);
            t.up(ctx, 9, 0);
        });
        assert!(actions.is_empty());
        assert!(fx.touch.is_empty());
    }

    #[test]
    fn duplicate_down_cancels_old_contact() {
        let mut fx = Fixture::new();
        fx.run(|t, ctx| {
            t.down(ctx, 0, TITLE_A, 0);
            t.motion(ctx, 0, TITLE_A.offset(30.0, 0.0), 10);
        });
        let actions = fx.run(|t, ctx| t.down(ctx, 0, Point::new(1500.0, 900.0), 20));
        assert!(actions.contains(&CoreAction::OperationFinished { id: A }));
        assert_eq!(fx.touch.len(), 1);
        assert_eq!(fx.touch.contact(0).unwrap().window, None);
    }

    #[test]
    fn removed_window_cancels_its_contacts() {
        let mut fx = Fixture::new();
        fx.run(|t, ctx| {
            t.down(ctx, 0, TITLE_A, 0);
            t.motion(ctx, 0, TITLE_A.offset(30.0, 0.0), 10);
            t.down(ctx, 1, TITLE_B, 10);
        });
        let actions = fx.run(|t, ctx| t.forget_window(ctx, A));
        assert_eq!(actions, vec![CoreAction::OperationFinished { id: A }]);
        assert!(fx.touch.contact(0).is_none());
        assert!(fx.touch.contact(1).is_some());
    }

    #[test]
    fn cancel_all_ends_operations() {
        let mut fx = Fixture::new();
        fx.run(|t, ctx| {
            t.down(ctx, 0, TITLE_A, 0);
            t.motion(ctx, 0, TITLE_A.offset(0.0, 30.0), 10);
        });
        let actions = fx.run(|t, ctx| t.cancel_all(ctx));
        assert_eq!(actions, vec![CoreAction::OperationFinished { id: A }]);
        assert!(fx.touch.is_empty());
        assert!(!fx.windows.get(A).unwrap().interactive.is_active());
    }
}
