//! Cursor tracker.
//!
//! Owns the single shared pointer position and the current cursor shape.
//! Platform specifics (querying and warping the hardware pointer, theme
//! lookup) sit behind [`CursorBackend`]; observers subscribe with
//! [`Cursor::add_listener`]. Polling and tracking are reference counted:
//! the backend hooks only fire on the first start and the last stop.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::decoration::Section;
use crate::geometry::Point;
use crate::input::{Modifiers, PointerButtons};

/// Cursor shapes the decoration layer requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorShape {
    #[default]
    Arrow,
    /// Vertical resize.
    SizeVer,
    /// Horizontal resize.
    SizeHor,
    /// Diagonal resize, `\`.
    SizeFDiag,
    /// Diagonal resize, `/`.
    SizeBDiag,
}

impl CursorShape {
    pub const fn for_section(section: Section) -> Self {
        match section {
            Section::TopLeft | Section::BottomRight => Self::SizeFDiag,
            Section::TopRight | Section::BottomLeft => Self::SizeBDiag,
            Section::Top | Section::Bottom => Self::SizeVer,
            Section::Left | Section::Right => Self::SizeHor,
            Section::TitleBar | Section::None => Self::Arrow,
        }
    }

    /// Primary name of the shape in a cursor theme.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Arrow => "left_ptr",
            Self::SizeVer => "size_ver",
            Self::SizeHor => "size_hor",
            Self::SizeFDiag => "size_fdiag",
            Self::SizeBDiag => "size_bdiag",
        }
    }

    /// Fallback names tried in order when a theme lacks [`name`](Self::name).
    pub const fn alternative_names(self) -> &'static [&'static str] {
        match self {
            Self::Arrow => &["arrow", "default", "top_left_arrow", "left_arrow"],
            Self::SizeVer => &[
                "ns-resize",
                "v_double_arrow",
                "sb_v_double_arrow",
                "n-resize",
                "s-resize",
                "col-resize",
                "top_side",
                "bottom_side",
                "base_arrow_up",
                "base_arrow_down",
                "based_arrow_down",
                "based_arrow_up",
            ],
            Self::SizeHor => &[
                "ew-resize",
                "h_double_arrow",
                "sb_h_double_arrow",
                "e-resize",
                "w-resize",
                "row-resize",
                "right_side",
                "left_side",
            ],
            Self::SizeFDiag => &[
                "nwse-resize",
                "38c5dff7c7b8962045400281044508d2",
                "c7088f0f3e6c8088236ef8e1e3e70000",
                "bd_double_arrow",
                "bottom_right_corner",
                "top_left_corner",
            ],
            Self::SizeBDiag => &[
                "nesw-resize",
                "50585d75b494802d0151028115016902",
                "fcf1c3c7cd4491d801f1e1c78f100000",
                "fd_double_arrow",
                "bottom_left_corner",
                "top_right_corner",
            ],
        }
    }
}

/// Cursor theme name and nominal size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorTheme {
    pub name: String,
    pub size: u32,
}

impl Default for CursorTheme {
    fn default() -> Self {
        Self {
            name: "default".into(),
            size: 24,
        }
    }
}

/// Notifications delivered to cursor listeners.
#[derive(Debug, Clone, PartialEq)]
pub enum CursorEvent {
    PosChanged(Point),
    MouseChanged {
        pos: Point,
        old_pos: Point,
        buttons: PointerButtons,
        old_buttons: PointerButtons,
        modifiers: Modifiers,
        old_modifiers: Modifiers,
    },
    /// Only delivered while cursor tracking is enabled.
    CursorChanged(CursorShape),
    ThemeChanged(CursorTheme),
}

/// Platform capabilities behind the cursor tracker.
pub trait CursorBackend {
    /// Current hardware pointer position, if the platform can report it.
    fn query_position(&mut self) -> Option<Point>;

    /// Move the hardware pointer.
    fn warp(&mut self, pos: Point);

    /// Theme configured at the platform level, if any.
    fn theme(&self) -> Option<CursorTheme> {
        None
    }

    fn start_polling(&mut self) {}
    fn stop_polling(&mut self) {}
    fn start_tracking(&mut self) {}
    fn stop_tracking(&mut self) {}
}

/// Backend for compositors that learn the pointer position from their own
/// input stream. It never reports a position; warps are delivered to the
/// display server as [`CoreAction::WarpPointer`](crate::CoreAction).
#[derive(Debug, Default)]
pub struct InputCursor;

impl CursorBackend for InputCursor {
    fn query_position(&mut self) -> Option<Point> {
        None
    }

    fn warp(&mut self, pos: Point) {
        trace!("input cursor warp to {:?}", pos);
    }
}

/// State shared between a [`VirtualCursor`] and whoever drives it.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct VirtualPointer {
    pub position: Option<Point>,
    pub theme: Option<CursorTheme>,
    pub polling: bool,
    pub tracking: bool,
    pub warps: Vec<Point>,
}

/// Backend over an externally driven pointer, for headless sessions.
#[derive(Debug, Clone, Default)]
pub struct VirtualCursor {
    shared: Rc<RefCell<VirtualPointer>>,
}

impl VirtualCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle onto the shared pointer state.
    pub fn handle(&self) -> Rc<RefCell<VirtualPointer>> {
        Rc::clone(&self.shared)
    }
}

impl CursorBackend for VirtualCursor {
    fn query_position(&mut self) -> Option<Point> {
        self.shared.borrow().position
    }

    fn warp(&mut self, pos: Point) {
        let mut shared = self.shared.borrow_mut();
        shared.position = Some(pos);
        shared.warps.push(pos);
    }

    fn theme(&self) -> Option<CursorTheme> {
        self.shared.borrow().theme.clone()
    }

    fn start_polling(&mut self) {
        self.shared.borrow_mut().polling = true;
    }

    fn stop_polling(&mut self) {
        self.shared.borrow_mut().polling = false;
    }

    fn start_tracking(&mut self) {
        self.shared.borrow_mut().tracking = true;
    }

    fn stop_tracking(&mut self) {
        self.shared.borrow_mut().tracking = false;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&CursorEvent)>;

pub struct Cursor {
    backend: Box<dyn CursorBackend>,
    pos: Point,
    buttons: PointerButtons,
    modifiers: Modifiers,
    shape: CursorShape,
    theme: CursorTheme,
    polling: u32,
    tracking: u32,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
    pending_warps: Vec<Point>,
}

impl fmt::Debug for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("pos", &self.pos)
            .field("buttons", &self.buttons)
            .field("shape", &self.shape)
            .field("theme", &self.theme)
            .field("polling", &self.polling)
            .field("tracking", &self.tracking)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Cursor {
    /// Create a tracker. An empty configured theme name defers to the
    /// platform theme, then to the built-in default.
    pub fn new(backend: Box<dyn CursorBackend>, configured: &CursorTheme) -> Self {
        let theme = if configured.name.is_empty() {
            backend.theme().unwrap_or_default()
        } else {
            configured.clone()
        };
        Self {
            backend,
            pos: Point::default(),
            buttons: PointerButtons::empty(),
            modifiers: Modifiers::empty(),
            shape: CursorShape::Arrow,
            theme,
            polling: 0,
            tracking: 0,
            listeners: Vec::new(),
            next_listener: 1,
            pending_warps: Vec::new(),
        }
    }

    // ── Position ─────────────────────────────────────────────────────

    /// Current position. Refreshed from the platform when it can report
    /// one, otherwise the last known value.
    pub fn pos(&mut self) -> Point {
        if let Some(platform) = self.backend.query_position() {
            self.update_pos(platform);
        }
        self.pos
    }

    /// Last known position without consulting the platform.
    pub const fn last_pos(&self) -> Point {
        self.pos
    }

    /// Warp the pointer.
    pub fn set_pos(&mut self, pos: Point) {
        debug!("warp pointer to {:.1},{:.1}", pos.x, pos.y);
        self.backend.warp(pos);
        self.pending_warps.push(pos);
        self.update_pos(pos);
    }

    /// Record a position learned from input, without warping.
    pub fn update_pos(&mut self, pos: Point) {
        if pos == self.pos {
            return;
        }
        let old_pos = self.pos;
        self.pos = pos;
        self.emit(&CursorEvent::PosChanged(pos));
        self.emit(&CursorEvent::MouseChanged {
            pos,
            old_pos,
            buttons: self.buttons,
            old_buttons: self.buttons,
            modifiers: self.modifiers,
            old_modifiers: self.modifiers,
        });
    }

    /// Record new button and modifier state.
    pub fn update_state(&mut self, buttons: PointerButtons, modifiers: Modifiers) {
        if buttons == self.buttons && modifiers == self.modifiers {
            return;
        }
        let old_buttons = self.buttons;
        let old_modifiers = self.modifiers;
        self.buttons = buttons;
        self.modifiers = modifiers;
        self.emit(&CursorEvent::MouseChanged {
            pos: self.pos,
            old_pos: self.pos,
            buttons,
            old_buttons,
            modifiers,
            old_modifiers,
        });
    }

    pub const fn buttons(&self) -> PointerButtons {
        self.buttons
    }

    pub const fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Warps requested since the last call, oldest first.
    pub fn take_warps(&mut self) -> Vec<Point> {
        std::mem::take(&mut self.pending_warps)
    }

    // ── Shape and theme ──────────────────────────────────────────────

    pub const fn shape(&self) -> CursorShape {
        self.shape
    }

    /// Returns `true` if the shape changed.
    pub fn set_shape(&mut self, shape: CursorShape) -> bool {
        if shape == self.shape {
            return false;
        }
        trace!("cursor shape {:?} -> {:?}", self.shape, shape);
        self.shape = shape;
        if self.is_tracking() {
            self.emit(&CursorEvent::CursorChanged(shape));
        }
        true
    }

    pub fn theme_name(&self) -> &str {
        &self.theme.name
    }

    pub const fn theme_size(&self) -> u32 {
        self.theme.size
    }

    pub fn set_theme(&mut self, theme: CursorTheme) {
        if theme == self.theme {
            return;
        }
        debug!("cursor theme {} ({})", theme.name, theme.size);
        self.theme = theme.clone();
        self.emit(&CursorEvent::ThemeChanged(theme));
    }

    // ── Reference-counted modes ──────────────────────────────────────

    pub fn start_mouse_polling(&mut self) {
        self.polling += 1;
        if self.polling == 1 {
            self.backend.start_polling();
        }
    }

    pub fn stop_mouse_polling(&mut self) {
        if self.polling == 0 {
            warn!("stop_mouse_polling without matching start");
            return;
        }
        self.polling -= 1;
        if self.polling == 0 {
            self.backend.stop_polling();
        }
    }

    pub const fn is_polling(&self) -> bool {
        self.polling > 0
    }

    pub fn start_cursor_tracking(&mut self) {
        self.tracking += 1;
        if self.tracking == 1 {
            self.backend.start_tracking();
        }
    }

    pub fn stop_cursor_tracking(&mut self) {
        if self.tracking == 0 {
            warn!("stop_cursor_tracking without matching start");
            return;
        }
        self.tracking -= 1;
        if self.tracking == 0 {
            self.backend.stop_tracking();
        }
    }

    pub const fn is_tracking(&self) -> bool {
        self.tracking > 0
    }

    /// Refresh the position from the platform while polling is active.
    pub fn poll(&mut self) {
        if self.is_polling() {
            if let Some(pos) = self.backend.query_position() {
                self.update_pos(pos);
            }
        }
    }

    // ── Listeners ────────────────────────────────────────────────────

    pub fn add_listener(&mut self, listener: impl FnMut(&CursorEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    fn emit(&mut self, event: &CursorEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }
}
