//! Window management types.
//!
//! Protocol-agnostic window representation. No display-server handles leak here.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::cursor::CursorShape;
use crate::decoration::{DecorationAdapter, DecorationButton, DecorationSettings, ResizeEdges, Section};
use crate::geometry::{Borders, Geometry, Point, Size};

/// Unique, opaque identifier for a managed window.
///
/// Backends maintain a mapping from their protocol-specific surface handle
/// to this ID. Core never sees protocol handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowId(pub u64);

impl std::fmt::Display for WindowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "win:{}", self.0)
    }
}

bitflags! {
    /// Window state flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct WindowState: u32 {
        const ON_ALL_DESKTOPS = 0b0000_0001;
        const KEEP_ABOVE      = 0b0000_0010;
        const KEEP_BELOW      = 0b0000_0100;
        const MAXIMIZED       = 0b0000_1000;
        const MINIMIZED       = 0b0001_0000;
        const SHADED          = 0b0010_0000;
    }
}

/// Individually reported window state flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateFlag {
    OnAllDesktops,
    KeepAbove,
    KeepBelow,
    Maximized,
    Minimized,
    Shaded,
}

impl StateFlag {
    pub const ALL: [Self; 6] = [
        Self::OnAllDesktops,
        Self::KeepAbove,
        Self::KeepBelow,
        Self::Maximized,
        Self::Minimized,
        Self::Shaded,
    ];

    pub const fn bits(self) -> WindowState {
        match self {
            Self::OnAllDesktops => WindowState::ON_ALL_DESKTOPS,
            Self::KeepAbove => WindowState::KEEP_ABOVE,
            Self::KeepBelow => WindowState::KEEP_BELOW,
            Self::Maximized => WindowState::MAXIMIZED,
            Self::Minimized => WindowState::MINIMIZED,
            Self::Shaded => WindowState::SHADED,
        }
    }
}

/// Stacking layer derived from keep-above/keep-below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Below,
    Normal,
    Above,
}

/// Geometry captured when an interactive operation starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grab {
    /// Pointer (or contact) position at the press that armed the operation.
    pub origin: Point,
    pub initial: Geometry,
    pub edges: ResizeEdges,
}

/// What an interactive operation does to the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractiveMode {
    Move,
    Resize(ResizeEdges),
}

/// Interactive move/resize state. One per window.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractiveOp {
    #[default]
    None,
    Moving(Grab),
    Resizing(Grab),
}

impl InteractiveOp {
    pub const fn is_active(&self) -> bool {
        !matches!(self, Self::None)
    }

    pub const fn mode(&self) -> Option<InteractiveMode> {
        match self {
            Self::None => None,
            Self::Moving(_) => Some(InteractiveMode::Move),
            Self::Resizing(grab) => Some(InteractiveMode::Resize(grab.edges)),
        }
    }
}

/// A managed window (protocol-agnostic).
#[derive(Debug, Clone)]
pub struct Window {
    pub id: WindowId,
    pub title: String,
    /// Visible frame, decoration included.
    geometry: Geometry,
    /// Hit-test rectangle. Always contains `geometry`.
    input_geometry: Geometry,
    client_size: Size,
    min_client_size: Size,
    decoration: Option<DecorationAdapter>,
    /// Suppress side and bottom borders regardless of the configured size.
    pub no_border: bool,
    pub state: WindowState,
    pub interactive: InteractiveOp,
    /// Shape last requested because of this window's decoration.
    pub cursor_shape: CursorShape,
    restore_geometry: Option<Geometry>,
    pending_settings: Option<DecorationSettings>,
}

impl Window {
    /// Create a window whose frame top-left is at `(x, y)` and whose client
    /// surface has `client_size`.
    pub fn new(
        id: WindowId,
        title: String,
        (x, y): (i32, i32),
        client_size: Size,
        decoration: Option<DecorationAdapter>,
    ) -> Self {
        let mut window = Self {
            id,
            title,
            geometry: Geometry::new(x, y, 0, 0),
            input_geometry: Geometry::default(),
            client_size,
            min_client_size: Size::new(1, 1),
            decoration,
            no_border: false,
            state: WindowState::empty(),
            interactive: InteractiveOp::None,
            cursor_shape: CursorShape::Arrow,
            restore_geometry: None,
            pending_settings: None,
        };
        window.relayout_frame();
        window
    }

    // ── Geometry ─────────────────────────────────────────────────────

    pub const fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub const fn input_geometry(&self) -> Geometry {
        self.input_geometry
    }

    pub const fn client_size(&self) -> Size {
        self.client_size
    }

    pub const fn is_decorated(&self) -> bool {
        self.decoration.is_some()
    }

    pub const fn decoration(&self) -> Option<&DecorationAdapter> {
        self.decoration.as_ref()
    }

    pub fn borders(&self) -> Borders {
        self.decoration
            .as_ref()
            .map(DecorationAdapter::borders)
            .unwrap_or_default()
    }

    /// Offset of the client surface from the frame origin.
    pub fn client_area_offset(&self) -> (u32, u32) {
        let b = self.borders();
        (b.left, b.top)
    }

    /// Client surface rectangle in global coordinates.
    pub fn client_geometry(&self) -> Geometry {
        let (dx, dy) = self.client_area_offset();
        Geometry::from_parts(self.geometry.x + dx as i32, self.geometry.y + dy as i32, self.client_size)
    }

    pub fn set_min_client_size(&mut self, size: Size) {
        self.min_client_size = size;
    }

    /// Smallest frame the window may be resized to.
    pub fn minimum_size(&self) -> Size {
        let from_client = self.min_client_size.grow(self.borders());
        self.decoration
            .as_ref()
            .map_or(from_client, |d| from_client.max(d.minimum_size()))
    }

    /// Move the frame top-left to `(x, y)`.
    pub fn move_to(&mut self, x: i32, y: i32) {
        self.geometry.x = x;
        self.geometry.y = y;
        self.update_input_geometry();
    }

    /// Resize the frame, clamped to [`minimum_size`](Self::minimum_size).
    pub fn resize(&mut self, size: Size) {
        let size = size.max(self.minimum_size());
        self.geometry.width = size.width;
        self.geometry.height = size.height;
        self.client_size = size.shrink(self.borders());
        self.update_input_geometry();
    }

    /// Move and resize in one step. Size is clamped as in [`resize`](Self::resize).
    pub fn set_geometry(&mut self, geometry: Geometry) {
        self.geometry.x = geometry.x;
        self.geometry.y = geometry.y;
        self.resize(geometry.size());
    }

    /// Recompute the frame around the client after the borders changed.
    fn relayout_frame(&mut self) {
        let frame = self.client_size.grow(self.borders());
        self.geometry.width = frame.width;
        self.geometry.height = frame.height;
        self.update_input_geometry();
    }

    fn update_input_geometry(&mut self) {
        let margins = self
            .decoration
            .as_ref()
            .map(DecorationAdapter::resize_only_borders)
            .unwrap_or_default();
        self.input_geometry = self.geometry.grow(margins);
    }

    // ── Decoration ───────────────────────────────────────────────────

    fn effective_settings(&self, settings: &DecorationSettings) -> DecorationSettings {
        if self.no_border {
            settings.without_borders()
        } else {
            settings.clone()
        }
    }

    /// Apply new decoration settings, keeping the client size and the frame
    /// origin. Deferred while an interactive operation is active.
    ///
    /// Returns `true` if the frame geometry changed.
    pub fn reconfigure_decoration(&mut self, settings: &DecorationSettings) -> bool {
        if self.decoration.is_none() {
            return false;
        }
        if self.interactive.is_active() {
            self.pending_settings = Some(settings.clone());
            return false;
        }
        self.apply_settings(settings)
    }

    /// Apply settings deferred by an interactive operation.
    pub fn apply_pending_settings(&mut self) -> bool {
        match self.pending_settings.take() {
            Some(settings) => self.apply_settings(&settings),
            None => false,
        }
    }

    pub const fn has_pending_settings(&self) -> bool {
        self.pending_settings.is_some()
    }

    fn apply_settings(&mut self, settings: &DecorationSettings) -> bool {
        let effective = self.effective_settings(settings);
        let before = (self.geometry, self.input_geometry);
        if let Some(decoration) = self.decoration.as_mut() {
            decoration.reconfigure(effective);
        }
        self.relayout_frame();
        before != (self.geometry, self.input_geometry)
    }

    /// Decoration section under a global point. `None` for undecorated
    /// windows and for the client area.
    pub fn section_at(&self, global: Point) -> Section {
        match &self.decoration {
            Some(decoration) => {
                decoration.section_at(self.geometry.to_local(global), self.geometry.size())
            }
            None => Section::None,
        }
    }

    pub fn button_at(&self, global: Point) -> Option<DecorationButton> {
        self.decoration
            .as_ref()?
            .button_at(self.geometry.to_local(global), self.geometry.size())
    }

    // ── State ────────────────────────────────────────────────────────

    pub const fn has(&self, flag: StateFlag) -> bool {
        self.state.contains(flag.bits())
    }

    /// Set keep-above. Clears keep-below, the two are exclusive.
    pub fn set_keep_above(&mut self, enable: bool) {
        self.state.set(WindowState::KEEP_ABOVE, enable);
        if enable {
            self.state.remove(WindowState::KEEP_BELOW);
        }
    }

    /// Set keep-below. Clears keep-above, the two are exclusive.
    pub fn set_keep_below(&mut self, enable: bool) {
        self.state.set(WindowState::KEEP_BELOW, enable);
        if enable {
            self.state.remove(WindowState::KEEP_ABOVE);
        }
    }

    pub fn toggle(&mut self, flag: StateFlag) {
        let enable = !self.has(flag);
        match flag {
            StateFlag::KeepAbove => self.set_keep_above(enable),
            StateFlag::KeepBelow => self.set_keep_below(enable),
            other => self.state.set(other.bits(), enable),
        }
    }

    /// Maximize to `area`, or restore the geometry saved on maximize.
    pub fn set_maximized(&mut self, maximize: bool, area: Geometry) {
        if maximize && !self.has(StateFlag::Maximized) {
            self.restore_geometry = Some(self.geometry);
            self.state.insert(WindowState::MAXIMIZED);
            self.set_geometry(area);
        } else if !maximize && self.has(StateFlag::Maximized) {
            self.state.remove(WindowState::MAXIMIZED);
            if let Some(saved) = self.restore_geometry.take() {
                self.set_geometry(saved);
            }
        }
    }

    pub const fn layer(&self) -> Layer {
        if self.state.contains(WindowState::KEEP_ABOVE) {
            Layer::Above
        } else if self.state.contains(WindowState::KEEP_BELOW) {
            Layer::Below
        } else {
            Layer::Normal
        }
    }

    pub const fn is_visible(&self) -> bool {
        !self.state.contains(WindowState::MINIMIZED)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::decoration::{BorderSize, StandardRenderer};
    use pretty_assertions::assert_eq;

    fn settings(border_size: BorderSize) -> DecorationSettings {
        DecorationSettings {
            border_size,
            ..DecorationSettings::default()
        }
    }

    fn decorated(border_size: BorderSize) -> Window {
        let adapter = DecorationAdapter::new(Arc::new(StandardRenderer), settings(border_size));
        Window::new(WindowId(1), "test".into(), (100, 100), Size::new(400, 300), Some(adapter))
    }

    #[test]
    fn frame_wraps_client() {
        let w = decorated(BorderSize::Normal);
        assert_eq!(w.geometry(), Geometry::new(100, 100, 408, 332));
        assert_eq!(w.input_geometry(), w.geometry());
        assert_eq!(w.client_area_offset(), (4, 28));
        assert_eq!(w.client_geometry(), Geometry::new(104, 128, 400, 300));
    }

    #[test]
    fn undecorated_window_has_bare_geometry() {
        let w = Window::new(WindowId(2), "bare".into(), (0, 0), Size::new(50, 40), None);
        assert_eq!(w.geometry(), Geometry::new(0, 0, 50, 40));
        assert_eq!(w.section_at(Point::new(0.0, 0.0)), Section::None);
        assert!(!w.is_decorated());
    }

    #[test]
    fn border_none_extends_input_geometry() {
        let mut w = decorated(BorderSize::Normal);
        assert!(w.reconfigure_decoration(&settings(BorderSize::None)));
        assert_eq!(w.geometry(), Geometry::new(100, 100, 400, 328));
        assert_eq!(w.input_geometry(), Geometry::new(92, 100, 416, 336));
        assert!(w.input_geometry().contains_rect(w.geometry()));
        assert_ne!(w.input_geometry(), w.geometry());
    }

    #[test]
    fn no_border_overrides_configured_size() {
        let mut w = decorated(BorderSize::Normal);
        w.no_border = true;
        w.reconfigure_decoration(&settings(BorderSize::Huge));
        assert_eq!(w.borders().left, 0);
        assert_eq!(w.borders().bottom, 0);
    }

    #[test]
    fn reconfigure_is_deferred_during_operation() {
        let mut w = decorated(BorderSize::Normal);
        let before = w.geometry();
        w.interactive = InteractiveOp::Moving(Grab {
            origin: Point::default(),
            initial: before,
            edges: ResizeEdges::empty(),
        });
        assert!(!w.reconfigure_decoration(&settings(BorderSize::None)));
        assert_eq!(w.geometry(), before);
        assert!(w.has_pending_settings());

        w.interactive = InteractiveOp::None;
        assert!(w.apply_pending_settings());
        assert_eq!(w.borders().left, 0);
        assert!(!w.has_pending_settings());
    }

    #[test]
    fn keep_above_and_below_are_exclusive() {
        let mut w = decorated(BorderSize::Normal);
        w.set_keep_above(true);
        assert_eq!(w.layer(), Layer::Above);
        w.set_keep_below(true);
        assert!(!w.has(StateFlag::KeepAbove));
        assert_eq!(w.layer(), Layer::Below);
        w.toggle(StateFlag::KeepAbove);
        assert!(w.has(StateFlag::KeepAbove));
        assert!(!w.has(StateFlag::KeepBelow));
    }

    #[test]
    fn resize_clamps_to_minimum() {
        let mut w = decorated(BorderSize::Normal);
        w.set_min_client_size(Size::new(100, 50));
        w.resize(Size::new(10, 10));
        assert_eq!(w.geometry().size(), w.minimum_size());
        assert!(w.client_size().width >= 100);
    }

    #[test]
    fn maximize_restores_previous_geometry() {
        let mut w = decorated(BorderSize::Normal);
        let before = w.geometry();
        w.set_maximized(true, Geometry::new(0, 0, 1920, 1080));
        assert_eq!(w.geometry(), Geometry::new(0, 0, 1920, 1080));
        w.set_maximized(false, Geometry::default());
        assert_eq!(w.geometry(), before);
    }
}
