//! Lintel Core - decoration input routing and interactive move/resize
//!
//! This crate turns raw pointer and touch input over window decorations
//! into cursor feedback, window state toggles and interactive moves and
//! resizes, with zero dependencies on display protocols.
//!
//! Backends translate protocol events into [`CoreEvent`]s, feed them to
//! [`Core`], and apply the returned [`CoreAction`]s back to the display
//! server.
//!
//! # Quick Start
//! ```
//! use lintel_core::{Core, CoreAction, CoreEvent};
//! use lintel_core::config::Config;
//! use lintel_core::geometry::Size;
//! use lintel_core::input::BTN_LEFT;
//!
//! let mut core = Core::new(Config::default());
//!
//! // Backend tells core a window appeared
//! let id = core.next_window_id();
//! core.handle_event(CoreEvent::WindowMapped {
//!     id,
//!     title: "xterm".into(),
//!     x: 100,
//!     y: 100,
//!     client_size: Size::new(400, 300),
//!     decorated: true,
//!     no_border: false,
//!     min_client_size: None,
//! });
//!
//! // Grab the left border and drag it outwards
//! core.handle_event(CoreEvent::PointerMotion { x: 100.0, y: 266.0, time: 0 });
//! core.handle_event(CoreEvent::PointerButton { button: BTN_LEFT, pressed: true, time: 10 });
//! let actions = core.handle_event(CoreEvent::PointerMotion { x: 80.0, y: 266.0, time: 20 });
//! assert!(actions.iter().any(|a| matches!(a, CoreAction::OperationStarted { .. })));
//! ```

pub mod config;
pub mod context;
pub mod cursor;
pub mod decoration;
pub mod event;
pub mod geometry;
pub mod gesture;
pub mod input;
pub mod invariants;
pub mod moveresize;
mod operations;
pub mod pointer;
pub mod registry;
pub mod touch;
pub mod window;

// Re-export primary API types at crate root
pub use event::{CoreAction, CoreEvent};
pub use geometry::{Geometry, Point, Size};
pub use window::WindowId;

use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use config::Config;
use context::InputContext;
use cursor::{Cursor, CursorBackend, InputCursor};
use decoration::{DecorationAdapter, DecorationRenderer, StandardRenderer};
use input::AxisOrientation;
use pointer::PointerRedirector;
use registry::WindowRegistry;
use touch::TouchRedirector;
use window::Window;

/// The protocol-agnostic decoration input engine.
///
/// Owns the windows, the cursor and both redirectors. Backends drive it via
/// [`handle_event`](Core::handle_event), then apply the returned
/// [`CoreAction`]s.
pub struct Core {
    config: Config,
    windows: WindowRegistry,
    cursor: Cursor,
    pointer: PointerRedirector,
    touch: TouchRedirector,
    /// Shared by every window's decoration adapter
    renderer: Arc<dyn DecorationRenderer>,
    /// Maximize target
    work_area: Geometry,
    /// Monotonic window ID counter
    next_wid: u64,
}

impl Core {
    /// Create a new core with the stock decoration and an input-only cursor.
    pub fn new(config: Config) -> Self {
        Self::with_parts(config, Arc::new(StandardRenderer), Box::new(InputCursor))
    }

    /// Create a core with a custom decoration layout and cursor platform.
    pub fn with_parts(
        config: Config,
        renderer: Arc<dyn DecorationRenderer>,
        cursor_backend: Box<dyn CursorBackend>,
    ) -> Self {
        let cursor = Cursor::new(cursor_backend, &config.cursor);
        info!(
            "Core ready: border {:?}, cursor theme {}",
            config.decoration.border_size,
            cursor.theme_name()
        );
        Self {
            config,
            windows: WindowRegistry::new(),
            cursor,
            pointer: PointerRedirector::new(),
            touch: TouchRedirector::new(),
            renderer,
            work_area: Geometry::new(0, 0, 1920, 1080),
            next_wid: 1,
        }
    }

    /// Generate a fresh, unique `WindowId`.
    ///
    /// Backends call this when a new surface appears and before sending
    /// [`CoreEvent::WindowMapped`].
    pub fn next_window_id(&mut self) -> WindowId {
        let id = WindowId(self.next_wid);
        self.next_wid += 1;
        id
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    pub const fn windows(&self) -> &WindowRegistry {
        &self.windows
    }

    pub fn window(&self, id: WindowId) -> Option<&Window> {
        self.windows.get(id)
    }

    pub const fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Mutable cursor access, for listeners and the polling/tracking modes.
    pub fn cursor_mut(&mut self) -> &mut Cursor {
        &mut self.cursor
    }

    pub const fn pointer(&self) -> &PointerRedirector {
        &self.pointer
    }

    pub const fn touch(&self) -> &TouchRedirector {
        &self.touch
    }

    pub const fn work_area(&self) -> Geometry {
        self.work_area
    }

    /// Validate core invariants. See `invariants` module.
    pub fn validate_invariants(&self) -> Result<(), invariants::InvariantError> {
        invariants::validate(self)
    }

    // ── Event handling (backend → core) ──────────────────────────────

    /// Process a backend event. Returns actions the backend must apply.
    pub fn handle_event(&mut self, event: CoreEvent) -> Vec<CoreAction> {
        trace!("event: {:?}", event);
        let actions = match event {
            CoreEvent::WindowMapped {
                id,
                title,
                x,
                y,
                client_size,
                decorated,
                no_border,
                min_client_size,
            } => self.on_window_mapped(id, title, (x, y), client_size, decorated, no_border, min_client_size),

            CoreEvent::WindowUnmapped { id } => self.on_window_unmapped(id),

            CoreEvent::ActivateRequested { id } => self.on_activate_requested(id),

            CoreEvent::WorkAreaChanged { geometry } => {
                debug!("work area {}", geometry);
                self.work_area = geometry;
                Vec::new()
            }

            CoreEvent::Reconfigure { config } => self.reload_config(*config),

            CoreEvent::PointerMotion { x, y, time } => {
                self.pointer_input(|pointer, ctx| pointer.on_motion(ctx, Point::new(x, y), time))
            }

            CoreEvent::PointerButton { button, pressed, time } => {
                self.pointer_input(|pointer, ctx| pointer.on_button(ctx, button, pressed, time))
            }

            CoreEvent::PointerAxis {
                orientation,
                delta,
                time: _,
            } => self.on_pointer_axis(orientation, delta),

            CoreEvent::TouchDown { id, x, y, time } => {
                self.on_touch(|touch, ctx| touch.down(ctx, id, Point::new(x, y), time))
            }

            CoreEvent::TouchMotion { id, x, y, time } => {
                self.on_touch(|touch, ctx| touch.motion(ctx, id, Point::new(x, y), time))
            }

            CoreEvent::TouchUp { id, time } => self.on_touch(|touch, ctx| touch.up(ctx, id, time)),

            CoreEvent::TouchCancel { time: _ } => self.on_touch(|touch, ctx| touch.cancel_all(ctx)),

            CoreEvent::Tick { time } => self.on_tick(time),
        };

        self.finish(actions)
    }

    /// Run one tick of the event loop at device time `time`.
    pub fn tick(&mut self, time: u32) -> Vec<CoreAction> {
        let actions = self.on_tick(time);
        self.finish(actions)
    }

    /// Warp the pointer to `pos`.
    pub fn warp_pointer(&mut self, pos: Point) -> Vec<CoreAction> {
        self.cursor.set_pos(pos);
        self.finish(Vec::new())
    }

    /// Apply a new configuration. Windows in the middle of a move or
    /// resize pick up the new decoration settings when it finishes.
    pub fn reload_config(&mut self, config: Config) -> Vec<CoreAction> {
        if let Err(e) = config.validate() {
            warn!("Ignoring invalid configuration: {}", e);
            return Vec::new();
        }
        info!("Reloading configuration");
        self.config = config;

        let mut actions = Vec::new();
        for window in self.windows.iter_mut() {
            if window.reconfigure_decoration(&self.config.decoration) {
                actions.push(CoreAction::geometry(window.id, window.geometry()));
            }
        }
        if !self.config.cursor.name.is_empty() {
            self.cursor.set_theme(self.config.cursor.clone());
        }
        actions.extend(self.refresh_pointer());
        actions
    }

    // ── Event handlers ───────────────────────────────────────────────

    #[allow(clippy::too_many_arguments)]
    fn on_window_mapped(
        &mut self,
        id: WindowId,
        title: String,
        origin: (i32, i32),
        client_size: Size,
        decorated: bool,
        no_border: bool,
        min_client_size: Option<Size>,
    ) -> Vec<CoreAction> {
        if self.windows.contains(id) {
            warn!("Window {} mapped twice, ignoring", id);
            return Vec::new();
        }
        let settings = if no_border {
            self.config.decoration.without_borders()
        } else {
            self.config.decoration.clone()
        };
        let decoration = decorated.then(|| DecorationAdapter::new(Arc::clone(&self.renderer), settings));
        let mut window = Window::new(id, title, origin, client_size, decoration);
        window.no_border = no_border;
        if let Some(min) = min_client_size {
            window.set_min_client_size(min);
        }
        info!("Window mapped: {} '{}' at {}", id, window.title, window.geometry());

        let geometry = window.geometry();
        self.windows.add(window);
        let mut actions = vec![
            CoreAction::geometry(id, geometry),
            CoreAction::StackingChanged {
                order: self.windows.stacking_order().to_vec(),
            },
        ];
        actions.extend(self.refresh_pointer());
        actions
    }

    fn on_window_unmapped(&mut self, id: WindowId) -> Vec<CoreAction> {
        if !self.windows.contains(id) {
            debug!("Unmap for unknown window {}", id);
            return Vec::new();
        }
        let mut actions = self.pointer_input(|pointer, ctx| pointer.forget_window(ctx, id));
        actions.extend(self.touch_input(|touch, ctx| touch.forget_window(ctx, id)));
        self.windows.remove(id);
        info!("Window unmapped: {}", id);
        actions.extend(self.refresh_pointer());
        actions
    }

    fn on_activate_requested(&mut self, id: WindowId) -> Vec<CoreAction> {
        if !self.windows.raise(id) {
            return Vec::new();
        }
        let mut actions = vec![CoreAction::StackingChanged {
            order: self.windows.stacking_order().to_vec(),
        }];
        actions.extend(self.refresh_pointer());
        actions
    }

    fn on_pointer_axis(&mut self, orientation: AxisOrientation, delta: f64) -> Vec<CoreAction> {
        self.pointer_input(|pointer, ctx| pointer.on_axis(ctx, orientation, delta))
    }

    /// Touch can move, restack or hide windows under a resting pointer.
    fn on_touch(&mut self, f: impl FnOnce(&mut TouchRedirector, &mut InputContext<'_>)) -> Vec<CoreAction> {
        let mut actions = self.touch_input(f);
        actions.extend(self.refresh_pointer());
        actions
    }

    fn on_tick(&mut self, time: u32) -> Vec<CoreAction> {
        self.cursor.poll();
        let mut actions = self.pointer_input(|pointer, ctx| pointer.on_tick(ctx, time));
        actions.extend(self.touch_input(|touch, ctx| touch.on_tick(ctx, time)));
        actions
    }

    // ── Helpers ──────────────────────────────────────────────────────

    fn pointer_input(
        &mut self,
        f: impl FnOnce(&mut PointerRedirector, &mut InputContext<'_>),
    ) -> Vec<CoreAction> {
        let mut actions = Vec::new();
        let mut ctx = InputContext {
            windows: &mut self.windows,
            cursor: &mut self.cursor,
            config: &self.config,
            work_area: self.work_area,
            actions: &mut actions,
        };
        f(&mut self.pointer, &mut ctx);
        actions
    }

    fn refresh_pointer(&mut self) -> Vec<CoreAction> {
        self.pointer_input(|pointer, ctx| pointer.refresh(ctx))
    }

    fn touch_input(&mut self, f: impl FnOnce(&mut TouchRedirector, &mut InputContext<'_>)) -> Vec<CoreAction> {
        let mut actions = Vec::new();
        let mut ctx = InputContext {
            windows: &mut self.windows,
            cursor: &mut self.cursor,
            config: &self.config,
            work_area: self.work_area,
            actions: &mut actions,
        };
        f(&mut self.touch, &mut ctx);
        actions
    }

    /// Append pending pointer warps and check invariants.
    fn finish(&mut self, mut actions: Vec<CoreAction>) -> Vec<CoreAction> {
        actions.extend(
            self.cursor
                .take_warps()
                .into_iter()
                .map(|pos| CoreAction::WarpPointer { x: pos.x, y: pos.y }),
        );

        #[cfg(debug_assertions)]
        if let Err(e) = self.validate_invariants() {
            warn!("Invariant violation after handle_event: {}", e);
        }

        actions
    }
}
