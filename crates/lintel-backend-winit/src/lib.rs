//! Lintel Winit Backend - Adapter between a host window system and lintel-core.
//!
//! This crate:
//! - Maintains a mapping from protocol surface handles to `WindowId`.
//! - Reports the host pointer to the core's cursor tracker.
//! - Feeds `CoreEvent`s to `Core` through a calloop event loop.
//! - Applies returned `CoreAction`s back to the protocol world.
//!
//! **No host window system types leak into `lintel-core`.**

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, ensure, Result};
use calloop::channel::{channel, Event};
use calloop::EventLoop;
use tracing::{debug, info, trace};

use lintel_core::config::Config;
use lintel_core::cursor::{CursorBackend, CursorShape, CursorTheme};
use lintel_core::decoration::StandardRenderer;
use lintel_core::event::{CoreAction, CoreEvent};
use lintel_core::{Core, Geometry, Point, Size, WindowId};

/// Protocol-side handle for a window surface.
///
/// In a real integration this would wrap the host's window or surface
/// object. For now it's a placeholder demonstrating the mapping pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(pub u64);

/// Pointer state as last reported by the host.
#[derive(Debug, Default)]
struct HostPointer {
    position: Option<Point>,
    polling: bool,
}

/// Cursor platform over the host window system.
///
/// The host reports positions through input events; the backend records
/// them here so polling reads the same value the host last delivered.
#[derive(Debug, Clone, Default)]
pub struct HostCursor {
    pointer: Rc<RefCell<HostPointer>>,
}

impl HostCursor {
    fn report(&self, pos: Point) {
        self.pointer.borrow_mut().position = Some(pos);
    }

    pub fn is_polling(&self) -> bool {
        self.pointer.borrow().polling
    }
}

impl CursorBackend for HostCursor {
    fn query_position(&mut self) -> Option<Point> {
        self.pointer.borrow().position
    }

    fn warp(&mut self, pos: Point) {
        trace!("host warp to {:.1},{:.1}", pos.x, pos.y);
        self.pointer.borrow_mut().position = Some(pos);
    }

    /// Theme from the standard `XCURSOR_THEME` / `XCURSOR_SIZE` variables.
    fn theme(&self) -> Option<CursorTheme> {
        let name = std::env::var("XCURSOR_THEME").ok().filter(|n| !n.is_empty())?;
        let size = std::env::var("XCURSOR_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| CursorTheme::default().size);
        Some(CursorTheme { name, size })
    }

    fn start_polling(&mut self) {
        self.pointer.borrow_mut().polling = true;
    }

    fn stop_polling(&mut self) {
        self.pointer.borrow_mut().polling = false;
    }
}

/// The backend adapter.
///
/// Owns the event loop, protocol connections, and the core engine.
pub struct WinitBackend {
    /// The protocol-agnostic core.
    pub core: Core,
    host: HostCursor,
    /// Protocol surface → core WindowId mapping.
    surface_map: HashMap<SurfaceHandle, WindowId>,
    /// Reverse mapping for applying actions.
    window_to_surface: HashMap<WindowId, SurfaceHandle>,
    /// Frame geometry last configured per surface.
    configured: HashMap<SurfaceHandle, Geometry>,
    /// Cursor image currently shown.
    cursor_shape: CursorShape,
    /// Windows currently in an interactive move/resize.
    grabbed: Vec<WindowId>,
    /// Next surface handle counter (placeholder).
    next_surface: u64,
    /// Cleared when the event source closes.
    running: bool,
}

impl WinitBackend {
    pub fn new(config: Config) -> Self {
        let host = HostCursor::default();
        let core = Core::with_parts(config, Arc::new(StandardRenderer), Box::new(host.clone()));
        Self {
            core,
            host,
            surface_map: HashMap::new(),
            window_to_surface: HashMap::new(),
            configured: HashMap::new(),
            cursor_shape: CursorShape::Arrow,
            grabbed: Vec::new(),
            next_surface: 1,
            running: false,
        }
    }

    /// Register a new surface and return the core `WindowId`.
    pub fn register_surface(&mut self) -> (SurfaceHandle, WindowId) {
        let handle = SurfaceHandle(self.next_surface);
        self.next_surface += 1;
        let wid = self.core.next_window_id();
        self.surface_map.insert(handle, wid);
        self.window_to_surface.insert(wid, handle);
        (handle, wid)
    }

    /// Register a surface and map it as a decorated window.
    pub fn map_surface(&mut self, title: &str, x: i32, y: i32, client_size: Size) -> SurfaceHandle {
        let (handle, id) = self.register_surface();
        let actions = self.handle_protocol_event(CoreEvent::WindowMapped {
            id,
            title: title.into(),
            x,
            y,
            client_size,
            decorated: true,
            no_border: false,
            min_client_size: None,
        });
        self.apply_actions(&actions);
        handle
    }

    /// Remove a surface mapping and tell core the window is gone.
    pub fn unregister_surface(&mut self, handle: SurfaceHandle) -> Option<WindowId> {
        let wid = self.surface_map.remove(&handle)?;
        let actions = self.core.handle_event(CoreEvent::WindowUnmapped { id: wid });
        self.apply_actions(&actions);
        self.window_to_surface.remove(&wid);
        self.configured.remove(&handle);
        Some(wid)
    }

    pub fn window_for(&self, handle: SurfaceHandle) -> Option<WindowId> {
        self.surface_map.get(&handle).copied()
    }

    pub fn surface_geometry(&self, handle: SurfaceHandle) -> Option<Geometry> {
        self.configured.get(&handle).copied()
    }

    pub const fn cursor_shape(&self) -> CursorShape {
        self.cursor_shape
    }

    pub fn is_grabbed(&self, id: WindowId) -> bool {
        self.grabbed.contains(&id)
    }

    /// Translate a protocol event into a `CoreEvent` and process it.
    pub fn handle_protocol_event(&mut self, event: CoreEvent) -> Vec<CoreAction> {
        if let CoreEvent::PointerMotion { x, y, .. } = event {
            self.host.report(Point::new(x, y));
        }
        self.core.handle_event(event)
    }

    /// Apply a list of core actions to the protocol world.
    pub fn apply_actions(&mut self, actions: &[CoreAction]) {
        for action in actions {
            match action {
                CoreAction::SetWindowGeometry { id, x, y, w, h } => {
                    if let Some(&surface) = self.window_to_surface.get(id) {
                        // In real backend: configure the host window
                        trace!("Configure surface for {id}: {x},{y} {w}x{h}");
                        self.configured.insert(surface, Geometry::new(*x, *y, *w, *h));
                    }
                }
                CoreAction::OperationStarted { id, mode } => {
                    debug!("Interactive {mode:?} started on {id}");
                    self.grabbed.push(*id);
                }
                CoreAction::OperationFinished { id } => {
                    debug!("Interactive operation finished on {id}");
                    self.grabbed.retain(|w| w != id);
                }
                CoreAction::SetCursor { shape } => {
                    // In real backend: load the theme image by name
                    trace!("Cursor image {} ({:?})", shape.name(), shape);
                    self.cursor_shape = *shape;
                }
                CoreAction::WarpPointer { x, y } => {
                    trace!("Warp pointer to {x:.1},{y:.1}");
                }
                CoreAction::WindowStateChanged { id, flag, enabled } => {
                    trace!("State {flag:?} of {id} -> {enabled}");
                }
                CoreAction::StackingChanged { order } => {
                    trace!("Stacking order (bottom first): {order:?}");
                }
                CoreAction::DecorationButtonClicked { id, button } => {
                    trace!("Decoration button {button:?} clicked on {id}");
                }
                CoreAction::RequestClose { id } => {
                    if let Some(_surface) = self.window_to_surface.get(id) {
                        // In real backend: send close request to client
                        trace!("Close request for {id}");
                    }
                }
                CoreAction::ShowWindowMenu { id, x, y } => {
                    trace!("Window menu for {id} at {x},{y}");
                }
            }
        }
    }

    /// Run the backend event loop until `events` is exhausted.
    ///
    /// Events travel through a calloop channel, the same way a host input
    /// thread would deliver them.
    pub fn run(&mut self, events: Vec<CoreEvent>) -> Result<()> {
        info!("Starting Lintel (winit backend)");
        info!("  - Windows: {}", self.core.windows().len());
        info!("  - Cursor theme: {}", self.core.cursor().theme_name());

        let mut event_loop = EventLoop::<Self>::try_new()
            .map_err(|e| anyhow!("Failed to create event loop: {}", e))?;
        let (sender, source) = channel::<CoreEvent>();
        event_loop
            .handle()
            .insert_source(source, |event, _, backend: &mut Self| match event {
                Event::Msg(event) => {
                    let actions = backend.handle_protocol_event(event);
                    backend.apply_actions(&actions);
                }
                Event::Closed => backend.running = false,
            })
            .map_err(|e| anyhow!("Failed to register input source: {}", e.error))?;

        let count = events.len();
        for event in events {
            sender
                .send(event)
                .map_err(|_| anyhow!("Input channel closed early"))?;
        }
        drop(sender);

        self.running = true;
        // Each dispatch drains at least one message, plus one for Closed.
        let mut budget = count + 2;
        while self.running && budget > 0 {
            event_loop
                .dispatch(Some(Duration::from_millis(10)), self)
                .map_err(|e| anyhow!("Event loop dispatch failed: {}", e))?;
            budget -= 1;
        }

        info!("Lintel shutdown complete");
        Ok(())
    }
}

/// Run headless integration test through the backend adapter.
///
/// Maps one window, drags its titlebar 40 px to the right through the event
/// loop, and reports whether the surface ended up configured there.
pub fn run_headless_test(config: Config) -> Result<bool> {
    let mut backend = WinitBackend::new(config);
    let surface = backend.map_surface("headless", 100, 100, Size::new(400, 300));
    let start = backend
        .surface_geometry(surface)
        .ok_or_else(|| anyhow!("Mapped surface was never configured"))?;
    let title = start.center();
    // Titlebar row of the frame.
    let y = f64::from(start.y) + 16.0;
    let primary = backend.core.config().input.primary_button;

    backend.run(vec![
        CoreEvent::PointerMotion { x: title.x, y, time: 0 },
        CoreEvent::PointerButton {
            button: primary,
            pressed: true,
            time: 10,
        },
        CoreEvent::PointerMotion {
            x: title.x + 40.0,
            y,
            time: 20,
        },
        CoreEvent::PointerButton {
            button: primary,
            pressed: false,
            time: 30,
        },
    ])?;

    let id = backend
        .window_for(surface)
        .ok_or_else(|| anyhow!("Surface lost its window"))?;
    ensure!(!backend.is_grabbed(id), "Operation still active after release");

    let moved = backend.surface_geometry(surface) == Some(start.translated(40, 0));
    Ok(moved)
}
