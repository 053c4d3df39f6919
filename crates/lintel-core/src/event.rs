//! Protocol-agnostic events and actions.
//!
//! [`CoreEvent`] represents what the backend tells core.
//! [`CoreAction`] represents what core tells the backend to do.
//!
//! Both serialize as internally tagged JSON objects so input traces can be
//! recorded and replayed.

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::cursor::CursorShape;
use crate::decoration::DecorationButton;
use crate::geometry::{Geometry, Size};
use crate::input::AxisOrientation;
use crate::window::{InteractiveMode, StateFlag, WindowId};

const fn yes() -> bool {
    true
}

/// Events that a backend sends to the core engine.
///
/// Timestamps are device milliseconds, non-decreasing per input source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CoreEvent {
    /// A new window has been mapped. `x`/`y` is the frame origin.
    WindowMapped {
        id: WindowId,
        #[serde(default)]
        title: String,
        x: i32,
        y: i32,
        client_size: Size,
        #[serde(default = "yes")]
        decorated: bool,
        #[serde(default)]
        no_border: bool,
        #[serde(default)]
        min_client_size: Option<Size>,
    },

    /// A window has been unmapped (closed/destroyed).
    WindowUnmapped { id: WindowId },

    /// A window asked to be activated.
    ActivateRequested { id: WindowId },

    /// Usable screen area changed (maximize target).
    WorkAreaChanged { geometry: Geometry },

    /// Configuration was reloaded.
    Reconfigure { config: Box<Config> },

    /// Pointer moved to absolute position.
    PointerMotion {
        x: f64,
        y: f64,
        #[serde(default)]
        time: u32,
    },

    /// Pointer button press/release. `button` uses Linux event codes.
    PointerButton {
        button: u32,
        pressed: bool,
        #[serde(default)]
        time: u32,
    },

    /// Scroll. Positive vertical deltas scroll down.
    PointerAxis {
        #[serde(default)]
        orientation: AxisOrientation,
        delta: f64,
        #[serde(default)]
        time: u32,
    },

    TouchDown {
        id: i32,
        x: f64,
        y: f64,
        #[serde(default)]
        time: u32,
    },

    TouchMotion {
        id: i32,
        x: f64,
        y: f64,
        #[serde(default)]
        time: u32,
    },

    TouchUp {
        id: i32,
        #[serde(default)]
        time: u32,
    },

    /// The touch sequence was taken away (all contacts end).
    TouchCancel {
        #[serde(default)]
        time: u32,
    },

    /// Frame tick. Drives time-based drag starts and mouse polling.
    Tick {
        #[serde(default)]
        time: u32,
    },
}

/// Actions that core returns to the backend for execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CoreAction {
    /// Set the frame geometry (position + size) of a window.
    SetWindowGeometry {
        id: WindowId,
        x: i32,
        y: i32,
        w: u32,
        h: u32,
    },

    /// An interactive move or resize began.
    OperationStarted { id: WindowId, mode: InteractiveMode },

    /// The interactive operation on `id` ended.
    OperationFinished { id: WindowId },

    /// Show a different cursor image.
    SetCursor { shape: CursorShape },

    /// Move the hardware pointer.
    WarpPointer { x: f64, y: f64 },

    /// A window state flag flipped.
    WindowStateChanged {
        id: WindowId,
        flag: StateFlag,
        enabled: bool,
    },

    /// New stacking order, bottom first.
    StackingChanged { order: Vec<WindowId> },

    /// A titlebar button was clicked.
    DecorationButtonClicked { id: WindowId, button: DecorationButton },

    /// Request that the backend close a window.
    RequestClose { id: WindowId },

    /// Open the window operations menu at a global position.
    ShowWindowMenu { id: WindowId, x: i32, y: i32 },
}

impl CoreAction {
    pub const fn geometry(id: WindowId, g: Geometry) -> Self {
        Self::SetWindowGeometry {
            id,
            x: g.x,
            y: g.y,
            w: g.width,
            h: g.height,
        }
    }
}
