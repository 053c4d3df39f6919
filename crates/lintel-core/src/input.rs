//! Raw input vocabulary shared by the pointer and touch redirectors.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Linux `BTN_LEFT`.
pub const BTN_LEFT: u32 = 0x110;
/// Linux `BTN_RIGHT`.
pub const BTN_RIGHT: u32 = 0x111;
/// Linux `BTN_MIDDLE`.
pub const BTN_MIDDLE: u32 = 0x112;
/// Linux `BTN_SIDE`.
pub const BTN_SIDE: u32 = 0x113;
/// Linux `BTN_EXTRA`.
pub const BTN_EXTRA: u32 = 0x114;

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Invalid mouse button: {0}")]
    Button(String),
}

bitflags! {
    /// Keyboard modifiers held while an input event was generated.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT     = 0b0000_0001;
        const CTRL      = 0b0000_0010;
        const ALT       = 0b0000_0100;
        const SUPER     = 0b0000_1000;
    }
}

bitflags! {
    /// Pointer buttons currently held down.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PointerButtons: u8 {
        const LEFT   = 0b0000_0001;
        const RIGHT  = 0b0000_0010;
        const MIDDLE = 0b0000_0100;
        const SIDE   = 0b0000_1000;
        const EXTRA  = 0b0001_0000;
    }
}

/// Mouse buttons the decoration layer distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    Side,
    Extra,
}

impl MouseButton {
    /// Map a Linux event code. Unknown codes are not decoration buttons.
    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            BTN_LEFT => Some(Self::Left),
            BTN_RIGHT => Some(Self::Right),
            BTN_MIDDLE => Some(Self::Middle),
            BTN_SIDE => Some(Self::Side),
            BTN_EXTRA => Some(Self::Extra),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Result<Self, InputError> {
        match name.to_lowercase().as_str() {
            "button1" | "left" | "lmb" => Ok(Self::Left),
            "button2" | "middle" | "mmb" => Ok(Self::Middle),
            "button3" | "right" | "rmb" => Ok(Self::Right),
            "button8" | "side" => Ok(Self::Side),
            "button9" | "extra" => Ok(Self::Extra),
            _ => Err(InputError::Button(name.to_string())),
        }
    }

    pub const fn flag(self) -> PointerButtons {
        match self {
            Self::Left => PointerButtons::LEFT,
            Self::Middle => PointerButtons::MIDDLE,
            Self::Right => PointerButtons::RIGHT,
            Self::Side => PointerButtons::SIDE,
            Self::Extra => PointerButtons::EXTRA,
        }
    }
}

/// Scroll axis of a pointer axis event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisOrientation {
    #[default]
    Vertical,
    Horizontal,
}

/// Milliseconds elapsed from `earlier` to `later` on a wrapping device clock.
pub const fn elapsed_ms(earlier: u32, later: u32) -> u32 {
    later.wrapping_sub(earlier)
}
