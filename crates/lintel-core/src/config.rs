//! Configuration system.
//!
//! TOML file with one table per concern. Every table has defaults, so an
//! empty file is a valid configuration. The core never caches values
//! derived from it: gesture code reads the live [`Config`] on each event.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cursor::CursorTheme;
use crate::decoration::DecorationSettings;
use crate::input::{MouseButton, BTN_LEFT};

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Decoration layout
    pub decoration: DecorationSettings,

    /// Titlebar mouse actions
    pub mouse: MouseConfig,

    /// Gesture thresholds
    pub input: InputConfig,

    /// Cursor theme
    pub cursor: CursorTheme,
}

/// Operations the titlebar double-click can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WindowOperation {
    #[default]
    OnAllDesktops,
    Maximize,
    Minimize,
    Shade,
    Close,
    KeepAbove,
    KeepBelow,
    Nothing,
}

/// What the mouse wheel does over a titlebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WheelAction {
    /// Step through keep-below, neither, keep-above.
    #[default]
    AboveBelow,
    MaximizeRestore,
    Nothing,
}

/// Titlebar press commands for each mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TitlebarCommand {
    Raise,
    Lower,
    OperationsMenu,
    Minimize,
    #[default]
    Nothing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MouseConfig {
    pub titlebar_double_click: WindowOperation,
    pub titlebar_wheel: WheelAction,
    /// Swap the wheel direction mapping.
    pub invert_wheel: bool,
    pub titlebar_left: TitlebarCommand,
    pub titlebar_middle: TitlebarCommand,
    pub titlebar_right: TitlebarCommand,
}

impl Default for MouseConfig {
    fn default() -> Self {
        Self {
            titlebar_double_click: WindowOperation::OnAllDesktops,
            titlebar_wheel: WheelAction::AboveBelow,
            invert_wheel: false,
            titlebar_left: TitlebarCommand::Raise,
            titlebar_middle: TitlebarCommand::Nothing,
            titlebar_right: TitlebarCommand::OperationsMenu,
        }
    }
}

impl MouseConfig {
    /// Command bound to a non-primary titlebar press.
    pub const fn command_for(&self, button: MouseButton) -> TitlebarCommand {
        match button {
            MouseButton::Left => self.titlebar_left,
            MouseButton::Middle => self.titlebar_middle,
            MouseButton::Right => self.titlebar_right,
            MouseButton::Side | MouseButton::Extra => TitlebarCommand::Nothing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Linux event code of the button that drags and double-clicks.
    pub primary_button: u32,
    pub double_click_interval_ms: u32,
    /// Manhattan distance allowed between the two clicks.
    pub double_click_distance: u32,
    /// Manhattan distance a press must travel before a drag starts.
    pub drag_start_distance: u32,
    /// A press held this long starts the drag without moving.
    pub drag_start_time_ms: u32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            primary_button: BTN_LEFT,
            double_click_interval_ms: 500,
            double_click_distance: 5,
            drag_start_distance: 10,
            drag_start_time_ms: 500,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("input.{0} must be greater than zero")]
    ZeroThreshold(&'static str),

    #[error("decoration.titlebar_height must be greater than zero")]
    ZeroTitlebar,

    #[error("decoration button {0:?} appears more than once")]
    DuplicateButton(crate::decoration::DecorationButton),

    #[error("input.primary_button {0:#x} is not a mouse button")]
    UnknownPrimaryButton(u32),
}

impl Config {
    /// Load configuration from file
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = path.map(PathBuf::from).or_else(Self::find_config_file);

        match config_path {
            Some(path) if path.exists() => {
                info!("Loading configuration from {:?}", path);
                let content = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config file: {path:?}"))?;
                Self::from_toml(&content)
                    .with_context(|| format!("Failed to parse config file: {path:?}"))
            }
            Some(path) => {
                warn!("Config file not found at {:?}, using defaults", path);
                Ok(Self::default())
            }
            None => {
                info!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn find_config_file() -> Option<PathBuf> {
        let candidates = [
            dirs::config_dir().map(|p| p.join("lintel/config.toml")),
            dirs::home_dir().map(|p| p.join(".config/lintel/config.toml")),
            Some(PathBuf::from("/etc/lintel/config.toml")),
        ];

        candidates.into_iter().flatten().find(|p| p.exists())
    }

    /// Generate default configuration as a string
    pub fn default_config_string() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Error generating config"))
    }

    /// Check values serde cannot reject on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let input = &self.input;
        if input.double_click_interval_ms == 0 {
            return Err(ConfigError::ZeroThreshold("double_click_interval_ms"));
        }
        if input.drag_start_distance == 0 {
            return Err(ConfigError::ZeroThreshold("drag_start_distance"));
        }
        if input.drag_start_time_ms == 0 {
            return Err(ConfigError::ZeroThreshold("drag_start_time_ms"));
        }
        if MouseButton::from_code(input.primary_button).is_none() {
            return Err(ConfigError::UnknownPrimaryButton(input.primary_button));
        }
        if self.decoration.titlebar_height == 0 {
            return Err(ConfigError::ZeroTitlebar);
        }

        let buttons = self
            .decoration
            .buttons_left
            .iter()
            .chain(&self.decoration.buttons_right);
        let mut seen = Vec::new();
        for &button in buttons {
            if seen.contains(&button) {
                return Err(ConfigError::DuplicateButton(button));
            }
            seen.push(button);
        }
        Ok(())
    }
}
