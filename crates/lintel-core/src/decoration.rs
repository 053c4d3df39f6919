//! Decoration geometry: sections, borders and titlebar buttons.
//!
//! A [`DecorationRenderer`] describes how a decoration theme lays out its
//! chrome for a given [`DecorationSettings`]. The [`DecorationAdapter`]
//! owned by each decorated window answers hit-test queries against that
//! layout. It caches nothing derived from the frame size, so a settings
//! change is visible to the very next query.

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::geometry::{Borders, Geometry, Point, Size};

/// A named decoration hit-test region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    TitleBar,
    Top,
    Bottom,
    Left,
    Right,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    /// Client area, or no decoration at all.
    #[default]
    None,
}

impl Section {
    pub const fn is_decoration(self) -> bool {
        !matches!(self, Self::None)
    }

    /// The titlebar and the top row of the frame above it.
    ///
    /// Double-click and wheel actions apply here, so a click on the very
    /// top pixel of a maximized window still counts as a titlebar click.
    pub const fn is_titlebar_area(self) -> bool {
        matches!(self, Self::TitleBar | Self::Top | Self::TopLeft | Self::TopRight)
    }

    /// Edges a press on this section would resize.
    pub const fn to_edges(self) -> ResizeEdges {
        match self {
            Self::Top => ResizeEdges::TOP,
            Self::Bottom => ResizeEdges::BOTTOM,
            Self::Left => ResizeEdges::LEFT,
            Self::Right => ResizeEdges::RIGHT,
            Self::TopLeft => ResizeEdges::TOP.union(ResizeEdges::LEFT),
            Self::TopRight => ResizeEdges::TOP.union(ResizeEdges::RIGHT),
            Self::BottomLeft => ResizeEdges::BOTTOM.union(ResizeEdges::LEFT),
            Self::BottomRight => ResizeEdges::BOTTOM.union(ResizeEdges::RIGHT),
            Self::TitleBar | Self::None => ResizeEdges::empty(),
        }
    }
}

bitflags! {
    /// Frame edges that follow the pointer during a resize.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ResizeEdges: u8 {
        const TOP    = 0b0001;
        const BOTTOM = 0b0010;
        const LEFT   = 0b0100;
        const RIGHT  = 0b1000;
    }
}

/// Configured thickness of the side and bottom borders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderSize {
    None,
    NoSides,
    Tiny,
    #[default]
    Normal,
    Large,
    VeryLarge,
    Huge,
    VeryHuge,
    Oversized,
}

/// Titlebar controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecorationButton {
    Close,
    Maximize,
    Minimize,
    OnAllDesktops,
    KeepAbove,
    KeepBelow,
    Menu,
}

/// Decoration layout settings. Read from the `[decoration]` config section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecorationSettings {
    pub border_size: BorderSize,
    pub titlebar_height: u32,
    pub small_spacing: u32,
    pub large_spacing: u32,
    pub buttons_left: Vec<DecorationButton>,
    pub buttons_right: Vec<DecorationButton>,
}

impl Default for DecorationSettings {
    fn default() -> Self {
        Self {
            border_size: BorderSize::Normal,
            titlebar_height: 24,
            small_spacing: 2,
            large_spacing: 8,
            buttons_left: vec![DecorationButton::Menu, DecorationButton::OnAllDesktops],
            buttons_right: vec![
                DecorationButton::Minimize,
                DecorationButton::Maximize,
                DecorationButton::Close,
            ],
        }
    }
}

impl DecorationSettings {
    /// Same settings with the side and bottom borders removed.
    pub fn without_borders(&self) -> Self {
        Self {
            border_size: BorderSize::None,
            ..self.clone()
        }
    }
}

/// Layout provider for a decoration theme.
pub trait DecorationRenderer: fmt::Debug + Send + Sync {
    /// Visible frame borders. `top` includes the titlebar.
    fn borders(&self, settings: &DecorationSettings) -> Borders;

    /// Invisible margins outside the frame that still grab resize presses.
    fn resize_only_borders(&self, settings: &DecorationSettings) -> Borders;

    /// Titlebar rectangle in frame-local coordinates.
    fn title_bar(&self, settings: &DecorationSettings, frame: Size) -> Geometry;

    /// Edge length of one square titlebar button.
    fn button_size(&self, settings: &DecorationSettings) -> u32;

    /// Length of the corner grab along each adjacent edge.
    fn corner_size(&self, settings: &DecorationSettings) -> u32 {
        settings.large_spacing * 2
    }
}

/// The stock decoration: thin borders, a titlebar with a small top margin,
/// and grab margins that make up for missing borders.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRenderer;

impl StandardRenderer {
    const fn title_margin(settings: &DecorationSettings) -> u32 {
        settings.small_spacing * 2
    }
}

impl DecorationRenderer for StandardRenderer {
    fn borders(&self, settings: &DecorationSettings) -> Borders {
        let base = settings.small_spacing;
        let (side, bottom) = match settings.border_size {
            BorderSize::None => (0, 0),
            BorderSize::NoSides => (0, base.max(4)),
            BorderSize::Tiny => (base, base.max(4)),
            BorderSize::Normal => (base * 2, base * 2),
            BorderSize::Large => (base * 3, base * 3),
            BorderSize::VeryLarge => (base * 4, base * 4),
            BorderSize::Huge => (base * 5, base * 5),
            BorderSize::VeryHuge => (base * 6, base * 6),
            BorderSize::Oversized => (base * 10, base * 10),
        };
        Borders::new(
            side,
            side,
            Self::title_margin(settings) + settings.titlebar_height,
            bottom,
        )
    }

    fn resize_only_borders(&self, settings: &DecorationSettings) -> Borders {
        let extend = settings.large_spacing;
        match settings.border_size {
            BorderSize::None => Borders::new(extend, extend, 0, extend),
            BorderSize::NoSides => Borders::new(extend, extend, 0, 0),
            _ => Borders::default(),
        }
    }

    fn title_bar(&self, settings: &DecorationSettings, frame: Size) -> Geometry {
        let b = self.borders(settings);
        let margin = Self::title_margin(settings);
        Geometry::new(
            b.left as i32,
            margin as i32,
            frame.width.saturating_sub(b.left + b.right),
            settings.titlebar_height,
        )
    }

    fn button_size(&self, settings: &DecorationSettings) -> u32 {
        settings.titlebar_height
    }
}

/// Per-window handle onto a renderer plus the settings it was last
/// configured with.
#[derive(Debug, Clone)]
pub struct DecorationAdapter {
    renderer: Arc<dyn DecorationRenderer>,
    settings: DecorationSettings,
}

impl DecorationAdapter {
    pub fn new(renderer: Arc<dyn DecorationRenderer>, settings: DecorationSettings) -> Self {
        Self { renderer, settings }
    }

    pub const fn settings(&self) -> &DecorationSettings {
        &self.settings
    }

    /// Swap in new settings. Takes effect on the next query.
    pub fn reconfigure(&mut self, settings: DecorationSettings) {
        self.settings = settings;
    }

    pub fn borders(&self) -> Borders {
        self.renderer.borders(&self.settings)
    }

    pub fn resize_only_borders(&self) -> Borders {
        self.renderer.resize_only_borders(&self.settings)
    }

    pub fn title_bar(&self, frame: Size) -> Geometry {
        self.renderer.title_bar(&self.settings, frame)
    }

    /// Smallest frame that still fits the borders, the buttons and a
    /// button-sized stretch of title.
    pub fn minimum_size(&self) -> Size {
        let b = self.borders();
        let buttons = (self.settings.buttons_left.len() + self.settings.buttons_right.len()) as u32;
        let button = self.renderer.button_size(&self.settings);
        Size::new(b.left + b.right + button * (buttons + 1), b.top + b.bottom)
    }

    /// Rectangles of every titlebar button, in frame-local coordinates.
    pub fn buttons(&self, frame: Size) -> Vec<(DecorationButton, Geometry)> {
        let title = self.title_bar(frame);
        let size = self.renderer.button_size(&self.settings);
        let step = size as i32;
        let mut buttons = Vec::new();

        let mut x = title.x;
        for &button in &self.settings.buttons_left {
            if x + step > title.right() {
                break;
            }
            buttons.push((button, Geometry::new(x, title.y, size, size)));
            x += step;
        }

        let left_edge = x;
        let mut x = title.right();
        for &button in self.settings.buttons_right.iter().rev() {
            if x - step < left_edge {
                break;
            }
            x -= step;
            buttons.push((button, Geometry::new(x, title.y, size, size)));
        }

        buttons
    }

    pub fn button_at(&self, local: Point, frame: Size) -> Option<DecorationButton> {
        let (x, y) = local.to_pixel();
        self.buttons(frame)
            .into_iter()
            .find(|(_, rect)| rect.contains(x, y))
            .map(|(button, _)| button)
    }

    /// Resolve the section under a frame-local point.
    ///
    /// `local` may lie outside the frame, in the resize-only margins; such
    /// points always resolve to an edge or corner.
    pub fn section_at(&self, local: Point, frame: Size) -> Section {
        let (x, y) = local.to_pixel();
        let title = self.title_bar(frame);
        if title.contains(x, y) {
            return Section::TitleBar;
        }

        let b = self.borders();
        let w = frame.width as i32;
        let h = frame.height as i32;
        let corner = self.renderer.corner_size(&self.settings) as i32;

        let left = x < b.left as i32;
        let right = x >= w - b.right as i32;
        let top = y < b.top as i32;
        let bottom = y >= h - b.bottom as i32;

        if left {
            if top && y < title.y + corner {
                Section::TopLeft
            } else if bottom && y >= h - corner {
                Section::BottomLeft
            } else {
                Section::Left
            }
        } else if right {
            if top && y < title.y + corner {
                Section::TopRight
            } else if bottom && y >= h - corner {
                Section::BottomRight
            } else {
                Section::Right
            }
        } else if top {
            if x < corner {
                Section::TopLeft
            } else if x >= w - corner {
                Section::TopRight
            } else {
                Section::Top
            }
        } else if bottom {
            if x < corner {
                Section::BottomLeft
            } else if x >= w - corner {
                Section::BottomRight
            } else {
                Section::Bottom
            }
        } else {
            Section::None
        }
    }
}
