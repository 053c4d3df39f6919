//! Mapped windows and their stacking order.

use indexmap::IndexMap;
use tracing::debug;

use crate::geometry::Point;
use crate::window::{Window, WindowId};

/// All mapped windows plus a bottom-to-top stacking order that respects
/// the keep-below / normal / keep-above layers.
#[derive(Debug, Default)]
pub struct WindowRegistry {
    windows: IndexMap<WindowId, Window>,
    /// Bottom first.
    stacking: Vec<WindowId>,
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a window on top of its layer.
    pub fn add(&mut self, window: Window) -> WindowId {
        let id = window.id;
        if self.windows.insert(id, window).is_some() {
            self.stacking.retain(|&w| w != id);
        }
        self.place_top_of_layer(id);
        id
    }

    pub fn remove(&mut self, id: WindowId) -> Option<Window> {
        let window = self.windows.shift_remove(&id)?;
        self.stacking.retain(|&w| w != id);
        Some(window)
    }

    pub fn get(&self, id: WindowId) -> Option<&Window> {
        self.windows.get(&id)
    }

    pub fn get_mut(&mut self, id: WindowId) -> Option<&mut Window> {
        self.windows.get_mut(&id)
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.windows.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Windows in mapping order.
    pub fn iter(&self) -> impl Iterator<Item = &Window> {
        self.windows.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Window> {
        self.windows.values_mut()
    }

    /// Stacking order, bottom first.
    pub fn stacking_order(&self) -> &[WindowId] {
        &self.stacking
    }

    /// Windows from the top of the stack down.
    pub fn top_to_bottom(&self) -> impl Iterator<Item = &Window> {
        self.stacking
            .iter()
            .rev()
            .filter_map(|id| self.windows.get(id))
    }

    /// Topmost visible window whose input geometry contains `point`.
    pub fn window_at_input(&self, point: Point) -> Option<WindowId> {
        self.top_to_bottom()
            .find(|w| w.is_visible() && w.input_geometry().contains_point(point))
            .map(|w| w.id)
    }

    /// Move a window to the top of its layer. Returns `true` if the order
    /// changed.
    pub fn raise(&mut self, id: WindowId) -> bool {
        if !self.windows.contains_key(&id) {
            return false;
        }
        let before = self.stacking.clone();
        self.stacking.retain(|&w| w != id);
        self.place_top_of_layer(id);
        self.changed(&before, "raise", id)
    }

    /// Move a window to the bottom of its layer.
    pub fn lower(&mut self, id: WindowId) -> bool {
        let Some(layer) = self.windows.get(&id).map(Window::layer) else {
            return false;
        };
        let before = self.stacking.clone();
        self.stacking.retain(|&w| w != id);
        let index = self
            .stacking
            .iter()
            .position(|w| self.windows.get(w).is_some_and(|w| w.layer() >= layer))
            .unwrap_or(self.stacking.len());
        self.stacking.insert(index, id);
        self.changed(&before, "lower", id)
    }

    /// Re-sort after a window's layer changed. The window goes to the top
    /// of its new layer.
    pub fn restack(&mut self, id: WindowId) -> bool {
        self.raise(id)
    }

    fn place_top_of_layer(&mut self, id: WindowId) {
        let Some(layer) = self.windows.get(&id).map(Window::layer) else {
            return;
        };
        let index = self
            .stacking
            .iter()
            .rposition(|w| self.windows.get(w).is_some_and(|w| w.layer() <= layer))
            .map_or(0, |i| i + 1);
        self.stacking.insert(index, id);
    }

    fn changed(&self, before: &[WindowId], what: &str, id: WindowId) -> bool {
        let changed = before != self.stacking.as_slice();
        if changed {
            debug!("{} {}: stacking now {:?}", what, id, self.stacking);
        }
        changed
    }
}
