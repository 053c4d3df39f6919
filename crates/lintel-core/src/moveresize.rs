//! Interactive move/resize controller.
//!
//! Stateless: the operation lives in [`Window::interactive`] and these
//! functions operate on a borrowed window for the length of one call.

use tracing::{debug, warn};

use crate::decoration::ResizeEdges;
use crate::geometry::{Geometry, Point, Size};
use crate::window::{Grab, InteractiveMode, InteractiveOp, Window, WindowId};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MoveResizeError {
    #[error("Window {0} already has an interactive operation")]
    AlreadyActive(WindowId),

    #[error("Window {0} has no interactive operation")]
    NotActive(WindowId),

    #[error("Resize on window {0} requested without edges")]
    NoEdges(WindowId),
}

/// Begin an operation anchored at `origin`, the position of the press that
/// armed it.
pub fn start(window: &mut Window, mode: InteractiveMode, origin: Point) -> Result<(), MoveResizeError> {
    if window.interactive.is_active() {
        warn!("Nested move/resize on {} ignored", window.id);
        return Err(MoveResizeError::AlreadyActive(window.id));
    }
    let initial = window.geometry();
    window.interactive = match mode {
        InteractiveMode::Move => InteractiveOp::Moving(Grab {
            origin,
            initial,
            edges: ResizeEdges::empty(),
        }),
        InteractiveMode::Resize(edges) if edges.is_empty() => {
            return Err(MoveResizeError::NoEdges(window.id));
        }
        InteractiveMode::Resize(edges) => InteractiveOp::Resizing(Grab {
            origin,
            initial,
            edges,
        }),
    };
    debug!("{} started {:?} at {}", window.id, mode, initial);
    Ok(())
}

/// Apply the cumulative pointer delta. Returns the new frame geometry when
/// it changed.
pub fn update(window: &mut Window, pointer: Point) -> Option<Geometry> {
    let before = window.geometry();
    match window.interactive {
        InteractiveOp::None => return None,
        InteractiveOp::Moving(grab) => {
            let (dx, dy) = delta(grab.origin, pointer);
            window.move_to(grab.initial.x + dx, grab.initial.y + dy);
        }
        InteractiveOp::Resizing(grab) => {
            let target = resized(grab, pointer, window.minimum_size());
            window.set_geometry(target);
        }
    }
    let after = window.geometry();
    (after != before).then_some(after)
}

/// End the operation and return the final geometry.
pub fn finish(window: &mut Window) -> Result<Geometry, MoveResizeError> {
    if !window.interactive.is_active() {
        return Err(MoveResizeError::NotActive(window.id));
    }
    window.interactive = InteractiveOp::None;
    debug!("{} finished at {}", window.id, window.geometry());
    Ok(window.geometry())
}

fn delta(origin: Point, pointer: Point) -> (i32, i32) {
    (
        (pointer.x - origin.x).round() as i32,
        (pointer.y - origin.y).round() as i32,
    )
}

/// Grow or shrink from the edges in `grab.edges`, keeping the opposite
/// edges fixed and never going below `min`.
fn resized(grab: Grab, pointer: Point, min: Size) -> Geometry {
    let (dx, dy) = delta(grab.origin, pointer);
    let initial = grab.initial;
    let mut g = initial;
    let width = initial.width as i32;
    let height = initial.height as i32;
    let min_w = min.width as i32;
    let min_h = min.height as i32;

    if grab.edges.contains(ResizeEdges::RIGHT) {
        g.width = (width + dx).max(min_w) as u32;
    }
    if grab.edges.contains(ResizeEdges::BOTTOM) {
        g.height = (height + dy).max(min_h) as u32;
    }
    if grab.edges.contains(ResizeEdges::LEFT) {
        let new_w = (width - dx).max(min_w);
        g.x = initial.x + (width - new_w);
        g.width = new_w as u32;
    }
    if grab.edges.contains(ResizeEdges::TOP) {
        let new_h = (height - dy).max(min_h);
        g.y = initial.y + (height - new_h);
        g.height = new_h as u32;
    }
    g
}
