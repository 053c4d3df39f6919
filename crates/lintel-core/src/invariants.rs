//! Invariant validation for the core state.
//!
//! Called after every `handle_event` in debug builds.

use crate::Core;

/// Error indicating which invariant was violated.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InvariantError {
    #[error("Input geometry of window {0} does not contain its frame")]
    InputGeometryTooSmall(String),

    #[error("Pointer drives an operation on {0}, which has none")]
    OperationStateMismatch(String),

    #[error("Window {0} has an interactive operation nobody owns")]
    UnownedOperation(String),

    #[error("Operation on window {0} is owned by both pointer and touch")]
    DoublyOwnedOperation(String),

    #[error("Decoration press id {0} has no active contact")]
    DanglingDecorationPress(i32),

    #[error("Touch contact {0} references missing window {1}")]
    ContactWindowMissing(i32, String),

    #[error("Stacking order does not match the window set")]
    StackingMismatch,
}

/// Validate all core invariants. Returns the first violation found.
pub fn validate(core: &Core) -> Result<(), InvariantError> {
    let windows = core.windows();
    let pointer = core.pointer();
    let touch = core.touch();

    // 1. Input geometry contains the visible frame
    for window in windows.iter() {
        if !window.input_geometry().contains_rect(window.geometry()) {
            return Err(InvariantError::InputGeometryTooSmall(format!("{}", window.id)));
        }
    }

    // 2. The pointer's operation exists on its window
    if let Some(id) = pointer.state().operation_window() {
        let active = windows.get(id).is_some_and(|w| w.interactive.is_active());
        if !active {
            return Err(InvariantError::OperationStateMismatch(format!("{id}")));
        }
    }

    // 3. Every operation has exactly one owner
    for window in windows.iter().filter(|w| w.interactive.is_active()) {
        match (pointer.owns_operation(window.id), touch.owns_operation(window.id)) {
            (false, false) => {
                return Err(InvariantError::UnownedOperation(format!("{}", window.id)));
            }
            (true, true) => {
                return Err(InvariantError::DoublyOwnedOperation(format!("{}", window.id)));
            }
            _ => {}
        }
    }

    // 4. Touch bookkeeping only references live contacts and windows
    if let Some(id) = touch.decoration_press_id() {
        if touch.contact(id).is_none() {
            return Err(InvariantError::DanglingDecorationPress(id));
        }
    }
    for contact in touch.contacts() {
        if let Some(window) = contact.window {
            if !windows.contains(window) {
                return Err(InvariantError::ContactWindowMissing(contact.id, format!("{window}")));
            }
        }
    }

    // 5. Stacking lists every window exactly once
    let order = windows.stacking_order();
    if order.len() != windows.len() || order.iter().any(|&id| !windows.contains(id)) {
        return Err(InvariantError::StackingMismatch);
    }

    Ok(())
}
