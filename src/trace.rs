//! Recorded input traces.
//!
//! A trace is a JSON array of [`CoreEvent`]s in arrival order, e.g.
//!
//! ```json
//! [
//!   {"event": "window_mapped", "id": 1, "x": 100, "y": 100,
//!    "client_size": {"width": 400, "height": 300}},
//!   {"event": "pointer_motion", "x": 304, "y": 116, "time": 0},
//!   {"event": "pointer_button", "button": 272, "pressed": true, "time": 10}
//! ]
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use lintel_core::{CoreAction, CoreEvent};

/// Read and parse a trace file.
pub fn load(path: impl AsRef<Path>) -> Result<Vec<CoreEvent>> {
    let path = path.as_ref();
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read trace file: {path:?}"))?;
    parse(&content).with_context(|| format!("Failed to parse trace file: {path:?}"))
}

pub fn parse(content: &str) -> Result<Vec<CoreEvent>> {
    Ok(serde_json::from_str(content)?)
}

/// One action as a single JSON line.
pub fn action_line(action: &CoreAction) -> Result<String> {
    Ok(serde_json::to_string(action)?)
}
