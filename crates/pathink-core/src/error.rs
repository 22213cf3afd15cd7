//! Error types for the snapping and drag engine.

use crate::input::PointerButton;
use thiserror::Error;

/// Failure reported by a single snap source while producing candidates.
///
/// The resolver never propagates these; they are logged and the failing
/// source contributes no candidates for that query.
#[derive(Debug, Error)]
pub enum SnapSourceError {
    #[error("Element not found: {0}")]
    MissingElement(String),
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error("Snap source error: {0}")]
    Other(String),
}

/// Errors raised when a drag session cannot be started.
#[derive(Debug, Error, PartialEq)]
pub enum DragError {
    #[error("Element not found: {0}")]
    UnknownElement(String),
    #[error("Element {element_id} has no subpath {subpath_index}")]
    InvalidSubpath {
        element_id: String,
        subpath_index: usize,
    },
    #[error("Element {element_id} has no command {command_index} in subpath {subpath_index}")]
    InvalidCommand {
        element_id: String,
        subpath_index: usize,
        command_index: usize,
    },
    #[error("Nothing to drag: selection is empty")]
    EmptySelection,
    #[error("Drags start on the primary button, got {0:?}")]
    UnsupportedButton(PointerButton),
}

/// Errors raised while loading engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Result type for starting drag sessions.
pub type DragResult<T> = Result<T, DragError>;
