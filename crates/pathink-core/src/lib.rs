//! PathInk Core Library
//!
//! Snapping and drag coordination for a vector path editor: snap sources and
//! resolution, pointer drag sessions with non-cumulative geometry updates,
//! and the transient overlay state drawn on top of the canvas.

pub mod config;
pub mod context;
pub mod document;
pub mod drag;
pub mod error;
pub mod geometry;
pub mod input;
pub mod overlay;
pub mod path;
pub mod snap;
pub mod viewport;

pub use config::{DragConfig, EngineConfig, SnapConfig};
pub use context::EditorContext;
pub use document::{DocumentStore, MemoryDocument};
pub use drag::{
    CancelToken, DragContext, DragCoordinator, DragKind, DragOutcome, DragRequest, DragSurface,
    DragTarget,
};
pub use error::{ConfigError, DragError, SnapSourceError};
pub use input::{CancelReason, Modifiers, PointerButton, SessionEvent, SessionEventKind};
pub use overlay::{OverlayState, OverlayStore, Subscription, TransientStore};
pub use path::{ElementId, GeometryPatch, PathCommand, PathElement, PointRef, Subpath};
pub use snap::{
    SnapContext, SnapManager, SnapPoint, SnapPointKind, SnapProvider, SnapResult, SnapSource,
};
pub use viewport::{Viewport, canvas_to_screen, screen_to_canvas};
