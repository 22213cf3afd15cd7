//! Pointer drag sessions over path geometry.
//!
//! A [`DragCoordinator`] owns at most one [`DragSession`]. Sessions capture
//! the original geometry when they start and compute every move against it,
//! so dropped or coalesced frames never accumulate error.

mod cancel;
mod coordinator;
mod session;
mod throttle;

pub use cancel::CancelToken;
pub use coordinator::{DragCoordinator, DragEnv, DragOutcome, DragSurface};
pub use session::{DragContext, DragKind, DragRequest, DragSession, DragTarget, FrameShadow};
pub use throttle::{FrameThrottle, Instant};
