//! Snapping: candidate sources, the registration table, and resolution.
//!
//! Sources contribute [`SnapPoint`]s for a [`SnapContext`]; the
//! [`SnapManager`] picks the closest one within a zoom-independent screen
//! tolerance, breaking near-ties by priority.

mod manager;
mod registry;
mod source;
mod sources;
mod types;

pub use manager::{SnapManager, TIE_EPSILON};
pub use registry::{ActivationFn, SnapProvider, SnapSourceRegistry};
pub use source::{FnSnapSource, SnapSource};
pub use sources::{
    AnchorSource, BoundsSource, GRID_ELEMENT_ID, GridSource, IntersectionSource, MidpointSource,
    PathEdgeSource, bounds_snap_points,
};
pub use types::{DragPointInfo, SnapContext, SnapLine, SnapPoint, SnapPointKind, SnapResult};
