//! The snap source contract.

use super::types::{SnapContext, SnapPoint};
use crate::error::SnapSourceError;
use kurbo::Point;

/// A supplier of candidate snap points.
///
/// Sources must return finite coordinates; the resolver does not check.
pub trait SnapSource {
    /// Registration key. At most one source per id is registered.
    fn id(&self) -> &str;

    /// Whether this source currently contributes candidates.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Candidates near `point` for the given interaction.
    fn snap_points(
        &self,
        ctx: &SnapContext<'_>,
        point: Point,
    ) -> Result<Vec<SnapPoint>, SnapSourceError>;
}

type SnapFn = dyn Fn(&SnapContext<'_>, Point) -> Result<Vec<SnapPoint>, SnapSourceError>;

/// A source backed by a closure, for plugins that don't need their own type.
pub struct FnSnapSource {
    id: String,
    func: Box<SnapFn>,
}

impl FnSnapSource {
    pub fn new<F>(id: impl Into<String>, func: F) -> Self
    where
        F: Fn(&SnapContext<'_>, Point) -> Result<Vec<SnapPoint>, SnapSourceError> + 'static,
    {
        Self {
            id: id.into(),
            func: Box::new(func),
        }
    }
}

impl std::fmt::Debug for FnSnapSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnSnapSource").field("id", &self.id).finish()
    }
}

impl SnapSource for FnSnapSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn snap_points(
        &self,
        ctx: &SnapContext<'_>,
        point: Point,
    ) -> Result<Vec<SnapPoint>, SnapSourceError> {
        (self.func)(ctx, point)
    }
}
