//! Drag targets, the public drag context, and captured session geometry.

use crate::document::DocumentStore;
use crate::error::{DragError, DragResult};
use crate::geometry::constrain_to_cardinal_and_diagonal;
use crate::input::{Modifiers, PointerButton};
use crate::path::{ElementId, GeometryPatch, PathElement, PointRef, Subpath};
use crate::snap::{DragPointInfo, SnapContext, SnapManager, SnapResult};
use crate::viewport::Viewport;
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// What kind of thing is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DragKind {
    /// A single anchor or control point.
    Point,
    /// Every selected element.
    Selection,
    /// One subpath of an element.
    Subpath,
}

/// The draggable target under the pointer when the button went down.
#[derive(Debug, Clone, PartialEq)]
pub enum DragTarget {
    Point { element_id: ElementId, at: PointRef },
    Selection,
    Subpath { element_id: ElementId, subpath_index: usize },
}

/// A pointer-down that may start a drag.
#[derive(Debug, Clone, PartialEq)]
pub struct DragRequest {
    /// Pointer position in screen coordinates.
    pub client: Point,
    pub button: PointerButton,
    pub target: DragTarget,
    /// Free-form data copied into the drag context.
    pub metadata: Map<String, Value>,
}

impl DragRequest {
    pub fn new(client: Point, target: DragTarget) -> Self {
        Self {
            client,
            button: PointerButton::Primary,
            target,
            metadata: Map::new(),
        }
    }

    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }
}

/// Public description of the live drag, shared with the overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragContext {
    pub session_id: Uuid,
    pub plugin_id: String,
    pub kind: DragKind,
    pub is_dragging: bool,
    pub element_ids: Vec<ElementId>,
    pub drag_point: Option<DragPointInfo>,
    pub metadata: Map<String, Value>,
}

/// Viewport and canvas size as last synced from the host frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameShadow {
    pub viewport: Viewport,
    pub canvas_size: Size,
}

impl Default for FrameShadow {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            canvas_size: Size::ZERO,
        }
    }
}

/// Deep copies taken when the drag started.
#[derive(Debug, Clone)]
enum Captured {
    Point {
        element: PathElement,
        at: PointRef,
        origin: Point,
    },
    Selection {
        elements: Vec<PathElement>,
    },
    Subpath {
        element_id: ElementId,
        index: usize,
        subpath: Subpath,
    },
}

/// State of one live drag.
///
/// Every position is applied to the geometry captured at start, never to the
/// previous frame's output.
#[derive(Debug, Clone)]
pub struct DragSession {
    pub(crate) context: DragContext,
    start_pointer: Point,
    captured: Captured,
    /// Latest resolved position not yet written to the document.
    pub(crate) pending: Option<Point>,
}

impl DragSession {
    /// Capture the target's original geometry from the document.
    pub fn capture(
        plugin_id: &str,
        request: &DragRequest,
        start_pointer: Point,
        document: &dyn DocumentStore,
    ) -> DragResult<Self> {
        let (kind, element_ids, drag_point, captured) = match &request.target {
            DragTarget::Point { element_id, at } => {
                let element = document
                    .element(element_id)
                    .ok_or_else(|| DragError::UnknownElement(element_id.clone()))?;
                let subpath = element.subpaths.get(at.subpath_index).ok_or_else(|| {
                    DragError::InvalidSubpath {
                        element_id: element_id.clone(),
                        subpath_index: at.subpath_index,
                    }
                })?;
                let origin = subpath
                    .commands
                    .get(at.command_index)
                    .and_then(|c| c.point(at.point_index))
                    .ok_or_else(|| DragError::InvalidCommand {
                        element_id: element_id.clone(),
                        subpath_index: at.subpath_index,
                        command_index: at.command_index,
                    })?;
                (
                    DragKind::Point,
                    vec![element_id.clone()],
                    Some(DragPointInfo::new(element_id.clone(), *at)),
                    Captured::Point {
                        element: element.clone(),
                        at: *at,
                        origin,
                    },
                )
            }
            DragTarget::Selection => {
                let ids = document.selection();
                if ids.is_empty() {
                    return Err(DragError::EmptySelection);
                }
                let elements = ids
                    .iter()
                    .map(|id| {
                        document
                            .element(id)
                            .cloned()
                            .ok_or_else(|| DragError::UnknownElement(id.clone()))
                    })
                    .collect::<DragResult<Vec<_>>>()?;
                (
                    DragKind::Selection,
                    ids.to_vec(),
                    None,
                    Captured::Selection { elements },
                )
            }
            DragTarget::Subpath {
                element_id,
                subpath_index,
            } => {
                let element = document
                    .element(element_id)
                    .ok_or_else(|| DragError::UnknownElement(element_id.clone()))?;
                let subpath = element.subpaths.get(*subpath_index).cloned().ok_or_else(|| {
                    DragError::InvalidSubpath {
                        element_id: element_id.clone(),
                        subpath_index: *subpath_index,
                    }
                })?;
                (
                    DragKind::Subpath,
                    vec![element_id.clone()],
                    None,
                    Captured::Subpath {
                        element_id: element_id.clone(),
                        index: *subpath_index,
                        subpath,
                    },
                )
            }
        };

        Ok(Self {
            context: DragContext {
                session_id: Uuid::new_v4(),
                plugin_id: plugin_id.to_string(),
                kind,
                is_dragging: true,
                element_ids,
                drag_point,
                metadata: request.metadata.clone(),
            },
            start_pointer,
            captured,
            pending: None,
        })
    }

    pub fn context(&self) -> &DragContext {
        &self.context
    }

    pub fn id(&self) -> Uuid {
        self.context.session_id
    }

    pub fn start_pointer(&self) -> Point {
        self.start_pointer
    }

    /// Whether moves query the snap resolver (single-point drags only).
    pub fn snaps(&self) -> bool {
        matches!(self.captured, Captured::Point { .. })
    }

    /// Turn a canvas pointer position into the position to apply, snapping
    /// single-point drags. Shift constrains the point to 45° steps around its
    /// original position before snapping.
    pub fn resolve(
        &self,
        pointer: Point,
        modifiers: Modifiers,
        frame: &FrameShadow,
        document: &dyn DocumentStore,
        snapping: &SnapManager,
    ) -> (Point, Option<SnapResult>) {
        let Captured::Point { origin, .. } = &self.captured else {
            return (pointer, None);
        };

        let mut target = *origin + (pointer - self.start_pointer);
        if modifiers.shift {
            target = constrain_to_cardinal_and_diagonal(*origin, target);
        }

        let ctx = SnapContext::new(frame.viewport, frame.canvas_size, document.elements())
            .with_active_plugin(&self.context.plugin_id)
            .with_drag_point(self.context.drag_point.as_ref())
            .with_selection(document.selection());
        match snapping.snap(target, &ctx) {
            Some(result) => (result.snapped_point, Some(result)),
            None => (target, None),
        }
    }

    /// Geometry updates that put the target at `position`.
    ///
    /// For point drags `position` is the point's new location; otherwise it is
    /// the pointer, and the offset from the start pointer moves the geometry.
    pub fn patches_for(&self, position: Point) -> Vec<(ElementId, GeometryPatch)> {
        match &self.captured {
            Captured::Point { element, at, .. } => {
                let mut moved = element.clone();
                moved.move_point(*at, position);
                vec![(moved.id, GeometryPatch::Subpaths(moved.subpaths))]
            }
            Captured::Selection { elements } => {
                let delta = position - self.start_pointer;
                elements
                    .iter()
                    .map(|original| {
                        let mut moved = original.clone();
                        moved.translate(delta);
                        (moved.id, GeometryPatch::Subpaths(moved.subpaths))
                    })
                    .collect()
            }
            Captured::Subpath {
                element_id,
                index,
                subpath,
            } => {
                let mut moved = subpath.clone();
                moved.translate(position - self.start_pointer);
                vec![(
                    element_id.clone(),
                    GeometryPatch::Subpath {
                        index: *index,
                        subpath: moved,
                    },
                )]
            }
        }
    }

    /// Patches restoring the geometry captured at start.
    pub fn restore_patches(&self) -> Vec<(ElementId, GeometryPatch)> {
        match &self.captured {
            Captured::Point { element, .. } => {
                vec![(element.id.clone(), GeometryPatch::Subpaths(element.subpaths.clone()))]
            }
            Captured::Selection { elements } => elements
                .iter()
                .map(|e| (e.id.clone(), GeometryPatch::Subpaths(e.subpaths.clone())))
                .collect(),
            Captured::Subpath {
                element_id,
                index,
                subpath,
            } => vec![(
                element_id.clone(),
                GeometryPatch::Subpath {
                    index: *index,
                    subpath: subpath.clone(),
                },
            )],
        }
    }

    /// Write the pending position, if any, to the document.
    pub(crate) fn flush(&mut self, document: &mut dyn DocumentStore) -> bool {
        let Some(position) = self.pending.take() else {
            return false;
        };
        for (id, patch) in self.patches_for(position) {
            document.update_element(&id, patch);
        }
        true
    }
}
