//! Snap candidates, query context, and results.

use crate::path::{ElementId, PathElement, PointRef};
use crate::viewport::Viewport;
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Type of snap target, used for visual feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SnapPointKind {
    /// Path anchor (command end point).
    Anchor,
    /// Midpoint of a segment.
    Midpoint,
    /// Corner of an element's bounding box.
    BboxCorner,
    /// Center of an element's bounding box.
    BboxCenter,
    /// Crossing of two segments.
    Intersection,
    /// Anything else a plugin wants to offer.
    Custom,
}

/// A candidate point the dragged point may lock onto.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapPoint {
    pub point: Point,
    pub kind: SnapPointKind,
    pub element_id: ElementId,
    /// Tie-break weight; higher wins. Unset counts as 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl SnapPoint {
    pub fn new(point: Point, kind: SnapPointKind, element_id: impl Into<ElementId>) -> Self {
        Self {
            point,
            kind,
            element_id: element_id.into(),
            priority: None,
            metadata: None,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Attach a metadata entry.
    pub fn with_meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value.into());
        self
    }

    pub fn effective_priority(&self) -> i32 {
        self.priority.unwrap_or(0)
    }
}

/// The point being dragged, so sources can exclude it from their candidates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DragPointInfo {
    pub element_id: ElementId,
    pub point_index: usize,
    pub subpath_index: usize,
    pub command_index: usize,
}

impl DragPointInfo {
    pub fn new(element_id: impl Into<ElementId>, at: PointRef) -> Self {
        Self {
            element_id: element_id.into(),
            point_index: at.point_index,
            subpath_index: at.subpath_index,
            command_index: at.command_index,
        }
    }

    pub fn point_ref(&self) -> PointRef {
        PointRef {
            subpath_index: self.subpath_index,
            command_index: self.command_index,
            point_index: self.point_index,
        }
    }
}

/// Interaction state handed to every source for one resolution call.
#[derive(Debug, Clone, Copy)]
pub struct SnapContext<'a> {
    pub viewport: Viewport,
    pub active_plugin: &'a str,
    pub drag_point: Option<&'a DragPointInfo>,
    pub canvas_size: Size,
    pub selected_ids: &'a [ElementId],
    /// Current document elements.
    pub elements: &'a [PathElement],
}

impl<'a> SnapContext<'a> {
    pub fn new(viewport: Viewport, canvas_size: Size, elements: &'a [PathElement]) -> Self {
        Self {
            viewport,
            active_plugin: "",
            drag_point: None,
            canvas_size,
            selected_ids: &[],
            elements,
        }
    }

    pub fn with_active_plugin(mut self, plugin: &'a str) -> Self {
        self.active_plugin = plugin;
        self
    }

    pub fn with_drag_point(mut self, info: Option<&'a DragPointInfo>) -> Self {
        self.drag_point = info;
        self
    }

    pub fn with_selection(mut self, ids: &'a [ElementId]) -> Self {
        self.selected_ids = ids;
        self
    }

    /// Whether `element_id` is the element owning the dragged point.
    pub fn is_drag_element(&self, element_id: &str) -> bool {
        self.drag_point.is_some_and(|d| d.element_id == element_id)
    }

    /// Current position of the dragged point, if it can be found.
    pub fn drag_point_position(&self) -> Option<Point> {
        let info = self.drag_point?;
        self.elements
            .iter()
            .find(|e| e.id == info.element_id)?
            .point(info.point_ref())
    }
}

/// A guide line drawn between aligned points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapLine {
    pub start: Point,
    pub end: Point,
}

/// Result of a snap operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapResult {
    /// The snapped point.
    pub snapped_point: Point,
    /// The raw point that was queried.
    pub original_point: Point,
    /// The winning candidate (always exactly one).
    pub snap_points: Vec<SnapPoint>,
    /// Alignment guides; the resolver does not produce any.
    pub snap_lines: Vec<SnapLine>,
    /// Every candidate gathered for this query, for visualization.
    pub all_available_snap_points: Vec<SnapPoint>,
    /// Distance between `snapped_point` and `original_point`.
    pub distance: f64,
}

impl SnapResult {
    /// The winning candidate.
    pub fn target(&self) -> Option<&SnapPoint> {
        self.snap_points.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serializes_kebab_case() {
        let json = serde_json::to_string(&SnapPointKind::BboxCorner).unwrap();
        assert_eq!(json, "\"bbox-corner\"");
    }

    #[test]
    fn test_snap_point_builder() {
        let p = SnapPoint::new(Point::new(1.0, 2.0), SnapPointKind::Custom, "el")
            .with_priority(3)
            .with_meta("role", "grid");
        assert_eq!(p.effective_priority(), 3);
        assert_eq!(p.metadata.unwrap()["role"], Value::from("grid"));
        assert_eq!(
            SnapPoint::new(Point::ZERO, SnapPointKind::Anchor, "el").effective_priority(),
            0
        );
    }

    #[test]
    fn test_drag_point_position() {
        let elements = vec![PathElement::new(
            "line",
            vec![crate::path::Subpath::polyline(&[Point::ZERO, Point::new(4.0, 3.0)])],
        )];
        let info = DragPointInfo {
            element_id: "line".to_string(),
            point_index: 0,
            subpath_index: 0,
            command_index: 1,
        };
        let ctx = SnapContext::new(Viewport::default(), Size::new(100.0, 100.0), &elements)
            .with_drag_point(Some(&info));
        assert_eq!(ctx.drag_point_position(), Some(Point::new(4.0, 3.0)));
        assert!(ctx.is_drag_element("line"));
        assert!(!ctx.is_drag_element("other"));
    }
}
