//! Built-in snap sources reading element geometry from the query context.

use super::source::SnapSource;
use super::types::{SnapContext, SnapPoint, SnapPointKind};
use crate::error::SnapSourceError;
use crate::geometry::{
    DEFAULT_BEZIER_SAMPLES, closest_point_on_cubic_bezier, closest_point_on_line_segment,
    line_segment_intersection,
};
use crate::path::{PathCommand, PathElement, Segment};
use kurbo::{Point, Rect};

/// Element id used for candidates that don't belong to an element.
pub const GRID_ELEMENT_ID: &str = "grid";

/// Candidates from a bounding box: four corners and the center.
pub fn bounds_snap_points(bounds: Rect, element_id: &str) -> Vec<SnapPoint> {
    let mut points = Vec::with_capacity(5);

    points.push(SnapPoint::new(
        Point::new(bounds.x0, bounds.y0),
        SnapPointKind::BboxCorner,
        element_id,
    ));
    points.push(SnapPoint::new(
        Point::new(bounds.x1, bounds.y0),
        SnapPointKind::BboxCorner,
        element_id,
    ));
    points.push(SnapPoint::new(
        Point::new(bounds.x1, bounds.y1),
        SnapPointKind::BboxCorner,
        element_id,
    ));
    points.push(SnapPoint::new(
        Point::new(bounds.x0, bounds.y1),
        SnapPointKind::BboxCorner,
        element_id,
    ));

    points.push(SnapPoint::new(bounds.center(), SnapPointKind::BboxCenter, element_id));

    points
}

/// Whether a segment moves together with the dragged point.
fn touches_drag(
    ctx: &SnapContext<'_>,
    element: &PathElement,
    subpath: usize,
    segment: &Segment,
) -> bool {
    let Some(info) = ctx.drag_point else {
        return false;
    };
    if info.element_id != element.id || info.subpath_index != subpath {
        return false;
    }
    if segment.command_index() == info.command_index {
        return true;
    }
    match ctx.drag_point_position() {
        Some(p) => segment.start() == p || segment.end() == p,
        None => false,
    }
}

/// Path anchors of every element, excluding the point being dragged.
#[derive(Debug, Default)]
pub struct AnchorSource;

impl SnapSource for AnchorSource {
    fn id(&self) -> &str {
        "anchors"
    }

    fn snap_points(
        &self,
        ctx: &SnapContext<'_>,
        _point: Point,
    ) -> Result<Vec<SnapPoint>, SnapSourceError> {
        let mut points = Vec::new();
        for element in ctx.elements {
            for (subpath_index, command_index, anchor) in element.anchors() {
                let is_dragged = ctx.drag_point.is_some_and(|d| {
                    d.element_id == element.id
                        && d.subpath_index == subpath_index
                        && d.command_index == command_index
                        && element
                            .command(subpath_index, command_index)
                            .and_then(PathCommand::anchor_index)
                            == Some(d.point_index)
                });
                if !is_dragged {
                    points.push(
                        SnapPoint::new(anchor, SnapPointKind::Anchor, element.id.as_str())
                            .with_priority(2)
                            .with_meta("subpath", subpath_index)
                            .with_meta("command", command_index),
                    );
                }
            }
        }
        Ok(points)
    }
}

/// Segment midpoints, excluding segments attached to the dragged point.
#[derive(Debug, Default)]
pub struct MidpointSource;

impl SnapSource for MidpointSource {
    fn id(&self) -> &str {
        "midpoints"
    }

    fn snap_points(
        &self,
        ctx: &SnapContext<'_>,
        _point: Point,
    ) -> Result<Vec<SnapPoint>, SnapSourceError> {
        let mut points = Vec::new();
        for element in ctx.elements {
            for (subpath_index, segment) in element.segments() {
                if touches_drag(ctx, element, subpath_index, &segment) {
                    continue;
                }
                points.push(
                    SnapPoint::new(segment.midpoint(), SnapPointKind::Midpoint, element.id.as_str())
                        .with_priority(1),
                );
            }
        }
        Ok(points)
    }
}

/// Bounding-box corners and centers of elements other than the dragged one.
#[derive(Debug, Default)]
pub struct BoundsSource;

impl SnapSource for BoundsSource {
    fn id(&self) -> &str {
        "bounds"
    }

    fn snap_points(
        &self,
        ctx: &SnapContext<'_>,
        _point: Point,
    ) -> Result<Vec<SnapPoint>, SnapSourceError> {
        Ok(ctx
            .elements
            .iter()
            .filter(|e| !ctx.is_drag_element(&e.id))
            .filter_map(|e| e.bounds().map(|b| bounds_snap_points(b, &e.id)))
            .flatten()
            .collect())
    }
}

/// Crossings between segments near the query point.
///
/// Curves are flattened before intersecting. Only segments whose bounds come
/// within `radius_px` of the point are tested.
#[derive(Debug)]
pub struct IntersectionSource {
    pub radius_px: f64,
    pub flatten_steps: usize,
}

impl Default for IntersectionSource {
    fn default() -> Self {
        Self {
            radius_px: crate::config::DEFAULT_SNAP_THRESHOLD_PX,
            flatten_steps: 16,
        }
    }
}

impl SnapSource for IntersectionSource {
    fn id(&self) -> &str {
        "intersections"
    }

    fn snap_points(
        &self,
        ctx: &SnapContext<'_>,
        point: Point,
    ) -> Result<Vec<SnapPoint>, SnapSourceError> {
        let radius = ctx.viewport.screen_to_canvas_distance(self.radius_px);

        // (element id, polyline) for every segment close enough to matter.
        let mut nearby: Vec<(&str, Vec<Point>)> = Vec::new();
        for element in ctx.elements {
            for (subpath_index, segment) in element.segments() {
                if touches_drag(ctx, element, subpath_index, &segment) {
                    continue;
                }
                let polyline = segment.flatten(self.flatten_steps);
                let bbox = polyline
                    .iter()
                    .fold(Rect::from_points(polyline[0], polyline[0]), |r, &p| r.union_pt(p));
                if bbox.inflate(radius, radius).contains(point) {
                    nearby.push((element.id.as_str(), polyline));
                }
            }
        }

        let mut points = Vec::new();
        for (i, (id_a, poly_a)) in nearby.iter().enumerate() {
            for (id_b, poly_b) in &nearby[i + 1..] {
                for a in poly_a.windows(2) {
                    for b in poly_b.windows(2) {
                        if let Some(hit) = line_segment_intersection(a[0], a[1], b[0], b[1]) {
                            // Adjacent segments always meet at their shared anchor.
                            if id_a == id_b && (hit == a[0] || hit == a[1]) {
                                continue;
                            }
                            points.push(
                                SnapPoint::new(hit, SnapPointKind::Intersection, *id_a)
                                    .with_priority(2)
                                    .with_meta("other", *id_b),
                            );
                        }
                    }
                }
            }
        }
        Ok(points)
    }
}

/// The nearest point on every segment, so points can slide along paths.
#[derive(Debug)]
pub struct PathEdgeSource {
    pub samples: usize,
}

impl Default for PathEdgeSource {
    fn default() -> Self {
        Self {
            samples: DEFAULT_BEZIER_SAMPLES,
        }
    }
}

impl SnapSource for PathEdgeSource {
    fn id(&self) -> &str {
        "edges"
    }

    fn snap_points(
        &self,
        ctx: &SnapContext<'_>,
        point: Point,
    ) -> Result<Vec<SnapPoint>, SnapSourceError> {
        let mut points = Vec::new();
        for element in ctx.elements {
            if ctx.is_drag_element(&element.id) {
                continue;
            }
            for (subpath_index, segment) in element.segments() {
                let closest = match segment {
                    Segment::Line { start, end, .. } => {
                        closest_point_on_line_segment(point, start, end)
                    }
                    Segment::Cubic { p0, p1, p2, p3, .. } => {
                        closest_point_on_cubic_bezier(point, p0, p1, p2, p3, self.samples)
                    }
                };
                points.push(
                    SnapPoint::new(closest.point, SnapPointKind::Custom, element.id.as_str())
                        .with_priority(-1)
                        .with_meta("role", "edge")
                        .with_meta("subpath", subpath_index)
                        .with_meta("command", segment.command_index())
                        .with_meta("t", closest.t),
                );
            }
        }
        Ok(points)
    }
}

/// The nearest grid intersection.
#[derive(Debug)]
pub struct GridSource {
    pub grid_size: f64,
}

impl Default for GridSource {
    fn default() -> Self {
        Self {
            grid_size: crate::config::DEFAULT_GRID_SIZE,
        }
    }
}

impl SnapSource for GridSource {
    fn id(&self) -> &str {
        "grid"
    }

    fn is_enabled(&self) -> bool {
        self.grid_size > 0.0
    }

    fn snap_points(
        &self,
        _ctx: &SnapContext<'_>,
        point: Point,
    ) -> Result<Vec<SnapPoint>, SnapSourceError> {
        let snapped = Point::new(
            (point.x / self.grid_size).round() * self.grid_size,
            (point.y / self.grid_size).round() * self.grid_size,
        );
        Ok(vec![
            SnapPoint::new(snapped, SnapPointKind::Custom, GRID_ELEMENT_ID)
                .with_priority(-2)
                .with_meta("role", "grid"),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{PathCommand, Subpath};
    use crate::snap::manager::SnapManager;
    use crate::snap::types::DragPointInfo;
    use crate::viewport::Viewport;
    use kurbo::Size;

    fn square(id: &str, x: f64, y: f64, side: f64) -> PathElement {
        PathElement::new(
            id,
            vec![Subpath::new(vec![
                PathCommand::MoveTo(Point::new(x, y)),
                PathCommand::LineTo(Point::new(x + side, y)),
                PathCommand::LineTo(Point::new(x + side, y + side)),
                PathCommand::LineTo(Point::new(x, y + side)),
                PathCommand::Close,
            ])],
        )
    }

    fn ctx(elements: &[PathElement]) -> SnapContext<'_> {
        SnapContext::new(Viewport::default(), Size::new(800.0, 600.0), elements)
    }

    #[test]
    fn test_bounds_snap_points() {
        let points = bounds_snap_points(Rect::new(0.0, 0.0, 100.0, 50.0), "r");
        assert_eq!(points.len(), 5);
        assert_eq!(points.iter().filter(|p| p.kind == SnapPointKind::BboxCorner).count(), 4);
        assert_eq!(points[4].point, Point::new(50.0, 25.0));
        assert_eq!(points[4].kind, SnapPointKind::BboxCenter);
    }

    #[test]
    fn test_anchor_source_excludes_dragged_point() {
        let elements = vec![square("sq", 0.0, 0.0, 10.0)];
        let info = DragPointInfo {
            element_id: "sq".to_string(),
            point_index: 0,
            subpath_index: 0,
            command_index: 2,
        };
        let all = AnchorSource.snap_points(&ctx(&elements), Point::ZERO).unwrap();
        assert_eq!(all.len(), 4);

        let ctx = ctx(&elements).with_drag_point(Some(&info));
        let points = AnchorSource.snap_points(&ctx, Point::ZERO).unwrap();
        assert_eq!(points.len(), 3);
        assert!(points.iter().all(|p| p.point != Point::new(10.0, 10.0)));
    }

    #[test]
    fn test_anchor_source_keeps_anchor_when_dragging_handle() {
        let elements = vec![PathElement::new(
            "c",
            vec![Subpath::new(vec![
                PathCommand::MoveTo(Point::new(0.0, 0.0)),
                PathCommand::CurveTo {
                    control1: Point::new(0.0, 40.0),
                    control2: Point::new(100.0, 40.0),
                    to: Point::new(100.0, 0.0),
                },
            ])],
        )];
        let handle = DragPointInfo {
            element_id: "c".to_string(),
            point_index: 1,
            subpath_index: 0,
            command_index: 1,
        };
        let ctx = ctx(&elements).with_drag_point(Some(&handle));
        let points = AnchorSource.snap_points(&ctx, Point::ZERO).unwrap();
        assert_eq!(points.len(), 2);
        assert!(points.iter().any(|p| p.point == Point::new(100.0, 0.0)));
    }

    #[test]
    fn test_midpoint_source_skips_attached_segments() {
        let elements = vec![square("sq", 0.0, 0.0, 10.0)];
        let all = MidpointSource.snap_points(&ctx(&elements), Point::ZERO).unwrap();
        assert_eq!(all.len(), 4);

        let info = DragPointInfo {
            element_id: "sq".to_string(),
            point_index: 0,
            subpath_index: 0,
            command_index: 2,
        };
        let ctx = ctx(&elements).with_drag_point(Some(&info));
        let points = MidpointSource.snap_points(&ctx, Point::ZERO).unwrap();
        let mids: Vec<Point> = points.iter().map(|p| p.point).collect();
        assert_eq!(mids, vec![Point::new(5.0, 0.0), Point::new(0.0, 5.0)]);
    }

    #[test]
    fn test_bounds_source_skips_drag_element() {
        let elements = vec![square("a", 0.0, 0.0, 10.0), square("b", 20.0, 0.0, 10.0)];
        let info = DragPointInfo {
            element_id: "a".to_string(),
            point_index: 0,
            subpath_index: 0,
            command_index: 1,
        };
        let ctx = ctx(&elements).with_drag_point(Some(&info));
        let points = BoundsSource.snap_points(&ctx, Point::ZERO).unwrap();
        assert_eq!(points.len(), 5);
        assert!(points.iter().all(|p| p.element_id == "b"));
    }

    #[test]
    fn test_intersection_source() {
        let elements = vec![
            PathElement::new(
                "h",
                vec![Subpath::polyline(&[Point::new(0.0, 5.0), Point::new(10.0, 5.0)])],
            ),
            PathElement::new(
                "v",
                vec![Subpath::polyline(&[Point::new(5.0, 0.0), Point::new(5.0, 10.0)])],
            ),
        ];
        let points = IntersectionSource::default()
            .snap_points(&ctx(&elements), Point::new(6.0, 6.0))
            .unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].point, Point::new(5.0, 5.0));
        assert_eq!(points[0].kind, SnapPointKind::Intersection);
    }

    #[test]
    fn test_intersection_source_ignores_shared_anchors() {
        let elements = vec![square("sq", 0.0, 0.0, 10.0)];
        let points = IntersectionSource::default()
            .snap_points(&ctx(&elements), Point::new(1.0, 1.0))
            .unwrap();
        assert!(points.is_empty());
    }

    #[test]
    fn test_intersection_source_culls_far_segments() {
        let elements = vec![
            PathElement::new(
                "h",
                vec![Subpath::polyline(&[Point::new(0.0, 5.0), Point::new(10.0, 5.0)])],
            ),
            PathElement::new(
                "v",
                vec![Subpath::polyline(&[Point::new(5.0, 0.0), Point::new(5.0, 10.0)])],
            ),
        ];
        let points = IntersectionSource::default()
            .snap_points(&ctx(&elements), Point::new(500.0, 500.0))
            .unwrap();
        assert!(points.is_empty());
    }

    #[test]
    fn test_edge_source_on_curve() {
        let elements = vec![PathElement::new(
            "c",
            vec![Subpath::new(vec![
                PathCommand::MoveTo(Point::new(0.0, 0.0)),
                PathCommand::CurveTo {
                    control1: Point::new(0.0, 40.0),
                    control2: Point::new(100.0, 40.0),
                    to: Point::new(100.0, 0.0),
                },
            ])],
        )];
        let points = PathEdgeSource::default()
            .snap_points(&ctx(&elements), Point::new(50.0, 35.0))
            .unwrap();
        assert_eq!(points.len(), 1);
        // Apex of the symmetric curve sits at (50, 30).
        assert!((points[0].point.x - 50.0).abs() < 1e-6);
        assert!((points[0].point.y - 30.0).abs() < 1e-6);
    }

    #[test]
    fn test_grid_source() {
        let points = GridSource::default()
            .snap_points(&ctx(&[]), Point::new(23.0, 47.0))
            .unwrap();
        assert_eq!(points[0].point, Point::new(20.0, 40.0));
        assert_eq!(points[0].element_id, GRID_ELEMENT_ID);
    }

    #[test]
    fn test_anchor_beats_edge_at_same_spot() {
        let elements = vec![square("sq", 0.0, 0.0, 10.0)];
        let mut manager = SnapManager::default();
        manager.register_source(PathEdgeSource::default());
        manager.register_source(AnchorSource);
        let result = manager.snap(Point::new(10.5, 0.0), &ctx(&elements)).unwrap();
        assert_eq!(result.target().unwrap().kind, SnapPointKind::Anchor);
        assert_eq!(result.snapped_point, Point::new(10.0, 0.0));
    }
}
