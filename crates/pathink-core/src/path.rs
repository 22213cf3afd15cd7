//! Minimal path geometry read by snap sources and patched by drags.

use kurbo::{BezPath, CubicBez, ParamCurve, Point, Rect, Shape, Vec2};
use serde::{Deserialize, Serialize};

/// Identifier of a document element.
pub type ElementId = String;

/// A single path command. Every command except `Close` ends at an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    CurveTo {
        control1: Point,
        control2: Point,
        to: Point,
    },
    Close,
}

impl PathCommand {
    /// The anchor this command ends at.
    pub fn anchor(&self) -> Option<Point> {
        match *self {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => Some(p),
            PathCommand::CurveTo { to, .. } => Some(to),
            PathCommand::Close => None,
        }
    }

    /// Number of editable points (controls and anchor).
    pub fn point_count(&self) -> usize {
        match self {
            PathCommand::MoveTo(_) | PathCommand::LineTo(_) => 1,
            PathCommand::CurveTo { .. } => 3,
            PathCommand::Close => 0,
        }
    }

    /// Index of the anchor among this command's points.
    ///
    /// For curves, `0` and `1` are the control points and `2` is the anchor.
    pub fn anchor_index(&self) -> Option<usize> {
        self.point_count().checked_sub(1)
    }

    /// Get a point by index (see [`PathCommand::anchor_index`]).
    pub fn point(&self, index: usize) -> Option<Point> {
        match (*self, index) {
            (PathCommand::MoveTo(p) | PathCommand::LineTo(p), 0) => Some(p),
            (PathCommand::CurveTo { control1, .. }, 0) => Some(control1),
            (PathCommand::CurveTo { control2, .. }, 1) => Some(control2),
            (PathCommand::CurveTo { to, .. }, 2) => Some(to),
            _ => None,
        }
    }

    /// Replace a point by index. Returns false if the index is out of range.
    pub fn set_point(&mut self, index: usize, value: Point) -> bool {
        match (self, index) {
            (PathCommand::MoveTo(p) | PathCommand::LineTo(p), 0) => *p = value,
            (PathCommand::CurveTo { control1, .. }, 0) => *control1 = value,
            (PathCommand::CurveTo { control2, .. }, 1) => *control2 = value,
            (PathCommand::CurveTo { to, .. }, 2) => *to = value,
            _ => return false,
        }
        true
    }

    pub fn translate(&mut self, delta: Vec2) {
        match self {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => *p += delta,
            PathCommand::CurveTo {
                control1,
                control2,
                to,
            } => {
                *control1 += delta;
                *control2 += delta;
                *to += delta;
            }
            PathCommand::Close => {}
        }
    }
}

/// A drawable piece of a subpath, tagged with the command that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    Line {
        start: Point,
        end: Point,
        command_index: usize,
    },
    Cubic {
        p0: Point,
        p1: Point,
        p2: Point,
        p3: Point,
        command_index: usize,
    },
}

impl Segment {
    pub fn command_index(&self) -> usize {
        match *self {
            Segment::Line { command_index, .. } | Segment::Cubic { command_index, .. } => {
                command_index
            }
        }
    }

    pub fn start(&self) -> Point {
        match *self {
            Segment::Line { start, .. } => start,
            Segment::Cubic { p0, .. } => p0,
        }
    }

    pub fn end(&self) -> Point {
        match *self {
            Segment::Line { end, .. } => end,
            Segment::Cubic { p3, .. } => p3,
        }
    }

    /// Point at the parametric middle of the segment.
    pub fn midpoint(&self) -> Point {
        match *self {
            Segment::Line { start, end, .. } => start.midpoint(end),
            Segment::Cubic { p0, p1, p2, p3, .. } => CubicBez::new(p0, p1, p2, p3).eval(0.5),
        }
    }

    /// Approximate the segment with `steps` straight pieces (lines are returned as is).
    pub fn flatten(&self, steps: usize) -> Vec<Point> {
        match *self {
            Segment::Line { start, end, .. } => vec![start, end],
            Segment::Cubic { p0, p1, p2, p3, .. } => {
                let curve = CubicBez::new(p0, p1, p2, p3);
                let steps = steps.max(1);
                (0..=steps)
                    .map(|i| curve.eval(i as f64 / steps as f64))
                    .collect()
            }
        }
    }
}

/// A sequence of commands starting with `MoveTo`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subpath {
    pub commands: Vec<PathCommand>,
}

impl Subpath {
    pub fn new(commands: Vec<PathCommand>) -> Self {
        Self { commands }
    }

    /// Build an open polyline through `points`.
    pub fn polyline(points: &[Point]) -> Self {
        let commands = points
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                if i == 0 {
                    PathCommand::MoveTo(p)
                } else {
                    PathCommand::LineTo(p)
                }
            })
            .collect();
        Self { commands }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.commands.last(), Some(PathCommand::Close))
    }

    /// Anchors with their command index.
    pub fn anchors(&self) -> impl Iterator<Item = (usize, Point)> + '_ {
        self.commands
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.anchor().map(|p| (i, p)))
    }

    /// Drawable segments. A `Close` adds a line back to the subpath start
    /// unless the last anchor already sits there.
    pub fn segments(&self) -> Vec<Segment> {
        let mut segments = Vec::with_capacity(self.commands.len());
        let mut current: Option<Point> = None;
        let mut start: Option<Point> = None;

        for (command_index, command) in self.commands.iter().enumerate() {
            match *command {
                PathCommand::MoveTo(p) => {
                    current = Some(p);
                    start = Some(p);
                }
                PathCommand::LineTo(p) => {
                    if let Some(from) = current {
                        segments.push(Segment::Line {
                            start: from,
                            end: p,
                            command_index,
                        });
                    }
                    current = Some(p);
                }
                PathCommand::CurveTo {
                    control1,
                    control2,
                    to,
                } => {
                    if let Some(from) = current {
                        segments.push(Segment::Cubic {
                            p0: from,
                            p1: control1,
                            p2: control2,
                            p3: to,
                            command_index,
                        });
                    }
                    current = Some(to);
                }
                PathCommand::Close => {
                    if let (Some(from), Some(to)) = (current, start) {
                        if from != to {
                            segments.push(Segment::Line {
                                start: from,
                                end: to,
                                command_index,
                            });
                        }
                    }
                    current = start;
                }
            }
        }
        segments
    }

    pub fn translate(&mut self, delta: Vec2) {
        for command in &mut self.commands {
            command.translate(delta);
        }
    }

    pub fn to_bez_path(&self) -> BezPath {
        let mut path = BezPath::new();
        for command in &self.commands {
            match *command {
                PathCommand::MoveTo(p) => path.move_to(p),
                PathCommand::LineTo(p) => path.line_to(p),
                PathCommand::CurveTo {
                    control1,
                    control2,
                    to,
                } => path.curve_to(control1, control2, to),
                PathCommand::Close => path.close_path(),
            }
        }
        path
    }
}

/// Identifies one editable point inside an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PointRef {
    pub subpath_index: usize,
    pub command_index: usize,
    pub point_index: usize,
}

/// A document element with path geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathElement {
    pub id: ElementId,
    pub subpaths: Vec<Subpath>,
}

impl PathElement {
    pub fn new(id: impl Into<ElementId>, subpaths: Vec<Subpath>) -> Self {
        Self {
            id: id.into(),
            subpaths,
        }
    }

    /// Tight bounding box, or `None` for an element without anchors.
    pub fn bounds(&self) -> Option<Rect> {
        let mut bounds: Option<Rect> = None;
        for subpath in &self.subpaths {
            if subpath.anchors().next().is_none() {
                continue;
            }
            let bbox = subpath.to_bez_path().bounding_box();
            bounds = Some(match bounds {
                Some(b) => b.union(bbox),
                None => bbox,
            });
        }
        bounds
    }

    /// All anchors as `(subpath_index, command_index, point)`.
    pub fn anchors(&self) -> impl Iterator<Item = (usize, usize, Point)> + '_ {
        self.subpaths
            .iter()
            .enumerate()
            .flat_map(|(s, sub)| sub.anchors().map(move |(c, p)| (s, c, p)))
    }

    /// All segments with their subpath index.
    pub fn segments(&self) -> Vec<(usize, Segment)> {
        self.subpaths
            .iter()
            .enumerate()
            .flat_map(|(s, sub)| sub.segments().into_iter().map(move |seg| (s, seg)))
            .collect()
    }

    pub fn command(&self, subpath_index: usize, command_index: usize) -> Option<&PathCommand> {
        self.subpaths
            .get(subpath_index)
            .and_then(|s| s.commands.get(command_index))
    }

    pub fn point(&self, at: PointRef) -> Option<Point> {
        self.command(at.subpath_index, at.command_index)
            .and_then(|c| c.point(at.point_index))
    }

    pub fn translate(&mut self, delta: Vec2) {
        for subpath in &mut self.subpaths {
            subpath.translate(delta);
        }
    }

    /// Move one point to `to`. Moving an anchor carries its adjacent curve
    /// handles along by the same offset. Returns false for an unknown point.
    pub fn move_point(&mut self, at: PointRef, to: Point) -> bool {
        let Some(from) = self.point(at) else {
            return false;
        };
        let delta = to - from;
        let Some(subpath) = self.subpaths.get_mut(at.subpath_index) else {
            return false;
        };

        let is_anchor = subpath.commands[at.command_index].anchor_index() == Some(at.point_index);
        subpath.commands[at.command_index].set_point(at.point_index, to);

        if is_anchor {
            if let PathCommand::CurveTo { control2, .. } = &mut subpath.commands[at.command_index] {
                *control2 += delta;
            }
            if let Some(PathCommand::CurveTo { control1, .. }) =
                subpath.commands.get_mut(at.command_index + 1)
            {
                *control1 += delta;
            }
        }
        true
    }
}

/// Partial geometry update sent to the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GeometryPatch {
    /// Replace every subpath.
    Subpaths(Vec<Subpath>),
    /// Replace a single subpath.
    Subpath { index: usize, subpath: Subpath },
}

impl GeometryPatch {
    /// Apply to an element. Out-of-range subpath indices are ignored.
    pub fn apply_to(&self, element: &mut PathElement) {
        match self {
            GeometryPatch::Subpaths(subpaths) => element.subpaths = subpaths.clone(),
            GeometryPatch::Subpath { index, subpath } => {
                if let Some(target) = element.subpaths.get_mut(*index) {
                    *target = subpath.clone();
                }
            }
        }
    }
}
