use kurbo::{CubicBez, Line, ParamCurve, QuadBez};

use crate::foundation::core::Point;

/// How the curve leaves a [`PathPoint`] towards the next one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum CurveType {
    /// Catmull-Rom spline through consecutive spline points.
    CRSpline,
    /// Quadratic Bézier with one control point.
    Bezier,
    /// Cubic Bézier with two control points.
    CubicBezier,
    /// Line to the next point.
    #[default]
    Straight,
}

impl CurveType {
    /// Decode a stored tag; unknown values are treated as straight lines.
    pub fn from_tag(tag: u8) -> Self {
        match tag {
            0 => Self::CRSpline,
            1 => Self::Bezier,
            2 => Self::CubicBezier,
            _ => Self::Straight,
        }
    }

    /// Stored tag, the inverse of [`CurveType::from_tag`].
    pub fn tag(self) -> u8 {
        match self {
            Self::CRSpline => 0,
            Self::Bezier => 1,
            Self::CubicBezier => 2,
            Self::Straight => 3,
        }
    }
}

/// One authored point of a motion path, in path-local coordinates.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PathPoint {
    /// Where the path passes.
    pub pos: Point,
    /// Control point of a quadratic curve, or the first of a cubic.
    pub control1: Point,
    /// Second control point of a cubic curve.
    pub control2: Point,
    /// Shape of the segment leaving this point.
    pub curve: CurveType,
}

impl PathPoint {
    /// Point followed by a straight line.
    pub fn straight(pos: impl Into<Point>) -> Self {
        let pos = pos.into();
        Self {
            pos,
            control1: Point::ZERO,
            control2: Point::ZERO,
            curve: CurveType::Straight,
        }
    }

    /// Point on a Catmull-Rom run.
    pub fn spline(pos: impl Into<Point>) -> Self {
        Self {
            curve: CurveType::CRSpline,
            ..Self::straight(pos)
        }
    }

    /// Point followed by a quadratic curve through `control`.
    pub fn bezier(pos: impl Into<Point>, control: impl Into<Point>) -> Self {
        Self {
            control1: control.into(),
            curve: CurveType::Bezier,
            ..Self::straight(pos)
        }
    }

    /// Point followed by a cubic curve.
    pub fn cubic(
        pos: impl Into<Point>,
        control1: impl Into<Point>,
        control2: impl Into<Point>,
    ) -> Self {
        Self {
            control1: control1.into(),
            control2: control2.into(),
            curve: CurveType::CubicBezier,
            ..Self::straight(pos)
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum SegmentCurve {
    Line(Line),
    Quad(QuadBez),
    Cubic(CubicBez),
    /// Range into [`TweenPath::spline_points`], padded with duplicated end points.
    Spline { start: usize, count: usize },
}

#[derive(Clone, Debug, PartialEq)]
struct Segment {
    curve: SegmentCurve,
    length: f64,
}

/// A piecewise curve built from authored [`PathPoint`]s and sampled by normalized progress.
///
/// Progress is distributed across segments in proportion to their weight (chord length), so
/// the walk is approximately, not exactly, arc-length uniform.
#[derive(Clone, Debug, PartialEq)]
pub struct TweenPath {
    segments: Vec<Segment>,
    spline_points: Vec<Point>,
    full_length: f64,
    first: Point,
    last: Point,
}

impl TweenPath {
    /// Build a path; fewer than two points cannot describe motion and yield `None`.
    pub fn new(points: &[PathPoint]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let last = rest.last()?;

        let mut path = Self {
            segments: Vec::new(),
            spline_points: Vec::new(),
            full_length: 0.0,
            first: first.pos,
            last: last.pos,
        };

        let mut run: Vec<Point> = Vec::new();
        if first.curve == CurveType::CRSpline {
            run.push(first.pos);
        }

        let mut prev = first;
        for current in rest {
            let curve = match prev.curve {
                CurveType::CRSpline => None,
                CurveType::Straight => Some(SegmentCurve::Line(Line::new(prev.pos, current.pos))),
                CurveType::Bezier => Some(SegmentCurve::Quad(QuadBez::new(
                    prev.pos,
                    prev.control1,
                    current.pos,
                ))),
                CurveType::CubicBezier => Some(SegmentCurve::Cubic(CubicBez::new(
                    prev.pos,
                    prev.control1,
                    prev.control2,
                    current.pos,
                ))),
            };
            if let Some(curve) = curve {
                path.push_segment(curve, prev.pos.distance(current.pos));
            }

            if current.curve == CurveType::CRSpline {
                run.push(current.pos);
            } else if !run.is_empty() {
                run.push(current.pos);
                path.push_spline(&mut run);
            }
            prev = current;
        }
        if run.len() > 1 {
            path.push_spline(&mut run);
        }

        Some(path)
    }

    fn push_segment(&mut self, curve: SegmentCurve, length: f64) {
        self.full_length += length;
        self.segments.push(Segment { curve, length });
    }

    fn push_spline(&mut self, run: &mut Vec<Point>) {
        let length: f64 = run.windows(2).map(|w| w[0].distance(w[1])).sum();
        let (Some(&head), Some(&tail)) = (run.first(), run.last()) else {
            return;
        };
        let start = self.spline_points.len();
        self.spline_points.push(head);
        self.spline_points.append(run);
        self.spline_points.push(tail);
        self.spline_points.push(tail);
        let count = self.spline_points.len() - start;
        self.push_segment(SegmentCurve::Spline { start, count }, length);
    }

    /// Sum of segment weights.
    pub fn length(&self) -> f64 {
        self.full_length
    }

    /// Number of segments; a spline run counts as one.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Sample the path at normalized progress `t` (clamped to `[0, 1]`).
    ///
    /// The endpoints return the first and last authored points exactly.
    pub fn point_at(&self, t: f64) -> Point {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        if t == 0.0 {
            return self.first;
        }
        if t == 1.0 || self.full_length <= 0.0 {
            return self.last;
        }

        let mut remaining = t * self.full_length;
        for segment in &self.segments {
            remaining -= segment.length;
            if remaining < 0.0 {
                let local = 1.0 + remaining / segment.length;
                return self.eval_segment(&segment.curve, local);
            }
        }
        self.last
    }

    fn eval_segment(&self, curve: &SegmentCurve, t: f64) -> Point {
        match curve {
            SegmentCurve::Line(line) => line.eval(t),
            SegmentCurve::Quad(quad) => quad.eval(t),
            SegmentCurve::Cubic(cubic) => cubic.eval(t),
            SegmentCurve::Spline { start, count } => {
                let pts = &self.spline_points[*start..*start + *count];
                catmull_rom(pts, t)
            }
        }
    }
}

/// Uniform Catmull-Rom over a padded run; each span uses four consecutive points.
fn catmull_rom(pts: &[Point], t: f64) -> Point {
    let spans = pts.len().saturating_sub(4);
    if spans == 0 {
        return pts.get(1).copied().unwrap_or(Point::ZERO);
    }
    let scaled = t * spans as f64;
    let index = (scaled.floor() as usize).min(spans - 1);
    let local = scaled - index as f64;
    let [p0, p1, p2, p3] = [pts[index], pts[index + 1], pts[index + 2], pts[index + 3]];
    // Same polynomial as the Catmull-Rom basis, expressed as Bézier controls.
    let c1 = p1 + (p2 - p0) / 6.0;
    let c2 = p2 - (p3 - p1) / 6.0;
    CubicBez::new(p1, c1, c2, p2).eval(local)
}

#[cfg(test)]
#[path = "../../tests/unit/path/builder.rs"]
mod tests;
