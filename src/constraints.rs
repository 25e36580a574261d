//! The constraint model: tagged variants of constraint kinds, each
//! carrying the entity IDs it constrains and (where applicable) a
//! target value. See `residual.rs` for the residual each kind
//! computes.

use crate::id::Id;

/// Each kind of geometric constraint the solver understands.
///
/// This is a tagged sum type rather than an open-ended trait hierarchy:
/// the residual evaluator is a
/// single exhaustive match over `Kind`, so adding a new kind is a
/// compile error everywhere it isn't yet handled.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum Kind {
    /// Two points should be this (non-negative) distance apart.
    Distance(Id, Id, f64),
    /// Signed distance along X between two points (`p2.x - p1.x`).
    XDistance(Id, Id, f64),
    /// Signed distance along Y between two points (`p2.y - p1.y`).
    YDistance(Id, Id, f64),
    /// Pin a point's X coordinate to a constant. Excludes that
    /// coordinate from the optimization variables entirely.
    FixX(Id, f64),
    /// Pin a point's Y coordinate to a constant.
    FixY(Id, f64),
    /// Two or more points must share an X coordinate.
    SameX(Vec<Id>),
    /// Two or more points must share a Y coordinate.
    SameY(Vec<Id>),
    /// A line is horizontal, i.e. its endpoints share a Y coordinate.
    HorizontalLine(Id),
    /// A line is vertical, i.e. its endpoints share an X coordinate.
    VerticalLine(Id),
    /// Two lines are parallel.
    Parallel(Id, Id),
    /// Two lines are perpendicular.
    Perpendicular(Id, Id),
    /// Two or more lines share the same length.
    SameLength(Vec<Id>),
    /// Three points (vertex is the second) meet at this angle, in
    /// degrees.
    Angle(Id, Id, Id, f64),
    /// Three or more points are colinear.
    Colinear(Vec<Id>),
    /// A point is this (non-negative) perpendicular distance from the
    /// infinite line through a line's endpoints.
    OrthogonalDistance(Id, Id, f64),
    /// A point lies on a circle's perimeter.
    PointOnCircle(Id, Id),
    /// A line is tangent to a circle. Directional: swapping the line's
    /// endpoints can produce a different solution.
    LineTangentToCircle(Id, Id),
    /// A circle has this (non-negative) radius.
    Radius(Id, f64),
    /// Two or more circles share the same radius.
    SameRadius(Vec<Id>),
}

impl Kind {
    /// Does this kind reference the given point, directly?
    ///
    /// Used by cascade deletion and is independent of
    /// whether the point actually exists in a particular `Geometry` —
    /// that check belongs to the evaluator.
    pub(crate) fn references_point(&self, id: Id) -> bool {
        match self {
            Kind::Distance(a, b, _) | Kind::XDistance(a, b, _) | Kind::YDistance(a, b, _) => {
                *a == id || *b == id
            }
            Kind::FixX(p, _) | Kind::FixY(p, _) => *p == id,
            Kind::SameX(points) | Kind::SameY(points) | Kind::Colinear(points) => {
                points.contains(&id)
            }
            Kind::Angle(a, b, c, _) => *a == id || *b == id || *c == id,
            Kind::OrthogonalDistance(p, _, _) => *p == id,
            Kind::HorizontalLine(_)
            | Kind::VerticalLine(_)
            | Kind::Parallel(_, _)
            | Kind::Perpendicular(_, _)
            | Kind::SameLength(_)
            | Kind::PointOnCircle(_, _)
            | Kind::LineTangentToCircle(_, _)
            | Kind::Radius(_, _)
            | Kind::SameRadius(_) => false,
        }
    }

    /// Does this kind reference the given line, directly?
    pub(crate) fn references_line(&self, id: Id) -> bool {
        match self {
            Kind::HorizontalLine(l) | Kind::VerticalLine(l) => *l == id,
            Kind::Parallel(a, b) | Kind::Perpendicular(a, b) => *a == id || *b == id,
            Kind::SameLength(lines) => lines.contains(&id),
            Kind::OrthogonalDistance(_, l, _) => *l == id,
            Kind::LineTangentToCircle(l, _) => *l == id,
            _ => false,
        }
    }

    /// Does this kind reference the given circle, directly?
    pub(crate) fn references_circle(&self, id: Id) -> bool {
        match self {
            Kind::PointOnCircle(_, c) | Kind::LineTangentToCircle(_, c) => *c == id,
            Kind::Radius(c, _) => *c == id,
            Kind::SameRadius(circles) => circles.contains(&id),
            _ => false,
        }
    }
}

/// A constraint request: a [`Kind`] plus how strongly it should be
/// enforced relative to the others in the same solve.
#[derive(Clone, Debug, PartialEq)]
pub struct Constraint {
    pub(crate) kind: Kind,
    pub(crate) priority: f64,
}

impl Constraint {
    /// Create a constraint at the default priority (`1.0`).
    pub fn new(kind: Kind) -> Self {
        Self::with_priority(kind, 1.0)
    }

    /// Create a constraint with a custom priority weight. Larger
    /// weights pull harder on the objective (`w_c = priority`).
    pub fn with_priority(kind: Kind, priority: f64) -> Self {
        Self { kind, priority }
    }

    /// The constraint's kind.
    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    /// The constraint's priority weight.
    pub fn priority(&self) -> f64 {
        self.priority
    }

    pub(crate) fn references_point(&self, id: Id) -> bool {
        self.kind.references_point(id)
    }

    pub(crate) fn references_line(&self, id: Id) -> bool {
        self.kind.references_line(id)
    }

    pub(crate) fn references_circle(&self, id: Id) -> bool {
        self.kind.references_circle(id)
    }
}
