//! The residual evaluator: one closed-form expression per constraint
//! kind. This is the only place any constraint's math is
//! defined — both the public [`evaluate`] function and the solver's
//! internal objective/gradient machinery route through
//! [`residual_for`], so there is exactly one implementation of each
//! formula to get right.

use crate::constraints::{Constraint, Kind};
use crate::geometry::Geometry;
use crate::id::Id;
use crate::vector::V;

/// A constraint is considered satisfied once its residual's magnitude
/// falls at or below this value.
pub const FEASIBILITY_EPSILON: f64 = 1e-6;

/// Below this magnitude, a denominator (line length, vector length) is
/// treated as zero and the residual short-circuits to `0.0` rather than
/// producing a NaN or infinity.
const DEGENERATE_EPSILON: f64 = 1e-9;

/// The result of evaluating one constraint against one geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Evaluation {
    /// The constraint's residual. Zero means exactly satisfied.
    pub residual: f64,
    /// Whether `|residual| <= FEASIBILITY_EPSILON`.
    pub satisfied: bool,
}

/// Anything that can answer "where is this point right now?" — either a
/// real [`Geometry`] (used by the public [`evaluate`] API and tests), or
/// the solver's packed vector of free variables plus fixed targets
/// (used internally while optimizing, so a full `Geometry` doesn't need
/// to be reconstructed on every objective/gradient evaluation).
pub(crate) trait Coordinates {
    fn xy(&self, point: Id) -> Option<(f64, f64)>;
}

impl Coordinates for Geometry {
    fn xy(&self, point: Id) -> Option<(f64, f64)> {
        self.point(point).map(|p| (p.x, p.y))
    }
}

/// Evaluate a constraint against a geometry.
///
/// Pure and total: a structurally invalid constraint (missing entity,
/// wrong arity) is treated as vacuously satisfied rather than raising an
/// error, mirroring how the orchestrator silently drops such
/// constraints from a solve.
pub fn evaluate(constraint: &Constraint, geometry: &Geometry) -> Evaluation {
    let residual = residual_for(constraint.kind(), geometry, geometry)
        .map(|(r, _degenerate)| r)
        .unwrap_or(0.0);
    Evaluation {
        residual,
        satisfied: residual.abs() <= FEASIBILITY_EPSILON,
    }
}

/// Compute `(residual, degenerate)` for a constraint kind, resolving
/// line/circle topology from `topology` and point coordinates from
/// `coords`. Returns `None` if the kind references an entity that
/// doesn't exist in `topology`, or has too few entities for its arity —
/// the structural-error case.
pub(crate) fn residual_for(
    kind: &Kind,
    topology: &Geometry,
    coords: &impl Coordinates,
) -> Option<(f64, bool)> {
    match kind {
        Kind::Distance(p1, p2, t) => {
            let (a, b) = (point(coords, *p1)?, point(coords, *p2)?);
            Some(((b - a).magnitude() - t, false))
        }
        Kind::XDistance(p1, p2, t) => {
            let (a, b) = (point(coords, *p1)?, point(coords, *p2)?);
            Some(((b.x - a.x) - t, false))
        }
        Kind::YDistance(p1, p2, t) => {
            let (a, b) = (point(coords, *p1)?, point(coords, *p2)?);
            Some(((b.y - a.y) - t, false))
        }
        Kind::FixX(p, t) => {
            let a = point(coords, *p)?;
            Some((a.x - t, false))
        }
        Kind::FixY(p, t) => {
            let a = point(coords, *p)?;
            Some((a.y - t, false))
        }
        Kind::SameX(points) => same_axis(points, coords, |p| p.x),
        Kind::SameY(points) => same_axis(points, coords, |p| p.y),
        Kind::HorizontalLine(line) => {
            let (a, b) = line_endpoints(topology, coords, *line)?;
            Some((a.y - b.y, false))
        }
        Kind::VerticalLine(line) => {
            let (a, b) = line_endpoints(topology, coords, *line)?;
            Some((a.x - b.x, false))
        }
        Kind::Parallel(l0, l1) => {
            let (d0, d1) = (direction(topology, coords, *l0)?, direction(topology, coords, *l1)?);
            Some(normalized_cross_or_dot(d0, d1, true))
        }
        Kind::Perpendicular(l0, l1) => {
            let (d0, d1) = (direction(topology, coords, *l0)?, direction(topology, coords, *l1)?);
            Some(normalized_cross_or_dot(d0, d1, false))
        }
        Kind::SameLength(lines) => same_line_length(lines, topology, coords),
        Kind::Angle(p1, vertex, p3, degrees_target) => {
            angle_residual(coords, *p1, *vertex, *p3, *degrees_target)
        }
        Kind::Colinear(points) => colinear_residual(points, coords),
        Kind::OrthogonalDistance(point_id, line, t) => {
            let p = point(coords, *point_id)?;
            let (a, b) = line_endpoints(topology, coords, *line)?;
            Some((orthogonal_distance(p, a, b) - t, false).map_degenerate(a, b))
        }
        Kind::PointOnCircle(point_id, circle) => {
            let p = point(coords, *point_id)?;
            let (center, radius) = circle_center_radius(topology, coords, *circle)?;
            Some(((p - center).magnitude() - radius, false))
        }
        Kind::LineTangentToCircle(line, circle) => {
            let (p1, p2) = line_endpoints(topology, coords, *line)?;
            let (center, radius) = circle_center_radius(topology, coords, *circle)?;
            Some(tangent_residual(p1, p2, center, radius))
        }
        Kind::Radius(circle, t) => {
            let (_, radius) = circle_center_radius(topology, coords, *circle)?;
            Some((radius - t, false))
        }
        Kind::SameRadius(circles) => same_radius(circles, topology, coords),
    }
}

/// Small helper trait so `OrthogonalDistance` can reuse the same
/// degenerate-line check as the direction-based constraints without
/// duplicating the zero-length test.
trait MapDegenerate {
    fn map_degenerate(self, a: V, b: V) -> (f64, bool);
}

impl MapDegenerate for (f64, bool) {
    fn map_degenerate(self, a: V, b: V) -> (f64, bool) {
        if (b - a).magnitude() < DEGENERATE_EPSILON {
            (0.0, true)
        } else {
            self
        }
    }
}

fn point(coords: &impl Coordinates, id: Id) -> Option<V> {
    coords.xy(id).map(|(x, y)| V::new(x, y))
}

fn line_endpoints(topology: &Geometry, coords: &impl Coordinates, line: Id) -> Option<(V, V)> {
    let line = topology.line(line)?;
    Some((point(coords, line.p1)?, point(coords, line.p2)?))
}

fn direction(topology: &Geometry, coords: &impl Coordinates, line: Id) -> Option<V> {
    let (a, b) = line_endpoints(topology, coords, line)?;
    Some(b - a)
}

fn circle_center_radius(
    topology: &Geometry,
    coords: &impl Coordinates,
    circle: Id,
) -> Option<(V, f64)> {
    let circle = topology.circle(circle)?;
    let center = point(coords, circle.center)?;
    let radius_point = point(coords, circle.radius_point)?;
    Some((center, (radius_point - center).magnitude()))
}

fn same_axis(
    points: &[Id],
    coords: &impl Coordinates,
    axis: impl Fn(V) -> f64,
) -> Option<(f64, bool)> {
    if points.len() < 2 {
        return None;
    }
    let resolved: Vec<V> = points.iter().map(|id| point(coords, *id)).collect::<Option<_>>()?;
    let reference = axis(resolved[0]);
    let sum_sq: f64 = resolved[1..]
        .iter()
        .map(|p| (axis(*p) - reference).powi(2))
        .sum();
    Some((libm::sqrt(sum_sq), false))
}

fn same_line_length(
    lines: &[Id],
    topology: &Geometry,
    coords: &impl Coordinates,
) -> Option<(f64, bool)> {
    if lines.len() < 2 {
        return None;
    }
    let lengths: Vec<f64> = lines
        .iter()
        .map(|id| line_endpoints(topology, coords, *id).map(|(a, b)| (b - a).magnitude()))
        .collect::<Option<_>>()?;
    let reference = lengths[0];
    let sum_sq: f64 = lengths[1..].iter().map(|l| (l - reference).powi(2)).sum();
    Some((libm::sqrt(sum_sq), false))
}

fn same_radius(
    circles: &[Id],
    topology: &Geometry,
    coords: &impl Coordinates,
) -> Option<(f64, bool)> {
    if circles.len() < 2 {
        return None;
    }
    let radii: Vec<f64> = circles
        .iter()
        .map(|id| circle_center_radius(topology, coords, *id).map(|(_, r)| r))
        .collect::<Option<_>>()?;
    let reference = radii[0];
    let sum_sq: f64 = radii[1..].iter().map(|r| (r - reference).powi(2)).sum();
    Some((libm::sqrt(sum_sq), false))
}

/// Shared by `parallel` (cross product) and `perpendicular` (dot
/// product): both normalize by the product of the two direction
/// vectors' lengths, and both collapse to a degenerate zero residual if
/// either line has no length.
fn normalized_cross_or_dot(d0: V, d1: V, cross: bool) -> (f64, bool) {
    let (mag0, mag1) = (d0.magnitude(), d1.magnitude());
    if mag0 < DEGENERATE_EPSILON || mag1 < DEGENERATE_EPSILON {
        return (0.0, true);
    }
    let numerator = if cross { d0.cross_2d(&d1) } else { d0.dot(&d1) };
    (numerator / (mag0 * mag1), false)
}

fn angle_residual(
    coords: &impl Coordinates,
    p1: Id,
    vertex: Id,
    p3: Id,
    degrees_target: f64,
) -> Option<(f64, bool)> {
    let (a, b, c) = (point(coords, p1)?, point(coords, vertex)?, point(coords, p3)?);
    let (v1, v2) = (a - b, c - b);
    let (mag1, mag2) = (v1.magnitude(), v2.magnitude());
    if mag1 < DEGENERATE_EPSILON || mag2 < DEGENERATE_EPSILON {
        return Some((0.0, true));
    }
    let cos_theta = (v1.dot(&v2) / (mag1 * mag2)).clamp(-1.0, 1.0);
    let degrees = libm::acos(cos_theta).to_degrees();
    Some((degrees - degrees_target, false))
}

fn colinear_residual(points: &[Id], coords: &impl Coordinates) -> Option<(f64, bool)> {
    if points.len() < 3 {
        return None;
    }
    let resolved: Vec<V> = points.iter().map(|id| point(coords, *id)).collect::<Option<_>>()?;
    let (a, b) = (resolved[0], resolved[1]);
    if (b - a).magnitude() < DEGENERATE_EPSILON {
        return Some((0.0, true));
    }
    let sum_sq: f64 = resolved[2..]
        .iter()
        .map(|p| orthogonal_distance(*p, a, b).powi(2))
        .sum();
    Some((libm::sqrt(sum_sq), false))
}

/// Unsigned perpendicular distance from `p` to the infinite line through
/// `a` and `b`. Caller is responsible for the degenerate (`a == b`)
/// check; this returns `0.0` for a zero-length reference line rather
/// than dividing by zero.
fn orthogonal_distance(p: V, a: V, b: V) -> f64 {
    let v = b - a;
    let len = v.magnitude();
    if len < DEGENERATE_EPSILON {
        return 0.0;
    }
    (v.cross_2d(&(p - a))).abs() / len
}

/// Signed distance from `circle_center` to the directed line `p1 -> p2`,
/// minus the circle's radius. Directional: swapping `p1`/`p2` flips the
/// sign of the first term.
fn tangent_residual(p1: V, p2: V, circle_center: V, radius: f64) -> (f64, bool) {
    let v = p2 - p1;
    let len = v.magnitude();
    if len < DEGENERATE_EPSILON {
        return (0.0, true);
    }
    let w = circle_center - p1;
    let signed_distance = v.cross_2d(&w) / len;
    (signed_distance - radius, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Circle, Line, Point};

    fn geometry_with_two_points(a: (f64, f64), b: (f64, f64)) -> Geometry {
        let mut g = Geometry::new();
        g.insert_point(0, Point::new(a.0, a.1));
        g.insert_point(1, Point::new(b.0, b.1));
        g
    }

    #[test]
    fn distance_residual_is_zero_when_already_satisfied() {
        let g = geometry_with_two_points((0.0, 0.0), (3.0, 4.0));
        let c = Constraint::new(Kind::Distance(0, 1, 5.0));
        let eval = evaluate(&c, &g);
        assert!(eval.residual.abs() < 1e-12);
        assert!(eval.satisfied);
    }

    #[test]
    fn distance_residual_is_nonzero_when_violated() {
        let g = geometry_with_two_points((0.0, 0.0), (3.0, 4.0));
        let c = Constraint::new(Kind::Distance(0, 1, 10.0));
        let eval = evaluate(&c, &g);
        assert!((eval.residual + 5.0).abs() < 1e-12);
        assert!(!eval.satisfied);
    }

    #[test]
    fn fix_x_residual() {
        let g = geometry_with_two_points((3.0, 0.0), (0.0, 0.0));
        let c = Constraint::new(Kind::FixX(0, 3.0));
        assert!(evaluate(&c, &g).satisfied);
        let c = Constraint::new(Kind::FixX(0, 4.0));
        assert!(!evaluate(&c, &g).satisfied);
    }

    #[test]
    fn malformed_constraint_is_vacuously_satisfied() {
        let g = geometry_with_two_points((0.0, 0.0), (1.0, 1.0));
        // References a point that doesn't exist.
        let c = Constraint::new(Kind::Distance(0, 99, 5.0));
        let eval = evaluate(&c, &g);
        assert_eq!(eval.residual, 0.0);
        assert!(eval.satisfied);
    }

    #[test]
    fn degenerate_zero_length_line_does_not_produce_nan() {
        let mut g = Geometry::new();
        g.insert_point(0, Point::new(1.0, 1.0));
        g.insert_point(1, Point::new(1.0, 1.0));
        g.insert_point(2, Point::new(5.0, 5.0));
        g.insert_line(10, Line::new(0, 1));
        let c = Constraint::new(Kind::OrthogonalDistance(2, 10, 1.0));
        let eval = evaluate(&c, &g);
        // A zero-length reference line short-circuits to residual 0
        // rather than a NaN/infinite value.
        assert!(eval.residual.is_finite());
        assert_eq!(eval.residual, 0.0);
    }

    #[test]
    fn angle_clamps_acos_argument_to_avoid_nan() {
        // Colinear points would push the cosine argument slightly past
        // 1.0 or -1.0 under floating-point error; the residual must
        // still be finite.
        let mut g = Geometry::new();
        g.insert_point(0, Point::new(-1.0, 0.0));
        g.insert_point(1, Point::new(0.0, 0.0));
        g.insert_point(2, Point::new(1.0, 0.0));
        let c = Constraint::new(Kind::Angle(0, 1, 2, 180.0));
        let eval = evaluate(&c, &g);
        assert!(eval.residual.is_finite());
        assert!(eval.satisfied);
    }

    #[test]
    fn point_on_circle_residual() {
        let mut g = Geometry::new();
        g.insert_point(0, Point::new(0.0, 0.0));
        g.insert_point(1, Point::new(5.0, 0.0));
        g.insert_point(2, Point::new(0.0, 10.0));
        g.insert_circle(20, Circle::new(0, 1));
        let c = Constraint::new(Kind::PointOnCircle(2, 20));
        let eval = evaluate(&c, &g);
        assert!((eval.residual - 5.0).abs() < 1e-12);
    }

    #[test]
    fn same_radius_requires_at_least_two_circles() {
        let mut g = Geometry::new();
        g.insert_point(0, Point::new(0.0, 0.0));
        g.insert_point(1, Point::new(1.0, 0.0));
        g.insert_circle(10, Circle::new(0, 1));
        let c = Constraint::new(Kind::SameRadius(vec![10]));
        // Too few circles: structurally invalid, vacuously satisfied.
        assert!(evaluate(&c, &g).satisfied);
    }
}
