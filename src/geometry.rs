//! The geometry model: the arena of points, lines and circles a sketch is
//! built from, plus the constraints that tie them together.
//!
//! A [`Geometry`] owns every entity by value, keyed by its opaque [`Id`].
//! Lines and circles hold only IDs of the points they reference, never
//! live handles, so deleting a point is a simple sweep (see
//! [`Geometry::remove_point`]).

use indexmap::IndexMap;

use crate::constraints::Constraint;
use crate::id::Id;

/// A 2D point. Its coordinates are the only thing a solve ever changes.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Create a point at the given coordinates.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A line segment (or, with `infinite` set, the infinite line through its
/// two points). Endpoints own no state of their own; they're just IDs of
/// [`Point`]s living in the same [`Geometry`].
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Line {
    /// One endpoint.
    pub p1: Id,
    /// The other endpoint.
    pub p2: Id,
    /// Whether constraints referencing this line should treat it as
    /// extending infinitely in both directions rather than stopping at
    /// `p1`/`p2`. Purely a hint for collaborators (e.g. a renderer); the
    /// residual evaluator already treats every line as infinite where
    /// the constraint semantics call for it (`orthogonal-distance`,
    /// `line-tangent-to-circle`).
    pub infinite: bool,
}

impl Line {
    /// Create a finite line segment between two points.
    pub fn new(p1: Id, p2: Id) -> Self {
        Self {
            p1,
            p2,
            infinite: false,
        }
    }
}

/// A circle, defined by a center point and a second point on its
/// perimeter. The radius is never stored directly: it's always the
/// Euclidean distance between `center` and `radius_point`.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Circle {
    /// The circle's center.
    pub center: Id,
    /// A point on the circle's perimeter; its distance from `center` is
    /// the radius.
    pub radius_point: Id,
}

impl Circle {
    /// Create a circle from its center and a point on its perimeter.
    pub fn new(center: Id, radius_point: Id) -> Self {
        Self {
            center,
            radius_point,
        }
    }
}

/// An immutable-view snapshot of a sketch: every point, line, circle and
/// constraint, keyed by opaque ID.
///
/// Iteration order over each table is insertion order (backed by
/// [`IndexMap`]) and is part of the solver's determinism contract:
/// two `Geometry` values built by replaying the same sequence of
/// inserts iterate identically, which is what makes two `solve` calls on
/// byte-identical inputs produce byte-identical outputs.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Geometry {
    points: IndexMap<Id, Point>,
    lines: IndexMap<Id, Line>,
    circles: IndexMap<Id, Circle>,
    constraints: IndexMap<Id, Constraint>,
}

impl Geometry {
    /// An empty sketch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a point.
    pub fn insert_point(&mut self, id: Id, point: Point) {
        self.points.insert(id, point);
    }

    /// Insert or overwrite a line. Does not validate that `p1`/`p2`
    /// exist; a line referencing a missing point is simply invisible to
    /// the residual evaluator.
    pub fn insert_line(&mut self, id: Id, line: Line) {
        self.lines.insert(id, line);
    }

    /// Insert or overwrite a circle.
    pub fn insert_circle(&mut self, id: Id, circle: Circle) {
        self.circles.insert(id, circle);
    }

    /// Insert or overwrite a constraint.
    pub fn insert_constraint(&mut self, id: Id, constraint: Constraint) {
        self.constraints.insert(id, constraint);
    }

    /// Look up a point by ID.
    pub fn point(&self, id: Id) -> Option<&Point> {
        self.points.get(&id)
    }

    /// Look up a line by ID.
    pub fn line(&self, id: Id) -> Option<&Line> {
        self.lines.get(&id)
    }

    /// Look up a circle by ID.
    pub fn circle(&self, id: Id) -> Option<&Circle> {
        self.circles.get(&id)
    }

    /// Iterate over every point, in stable (insertion) order.
    pub fn points(&self) -> impl Iterator<Item = (Id, &Point)> {
        self.points.iter().map(|(id, p)| (*id, p))
    }

    /// Iterate over every line, in stable (insertion) order.
    pub fn lines(&self) -> impl Iterator<Item = (Id, &Line)> {
        self.lines.iter().map(|(id, l)| (*id, l))
    }

    /// Iterate over every circle, in stable (insertion) order.
    pub fn circles(&self) -> impl Iterator<Item = (Id, &Circle)> {
        self.circles.iter().map(|(id, c)| (*id, c))
    }

    /// Iterate over every constraint, in stable (insertion) order.
    pub fn constraints(&self) -> impl Iterator<Item = (Id, &Constraint)> {
        self.constraints.iter().map(|(id, c)| (*id, c))
    }

    /// How many points this sketch has.
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Remove a point and cascade the deletion to every line, circle and
    /// constraint that referenced it. Lines/circles
    /// removed this way are themselves swept from any constraint that
    /// referenced *them*, transitively.
    pub fn remove_point(&mut self, id: Id) {
        if self.points.shift_remove(&id).is_none() {
            return;
        }
        let dead_lines: Vec<Id> = self
            .lines
            .iter()
            .filter(|(_, l)| l.p1 == id || l.p2 == id)
            .map(|(id, _)| *id)
            .collect();
        let dead_circles: Vec<Id> = self
            .circles
            .iter()
            .filter(|(_, c)| c.center == id || c.radius_point == id)
            .map(|(id, _)| *id)
            .collect();
        for dead in &dead_lines {
            self.lines.shift_remove(dead);
        }
        for dead in &dead_circles {
            self.circles.shift_remove(dead);
        }
        self.constraints.retain(|_, c| {
            !c.references_point(id)
                && !dead_lines.iter().any(|l| c.references_line(*l))
                && !dead_circles.iter().any(|cc| c.references_circle(*cc))
        });
    }

    /// Remove a constraint by ID. A no-op if it doesn't exist.
    pub fn remove_constraint(&mut self, id: Id) {
        self.constraints.shift_remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::{Constraint, Kind};

    #[test]
    fn removing_a_point_cascades_to_lines_circles_and_constraints() {
        let mut g = Geometry::new();
        g.insert_point(0, Point::new(0.0, 0.0));
        g.insert_point(1, Point::new(1.0, 1.0));
        g.insert_point(2, Point::new(2.0, 2.0));
        g.insert_line(10, Line::new(0, 1));
        g.insert_circle(20, Circle::new(0, 2));
        g.insert_constraint(30, Constraint::new(Kind::FixX(0, 0.0)));
        g.insert_constraint(31, Constraint::new(Kind::Distance(1, 2, 5.0)));

        g.remove_point(0);

        assert!(g.point(0).is_none());
        assert!(g.line(10).is_none(), "line referencing deleted point must cascade");
        assert!(
            g.circle(20).is_none(),
            "circle referencing deleted point must cascade"
        );
        assert!(
            g.constraints().all(|(id, _)| id != 30),
            "constraint referencing deleted point must cascade"
        );
        assert!(
            g.constraints().any(|(id, _)| id == 31),
            "unrelated constraint must survive"
        );
    }

    #[test]
    fn removing_unknown_point_is_a_no_op() {
        let mut g = Geometry::new();
        g.insert_point(0, Point::new(0.0, 0.0));
        g.remove_point(999);
        assert_eq!(g.point_count(), 1);
    }

    #[test]
    fn iteration_order_is_insertion_order() {
        let mut g = Geometry::new();
        g.insert_point(5, Point::new(0.0, 0.0));
        g.insert_point(2, Point::new(1.0, 1.0));
        g.insert_point(9, Point::new(2.0, 2.0));
        let ids: Vec<Id> = g.points().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![5, 2, 9]);
    }
}
