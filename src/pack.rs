//! The variable packer: a deterministic bijection between the set of
//! free point coordinates and a dense vector `x ∈ ℝⁿ`.
//!
//! Fixed coordinates — those pinned by a `fix-x`/`fix-y` constraint —
//! never appear in `x`; they're folded in as constants everywhere a
//! coordinate is looked up during a solve.

use indexmap::IndexMap;

use crate::constraints::Kind;
use crate::geometry::Geometry;
use crate::id::Id;
use crate::residual::Coordinates;

/// Where a single coordinate (one axis of one point) lives.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Slot {
    /// A free variable, at this index into the packed vector.
    Free(usize),
    /// Pinned to this constant by a `fix-x`/`fix-y` constraint.
    Fixed(f64),
}

/// Maps every point's `(x, y)` to a [`Slot`], built once per solve from
/// a `Geometry`'s points and `fix-x`/`fix-y` constraints.
///
/// Iteration order over `geometry.points()` (itself insertion-ordered,
/// see [`Geometry`]) is threaded straight through into slot indices, so
/// the same `Geometry` always packs to the same layout — iteration
/// order must be stable across calls.
#[derive(Debug)]
pub(crate) struct Packer {
    x_slots: IndexMap<Id, Slot>,
    y_slots: IndexMap<Id, Slot>,
    free_count: usize,
}

impl Packer {
    /// Build a packer for `geometry`, along with the initial packed
    /// vector `x₀`.
    pub fn build(geometry: &Geometry) -> (Self, Vec<f64>) {
        let mut fixed_x: IndexMap<Id, f64> = IndexMap::new();
        let mut fixed_y: IndexMap<Id, f64> = IndexMap::new();
        for (_, constraint) in geometry.constraints() {
            match constraint.kind() {
                Kind::FixX(point, target) => {
                    fixed_x.entry(*point).or_insert(*target);
                }
                Kind::FixY(point, target) => {
                    fixed_y.entry(*point).or_insert(*target);
                }
                _ => {}
            }
        }

        let mut x_slots = IndexMap::with_capacity(geometry.point_count());
        let mut y_slots = IndexMap::with_capacity(geometry.point_count());
        let mut x0 = Vec::new();
        let mut next_index = 0;
        for (id, point) in geometry.points() {
            match fixed_x.get(&id) {
                Some(target) => {
                    x_slots.insert(id, Slot::Fixed(*target));
                }
                None => {
                    x_slots.insert(id, Slot::Free(next_index));
                    next_index += 1;
                    x0.push(point.x);
                }
            }
            match fixed_y.get(&id) {
                Some(target) => {
                    y_slots.insert(id, Slot::Fixed(*target));
                }
                None => {
                    y_slots.insert(id, Slot::Free(next_index));
                    next_index += 1;
                    x0.push(point.y);
                }
            }
        }

        (
            Self {
                x_slots,
                y_slots,
                free_count: next_index,
            },
            x0,
        )
    }

    /// How many free variables this packer's vectors hold.
    pub fn free_count(&self) -> usize {
        self.free_count
    }

    pub fn slot_x(&self, point: Id) -> Option<Slot> {
        self.x_slots.get(&point).copied()
    }

    pub fn slot_y(&self, point: Id) -> Option<Slot> {
        self.y_slots.get(&point).copied()
    }

    /// Write a solved vector back into a fresh copy of `base`, updating
    /// free coordinates from `x` and fixed coordinates from their
    /// targets.
    pub fn unpack(&self, x: &[f64], base: &Geometry) -> Geometry {
        let mut out = base.clone();
        for (id, slot) in self.x_slots.iter() {
            let value = match slot {
                Slot::Free(index) => x[*index],
                Slot::Fixed(value) => *value,
            };
            if let Some(point) = out.point(*id).copied() {
                out.insert_point(*id, crate::geometry::Point::new(value, point.y));
            }
        }
        for (id, slot) in self.y_slots.iter() {
            let value = match slot {
                Slot::Free(index) => x[*index],
                Slot::Fixed(value) => *value,
            };
            if let Some(point) = out.point(*id).copied() {
                out.insert_point(*id, crate::geometry::Point::new(point.x, value));
            }
        }
        out
    }
}

/// A [`Coordinates`] view over the packer's current vector, used by the
/// objective/gradient so a full `Geometry` doesn't need to be rebuilt on
/// every perturbation.
pub(crate) struct PackedView<'a> {
    pub packer: &'a Packer,
    pub x: &'a [f64],
}

impl Coordinates for PackedView<'_> {
    fn xy(&self, point: Id) -> Option<(f64, f64)> {
        let resolve = |slot: Slot| match slot {
            Slot::Free(index) => self.x[index],
            Slot::Fixed(value) => value,
        };
        let x = resolve(self.packer.slot_x(point)?);
        let y = resolve(self.packer.slot_y(point)?);
        Some((x, y))
    }
}
