#![doc = include_str!("../README.md")]

pub use crate::config::Config;
pub use crate::constraints::{Constraint, Kind};
pub use crate::diagnostics::{Warning, WarningContent};
pub use crate::driver::{Statistics, TerminationState};
pub use crate::error::Error;
pub use crate::geometry::{Circle, Geometry, Line, Point};
pub use crate::id::{Id, IdGenerator};
pub use crate::residual::{evaluate, Evaluation, FEASIBILITY_EPSILON};
pub use crate::solver::{solve, solve_with_config, SolveOutcome, Solver};

/// Tunable knobs for the gradient-descent driver.
mod config;
/// Each kind of constraint this crate understands.
mod constraints;
/// Non-fatal observations collected during a solve.
mod diagnostics;
/// The gradient-descent driver and its termination bookkeeping.
mod driver;
/// The boundary error type. Everything else stays a value.
mod error;
/// Points, lines, circles and the constraints tying them together.
mod geometry;
/// Opaque IDs of entities and constraints.
mod id;
/// The scalar objective and its finite-difference gradient.
mod objective;
/// The variable packer: free coordinates <-> a dense solve vector.
mod pack;
/// One closed-form residual formula per constraint kind.
mod residual;
/// The orchestrator tying the packer and driver together.
mod solver;
/// A minimal internal 2D vector used by the residual evaluator.
mod vector;
