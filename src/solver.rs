//! The orchestrator: turns a `Geometry` plus a `Config` into a solved
//! `Geometry`, pairing the numbers the driver produces with the
//! yes/no verdict a caller actually wants.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::Config;
use crate::diagnostics::{Warning, WarningContent};
use crate::driver::{self, Statistics};
use crate::error::Error;
use crate::geometry::Geometry;
use crate::pack::Packer;
use crate::residual::{residual_for, FEASIBILITY_EPSILON};

/// The result of a solve: the geometry with free coordinates updated
/// (or untouched, if it didn't succeed), whether every constraint ended
/// up feasible, the run's statistics, and anything worth surfacing
/// about individual constraints along the way.
#[derive(Clone, Debug, PartialEq)]
pub struct SolveOutcome {
    /// The (possibly updated) geometry.
    pub geometry: Geometry,
    /// Whether the final objective is at or below tolerance *and* every
    /// constraint is individually feasible in the final geometry. The
    /// aggregate objective clearing tolerance is necessary but not
    /// sufficient on its own — priorities can let a low `F` coexist with
    /// one badly violated constraint — and is checked independent of how
    /// the driver terminated, since a stalled line search can still have
    /// landed on a feasible point.
    pub success: bool,
    /// Statistics from the underlying driver run.
    pub statistics: Statistics,
    /// Non-fatal observations about individual constraints.
    pub warnings: Vec<Warning>,
}

/// Solve `geometry` with the default [`Config`].
/// ```
/// use sketch_solver::{solve, Constraint, Geometry, Kind, Point};
///
/// let mut geometry = Geometry::new();
/// geometry.insert_point(0, Point::new(0.0, 0.0));
/// geometry.insert_point(1, Point::new(9.0, 9.0));
/// geometry.insert_constraint(0, Constraint::new(Kind::FixX(0, 0.0)));
/// geometry.insert_constraint(1, Constraint::new(Kind::FixY(0, 0.0)));
/// geometry.insert_constraint(2, Constraint::new(Kind::FixY(1, 0.0)));
/// geometry.insert_constraint(3, Constraint::new(Kind::Distance(0, 1, 6.0)));
///
/// // Solving twice from the same starting geometry is deterministic.
/// let once = solve(&geometry);
/// let twice = solve(&geometry);
/// assert!(once.success && twice.success);
/// assert_eq!(once.geometry.point(1), twice.geometry.point(1));
/// ```
pub fn solve(geometry: &Geometry) -> SolveOutcome {
    solve_with_config(geometry, &Config::default())
}

/// Solve `geometry` with an explicit [`Config`]. Stateless and
/// reentrant: every call builds its own packer and runs its own driver
/// loop, so there's nothing to serialize here. Use [`Solver`] instead
/// when concurrent callers share one handle and should be rejected
/// rather than interleaved.
pub fn solve_with_config(geometry: &Geometry, config: &Config) -> SolveOutcome {
    if geometry.constraints().next().is_none() {
        return SolveOutcome {
            geometry: geometry.clone(),
            success: true,
            statistics: Statistics {
                iterations: 0,
                final_objective: 0.0,
                final_gradient_norm: 0.0,
                termination: driver::TerminationState::Converged,
                wall_time: std::time::Duration::ZERO,
            },
            warnings: Vec::new(),
        };
    }

    let (packer, x0) = Packer::build(geometry);
    let (x, statistics) = driver::run(geometry, &packer, x0, config);
    let solved = packer.unpack(&x, geometry);

    let mut warnings = Vec::new();
    let mut all_feasible = true;
    for (id, constraint) in solved.constraints() {
        match residual_for(constraint.kind(), &solved, &solved) {
            None => {
                warnings.push(Warning::new(id, WarningContent::SkippedStructurallyInvalid));
            }
            Some((residual, degenerate)) => {
                if degenerate {
                    warnings.push(Warning::new(id, WarningContent::ClampedDegenerate));
                }
                if residual.abs() > FEASIBILITY_EPSILON {
                    all_feasible = false;
                }
            }
        }
    }

    let success = statistics.final_objective <= config.objective_tolerance && all_feasible;

    SolveOutcome {
        geometry: solved,
        success,
        statistics,
        warnings,
    }
}

/// A solve handle that rejects concurrent invocations instead of
/// interleaving them (Idle → Running → (Succeeded | Failed) →
/// Idle, with a concurrent call observed while Running treated as a
/// no-op error rather than queued work).
#[derive(Debug, Default)]
pub struct Solver {
    running: AtomicBool,
}

impl Solver {
    /// A solver with no solve in progress.
    pub fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
        }
    }

    /// Attempt a solve. Returns [`Error::AlreadyRunning`] if another
    /// solve on this handle is already in progress.
    pub fn solve(&self, geometry: &Geometry, config: &Config) -> Result<SolveOutcome, Error> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::AlreadyRunning);
        }
        let outcome = solve_with_config(geometry, config);
        self.running.store(false, Ordering::Release);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::{Constraint, Kind};
    use crate::geometry::Point;

    #[test]
    fn geometry_with_no_constraints_solves_trivially() {
        let mut g = Geometry::new();
        g.insert_point(0, Point::new(1.0, 2.0));
        let outcome = solve(&g);
        assert!(outcome.success);
        assert_eq!(outcome.statistics.iterations, 0);
        assert_eq!(outcome.geometry.point(0).copied().unwrap(), Point::new(1.0, 2.0));
    }

    #[test]
    fn a_satisfiable_sketch_solves_successfully() {
        let mut g = Geometry::new();
        g.insert_point(0, Point::new(0.0, 0.0));
        g.insert_point(1, Point::new(1.0, 0.0));
        g.insert_constraint(10, Constraint::new(Kind::FixX(0, 0.0)));
        g.insert_constraint(11, Constraint::new(Kind::FixY(0, 0.0)));
        g.insert_constraint(12, Constraint::new(Kind::FixY(1, 0.0)));
        g.insert_constraint(13, Constraint::new(Kind::Distance(0, 1, 7.0)));

        let outcome = solve(&g);
        assert!(outcome.success, "statistics: {:?}", outcome.statistics);
        let p1 = outcome.geometry.point(1).unwrap();
        assert!((p1.x - 7.0).abs() < 1e-4);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn structurally_invalid_constraint_is_reported_as_a_warning_not_an_error() {
        let mut g = Geometry::new();
        g.insert_point(0, Point::new(0.0, 0.0));
        g.insert_constraint(10, Constraint::new(Kind::Distance(0, 99, 5.0)));

        let outcome = solve(&g);
        assert!(outcome.success);
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(
            outcome.warnings[0].content,
            WarningContent::SkippedStructurallyInvalid
        );
    }

    #[test]
    fn concurrent_invocation_on_a_shared_solver_is_rejected() {
        // A single-threaded stand-in for concurrency: manually mark the
        // solver as running and confirm a second call observes it.
        let solver = Solver::new();
        solver.running.store(true, Ordering::SeqCst);

        let mut g = Geometry::new();
        g.insert_point(0, Point::new(0.0, 0.0));
        let result = solver.solve(&g, &Config::default());
        assert_eq!(result, Err(Error::AlreadyRunning));

        solver.running.store(false, Ordering::SeqCst);
        assert!(solver.solve(&g, &Config::default()).is_ok());
    }
}
