//! The gradient-descent driver: plain steepest descent with an
//! Armijo backtracking line search, no momentum, no curvature estimate.
//! Runs entirely over the packed vector `x`; turning the result back
//! into a `Geometry` is the orchestrator's job, not this module's.

use std::time::{Duration, Instant};

use crate::config::Config;
use crate::geometry::Geometry;
use crate::objective::{gradient, objective};
use crate::pack::Packer;

/// Why the driver stopped iterating.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminationState {
    /// Gradient norm or objective value fell below its tolerance.
    Converged,
    /// The line search could no longer find a decreasing step, or
    /// improvement stagnated for `stagnation_window` iterations in a row.
    Stalled,
    /// `max_iterations` was reached without converging or stalling.
    Exhausted,
}

/// What happened during one driver run, independent of whether the
/// result counts as a solved sketch — that judgment (is every
/// residual feasible, not just the aggregate objective) belongs to the
/// orchestrator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Statistics {
    /// Number of accepted descent steps taken.
    pub iterations: usize,
    /// `F(x)` at the final iterate.
    pub final_objective: f64,
    /// `‖∇F(x)‖` at the final iterate.
    pub final_gradient_norm: f64,
    /// Why the driver stopped.
    pub termination: TerminationState,
    /// Wall-clock time spent in this run.
    pub wall_time: Duration,
}

fn l2_norm(v: &[f64]) -> f64 {
    libm::sqrt(v.iter().map(|c| c * c).sum())
}

fn step(x: &[f64], g: &[f64], alpha: f64) -> Vec<f64> {
    x.iter().zip(g).map(|(xi, gi)| xi - alpha * gi).collect()
}

/// Run the driver to completion starting from `x0`, returning the final
/// packed vector and run statistics. `topology` supplies the
/// line/circle → point structure that doesn't change during a solve;
/// only `x` does.
pub(crate) fn run(
    topology: &Geometry,
    packer: &Packer,
    x0: Vec<f64>,
    config: &Config,
) -> (Vec<f64>, Statistics) {
    let start = Instant::now();

    if x0.is_empty() {
        let final_objective = objective(topology, packer, &x0);
        return (
            x0,
            Statistics {
                iterations: 0,
                final_objective,
                final_gradient_norm: 0.0,
                termination: TerminationState::Converged,
                wall_time: start.elapsed(),
            },
        );
    }

    let mut x = x0;
    let mut f_cur = objective(topology, packer, &x);
    let mut alpha = config.initial_step;
    let mut stagnation = 0usize;
    let mut iterations = 0usize;
    let mut final_gradient_norm = 0.0;

    let termination = loop {
        let g = gradient(topology, packer, &x);
        let g_norm = l2_norm(&g);
        final_gradient_norm = g_norm;
        if g_norm <= config.gradient_tolerance {
            break TerminationState::Converged;
        }

        let g_norm_sq = g_norm * g_norm;
        let mut trial = alpha;
        loop {
            let candidate = step(&x, &g, trial);
            let f_candidate = objective(topology, packer, &candidate);
            let threshold = f_cur - config.armijo_c1 * trial * g_norm_sq;
            if f_candidate <= threshold || trial < config.min_step {
                break;
            }
            trial *= config.backtracking_factor;
        }
        if trial < config.min_step {
            break TerminationState::Stalled;
        }

        x = step(&x, &g, trial);
        let f_new = objective(topology, packer, &x);
        if f_cur - f_new < config.stagnation_relative_improvement * f_cur.max(1.0) {
            stagnation += 1;
        } else {
            stagnation = 0;
        }
        f_cur = f_new;
        if stagnation >= config.stagnation_window {
            break TerminationState::Stalled;
        }

        alpha = config.initial_step.min(trial / config.backtracking_factor);
        if f_cur <= config.objective_tolerance {
            break TerminationState::Converged;
        }

        iterations += 1;
        if iterations >= config.max_iterations {
            break TerminationState::Exhausted;
        }
    };

    (
        x,
        Statistics {
            iterations,
            final_objective: f_cur,
            final_gradient_norm,
            termination,
            wall_time: start.elapsed(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::{Constraint, Kind};
    use crate::geometry::Point;

    #[test]
    fn drives_a_single_distance_constraint_to_convergence() {
        let mut g = Geometry::new();
        g.insert_point(0, Point::new(0.0, 0.0));
        g.insert_point(1, Point::new(10.0, 0.0));
        g.insert_constraint(10, Constraint::new(Kind::FixX(0, 0.0)));
        g.insert_constraint(11, Constraint::new(Kind::FixY(0, 0.0)));
        g.insert_constraint(12, Constraint::new(Kind::FixY(1, 0.0)));
        g.insert_constraint(13, Constraint::new(Kind::Distance(0, 1, 5.0)));

        let (packer, x0) = Packer::build(&g);
        let config = Config::default();
        let (x, stats) = run(&g, &packer, x0, &config);

        assert_eq!(stats.termination, TerminationState::Converged);
        assert!(stats.final_objective <= config.objective_tolerance * 10.0);
        // point 1's only free coordinate is its x; it should land near 5.
        assert!((x[0] - 5.0).abs() < 1e-3);
    }

    #[test]
    fn zero_free_variables_converges_immediately() {
        let mut g = Geometry::new();
        g.insert_point(0, Point::new(1.0, 2.0));
        g.insert_constraint(10, Constraint::new(Kind::FixX(0, 1.0)));
        g.insert_constraint(11, Constraint::new(Kind::FixY(0, 2.0)));

        let (packer, x0) = Packer::build(&g);
        let (_, stats) = run(&g, &packer, x0, &Config::default());
        assert_eq!(stats.iterations, 0);
        assert_eq!(stats.termination, TerminationState::Converged);
    }

    #[test]
    fn conflicting_distance_targets_converge_to_a_compromise() {
        // Two Distance constraints on the same pair, pulling opposite
        // ways, can't both be satisfied; the least-squares objective
        // still has a smooth interior minimum (the average), so the
        // driver converges there with a nonzero final objective rather
        // than satisfying either target exactly.
        let mut g = Geometry::new();
        g.insert_point(0, Point::new(0.0, 0.0));
        g.insert_point(1, Point::new(1.0, 0.0));
        g.insert_constraint(10, Constraint::new(Kind::Distance(0, 1, 0.0)));
        g.insert_constraint(11, Constraint::new(Kind::FixX(0, 0.0)));
        g.insert_constraint(12, Constraint::new(Kind::FixY(0, 0.0)));
        g.insert_constraint(13, Constraint::new(Kind::FixY(1, 0.0)));
        g.insert_constraint(14, Constraint::new(Kind::Distance(0, 1, 1000.0)));

        let (packer, x0) = Packer::build(&g);
        let (x, stats) = run(&g, &packer, x0, &Config::default());
        assert_eq!(stats.termination, TerminationState::Converged);
        assert!((x[0] - 500.0).abs() < 1.0);
        assert!(stats.final_objective > 1.0);
    }
}
