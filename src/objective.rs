//! The scalar objective and its gradient: a weighted sum of
//! squared residuals, differentiated numerically rather than
//! analytically — there is no Jacobian anywhere in this crate. A single
//! central-difference formula stands in for every constraint kind at
//! once, which is the whole point of routing every kind through one
//! [`crate::residual::residual_for`].

use crate::geometry::Geometry;
use crate::pack::{PackedView, Packer};
use crate::residual::residual_for;

/// `F(x) = Σ_c priority(c) · r_c(unpack(x))²`, summed over every
/// constraint in `topology`. Structurally invalid constraints (missing
/// entity, wrong arity) contribute nothing, matching [`crate::evaluate`]'s
/// treatment of the same case.
pub(crate) fn objective(topology: &Geometry, packer: &Packer, x: &[f64]) -> f64 {
    let view = PackedView { packer, x };
    topology
        .constraints()
        .filter_map(|(_, constraint)| {
            residual_for(constraint.kind(), topology, &view)
                .map(|(residual, _degenerate)| constraint.priority() * residual * residual)
        })
        .sum()
}

/// `∇F` by central finite differences, one pair of objective evaluations
/// per free variable: `g_i = (F(x + h·eᵢ) − F(x − h·eᵢ)) / (2h)`, with a
/// per-variable step `h = max(1e-6, 1e-6·|x_i|)`.
pub(crate) fn gradient(topology: &Geometry, packer: &Packer, x: &[f64]) -> Vec<f64> {
    let mut g = vec![0.0; x.len()];
    let mut perturbed = x.to_vec();
    for i in 0..x.len() {
        let h = (1e-6_f64).max(1e-6 * x[i].abs());

        perturbed[i] = x[i] + h;
        let f_plus = objective(topology, packer, &perturbed);

        perturbed[i] = x[i] - h;
        let f_minus = objective(topology, packer, &perturbed);

        perturbed[i] = x[i];
        g[i] = (f_plus - f_minus) / (2.0 * h);
    }
    g
}
