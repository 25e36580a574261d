//! Non-fatal observations collected during a solve, returned as data
//! rather than written to a log (this crate never takes a `log`/
//! `tracing` dependency; a caller embedding it in a service is expected
//! to log these itself). Grounded in the same shape as a diagnostics
//! collector, just carrying solver-specific content instead of
//! geometry-kernel content.

use crate::id::Id;

/// One thing worth surfacing about a constraint without failing the
/// solve over it.
#[derive(Clone, Debug, PartialEq)]
pub enum WarningContent {
    /// The constraint referenced an entity that doesn't exist in the
    /// geometry (or had too few entities for its arity), so it
    /// contributed nothing to the objective.
    SkippedStructurallyInvalid,
    /// The constraint's residual formula hit a degenerate denominator
    /// (a zero-length line or vector) and was clamped to zero rather
    /// than producing NaN or infinity.
    ClampedDegenerate,
}

/// A single diagnostic, tied to the constraint it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct Warning {
    /// The constraint this diagnostic is about.
    pub constraint: Id,
    /// What was observed.
    pub content: WarningContent,
}

impl Warning {
    pub(crate) fn new(constraint: Id, content: WarningContent) -> Self {
        Self { constraint, content }
    }
}
