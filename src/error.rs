//! Errors for the genuine boundary failures of this crate. Per-constraint
//! structural and numerical problems stay values all the way through; an
//! `Error` only shows up when the orchestrator itself can't be entered
//! at all.

/// Something that prevented a [`crate::solve`] call from running at
/// all. A non-convergent solve is not an `Error`: it comes back as a
/// [`crate::SolveOutcome`] with `success: false` and full statistics.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// A solve was requested while another was already running on this
    /// orchestrator (concurrent invocation is rejected, not
    /// queued).
    #[error("a solve is already in progress")]
    AlreadyRunning,
}
