//! Error type for tree growth.

/// Errors surfaced by the growth core.
///
/// Reaching the iteration cap is *not* an error; it is reported as a
/// terminal [`crate::engine::Outcome`] alongside the grown structure.
#[derive(thiserror::Error, Debug)]
pub enum GrowthError {
    /// A configuration parameter violates its stated constraint.
    ///
    /// Raised at engine construction; no partial engine is returned.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The attractor field's assignment tracking desynchronized from its
    /// active point set. This is a programming-error-class fault and is
    /// not recoverable mid-run.
    #[error("assignment tracking desynchronized: {assigned} assignment entries for {active} active points")]
    AssignmentDesync {
        /// Number of assignment entries currently tracked.
        assigned: usize,
        /// Number of active attractor points.
        active: usize,
    },
}
