//! Errors surfaced by dependency resolution.

use thiserror::Error;

/// Errors that can occur during dependency resolution.
///
/// Every variant is fatal to the resolve call that produced it; nothing here
/// leaves external state mutated. Missing *transitive* dependencies are not
/// errors at all; the collector logs them and the unresolvable constraint
/// surfaces later through the encoder.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A requested or required package is not known.
    #[error("package not found: {name}")]
    PackageNotFound {
        /// Name of the missing package.
        name: String,
    },

    /// A slot constraint matched no registered package.
    #[error("no package provides slot {slot}")]
    NoProvider {
        /// The unsatisfied slot name.
        slot: String,
    },

    /// The constraint set admits no assignment.
    #[error("no assignment satisfies the requested packages")]
    NoSolution,

    /// The SAT engine gave up before reaching a verdict.
    #[error("solver gave up before reaching a verdict")]
    SolverTimeout,

    /// A requested name is not a valid `category/name` atom.
    #[error("invalid package atom: {atom}")]
    InvalidAtom {
        /// The malformed input.
        atom: String,
    },

    /// The repository failed for a reason other than a missing package.
    #[error("repository error: {message}")]
    Repository {
        /// Adapter-provided description.
        message: String,
    },
}
