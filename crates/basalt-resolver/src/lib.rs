//! SAT-based dependency resolution for source-based package trees.
//!
//! Given one or more requested package atoms and a [`Repository`] of
//! ebuild-style definitions, the resolver selects exactly one version per
//! package satisfying all version, slot, and USE-flag constraints, or reports
//! that no such assignment exists.
//!
//! The pipeline: the [`collector`] walks the transitive dependency graph, the
//! [`encoder`] compiles packages and constraints to CNF, the [`solver`]
//! driver runs a CDCL engine over it, and the [`resolver`] orchestrates the
//! whole trip and decodes the model back to packages.
//!
//! # Example
//!
//! ```rust,ignore
//! use basalt_resolver::Resolver;
//!
//! let resolver = Resolver::new(repository);
//! let solution = resolver.resolve(&["app-misc/hello".to_string()])?;
//! for (atom, package) in &solution {
//!     println!("{atom} -> {}", package.version);
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod collector;
pub mod encoder;
pub mod errors;
pub mod package;
pub mod repository;
pub mod resolver;
pub mod solver;
pub mod version;

pub use errors::ResolveError;
pub use package::{Atom, Constraint, Package, Slot};
pub use repository::Repository;
pub use resolver::Resolver;
pub use solver::Outcome;
pub use version::{VersionConstraint, VersionOperator, compare};
