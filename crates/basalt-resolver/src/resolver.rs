//! The resolution pipeline.
//!
//! Composes the collector, encoder, and solver driver behind one entry
//! point: collect the reachable graph, register every package, emit the
//! root pins and declared constraints, force exactly-one per package, solve,
//! and decode the model back into packages loaded from the repository.

use crate::collector;
use crate::encoder::SatEncoder;
use crate::errors::ResolveError;
use crate::package::{Atom, Constraint, Package};
use crate::repository::Repository;
use crate::solver::{self, Outcome};
use crate::version::VersionConstraint;
use ahash::AHashSet;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Dependency resolver over a repository of package definitions.
///
/// Each call to [`Resolver::resolve`] is independent: a fresh encoder and a
/// fresh solver, no state shared across resolutions.
pub struct Resolver<R> {
    repo: R,
}

impl<R: Repository> Resolver<R> {
    /// Create a resolver backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Resolve the requested atoms to a consistent set of packages.
    ///
    /// On success every requested atom appears in the returned map, pinned to
    /// the version the repository serves for it, together with every
    /// transitively selected dependency.
    pub fn resolve(&self, requested: &[String]) -> Result<BTreeMap<Atom, Package>, ResolveError> {
        let graph = collector::collect(&self.repo, requested)?;
        info!(packages = graph.len(), "dependency graph collected");

        let mut encoder = SatEncoder::new();
        for package in graph.values() {
            encoder.add_package(package);
        }

        let requested_names: AHashSet<&str> = requested.iter().map(String::as_str).collect();

        for package in graph.values() {
            if requested_names.contains(package.name.as_str()) {
                // Root pin: the collector already committed to this version.
                debug!(package = %package.name, version = %package.version, "pinning requested package");
                let pin = Constraint::versioned(
                    package.name.clone(),
                    VersionConstraint::exact(package.version.clone()),
                );
                encoder.add_constraint(&pin)?;
            }

            for dep in &package.deps {
                if let Constraint::Version { name, .. } = dep {
                    if !graph.contains_key(name) {
                        // Still forwarded: the encoder turns it into an
                        // unsatisfiable or missing-package condition.
                        warn!(package = %package.name, dependency = %name, "dependency missing from graph");
                    }
                }
                encoder.add_constraint(dep)?;
            }
        }

        for name in graph.keys() {
            encoder.add_exactly_one(name);
        }

        let assignment = match solver::solve(&encoder)? {
            Outcome::Sat(assignment) => assignment,
            Outcome::Unsat => return Err(ResolveError::NoSolution),
        };

        let mut solution = BTreeMap::new();
        for (name, version) in &assignment {
            match self.repo.load_package(name) {
                Ok(package) => {
                    debug!(package = %name, %version, "selected");
                    solution.insert(package.name.clone(), package);
                }
                Err(err) => {
                    warn!(package = %name, error = %err, "selected package vanished from repository")
                }
            }
        }

        info!(selected = solution.len(), "resolution complete");
        Ok(solution)
    }
}

impl<R: std::fmt::Debug> std::fmt::Debug for Resolver<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver").field("repo", &self.repo).finish()
    }
}
