//! CNF encoding of package constraints.
//!
//! The encoder owns a bijection between string keys and positive variable
//! ids, plus an append-only, deduplicated clause list. Two key shapes exist:
//! `name@version` for "this concrete package version is installed" and
//! `USE_flag` for "this USE flag is demanded". Negative literals are negated
//! variables, DIMACS style.
//!
//! Packages are registered first and borrowed read-only for the lifetime of
//! the encoder; the collector's map stays the owner.

use crate::errors::ResolveError;
use crate::package::{Atom, Constraint, Package};
use crate::version::VersionConstraint;
use ahash::{AHashMap, AHashSet};
use tracing::{debug, trace, warn};

/// Key prefix for USE-flag variables.
const USE_PREFIX: &str = "USE_";

fn package_key(name: &Atom, version: &str) -> String {
    format!("{name}@{version}")
}

/// Translates registered packages and their constraints into CNF.
#[derive(Default)]
pub struct SatEncoder<'a> {
    /// Key -> variable id; ids start at 1 and are never reused.
    vars: AHashMap<String, i32>,
    /// Package name -> registered versions, in registration order.
    packages: AHashMap<&'a str, Vec<&'a Package>>,
    /// Emitted clauses, in emission order.
    clauses: Vec<Vec<i32>>,
    /// Canonical (sorted) forms of every emitted clause.
    seen: AHashSet<Vec<i32>>,
}

impl<'a> SatEncoder<'a> {
    /// Create an empty encoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up or allocate the variable for a key.
    ///
    /// Deterministic and idempotent: a known key returns its existing id, an
    /// unknown key gets `len + 1`.
    fn var_id(&mut self, key: &str) -> i32 {
        if let Some(&id) = self.vars.get(key) {
            return id;
        }
        let id = self.vars.len() as i32 + 1;
        self.vars.insert(key.to_string(), id);
        id
    }

    /// Append a clause unless its canonical form was already emitted.
    fn add_clause(&mut self, clause: Vec<i32>) {
        let mut canonical = clause.clone();
        canonical.sort_unstable();
        if !self.seen.insert(canonical) {
            return;
        }
        trace!(?clause, "clause added");
        self.clauses.push(clause);
    }

    /// Register a package version, allocating its variable.
    ///
    /// Registering the same `(name, version)` twice is a no-op.
    pub fn add_package(&mut self, package: &'a Package) {
        let versions = self.packages.entry(package.name.as_str()).or_default();
        if versions
            .iter()
            .any(|existing| existing.version == package.version)
        {
            return;
        }
        versions.push(package);

        let key = package_key(&package.name, &package.version);
        self.var_id(&key);
        debug!(package = %package.name, version = %package.version, "package registered");
    }

    /// Encode one constraint.
    pub fn add_constraint(&mut self, constraint: &Constraint) -> Result<(), ResolveError> {
        match constraint {
            Constraint::Version {
                name,
                constraint: bound,
                ..
            } => match bound {
                Some(vc) => {
                    self.add_version_constraint(name, vc);
                    Ok(())
                }
                None => self.add_simple_constraint(name),
            },
            Constraint::Slot { slot } => self.add_slot_constraint(slot),
            Constraint::Use { flag, required, .. } => {
                if *required {
                    let var = self.var_id(&format!("{USE_PREFIX}{flag}"));
                    self.add_clause(vec![var]);
                }
                Ok(())
            }
        }
    }

    /// "At least one satisfying version of `name` is installed."
    ///
    /// When no registered version satisfies the bound, the empty clause is
    /// emitted: the requirement is unsatisfiable and the solver will report
    /// so. That is also how a dependency the collector could not load ends
    /// up surfacing: as an unsolvable problem rather than a silent drop.
    fn add_version_constraint(&mut self, name: &Atom, bound: &VersionConstraint) {
        trace!(package = %name, constraint = %bound, "encoding version constraint");

        let keys: Vec<String> = self
            .packages
            .get(name.as_str())
            .map(|versions| {
                versions
                    .iter()
                    .filter(|p| bound.satisfies(&p.version))
                    .map(|p| package_key(&p.name, &p.version))
                    .collect()
            })
            .unwrap_or_default();

        if keys.is_empty() {
            warn!(package = %name, constraint = %bound, "no registered version satisfies constraint");
            self.add_clause(Vec::new());
            return;
        }

        let clause: Vec<i32> = keys.iter().map(|key| self.var_id(key)).collect();
        self.add_clause(clause);
    }

    /// "At least one version of `name` is installed", any version.
    fn add_simple_constraint(&mut self, name: &Atom) -> Result<(), ResolveError> {
        let keys: Vec<String> = match self.packages.get(name.as_str()) {
            Some(versions) if !versions.is_empty() => versions
                .iter()
                .map(|p| package_key(&p.name, &p.version))
                .collect(),
            _ => {
                return Err(ResolveError::PackageNotFound {
                    name: name.as_str().to_string(),
                });
            }
        };

        let clause: Vec<i32> = keys.iter().map(|key| self.var_id(key)).collect();
        self.add_clause(clause);
        Ok(())
    }

    /// "At least one package occupying the slot is installed."
    fn add_slot_constraint(&mut self, slot: &str) -> Result<(), ResolveError> {
        let keys: Vec<String> = self
            .packages
            .values()
            .flatten()
            .filter(|p| p.slot.name == slot)
            .map(|p| package_key(&p.name, &p.version))
            .collect();

        if keys.is_empty() {
            return Err(ResolveError::NoProvider {
                slot: slot.to_string(),
            });
        }

        let clause: Vec<i32> = keys.iter().map(|key| self.var_id(key)).collect();
        self.add_clause(clause);
        Ok(())
    }

    /// Emit exactly-one over the registered versions of a package.
    ///
    /// A single registered version yields only the mandatory unit clause; an
    /// unregistered name is a no-op. Emission is on demand; the orchestrator
    /// decides which packages get it.
    pub fn add_exactly_one(&mut self, name: &Atom) {
        let keys: Vec<String> = self
            .packages
            .get(name.as_str())
            .map(|versions| {
                versions
                    .iter()
                    .map(|p| package_key(&p.name, &p.version))
                    .collect()
            })
            .unwrap_or_default();

        if keys.is_empty() {
            return;
        }

        let vars: Vec<i32> = keys.iter().map(|key| self.var_id(key)).collect();
        for clause in exactly_one(&vars) {
            self.add_clause(clause);
        }
        debug!(package = %name, versions = vars.len(), "exactly-one emitted");
    }

    /// The emitted clause list.
    #[must_use]
    pub fn clauses(&self) -> &[Vec<i32>] {
        &self.clauses
    }

    /// Number of allocated variables.
    #[must_use]
    pub fn var_count(&self) -> usize {
        self.vars.len()
    }

    /// Iterate the variable table as `(key, id)` pairs.
    pub fn variables(&self) -> impl Iterator<Item = (&str, i32)> {
        self.vars.iter().map(|(key, &id)| (key.as_str(), id))
    }
}

/// Clauses forcing exactly one of `vars` true: the full disjunction plus all
/// pairwise negations.
fn exactly_one(vars: &[i32]) -> Vec<Vec<i32>> {
    let mut clauses = vec![vars.to_vec()];
    for i in 0..vars.len() {
        for j in i + 1..vars.len() {
            clauses.push(vec![-vars[i], -vars[j]]);
        }
    }
    clauses
}
