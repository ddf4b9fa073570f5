//! CDCL solver driver.
//!
//! Hands the encoder's CNF to varisat and decodes the model back into a
//! per-package version assignment. Each resolution builds a fresh solver;
//! nothing is reused across calls.

use crate::encoder::SatEncoder;
use crate::errors::ResolveError;
use ahash::{AHashMap, AHashSet};
use tracing::{debug, warn};
use varisat::{CnfFormula, ExtendFormula, Lit, Solver};

/// Verdict of one solver run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A model exists; the decoded `name -> version` assignment.
    Sat(AHashMap<String, String>),
    /// The constraint set admits no assignment.
    Unsat,
}

/// Solve the encoder's CNF.
///
/// An internal engine failure (the CDCL search giving up) surfaces as
/// [`ResolveError::SolverTimeout`] rather than a verdict.
pub fn solve(encoder: &SatEncoder<'_>) -> Result<Outcome, ResolveError> {
    debug!(
        variables = encoder.var_count(),
        clauses = encoder.clauses().len(),
        "dispatching CNF"
    );

    let mut formula = CnfFormula::new();
    for clause in encoder.clauses() {
        let lits: Vec<Lit> = clause
            .iter()
            .map(|&lit| Lit::from_dimacs(lit as isize))
            .collect();
        formula.add_clause(&lits);
    }

    let mut solver = Solver::new();
    solver.add_formula(&formula);

    match solver.solve() {
        Ok(true) => {
            let model = solver.model().unwrap_or_default();
            Ok(Outcome::Sat(decode(encoder, &model)))
        }
        Ok(false) => {
            debug!("formula is unsatisfiable");
            Ok(Outcome::Unsat)
        }
        Err(err) => {
            warn!(error = %err, "solver gave up");
            Err(ResolveError::SolverTimeout)
        }
    }
}

/// Project the model back onto packages.
///
/// Scans the variable table and keeps every `name@version` key whose variable
/// is true; `USE_*` pseudo-variables carry no `@` and fall away here.
fn decode(encoder: &SatEncoder<'_>, model: &[Lit]) -> AHashMap<String, String> {
    let positive: AHashSet<i32> = model
        .iter()
        .filter(|lit| lit.is_positive())
        .map(|lit| lit.to_dimacs() as i32)
        .collect();

    let mut assignment = AHashMap::new();
    for (key, id) in encoder.variables() {
        if !positive.contains(&id) {
            continue;
        }
        if let Some((name, version)) = key.split_once('@') {
            assignment.insert(name.to_string(), version.to_string());
        }
    }
    assignment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::{Atom, Constraint, Package};

    fn atom(s: &str) -> Atom {
        Atom::parse(s).unwrap()
    }

    #[test]
    fn satisfiable_problem_decodes_assignment() {
        let zlib = Package::new(atom("sys-libs/zlib"), "1.2.13", "0");
        let mut encoder = SatEncoder::new();
        encoder.add_package(&zlib);
        encoder.add_exactly_one(&atom("sys-libs/zlib"));

        match solve(&encoder).unwrap() {
            Outcome::Sat(assignment) => {
                assert_eq!(
                    assignment.get("sys-libs/zlib").map(String::as_str),
                    Some("1.2.13")
                );
            }
            Outcome::Unsat => panic!("expected sat"),
        }
    }

    #[test]
    fn empty_clause_is_unsat() {
        let zlib = Package::new(atom("sys-libs/zlib"), "1.2.13", "0");
        let mut encoder = SatEncoder::new();
        encoder.add_package(&zlib);
        encoder
            .add_constraint(&Constraint::versioned(
                atom("sys-libs/zlib"),
                crate::version::VersionConstraint::parse("<1.0").unwrap(),
            ))
            .unwrap();

        assert_eq!(solve(&encoder).unwrap(), Outcome::Unsat);
    }

    #[test]
    fn use_variables_are_projected_out() {
        let zlib = Package::new(atom("sys-libs/zlib"), "1.2.13", "0");
        let mut encoder = SatEncoder::new();
        encoder.add_package(&zlib);
        encoder.add_exactly_one(&atom("sys-libs/zlib"));
        encoder
            .add_constraint(&Constraint::Use {
                flag: "ssl".to_string(),
                required: true,
                condition: None,
            })
            .unwrap();

        match solve(&encoder).unwrap() {
            Outcome::Sat(assignment) => {
                assert_eq!(assignment.len(), 1);
                assert!(assignment.keys().all(|name| !name.starts_with("USE_")));
            }
            Outcome::Unsat => panic!("expected sat"),
        }
    }

    #[test]
    fn exactly_one_excludes_version_pairs() {
        let old = Package::new(atom("sys-libs/zlib"), "1.2.11", "0");
        let new = Package::new(atom("sys-libs/zlib"), "1.2.13", "0");
        let mut encoder = SatEncoder::new();
        encoder.add_package(&old);
        encoder.add_package(&new);
        encoder.add_exactly_one(&atom("sys-libs/zlib"));

        match solve(&encoder).unwrap() {
            Outcome::Sat(assignment) => {
                // Decoding soundness: one version per name.
                assert_eq!(assignment.len(), 1);
            }
            Outcome::Unsat => panic!("expected sat"),
        }
    }
}
