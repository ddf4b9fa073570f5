//! Transitive closure of package metadata.
//!
//! Starting from the requested atoms, walks declared dependencies through the
//! repository and produces the complete reachable graph. The map is ordered so
//! that downstream variable allocation sees packages in a deterministic,
//! lexicographic order regardless of repository iteration order.

use crate::errors::ResolveError;
use crate::package::{Atom, Constraint, Package};
use crate::repository::Repository;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Collect every package reachable from the requested atoms.
///
/// A requested atom that fails to load is fatal. A *transitive* dependency
/// that fails to load is logged and skipped; the encoder detects the
/// unresolvable constraint later, so resolution keeps going here. Cycles
/// terminate through the already-collected check.
pub fn collect<R: Repository + ?Sized>(
    repo: &R,
    requested: &[String],
) -> Result<BTreeMap<Atom, Package>, ResolveError> {
    let mut graph = BTreeMap::new();

    for atom in requested {
        let package = repo.load_package(atom)?;
        debug!(
            package = %package.name,
            version = %package.version,
            deps = package.deps.len(),
            "collecting requested package"
        );
        insert_with_deps(repo, package, &mut graph);
    }

    Ok(graph)
}

fn insert_with_deps<R: Repository + ?Sized>(
    repo: &R,
    package: Package,
    graph: &mut BTreeMap<Atom, Package>,
) {
    if graph.contains_key(&package.name) {
        return;
    }

    let dep_atoms: Vec<Atom> = package
        .deps
        .iter()
        .filter_map(|dep| match dep {
            Constraint::Version { name, .. } => Some(name.clone()),
            Constraint::Slot { .. } | Constraint::Use { .. } => None,
        })
        .collect();

    graph.insert(package.name.clone(), package);

    for dep in dep_atoms {
        if graph.contains_key(&dep) {
            continue;
        }
        match repo.load_package(dep.as_str()) {
            Ok(dep_package) => insert_with_deps(repo, dep_package, graph),
            Err(err) => warn!(dependency = %dep, error = %err, "skipping unresolvable dependency"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::VersionConstraint;
    use ahash::AHashMap;

    struct MapRepo {
        packages: AHashMap<String, Package>,
    }

    impl MapRepo {
        fn new(packages: impl IntoIterator<Item = Package>) -> Self {
            Self {
                packages: packages
                    .into_iter()
                    .map(|p| (p.name.as_str().to_string(), p))
                    .collect(),
            }
        }
    }

    impl Repository for MapRepo {
        fn load_package(&self, atom: &str) -> Result<Package, ResolveError> {
            self.packages
                .get(atom)
                .cloned()
                .ok_or_else(|| ResolveError::PackageNotFound {
                    name: atom.to_string(),
                })
        }
    }

    fn atom(s: &str) -> Atom {
        Atom::parse(s).unwrap()
    }

    #[test]
    fn walks_transitive_deps() {
        let mut hello = Package::new(atom("app-misc/hello"), "2.10", "0");
        hello.add_dependency(Constraint::versioned(
            atom("sys-libs/zlib"),
            VersionConstraint::at_least("1.2.13"),
        ));
        let zlib = Package::new(atom("sys-libs/zlib"), "1.2.13", "0");

        let repo = MapRepo::new([hello, zlib]);
        let graph = collect(&repo, &["app-misc/hello".to_string()]).unwrap();

        assert_eq!(graph.len(), 2);
        assert!(graph.contains_key(&atom("sys-libs/zlib")));
    }

    #[test]
    fn missing_requested_package_is_fatal() {
        let repo = MapRepo::new([]);
        let err = collect(&repo, &["app-misc/absent".to_string()]).unwrap_err();
        assert!(matches!(err, ResolveError::PackageNotFound { name } if name == "app-misc/absent"));
    }

    #[test]
    fn missing_transitive_dep_is_skipped() {
        let mut hello = Package::new(atom("app-misc/hello"), "2.10", "0");
        hello.add_dependency(Constraint::simple(atom("sys-libs/zlib")));

        let repo = MapRepo::new([hello]);
        let graph = collect(&repo, &["app-misc/hello".to_string()]).unwrap();

        assert_eq!(graph.len(), 1);
        assert!(graph.contains_key(&atom("app-misc/hello")));
    }

    #[test]
    fn dependency_cycles_terminate() {
        let mut a = Package::new(atom("dev-libs/a"), "1.0", "0");
        a.add_dependency(Constraint::simple(atom("dev-libs/b")));
        let mut b = Package::new(atom("dev-libs/b"), "1.0", "0");
        b.add_dependency(Constraint::simple(atom("dev-libs/a")));

        let repo = MapRepo::new([a, b]);
        let graph = collect(&repo, &["dev-libs/a".to_string()]).unwrap();

        assert_eq!(graph.len(), 2);
    }
}
