//! End-to-end resolution scenarios against an in-memory repository.

use ahash::AHashMap;
use basalt_resolver::package::{Atom, Constraint, Package};
use basalt_resolver::version::VersionConstraint;
use basalt_resolver::{Repository, ResolveError, Resolver};

/// Minimal clone-on-load repository for driving the resolver.
#[derive(Debug, Default)]
struct TestRepo {
    packages: AHashMap<String, Package>,
}

impl TestRepo {
    fn insert(&mut self, package: Package) {
        self.packages
            .insert(package.name.as_str().to_string(), package);
    }
}

impl Repository for TestRepo {
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

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(ToString::to_string).collect()
}

/// hello-2.10 requiring zlib >= 1.2.13, zlib-1.2.13 present.
fn baseline_repo() -> TestRepo {
    let mut repo = TestRepo::default();

    let mut hello = Package::new(atom("app-misc/hello"), "2.10", "0");
    hello.add_dependency(Constraint::versioned(
        atom("sys-libs/zlib"),
        VersionConstraint::at_least("1.2.13"),
    ));
    repo.insert(hello);

    repo.insert(Package::new(atom("sys-libs/zlib"), "1.2.13", "0"));
    repo
}

#[test]
fn trivial_resolution_selects_both_packages() {
    let resolver = Resolver::new(baseline_repo());
    let solution = resolver.resolve(&names(&["app-misc/hello"])).unwrap();

    assert_eq!(solution.len(), 2);
    assert_eq!(solution[&atom("app-misc/hello")].version, "2.10");
    assert_eq!(solution[&atom("sys-libs/zlib")].version, "1.2.13");
}

#[test]
fn conflicting_version_bounds_are_unsolvable() {
    let mut repo = baseline_repo();
    let mut conflict = Package::new(atom("conflict/example"), "1.0", "0");
    conflict.add_dependency(Constraint::versioned(
        atom("sys-libs/zlib"),
        VersionConstraint::parse("<1.2.0").unwrap(),
    ));
    repo.insert(conflict);

    let resolver = Resolver::new(repo);
    let err = resolver
        .resolve(&names(&["app-misc/hello", "conflict/example"]))
        .unwrap_err();

    assert!(matches!(err, ResolveError::NoSolution));
}

#[test]
fn missing_unversioned_dep_reports_package_not_found() {
    let mut repo = TestRepo::default();
    let mut hello = Package::new(atom("app-misc/hello"), "2.10", "0");
    hello.add_dependency(Constraint::simple(atom("sys-libs/zlib")));
    repo.insert(hello);

    let resolver = Resolver::new(repo);
    let err = resolver.resolve(&names(&["app-misc/hello"])).unwrap_err();

    assert!(matches!(err, ResolveError::PackageNotFound { name } if name == "sys-libs/zlib"));
}

#[test]
fn missing_versioned_dep_is_unsolvable() {
    let mut repo = TestRepo::default();
    let mut hello = Package::new(atom("app-misc/hello"), "2.10", "0");
    hello.add_dependency(Constraint::versioned(
        atom("sys-libs/zlib"),
        VersionConstraint::at_least("1.2.13"),
    ));
    repo.insert(hello);

    let resolver = Resolver::new(repo);
    let err = resolver.resolve(&names(&["app-misc/hello"])).unwrap_err();

    assert!(matches!(err, ResolveError::NoSolution));
}

#[test]
fn slot_requirement_resolves_through_occupant() {
    let mut repo = baseline_repo();
    let mut app = Package::new(atom("app-misc/consumer"), "1.0", "5");
    app.add_dependency(Constraint::versioned(
        atom("sys-libs/zlib"),
        VersionConstraint::at_least("1.2.13"),
    ));
    app.add_dependency(Constraint::Slot {
        slot: "0".to_string(),
    });
    repo.insert(app);

    let resolver = Resolver::new(repo);
    let solution = resolver.resolve(&names(&["app-misc/consumer"])).unwrap();

    // zlib is the only collected occupant of slot 0.
    assert!(solution.contains_key(&atom("app-misc/consumer")));
    assert!(solution.contains_key(&atom("sys-libs/zlib")));
}

#[test]
fn slot_requirement_without_provider_fails() {
    let mut repo = TestRepo::default();
    let mut app = Package::new(atom("app-misc/consumer"), "1.0", "0");
    app.add_dependency(Constraint::Slot {
        slot: "9".to_string(),
    });
    repo.insert(app);

    let resolver = Resolver::new(repo);
    let err = resolver.resolve(&names(&["app-misc/consumer"])).unwrap_err();
    assert!(matches!(err, ResolveError::NoProvider { slot } if slot == "9"));
}

#[test]
fn use_flag_demand_never_leaks_into_solution() {
    let mut repo = baseline_repo();
    let mut app = Package::new(atom("app-misc/secure"), "1.0", "0");
    app.add_dependency(Constraint::Use {
        flag: "ssl".to_string(),
        required: true,
        condition: None,
    });
    app.add_dependency(Constraint::versioned(
        atom("sys-libs/zlib"),
        VersionConstraint::at_least("1.2.13"),
    ));
    repo.insert(app);

    let resolver = Resolver::new(repo);
    let solution = resolver.resolve(&names(&["app-misc/secure"])).unwrap();

    assert!(solution.keys().all(|a| !a.as_str().starts_with("USE_")));
    assert!(solution.contains_key(&atom("sys-libs/zlib")));
}

#[test]
fn solution_has_one_version_per_name() {
    let resolver = Resolver::new(baseline_repo());
    let solution = resolver.resolve(&names(&["app-misc/hello"])).unwrap();

    // Keys are atoms; a duplicate name would have collapsed. Assert the
    // stronger property: every requested atom maps to its pinned version.
    assert_eq!(solution[&atom("app-misc/hello")].version, "2.10");
}

#[test]
fn every_requested_atom_appears_in_solution() {
    let mut repo = baseline_repo();
    repo.insert(Package::new(atom("app-editors/nano"), "7.2", "0"));

    let resolver = Resolver::new(repo);
    let requested = names(&["app-misc/hello", "app-editors/nano"]);
    let solution = resolver.resolve(&requested).unwrap();

    for name in &requested {
        let found = solution.get(&atom(name)).expect("requested atom selected");
        assert_eq!(
            found.version,
            if name == "app-misc/hello" { "2.10" } else { "7.2" }
        );
    }
}

#[test]
fn empty_request_resolves_to_empty_solution() {
    let resolver = Resolver::new(baseline_repo());
    let solution = resolver.resolve(&[]).unwrap();
    assert!(solution.is_empty());
}

#[test]
fn dependency_cycle_resolves() {
    let mut repo = TestRepo::default();
    let mut a = Package::new(atom("dev-libs/a"), "1.0", "0");
    a.add_dependency(Constraint::simple(atom("dev-libs/b")));
    let mut b = Package::new(atom("dev-libs/b"), "1.0", "0");
    b.add_dependency(Constraint::simple(atom("dev-libs/a")));
    repo.insert(a);
    repo.insert(b);

    let resolver = Resolver::new(repo);
    let solution = resolver.resolve(&names(&["dev-libs/a"])).unwrap();
    assert_eq!(solution.len(), 2);
}

#[test]
fn blocker_marker_is_tolerated() {
    let mut repo = baseline_repo();
    let mut app = Package::new(atom("app-misc/blocky"), "1.0", "0");
    app.add_dependency(Constraint::Version {
        name: atom("sys-libs/zlib"),
        constraint: Some(VersionConstraint::at_least("1.2.13")),
        blocker: true,
    });
    repo.insert(app);

    let resolver = Resolver::new(repo);
    // Blockers are recognized, not enforced: resolution proceeds.
    let solution = resolver.resolve(&names(&["app-misc/blocky"])).unwrap();
    assert!(solution.contains_key(&atom("sys-libs/zlib")));
}
