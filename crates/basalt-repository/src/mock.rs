//! In-memory repository for tests and offline runs.

use ahash::AHashMap;
use basalt_resolver::package::{Atom, Constraint, Package};
use basalt_resolver::version::VersionConstraint;
use basalt_resolver::{Repository, ResolveError};

/// Map-backed repository; loads return independent clones.
#[derive(Debug, Default)]
pub struct MockRepository {
    packages: AHashMap<String, Package>,
}

impl MockRepository {
    /// Create an empty mock repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock repository pre-loaded with the canonical demo set:
    /// `app-misc/hello` requiring zlib, `sys-libs/zlib` itself, and
    /// `conflict/example` whose zlib bound is unsatisfiable next to hello's.
    #[must_use]
    pub fn with_fixtures() -> Self {
        let mut repo = Self::new();

        let mut hello = Package::new(
            Atom::new("app-misc", "hello"),
            "2.10",
            "0",
        );
        hello.add_dependency(Constraint::versioned(
            Atom::new("sys-libs", "zlib"),
            VersionConstraint::at_least("1.2.13"),
        ));
        repo.insert(hello);

        repo.insert(Package::new(Atom::new("sys-libs", "zlib"), "1.2.13", "0"));

        let mut conflict = Package::new(Atom::new("conflict", "example"), "1.0", "0");
        conflict.add_dependency(Constraint::versioned(
            Atom::new("sys-libs", "zlib"),
            VersionConstraint::parse("<1.2.0").expect("valid constraint"),
        ));
        repo.insert(conflict);

        repo
    }

    /// Add or replace a package definition.
    pub fn insert(&mut self, package: Package) {
        self.packages
            .insert(package.name.as_str().to_string(), package);
    }
}

impl Repository for MockRepository {
    fn load_package(&self, atom: &str) -> Result<Package, ResolveError> {
        self.packages
            .get(atom)
            .cloned()
            .ok_or_else(|| ResolveError::PackageNotFound {
                name: atom.to_string(),
            })
    }
}
