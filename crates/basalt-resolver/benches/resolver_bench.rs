//! Benchmarks for version comparison and end-to-end resolution.

use basalt_resolver::package::{Atom, Constraint, Package};
use basalt_resolver::version::{VersionConstraint, compare};
use basalt_resolver::{Repository, ResolveError, Resolver};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::collections::HashMap;

struct BenchRepo {
    packages: HashMap<String, Package>,
}

impl Repository for BenchRepo {
    fn load_package(&self, atom: &str) -> Result<Package, ResolveError> {
        self.packages
            .get(atom)
            .cloned()
            .ok_or_else(|| ResolveError::PackageNotFound {
                name: atom.to_string(),
            })
    }
}

/// A linear dependency chain of `depth` packages rooted at `bench/pkg0`.
fn chain_repo(depth: usize) -> BenchRepo {
    let mut packages = HashMap::new();
    for i in 0..depth {
        let name = format!("bench/pkg{i}");
        let atom = Atom::parse(&name).expect("valid atom");
        let mut package = Package::new(atom, format!("1.{i}.0"), "0");
        if i + 1 < depth {
            let next = Atom::parse(&format!("bench/pkg{}", i + 1)).expect("valid atom");
            package.add_dependency(Constraint::versioned(
                next,
                VersionConstraint::at_least(format!("1.{}.0", i + 1)),
            ));
        }
        packages.insert(name, package);
    }
    BenchRepo { packages }
}

fn bench_version_compare(c: &mut Criterion) {
    c.bench_function("compare_mixed_versions", |b| {
        b.iter(|| {
            black_box(compare(
                black_box("1.2.3_alpha4-r5"),
                black_box("1.2.10_beta1-r2"),
            ))
        });
    });
}

fn bench_resolve_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_chain");
    for depth in [4usize, 16, 64] {
        let resolver = Resolver::new(chain_repo(depth));
        let requested = vec!["bench/pkg0".to_string()];
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, _| {
            b.iter(|| black_box(resolver.resolve(black_box(&requested)).expect("resolvable")));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_version_compare, bench_resolve_chain);
criterion_main!(benches);
