//! CLI commands for basalt.

pub mod install;
pub mod resolve;

use anyhow::Result;
use basalt_repository::{EbuildRepository, MockRepository};
use basalt_resolver::package::{Atom, Package};
use basalt_resolver::{Repository, Resolver};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// basalt - source-based package management with SAT dependency resolution.
#[derive(Parser, Debug)]
#[command(name = "basalt")]
#[command(version)]
#[command(about = "Source-based package manager with SAT dependency resolution", long_about = None)]
#[command(propagate_version = true)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Only print errors
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve package dependencies
    Resolve(resolve::ResolveArgs),
    /// Install packages with transaction safety
    Install(install::InstallArgs),
}

/// Resolve against either the on-disk tree or the built-in mock.
pub(crate) fn resolve_packages(
    repo_path: &Path,
    mock: bool,
    packages: &[String],
) -> Result<BTreeMap<Atom, Package>> {
    if mock {
        info!("using mock repository");
        run_resolver(MockRepository::with_fixtures(), packages)
    } else {
        let repo = EbuildRepository::open(repo_path)?;
        info!(repository = %repo_path.display(), "using ebuild repository");
        run_resolver(repo, packages)
    }
}

fn run_resolver<R: Repository>(repo: R, packages: &[String]) -> Result<BTreeMap<Atom, Package>> {
    let resolver = Resolver::new(repo);
    Ok(resolver.resolve(packages)?)
}
