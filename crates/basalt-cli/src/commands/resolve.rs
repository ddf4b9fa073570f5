//! Resolve command implementation.

use anyhow::Result;
use clap::Args;
use console::style;
use std::path::PathBuf;

/// Arguments for the resolve command.
#[derive(Args, Debug, Clone)]
pub struct ResolveArgs {
    /// Package atoms to resolve (category/name)
    #[arg(required = true, value_name = "ATOM")]
    pub packages: Vec<String>,

    /// Path to the ebuild repository
    #[arg(long, default_value = "/var/db/repos/gentoo", value_name = "DIR")]
    pub repo: PathBuf,

    /// Use the built-in mock repository instead of reading from disk
    #[arg(long)]
    pub mock: bool,
}

/// Run the resolve command.
pub fn run(args: ResolveArgs) -> Result<()> {
    let solution = super::resolve_packages(&args.repo, args.mock, &args.packages)?;

    if solution.is_empty() {
        println!("{}", style("Nothing to resolve.").dim());
        return Ok(());
    }

    println!("{}", style("Dependency solution:").bold());
    for (atom, package) in &solution {
        println!(
            "- {}-{} [slot:{}]",
            style(atom).cyan(),
            package.version,
            package.slot.name
        );
    }

    Ok(())
}
