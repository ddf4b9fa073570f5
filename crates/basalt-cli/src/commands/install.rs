//! Install command implementation.
//!
//! Snapshots the root filesystem, then resolves. The build-and-merge stage
//! onto the live system is not wired up yet; the command stops after
//! printing the plan.

use anyhow::{Context, Result};
use basalt_state::SnapshotManager;
use clap::Args;
use console::style;
use std::path::{Path, PathBuf};
use tracing::info;

/// Arguments for the install command.
#[derive(Args, Debug, Clone)]
pub struct InstallArgs {
    /// Package atoms to install (category/name)
    #[arg(required = true, value_name = "ATOM")]
    pub packages: Vec<String>,

    /// Path to the ebuild repository
    #[arg(long, default_value = "/var/db/repos/gentoo", value_name = "DIR")]
    pub repo: PathBuf,

    /// Use the built-in mock repository instead of reading from disk
    #[arg(long)]
    pub mock: bool,

    /// Directory snapshots are written to
    #[arg(long, default_value = "/.snapshots", value_name = "DIR")]
    pub snapshot_dir: PathBuf,

    /// Filesystem type of the root (btrfs or zfs)
    #[arg(long, default_value = "btrfs", value_name = "FS")]
    pub fs_type: String,

    /// Skip the pre-install snapshot
    #[arg(long)]
    pub no_snapshot: bool,
}

/// Run the install command.
pub fn run(args: InstallArgs) -> Result<()> {
    if args.no_snapshot {
        info!("pre-install snapshot skipped");
    } else {
        let manager = SnapshotManager::new(&args.snapshot_dir, &args.fs_type);
        let snapshot_id = manager
            .create_snapshot(Path::new("/"))
            .context("creating pre-install snapshot")?;
        println!("{} {snapshot_id}", style("Snapshot:").bold());
    }

    let solution = super::resolve_packages(&args.repo, args.mock, &args.packages)?;

    println!("{}", style("Installing packages:").bold());
    for (atom, package) in &solution {
        println!(
            "- {}-{} [slot:{}]",
            style(atom).cyan(),
            package.version,
            package.slot.name
        );
    }

    println!("{}", style("Installation plan complete.").green());
    Ok(())
}
