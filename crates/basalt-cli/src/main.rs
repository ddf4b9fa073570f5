//! basalt - a source-based package manager with SAT dependency resolution.
//!
//! The binary wires the resolver, the repository adapters, and the snapshot
//! manager together behind two commands: `resolve` prints the selected
//! package set, `install` snapshots the system first and then resolves.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

mod commands;

use clap::Parser;
use commands::{Cli, Commands};
use console::style;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Log level follows verbosity flags; RUST_LOG still wins when set.
    let log_level = match cli.verbose {
        0 if cli.quiet => Level::ERROR,
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    let result = match cli.command {
        Commands::Resolve(args) => commands::resolve::run(args),
        Commands::Install(args) => commands::install::run(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", style("error:").red().bold());
            ExitCode::FAILURE
        }
    }
}
