//! # dbcfed CLI entry point
//!
//! Parses command-line arguments, resolves configuration and dispatches to
//! the subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use dbcfed_cli::engine::{run_engine, EngineArgs};
use dbcfed_cli::gov::{run_gov, GovArgs};
use dbcfed_cli::mint::{run_mint, MintArgs};
use dbcfed_cli::Session;
use dbcfed_core::{Clock, SystemClock};
use dbcfed_netconf::NetconfConfig;

/// DBC mint federation toolchain.
///
/// Maintains the federation's network configuration, each mint's identity
/// and signing key lists, and checks that the federation can reach quorum.
#[derive(Parser, Debug)]
#[command(name = "dbcfed", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file (YAML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Federation directory holding federation.json and mints/.
    #[arg(short = 'd', long = "dir", global = true)]
    dir: Option<PathBuf>,

    /// Mint home holding secrets/ and privkeylists/.
    #[arg(long, global = true)]
    mint_home: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Governance edits to the network configuration.
    Gov(GovArgs),

    /// Mint identity and key list management.
    Mint(MintArgs),

    /// Signing engine checks over the whole federation.
    Engine(EngineArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let result = NetconfConfig::load_or_default(cli.config.as_deref())
        .context("failed to load configuration")
        .and_then(|config| {
            let mint_home = config.mint_home(cli.mint_home.as_deref());
            let session = Session::new(config, cli.dir.as_deref(), mint_home, SystemClock.now());
            tracing::debug!(dir = %session.dir.display(), now = %session.now, "dbcfed starting");
            match &cli.command {
                Commands::Gov(args) => run_gov(args, &session),
                Commands::Mint(args) => run_mint(args, &session),
                Commands::Engine(args) => run_engine(args, &session),
            }
        });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
