// src/main.rs

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // -v wins over RUST_LOG; otherwise RUST_LOG, then info
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Validate { recipe } => commands::cmd_validate(&recipe),
        Commands::Info { recipe } => commands::cmd_info(&recipe),
        Commands::Source {
            recipe,
            workspace,
            fetcher,
        } => commands::cmd_source(&recipe, &workspace, fetcher),
        Commands::Build {
            recipe,
            workspace,
            build,
        } => commands::cmd_build(&recipe, &workspace, &build),
        Commands::Package { recipe, workspace } => commands::cmd_package(&recipe, &workspace),
        Commands::Cook {
            recipe,
            workspace,
            build,
            fetcher,
            no_check,
        } => commands::cmd_cook(&recipe, &workspace, &build, fetcher, no_check),
        Commands::Publish {
            recipe,
            workspace,
            json,
        } => commands::cmd_publish(&recipe, &workspace, json),
    }
}
