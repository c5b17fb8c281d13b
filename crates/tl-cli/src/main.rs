use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tl_cli::commands::{matches, navigate, replay};
use tl_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // stdout is reserved for command output
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config =
        Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let mut stdout = io::stdout().lock();
    match command {
        Commands::Matches(args) => matches::run(&mut stdout, args, &config)?,
        Commands::Navigate(args) => navigate::run(&mut stdout, args, &config)?,
        Commands::Replay(args) => replay::run(&mut stdout, args, &config)?,
        Commands::Config => {
            serde_json::to_writer_pretty(&mut stdout, &config)?;
            writeln!(stdout)?;
        }
    }

    Ok(())
}
