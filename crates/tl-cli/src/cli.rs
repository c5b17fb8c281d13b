//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::matches::MatchesArgs;
use crate::commands::navigate::NavigateArgs;
use crate::commands::replay::ReplayArgs;

/// Timeline filter and highlight panel.
///
/// Matches event IDs against filter and highlight patterns, steps between
/// visible events, and replays scripted panel sessions.
#[derive(Debug, Parser)]
#[command(name = "tl", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List events that stay visible under the given patterns.
    Matches(MatchesArgs),

    /// Compute where "next" or "previous" would recenter the timeline.
    Navigate(NavigateArgs),

    /// Replay a timed script of panel interactions.
    Replay(ReplayArgs),

    /// Show the effective configuration.
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;
    use tl_core::Direction;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn navigate_parses_direction_alias() {
        let cli = Cli::try_parse_from([
            "tl", "navigate", "events.jsonl", "--center", "0", "-d", "prev",
        ])
        .unwrap();
        let Some(Commands::Navigate(args)) = cli.command else {
            panic!("expected navigate");
        };
        assert_eq!(args.direction, Direction::Previous);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["tl", "config", "-v", "--config", "tl.toml"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("tl.toml")));
    }
}
