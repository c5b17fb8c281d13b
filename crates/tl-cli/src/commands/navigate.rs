//! Navigate command: where would "Next event" / "Previous event" go?

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use tl_core::engine::EventSource;
use tl_core::matcher::build_filter;
use tl_core::{Direction, find_adjacent_event_date};

use super::util::{fill_fields, format_timestamp, load_events, parse_center};
use crate::Config;

#[derive(Debug, Args)]
pub struct NavigateArgs {
    /// JSONL file of events.
    pub events: PathBuf,

    /// Current center date (RFC 3339 or epoch milliseconds).
    #[arg(long)]
    pub center: String,

    /// Direction to step in (next or previous).
    #[arg(short, long, default_value = "next")]
    pub direction: Direction,

    /// Filter pattern (repeatable). Hidden events are skipped.
    #[arg(short, long = "filter")]
    pub filters: Vec<String>,
}

pub fn run<W: Write>(writer: &mut W, args: &NavigateArgs, config: &Config) -> Result<()> {
    let panel = config.panel_config();
    let center = parse_center(&args.center).context("invalid --center")?;
    let filters = fill_fields(&args.filters, panel.filter_field_count, "filter")?;
    let filter = build_filter(filters.as_slice()).context("failed to compile patterns")?;

    let source = load_events(&args.events)?;
    let target = find_adjacent_event_date(
        args.direction,
        center,
        source.all_events(),
        Some(&filter),
        panel.navigation_guard,
    );
    tracing::debug!(direction = %args.direction, %center, %target, "navigation computed");

    if target == center {
        writeln!(writer, "{} (unchanged)", format_timestamp(target))?;
    } else {
        writeln!(writer, "{}", format_timestamp(target))?;
    }
    Ok(())
}
