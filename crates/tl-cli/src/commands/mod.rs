//! CLI subcommand implementations.

pub mod matches;
pub mod navigate;
pub mod replay;
pub mod util;
