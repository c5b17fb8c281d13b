//! Shared utilities for CLI commands.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};

use tl_core::memory::MemoryEventSource;
use tl_core::Event;

/// Reads events from a JSONL file, one `{"id", "start", "title"?}` per line.
///
/// Blank lines are skipped.
pub fn load_events(path: &Path) -> Result<MemoryEventSource> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;

    let mut events = Vec::new();
    for (number, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("failed to read {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let event: Event = serde_json::from_str(&line)
            .with_context(|| format!("invalid event on line {} of {}", number + 1, path.display()))?;
        events.push(event);
    }

    tracing::debug!(count = events.len(), path = %path.display(), "loaded events");
    Ok(MemoryEventSource::new(events))
}

/// Parses a center date given as RFC 3339 or as milliseconds since the epoch.
pub fn parse_center(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(millis) = s.parse::<i64>() {
        if let Some(dt) = DateTime::from_timestamp_millis(millis) {
            return Ok(dt);
        }
        bail!("timestamp out of range: {millis}");
    }

    bail!("invalid date: {s}. Use RFC 3339 (e.g., 2013-05-01T12:00:00Z) or epoch milliseconds");
}

/// Formats a timestamp the way all command output shows it.
pub fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Pads user patterns to the panel's field count.
///
/// Fails if more patterns were given than the panel has fields.
pub fn fill_fields(patterns: &[String], count: usize, what: &str) -> Result<Vec<String>> {
    if patterns.len() > count {
        bail!(
            "too many {what} patterns: {} given, the panel has {count} {what} fields",
            patterns.len()
        );
    }
    let mut fields = patterns.to_vec();
    fields.resize(count, String::new());
    Ok(fields)
}
