//! Matches command: lists the events that stay visible under a set of
//! filter and highlight patterns.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use tl_core::engine::EventSource;
use tl_core::{ActiveMatchers, Event, Theme, TimelineEvent, build_matchers};

use super::util::{fill_fields, format_timestamp, load_events};
use crate::Config;

#[derive(Debug, Args)]
pub struct MatchesArgs {
    /// JSONL file of events.
    pub events: PathBuf,

    /// Filter pattern (repeatable). An event is shown if any filter matches its ID.
    #[arg(short, long = "filter")]
    pub filters: Vec<String>,

    /// Highlight pattern (repeatable). The Nth pattern is highlight category N.
    #[arg(short = 'H', long = "highlight")]
    pub highlights: Vec<String>,

    /// Output as JSON lines.
    #[arg(long)]
    pub json: bool,
}

/// One visible event in JSON output.
#[derive(Debug, Serialize)]
struct MatchRecord<'a> {
    id: &'a str,
    start: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    highlight: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<&'a str>,
}

pub fn run<W: Write>(writer: &mut W, args: &MatchesArgs, config: &Config) -> Result<()> {
    let panel = config.panel_config();
    let filters = fill_fields(&args.filters, panel.filter_field_count, "filter")?;
    let highlights = fill_fields(&args.highlights, panel.highlight_field_count, "highlight")?;

    let (filter, highlight) = build_matchers(filters.as_slice(), highlights.as_slice())
        .context("failed to compile patterns")?;
    let matchers = ActiveMatchers {
        filter: Some(filter),
        highlight,
    };

    let source = load_events(&args.events)?;
    let events: Vec<&Event> = source.all_events().collect();
    let theme = config.theme();

    if args.json {
        write_json(writer, &events, &matchers, &theme)
    } else {
        writeln!(writer, "{}", render(&events, &matchers, &theme))?;
        Ok(())
    }
}

fn write_json<W: Write>(
    writer: &mut W,
    events: &[&Event],
    matchers: &ActiveMatchers,
    theme: &Theme,
) -> Result<()> {
    for event in events.iter().filter(|event| matchers.is_visible(**event)) {
        let highlight = matchers.highlight_category(*event);
        let record = MatchRecord {
            id: event.event_id(),
            start: format_timestamp(event.start),
            title: event.title.as_deref(),
            highlight,
            color: highlight.and_then(|category| theme.highlight_color(category)),
        };
        writeln!(writer, "{}", serde_json::to_string(&record)?)?;
    }
    Ok(())
}

/// Renders visible events as text, one per line, followed by a count.
fn render(events: &[&Event], matchers: &ActiveMatchers, theme: &Theme) -> String {
    let mut lines = Vec::new();
    let mut visible = 0;

    for event in events {
        if !matchers.is_visible(*event) {
            continue;
        }
        visible += 1;

        let mut line = format!("{}  {}", format_timestamp(event.start), event.event_id());
        if let Some(title) = &event.title {
            line.push_str(&format!("  \"{title}\""));
        }
        if let Some(category) = matchers.highlight_category(*event) {
            let color = theme.highlight_color(category).unwrap_or("?");
            line.push_str(&format!("  [highlight {category} {color}]"));
        }
        lines.push(line);
    }

    lines.push(format!("{visible} of {} events visible", events.len()));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{DateTime, TimeDelta, Utc};
    use insta::assert_snapshot;
    use tl_core::EventId;
    use tl_core::memory::MemoryEventSource;

    fn sample() -> MemoryEventSource {
        let base = DateTime::parse_from_rfc3339("2013-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let mut events = Vec::new();
        for (offset, id, title) in [
            (0, "call:mom", Some("Mom")),
            (60, "sms:alice", None),
            (90, "SMS:bob", None),
            (300, "wifi:home", None),
        ] {
            let mut event = Event::new(EventId::new(id).unwrap(), base + TimeDelta::seconds(offset));
            event.title = title.map(ToString::to_string);
            events.push(event);
        }
        MemoryEventSource::new(events)
    }

    fn matchers(filters: &[&str], highlights: &[&str]) -> ActiveMatchers {
        let (filter, highlight) = build_matchers(filters, highlights).unwrap();
        ActiveMatchers {
            filter: Some(filter),
            highlight,
        }
    }

    #[test]
    fn render_without_patterns_lists_everything() {
        let source = sample();
        let events: Vec<&Event> = source.all_events().collect();
        let output = render(&events, &matchers(&[], &[]), &Theme::classic());

        assert_snapshot!(output, @r#"
        2013-05-01T12:00:00.000Z  call:mom  "Mom"
        2013-05-01T12:01:00.000Z  sms:alice
        2013-05-01T12:01:30.000Z  SMS:bob
        2013-05-01T12:05:00.000Z  wifi:home
        4 of 4 events visible
        "#);
    }

    #[test]
    fn render_marks_highlight_categories() {
        let source = sample();
        let events: Vec<&Event> = source.all_events().collect();
        let output = render(
            &events,
            &matchers(&["sms", "mom"], &["", "bob"]),
            &Theme::classic(),
        );

        assert_snapshot!(output, @r#"
        2013-05-01T12:00:00.000Z  call:mom  "Mom"
        2013-05-01T12:01:00.000Z  sms:alice
        2013-05-01T12:01:30.000Z  SMS:bob  [highlight 1 #FFC000]
        3 of 4 events visible
        "#);
    }

    #[test]
    fn json_output_skips_hidden_events() {
        let source = sample();
        let events: Vec<&Event> = source.all_events().collect();
        let mut output = Vec::new();
        write_json(
            &mut output,
            &events,
            &matchers(&["wifi"], &["home"]),
            &Theme::classic(),
        )
        .unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output.trim_end(), @r##"{"id":"wifi:home","start":"2013-05-01T12:05:00.000Z","highlight":0,"color":"#FFFF00"}"##);
    }

    #[test]
    fn run_rejects_invalid_pattern() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let args = MatchesArgs {
            events: file.path().to_path_buf(),
            filters: vec!["(".to_string()],
            highlights: Vec::new(),
            json: false,
        };

        let mut output = Vec::new();
        let err = run(&mut output, &args, &Config::default()).unwrap_err();
        assert_eq!(err.to_string(), "failed to compile patterns");
        assert!(output.is_empty());
    }
}
