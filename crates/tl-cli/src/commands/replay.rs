//! Replay command: drives the filter panel through a timed script.
//!
//! The script is JSONL, one step per line, each with the time in
//! milliseconds since the start of the replay:
//!
//! ```text
//! {"at_ms": 0, "action": "type", "field": "filter", "index": 0, "text": "sms"}
//! {"at_ms": 400, "action": "next"}
//! ```
//!
//! Time is virtual. Timers fire in deadline order between steps, and every
//! timer still pending after the last step runs out before the summary.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::Args;
use serde::Deserialize;

use tl_core::engine::{Band, Timeline};
use tl_core::memory::MemoryTimeline;
use tl_core::{Action, ActionOutcome, FieldKind, PanelController, TimerFired};

use super::util::{format_timestamp, load_events, parse_center};
use crate::Config;

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// JSONL file of events.
    pub events: PathBuf,

    /// JSONL script of panel interactions.
    #[arg(short, long)]
    pub script: PathBuf,

    /// Initial center date (RFC 3339 or epoch milliseconds).
    #[arg(long)]
    pub center: String,
}

/// A user interaction with the panel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScriptAction {
    /// Replace the text of one field.
    Type {
        field: FieldKind,
        index: usize,
        text: String,
    },
    Filter,
    ClearAll,
    Next,
    Previous,
    Resize,
    /// Do nothing; lets pending timers catch up.
    Wait,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScriptStep {
    pub at_ms: u64,
    #[serde(flatten)]
    pub action: ScriptAction,
}

/// Reads a script, rejecting steps that go back in time.
pub fn load_script(path: &Path) -> Result<Vec<ScriptStep>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;

    let mut steps: Vec<ScriptStep> = Vec::new();
    for (number, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("failed to read {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let step: ScriptStep = serde_json::from_str(&line).with_context(|| {
            format!("invalid step on line {} of {}", number + 1, path.display())
        })?;
        let previous_ms = steps.last().map_or(0, |previous| previous.at_ms);
        if step.at_ms < previous_ms {
            bail!(
                "step on line {} goes back in time ({}ms after {previous_ms}ms)",
                number + 1,
                step.at_ms
            );
        }
        steps.push(step);
    }

    tracing::debug!(count = steps.len(), path = %path.display(), "loaded script");
    Ok(steps)
}

/// Timestamped log of what happened during a replay.
struct Transcript {
    base: Instant,
    lines: Vec<String>,
}

impl Transcript {
    const fn new(base: Instant) -> Self {
        Self {
            base,
            lines: Vec::new(),
        }
    }

    fn note(&mut self, at: Instant, message: impl AsRef<str>) {
        let ms = at.duration_since(self.base).as_millis();
        self.lines.push(format!("[{ms:>6}ms] {}", message.as_ref()));
    }
}

/// Plays `steps` against `panel`, starting the virtual clock at `base`.
///
/// Returns the transcript, one line per observable change.
pub fn replay<T: Timeline>(
    panel: &mut PanelController<T>,
    steps: &[ScriptStep],
    base: Instant,
) -> Result<Vec<String>> {
    let mut transcript = Transcript::new(base);

    for (number, step) in steps.iter().enumerate() {
        let now = base + Duration::from_millis(step.at_ms);
        fire_timers(panel, Some(now), &mut transcript);
        apply(panel, &step.action, now, &mut transcript)
            .with_context(|| format!("step {} ({:?}) failed", number + 1, step.action))?;
    }
    fire_timers(panel, None, &mut transcript);

    Ok(transcript.lines)
}

/// Fires timers in deadline order, up to and including `until`.
fn fire_timers<T: Timeline>(
    panel: &mut PanelController<T>,
    until: Option<Instant>,
    transcript: &mut Transcript,
) {
    while let Some(deadline) = panel.next_deadline() {
        if until.is_some_and(|until| deadline > until) {
            break;
        }
        for fired in panel.tick(deadline) {
            transcript.note(deadline, describe_fired(&fired));
        }
    }
}

fn describe_fired(fired: &TimerFired) -> String {
    match fired {
        TimerFired::Recompute(Ok(summary)) => {
            let highlights = summary
                .highlight_categories
                .map_or_else(|| "off".to_string(), |n| n.to_string());
            format!(
                "recompute: filters={} highlights={highlights}",
                summary.filter_patterns
            )
        }
        TimerFired::Recompute(Err(err)) => {
            let (kind, index) = err.field();
            format!("recompute rejected: invalid {kind} field {index}, previous matchers kept")
        }
        TimerFired::Relayout => "relayout".to_string(),
    }
}

fn apply<T: Timeline>(
    panel: &mut PanelController<T>,
    action: &ScriptAction,
    now: Instant,
    transcript: &mut Transcript,
) -> Result<()> {
    let (action, label) = match action {
        ScriptAction::Type { field, index, text } => {
            panel.set_field(*field, *index, text.as_str(), now)?;
            transcript.note(now, format!("{field}[{index}] = {text:?}"));
            return Ok(());
        }
        ScriptAction::Resize => {
            panel.notify_resized(now);
            transcript.note(now, "resize");
            return Ok(());
        }
        ScriptAction::Wait => return Ok(()),
        ScriptAction::Filter => (Action::Filter, "filter"),
        ScriptAction::ClearAll => (Action::ClearAll, "clear all"),
        ScriptAction::Next => (Action::Next, "next"),
        ScriptAction::Previous => (Action::Previous, "previous"),
    };

    let message = match panel.handle_action(action, now)? {
        ActionOutcome::RecomputeScheduled { deadline } => format!(
            "{label}: recompute due at {}ms",
            deadline.duration_since(transcript.base).as_millis()
        ),
        ActionOutcome::Cleared => "cleared all fields".to_string(),
        ActionOutcome::Recentered { from, to } => format!(
            "{label}: {} -> {}",
            format_timestamp(from),
            format_timestamp(to)
        ),
    };
    transcript.note(now, message);
    Ok(())
}

/// Final state of the primary band.
fn summarize(timeline: &MemoryTimeline) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(primary) = timeline.bands().first() {
        lines.push(format!(
            "center: {}",
            format_timestamp(primary.center_visible_date())
        ));
    }

    let visible = timeline.visible_events(0);
    let highlighted = visible
        .iter()
        .filter(|(_, category)| category.is_some())
        .count();
    lines.push(format!(
        "visible: {} of {} events, {highlighted} highlighted",
        visible.len(),
        timeline.event_source().len()
    ));
    lines.push(format!(
        "paints: {}, layouts: {}",
        timeline.paint_count(),
        timeline.layout_count()
    ));
    lines
}

pub fn run<W: Write>(writer: &mut W, args: &ReplayArgs, config: &Config) -> Result<()> {
    let center = parse_center(&args.center).context("invalid --center")?;
    let source = load_events(&args.events)?;
    let steps = load_script(&args.script)?;

    let timeline = MemoryTimeline::with_overviews(source, center, config.overview_bands);
    let mut panel = PanelController::new(config.panel_config(), timeline);

    for line in replay(&mut panel, &steps, Instant::now())? {
        writeln!(writer, "{line}")?;
    }
    for line in summarize(panel.timeline()) {
        writeln!(writer, "{line}")?;
    }
    Ok(())
}
