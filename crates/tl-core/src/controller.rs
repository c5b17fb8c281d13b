//! Panel controller: wires the filter panel's actions to the core.
//!
//! The controller owns the field texts, the active matchers and both timer
//! slots. It never matches events itself; it delegates to the matcher
//! builder and the navigation engine and forwards the results to the
//! timeline.

use std::time::{Duration, Instant};

use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;

use crate::engine::{EventSource, Timeline};
use crate::matcher::{ActiveMatchers, FieldKind, MatcherError, build_matchers};
use crate::navigation::{Direction, NAVIGATION_GUARD, find_adjacent_event_date};
use crate::scheduler::TimerSlot;
use crate::theme::Theme;

/// Number of filter fields shown by default.
pub const DEFAULT_FILTER_FIELDS: usize = 4;

/// Quiet period after the last keystroke before matchers are rebuilt.
pub const DEFAULT_DEBOUNCE_DELAY: Duration = Duration::from_millis(300);

/// Delay between the first resize notification and the relayout.
pub const DEFAULT_RESIZE_DELAY: Duration = Duration::from_millis(500);

/// Configuration for the filter panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelConfig {
    pub filter_field_count: usize,

    /// One field per theme highlight color.
    pub highlight_field_count: usize,

    pub debounce_delay: Duration,

    /// Events closer to the center than this are not navigation targets.
    pub navigation_guard: TimeDelta,

    pub resize_delay: Duration,

    /// Band whose center is read and moved by navigation.
    pub primary_band: usize,

    /// Bands whose painters receive the matchers. `None` means every band.
    pub painted_bands: Option<Vec<usize>>,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self::for_theme(&Theme::classic())
    }
}

impl PanelConfig {
    pub fn for_theme(theme: &Theme) -> Self {
        Self {
            filter_field_count: DEFAULT_FILTER_FIELDS,
            highlight_field_count: theme.highlight_count(),
            debounce_delay: DEFAULT_DEBOUNCE_DELAY,
            navigation_guard: NAVIGATION_GUARD,
            resize_delay: DEFAULT_RESIZE_DELAY,
            primary_band: 0,
            painted_bands: None,
        }
    }

    const fn field_count(&self, kind: FieldKind) -> usize {
        match kind {
            FieldKind::Filter => self.filter_field_count,
            FieldKind::Highlight => self.highlight_field_count,
        }
    }
}

/// Host errors: the caller addressed something the panel does not have.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PanelError {
    #[error("no {kind} field {index} (panel has {count})")]
    UnknownField {
        kind: FieldKind,
        index: usize,
        count: usize,
    },

    #[error("timeline has no band {index}")]
    UnknownBand { index: usize },
}

/// Buttons on the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Filter,
    ClearAll,
    Previous,
    Next,
}

/// What an action did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// A recompute is armed and will run when the quiet period ends.
    RecomputeScheduled { deadline: Instant },
    /// Fields and matchers were reset.
    Cleared,
    /// The primary band was moved.
    Recentered {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
}

/// Shape of the committed matchers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatcherSummary {
    /// Compiled filter patterns. Zero means every event is shown.
    pub filter_patterns: usize,
    /// Highlight categories with a pattern. `None` when highlighting is off.
    pub highlight_categories: Option<usize>,
}

impl MatcherSummary {
    pub fn of(matchers: &ActiveMatchers) -> Self {
        Self {
            filter_patterns: matchers
                .filter
                .as_ref()
                .map_or(0, |filter| filter.pattern_count()),
            highlight_categories: matchers
                .highlight
                .as_ref()
                .map(|highlight| highlight.active_categories().count()),
        }
    }
}

/// A timer that went off during [`PanelController::tick`].
#[derive(Debug)]
pub enum TimerFired {
    /// The debounced recompute ran. On error the previous matchers stay.
    Recompute(Result<MatcherSummary, MatcherError>),
    /// The deferred relayout ran.
    Relayout,
}

pub struct PanelController<T: Timeline> {
    config: PanelConfig,
    timeline: T,
    filter_fields: Vec<String>,
    highlight_fields: Vec<String>,
    matchers: ActiveMatchers,
    field_error: Option<MatcherError>,
    recompute: TimerSlot<()>,
    relayout: TimerSlot<()>,
}

impl<T: Timeline> PanelController<T> {
    pub fn new(config: PanelConfig, timeline: T) -> Self {
        let recompute = TimerSlot::debounce(config.debounce_delay);
        let relayout = TimerSlot::deferred(config.resize_delay);
        Self {
            filter_fields: vec![String::new(); config.filter_field_count],
            highlight_fields: vec![String::new(); config.highlight_field_count],
            config,
            timeline,
            matchers: ActiveMatchers::cleared(),
            field_error: None,
            recompute,
            relayout,
        }
    }

    pub const fn config(&self) -> &PanelConfig {
        &self.config
    }

    pub const fn timeline(&self) -> &T {
        &self.timeline
    }

    pub const fn timeline_mut(&mut self) -> &mut T {
        &mut self.timeline
    }

    pub fn into_timeline(self) -> T {
        self.timeline
    }

    pub fn fields(&self, kind: FieldKind) -> &[String] {
        match kind {
            FieldKind::Filter => &self.filter_fields,
            FieldKind::Highlight => &self.highlight_fields,
        }
    }

    pub const fn active_matchers(&self) -> &ActiveMatchers {
        &self.matchers
    }

    /// The last rejected pattern, until a recompute succeeds or the panel is
    /// cleared.
    pub const fn field_error(&self) -> Option<&MatcherError> {
        self.field_error.as_ref()
    }

    pub const fn is_recompute_pending(&self) -> bool {
        self.recompute.is_pending()
    }

    /// Earliest instant at which [`Self::tick`] has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.recompute.deadline(), self.relayout.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Replaces a field's text and restarts the quiet period.
    pub fn set_field(
        &mut self,
        kind: FieldKind,
        index: usize,
        text: impl Into<String>,
        now: Instant,
    ) -> Result<(), PanelError> {
        let count = self.config.field_count(kind);
        let fields = match kind {
            FieldKind::Filter => &mut self.filter_fields,
            FieldKind::Highlight => &mut self.highlight_fields,
        };
        let slot = fields
            .get_mut(index)
            .ok_or(PanelError::UnknownField { kind, index, count })?;
        *slot = text.into();

        self.notify_input_changed(now);
        Ok(())
    }

    /// Arms the recompute timer, superseding any pending one.
    pub fn notify_input_changed(&mut self, now: Instant) -> Instant {
        self.recompute.schedule(now, ());
        now + self.recompute.delay()
    }

    /// Arms the relayout timer unless one is already pending.
    pub fn notify_resized(&mut self, now: Instant) {
        self.relayout.schedule(now, ());
    }

    pub fn handle_action(
        &mut self,
        action: Action,
        now: Instant,
    ) -> Result<ActionOutcome, PanelError> {
        match action {
            Action::Filter => {
                let deadline = self.notify_input_changed(now);
                Ok(ActionOutcome::RecomputeScheduled { deadline })
            }
            Action::ClearAll => {
                self.clear_all();
                Ok(ActionOutcome::Cleared)
            }
            Action::Previous => self.navigate(Direction::Previous),
            Action::Next => self.navigate(Direction::Next),
        }
    }

    /// Empties every field and drops both matchers without waiting.
    pub fn clear_all(&mut self) {
        self.filter_fields.iter_mut().for_each(String::clear);
        self.highlight_fields.iter_mut().for_each(String::clear);
        self.recompute.cancel();
        self.field_error = None;
        self.commit(ActiveMatchers::cleared());
        tracing::debug!("filters and highlights cleared");
    }

    /// Moves the primary band to the adjacent visible event.
    pub fn navigate(&mut self, direction: Direction) -> Result<ActionOutcome, PanelError> {
        let primary = self.config.primary_band;
        let from = self
            .timeline
            .band(primary)
            .ok_or(PanelError::UnknownBand { index: primary })?
            .center_visible_date();

        let to = find_adjacent_event_date(
            direction,
            from,
            self.timeline.event_source().all_events(),
            self.matchers.filter.as_ref(),
            self.config.navigation_guard,
        );

        self.timeline
            .band_mut(primary)
            .ok_or(PanelError::UnknownBand { index: primary })?
            .set_center_visible_date(to);
        self.timeline.paint();

        tracing::debug!(%direction, %from, %to, "recentered primary band");
        Ok(ActionOutcome::Recentered { from, to })
    }

    /// Rebuilds the matchers from the current fields and commits them.
    ///
    /// On error nothing is committed and the error is kept for
    /// [`Self::field_error`].
    pub fn recompute_now(&mut self) -> Result<MatcherSummary, MatcherError> {
        match build_matchers(self.filter_fields.as_slice(), self.highlight_fields.as_slice()) {
            Ok((filter, highlight)) => {
                self.field_error = None;
                self.commit(ActiveMatchers {
                    filter: Some(filter),
                    highlight,
                });
                let summary = MatcherSummary::of(&self.matchers);
                tracing::debug!(
                    filter_patterns = summary.filter_patterns,
                    highlight_categories = ?summary.highlight_categories,
                    "matchers committed"
                );
                Ok(summary)
            }
            Err(err) => {
                let (kind, index) = err.field();
                tracing::warn!(%kind, index, error = %err, "pattern rejected, keeping previous matchers");
                self.field_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Runs every timer whose deadline has passed.
    pub fn tick(&mut self, now: Instant) -> Vec<TimerFired> {
        let mut fired = Vec::new();
        if self.recompute.poll(now).is_some() {
            fired.push(TimerFired::Recompute(self.recompute_now()));
        }
        if self.relayout.poll(now).is_some() {
            self.timeline.layout();
            tracing::debug!("timeline relaid out");
            fired.push(TimerFired::Relayout);
        }
        fired
    }

    fn commit(&mut self, matchers: ActiveMatchers) {
        let bands = self
            .config
            .painted_bands
            .clone()
            .unwrap_or_else(|| (0..self.timeline.band_count()).collect());

        for index in bands {
            let Some(band) = self.timeline.band_mut(index) else {
                tracing::warn!(band = index, "painted band missing from timeline");
                continue;
            };
            let painter = band.event_painter();
            painter.set_filter_matcher(matchers.filter.clone());
            painter.set_highlight_matcher(matchers.highlight.clone());
        }

        self.matchers = matchers;
        self.timeline.paint();
    }
}
