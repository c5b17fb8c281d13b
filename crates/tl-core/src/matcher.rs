//! Compiles filter and highlight text fields into event predicates.
//!
//! Both field kinds share one compilation rule: the text is trimmed, and a
//! non-empty result becomes a case-insensitive regex searched for anywhere in
//! the event ID. They differ in how the compiled patterns combine:
//!
//! - Filters are OR-ed. With no pattern at all the filter shows everything.
//! - Highlights are indexed by color category. The first matching field wins,
//!   and empty fields keep their slot so indices stay aligned with the theme.

use std::fmt;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::TimelineEvent;

/// Upper bound on the compiled size of a single user pattern.
const PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// Which row of the control panel a field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Filter,
    Highlight,
}

impl FieldKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Filter => "filter",
            Self::Highlight => "highlight",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while compiling field text into predicates.
#[derive(Debug, Clone, Error)]
pub enum MatcherError {
    /// A field's text is not a valid pattern.
    #[error("invalid {kind} pattern in field {index} ({pattern:?}): {source}")]
    PatternCompile {
        kind: FieldKind,
        index: usize,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl MatcherError {
    /// The field that holds the offending text.
    pub const fn field(&self) -> (FieldKind, usize) {
        match self {
            Self::PatternCompile { kind, index, .. } => (*kind, *index),
        }
    }
}

/// Decides whether an event stays visible.
#[derive(Debug, Clone, Default)]
pub struct FilterPredicate {
    patterns: Vec<Regex>,
}

impl FilterPredicate {
    /// A predicate that accepts every event.
    pub const fn show_all() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// True when no pattern is configured.
    pub fn is_show_all(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Number of compiled patterns.
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    pub fn matches_id(&self, id: &str) -> bool {
        self.patterns.is_empty() || self.patterns.iter().any(|re| re.is_match(id))
    }

    pub fn matches<E: TimelineEvent + ?Sized>(&self, event: &E) -> bool {
        self.matches_id(event.event_id())
    }
}

/// Assigns events to highlight categories.
///
/// Slot `i` holds the pattern for category `i`, or `None` for an empty field.
#[derive(Debug, Clone)]
pub struct HighlightPredicate {
    slots: Vec<Option<Regex>>,
}

impl HighlightPredicate {
    /// Number of category slots, empty ones included.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Indices of the slots that hold a pattern.
    pub fn active_categories(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|_| index))
    }

    /// The lowest category whose pattern matches `id`.
    pub fn category_of_id(&self, id: &str) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|re| re.is_match(id)))
    }

    pub fn category<E: TimelineEvent + ?Sized>(&self, event: &E) -> Option<usize> {
        self.category_of_id(event.event_id())
    }
}

/// The predicates currently in force, replaced wholesale on every commit.
#[derive(Debug, Clone, Default)]
pub struct ActiveMatchers {
    pub filter: Option<FilterPredicate>,
    pub highlight: Option<HighlightPredicate>,
}

impl ActiveMatchers {
    /// The state after "Clear All": no filter and no highlighting.
    pub const fn cleared() -> Self {
        Self {
            filter: None,
            highlight: None,
        }
    }

    pub fn is_visible<E: TimelineEvent + ?Sized>(&self, event: &E) -> bool {
        self.filter.as_ref().is_none_or(|f| f.matches(event))
    }

    pub fn highlight_category<E: TimelineEvent + ?Sized>(&self, event: &E) -> Option<usize> {
        self.highlight.as_ref().and_then(|h| h.category(event))
    }
}

/// Compiles one field. Returns `Ok(None)` when the trimmed text is empty.
fn compile_field(kind: FieldKind, index: usize, text: &str) -> Result<Option<Regex>, MatcherError> {
    let pattern = text.trim();
    if pattern.is_empty() {
        return Ok(None);
    }

    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .size_limit(PATTERN_SIZE_LIMIT)
        .build()
        .map(Some)
        .map_err(|source| MatcherError::PatternCompile {
            kind,
            index,
            pattern: pattern.to_string(),
            source,
        })
}

/// Builds the filter predicate from the filter row.
pub fn build_filter<S: AsRef<str>>(texts: &[S]) -> Result<FilterPredicate, MatcherError> {
    let mut patterns = Vec::with_capacity(texts.len());
    for (index, text) in texts.iter().enumerate() {
        if let Some(re) = compile_field(FieldKind::Filter, index, text.as_ref())? {
            patterns.push(re);
        }
    }
    Ok(FilterPredicate { patterns })
}

/// Builds the highlight predicate from the highlight row.
///
/// Returns `Ok(None)` when every field is empty, which disables highlighting
/// altogether rather than producing a predicate that never matches.
pub fn build_highlight<S: AsRef<str>>(
    texts: &[S],
) -> Result<Option<HighlightPredicate>, MatcherError> {
    let slots = texts
        .iter()
        .enumerate()
        .map(|(index, text)| compile_field(FieldKind::Highlight, index, text.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;

    if slots.iter().all(Option::is_none) {
        return Ok(None);
    }
    Ok(Some(HighlightPredicate { slots }))
}

/// Compiles both rows at once.
///
/// Fails on the first invalid field, filters before highlights. Nothing is
/// returned for the other row in that case, so callers can keep their previous
/// matchers.
pub fn build_matchers<F, H>(
    filter_texts: &[F],
    highlight_texts: &[H],
) -> Result<(FilterPredicate, Option<HighlightPredicate>), MatcherError>
where
    F: AsRef<str>,
    H: AsRef<str>,
{
    let filter = build_filter(filter_texts)?;
    let highlight = build_highlight(highlight_texts)?;
    Ok((filter, highlight))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: [&str; 0] = [];

    #[test]
    fn empty_filter_fields_show_everything() {
        let filter = build_filter(&["", "   ", "\t", ""]).unwrap();
        assert!(filter.is_show_all());
        for id in ["sms:1", "call:2", "", "anything at all"] {
            assert!(filter.matches_id(id), "{id:?} should be visible");
        }
    }

    #[test]
    fn filter_is_case_insensitive_substring_search() {
        let filter = build_filter(&["SMS", "", "", ""]).unwrap();
        assert!(filter.matches_id("incoming sms:42"));
        assert!(filter.matches_id("Sms"));
        assert!(!filter.matches_id("call:42"));
    }

    #[test]
    fn filter_fields_are_or_combined() {
        let filter = build_filter(&["^sms", "", "call$", "mms"]).unwrap();
        assert_eq!(filter.pattern_count(), 3);
        assert!(filter.matches_id("sms:1"));
        assert!(filter.matches_id("outgoing call"));
        assert!(filter.matches_id("MMS-7"));
        assert!(!filter.matches_id("call log"));
        assert!(!filter.matches_id("browser"));
    }

    #[test]
    fn filter_text_is_trimmed_before_compiling() {
        let filter = build_filter(&["  ^sms:1$  "]).unwrap();
        assert!(filter.matches_id("sms:1"));
        assert!(!filter.matches_id(" sms:1"));
    }

    #[test]
    fn invalid_filter_names_the_field() {
        let err = build_filter(&["ok", "(unbalanced"]).unwrap_err();
        assert_eq!(err.field(), (FieldKind::Filter, 1));
        let message = err.to_string();
        assert!(message.starts_with("invalid filter pattern in field 1"), "{message}");
        assert!(message.contains("(unbalanced"), "{message}");
    }

    #[test]
    fn all_empty_highlights_disable_highlighting() {
        assert!(build_highlight(&["", " ", "", ""]).unwrap().is_none());
        assert!(build_highlight(&NONE).unwrap().is_none());
    }

    #[test]
    fn highlight_first_matching_field_wins() {
        let highlight = build_highlight(&["", "call", "call:1", "sms"])
            .unwrap()
            .unwrap();
        assert_eq!(highlight.slot_count(), 4);
        assert_eq!(highlight.active_categories().collect::<Vec<_>>(), vec![1, 2, 3]);

        assert_eq!(highlight.category_of_id("call:1"), Some(1));
        assert_eq!(highlight.category_of_id("SMS from call:9"), Some(1));
        assert_eq!(highlight.category_of_id("sms:3"), Some(3));
        assert_eq!(highlight.category_of_id("browser"), None);
    }

    #[test]
    fn empty_highlight_slot_keeps_index_alignment() {
        let highlight = build_highlight(&["", "", "wifi"]).unwrap().unwrap();
        assert_eq!(highlight.category_of_id("WiFi on"), Some(2));
    }

    #[test]
    fn invalid_highlight_names_the_field() {
        let err = build_highlight(&["", "", "[z-a]"]).unwrap_err();
        assert_eq!(err.field(), (FieldKind::Highlight, 2));
    }

    #[test]
    fn lookaround_and_backreferences_are_rejected() {
        let err = build_filter(&["sms", "call(?=:1)"]).unwrap_err();
        assert!(matches!(
            err,
            MatcherError::PatternCompile { kind: FieldKind::Filter, index: 1, .. }
        ));

        let err = build_highlight(&["", "", "", r"(a)\1"]).unwrap_err();
        assert_eq!(err.field(), (FieldKind::Highlight, 3));
        assert!(
            matches!(&err, MatcherError::PatternCompile { pattern, .. } if pattern == r"(a)\1"),
            "{err}"
        );
    }

    #[test]
    fn build_matchers_rejects_whole_recompute_on_any_error() {
        let result = build_matchers(&["sms"], &["call", "*oops"]);
        let err = result.unwrap_err();
        assert_eq!(err.field(), (FieldKind::Highlight, 1));
    }

    #[test]
    fn build_matchers_returns_both_rows() {
        let (filter, highlight) = build_matchers(&["", ""], &["", "sms"]).unwrap();
        assert!(filter.is_show_all());
        assert_eq!(highlight.unwrap().category_of_id("sms:9"), Some(1));
    }

    #[test]
    fn active_matchers_without_filter_show_everything() {
        let matchers = ActiveMatchers::cleared();
        let event = crate::Event::new(
            crate::EventId::new("anything").unwrap(),
            chrono::DateTime::UNIX_EPOCH,
        );
        assert!(matchers.is_visible(&event));
        assert_eq!(matchers.highlight_category(&event), None);
    }
}
