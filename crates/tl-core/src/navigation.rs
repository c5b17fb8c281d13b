//! Next/previous event navigation relative to the current center date.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};

use crate::event::TimelineEvent;
use crate::matcher::FilterPredicate;

/// Minimum distance from the center an event must have to be jumped to.
pub const NAVIGATION_GUARD: TimeDelta = TimeDelta::seconds(10);

/// Which way to move along the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Next,
    Previous,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Next => "next",
            Self::Previous => "previous",
        })
    }
}

/// Error type for unknown direction strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown direction: {0} (expected next or previous)")]
pub struct UnknownDirection(String);

impl FromStr for Direction {
    type Err = UnknownDirection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "next" => Ok(Self::Next),
            "previous" | "prev" => Ok(Self::Previous),
            _ => Err(UnknownDirection(s.to_string())),
        }
    }
}

/// Finds the date to center on when stepping in `direction`.
///
/// `events` is scanned once, in the order given (the timeline engine yields
/// ascending start times). Events rejected by `filter` are skipped; `None`
/// accepts everything.
///
/// - `Next` stops at the first event starting more than `guard` after
///   `center` and returns its start.
/// - `Previous` stops at the first event starting no earlier than
///   `center - guard` and returns the start of the accepted event just before
///   it.
///
/// If the scan runs out, the last accepted start is returned. With no
/// accepted event at all the result is `center`.
pub fn find_adjacent_event_date<I>(
    direction: Direction,
    center: DateTime<Utc>,
    events: I,
    filter: Option<&FilterPredicate>,
    guard: TimeDelta,
) -> DateTime<Utc>
where
    I: IntoIterator,
    I::Item: TimelineEvent,
{
    // Saturate at the ends of the representable range.
    let after = center
        .checked_add_signed(guard)
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    let before = center
        .checked_sub_signed(guard)
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let mut last_accepted = center;

    for event in events {
        if filter.is_some_and(|f| !f.matches(&event)) {
            continue;
        }

        let start = event.start();
        match direction {
            Direction::Next if start > after => return start,
            Direction::Previous if start >= before => return last_accepted,
            _ => {}
        }
        last_accepted = start;
    }

    last_accepted
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::event::Event;
    use crate::matcher::build_filter;
    use crate::types::EventId;

    fn center() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2013-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn at(id: &str, offset_ms: i64) -> Event {
        Event::new(
            EventId::new(id).unwrap(),
            center() + TimeDelta::milliseconds(offset_ms),
        )
    }

    fn offset(date: DateTime<Utc>) -> i64 {
        (date - center()).num_milliseconds()
    }

    fn step(direction: Direction, events: &[Event], filter: Option<&FilterPredicate>) -> i64 {
        offset(find_adjacent_event_date(
            direction,
            center(),
            events,
            filter,
            NAVIGATION_GUARD,
        ))
    }

    fn spread() -> Vec<Event> {
        vec![
            at("a", -20_000),
            at("b", -5_000),
            at("c", 5_000),
            at("d", 20_000),
        ]
    }

    #[test]
    fn next_skips_events_inside_guard() {
        assert_eq!(step(Direction::Next, &spread(), None), 20_000);
    }

    #[test]
    fn previous_returns_event_before_boundary() {
        assert_eq!(step(Direction::Previous, &spread(), None), -20_000);
    }

    #[test]
    fn empty_source_keeps_center() {
        assert_eq!(step(Direction::Next, &[], None), 0);
        assert_eq!(step(Direction::Previous, &[], None), 0);
    }

    #[test]
    fn fully_filtered_source_keeps_center() {
        let filter = build_filter(&["^zzz"]).unwrap();
        assert_eq!(step(Direction::Next, &spread(), Some(&filter)), 0);
        assert_eq!(step(Direction::Previous, &spread(), Some(&filter)), 0);
    }

    #[test]
    fn filter_hides_events_from_navigation() {
        let events = vec![
            at("call:1", -30_000),
            at("sms:1", -15_000),
            at("call:2", 15_000),
            at("sms:2", 40_000),
        ];
        let sms = build_filter(&["sms"]).unwrap();

        assert_eq!(step(Direction::Next, &events, Some(&sms)), 40_000);
        assert_eq!(step(Direction::Previous, &events, Some(&sms)), -15_000);
    }

    #[test]
    fn show_all_filter_behaves_like_none() {
        let show_all = build_filter(&["", ""]).unwrap();
        assert_eq!(step(Direction::Next, &spread(), Some(&show_all)), 20_000);
        assert_eq!(step(Direction::Previous, &spread(), Some(&show_all)), -20_000);
    }

    #[test]
    fn next_guard_is_strict() {
        let events = vec![at("edge", 10_000)];
        // Nothing lies beyond the guard, so the scan runs out on the edge event.
        assert_eq!(step(Direction::Next, &events, None), 10_000);

        let events = vec![at("edge", 10_000), at("beyond", 10_001)];
        assert_eq!(step(Direction::Next, &events, None), 10_001);
    }

    #[test]
    fn previous_boundary_is_inclusive() {
        let events = vec![at("far", -60_000), at("edge", -10_000)];
        assert_eq!(step(Direction::Previous, &events, None), -60_000);

        let events = vec![at("far", -60_000), at("outside", -10_001)];
        assert_eq!(step(Direction::Previous, &events, None), -10_001);
    }

    #[test]
    fn single_event_needs_to_clear_guard() {
        assert_eq!(step(Direction::Previous, &[at("near", -5_000)], None), 0);
        assert_eq!(step(Direction::Previous, &[at("far", -11_000)], None), -11_000);
        assert_eq!(step(Direction::Next, &[at("far", 11_000)], None), 11_000);
    }

    #[test]
    fn exhausted_next_falls_back_to_last_accepted_event() {
        let events = vec![at("a", -50_000), at("b", -40_000), at("c", 3_000)];
        assert_eq!(step(Direction::Next, &events, None), 3_000);
    }

    #[test]
    fn unordered_stream_is_scanned_in_given_order() {
        let events = vec![at("late", 60_000), at("early", 15_000)];
        assert_eq!(step(Direction::Next, &events, None), 60_000);

        let events = vec![at("a", -90_000), at("near", 0), at("b", -30_000)];
        assert_eq!(step(Direction::Previous, &events, None), -90_000);
    }

    #[test]
    fn custom_guard_is_respected() {
        let events = spread();
        let date = find_adjacent_event_date(
            Direction::Next,
            center(),
            &events,
            None,
            TimeDelta::seconds(1),
        );
        assert_eq!(offset(date), 5_000);
    }

    #[test]
    fn guard_saturates_at_the_ends_of_time() {
        let late = DateTime::<Utc>::MAX_UTC - TimeDelta::seconds(1);
        let events = vec![Event::new(EventId::new("last").unwrap(), late)];
        let date = find_adjacent_event_date(Direction::Next, late, &events, None, NAVIGATION_GUARD);
        assert_eq!(date, late);

        let early = DateTime::<Utc>::MIN_UTC + TimeDelta::seconds(1);
        let events = vec![Event::new(EventId::new("first").unwrap(), early)];
        let date =
            find_adjacent_event_date(Direction::Previous, early, &events, None, NAVIGATION_GUARD);
        assert_eq!(date, early);
    }

    #[test]
    fn direction_parses_from_cli_words() {
        assert_eq!("next".parse::<Direction>(), Ok(Direction::Next));
        assert_eq!("prev".parse::<Direction>(), Ok(Direction::Previous));
        assert!("sideways".parse::<Direction>().is_err());
        assert_eq!(Direction::Previous.to_string(), "previous");
    }
}
