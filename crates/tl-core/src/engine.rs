//! Interfaces consumed from the timeline engine.
//!
//! The engine owns rendering, band layout and event loading. The panel
//! controller only needs to hand predicates to each band's painter, read and
//! move the primary band's center, iterate the event source, and ask for a
//! repaint or relayout.

use chrono::{DateTime, Utc};

use crate::event::TimelineEvent;
use crate::matcher::{FilterPredicate, HighlightPredicate};

/// Draws a band's events, honouring the current predicates.
pub trait EventPainter {
    /// `None` shows every event.
    fn set_filter_matcher(&mut self, matcher: Option<FilterPredicate>);

    /// `None` disables highlighting.
    fn set_highlight_matcher(&mut self, matcher: Option<HighlightPredicate>);
}

/// One lane of the timeline.
pub trait Band {
    fn event_painter(&mut self) -> &mut dyn EventPainter;

    fn center_visible_date(&self) -> DateTime<Utc>;

    fn set_center_visible_date(&mut self, date: DateTime<Utc>);
}

/// The collection of events shared by every band.
pub trait EventSource {
    type Event: TimelineEvent;

    /// Iterates all events in ascending start order.
    fn all_events(&self) -> impl Iterator<Item = &Self::Event>;
}

/// The timeline widget as a whole.
pub trait Timeline {
    type Source: EventSource;

    fn band_count(&self) -> usize;

    fn band(&self, index: usize) -> Option<&dyn Band>;

    fn band_mut(&mut self, index: usize) -> Option<&mut dyn Band>;

    fn event_source(&self) -> &Self::Source;

    fn paint(&mut self);

    fn layout(&mut self);
}
